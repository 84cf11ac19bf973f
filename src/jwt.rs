use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{encode, decode, decode_header, Algorithm, Header, Validation, EncodingKey, DecodingKey};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::{
    maker::{KeyError, Maker, TokenError},
    payload::Payload
};

pub const MIN_SECRET_KEY_SIZE: usize = 32;

// Every other algorithm, including "none" and the asymmetric ones, is
// refused whatever the rest of the token says.
pub const ALLOWED_ALGORITHMS: &[Algorithm] = &[Algorithm::HS256];

#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    jti: String,
    sub: String,
    iat: i64,
    exp: i64
}

impl From<&Payload> for Claims {
    fn from(p: &Payload) -> Self {
        Claims {
            jti: p.id.to_string(),
            sub: p.username.clone(),
            iat: p.issued_at.timestamp(),
            exp: p.expires_at.timestamp()
        }
    }
}

impl TryFrom<Claims> for Payload {
    type Error = TokenError;

    fn try_from(c: Claims) -> Result<Self, Self::Error> {
        Ok(Payload {
            id: Uuid::parse_str(&c.jti).or(Err(TokenError::InvalidToken))?,
            username: c.sub,
            issued_at: DateTime::from_timestamp(c.iat, 0)
                .ok_or(TokenError::InvalidToken)?,
            expires_at: DateTime::from_timestamp(c.exp, 0)
                .ok_or(TokenError::InvalidToken)?
        })
    }
}

pub fn check_algorithm(header: &Header) -> Result<(), TokenError> {
    match ALLOWED_ALGORITHMS.contains(&header.alg) {
        true => Ok(()),
        false => Err(TokenError::InvalidToken)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
    // expiry is checked against our own clock once the token is authentic
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

fn issue(key: &EncodingKey, payload: &Payload) -> Result<String, TokenError> {
    encode(&Header::new(Algorithm::HS256), &Claims::from(payload), key)
        .or(Err(TokenError::Encoding))
}

fn verify(
    key: &DecodingKey,
    validation: &Validation,
    token_str: &str,
    now: DateTime<Utc>
) -> Result<Payload, TokenError>
{
    let header = decode_header(token_str).or(Err(TokenError::InvalidToken))?;
    check_algorithm(&header)?;

    let token = decode::<Claims>(token_str, key, validation)
        .or(Err(TokenError::InvalidToken))?;

    let payload = Payload::try_from(token.claims)?;
    // exp carries whole seconds only
    if payload.is_expired(now.trunc_subsecs(0)) {
        return Err(TokenError::TokenExpired);
    }

    Ok(payload)
}

pub struct JWTMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    now: fn() -> DateTime<Utc>
}

impl JWTMaker {
    pub fn new(key: &[u8]) -> Result<Self, KeyError> {
        if key.len() < MIN_SECRET_KEY_SIZE {
            return Err(KeyError::TooShort(MIN_SECRET_KEY_SIZE));
        }

        Ok(JWTMaker {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation: validation(),
            now: Utc::now
        })
    }

    pub fn with_clock(self, now: fn() -> DateTime<Utc>) -> Self {
        JWTMaker { now, ..self }
    }
}

impl Maker for JWTMaker {
    fn create_token(
        &self,
        username: &str,
        duration: Duration
    ) -> Result<String, TokenError>
    {
        let payload = Payload::new(username, duration, (self.now)())?;
        issue(&self.encoding_key, &payload)
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        verify(&self.decoding_key, &self.validation, token, (self.now)())
    }
}

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit, Payload as AeadPayload}
};
use chrono::{DateTime, Duration, Utc};

use crate::{
    maker::{KeyError, Maker, TokenError},
    payload::Payload
};

pub const KEY_SIZE: usize = 32;

const NONCE_SIZE: usize = 12;

// Also bound to the ciphertext as associated data.
const TOKEN_PREFIX: &str = "v1.sealed.";

fn seal(
    cipher: &ChaCha20Poly1305,
    payload: &Payload
) -> Result<String, TokenError>
{
    let msg = serde_json::to_vec(payload).or(Err(TokenError::Encoding))?;

    let nonce_bytes: [u8; NONCE_SIZE] = rand::random();
    let ciphertext = cipher.encrypt(
        Nonce::from_slice(&nonce_bytes),
        AeadPayload { msg: &msg, aad: TOKEN_PREFIX.as_bytes() }
    )
    .or(Err(TokenError::Encoding))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);

    Ok(format!("{TOKEN_PREFIX}{}", URL_SAFE_NO_PAD.encode(blob)))
}

fn open(
    cipher: &ChaCha20Poly1305,
    token: &str
) -> Result<Payload, TokenError>
{
    let blob = token.strip_prefix(TOKEN_PREFIX)
        .and_then(|enc| URL_SAFE_NO_PAD.decode(enc).ok())
        .ok_or(TokenError::InvalidToken)?;

    if blob.len() <= NONCE_SIZE {
        return Err(TokenError::InvalidToken);
    }

    let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
    let msg = cipher.decrypt(
        Nonce::from_slice(nonce),
        AeadPayload { msg: ciphertext, aad: TOKEN_PREFIX.as_bytes() }
    )
    .or(Err(TokenError::InvalidToken))?;

    serde_json::from_slice(&msg).or(Err(TokenError::InvalidToken))
}

/// Issues tokens which are the payload encrypted and authenticated with
/// ChaCha20-Poly1305 under a 32-byte shared key.
pub struct SealedMaker {
    cipher: ChaCha20Poly1305,
    now: fn() -> DateTime<Utc>
}

impl SealedMaker {
    pub fn new(key: &[u8]) -> Result<Self, KeyError> {
        if key.len() != KEY_SIZE {
            return Err(KeyError::WrongLength(KEY_SIZE));
        }

        Ok(SealedMaker {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
            now: Utc::now
        })
    }

    pub fn with_clock(self, now: fn() -> DateTime<Utc>) -> Self {
        SealedMaker { now, ..self }
    }
}

impl Maker for SealedMaker {
    fn create_token(
        &self,
        username: &str,
        duration: Duration
    ) -> Result<String, TokenError>
    {
        let payload = Payload::new(username, duration, (self.now)())?;
        seal(&self.cipher, &payload)
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let payload = open(&self.cipher, token)?;
        if payload.is_expired((self.now)()) {
            return Err(TokenError::TokenExpired);
        }
        Ok(payload)
    }
}

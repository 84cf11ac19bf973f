use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::maker::TokenError;

/// The claim set carried by a token.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Payload {
    // Not consulted yet; reserved for revocation.
    pub id: Uuid,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>
}

impl Payload {
    /// Creates a payload valid from `now` until `now + duration`.
    ///
    /// Negative durations are accepted so that already-expired tokens can
    /// be minted in tests; callers issuing real tokens pass a positive one.
    pub fn new(
        username: &str,
        duration: Duration,
        now: DateTime<Utc>
    ) -> Result<Self, TokenError>
    {
        let expires_at = now.checked_add_signed(duration)
            .ok_or(TokenError::InvalidDuration)?;

        Ok(Payload {
            id: Uuid::new_v4(),
            username: username.into(),
            issued_at: now,
            expires_at
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

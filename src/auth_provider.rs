use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Error {
    pub status: Option<u16>,
    pub message: String
}

#[derive(Debug)]
pub enum Failure {
    Unauthorized,
    Error(Error)
}

/// Checks credentials on behalf of the login route.
#[async_trait]
pub trait AuthProvider {
    /// Returns the canonical username for the credentials.
    async fn login(
        &self,
        username: &str,
        password: &str
    ) -> Result<String, Failure>;
}

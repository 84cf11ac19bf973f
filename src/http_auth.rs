use async_trait::async_trait;
use mime::APPLICATION_JSON;
use reqwest::{
    Client, StatusCode,
    header::ACCEPT
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth_provider::{AuthProvider, Error, Failure};

impl From<reqwest::Error> for Failure {
    fn from(e: reqwest::Error) -> Self {
        Failure::Error(Error {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string()
        })
    }
}

async fn failure_from(r: reqwest::Response) -> Failure {
    Failure::Error(Error {
        status: Some(r.status().as_u16()),
        message: r.text().await.unwrap_or_else(|e| e.to_string())
    })
}

#[derive(Serialize)]
struct LoginParams<'a> {
    username: &'a str,
    password: &'a str
}

#[derive(Deserialize, Serialize)]
struct LoginResult {
    username: String
}

async fn post_login(
    client: &Client,
    url: &str,
    params: &LoginParams<'_>
) -> Result<String, Failure>
{
    let response = client.post(url)
        .json(params)
        .header(ACCEPT, APPLICATION_JSON.as_ref())
        .send()
        .await?;

    match response.status() {
        StatusCode::OK => Ok(response.json::<LoginResult>().await?.username),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            debug!(username = params.username, "credentials refused");
            Err(Failure::Unauthorized)
        },
        _ => Err(failure_from(response).await)
    }
}

/// Delegates credential checks to an external account service.
pub struct HttpAuthProvider {
    client: Client,
    login_url: String
}

pub const SESSION_ENDPOINT: &str = "/session";

impl HttpAuthProvider {
    pub fn new(url: &str) -> Result<Self, reqwest::Error> {
        Ok(HttpAuthProvider {
            client: Client::builder().build()?,
            login_url: url.trim_end_matches('/').to_string() + SESSION_ENDPOINT
        })
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn login(
        &self,
        username: &str,
        password: &str
    ) -> Result<String, Failure>
    {
        let params = LoginParams { username, password };
        post_login(&self.client, &self.login_url, &params).await
    }
}

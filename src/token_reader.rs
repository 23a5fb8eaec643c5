use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::{AuthProtocolError, AuthResult, HandshakeStep, TokenPair};

const OAUTH_TOKEN_KEY: &str = "oauth_token";

const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

impl TokenResponse {
    pub fn to_pair(&self) -> TokenPair {
        TokenPair::new(&self.oauth_token, &self.oauth_token_secret)
    }
}

/// Add parse_oauth_token feature to reqwest::Response.
// this trait is sealed
#[async_trait]
pub trait TokenReader: private::Sealed {
    /// Reads a form-encoded token body, failing on anything but `200 OK`.
    async fn parse_oauth_token(self, step: HandshakeStep) -> AuthResult<TokenResponse>;
}

#[async_trait]
impl TokenReader for Response {
    async fn parse_oauth_token(self, step: HandshakeStep) -> AuthResult<TokenResponse> {
        let status = self.status();
        let text = self
            .text()
            .await
            .map_err(|source| AuthProtocolError::Transport { step, source })?;
        if status != StatusCode::OK {
            return Err(AuthProtocolError::UnexpectedStatus {
                step,
                status,
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Err(AuthProtocolError::EmptyResponse(step));
        }
        read_oauth_token(text)
    }
}

pub(crate) fn read_oauth_token(text: String) -> AuthResult<TokenResponse> {
    let mut destructured = url::form_urlencoded::parse(text.trim().as_bytes())
        .into_owned()
        .collect::<HashMap<String, String>>();
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(AuthProtocolError::TokenKeyNotFound(OAUTH_TOKEN_KEY, text)),
        (_, _) => Err(AuthProtocolError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text,
        )),
    }
}

mod private {
    use reqwest::Response;

    pub trait Sealed {}
    impl Sealed for Response {}
}

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::Expect;
use crate::{
    AuthProtocolError, Client, Config, CredentialStore, Phase, Result, TokenReader,
    TokenResponse, OAUTH_CALLBACK_KEY, OAUTH_TOKEN_KEY, OOB_CALLBACK,
};

/// The network-facing steps of the out-of-band login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    RequestToken,
    AccessToken,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandshakeStep::RequestToken => "request token",
            HandshakeStep::AccessToken => "access token exchange",
        })
    }
}

/// Drives the three-legged handshake against TripIt and records its outcome
/// in the shared [`CredentialStore`].
///
/// Every step can be retried from the state it left behind: a failed exchange
/// keeps the pending request token.
#[derive(Debug, Clone)]
pub struct TokenExchange {
    client: Client,
    store: Arc<CredentialStore>,
    request_token_url: String,
    access_token_url: String,
    authorize_url: String,
}

impl TokenExchange {
    pub fn new(client: Client, store: Arc<CredentialStore>, config: &Config) -> Self {
        TokenExchange {
            client,
            store,
            request_token_url: config.request_token_url(),
            access_token_url: config.access_token_url(),
            authorize_url: config.authorize_endpoint().to_string(),
        }
    }

    /// Step 1: fetch a request token, remembered as the pending login.
    pub async fn obtain_request_token(&self) -> Result<TokenResponse> {
        let step = HandshakeStep::RequestToken;
        let request = self.client.signed_get(
            &self.request_token_url,
            &Phase::RequestToken,
            self.store.consumer(),
            &[],
            Expect::TokenForm,
        )?;

        let response = request
            .send()
            .await
            .map_err(|source| AuthProtocolError::Transport { step, source })?;
        debug!(status = %response.status(), "request token response");
        let token = response.parse_oauth_token(step).await.map_err(|err| {
            warn!(%err, "could not obtain request token");
            err
        })?;

        self.store.begin_login(token.to_pair());
        info!("obtained request token, waiting for user authorization");
        Ok(token)
    }

    /// Step 2: the URL the user opens to authorize `request_token`.
    ///
    /// No network call. Marks the pending login as handed to the user when
    /// the token is the pending one.
    pub fn build_authorize_url(&self, request_token: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(OAUTH_TOKEN_KEY, request_token)
            .append_pair(OAUTH_CALLBACK_KEY, OOB_CALLBACK)
            .finish();
        self.store.mark_authorize_issued(request_token);
        format!("{}?{}", self.authorize_url, query)
    }

    /// Step 3: trade the authorized request token for an access token.
    ///
    /// Only valid for the request token obtained by this process. On success
    /// the access token is stored and the login completes.
    ///
    /// The pending token is checked before sending and again when storing the
    /// result. Concurrent exchanges for the same token may both reach TripIt;
    /// only the first to finish is stored, and a login cleared or replaced in
    /// the meantime fails with [`AuthProtocolError`] and stores nothing.
    pub async fn exchange_for_access_token(
        &self,
        request_token: &str,
        request_token_secret: &str,
    ) -> Result<TokenResponse> {
        self.exchange(request_token, request_token_secret, None)
            .await
    }

    /// Step 3 for providers that hand the user a verifier code.
    pub async fn exchange_for_access_token_with_verifier(
        &self,
        request_token: &str,
        request_token_secret: &str,
        verifier: &str,
    ) -> Result<TokenResponse> {
        self.exchange(request_token, request_token_secret, Some(verifier))
            .await
    }

    async fn exchange(
        &self,
        request_token: &str,
        request_token_secret: &str,
        verifier: Option<&str>,
    ) -> Result<TokenResponse> {
        let step = HandshakeStep::AccessToken;
        let pending = self
            .store
            .pending_request()
            .ok_or_else(|| AuthProtocolError::StateViolation {
                step,
                state: self.store.state(),
            })?;
        if pending.token() != request_token {
            return Err(AuthProtocolError::UnknownRequestToken(request_token.to_string()).into());
        }

        let secrets = self
            .store
            .consumer()
            .clone()
            .token(request_token, request_token_secret);
        let phase = Phase::AccessToken {
            verifier: verifier.map(str::to_string),
        };
        let request = self.client.signed_get(
            &self.access_token_url,
            &phase,
            &secrets,
            &[],
            Expect::TokenForm,
        )?;

        let response = request
            .send()
            .await
            .map_err(|source| AuthProtocolError::Transport { step, source })?;
        debug!(status = %response.status(), "access token response");
        let token = response.parse_oauth_token(step).await.map_err(|err| {
            warn!(%err, "access token exchange failed, request token kept for retry");
            err
        })?;

        self.store
            .complete_login(request_token, token.to_pair())
            .map_err(|err| {
                warn!(%err, "login was cleared or replaced during the exchange, access token discarded");
                err
            })?;
        info!("authenticated with TripIt");
        Ok(token)
    }
}

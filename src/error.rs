use reqwest::StatusCode;
use thiserror::Error;

use crate::{AuthState, ConfigError, HandshakeStep};

pub type Result<T> = std::result::Result<T, Error>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type AuthResult<T> = std::result::Result<T, AuthProtocolError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[error("OAuth handshake failed : {0}")]
    AuthProtocol(#[from] AuthProtocolError),
    #[error("not authenticated with TripIt, run the login flow first")]
    NotAuthenticated,
    #[error("TripIt API error : {status} - {body}")]
    Api { status: StatusCode, body: String },
    #[error("trip {0} not found")]
    TripNotFound(String),
    #[error("response is not valid JSON : {0}")]
    Json(#[from] serde_json::Error),
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid configuration : {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether re-invoking the same operation may succeed.
    ///
    /// Handshake steps are retryable from their own state; resource calls are
    /// only retried by the caller on transport failures and server errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::AuthProtocol(err) => err.is_retryable(),
            Error::Api { status, .. } => status.is_server_error(),
            Error::Reqwest(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

/// Malformed input handed to the signer. Always a programming error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("invalid HTTP method : {0:?}")]
    InvalidMethod(String),
    #[error("invalid base URL {0:?} : {1}")]
    InvalidUrl(String, String),
    #[error("base URL {0:?} must not carry a query or fragment")]
    UrlHasQuery(String),
    #[error("{0} requests must carry oauth_token")]
    MissingToken(&'static str),
    #[error("signing key rejected by HMAC-SHA1")]
    InvalidSigningKey,
}

#[derive(Error, Debug)]
pub enum AuthProtocolError {
    #[error("{step} returned {status} : {body}")]
    UnexpectedStatus {
        step: HandshakeStep,
        status: StatusCode,
        body: String,
    },
    #[error("{0} returned an empty body")]
    EmptyResponse(HandshakeStep),
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
    #[error("{step} cannot run while {state}")]
    StateViolation {
        step: HandshakeStep,
        state: AuthState,
    },
    #[error("request token {0} does not belong to the pending login")]
    UnknownRequestToken(String),
    #[error("{step} failed : {source}")]
    Transport {
        step: HandshakeStep,
        #[source]
        source: reqwest::Error,
    },
}

impl AuthProtocolError {
    /// State violations need a fresh `obtain_request_token`; everything else can
    /// be retried as-is.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            AuthProtocolError::StateViolation { .. } | AuthProtocolError::UnknownRequestToken(_)
        )
    }
}

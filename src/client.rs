use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use reqwest::{Client as ReqwestClient, RequestBuilder as ReqwestRequestBuilder};
use tracing::debug;

use crate::{Config, Phase, RequestBuilder, Result, SecretsProvider, SignResult};

pub(crate) const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// What the remote side is expected to answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    /// Form-encoded token response of a handshake step.
    TokenForm,
    /// JSON document of a REST call.
    Json,
}

/// `reqwest::Client` that attaches OAuth 1.0a signatures.
#[derive(Debug, Clone)]
pub struct Client {
    inner: ReqwestClient,
    builder: RequestBuilder<'static>,
}

impl Client {
    /// Constructs a new `Client` with the timeout and user agent of `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let inner = ReqwestClient::builder()
            .timeout(config.get_timeout())
            .user_agent(config.get_user_agent())
            .build()?;
        Ok(Client::new_with_client(inner))
    }

    /// Constructs a new `Client` with specifying inner `reqwest::Client`.
    pub fn new_with_client(client: ReqwestClient) -> Self {
        Client {
            inner: client,
            builder: RequestBuilder::new(),
        }
    }

    /// Pins nonce and timestamp, for reproducible requests.
    pub fn with_request_builder(self, builder: RequestBuilder<'static>) -> Self {
        Client { builder, ..self }
    }

    /// Start a signed `GET` to `url` with `query` appended.
    pub(crate) fn signed_get<TSecretsProvider>(
        &self,
        url: &str,
        phase: &Phase,
        secrets: &TSecretsProvider,
        query: &[(String, String)],
        expect: Expect,
    ) -> SignResult<ReqwestRequestBuilder>
    where
        TSecretsProvider: SecretsProvider,
    {
        let signed = self
            .builder
            .build(&Method::GET, url, phase, secrets, query)?;
        debug!(phase = phase.name(), %url, "signed request");

        let request = self
            .inner
            .get(url)
            .header(AUTHORIZATION, signed.authorization);
        let request = if signed.query.is_empty() {
            request
        } else {
            request.query(&signed.query)
        };
        Ok(match expect {
            Expect::TokenForm => request
                .header(CONTENT_TYPE, FORM_URLENCODED)
                .header(ACCEPT, "*/*"),
            Expect::Json => request.header(ACCEPT, "application/json"),
        })
    }
}

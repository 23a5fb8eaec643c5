use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use http::Method;
use rand::{distributions::Alphanumeric, Rng};

use crate::signer::percent_encode;
use crate::{
    OAuthKey, OAuthParameters, Phase, SecretsProvider, SignResult, Signer, OOB_CALLBACK,
};

const NONCE_LEN: usize = 32;

/// Authorization material for one outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Value of the `Authorization` header.
    pub authorization: String,
    /// Query parameters to send next to the header. In the request-token phase
    /// this repeats `oauth_callback=oob`, some providers only look there.
    pub query: Vec<(String, String)>,
    /// The signed parameter set, `oauth_signature` included.
    pub parameters: OAuthParameters,
}

/// Builds signed OAuth parameter sets and renders them as headers.
///
/// Nonce and timestamp are fresh per call unless pinned with
/// [`RequestBuilder::nonce`] / [`RequestBuilder::timestamp`].
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder<'a> {
    nonce: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_nonce value
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        RequestBuilder {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        RequestBuilder {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// Signs a request for `phase` against `base_url`.
    ///
    /// `query` are the request's own query parameters; they are signed but not
    /// repeated in the header.
    pub fn build<TSecretsProvider>(
        &self,
        method: &Method,
        base_url: &str,
        phase: &Phase,
        secrets: &TSecretsProvider,
        query: &[(String, String)],
    ) -> SignResult<SignedRequest>
    where
        TSecretsProvider: SecretsProvider,
    {
        let (consumer_key, _) = secrets.get_consumer_key_pair();
        let (token, _) = secrets.get_token_option_pair();
        let nonce = self
            .nonce
            .as_ref()
            .map(|n| n.to_string())
            .unwrap_or_else(generate_nonce);
        let timestamp = self.timestamp.unwrap_or_else(unix_timestamp);

        let mut parameters =
            OAuthParameters::for_phase(phase, consumer_key, token, nonce, timestamp)?;

        let signable = parameters
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .chain(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let signature = Signer::new(secrets).generate_signature(method.as_str(), base_url, signable)?;
        parameters.insert_signature(signature);

        let mut companion = query.to_vec();
        if let Phase::RequestToken = phase {
            companion.push((OAuthKey::Callback.as_str().to_string(), OOB_CALLBACK.to_string()));
        }

        Ok(SignedRequest {
            authorization: render_header(&parameters),
            query: companion,
            parameters,
        })
    }
}

/// `OAuth k="v", k="v"` in canonical key order with encoded values.
pub fn render_header(parameters: &OAuthParameters) -> String {
    let pairs = parameters
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k.as_str(), percent_encode(v)))
        .collect::<Vec<_>>();
    format!("OAuth {}", pairs.join(", "))
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

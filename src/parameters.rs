use std::collections::BTreeMap;
use std::fmt;

use crate::{SignError, SignResult, OAUTH_VERSION, OOB_CALLBACK, SIGNATURE_METHOD};

/// Keys of the OAuth protocol parameter set.
///
/// Variants are declared in the byte order of their wire names, so the derived
/// `Ord` is the canonical sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OAuthKey {
    Callback,
    ConsumerKey,
    Nonce,
    Signature,
    SignatureMethod,
    Timestamp,
    Token,
    Verifier,
    Version,
}

impl OAuthKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            OAuthKey::Callback => "oauth_callback",
            OAuthKey::ConsumerKey => "oauth_consumer_key",
            OAuthKey::Nonce => "oauth_nonce",
            OAuthKey::Signature => "oauth_signature",
            OAuthKey::SignatureMethod => "oauth_signature_method",
            OAuthKey::Timestamp => "oauth_timestamp",
            OAuthKey::Token => "oauth_token",
            OAuthKey::Verifier => "oauth_verifier",
            OAuthKey::Version => "oauth_version",
        }
    }
}

impl fmt::Display for OAuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which call of the protocol a parameter set is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Temporary credential request. Carries `oauth_callback`, never a token.
    RequestToken,
    /// Request token to access token exchange.
    AccessToken { verifier: Option<String> },
    /// Signed call to a protected resource.
    Resource,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::RequestToken => "request_token",
            Phase::AccessToken { .. } => "access_token",
            Phase::Resource => "resource",
        }
    }
}

/// The `oauth_*` parameters of one request, kept in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParameters {
    entries: BTreeMap<OAuthKey, String>,
}

impl OAuthParameters {
    /// Assembles the unsigned parameter set for `phase`.
    ///
    /// A blank token counts as no token. Fails when the phase needs a token
    /// and none is available.
    pub fn for_phase(
        phase: &Phase,
        consumer_key: &str,
        token: Option<&str>,
        nonce: String,
        timestamp: u64,
    ) -> SignResult<Self> {
        let token = token.filter(|t| !t.trim().is_empty());

        let mut entries = BTreeMap::new();
        entries.insert(OAuthKey::ConsumerKey, consumer_key.to_string());
        entries.insert(OAuthKey::Nonce, nonce);
        entries.insert(OAuthKey::SignatureMethod, SIGNATURE_METHOD.to_string());
        entries.insert(OAuthKey::Timestamp, timestamp.to_string());
        entries.insert(OAuthKey::Version, OAUTH_VERSION.to_string());

        if let Phase::RequestToken = phase {
            entries.insert(OAuthKey::Callback, OOB_CALLBACK.to_string());
        } else {
            let token = token.ok_or(SignError::MissingToken(phase.name()))?;
            entries.insert(OAuthKey::Token, token.to_string());
            if let Phase::AccessToken {
                verifier: Some(verifier),
            } = phase
            {
                entries.insert(OAuthKey::Verifier, verifier.clone());
            }
        }

        Ok(OAuthParameters { entries })
    }

    pub fn get(&self, key: OAuthKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: OAuthKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Entries in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (OAuthKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert_signature(&mut self, signature: String) {
        self.entries.insert(OAuthKey::Signature, signature);
    }
}

//! Shared helpers for the wiremock-backed tests.

#![allow(dead_code)]

use std::time::Duration;

use tripit_oauth1::{Config, Credentials, Signer, TripIt};
use wiremock::{MockServer, Request};

pub const CONSUMER_KEY: &str = "ck1";
pub const CONSUMER_SECRET: &str = "cs1";

/// Config pointing every TripIt endpoint at `server`.
pub fn config_for(server: &MockServer) -> Config {
    Config::new(CONSUMER_KEY, CONSUMER_SECRET)
        .api_base(&server.uri())
        .unwrap()
        .authorize_url(&format!("{}/oauth/authorize", server.uri()))
        .unwrap()
        .timeout(Duration::from_secs(5))
}

pub fn tripit_for(server: &MockServer) -> TripIt {
    TripIt::new(config_for(server)).unwrap()
}

/// Decoded `key="value"` pairs of an `OAuth ...` authorization header.
pub fn authorization_params(request: &Request) -> Vec<(String, String)> {
    let header = request
        .headers
        .get("authorization")
        .expect("authorization header")
        .to_str()
        .unwrap();
    header
        .strip_prefix("OAuth ")
        .expect("OAuth scheme")
        .split(", ")
        .map(|item| {
            let (key, value) = item.split_once('=').unwrap();
            let value = percent_encoding::percent_decode_str(value.trim_matches('"'))
                .decode_utf8()
                .unwrap()
                .to_string();
            (key.to_string(), value)
        })
        .collect()
}

pub fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Recomputes the signature the way a provider would and compares it with the
/// one sent in the header.
///
/// The base URL comes from `server.uri()`: the URL wiremock records for a
/// request carries no port.
pub fn assert_signature_valid(
    server: &MockServer,
    request: &Request,
    token_secret: Option<(&str, &str)>,
) {
    let header_params = authorization_params(request);
    let sent = param(&header_params, "oauth_signature")
        .expect("oauth_signature")
        .to_string();

    let base_url = format!("{}{}", server.uri(), request.url.path());
    let query: Vec<(String, String)> = request
        .url
        .query_pairs()
        .into_owned()
        .filter(|(k, _)| param(&header_params, k).is_none())
        .collect();
    let signable = header_params
        .iter()
        .filter(|(k, _)| k != "oauth_signature")
        .chain(query.iter())
        .map(|(k, v)| (k.as_str(), v.as_str()));

    let credentials = match token_secret {
        Some((token, secret)) => Credentials::new(CONSUMER_KEY, CONSUMER_SECRET).token(token, secret),
        None => Credentials::new(CONSUMER_KEY, CONSUMER_SECRET),
    };
    let expected = Signer::new(&credentials)
        .generate_signature("GET", &base_url, signable)
        .unwrap();
    assert_eq!(sent, expected);
}

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use http::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use url::Url;

use crate::{SecretsProvider, SignError, SignResult};

type HmacSha1 = Hmac<Sha1>;

/// Everything except the RFC 3986 unreserved characters.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes `input` the way OAuth 1.0a requires: UTF-8 bytes, uppercase
/// hex, only `ALPHA / DIGIT / "-" / "." / "_" / "~"` left as is.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}

/// Encodes every pair, sorts by key then value, joins as `k=v&k=v`.
pub fn normalize_parameters<'p, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'p str, &'p str)>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// `METHOD&encoded(base_url)&encoded(normalized parameters)`.
///
/// `params` are raw, unencoded values; encoding happens here exactly once.
pub fn signature_base_string<'p, I>(method: &str, base_url: &str, params: I) -> SignResult<String>
where
    I: IntoIterator<Item = (&'p str, &'p str)>,
{
    let method = validate_method(method)?;
    validate_base_url(base_url)?;
    Ok(format!(
        "{}&{}&{}",
        method,
        percent_encode(base_url),
        percent_encode(&normalize_parameters(params))
    ))
}

/// `encoded(consumer_secret)&encoded(token_secret)`, the token half empty when absent.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret.unwrap_or_default())
    )
}

fn hmac_sha1_base64(key: &str, base_string: &str) -> SignResult<String> {
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| SignError::InvalidSigningKey)?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn validate_method(method: &str) -> SignResult<String> {
    let upper = method.to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| SignError::InvalidMethod(method.to_string()))?;
    Ok(upper)
}

fn validate_base_url(base_url: &str) -> SignResult<()> {
    let parsed = Url::parse(base_url)
        .map_err(|e| SignError::InvalidUrl(base_url.to_string(), e.to_string()))?;
    if parsed.cannot_be_a_base() {
        return Err(SignError::InvalidUrl(
            base_url.to_string(),
            "not a hierarchical URL".to_string(),
        ));
    }
    if base_url.contains('?') || base_url.contains('#') {
        return Err(SignError::UrlHasQuery(base_url.to_string()));
    }
    Ok(())
}

/// HMAC-SHA1 signer over the secrets of one request.
///
/// Pure: the signing key is derived from `secrets` on every call.
#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider) -> Self {
        Signer { secrets }
    }

    /// Base64 HMAC-SHA1 of the signature base string.
    ///
    /// `params` holds every parameter that takes part in the signature: the
    /// `oauth_*` set (without `oauth_signature`) plus query parameters.
    pub fn generate_signature<'p, I>(
        &self,
        method: &str,
        base_url: &str,
        params: I,
    ) -> SignResult<String>
    where
        I: IntoIterator<Item = (&'p str, &'p str)>,
    {
        let base_string = signature_base_string(method, base_url, params)?;
        let (_, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (_, token_secret) = self.secrets.get_token_option_pair();
        hmac_sha1_base64(&signing_key(consumer_secret, token_secret), &base_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Credentials;

    const REQUEST_TOKEN_URL: &str = "https://api.tripit.com/oauth/request_token";

    fn request_token_params() -> Vec<(&'static str, &'static str)> {
        vec![
            ("oauth_callback", "oob"),
            ("oauth_consumer_key", "ck1"),
            ("oauth_nonce", "abc123"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1700000000"),
            ("oauth_version", "1.0"),
        ]
    }

    #[test]
    fn encodes_only_reserved_characters() {
        let unreserved = "AZaz09-._~";
        assert_eq!(percent_encode(unreserved), unreserved);
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("a+b/c"), "a%2Bb%2Fc");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("cs&1=*"), "cs%261%3D%2A");
    }

    #[test]
    fn base_string_for_request_token() {
        let base =
            signature_base_string("GET", REQUEST_TOKEN_URL, request_token_params()).unwrap();
        assert!(base.starts_with("GET&https%3A%2F%2Fapi.tripit.com%2Foauth%2Frequest_token&"));
        assert_eq!(
            base,
            "GET&https%3A%2F%2Fapi.tripit.com%2Foauth%2Frequest_token&\
             oauth_callback%3Doob%26oauth_consumer_key%3Dck1%26oauth_nonce%3Dabc123\
             %26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1700000000\
             %26oauth_version%3D1.0"
        );
    }

    #[test]
    fn base_string_ignores_insertion_order() {
        let mut reversed = request_token_params();
        reversed.reverse();
        assert_eq!(
            signature_base_string("get", REQUEST_TOKEN_URL, reversed).unwrap(),
            signature_base_string("GET", REQUEST_TOKEN_URL, request_token_params()).unwrap()
        );
    }

    #[test]
    fn duplicate_keys_sort_by_value() {
        assert_eq!(
            normalize_parameters(vec![("b", "2"), ("a", "z"), ("a", "a b")]),
            "a=a%20b&a=z&b=2"
        );
    }

    #[test]
    fn signing_key_with_and_without_token_secret() {
        assert_eq!(signing_key("cs1", None), "cs1&");
        assert_eq!(signing_key("c&s", Some("t s")), "c%26s&t%20s");
    }

    #[test]
    fn rejects_malformed_input() {
        let params = request_token_params();
        assert!(matches!(
            signature_base_string("", REQUEST_TOKEN_URL, params.clone()),
            Err(SignError::InvalidMethod(_))
        ));
        assert!(matches!(
            signature_base_string("GET", "/oauth/request_token", params.clone()),
            Err(SignError::InvalidUrl(..))
        ));
        assert!(matches!(
            signature_base_string("GET", "https://api.tripit.com/v1/list/trip?format=json", params),
            Err(SignError::UrlHasQuery(_))
        ));
    }

    #[test]
    fn sign_request_token_scenario() {
        let secrets = Credentials::new("ck1", "cs1");
        let signer = Signer::new(&secrets);
        let first = signer
            .generate_signature("GET", REQUEST_TOKEN_URL, request_token_params())
            .unwrap();
        let second = signer
            .generate_signature("GET", REQUEST_TOKEN_URL, request_token_params())
            .unwrap();
        assert_eq!(first, "pHZTeBzw9bisuOm7UQ4+y05sxew=");
        assert_eq!(first, second);

        let mut changed = request_token_params();
        changed[2] = ("oauth_nonce", "abc124");
        assert_ne!(
            signer
                .generate_signature("GET", REQUEST_TOKEN_URL, changed)
                .unwrap(),
            first
        );
    }

    #[test]
    fn sign_rfc5849_temporary_credentials() {
        // https://tools.ietf.org/html/rfc5849#section-1.2
        let secrets = Credentials::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let signature = Signer::new(&secrets)
            .generate_signature(
                "POST",
                "https://photos.example.net/initiate",
                vec![
                    ("oauth_callback", "http://printer.example.com/ready"),
                    ("oauth_consumer_key", "dpf43f3p2l4k3l03"),
                    ("oauth_nonce", "wIjqoS"),
                    ("oauth_signature_method", "HMAC-SHA1"),
                    ("oauth_timestamp", "137131200"),
                ],
            )
            .unwrap();
        assert_eq!(signature, "74KNZJeDHnMBp0EMJ9ZHt/XKycU=");
    }

    #[test]
    fn sign_rfc5849_resource_with_query() {
        // https://tools.ietf.org/html/rfc5849#section-1.2
        let secrets = Credentials::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
            .token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let signature = Signer::new(&secrets)
            .generate_signature(
                "GET",
                "http://photos.example.net/photos",
                vec![
                    ("file", "vacation.jpg"),
                    ("size", "original"),
                    ("oauth_consumer_key", "dpf43f3p2l4k3l03"),
                    ("oauth_nonce", "chapoH"),
                    ("oauth_signature_method", "HMAC-SHA1"),
                    ("oauth_timestamp", "137131202"),
                    ("oauth_token", "nnch734d00sl2jdk"),
                ],
            )
            .unwrap();
        assert_eq!(signature, "MdpQcU8iPSUjWoN/UDMsK2sui9I=");
    }

    #[test]
    fn sign_body_parameters_with_spaces() {
        // https://developer.twitter.com/ja/docs/basics/authentication/guides/creating-a-signature
        let secrets = Credentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        )
        .token(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let signature = Signer::new(&secrets)
            .generate_signature(
                "POST",
                "https://api.twitter.com/1.1/statuses/update.json",
                vec![
                    ("include_entities", "true"),
                    ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
                    ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
                    ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
                    ("oauth_signature_method", "HMAC-SHA1"),
                    ("oauth_timestamp", "1318622958"),
                    (
                        "oauth_token",
                        "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
                    ),
                    ("oauth_version", "1.0"),
                ],
            )
            .unwrap();
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn agrees_with_oauth1_request() {
        use oauth1_request::signer::Signer as ReferenceSigner;
        use oauth1_request::{HmacSha1, Options};

        let mut options = Options::new();
        options.callback("oob");
        options.nonce("abc123");
        options.timestamp(1_700_000_000u64);
        options.version(true);
        let authorization = ReferenceSigner::with_signature_method(
            HmacSha1,
            "GET",
            REQUEST_TOKEN_URL,
            "cs1",
            None::<&str>,
        )
        .oauth_parameters("ck1", &options)
        .finish()
        .authorization;

        let reference = authorization
            .split(',')
            .find_map(|item| item.trim().strip_prefix("oauth_signature="))
            .map(|v| {
                percent_encoding::percent_decode_str(v.trim_matches('"'))
                    .decode_utf8_lossy()
                    .to_string()
            })
            .unwrap();

        let secrets = Credentials::new("ck1", "cs1");
        let ours = Signer::new(&secrets)
            .generate_signature("GET", REQUEST_TOKEN_URL, request_token_params())
            .unwrap();
        assert_eq!(ours, reference);
    }
}

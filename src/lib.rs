/*!
tripit-oauth1: signed access to the TripIt API over OAuth 1.0a.

# Overview

This library implements the OAuth 1.0a pieces a TripIt integration needs:
HMAC-SHA1 request signing, the three-legged out-of-band handshake, an
in-memory credential store, and signed `GET` access to TripIt's REST
endpoints. Everything is built on [reqwest](https://crates.io/crates/reqwest).

# How to use

## Logging in

```rust,no_run
use tripit_oauth1::{Config, TripIt};

# async fn run() -> tripit_oauth1::Result<()> {
let tripit = TripIt::new(Config::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]"))?;

// step 1: acquire request token & token secret
let request = tripit.obtain_request_token().await?;

// step 2: let the user authorize it
println!("please open: {}", tripit.build_authorize_url(&request.oauth_token));

// step 3: once authorized, trade it for an access token
tripit
    .exchange_for_access_token(&request.oauth_token, &request.oauth_token_secret)
    .await?;
assert!(tripit.is_authenticated());
# Ok(())
# }
```

## Calling the API

```rust,no_run
use tripit_oauth1::{Config, TripIt};

# async fn run() -> tripit_oauth1::Result<()> {
let config = Config::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .token("[ACCESS_TOKEN]", "[TOKEN_SECRET]");
let tripit = TripIt::new(config)?;

let trips = tripit.fetch("/v1/list/trip", [("format", "json")]).await?;
println!("{:#}", trips);
# Ok(())
# }
```

## Signing by hand

```rust
use http::Method;
use tripit_oauth1::{Credentials, Phase, RequestBuilder};

let secrets = Credentials::new("ck1", "cs1");
let signed = RequestBuilder::new()
    .nonce("abc123")
    .timestamp(1_700_000_000u64)
    .build(
        &Method::GET,
        "https://api.tripit.com/oauth/request_token",
        &Phase::RequestToken,
        &secrets,
        &[],
    )
    .unwrap();
assert!(signed.authorization.starts_with("OAuth oauth_callback=\"oob\""));
```
*/
mod api;
mod client;
mod config;
mod error;
mod exchange;
mod parameters;
mod request;
mod secrets;
mod session;
mod signer;
mod store;
mod token_reader;

// exposed to external program
pub use api::{TripItApi, TripQuery};
pub use client::Client;
pub use config::{
    Config, ConfigError, API_BASE_VAR, CONSUMER_KEY_VAR, CONSUMER_SECRET_VAR, DEFAULT_API_BASE,
    DEFAULT_AUTHORIZE_URL, DEFAULT_TIMEOUT, OAUTH_TOKEN_SECRET_VAR, OAUTH_TOKEN_VAR, TIMEOUT_VAR,
};
pub use error::{AuthProtocolError, AuthResult, Error, Result, SignError, SignResult};
pub use exchange::{HandshakeStep, TokenExchange};
pub use parameters::{OAuthKey, OAuthParameters, Phase};
pub use request::{render_header, RequestBuilder, SignedRequest};
pub use secrets::{Credentials, SecretsProvider, TokenPair};
pub use session::TripIt;
pub use signer::{normalize_parameters, percent_encode, signature_base_string, signing_key, Signer};
pub use store::{AuthState, CredentialStore};
pub use token_reader::{TokenReader, TokenResponse};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// The out-of-band callback value TripIt expects.
pub const OOB_CALLBACK: &str = "oob";
/// The only signature method supported.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// Value of `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

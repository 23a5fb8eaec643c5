use std::sync::Arc;

use serde_json::Value;

use crate::{
    AuthState, Client, Config, CredentialStore, Result, TokenExchange, TokenResponse, TripItApi,
};

/// Everything a tool-serving layer needs, wired to one credential store.
#[derive(Debug, Clone)]
pub struct TripIt {
    store: Arc<CredentialStore>,
    exchange: TokenExchange,
    api: TripItApi,
}

impl TripIt {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::new(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Builds on a prepared [`Client`], e.g. one with pinned nonces.
    pub fn with_client(config: Config, client: Client) -> Self {
        let store = Arc::new(CredentialStore::with_consumer(config.credentials()));
        let exchange = TokenExchange::new(client.clone(), Arc::clone(&store), &config);
        let api = TripItApi::new(client, Arc::clone(&store), Arc::new(config));
        TripIt {
            store,
            exchange,
            api,
        }
    }

    pub async fn obtain_request_token(&self) -> Result<TokenResponse> {
        self.exchange.obtain_request_token().await
    }

    pub fn build_authorize_url(&self, request_token: &str) -> String {
        self.exchange.build_authorize_url(request_token)
    }

    pub async fn exchange_for_access_token(
        &self,
        request_token: &str,
        request_token_secret: &str,
    ) -> Result<TokenResponse> {
        self.exchange
            .exchange_for_access_token(request_token, request_token_secret)
            .await
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub async fn fetch<I, K, V>(&self, path: &str, params: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.api.fetch(path, params).await
    }

    pub fn state(&self) -> AuthState {
        self.store.state()
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn exchange(&self) -> &TokenExchange {
        &self.exchange
    }

    pub fn api(&self) -> &TripItApi {
        &self.api
    }
}

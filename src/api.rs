use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::Expect;
use crate::{Client, Config, CredentialStore, Error, Phase, Result};

const LIST_TRIP_PATH: &str = "/v1/list/trip";
const GET_TRIP_PATH: &str = "/v1/get/trip";
const TRIP_KEY: &str = "Trip";

/// Filters for [`TripItApi::list_trips`]. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub include_objects: bool,
}

impl Default for TripQuery {
    fn default() -> Self {
        TripQuery {
            start_date: None,
            end_date: None,
            include_objects: true,
        }
    }
}

impl TripQuery {
    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("format".to_string(), "json".to_string())];
        if self.include_objects {
            params.push(("include_objects".to_string(), "true".to_string()));
        }
        if let Some(start) = &self.start_date {
            params.push(("start_date".to_string(), start.clone()));
        }
        if let Some(end) = &self.end_date {
            params.push(("end_date".to_string(), end.clone()));
        }
        params
    }
}

/// Signed read access to TripIt's REST API.
///
/// Trip documents are passed through as raw JSON.
#[derive(Debug, Clone)]
pub struct TripItApi {
    client: Client,
    store: Arc<CredentialStore>,
    config: Arc<Config>,
}

impl TripItApi {
    pub fn new(client: Client, store: Arc<CredentialStore>, config: Arc<Config>) -> Self {
        TripItApi {
            client,
            store,
            config,
        }
    }

    /// Signed `GET` of `path` (e.g. `/v1/list/trip`) with `params` as query.
    ///
    /// Anything but `200 OK` is returned as [`Error::Api`] with the raw body;
    /// nothing is retried here.
    pub async fn fetch<I, K, V>(&self, path: &str, params: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let credentials = self.store.get().ok_or(Error::NotAuthenticated)?;
        let params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let url = self.config.api_url(path);

        let response = self
            .client
            .signed_get(&url, &Phase::Resource, &credentials, &params, Expect::Json)?
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, path, "TripIt API response");

        if status != StatusCode::OK {
            warn!(%status, path, "TripIt API call failed");
            return Err(Error::Api { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Trips matching `query`, always as a list.
    pub async fn list_trips(&self, query: &TripQuery) -> Result<Vec<Value>> {
        let response = self.fetch(LIST_TRIP_PATH, query.to_params()).await?;
        Ok(trips_of(response))
    }

    /// One trip by id.
    pub async fn get_trip(&self, trip_id: &str, include_objects: bool) -> Result<Value> {
        let mut params = vec![("format", "json"), ("id", trip_id)];
        if include_objects {
            params.push(("include_objects", "true"));
        }
        let mut response = self.fetch(GET_TRIP_PATH, params).await?;
        match response.get_mut(TRIP_KEY).map(Value::take) {
            Some(Value::Null) | None => Err(Error::TripNotFound(trip_id.to_string())),
            Some(trip) => Ok(trip),
        }
    }

    /// Confirms the stored tokens are accepted, returning the number of trips.
    pub async fn verify(&self) -> Result<usize> {
        let query = TripQuery {
            include_objects: false,
            ..Default::default()
        };
        Ok(self.list_trips(&query).await?.len())
    }
}

/// TripIt answers with a bare object when there is exactly one trip.
fn trips_of(mut response: Value) -> Vec<Value> {
    match response.get_mut(TRIP_KEY).map(Value::take) {
        Some(Value::Array(trips)) => trips,
        Some(Value::Null) | None => Vec::new(),
        Some(trip) => vec![trip],
    }
}

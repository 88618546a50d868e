use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::trace;

use crate::config::AppConfig;
use crate::errors::{is_unavailable_status, AppError, AppResult, GeocodeError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// `Ok(None)` means the provider had no match.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Location>, GeocodeError>;
}

pub struct NominatimClient {
    http: Client,
    search_url: Url,
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        let search_url = Url::parse(&format!("{}/search", base_url.trim_end_matches('/')))
            .map_err(|err| AppError::Config(format!("invalid geocoder base url: {err}")))?;
        Ok(Self { http, search_url })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(
            &config.geocoder_base_url,
            &config.user_agent,
            config.request_timeout(),
        )
    }
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(deserialize_with = "de_coordinate")]
    lat: f64,
    #[serde(deserialize_with = "de_coordinate")]
    lon: f64,
}

fn de_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Option<Location>, GeocodeError> {
        let response = self
            .http
            .get(self.search_url.clone())
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if is_unavailable_status(status) {
            return Err(GeocodeError::Unavailable(status.to_string()));
        }
        let response = response.error_for_status()?;

        let hits: Vec<SearchHit> = response.json().await?;
        trace!(query, hits = hits.len(), "geocoder responded");

        Ok(hits.into_iter().next().map(|hit| Location {
            latitude: hit.lat,
            longitude: hit.lon,
        }))
    }
}

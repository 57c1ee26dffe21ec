//! Open-Meteo geocoding client
//!
//! Resolves a free-text place name to coordinates.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::Coordinates;
use crate::service::cache::UpstreamCache;

const GEOCODING_API_URL: &str = "https://geocoding-api.open-meteo.com/v1";
const ENV_GEOCODING_BASE_URL: &str = "GEOCODING_BASE_URL";

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Could not find coordinates for: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Place name to coordinate resolution
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Coordinates, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    latitude: f64,
    longitude: f64,
}

/// Client for the Open-Meteo geocoding API, with an optional cache in front
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    cache: Option<UpstreamCache>,
}

impl GeocodingClient {
    /// Create a new geocoding client
    ///
    /// The base URL is resolved in this order:
    /// 1. `GEOCODING_BASE_URL` environment variable if set
    /// 2. Default Open-Meteo geocoding URL
    pub fn new(timeout: Duration, cache: Option<UpstreamCache>) -> Self {
        let base_url =
            env::var(ENV_GEOCODING_BASE_URL).unwrap_or_else(|_| GEOCODING_API_URL.to_string());

        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            cache,
        }
    }

    fn first_result(place: &str, response: SearchResponse) -> Result<Coordinates, GeocodeError> {
        response
            .results
            .into_iter()
            .next()
            .map(|r| Coordinates::new(r.latitude, r.longitude))
            .ok_or_else(|| GeocodeError::NotFound(place.to_string()))
    }

    async fn lookup(&self, place: &str) -> Result<Coordinates, GeocodeError> {
        let url = format!("{}/search", self.base_url);

        tracing::debug!(place = %place, url = %url, "Geocoding place");

        let response = self
            .client
            .get(&url)
            .query(&[("name", place), ("count", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::ParseError(format!(
                "Unexpected status {}: {}",
                status, body
            )));
        }

        let search: SearchResponse = response.json().await.map_err(|e| {
            GeocodeError::ParseError(format!("Failed to deserialize geocoding response: {}", e))
        })?;

        Self::first_result(place, search)
    }
}

#[async_trait]
impl Geocoder for GeocodingClient {
    async fn geocode(&self, place: &str) -> Result<Coordinates, GeocodeError> {
        if let Some(cache) = &self.cache {
            match cache.get_coordinates(place).await {
                Ok(coords) => {
                    tracing::debug!(place = %place, "Geocoding cache hit");
                    return Ok(coords);
                }
                Err(e) => tracing::debug!(place = %place, error = %e, "Geocoding cache miss"),
            }
        }

        let coords = self.lookup(place).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_coordinates(place, &coords).await {
                tracing::warn!(place = %place, error = %e, "Failed to cache coordinates");
            }
        }

        tracing::debug!(place = %place, lat = coords.lat, lon = coords.lon, "Geocoded place");
        Ok(coords)
    }
}

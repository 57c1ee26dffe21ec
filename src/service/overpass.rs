//! OpenStreetMap Overpass API client
//!
//! Geospatial index of hospitals, clinics and doctors.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Coordinates, FacilityFilter, RawFacility};
use crate::retriever::RetrieverError;

const OVERPASS_API_URL: &str = "https://overpass-api.de/api/interpreter";
const ENV_OVERPASS_URL: &str = "OVERPASS_URL";

/// Server-side query timeout passed inside the Overpass QL
const QUERY_TIMEOUT_SECS: u64 = 25;

/// Facility lookup around a point
#[async_trait]
pub trait FacilityIndex: Send + Sync {
    async fn query(
        &self,
        center: Coordinates,
        radius_km: f64,
        filter: &FacilityFilter,
    ) -> Result<Vec<RawFacility>, RetrieverError>;
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl OverpassElement {
    fn coordinates(&self) -> Option<Coordinates> {
        let (lat, lon) = if self.element_type == "node" {
            (self.lat, self.lon)
        } else {
            let center = self.center.as_ref()?;
            (center.lat, center.lon)
        };
        Some(Coordinates::new(lat?, lon?))
    }

    fn into_raw(mut self) -> RawFacility {
        let coordinates = self.coordinates();
        let mut tag = |key: &str| self.tags.remove(key);

        RawFacility {
            name: tag("name"),
            amenity: tag("amenity"),
            street: tag("addr:street"),
            city: tag("addr:city"),
            phone: tag("phone"),
            website: tag("website"),
            emergency: tag("emergency"),
            coordinates,
        }
    }
}

/// Client for the Overpass interpreter endpoint
pub struct OverpassClient {
    client: Client,
    base_url: String,
}

impl OverpassClient {
    /// Create a new Overpass client
    ///
    /// The interpreter URL is taken from `OVERPASS_URL` when set.
    pub fn new(timeout: Duration) -> Self {
        let base_url = env::var(ENV_OVERPASS_URL).unwrap_or_else(|_| OVERPASS_API_URL.to_string());

        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
        }
    }

    /// Build the Overpass QL query for a filter
    fn build_query(center: Coordinates, radius_km: f64, filter: &FacilityFilter) -> String {
        let radius_m = (radius_km * 1000.0).round() as u64;
        let around = format!("(around:{},{},{})", radius_m, center.lat, center.lon);

        let selectors: Vec<(&str, &str)> = match filter {
            FacilityFilter::Emergency => vec![("node", "hospital"), ("way", "hospital")],
            FacilityFilter::Any | FacilityFilter::Specialty(_) => vec![
                ("node", "hospital"),
                ("way", "hospital"),
                ("node", "clinic"),
                ("way", "clinic"),
                ("node", "doctors"),
            ],
        };

        let extra = match filter {
            FacilityFilter::Specialty(specialty) => {
                let cleaned: String = specialty
                    .chars()
                    .filter(|c| *c != '"' && *c != '\\')
                    .collect();
                format!("[\"healthcare:speciality\"~\"{}\",i]", cleaned)
            }
            _ => String::new(),
        };

        let mut query = format!("[out:json][timeout:{}];\n(\n", QUERY_TIMEOUT_SECS);
        for (kind, amenity) in selectors {
            query.push_str(&format!(
                "  {}[\"amenity\"=\"{}\"]{}{};\n",
                kind, amenity, extra, around
            ));
        }
        query.push_str(");\nout center;\n");
        query
    }
}

#[async_trait]
impl FacilityIndex for OverpassClient {
    async fn query(
        &self,
        center: Coordinates,
        radius_km: f64,
        filter: &FacilityFilter,
    ) -> Result<Vec<RawFacility>, RetrieverError> {
        let query = Self::build_query(center, radius_km, filter);

        tracing::debug!(lat = center.lat, lon = center.lon, radius_km, filter = ?filter, "Querying Overpass");

        let response = self
            .client
            .post(&self.base_url)
            .form(&[("data", query)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Overpass rate limited");
            return Err(RetrieverError::RateLimited);
        }

        if !response.status().is_success() {
            return Err(RetrieverError::ParseError(format!(
                "HTTP {}: {}",
                response.status(),
                self.base_url
            )));
        }

        let body: OverpassResponse = response.json().await.map_err(|e| {
            RetrieverError::ParseError(format!("Failed to deserialize Overpass response: {}", e))
        })?;

        Ok(body.elements.into_iter().map(OverpassElement::into_raw).collect())
    }
}

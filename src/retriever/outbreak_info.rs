//! outbreak.info genomic surveillance lookup

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{OutbreakFeed, RetrieverError, build_client};
use crate::model::{OutbreakRecord, OutbreakSource};

const OUTBREAK_INFO_API_URL: &str = "https://api.outbreak.info";
const ENV_OUTBREAK_INFO_BASE_URL: &str = "OUTBREAK_INFO_BASE_URL";
const OUTBREAK_INFO_SITE: &str = "https://outbreak.info";
const SEVERITY_LABEL: &str = "ongoing_surveillance";

#[derive(Debug, Deserialize)]
struct LocationLookupResponse {
    #[serde(default)]
    results: Vec<LocationResult>,
}

#[derive(Debug, Deserialize)]
struct LocationResult {
    name: Option<String>,
    total_count: Option<u64>,
    date_modified: Option<String>,
}

/// Retriever for COVID-19 surveillance coverage of a location
pub struct OutbreakInfoRetriever {
    client: Client,
    base_url: String,
}

impl OutbreakInfoRetriever {
    /// Create a new outbreak.info retriever
    ///
    /// The API URL is taken from `OUTBREAK_INFO_BASE_URL` when set.
    pub fn new(timeout: Duration) -> Self {
        let base_url = env::var(ENV_OUTBREAK_INFO_BASE_URL)
            .unwrap_or_else(|_| OUTBREAK_INFO_API_URL.to_string());

        Self {
            client: build_client(timeout),
            base_url,
        }
    }

    /// Only the first matching location becomes a record
    fn to_record(location: &str, response: LocationLookupResponse) -> Option<OutbreakRecord> {
        let result = response.results.into_iter().next()?;
        let name = result.name.unwrap_or_else(|| location.to_string());

        let mut record = OutbreakRecord::new(
            OutbreakSource::OutbreakInfo,
            "COVID-19",
            format!("COVID-19 genomic surveillance: {}", name),
            OUTBREAK_INFO_SITE,
            result.date_modified.unwrap_or_default(),
            SEVERITY_LABEL,
        );
        record.location = Some(name);
        record.total_sequences = Some(result.total_count.unwrap_or(0));
        record.domain = super::source_domain(OUTBREAK_INFO_SITE);
        Some(record)
    }
}

#[async_trait]
impl OutbreakFeed for OutbreakInfoRetriever {
    fn source(&self) -> OutbreakSource {
        OutbreakSource::OutbreakInfo
    }

    async fn fetch(&self, location: &str) -> Result<Vec<OutbreakRecord>, RetrieverError> {
        let url = format!("{}/genomics/location-lookup", self.base_url);

        tracing::debug!(location = %location, url = %url, "Looking up outbreak.info surveillance");

        let response = self
            .client
            .get(&url)
            .query(&[("name", location), ("cumulative", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "outbreak.info lookup returned no data");
            return Ok(vec![]);
        }

        let lookup: LocationLookupResponse = response.json().await.map_err(|e| {
            RetrieverError::ParseError(format!("Failed to deserialize location lookup: {}", e))
        })?;

        Ok(Self::to_record(location, lookup).into_iter().collect())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::model::Coordinates;

/// Upstream feed an outbreak record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OutbreakSource {
    #[serde(rename = "WHO")]
    Who,
    #[serde(rename = "GDELT")]
    Gdelt,
    OutbreakInfo,
}

impl OutbreakSource {
    /// Human readable feed name reported in `sources_queried`
    pub fn display_name(&self) -> &'static str {
        match self {
            OutbreakSource::Who => "WHO Disease Outbreak News",
            OutbreakSource::Gdelt => "GDELT Disease Events",
            OutbreakSource::OutbreakInfo => "outbreak.info",
        }
    }
}

impl fmt::Display for OutbreakSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OutbreakRecord {
    pub source: OutbreakSource,
    pub disease: String,
    pub title: String,
    pub url: String,
    pub published_date: String,
    /// Free-text classification such as `official_who_report` or `news_mention`
    pub severity_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sequences: Option<u64>,
}

impl OutbreakRecord {
    pub fn new(
        source: OutbreakSource,
        disease: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        published_date: impl Into<String>,
        severity_label: impl Into<String>,
    ) -> Self {
        Self {
            source,
            disease: disease.into(),
            title: title.into(),
            url: url.into(),
            published_date: published_date.into(),
            severity_label: severity_label.into(),
            description: None,
            domain: None,
            language: None,
            location: None,
            total_sequences: None,
        }
    }
}

/// Aggregated outbreak context for a location
///
/// An empty `outbreaks` list with `status: success` is the common case and
/// means no data was reported, not that the lookup failed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutbreakResult {
    pub status: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub timestamp: DateTime<Utc>,
    pub outbreaks: Vec<OutbreakRecord>,
    pub outbreak_count: usize,
    pub sources_queried: Vec<String>,
    /// Sources that failed or timed out and contributed nothing
    pub degraded_sources: Vec<String>,
    pub note: String,
}

/// Web search hints for outbreak reports not covered by the feeds
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OutbreakSearchHints {
    pub status: String,
    pub location: String,
    pub search_query: String,
    pub recommended_sources: Vec<String>,
}

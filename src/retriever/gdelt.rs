//! GDELT news event search for disease mentions near a location

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::{OutbreakFeed, RetrieverError, build_client};
use crate::model::{OutbreakRecord, OutbreakSource};

const GDELT_DOC_API_URL: &str = "https://api.gdeltproject.org/api/v2/doc/doc";
const ENV_GDELT_BASE_URL: &str = "GDELT_BASE_URL";

/// Keywords searched together with the location, in order
const DISEASE_KEYWORDS: &[&str] = &["outbreak", "epidemic", "disease"];
const MAX_RECORDS_PER_QUERY: &str = "5";
const ARTICLES_PER_KEYWORD: usize = 3;
const LOOKBACK_DAYS: i64 = 30;
const SEVERITY_LABEL: &str = "news_mention";

// Response models - only the fields we need
#[derive(Debug, Deserialize)]
struct ArticleListResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    seendate: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

/// Retriever searching GDELT news coverage for disease keywords
pub struct GdeltRetriever {
    client: Client,
    base_url: String,
}

impl GdeltRetriever {
    /// Create a new GDELT retriever
    ///
    /// The API URL is taken from `GDELT_BASE_URL` when set.
    pub fn new(timeout: Duration) -> Self {
        let base_url =
            env::var(ENV_GDELT_BASE_URL).unwrap_or_else(|_| GDELT_DOC_API_URL.to_string());

        Self {
            client: build_client(timeout),
            base_url,
        }
    }

    /// Search window as GDELT `YYYYMMDDhhmmss` bounds
    fn date_range(now: DateTime<Utc>) -> (String, String) {
        let start = now - chrono::Duration::days(LOOKBACK_DAYS);
        (
            format!("{}000000", start.format("%Y%m%d")),
            format!("{}235959", now.format("%Y%m%d")),
        )
    }

    fn to_records(keyword: &str, response: ArticleListResponse) -> Vec<OutbreakRecord> {
        response
            .articles
            .into_iter()
            .take(ARTICLES_PER_KEYWORD)
            .map(|article| {
                let mut record = OutbreakRecord::new(
                    OutbreakSource::Gdelt,
                    title_case(keyword),
                    article.title,
                    article.url,
                    article.seendate,
                    SEVERITY_LABEL,
                );
                record.domain = article.domain.filter(|d| !d.is_empty());
                record.language = article.language.filter(|l| !l.is_empty());
                record
            })
            .collect()
    }

    async fn search_keyword(
        &self,
        keyword: &str,
        location: &str,
        range: &(String, String),
    ) -> Result<Vec<OutbreakRecord>, RetrieverError> {
        let query = format!("{} {}", keyword, location);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("query", query.as_str()),
                ("mode", "artlist"),
                ("maxrecords", MAX_RECORDS_PER_QUERY),
                ("format", "json"),
                ("startdatetime", range.0.as_str()),
                ("enddatetime", range.1.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(keyword = %keyword, status = %response.status(), "GDELT query returned non-success status, skipping");
            return Ok(vec![]);
        }

        let body = response.text().await?;
        match serde_json::from_str::<ArticleListResponse>(&body) {
            Ok(list) => Ok(Self::to_records(keyword, list)),
            Err(e) => {
                tracing::debug!(keyword = %keyword, error = %e, "GDELT response was not an article list, skipping");
                Ok(vec![])
            }
        }
    }
}

#[async_trait]
impl OutbreakFeed for GdeltRetriever {
    fn source(&self) -> OutbreakSource {
        OutbreakSource::Gdelt
    }

    async fn fetch(&self, location: &str) -> Result<Vec<OutbreakRecord>, RetrieverError> {
        let range = Self::date_range(Utc::now());
        let mut records = Vec::new();

        // Sequential to stay under GDELT rate limits
        for keyword in DISEASE_KEYWORDS {
            records.extend(self.search_keyword(keyword, location, &range).await?);
        }

        tracing::debug!(location = %location, count = records.len(), "GDELT search complete");
        Ok(records)
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Outbreak feed retrievers for the independent upstream surveillance sources

mod gdelt;
mod outbreak_info;
mod who;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::model::{OutbreakRecord, OutbreakSource};

pub use gdelt::GdeltRetriever;
pub use outbreak_info::OutbreakInfoRetriever;
pub use who::WhoFeedRetriever;

const USER_AGENT: &str = "EcoGuardian/1.0";

#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for outbreak feeds
///
/// Each feed applies its own location matching. An empty vector means the
/// feed had nothing for the location; an error means the feed is unavailable.
#[async_trait]
pub trait OutbreakFeed: Send + Sync {
    /// Fetch records mentioning the location
    async fn fetch(&self, location: &str) -> Result<Vec<OutbreakRecord>, RetrieverError>;

    /// Get the feed source
    fn source(&self) -> OutbreakSource;
}

/// Build an HTTP client with the shared user agent and a request timeout
fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Extract the host of a record URL
fn source_domain(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

/// Flatten an HTML fragment to its text content
fn strip_html(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters, on a char boundary
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        let text = strip_html("<p>Cholera <b>outbreak</b>\n in   Haiti</p>");
        assert_eq!(text, "Cholera outbreak in Haiti");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("Côte d'Ivoire", 3), "Côt");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_source_domain() {
        assert_eq!(
            source_domain("https://www.who.int/emergencies/disease-outbreak-news/item/x").as_deref(),
            Some("www.who.int")
        );
        assert_eq!(source_domain("not a url"), None);
    }
}

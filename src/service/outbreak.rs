//! Outbreak aggregation across independent surveillance feeds
//!
//! Feeds are queried concurrently, each under its own timeout, and joined
//! positionally so records keep feed-priority order regardless of arrival.
//! A failing feed contributes nothing; it never fails the aggregate.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;

use crate::model::{OutbreakRecord, OutbreakResult, OutbreakSearchHints};
use crate::retriever::{
    GdeltRetriever, OutbreakFeed, OutbreakInfoRetriever, RetrieverError, WhoFeedRetriever,
};
use crate::service::cache::UpstreamCache;
use crate::service::geocoding::Geocoder;

const AGGREGATE_NOTE: &str = "Data aggregated from multiple public health surveillance sources.";

const SEARCH_SITES: &str = "site:who.int OR site:cdc.gov OR site:healthmap.org";

const RECOMMENDED_SOURCES: &[&str] = &[
    "https://www.who.int/emergencies/disease-outbreak-news",
    "https://www.cdc.gov/outbreaks/",
    "https://www.healthmap.org/",
    "https://www.promedmail.org/",
];

/// Build web search hints for outbreak reports. Pure, no network.
pub fn search_hints(location: &str, disease: Option<&str>) -> OutbreakSearchHints {
    let subject = disease
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("disease");

    OutbreakSearchHints {
        status: "success".to_string(),
        location: location.to_string(),
        search_query: format!("{} outbreak {} {}", subject, location, SEARCH_SITES),
        recommended_sources: RECOMMENDED_SOURCES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Aggregates outbreak records from feeds in priority order
pub struct OutbreakAggregator {
    feeds: Vec<Arc<dyn OutbreakFeed>>,
    geocoder: Arc<dyn Geocoder>,
    source_timeout: Duration,
    cache: Option<UpstreamCache>,
}

impl OutbreakAggregator {
    pub fn new(
        feeds: Vec<Arc<dyn OutbreakFeed>>,
        geocoder: Arc<dyn Geocoder>,
        source_timeout: Duration,
        cache: Option<UpstreamCache>,
    ) -> Self {
        Self {
            feeds,
            geocoder,
            source_timeout,
            cache,
        }
    }

    /// Aggregator over the WHO feed, GDELT news search and outbreak.info, in that order
    pub fn with_default_feeds(
        geocoder: Arc<dyn Geocoder>,
        source_timeout: Duration,
        cache: Option<UpstreamCache>,
    ) -> Self {
        let feeds: Vec<Arc<dyn OutbreakFeed>> = vec![
            Arc::new(WhoFeedRetriever::new(source_timeout)),
            Arc::new(GdeltRetriever::new(source_timeout)),
            Arc::new(OutbreakInfoRetriever::new(source_timeout)),
        ];
        Self::new(feeds, geocoder, source_timeout, cache)
    }

    /// Collect outbreak context for a location
    ///
    /// Always succeeds. Geocoding is best effort: all feeds are text based
    /// and proceed without coordinates.
    pub async fn aggregate(&self, location: &str) -> OutbreakResult {
        if let Some(cache) = &self.cache {
            match cache.get_outbreaks(location).await {
                Ok(cached) => {
                    tracing::debug!(location = %location, "Outbreak cache hit");
                    return cached;
                }
                Err(e) => tracing::debug!(location = %location, error = %e, "Outbreak cache miss"),
            }
        }

        let geocode = self.geocoder.geocode(location);
        let fetches = join_all(self.feeds.iter().map(|feed| self.fetch_from(feed.as_ref(), location)));
        let (coordinates, contributions) = futures::join!(geocode, fetches);

        let coordinates = match coordinates {
            Ok(coords) => Some(coords),
            Err(e) => {
                tracing::warn!(location = %location, error = %e, "Geocoding failed, continuing with text-based sources");
                None
            }
        };

        let mut outbreaks: Vec<OutbreakRecord> = Vec::new();
        let mut degraded_sources = Vec::new();
        for (feed, contribution) in self.feeds.iter().zip(contributions) {
            match contribution {
                Ok(records) => outbreaks.extend(records),
                Err(_) => degraded_sources.push(feed.source().display_name().to_string()),
            }
        }

        tracing::info!(
            location = %location,
            outbreak_count = outbreaks.len(),
            degraded = degraded_sources.len(),
            "Outbreak context aggregated"
        );

        let result = OutbreakResult {
            status: "success".to_string(),
            location: location.to_string(),
            coordinates,
            timestamp: Utc::now(),
            outbreak_count: outbreaks.len(),
            outbreaks,
            sources_queried: self
                .feeds
                .iter()
                .map(|f| f.source().display_name().to_string())
                .collect(),
            degraded_sources,
            note: AGGREGATE_NOTE.to_string(),
        };

        // Degraded aggregates are not cached so a recovered feed is seen next time
        if let Some(cache) = &self.cache {
            if result.degraded_sources.is_empty() {
                if let Err(e) = cache.set_outbreaks(location, &result).await {
                    tracing::warn!(location = %location, error = %e, "Failed to cache outbreak context");
                }
            }
        }

        result
    }

    async fn fetch_from(
        &self,
        feed: &dyn OutbreakFeed,
        location: &str,
    ) -> Result<Vec<OutbreakRecord>, RetrieverError> {
        let source = feed.source();

        let outcome = match tokio::time::timeout(self.source_timeout, feed.fetch(location)).await {
            Ok(result) => result,
            Err(_) => Err(RetrieverError::Timeout(self.source_timeout)),
        };

        match &outcome {
            Ok(records) => {
                tracing::debug!(source = %source, count = records.len(), "Outbreak source responded");
            }
            Err(RetrieverError::RateLimited) => {
                tracing::warn!(source = %source, "Outbreak source rate limited, skipping");
            }
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "Outbreak source unavailable, skipping");
            }
        }

        outcome
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::model::{Coordinates, OutbreakSource};
    use crate::service::facility::tests::FixedGeocoder;

    pub(crate) enum Behavior {
        Records(Vec<OutbreakRecord>),
        Fail,
        Hang,
    }

    pub(crate) struct FakeFeed {
        pub source: OutbreakSource,
        pub behavior: Behavior,
        pub delay: Duration,
        pub calls: AtomicUsize,
    }

    impl FakeFeed {
        pub fn new(source: OutbreakSource, behavior: Behavior) -> Self {
            Self {
                source,
                behavior,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl OutbreakFeed for FakeFeed {
        fn source(&self) -> OutbreakSource {
            self.source
        }

        async fn fetch(&self, _location: &str) -> Result<Vec<OutbreakRecord>, RetrieverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.behavior {
                Behavior::Records(records) => Ok(records.clone()),
                Behavior::Fail => Err(RetrieverError::ParseError("HTTP 500".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(vec![])
                }
            }
        }
    }

    pub(crate) fn record(source: OutbreakSource, title: &str) -> OutbreakRecord {
        OutbreakRecord::new(source, "Cholera", title, "https://example.org", "", "news_mention")
    }

    fn aggregator(feeds: Vec<Arc<dyn OutbreakFeed>>, geocoded: bool) -> OutbreakAggregator {
        let coords = geocoded.then(|| Coordinates::new(18.5, -72.3));
        OutbreakAggregator::new(
            feeds,
            Arc::new(FixedGeocoder(coords)),
            Duration::from_millis(100),
            None,
        )
    }

    #[tokio::test]
    async fn test_priority_order_not_arrival_order() {
        let mut slow_who = FakeFeed::new(
            OutbreakSource::Who,
            Behavior::Records(vec![record(OutbreakSource::Who, "who")]),
        );
        slow_who.delay = Duration::from_millis(40);
        let feeds: Vec<Arc<dyn OutbreakFeed>> = vec![
            Arc::new(slow_who),
            Arc::new(FakeFeed::new(
                OutbreakSource::Gdelt,
                Behavior::Records(vec![
                    record(OutbreakSource::Gdelt, "news 1"),
                    record(OutbreakSource::Gdelt, "news 2"),
                ]),
            )),
            Arc::new(FakeFeed::new(
                OutbreakSource::OutbreakInfo,
                Behavior::Records(vec![record(OutbreakSource::OutbreakInfo, "surveillance")]),
            )),
        ];

        let result = aggregator(feeds, true).aggregate("Haiti").await;
        let titles: Vec<&str> = result.outbreaks.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(titles, vec!["who", "news 1", "news 2", "surveillance"]);
        assert_eq!(result.outbreak_count, 4);
        assert_eq!(
            result.sources_queried,
            vec!["WHO Disease Outbreak News", "GDELT Disease Events", "outbreak.info"]
        );
        assert!(result.degraded_sources.is_empty());
    }

    #[tokio::test]
    async fn test_two_sources_down_still_success() {
        let feeds: Vec<Arc<dyn OutbreakFeed>> = vec![
            Arc::new(FakeFeed::new(OutbreakSource::Who, Behavior::Hang)),
            Arc::new(FakeFeed::new(
                OutbreakSource::Gdelt,
                Behavior::Records(vec![record(OutbreakSource::Gdelt, "survivor")]),
            )),
            Arc::new(FakeFeed::new(OutbreakSource::OutbreakInfo, Behavior::Fail)),
        ];

        let result = aggregator(feeds, true).aggregate("Haiti").await;

        assert_eq!(result.status, "success");
        assert_eq!(result.outbreaks.len(), 1);
        assert_eq!(result.outbreaks[0].title, "survivor");
        assert_eq!(
            result.degraded_sources,
            vec!["WHO Disease Outbreak News", "outbreak.info"]
        );
    }

    #[tokio::test]
    async fn test_duplicates_across_sources_kept() {
        let same = record(OutbreakSource::Who, "Cholera - Haiti");
        let mut same_from_news = same.clone();
        same_from_news.source = OutbreakSource::Gdelt;
        let feeds: Vec<Arc<dyn OutbreakFeed>> = vec![
            Arc::new(FakeFeed::new(OutbreakSource::Who, Behavior::Records(vec![same]))),
            Arc::new(FakeFeed::new(OutbreakSource::Gdelt, Behavior::Records(vec![same_from_news]))),
        ];

        let result = aggregator(feeds, true).aggregate("Haiti").await;
        assert_eq!(result.outbreaks.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_is_success_and_geocode_optional() {
        let feed = Arc::new(FakeFeed::new(OutbreakSource::Who, Behavior::Records(vec![])));
        let feeds: Vec<Arc<dyn OutbreakFeed>> = vec![feed.clone()];

        let result = aggregator(feeds, false).aggregate("Atlantis").await;

        assert_eq!(result.status, "success");
        assert!(result.outbreaks.is_empty());
        assert!(result.coordinates.is_none());
        assert!(result.degraded_sources.is_empty());
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_search_hints() {
        let hints = search_hints("Dhaka", Some("dengue"));
        assert_eq!(
            hints.search_query,
            "dengue outbreak Dhaka site:who.int OR site:cdc.gov OR site:healthmap.org"
        );
        assert_eq!(hints.recommended_sources.len(), 4);

        let generic = search_hints("Dhaka", None);
        assert!(generic.search_query.starts_with("disease outbreak Dhaka"));
    }
}

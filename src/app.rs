//! Application state and service initialization
//!
//! Builds the service graph once at startup. Services are immutable and
//! shared through `Arc`; nothing here is mutated per request.

use std::sync::Arc;

use crate::model::Config;
use crate::service::{
    CareRouter, EnvironmentService, FacilityLocator, Geocoder, GeocodingClient, OutbreakAggregator,
    OverpassClient, SymptomMatcher, UpstreamCache,
};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Redis cache (optional)
    pub cache: Option<UpstreamCache>,
    pub matcher: Arc<SymptomMatcher>,
    pub aggregator: Arc<OutbreakAggregator>,
    pub locator: Arc<FacilityLocator>,
    pub router: Arc<CareRouter>,
    pub environment: Arc<EnvironmentService>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// Redis is optional: when unreachable the service runs uncached.
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        if config.port == 0 {
            return Err(AppError::InvalidConfig("PORT must not be 0"));
        }

        let cache = match UpstreamCache::new().await {
            Ok(cache) => {
                tracing::info!("Redis cache enabled");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
                None
            }
        };

        Ok(Self::build(config, cache))
    }

    /// Build the service dependency graph
    fn build(config: &Config, cache: Option<UpstreamCache>) -> Self {
        let timeouts = &config.timeouts;

        let geocoder: Arc<dyn Geocoder> =
            Arc::new(GeocodingClient::new(timeouts.geocoding(), cache.clone()));

        let matcher = Arc::new(SymptomMatcher::builtin(config.matching.strictness));

        let aggregator = Arc::new(OutbreakAggregator::with_default_feeds(
            Arc::clone(&geocoder),
            timeouts.outbreak_source(),
            cache.clone(),
        ));

        let locator = Arc::new(FacilityLocator::new(
            Arc::clone(&geocoder),
            Arc::new(OverpassClient::new(timeouts.facility_index())),
            timeouts.facility_index(),
        ));

        let router = Arc::new(CareRouter::new(
            Arc::clone(&matcher),
            Arc::clone(&aggregator),
            Arc::clone(&locator),
        ));

        let environment = Arc::new(EnvironmentService::with_default_clients(
            geocoder,
            timeouts.environment(),
        ));

        tracing::info!(
            catalog_size = matcher.catalog().len(),
            strictness = ?config.matching.strictness,
            air_quality = environment.air_quality_enabled(),
            "Services initialized"
        );

        Self {
            cache,
            matcher,
            aggregator,
            locator,
            router,
            environment,
        }
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

//! Environmental signals for a location
//!
//! Thin wrappers: resolve the location, then ask one upstream.

use std::sync::Arc;
use std::time::Duration;

use crate::model::{AirQualityReport, UvIndexReport, WeatherReport};
use crate::service::geocoding::{GeocodeError, Geocoder};
use crate::service::open_meteo::OpenMeteoClient;
use crate::service::openaq::OpenAqClient;

#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Missing OPENAQ_API_KEY")]
    MissingApiKey,

    #[error("{0}")]
    NoData(String),
}

pub struct EnvironmentService {
    geocoder: Arc<dyn Geocoder>,
    open_meteo: OpenMeteoClient,
    openaq: OpenAqClient,
}

impl EnvironmentService {
    pub fn new(geocoder: Arc<dyn Geocoder>, open_meteo: OpenMeteoClient, openaq: OpenAqClient) -> Self {
        Self {
            geocoder,
            open_meteo,
            openaq,
        }
    }

    /// Service over the default upstream clients, all sharing one timeout
    pub fn with_default_clients(geocoder: Arc<dyn Geocoder>, timeout: Duration) -> Self {
        Self::new(
            geocoder,
            OpenMeteoClient::new(timeout),
            OpenAqClient::new(timeout),
        )
    }

    pub fn air_quality_enabled(&self) -> bool {
        self.openaq.has_api_key()
    }

    pub async fn weather(&self, location: &str) -> Result<WeatherReport, EnvironmentError> {
        let coordinates = self.geocoder.geocode(location).await?;
        let current = self.open_meteo.current_weather(coordinates).await?;

        tracing::debug!(location = %location, "Weather fetched");

        Ok(WeatherReport {
            status: "success".to_string(),
            source: "Open-Meteo".to_string(),
            location: location.to_string(),
            coordinates,
            temperature_c: current.temperature_2m,
            humidity: current.relative_humidity_2m,
            wind_speed: current.wind_speed_10m,
            wind_direction: current.wind_direction_10m,
            precipitation_mm: current.precipitation,
            cloud_cover_percent: current.cloud_cover,
            weather_code: current.weather_code,
        })
    }

    pub async fn uv_index(&self, location: &str) -> Result<UvIndexReport, EnvironmentError> {
        let coordinates = self.geocoder.geocode(location).await?;
        let hourly = self.open_meteo.hourly_uv(coordinates).await?;

        Ok(UvIndexReport {
            status: "success".to_string(),
            location: location.to_string(),
            coordinates,
            time: hourly.time,
            uv_index: hourly.uv_index,
            uv_index_clear_sky: hourly.uv_index_clear_sky,
        })
    }

    /// Latest readings from the nearest monitoring station
    ///
    /// Fails with `MissingApiKey` before any upstream call when no key is set.
    pub async fn air_quality(&self, location: &str) -> Result<AirQualityReport, EnvironmentError> {
        if !self.openaq.has_api_key() {
            return Err(EnvironmentError::MissingApiKey);
        }

        let coordinates = self.geocoder.geocode(location).await?;
        let readings = self.openaq.nearest_readings(coordinates).await?;

        tracing::debug!(
            location = %location,
            station_id = readings.station.id,
            pollutants = readings.components.len(),
            "Air quality fetched"
        );

        Ok(AirQualityReport {
            status: "success".to_string(),
            source: "OpenAQ".to_string(),
            location: location.to_string(),
            coordinates,
            station: readings.station,
            components: readings.components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::facility::tests::FixedGeocoder;

    fn service(api_key: Option<&str>) -> EnvironmentService {
        let timeout = Duration::from_secs(1);
        EnvironmentService::new(
            Arc::new(FixedGeocoder(None)),
            OpenMeteoClient::new(timeout),
            OpenAqClient::with_api_key(timeout, api_key.map(str::to_string)),
        )
    }

    #[tokio::test]
    async fn test_unknown_location_is_geocode_error() {
        let service = service(None);

        let weather = service.weather("Atlantis").await;
        assert!(matches!(
            weather,
            Err(EnvironmentError::Geocode(GeocodeError::NotFound(_)))
        ));

        let uv = service.uv_index("Atlantis").await;
        assert!(matches!(uv, Err(EnvironmentError::Geocode(_))));
    }

    #[tokio::test]
    async fn test_air_quality_requires_api_key() {
        let service = service(None);
        assert!(!service.air_quality_enabled());

        let result = service.air_quality("Atlantis").await;
        assert!(matches!(result, Err(EnvironmentError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_air_quality_with_key_geocodes_first() {
        let service = service(Some("test-key"));
        assert!(service.air_quality_enabled());

        let result = service.air_quality("Atlantis").await;
        assert!(matches!(result, Err(EnvironmentError::Geocode(_))));
    }
}

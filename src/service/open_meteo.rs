//! Open-Meteo forecast and air-quality API client
//!
//! Current weather from the forecast API, hourly UV index from the
//! air-quality API. Neither needs an API key.

use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::model::Coordinates;
use crate::service::environment::EnvironmentError;

const FORECAST_API_URL: &str = "https://api.open-meteo.com/v1";
const AIR_QUALITY_API_URL: &str = "https://air-quality-api.open-meteo.com/v1";
const ENV_OPEN_METEO_BASE_URL: &str = "OPEN_METEO_BASE_URL";
const ENV_OPEN_METEO_AIR_QUALITY_URL: &str = "OPEN_METEO_AIR_QUALITY_URL";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,wind_direction_10m,precipitation,weather_code,cloud_cover";

/// Current conditions, numeric values as reported
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentWeather {
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i64>,
    pub cloud_cover: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlyUv {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub uv_index: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index_clear_sky: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    hourly: Option<HourlyUv>,
}

pub struct OpenMeteoClient {
    client: Client,
    forecast_url: String,
    air_quality_url: String,
}

impl OpenMeteoClient {
    /// Create a new Open-Meteo client
    ///
    /// Base URLs come from `OPEN_METEO_BASE_URL` and
    /// `OPEN_METEO_AIR_QUALITY_URL` when set.
    pub fn new(timeout: Duration) -> Self {
        let forecast_url =
            env::var(ENV_OPEN_METEO_BASE_URL).unwrap_or_else(|_| FORECAST_API_URL.to_string());
        let air_quality_url = env::var(ENV_OPEN_METEO_AIR_QUALITY_URL)
            .unwrap_or_else(|_| AIR_QUALITY_API_URL.to_string());

        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            forecast_url,
            air_quality_url,
        }
    }

    pub async fn current_weather(&self, at: Coordinates) -> Result<CurrentWeather, EnvironmentError> {
        let url = format!("{}/forecast", self.forecast_url);

        tracing::debug!(lat = at.lat, lon = at.lon, "Fetching current weather");

        let body = self
            .get_text(
                &url,
                &[
                    ("latitude", at.lat.to_string()),
                    ("longitude", at.lon.to_string()),
                    ("current", CURRENT_FIELDS.to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        parse_current(&body)
    }

    pub async fn hourly_uv(&self, at: Coordinates) -> Result<HourlyUv, EnvironmentError> {
        let url = format!("{}/air-quality", self.air_quality_url);

        tracing::debug!(lat = at.lat, lon = at.lon, "Fetching UV index");

        let body = self
            .get_text(
                &url,
                &[
                    ("latitude", at.lat.to_string()),
                    ("longitude", at.lon.to_string()),
                    ("hourly", "uv_index,uv_index_clear_sky".to_string()),
                ],
            )
            .await?;

        parse_hourly_uv(&body)
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, EnvironmentError> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EnvironmentError::ParseError(format!(
                "Unexpected status {}: {}",
                status, body
            )));
        }

        Ok(response.text().await?)
    }
}

fn parse_current(body: &str) -> Result<CurrentWeather, EnvironmentError> {
    let response: ForecastResponse = serde_json::from_str(body).map_err(|e| {
        EnvironmentError::ParseError(format!("Failed to deserialize forecast response: {}", e))
    })?;
    response
        .current
        .ok_or_else(|| EnvironmentError::NoData("Weather data unavailable".to_string()))
}

fn parse_hourly_uv(body: &str) -> Result<HourlyUv, EnvironmentError> {
    let response: AirQualityResponse = serde_json::from_str(body).map_err(|e| {
        EnvironmentError::ParseError(format!("Failed to deserialize air-quality response: {}", e))
    })?;
    response
        .hourly
        .ok_or_else(|| EnvironmentError::NoData("UV data not available".to_string()))
}

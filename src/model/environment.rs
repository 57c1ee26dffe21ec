use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::Coordinates;

/// Current weather conditions (raw numeric values)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherReport {
    pub status: String,
    pub source: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub temperature_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub cloud_cover_percent: Option<f64>,
    pub weather_code: Option<i64>,
}

/// Hourly UV index forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UvIndexReport {
    pub status: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub time: Vec<String>,
    pub uv_index: Vec<Option<f64>>,
    pub uv_index_clear_sky: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonitoringStation {
    pub id: i64,
    pub name: Option<String>,
    pub country: Option<String>,
}

/// Latest reading for one pollutant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PollutantReading {
    pub value: Option<f64>,
    pub units: String,
    pub datetime_utc: Option<String>,
    pub datetime_local: Option<String>,
    pub sensor_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AirQualityReport {
    pub status: String,
    pub source: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub station: MonitoringStation,
    /// Readings keyed by pollutant name (pm25, pm10, no2, o3, ...)
    pub components: BTreeMap<String, PollutantReading>,
}

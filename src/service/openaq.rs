//! OpenAQ v3 client
//!
//! Finds the nearest monitoring station and reads its latest measurements.
//! Measurements only carry a sensor id, so they are labelled through the
//! station's sensor table.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::model::{Coordinates, MonitoringStation, PollutantReading};
use crate::service::environment::EnvironmentError;

const OPENAQ_API_URL: &str = "https://api.openaq.org/v3";
const ENV_OPENAQ_BASE_URL: &str = "OPENAQ_BASE_URL";
const ENV_OPENAQ_API_KEY: &str = "OPENAQ_API_KEY";
const USER_AGENT: &str = "EcoGuardian/1.0";

/// Station search radius in metres
const STATION_RADIUS_M: u32 = 25_000;

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    #[serde(default)]
    results: Vec<Station>,
}

#[derive(Debug, Deserialize)]
struct Station {
    id: i64,
    name: Option<String>,
    country: Option<Country>,
    #[serde(default)]
    sensors: Vec<Sensor>,
}

#[derive(Debug, Deserialize)]
struct Country {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Sensor {
    id: i64,
    parameter: Parameter,
}

#[derive(Debug, Deserialize)]
struct Parameter {
    name: String,
    units: String,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    results: Vec<Measurement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Measurement {
    sensors_id: Option<i64>,
    value: Option<f64>,
    datetime: Option<MeasurementTime>,
}

#[derive(Debug, Deserialize)]
struct MeasurementTime {
    utc: Option<String>,
    local: Option<String>,
}

/// Nearest station with its labelled latest readings
#[derive(Debug, Clone, PartialEq)]
pub struct StationReadings {
    pub station: MonitoringStation,
    pub components: BTreeMap<String, PollutantReading>,
}

pub struct OpenAqClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAqClient {
    /// Create a new OpenAQ client
    ///
    /// The API key is read from `OPENAQ_API_KEY`; without it every lookup
    /// fails with `MissingApiKey`.
    pub fn new(timeout: Duration) -> Self {
        Self::with_api_key(timeout, env::var(ENV_OPENAQ_API_KEY).ok())
    }

    pub fn with_api_key(timeout: Duration, api_key: Option<String>) -> Self {
        let base_url = env::var(ENV_OPENAQ_BASE_URL).unwrap_or_else(|_| OPENAQ_API_URL.to_string());
        let api_key = api_key.filter(|k| !k.is_empty());

        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn nearest_readings(&self, at: Coordinates) -> Result<StationReadings, EnvironmentError> {
        let api_key = self.api_key.as_deref().ok_or(EnvironmentError::MissingApiKey)?;

        let url = format!("{}/locations", self.base_url);
        tracing::debug!(lat = at.lat, lon = at.lon, "Finding nearest OpenAQ station");

        let body = self
            .get_text(
                &url,
                api_key,
                &[
                    ("coordinates", format!("{},{}", at.lat, at.lon)),
                    ("radius", STATION_RADIUS_M.to_string()),
                    ("limit", "1".to_string()),
                    ("isMonitor", "true".to_string()),
                ],
            )
            .await?;
        let station = parse_nearest_station(&body)?;

        let url = format!("{}/locations/{}/latest", self.base_url, station.id);
        tracing::debug!(station_id = station.id, "Fetching latest OpenAQ readings");

        let body = self.get_text(&url, api_key, &[]).await?;
        label_readings(station, &body)
    }

    async fn get_text(
        &self,
        url: &str,
        api_key: &str,
        query: &[(&str, String)],
    ) -> Result<String, EnvironmentError> {
        let response = self
            .client
            .get(url)
            .header("X-API-Key", api_key)
            .query(query)
            .send()
            .await?;

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

fn parse_nearest_station(body: &str) -> Result<Station, EnvironmentError> {
    let response: LocationsResponse = serde_json::from_str(body).map_err(|e| {
        EnvironmentError::ParseError(format!("Failed to deserialize OpenAQ locations: {}", e))
    })?;
    response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| EnvironmentError::NoData("No monitoring stations nearby".to_string()))
}

fn label_readings(station: Station, body: &str) -> Result<StationReadings, EnvironmentError> {
    let response: LatestResponse = serde_json::from_str(body).map_err(|e| {
        EnvironmentError::ParseError(format!("Failed to deserialize OpenAQ readings: {}", e))
    })?;
    if response.results.is_empty() {
        return Err(EnvironmentError::NoData(format!(
            "No latest data for station {}",
            station.id
        )));
    }

    let sensors: HashMap<i64, &Parameter> =
        station.sensors.iter().map(|s| (s.id, &s.parameter)).collect();

    let mut components = BTreeMap::new();
    for measurement in response.results {
        // Readings from sensors the station does not list are dropped
        let Some(sensor_id) = measurement.sensors_id else {
            continue;
        };
        let Some(parameter) = sensors.get(&sensor_id) else {
            continue;
        };

        let (datetime_utc, datetime_local) = match measurement.datetime {
            Some(t) => (t.utc, t.local),
            None => (None, None),
        };
        components.insert(
            parameter.name.clone(),
            PollutantReading {
                value: measurement.value,
                units: parameter.units.clone(),
                datetime_utc,
                datetime_local,
                sensor_id,
            },
        );
    }

    Ok(StationReadings {
        station: MonitoringStation {
            id: station.id,
            name: station.name,
            country: station.country.and_then(|c| c.name),
        },
        components,
    })
}

//! Care facility locator
//!
//! Resolves the location, queries the facility index around it and ranks
//! candidates by great-circle distance.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::model::{Coordinates, Facility, FacilityFilter, FacilityResult, FacilityType, RawFacility};
use crate::service::geocoding::{GeocodeError, Geocoder};
use crate::service::overpass::FacilityIndex;

/// Fixed search radius around the resolved location
pub const SEARCH_RADIUS_KM: f64 = 10.0;
/// Raw index candidates considered before ranking
const MAX_RAW_CANDIDATES: usize = 10;
/// Facilities returned after ranking
pub const MAX_FACILITIES: usize = 5;

const EARTH_RADIUS_KM: f64 = 6371.0;

const DEFAULT_EMERGENCY_NUMBER: &str = "112";

/// Emergency numbers keyed by a name expected to appear in the location text.
/// Checked in order with a case-insensitive substring test.
const EMERGENCY_NUMBERS: &[(&str, &str)] = &[
    ("US", "911"),
    ("UK", "999 or 112"),
    ("EU", "112"),
    ("India", "102 (Ambulance), 108 (Emergency)"),
    ("China", "120"),
    ("Japan", "119"),
    ("Australia", "000"),
    ("Singapore", "995"),
    ("UAE", "998 or 999"),
];

const UNNAMED_FACILITY: &str = "Unnamed Healthcare Facility";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum FacilityError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

/// Resolve the emergency number for a free-text location
///
/// Best effort: the first table key contained in the location wins, so a
/// location that never names its country falls back to 112.
pub fn emergency_number(location: &str) -> String {
    let location_lower = location.to_lowercase();
    EMERGENCY_NUMBERS
        .iter()
        .find(|(key, _)| location_lower.contains(&key.to_lowercase()))
        .map(|(_, number)| number.to_string())
        .unwrap_or_else(|| DEFAULT_EMERGENCY_NUMBER.to_string())
}

/// Great-circle distance in kilometres (Haversine)
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let (lat1, lon1) = (from.lat.to_radians(), from.lon.to_radians());
    let (lat2, lon2) = (to.lat.to_radians(), to.lon.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rank raw candidates by distance from `center`
///
/// Only the first index candidates are considered; candidates without
/// coordinates are dropped. Result is sorted ascending and not truncated.
pub fn rank_facilities(center: Coordinates, raw: Vec<RawFacility>) -> Vec<Facility> {
    let mut facilities: Vec<Facility> = raw
        .into_iter()
        .take(MAX_RAW_CANDIDATES)
        .filter_map(|r| to_facility(center, r))
        .collect();

    facilities.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    facilities
}

fn to_facility(center: Coordinates, raw: RawFacility) -> Option<Facility> {
    let coordinates = raw.coordinates?;
    let distance = haversine_km(center, coordinates);

    let address = format!(
        "{} {}",
        raw.street.unwrap_or_default(),
        raw.city.unwrap_or_default()
    )
    .trim()
    .to_string();

    Some(Facility {
        name: raw.name.unwrap_or_else(|| UNNAMED_FACILITY.to_string()),
        facility_type: FacilityType::from_amenity(raw.amenity.as_deref()),
        address,
        coordinates,
        distance_km: (distance * 100.0).round() / 100.0,
        // An untagged facility is assumed to take emergencies
        emergency_capable: raw.emergency.as_deref().unwrap_or("yes") == "yes",
        phone: raw.phone.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        website: raw.website.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    })
}

/// Facility locator over a geocoder and a facility index
pub struct FacilityLocator {
    geocoder: Arc<dyn Geocoder>,
    index: Arc<dyn FacilityIndex>,
    index_timeout: Duration,
}

impl FacilityLocator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        index: Arc<dyn FacilityIndex>,
        index_timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            index,
            index_timeout,
        }
    }

    /// Find the nearest care facilities for a location
    ///
    /// Fails only when the location cannot be geocoded. An unavailable or
    /// slow facility index degrades to an empty facility list.
    pub async fn locate(
        &self,
        location: &str,
        specialty: Option<&str>,
    ) -> Result<FacilityResult, FacilityError> {
        let center = self.geocoder.geocode(location).await?;
        let filter = FacilityFilter::from_specialty(specialty);

        Ok(self.locate_near(location, center, &filter).await)
    }

    /// Rank facilities around already-resolved coordinates
    pub async fn locate_near(
        &self,
        location: &str,
        center: Coordinates,
        filter: &FacilityFilter,
    ) -> FacilityResult {
        let raw = match tokio::time::timeout(
            self.index_timeout,
            self.index.query(center, SEARCH_RADIUS_KM, filter),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(location = %location, error = %e, "Facility index unavailable, returning no facilities");
                vec![]
            }
            Err(_) => {
                tracing::warn!(location = %location, timeout = ?self.index_timeout, "Facility index timed out, returning no facilities");
                vec![]
            }
        };

        let mut facilities = rank_facilities(center, raw);
        let facilities_found = facilities.len();
        facilities.truncate(MAX_FACILITIES);

        tracing::debug!(
            location = %location,
            found = facilities_found,
            returned = facilities.len(),
            "Facilities ranked"
        );

        FacilityResult {
            status: "success".to_string(),
            location: location.to_string(),
            search_coordinates: center,
            facilities_found,
            facilities,
            search_radius_km: SEARCH_RADIUS_KM,
            emergency_number: emergency_number(location),
        }
    }
}

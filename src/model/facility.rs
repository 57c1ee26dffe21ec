use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    Hospital,
    Clinic,
    Doctors,
}

impl FacilityType {
    /// Parse an OSM `amenity` tag value; unknown values count as hospitals
    pub fn from_amenity(amenity: Option<&str>) -> Self {
        match amenity {
            Some("clinic") => FacilityType::Clinic,
            Some("doctors") => FacilityType::Doctors,
            _ => FacilityType::Hospital,
        }
    }
}

/// Category restriction passed to the facility index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityFilter {
    /// Hospitals, clinics and doctors
    Any,
    /// Hospitals only
    Emergency,
    /// Facilities tagged with the given medical speciality
    Specialty(String),
}

impl FacilityFilter {
    pub fn from_specialty(specialty: Option<&str>) -> Self {
        match specialty.map(str::trim).filter(|s| !s.is_empty()) {
            None => FacilityFilter::Any,
            Some(s) if s.eq_ignore_ascii_case("emergency") => FacilityFilter::Emergency,
            Some(s) => FacilityFilter::Specialty(s.to_lowercase()),
        }
    }
}

/// Facility as returned by the index, before ranking
#[derive(Debug, Clone, PartialEq)]
pub struct RawFacility {
    pub name: Option<String>,
    pub amenity: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Raw `emergency` tag value
    pub emergency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Facility {
    pub name: String,
    #[serde(rename = "type")]
    pub facility_type: FacilityType,
    pub address: String,
    pub coordinates: Coordinates,
    pub distance_km: f64,
    pub emergency_capable: bool,
    pub phone: String,
    pub website: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FacilityResult {
    pub status: String,
    pub location: String,
    pub search_coordinates: Coordinates,
    /// Ranked candidates before truncation
    pub facilities_found: usize,
    pub facilities: Vec<Facility>,
    pub search_radius_km: f64,
    pub emergency_number: String,
}

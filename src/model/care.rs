use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::model::{DiseaseMatch, Facility, OutbreakRecord};

/// Fixed non-diagnostic disclaimer closing every care response
pub const CARE_DISCLAIMER: &str = "⚠️ This is not medical advice. Only a healthcare professional can properly diagnose and treat your condition.";

/// Care urgency derived per request, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyTier {
    Emergency,
    #[serde(rename = "URGENT_24H")]
    Urgent24h,
    Monitor,
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UrgencyTier::Emergency => "EMERGENCY",
            UrgencyTier::Urgent24h => "URGENT_24H",
            UrgencyTier::Monitor => "MONITOR",
        };
        f.write_str(label)
    }
}

/// States visited by the care router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouterState {
    Intake,
    Triage,
    Emergency,
    #[serde(rename = "URGENT_24H")]
    Urgent24h,
    Monitor,
    ResponseBuilt,
}

impl From<UrgencyTier> for RouterState {
    fn from(tier: UrgencyTier) -> Self {
        match tier {
            UrgencyTier::Emergency => RouterState::Emergency,
            UrgencyTier::Urgent24h => RouterState::Urgent24h,
            UrgencyTier::Monitor => RouterState::Monitor,
        }
    }
}

/// Keyword signals extracted from the symptom text at intake
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CareSignals {
    /// Red-flag phrases found, in detection order
    pub red_flags: Vec<String>,
    /// Symptoms reported for more than seven days
    pub prolonged_duration: bool,
    /// Longest duration mentioned, in days
    pub duration_days: Option<u32>,
    /// Other people around the user are affected
    pub community_spread: bool,
}

/// Request-scoped input to the care router
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CareRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub location: String,
    /// Look up facilities even when the tier does not require it
    #[serde(default)]
    pub include_facilities: bool,
}

impl CareRequest {
    pub fn new(symptoms: Vec<String>, location: impl Into<String>) -> Self {
        Self {
            symptoms,
            location: location.into(),
            include_facilities: false,
        }
    }

    pub fn with_facilities(mut self) -> Self {
        self.include_facilities = true;
        self
    }

    /// True when no symptom text was supplied (outbreak-only query)
    pub fn is_outbreak_only(&self) -> bool {
        self.symptoms.iter().all(|s| s.trim().is_empty())
    }
}

/// Parts of a care response; the disclaimer is added on assembly
#[derive(Debug, Clone, Default)]
pub struct CareResponseParts {
    pub location: String,
    pub tier: Option<UrgencyTier>,
    pub path: Vec<RouterState>,
    pub signals: CareSignals,
    pub possible_conditions: Vec<DiseaseMatch>,
    pub urgent_care_needed: bool,
    pub outbreaks: Vec<OutbreakRecord>,
    pub facilities: Vec<Facility>,
    pub emergency_number: String,
    pub messages: Vec<String>,
}

/// Composed care router output
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TieredCareResponse {
    pub status: String,
    pub location: String,
    /// `None` for outbreak-only queries
    pub tier: Option<UrgencyTier>,
    pub path: Vec<RouterState>,
    pub signals: CareSignals,
    pub possible_conditions: Vec<DiseaseMatch>,
    pub urgent_care_needed: bool,
    pub outbreaks: Vec<OutbreakRecord>,
    pub facilities: Vec<Facility>,
    pub emergency_number: String,
    pub messages: Vec<String>,
    disclaimer: String,
}

impl TieredCareResponse {
    /// Assemble the final response. The only way to build one, so the
    /// disclaimer is always present.
    pub fn assemble(parts: CareResponseParts) -> Self {
        let mut path = parts.path;
        if path.last() != Some(&RouterState::ResponseBuilt) {
            path.push(RouterState::ResponseBuilt);
        }

        Self {
            status: "success".to_string(),
            location: parts.location,
            tier: parts.tier,
            path,
            signals: parts.signals,
            possible_conditions: parts.possible_conditions,
            urgent_care_needed: parts.urgent_care_needed,
            outbreaks: parts.outbreaks,
            facilities: parts.facilities,
            emergency_number: parts.emergency_number,
            messages: parts.messages,
            disclaimer: CARE_DISCLAIMER.to_string(),
        }
    }

    pub fn disclaimer(&self) -> &str {
        &self.disclaimer
    }

    /// Messages followed by the disclaimer, ready for display
    pub fn render(&self) -> String {
        let mut text = self.messages.join("\n\n");
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(&self.disclaimer);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_always_adds_disclaimer() {
        let response = TieredCareResponse::assemble(CareResponseParts::default());

        assert_eq!(response.disclaimer(), CARE_DISCLAIMER);
        assert_eq!(response.path, vec![RouterState::ResponseBuilt]);
        assert!(response.render().ends_with(CARE_DISCLAIMER));
    }

    #[test]
    fn test_disclaimer_is_serialized() {
        let response = TieredCareResponse::assemble(CareResponseParts {
            tier: Some(UrgencyTier::Urgent24h),
            ..Default::default()
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["disclaimer"], CARE_DISCLAIMER);
        assert_eq!(json["tier"], "URGENT_24H");
    }

    #[test]
    fn test_outbreak_only_detection() {
        assert!(CareRequest::new(vec![], "Boston").is_outbreak_only());
        assert!(CareRequest::new(vec!["  ".to_string()], "Boston").is_outbreak_only());
        assert!(!CareRequest::new(vec!["cough".to_string()], "Boston").is_outbreak_only());
    }
}

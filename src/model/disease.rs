use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Severity label attached to a catalog disease pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    /// Kept distinct from `Severe`: it never raises the urgent-care flag
    ModerateToSevere,
    Severe,
}

impl Severity {
    pub fn is_severe(&self) -> bool {
        matches!(self, Severity::Severe)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::ModerateToSevere => "moderate to severe",
            Severity::Severe => "severe",
        };
        f.write_str(label)
    }
}

/// How an input symptom is compared against a catalog symptom
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrictness {
    /// Either string contains the other ("high fever" matches "fever")
    #[default]
    Substring,
    /// Normalized strings must be equal
    Exact,
}

/// Static catalog entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiseasePattern {
    pub name: String,
    pub symptom_set: Vec<String>,
    pub severity: Severity,
    pub recommended_action: String,
}

impl DiseasePattern {
    pub fn new(name: &str, symptoms: &[&str], severity: Severity, action: &str) -> Self {
        Self {
            name: name.to_string(),
            symptom_set: symptoms.iter().map(|s| s.to_lowercase()).collect(),
            severity,
            recommended_action: action.to_string(),
        }
    }
}

/// A catalog pattern that shares at least one symptom with the query
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DiseaseMatch {
    pub disease: String,
    /// Percentage of the pattern's symptoms that were matched, one decimal
    pub match_score: f64,
    /// Normalized input symptoms that matched the pattern, in input order
    pub matching_symptoms: Vec<String>,
    pub all_symptoms: Vec<String>,
    pub severity: Severity,
    pub recommended_action: String,
}

/// Output of a symptom analysis
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DiseaseMatchResult {
    pub status: String,
    pub location: String,
    pub input_symptoms: Vec<String>,
    pub possible_diseases: Vec<DiseaseMatch>,
    pub urgent_care_needed: bool,
    pub warning: String,
}

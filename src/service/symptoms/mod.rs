//! Rule-based symptom matcher
//!
//! Scores free-text symptoms against the static disease catalog. This is a
//! triage heuristic, not a diagnostic engine: matching is by substring
//! containment in either direction unless exact matching is configured.
//!
//! Pure over the catalog. No I/O, no shared mutable state.

mod catalog;

use std::cmp::Ordering;

use crate::model::{DiseaseMatch, DiseaseMatchResult, DiseasePattern, MatchStrictness};

pub use catalog::builtin_catalog;

/// Maximum number of candidate diseases returned
pub const MAX_MATCHES: usize = 5;

/// Severe patterns above this score raise the urgent-care flag
const URGENT_SCORE_THRESHOLD: f64 = 40.0;

pub const DIAGNOSIS_WARNING: &str = "This is not a medical diagnosis. Please consult a healthcare professional for proper evaluation.";

/// Ranked matches plus the urgent-care flag
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomMatches {
    pub matches: Vec<DiseaseMatch>,
    pub urgent_care_needed: bool,
}

pub struct SymptomMatcher {
    catalog: Vec<DiseasePattern>,
    strictness: MatchStrictness,
}

impl SymptomMatcher {
    pub fn new(catalog: Vec<DiseasePattern>, strictness: MatchStrictness) -> Self {
        Self {
            catalog,
            strictness,
        }
    }

    /// Matcher over the built-in catalog
    pub fn builtin(strictness: MatchStrictness) -> Self {
        Self::new(builtin_catalog(), strictness)
    }

    pub fn catalog(&self) -> &[DiseasePattern] {
        &self.catalog
    }

    /// Analyze symptoms for a location and wrap the result for callers
    pub fn analyze(&self, symptoms: &[String], location: &str) -> DiseaseMatchResult {
        let SymptomMatches {
            matches,
            urgent_care_needed,
        } = self.match_symptoms(symptoms);

        tracing::debug!(
            location = %location,
            input_count = symptoms.len(),
            match_count = matches.len(),
            urgent_care_needed,
            "Symptoms analyzed"
        );

        DiseaseMatchResult {
            status: "success".to_string(),
            location: location.to_string(),
            input_symptoms: symptoms.to_vec(),
            possible_diseases: matches,
            urgent_care_needed,
            warning: DIAGNOSIS_WARNING.to_string(),
        }
    }

    /// Score every catalog pattern and return the top candidates
    ///
    /// Patterns with no matched symptom are left out. The urgent-care flag
    /// considers every scored pattern, including those cut by the top-N limit.
    pub fn match_symptoms(&self, symptoms: &[String]) -> SymptomMatches {
        let normalized = normalize(symptoms);

        let mut matches: Vec<DiseaseMatch> = self
            .catalog
            .iter()
            .filter_map(|pattern| self.score_pattern(pattern, &normalized))
            .collect();

        let urgent_care_needed = matches
            .iter()
            .any(|m| m.severity.is_severe() && m.match_score > URGENT_SCORE_THRESHOLD);

        // Stable: equal scores keep catalog order
        matches.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
        });
        matches.truncate(MAX_MATCHES);

        SymptomMatches {
            matches,
            urgent_care_needed,
        }
    }

    fn score_pattern(&self, pattern: &DiseasePattern, symptoms: &[String]) -> Option<DiseaseMatch> {
        if pattern.symptom_set.is_empty() {
            return None;
        }

        let matched_pattern_symptoms = pattern
            .symptom_set
            .iter()
            .filter(|ds| symptoms.iter().any(|s| self.symptom_matches(s, ds)))
            .count();

        if matched_pattern_symptoms == 0 {
            return None;
        }

        let matching_symptoms: Vec<String> = symptoms
            .iter()
            .filter(|s| pattern.symptom_set.iter().any(|ds| self.symptom_matches(s, ds)))
            .cloned()
            .collect();

        let ratio = matched_pattern_symptoms as f64 / pattern.symptom_set.len() as f64;

        Some(DiseaseMatch {
            disease: pattern.name.clone(),
            match_score: round_one_decimal(ratio * 100.0),
            matching_symptoms,
            all_symptoms: pattern.symptom_set.clone(),
            severity: pattern.severity,
            recommended_action: pattern.recommended_action.clone(),
        })
    }

    fn symptom_matches(&self, symptom: &str, pattern_symptom: &str) -> bool {
        match self.strictness {
            MatchStrictness::Substring => {
                pattern_symptom.contains(symptom) || symptom.contains(pattern_symptom)
            }
            MatchStrictness::Exact => symptom == pattern_symptom,
        }
    }
}

/// Lowercase and trim, dropping blanks and repeats while keeping input order
fn normalize(symptoms: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(symptoms.len());
    for symptom in symptoms {
        let s = symptom.trim().to_lowercase();
        if !s.is_empty() && !normalized.contains(&s) {
            normalized.push(s);
        }
    }
    normalized
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

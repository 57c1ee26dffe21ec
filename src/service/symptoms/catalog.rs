//! Built-in disease pattern catalog
//!
//! Order matters: ties in match score keep this insertion order.

use crate::model::{DiseasePattern, Severity};

pub fn builtin_catalog() -> Vec<DiseasePattern> {
    vec![
        DiseasePattern::new(
            "COVID-19",
            &["fever", "cough", "fatigue", "loss of taste", "loss of smell", "shortness of breath"],
            Severity::ModerateToSevere,
            "Get tested immediately, isolate, seek medical care if breathing difficulty",
        ),
        DiseasePattern::new(
            "Influenza",
            &["fever", "cough", "sore throat", "body aches", "fatigue", "headache"],
            Severity::Moderate,
            "Rest, hydrate, antiviral medication within 48 hours",
        ),
        DiseasePattern::new(
            "Dengue Fever",
            &[
                "high fever",
                "severe headache",
                "pain behind eyes",
                "joint pain",
                "muscle pain",
                "rash",
                "bleeding",
            ],
            Severity::Severe,
            "Seek immediate medical attention, monitor for warning signs",
        ),
        DiseasePattern::new(
            "Malaria",
            &["fever", "chills", "sweating", "headache", "nausea", "vomiting", "body aches"],
            Severity::Severe,
            "Urgent medical evaluation and blood test required",
        ),
        DiseasePattern::new(
            "Typhoid",
            &["sustained fever", "headache", "abdominal pain", "constipation", "weakness"],
            Severity::Severe,
            "Medical evaluation and blood culture needed",
        ),
        DiseasePattern::new(
            "Cholera",
            &["severe diarrhea", "vomiting", "dehydration", "muscle cramps"],
            Severity::Severe,
            "Emergency medical care - severe dehydration risk",
        ),
        DiseasePattern::new(
            "Measles",
            &["fever", "cough", "runny nose", "red eyes", "rash", "white spots in mouth"],
            Severity::ModerateToSevere,
            "Isolate and seek medical care, highly contagious",
        ),
        DiseasePattern::new(
            "Common Cold",
            &["runny nose", "sneezing", "sore throat", "cough", "mild fever"],
            Severity::Mild,
            "Rest, hydrate, over-the-counter medications",
        ),
    ]
}

//! Keyword signal extraction for triage
//!
//! Simple phrase and pattern detection over the symptom text. Not NLP.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CareSignals, UrgencyTier};

/// Symptoms lasting longer than this are prolonged
const PROLONGED_AFTER_DAYS: u32 = 7;

const FEVER_THRESHOLD_F: f64 = 103.0;
const FEVER_THRESHOLD_C: f64 = 39.4;

/// Red-flag categories and the phrases that indicate them
const RED_FLAGS: &[(&str, &[&str])] = &[
    (
        "difficulty breathing",
        &[
            "difficulty breathing",
            "breathing difficulty",
            "trouble breathing",
            "hard to breathe",
            "can't breathe",
            "cannot breathe",
            "struggling to breathe",
            "shortness of breath",
            "short of breath",
            "gasping for air",
        ],
    ),
    (
        "chest pain or pressure",
        &[
            "chest pain",
            "chest pressure",
            "chest tightness",
            "tight chest",
            "pain in my chest",
            "pressure in my chest",
        ],
    ),
    (
        "severe bleeding",
        &[
            "severe bleeding",
            "heavy bleeding",
            "bleeding heavily",
            "uncontrolled bleeding",
            "won't stop bleeding",
            "coughing up blood",
            "vomiting blood",
        ],
    ),
    (
        "confusion or altered consciousness",
        &[
            "confusion",
            "confused",
            "disoriented",
            "altered consciousness",
            "loss of consciousness",
            "lost consciousness",
            "unconscious",
            "passed out",
            "fainted",
        ],
    ),
    (
        "persistent severe vomiting",
        &[
            "persistent vomiting",
            "severe vomiting",
            "constant vomiting",
            "nonstop vomiting",
            "non-stop vomiting",
            "vomiting repeatedly",
            "can't stop vomiting",
            "cannot stop vomiting",
            "can't keep anything down",
        ],
    ),
];

const HIGH_FEVER_FLAG: &str = "high fever unresponsive to treatment";

/// Phrases saying a fever is not coming down
const FEVER_UNRESPONSIVE: &[&str] = &[
    "won't go down",
    "will not go down",
    "not going down",
    "doesn't go down",
    "does not go down",
    "won't break",
    "won't reduce",
    "unresponsive",
    "not responding",
    "despite medication",
    "despite taking",
];

const PROLONGED_PHRASES: &[&str] = &[
    "more than a week",
    "over a week",
    "longer than a week",
    "for weeks",
    "for months",
];

const COMMUNITY_PHRASES: &[&str] = &[
    "community spread",
    "spreading in",
    "going around",
    "outbreak in",
    "multiple people",
    "many people",
    "several people",
    "lots of people",
    "other people",
    "others are sick",
    "everyone in my",
    "everyone at work is sick",
    "everyone at school is sick",
    "everyone at home is sick",
    "whole family",
    "family members",
    "my family is sick",
    "household is sick",
    "household are sick",
    "everyone in the household",
    "coworkers",
    "co-workers",
    "colleagues",
    "classmates",
    "roommates",
    "neighbors",
    "neighbours",
];

/// Words that place a temperature reading in the weather rather than the body
const AMBIENT_WORDS: &[&str] = &["outside", "outdoor", "weather", "heat", "room", "water"];

/// A reading only counts inside the same clause as a fever keyword.
/// Captures the gap, the value and an optional unit.
static FEVER_READING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:fever|temperature|temp)\b([^.,;!?\d]{0,24})(\d{2,3}(?:\.\d+)?)\s*(?:°|º|degrees?)?\s*([fc])?\b",
    )
    .expect("valid temperature pattern")
});

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|couple of|few|several)\s*-?\s*(days?|weeks?|months?|fortnights?)\b(\s*-?\s*(?:old|of age|pregnant|gestation|along))?",
    )
    .expect("valid duration pattern")
});

/// Extract triage signals from free text
pub fn extract_signals(text: &str) -> CareSignals {
    let lower = text.to_lowercase();

    let mut red_flags: Vec<String> = RED_FLAGS
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(label, _)| label.to_string())
        .collect();

    if has_unresponsive_high_fever(&lower) {
        red_flags.push(HIGH_FEVER_FLAG.to_string());
    }

    let duration_days = longest_duration_days(&lower);
    let prolonged_duration = duration_days.is_some_and(|d| d > PROLONGED_AFTER_DAYS)
        || PROLONGED_PHRASES.iter().any(|p| lower.contains(p));

    let community_spread = COMMUNITY_PHRASES.iter().any(|p| lower.contains(p));

    CareSignals {
        red_flags,
        prolonged_duration,
        duration_days,
        community_spread,
    }
}

/// Decide the tier. First rule that applies wins.
pub fn triage(signals: &CareSignals) -> UrgencyTier {
    if !signals.red_flags.is_empty() {
        UrgencyTier::Emergency
    } else if signals.prolonged_duration || signals.community_spread {
        UrgencyTier::Urgent24h
    } else {
        UrgencyTier::Monitor
    }
}

fn has_unresponsive_high_fever(lower: &str) -> bool {
    if lower.contains("high fever") && FEVER_UNRESPONSIVE.iter().any(|p| lower.contains(p)) {
        return true;
    }

    FEVER_READING.captures_iter(lower).any(|c| {
        if AMBIENT_WORDS.iter().any(|w| c[1].contains(w)) {
            return false;
        }
        let value: f64 = c[2].parse().unwrap_or(0.0);
        match c.get(3).map(|u| u.as_str()) {
            Some("f") => value > FEVER_THRESHOLD_F,
            Some(_) => value > FEVER_THRESHOLD_C,
            // No unit given: plausible body temperatures above 45 are Fahrenheit
            None if value > 45.0 => value > FEVER_THRESHOLD_F,
            None => value > FEVER_THRESHOLD_C,
        }
    })
}

fn longest_duration_days(lower: &str) -> Option<u32> {
    DURATION
        .captures_iter(lower)
        .filter_map(|c| {
            // Ages and gestation ("6 month old", "20 weeks pregnant") are not durations
            if c.get(3).is_some() {
                return None;
            }
            let quantity = quantity(&c[1])?;
            let unit_days = match c[2].trim_end_matches('s') {
                "day" => 1,
                "week" => 7,
                "fortnight" => 14,
                "month" => 30,
                _ => return None,
            };
            Some(quantity.saturating_mul(unit_days))
        })
        .max()
}

fn quantity(word: &str) -> Option<u32> {
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" | "couple of" => 2,
        "three" | "few" | "several" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        digits => return digits.parse().ok(),
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breathing_and_chest_pain_are_red_flags() {
        let signals = extract_signals("Difficulty breathing. Chest pain");

        assert_eq!(
            signals.red_flags,
            vec!["difficulty breathing", "chest pain or pressure"]
        );
        assert_eq!(triage(&signals), UrgencyTier::Emergency);
    }

    #[test]
    fn test_red_flag_wins_over_duration() {
        let signals = extract_signals("chest pressure for 10 days, everyone in my office is sick");

        assert!(signals.prolonged_duration);
        assert!(signals.community_spread);
        assert_eq!(triage(&signals), UrgencyTier::Emergency);
    }

    #[test]
    fn test_duration_over_a_week() {
        let signals = extract_signals("cough for 10 days");
        assert_eq!(signals.duration_days, Some(10));
        assert!(signals.prolonged_duration);
        assert_eq!(triage(&signals), UrgencyTier::Urgent24h);

        assert!(extract_signals("sore throat for two weeks").prolonged_duration);
        assert!(extract_signals("a 9-day headache").prolonged_duration);
        assert!(extract_signals("tired for more than a week").prolonged_duration);
    }

    #[test]
    fn test_week_or_less_is_not_prolonged() {
        let week = extract_signals("cough for a week");
        assert_eq!(week.duration_days, Some(7));
        assert!(!week.prolonged_duration);

        assert!(!extract_signals("runny nose for 3 days").prolonged_duration);
        assert!(!extract_signals("sneezing since a few days").prolonged_duration);
    }

    #[test]
    fn test_community_spread() {
        let signals = extract_signals("fever, and it's going around my school");
        assert!(signals.community_spread);
        assert_eq!(triage(&signals), UrgencyTier::Urgent24h);
    }

    #[test]
    fn test_mild_symptoms_monitor() {
        let signals = extract_signals("runny nose. sneezing");
        assert!(signals.red_flags.is_empty());
        assert!(!signals.prolonged_duration);
        assert!(!signals.community_spread);
        assert_eq!(triage(&signals), UrgencyTier::Monitor);
    }

    #[test]
    fn test_high_fever_thresholds() {
        assert!(!extract_signals("fever of 104F").red_flags.is_empty());
        assert!(!extract_signals("temperature 39.8 °C").red_flags.is_empty());
        assert!(!extract_signals("fever of 104").red_flags.is_empty());
        assert!(!extract_signals("high fever that won't go down").red_flags.is_empty());

        assert!(extract_signals("fever of 103 F").red_flags.is_empty());
        assert!(extract_signals("temperature 38.5c").red_flags.is_empty());
        assert!(extract_signals("high fever").red_flags.is_empty());
        // "39 cases" is not a temperature
        assert!(extract_signals("39 cases in my town").red_flags.is_empty());
    }

    #[test]
    fn test_severe_vomiting_and_confusion() {
        let signals = extract_signals("persistent severe vomiting and confusion");
        assert_eq!(
            signals.red_flags,
            vec!["confusion or altered consciousness", "persistent severe vomiting"]
        );
    }

    #[test]
    fn test_ambient_heat_is_not_a_fever() {
        let heat = extract_signals("headache after walking in 40 C heat. runny nose");
        assert!(heat.red_flags.is_empty());
        assert_eq!(triage(&heat), UrgencyTier::Monitor);

        assert_eq!(
            triage(&extract_signals("it was 105F outside today, mild headache")),
            UrgencyTier::Monitor
        );
        assert!(extract_signals("the temperature outside hit 41c, feeling tired").red_flags.is_empty());
        // The reading must share a clause with the keyword
        assert!(extract_signals("mild fever. it was 105F at the beach").red_flags.is_empty());
    }

    #[test]
    fn test_ages_and_gestation_are_not_durations() {
        let baby = extract_signals("my 6 month old baby has a runny nose. sneezing");
        assert_eq!(baby.duration_days, None);
        assert!(!baby.prolonged_duration);
        assert_eq!(triage(&baby), UrgencyTier::Monitor);

        let pregnant = extract_signals("I am 20 weeks pregnant. runny nose");
        assert_eq!(pregnant.duration_days, None);
        assert_eq!(triage(&pregnant), UrgencyTier::Monitor);

        assert_eq!(extract_signals("my 3-month-old has a cough").duration_days, None);
        // A real duration alongside an age still counts
        let both = extract_signals("my 2 year old has had a cough for 10 days");
        assert_eq!(both.duration_days, Some(10));
        assert!(both.prolonged_duration);
    }

    #[test]
    fn test_household_and_workplace_need_illness() {
        assert!(!extract_signals("sneezing after using a household cleaner").community_spread);
        assert!(!extract_signals("cough, everyone at work is fine").community_spread);

        assert!(extract_signals("fever, everyone at work is sick").community_spread);
        assert!(extract_signals("cough and my household is sick too").community_spread);
    }
}

//! Fixed user-facing wording for each tier

use crate::model::{CareSignals, Facility, OutbreakRecord};

pub const EMERGENCY_HEADLINE: &str = "🚨 SEEK EMERGENCY CARE IMMEDIATELY";
pub const URGENT_HEADLINE: &str = "⚠️ CONSULT A DOCTOR WITHIN 24 HOURS";
pub const MONITOR_HEADLINE: &str =
    "Monitor your symptoms closely. If they worsen or persist beyond 3 days, consult a healthcare provider.";

pub const SEEK_PROFESSIONAL_CARE: &str =
    "We could not gather local information right now. Please seek care from a healthcare professional.";

const EMERGENCY_ACTION: &str = "Do not wait. Go to the nearest emergency room or call emergency services now.";
const MONITOR_ESCALATION: &str =
    "If you develop difficulty breathing, chest pain, confusion or a very high fever, seek emergency care immediately.";
const MONITOR_PATTERN_ADVISORY: &str =
    "Your symptoms resemble a serious illness pattern. Arrange a professional evaluation soon even if you feel stable.";
const COMMUNITY_REASON: &str =
    "Other people around you are affected, which points to a contagious illness that needs medical assessment.";
const OUTBREAK_ADVICE: &str = "Consult healthcare professionals for personalized medical advice.";

/// Records listed in a briefing before the rest are summarized
const MAX_LISTED_OUTBREAKS: usize = 5;

pub fn no_major_alerts(location: &str) -> String {
    format!("No major outbreak alerts reported for {} at this time.", location)
}

pub fn emergency(signals: &CareSignals, emergency_number: &str, facilities: &[Facility]) -> Vec<String> {
    let mut messages = vec![EMERGENCY_HEADLINE.to_string()];

    if !signals.red_flags.is_empty() {
        messages.push(format!("Warning signs reported: {}.", signals.red_flags.join(", ")));
    }
    messages.push(format!("📞 Emergency number: {}", emergency_number));

    match facilities.first() {
        Some(nearest) if nearest.emergency_capable => {
            messages.push(format!("🏥 Nearest emergency room: {}", describe(nearest)));
        }
        Some(nearest) => {
            messages.push(format!("🏥 Nearest hospital: {}", describe(nearest)));
        }
        None => {}
    }

    messages.push(EMERGENCY_ACTION.to_string());
    messages
}

pub fn urgent(
    signals: &CareSignals,
    location: &str,
    outbreaks: &[OutbreakRecord],
    facilities: &[Facility],
) -> Vec<String> {
    let mut messages = vec![URGENT_HEADLINE.to_string()];

    if signals.prolonged_duration {
        let reason = match signals.duration_days {
            Some(days) if days > 7 => format!(
                "Your symptoms have lasted about {} days, which needs professional evaluation.",
                days
            ),
            _ => "Your symptoms have lasted more than a week, which needs professional evaluation."
                .to_string(),
        };
        messages.push(reason);
    }
    if signals.community_spread {
        messages.push(COMMUNITY_REASON.to_string());
    }

    messages.push(outbreak_summary(location, outbreaks));

    if !facilities.is_empty() {
        messages.push(format!("🏥 Nearby care: {}", facility_list(facilities)));
    }
    messages
}

pub fn monitor(urgent_care_needed: bool, facilities: &[Facility]) -> Vec<String> {
    let mut messages = vec![MONITOR_HEADLINE.to_string(), MONITOR_ESCALATION.to_string()];

    if urgent_care_needed {
        messages.push(MONITOR_PATTERN_ADVISORY.to_string());
    }
    if !facilities.is_empty() {
        messages.push(format!("🏥 Nearby care: {}", facility_list(facilities)));
    }
    messages
}

/// Briefing for queries without symptoms
pub fn outbreak_briefing(location: &str, outbreaks: &[OutbreakRecord]) -> Vec<String> {
    let mut messages = vec![outbreak_summary(location, outbreaks)];

    for record in outbreaks.iter().take(MAX_LISTED_OUTBREAKS) {
        messages.push(format!(
            "- {}: {} ({})",
            record.disease,
            record.title,
            record.source.display_name()
        ));
    }
    if outbreaks.len() > MAX_LISTED_OUTBREAKS {
        messages.push(format!(
            "...and {} more reports.",
            outbreaks.len() - MAX_LISTED_OUTBREAKS
        ));
    }

    messages.push(OUTBREAK_ADVICE.to_string());
    messages
}

fn outbreak_summary(location: &str, outbreaks: &[OutbreakRecord]) -> String {
    if outbreaks.is_empty() {
        return no_major_alerts(location);
    }

    let mut diseases: Vec<&str> = Vec::new();
    for record in outbreaks {
        if !diseases.contains(&record.disease.as_str()) {
            diseases.push(&record.disease);
        }
    }
    format!(
        "Recent outbreak reports near {}: {}.",
        location,
        diseases.join(", ")
    )
}

fn describe(facility: &Facility) -> String {
    let mut text = format!("{} ({} km)", facility.name, facility.distance_km);
    if facility.phone != "N/A" {
        text.push_str(&format!(", phone {}", facility.phone));
    }
    text
}

fn facility_list(facilities: &[Facility]) -> String {
    facilities
        .iter()
        .map(|f| format!("{} ({} km)", f.name, f.distance_km))
        .collect::<Vec<_>>()
        .join("; ")
}

//! Tiered care router
//!
//! Request flow: `Intake -> Triage -> {Emergency | Urgent24h | Monitor} -> ResponseBuilt`.
//! Outbreak-only requests go straight from intake to the outbreak briefing.
//! Each tier calls only the collaborators it needs. Routing never fails:
//! unavailable collaborators leave their section of the response empty.

mod messages;
mod signals;

use std::sync::Arc;

use crate::model::{
    CareRequest, CareResponseParts, Facility, FacilityResult, OutbreakResult, RouterState,
    TieredCareResponse, UrgencyTier,
};
use crate::service::facility::{FacilityError, FacilityLocator, emergency_number};
use crate::service::outbreak::OutbreakAggregator;
use crate::service::symptoms::{SymptomMatcher, SymptomMatches};

use messages::SEEK_PROFESSIONAL_CARE;
pub use signals::{extract_signals, triage};

const EMERGENCY_SPECIALTY: &str = "emergency";

pub struct CareRouter {
    matcher: Arc<SymptomMatcher>,
    aggregator: Arc<OutbreakAggregator>,
    locator: Arc<FacilityLocator>,
}

impl CareRouter {
    pub fn new(
        matcher: Arc<SymptomMatcher>,
        aggregator: Arc<OutbreakAggregator>,
        locator: Arc<FacilityLocator>,
    ) -> Self {
        Self {
            matcher,
            aggregator,
            locator,
        }
    }

    /// Route one request through triage and compose the response
    pub async fn route(&self, request: &CareRequest) -> TieredCareResponse {
        let location = request.location.trim();
        let mut parts = CareResponseParts {
            location: location.to_string(),
            path: vec![RouterState::Intake],
            emergency_number: emergency_number(location),
            ..Default::default()
        };

        if request.is_outbreak_only() {
            self.outbreak_briefing(&mut parts).await;
            return TieredCareResponse::assemble(parts);
        }

        let signals = extract_signals(&request.symptoms.join(". "));
        let tier = triage(&signals);
        let SymptomMatches {
            matches,
            urgent_care_needed,
        } = self.matcher.match_symptoms(&request.symptoms);

        tracing::info!(
            location = %location,
            tier = %tier,
            red_flags = signals.red_flags.len(),
            prolonged = signals.prolonged_duration,
            community = signals.community_spread,
            "Care request triaged"
        );

        parts.path.extend([RouterState::Triage, RouterState::from(tier)]);
        parts.tier = Some(tier);
        parts.signals = signals;
        parts.possible_conditions = matches;
        parts.urgent_care_needed = urgent_care_needed;

        match tier {
            UrgencyTier::Emergency => self.emergency(&mut parts).await,
            UrgencyTier::Urgent24h => self.urgent(&mut parts).await,
            UrgencyTier::Monitor => self.monitor(&mut parts, request.include_facilities).await,
        }

        TieredCareResponse::assemble(parts)
    }

    async fn outbreak_briefing(&self, parts: &mut CareResponseParts) {
        let context = self.aggregator.aggregate(&parts.location).await;

        parts.messages = messages::outbreak_briefing(&parts.location, &context.outbreaks);
        if all_sources_degraded(&context) {
            parts.messages.push(SEEK_PROFESSIONAL_CARE.to_string());
        }
        parts.outbreaks = context.outbreaks;
    }

    /// Emergency path skips outbreak context entirely
    async fn emergency(&self, parts: &mut CareResponseParts) {
        let lookup = self
            .locator
            .locate(&parts.location, Some(EMERGENCY_SPECIALTY))
            .await;
        let lookup_failed = lookup.is_err();

        let mut facilities = facilities_or_empty(&parts.location, lookup);
        // Stable: emergency-capable first, distance order kept within each group
        facilities.sort_by_key(|f| !f.emergency_capable);

        parts.messages = messages::emergency(&parts.signals, &parts.emergency_number, &facilities);
        if lookup_failed {
            parts.messages.push(SEEK_PROFESSIONAL_CARE.to_string());
        }
        parts.facilities = facilities;
    }

    async fn urgent(&self, parts: &mut CareResponseParts) {
        let (context, lookup) = futures::join!(
            self.aggregator.aggregate(&parts.location),
            self.locator.locate(&parts.location, None)
        );
        let nothing_available = lookup.is_err() && all_sources_degraded(&context);

        let facilities = facilities_or_empty(&parts.location, lookup);

        parts.messages = messages::urgent(
            &parts.signals,
            &parts.location,
            &context.outbreaks,
            &facilities,
        );
        if nothing_available {
            parts.messages.push(SEEK_PROFESSIONAL_CARE.to_string());
        }
        parts.outbreaks = context.outbreaks;
        parts.facilities = facilities;
    }

    async fn monitor(&self, parts: &mut CareResponseParts, include_facilities: bool) {
        let mut lookup_failed = false;
        if include_facilities {
            let lookup = self.locator.locate(&parts.location, None).await;
            lookup_failed = lookup.is_err();
            parts.facilities = facilities_or_empty(&parts.location, lookup);
        }

        parts.messages = messages::monitor(parts.urgent_care_needed, &parts.facilities);
        if lookup_failed {
            parts.messages.push(SEEK_PROFESSIONAL_CARE.to_string());
        }
    }
}

fn facilities_or_empty(location: &str, lookup: Result<FacilityResult, FacilityError>) -> Vec<Facility> {
    match lookup {
        Ok(result) => result.facilities,
        Err(e) => {
            tracing::warn!(location = %location, error = %e, "Facility lookup failed, continuing without facilities");
            vec![]
        }
    }
}

fn all_sources_degraded(context: &OutbreakResult) -> bool {
    !context.sources_queried.is_empty()
        && context.degraded_sources.len() == context.sources_queried.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::messages::{EMERGENCY_HEADLINE, MONITOR_HEADLINE, URGENT_HEADLINE};
    use crate::model::{CARE_DISCLAIMER, FacilityFilter, MatchStrictness, OutbreakSource};
    use crate::retriever::OutbreakFeed;
    use crate::service::facility::tests::{CENTER, FakeIndex, FixedGeocoder, raw_at};
    use crate::service::outbreak::tests::{Behavior, FakeFeed, record};

    struct Harness {
        feed: Arc<FakeFeed>,
        index: Arc<FakeIndex>,
        router: CareRouter,
    }

    fn harness(feed: FakeFeed, index: FakeIndex, geocoded: bool) -> Harness {
        let feed = Arc::new(feed);
        let index = Arc::new(index);
        let geocoder = Arc::new(FixedGeocoder(geocoded.then_some(CENTER)));

        let feeds: Vec<Arc<dyn OutbreakFeed>> = vec![feed.clone()];
        let aggregator = OutbreakAggregator::new(
            feeds,
            geocoder.clone(),
            Duration::from_millis(100),
            None,
        );
        let locator = FacilityLocator::new(geocoder, index.clone(), Duration::from_millis(100));

        Harness {
            feed,
            index,
            router: CareRouter::new(
                Arc::new(SymptomMatcher::builtin(MatchStrictness::Substring)),
                Arc::new(aggregator),
                Arc::new(locator),
            ),
        }
    }

    fn cholera_feed() -> FakeFeed {
        FakeFeed::new(
            OutbreakSource::Who,
            Behavior::Records(vec![record(OutbreakSource::Who, "Cholera - Haiti")]),
        )
    }

    fn request(symptoms: &[&str], location: &str) -> CareRequest {
        CareRequest::new(symptoms.iter().map(|s| s.to_string()).collect(), location)
    }

    #[tokio::test]
    async fn test_red_flags_route_to_emergency() {
        let index = FakeIndex::with(vec![
            raw_at("Walk-in Clinic", 1.0, Some("no")),
            raw_at("County ER", 4.0, Some("yes")),
            raw_at("General", 6.0, None),
        ]);
        let h = harness(cholera_feed(), index, true);

        let response = h
            .router
            .route(&request(&["difficulty breathing", "chest pain"], "Boston, US"))
            .await;

        assert_eq!(response.tier, Some(UrgencyTier::Emergency));
        assert_eq!(
            response.path,
            vec![
                RouterState::Intake,
                RouterState::Triage,
                RouterState::Emergency,
                RouterState::ResponseBuilt
            ]
        );
        assert_eq!(response.messages[0], EMERGENCY_HEADLINE);
        assert_eq!(response.emergency_number, "911");

        let names: Vec<&str> = response.facilities.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["County ER", "General", "Walk-in Clinic"]);
        assert_eq!(*h.index.last_filter.lock().unwrap(), Some(FacilityFilter::Emergency));

        // Outbreak context is not needed for an emergency
        assert_eq!(h.feed.calls.load(Ordering::SeqCst), 0);
        assert!(response.outbreaks.is_empty());
        assert_eq!(response.disclaimer(), CARE_DISCLAIMER);
    }

    #[tokio::test]
    async fn test_emergency_without_geocoding_still_has_number() {
        let h = harness(cholera_feed(), FakeIndex::with(vec![]), false);

        let response = h
            .router
            .route(&request(&["chest pain"], "Somewhere, UK"))
            .await;

        assert_eq!(response.tier, Some(UrgencyTier::Emergency));
        assert_eq!(response.emergency_number, "999 or 112");
        assert!(response.facilities.is_empty());
        assert!(response.messages.contains(&SEEK_PROFESSIONAL_CARE.to_string()));
    }

    #[tokio::test]
    async fn test_mild_symptoms_route_to_monitor() {
        let h = harness(cholera_feed(), FakeIndex::with(vec![raw_at("A", 1.0, None)]), true);

        let response = h
            .router
            .route(&request(&["runny nose", "sneezing"], "Oslo"))
            .await;

        assert_eq!(response.tier, Some(UrgencyTier::Monitor));
        assert_eq!(response.messages[0], MONITOR_HEADLINE);
        assert_eq!(response.possible_conditions[0].disease, "Common Cold");
        assert!(response.facilities.is_empty());
        assert!(response.outbreaks.is_empty());
        assert_eq!(h.feed.calls.load(Ordering::SeqCst), 0);
        assert!(h.index.last_filter.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_monitor_facilities_on_request() {
        let h = harness(cholera_feed(), FakeIndex::with(vec![raw_at("A", 1.0, None)]), true);

        let response = h
            .router
            .route(&request(&["sneezing"], "Oslo").with_facilities())
            .await;

        assert_eq!(response.tier, Some(UrgencyTier::Monitor));
        assert_eq!(response.facilities.len(), 1);
        assert!(!response.messages.contains(&SEEK_PROFESSIONAL_CARE.to_string()));
    }

    #[tokio::test]
    async fn test_monitor_facility_lookup_failure_adds_generic_advice() {
        let h = harness(cholera_feed(), FakeIndex::with(vec![raw_at("A", 1.0, None)]), false);

        let response = h
            .router
            .route(&request(&["sneezing"], "Nowhere").with_facilities())
            .await;

        assert_eq!(response.tier, Some(UrgencyTier::Monitor));
        assert!(response.facilities.is_empty());
        assert_eq!(response.messages[0], MONITOR_HEADLINE);
        assert_eq!(
            response.messages.last(),
            Some(&SEEK_PROFESSIONAL_CARE.to_string())
        );
    }

    #[tokio::test]
    async fn test_monitor_carries_pattern_advisory() {
        let h = harness(cholera_feed(), FakeIndex::with(vec![]), true);

        let response = h
            .router
            .route(&request(&["severe diarrhea", "vomiting", "dehydration"], "Dhaka"))
            .await;

        assert_eq!(response.tier, Some(UrgencyTier::Monitor));
        assert!(response.urgent_care_needed);
        assert_eq!(response.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_prolonged_symptoms_route_to_urgent() {
        let h = harness(cholera_feed(), FakeIndex::with(vec![raw_at("A", 2.0, None)]), true);

        let response = h
            .router
            .route(&request(&["cough for 10 days"], "Port-au-Prince, Haiti"))
            .await;

        assert_eq!(response.tier, Some(UrgencyTier::Urgent24h));
        assert!(response.signals.prolonged_duration);
        assert_eq!(response.messages[0], URGENT_HEADLINE);
        assert!(response.messages[1].contains("10 days"));
        assert_eq!(response.outbreaks.len(), 1);
        assert_eq!(response.facilities.len(), 1);
        assert_eq!(h.feed.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*h.index.last_filter.lock().unwrap(), Some(FacilityFilter::Any));
        assert!(!response.messages.contains(&SEEK_PROFESSIONAL_CARE.to_string()));
    }

    #[tokio::test]
    async fn test_urgent_with_everything_down() {
        let h = harness(
            FakeFeed::new(OutbreakSource::Who, Behavior::Fail),
            FakeIndex::with(vec![]),
            false,
        );

        let response = h
            .router
            .route(&request(&["fever, my whole family is sick"], "Lagos"))
            .await;

        assert_eq!(response.tier, Some(UrgencyTier::Urgent24h));
        assert!(response.messages.contains(&SEEK_PROFESSIONAL_CARE.to_string()));
        assert_eq!(response.disclaimer(), CARE_DISCLAIMER);
    }

    #[tokio::test]
    async fn test_outbreak_only_query() {
        let h = harness(cholera_feed(), FakeIndex::with(vec![]), true);

        let response = h.router.route(&request(&[], "Haiti")).await;

        assert_eq!(response.tier, None);
        assert_eq!(response.path, vec![RouterState::Intake, RouterState::ResponseBuilt]);
        assert_eq!(response.outbreaks.len(), 1);
        assert!(response.possible_conditions.is_empty());
        assert!(h.index.last_filter.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_outbreak_only_quiet_location() {
        let h = harness(
            FakeFeed::new(OutbreakSource::Who, Behavior::Records(vec![])),
            FakeIndex::with(vec![]),
            true,
        );

        let response = h.router.route(&request(&[""], "Reykjavik")).await;

        assert_eq!(
            response.messages[0],
            "No major outbreak alerts reported for Reykjavik at this time."
        );
        assert!(response.render().ends_with(CARE_DISCLAIMER));
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;
use tripwiz_core::api::{ItineraryResponse, RecommendationsResponse, TravelApi};
use tripwiz_core::itinerary::{DEFAULT_BREAKFAST, DEFAULT_DINNER, DEFAULT_LUNCH};
use tripwiz_core::wizard::{Outcome, PreferenceEvent};
use tripwiz_core::{
    Destination, TravelPreferences, TripType, Wizard, WizardConfig, WizardError, WizardStep,
};

/// Answers from queues and records what it was asked.
#[derive(Default)]
struct ScriptedApi {
    recommendations: RefCell<VecDeque<Result<RecommendationsResponse, WizardError>>>,
    itineraries: RefCell<VecDeque<Result<ItineraryResponse, WizardError>>>,
    itinerary_requests: RefCell<Vec<(String, String)>>,
}

impl ScriptedApi {
    fn with_recommendations(self, text: &str) -> Self {
        self.recommendations
            .borrow_mut()
            .push_back(Ok(RecommendationsResponse {
                success: true,
                recommendations: Some(text.to_string()),
                error: None,
            }));
        self
    }

    fn with_itinerary(self, itinerary: serde_json::Value) -> Self {
        self.itineraries.borrow_mut().push_back(Ok(ItineraryResponse {
            success: true,
            itinerary: Some(itinerary),
            error: None,
        }));
        self
    }

    fn with_itinerary_error(self, error: WizardError) -> Self {
        self.itineraries.borrow_mut().push_back(Err(error));
        self
    }
}

impl TravelApi for ScriptedApi {
    fn recommendations(
        &self,
        _preferences: &TravelPreferences,
    ) -> Result<RecommendationsResponse, WizardError> {
        self.recommendations
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(WizardError::Network("no scripted response".into())))
    }

    fn itinerary(
        &self,
        preferences: &TravelPreferences,
        destination: &Destination,
    ) -> Result<ItineraryResponse, WizardError> {
        self.itinerary_requests.borrow_mut().push((
            destination.label(),
            preferences.starting_point().to_string(),
        ));
        self.itineraries
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(WizardError::Network("no scripted response".into())))
    }
}

const LISBON: &str = "Here are my picks!\n\n### Destination 1: Lisbon, Portugal\n**Why it's a perfect match**: Mild weather and great food.\n**Must-do activities and experiences**: - A - B\n**Best areas to stay**: Alfama\n";

fn fill_in(wizard: &mut Wizard) {
    wizard
        .edit(PreferenceEvent::StartingPoint("New York".into()))
        .unwrap();
    wizard
        .edit(PreferenceEvent::ToggleTripType(TripType::Cultural))
        .unwrap();
    wizard.next().unwrap();
    wizard.edit(PreferenceEvent::Travelers(2)).unwrap();
    wizard.edit(PreferenceEvent::Budget(1500)).unwrap();
}

#[test]
fn test_lisbon_end_to_end() {
    let api = ScriptedApi::default()
        .with_recommendations(LISBON)
        .with_itinerary(json!({
            "dailyItinerary": [{
                "day": 1,
                "activities": [{ "name": "Castelo de São Jorge", "duration": "2 hours", "description": "Views" }],
                "transportationType": "Tram",
                "accommodation": "Guesthouse"
            }],
            "budgetBreakdown": { "transportation": 400, "accommodation": "350", "activities": "100-200", "food": 250 }
        }));

    let mut wizard = Wizard::new(&WizardConfig::default());
    fill_in(&mut wizard);
    wizard.submit(&api).unwrap();

    assert_eq!(wizard.step(), WizardStep::ReviewingRecommendations);
    let destinations = wizard.destinations();
    assert_eq!(destinations.len(), 1);
    assert_eq!(destinations[0].city, "Lisbon");
    assert_eq!(destinations[0].country, "Portugal");
    assert_eq!(destinations[0].activities, vec!["A", "B"]);
    assert!((60..=100).contains(&destinations[0].match_score));

    wizard.open_itinerary(&api, 0).unwrap();
    assert_eq!(wizard.step(), WizardStep::ReviewingItinerary);

    let itinerary = wizard.itinerary().unwrap();
    let day = &itinerary.days[0];
    assert_eq!(day.meals.breakfast, DEFAULT_BREAKFAST);
    assert_eq!(day.meals.lunch, DEFAULT_LUNCH);
    assert_eq!(day.meals.dinner, DEFAULT_DINNER);
    assert_eq!(day.costs.activities, 0.0);
    assert_eq!(day.costs.meals, 0.0);
    assert_eq!(day.costs.transport, 0.0);
    assert_eq!(day.transportation, "Tram");
    assert_eq!(itinerary.budget.activities, 150.0);
    assert_eq!(itinerary.budget.total(), 1150.0);
    assert_eq!(itinerary.budget.remaining(1500), 350.0);

    let view = wizard.view();
    assert!(!view.busy);
    assert!(view.error.is_none());
    assert!(view.share_link.is_some());
    assert_eq!(
        api.itinerary_requests.borrow().as_slice(),
        &[("Lisbon, Portugal".to_string(), "New York".to_string())]
    );
}

#[test]
fn test_itinerary_network_failure_keeps_recommendations() {
    let api = ScriptedApi::default()
        .with_recommendations(LISBON)
        .with_itinerary_error(WizardError::Network("503 Service Unavailable".into()))
        .with_itinerary(json!({}));

    let mut wizard = Wizard::new(&WizardConfig::default());
    fill_in(&mut wizard);
    wizard.submit(&api).unwrap();

    let err = wizard.open_itinerary(&api, 0).unwrap_err();
    assert!(matches!(err, WizardError::Network(_)));
    assert_eq!(wizard.step(), WizardStep::ReviewingRecommendations);
    assert_eq!(wizard.destinations().len(), 1);
    assert_eq!(wizard.view().error, Some(&err));

    // Retry succeeds and clears the error.
    wizard.open_itinerary(&api, 0).unwrap();
    assert_eq!(wizard.step(), WizardStep::ReviewingItinerary);
    assert!(wizard.view().error.is_none());
    assert!(wizard.itinerary().unwrap().days.is_empty());
}

#[test]
fn test_recommendations_without_sections() {
    let api = ScriptedApi::default().with_recommendations("I could not find anything, sorry.");
    let mut wizard = Wizard::new(&WizardConfig::default());
    fill_in(&mut wizard);

    let err = wizard.submit(&api).unwrap_err();
    assert!(matches!(err, WizardError::MissingData(_)));
    assert_eq!(wizard.step(), WizardStep::CollectingDetails);
    // Preferences survive the rollback.
    assert_eq!(wizard.preferences().travelers(), 2);
}

#[test]
fn test_stale_recommendations_after_back() {
    let mut wizard = Wizard::new(&WizardConfig::default());
    fill_in(&mut wizard);

    let pending = wizard.request_recommendations().unwrap();
    assert_eq!(wizard.back().unwrap(), WizardStep::CollectingDetails);
    assert_eq!(wizard.request_recommendations(), Err(WizardError::Busy));

    let api = ScriptedApi::default().with_recommendations(LISBON);
    let response = pending.dispatch(&api);
    assert_eq!(
        wizard.complete(pending.ticket, response).unwrap(),
        Outcome::Discarded
    );
    assert_eq!(wizard.step(), WizardStep::CollectingDetails);
    assert!(wizard.destinations().is_empty());

    // Once the stale call has come back, a fresh request goes through.
    assert!(wizard.request_recommendations().is_ok());
}

#[test]
fn test_resume_from_share_link() {
    let api = ScriptedApi::default()
        .with_recommendations(LISBON)
        .with_itinerary(json!({ "dailyItinerary": [{ "day": 1 }] }))
        .with_itinerary(json!({ "dailyItinerary": [{ "day": 1 }, { "day": 2 }] }));

    let mut wizard = Wizard::new(&WizardConfig::default());
    fill_in(&mut wizard);
    wizard.submit(&api).unwrap();
    wizard.open_itinerary(&api, 0).unwrap();
    let link = wizard.share_link().unwrap().to_string();

    let restored = Wizard::resume(&WizardConfig::default(), &api, Some(link.as_str()));
    assert_eq!(restored.step(), WizardStep::ReviewingItinerary);
    assert_eq!(restored.preferences().starting_point(), "New York");
    assert_eq!(restored.preferences().budget_per_person(), 1500);
    assert_eq!(
        restored.preferences().trip_type().as_slice(),
        &[TripType::Cultural]
    );
    // The itinerary was fetched again rather than carried in the link.
    assert_eq!(restored.itinerary().unwrap().days.len(), 2);
    assert_eq!(api.itinerary_requests.borrow().len(), 2);
}

#[test]
fn test_failed_restore_falls_back_to_start() {
    let api = ScriptedApi::default()
        .with_recommendations(LISBON)
        .with_itinerary(json!({}))
        .with_itinerary_error(WizardError::Network("timed out".into()));

    let mut wizard = Wizard::new(&WizardConfig::default());
    fill_in(&mut wizard);
    wizard.submit(&api).unwrap();
    wizard.open_itinerary(&api, 0).unwrap();
    let link = wizard.share_link().unwrap().to_string();

    let restored = Wizard::resume(&WizardConfig::default(), &api, Some(link.as_str()));
    assert_eq!(restored.step(), WizardStep::CollectingBasics);
    assert!(matches!(restored.last_error(), Some(WizardError::Network(_))));
    assert_eq!(restored.preferences().starting_point(), "New York");
}

#[test]
fn test_garbage_entry_starts_fresh() {
    let api = ScriptedApi::default();
    for entry in [
        None,
        Some("http://localhost:5173/"),
        Some("http://localhost:5173/?trip=%%%"),
        Some("?trip=eyJub3QiOiJhIHRyaXAifQ"),
    ] {
        let wizard = Wizard::resume(&WizardConfig::default(), &api, entry);
        assert_eq!(wizard.step(), WizardStep::CollectingBasics);
        assert!(wizard.last_error().is_none());
        assert_eq!(wizard.preferences(), &TravelPreferences::default());
    }
    assert!(api.itinerary_requests.borrow().is_empty());
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! The wizard state machine.
//!
//! ```text
//! CollectingBasics <-> CollectingDetails -> AwaitingRecommendations -> ReviewingRecommendations
//!                            ^                       |  (failure)              |      ^
//!                            +-----------------------+                         v      | (failure, back)
//!                                                              AwaitingItinerary -> ReviewingItinerary
//! ```
//!
//! Network calls are two-phase. A transition such as
//! [`Wizard::request_recommendations`] moves into an `Awaiting*` state and
//! hands back a [`PendingFetch`]; whoever performs the call feeds the result
//! to [`Wizard::complete`]. Every fetch carries a [`FetchTicket`] and a
//! response whose ticket is no longer current is discarded, so navigating away
//! from a loading step can never be undone by a late answer.

use crate::api::{ItineraryResponse, RecommendationsResponse, TravelApi};
use crate::config::WizardConfig;
use crate::destination::{destinations_from_text, Destination, NO_DESTINATIONS_MESSAGE};
use crate::error::WizardError;
use crate::itinerary::{normalize_itinerary, Itinerary};
use crate::preferences::{TravelPreferences, TripType};
use crate::share::{self, ShareSnapshot, SHARE_PARAM};
use chrono::{Month, NaiveDate};
use log::{debug, info, warn};
use std::fmt;
use tripwiz_text::RecommendationParser;
use url::Url;

pub const RECOMMENDATIONS_LOADING: &str = "Finding your perfect destinations...";
pub const ITINERARY_LOADING: &str = "Loading your itinerary...";
pub const RECOMMENDATIONS_FAILED: &str = "Failed to get recommendations. Please try again.";
pub const ITINERARY_FAILED: &str = "Failed to load itinerary details. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    CollectingBasics,
    CollectingDetails,
    AwaitingRecommendations,
    ReviewingRecommendations,
    AwaitingItinerary,
    ReviewingItinerary,
}

impl WizardStep {
    pub fn is_awaiting(self) -> bool {
        matches!(
            self,
            WizardStep::AwaitingRecommendations | WizardStep::AwaitingItinerary
        )
    }

    /// Whether preferences may be edited in this step.
    pub fn accepts_input(self) -> bool {
        matches!(
            self,
            WizardStep::CollectingBasics | WizardStep::CollectingDetails
        )
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::CollectingBasics => "collecting basics",
            WizardStep::CollectingDetails => "collecting details",
            WizardStep::AwaitingRecommendations => "waiting for recommendations",
            WizardStep::ReviewingRecommendations => "reviewing recommendations",
            WizardStep::AwaitingItinerary => "waiting for the itinerary",
            WizardStep::ReviewingItinerary => "reviewing the itinerary",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Recommendations,
    Itinerary,
}

/// Identifies one outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    kind: FetchKind,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }
}

/// Where an itinerary fetch came from, which decides where a failure lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItineraryOrigin {
    Recommendations,
    SharedLink,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    CollectingBasics,
    CollectingDetails,
    AwaitingRecommendations {
        ticket: FetchTicket,
    },
    ReviewingRecommendations {
        destinations: Vec<Destination>,
    },
    AwaitingItinerary {
        ticket: FetchTicket,
        destinations: Vec<Destination>,
        selected: Destination,
        origin: ItineraryOrigin,
    },
    ReviewingItinerary {
        destinations: Vec<Destination>,
        selected: Destination,
    },
}

impl WizardState {
    pub fn step(&self) -> WizardStep {
        match self {
            WizardState::CollectingBasics => WizardStep::CollectingBasics,
            WizardState::CollectingDetails => WizardStep::CollectingDetails,
            WizardState::AwaitingRecommendations { .. } => WizardStep::AwaitingRecommendations,
            WizardState::ReviewingRecommendations { .. } => WizardStep::ReviewingRecommendations,
            WizardState::AwaitingItinerary { .. } => WizardStep::AwaitingItinerary,
            WizardState::ReviewingItinerary { .. } => WizardStep::ReviewingItinerary,
        }
    }

    fn ticket(&self) -> Option<FetchTicket> {
        match self {
            WizardState::AwaitingRecommendations { ticket }
            | WizardState::AwaitingItinerary { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}

/// Immutable inputs of a fetch, captured when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Recommendations {
        preferences: TravelPreferences,
    },
    Itinerary {
        preferences: TravelPreferences,
        destination: Destination,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResponse {
    Recommendations(Result<RecommendationsResponse, WizardError>),
    Itinerary(Result<ItineraryResponse, WizardError>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingFetch {
    pub ticket: FetchTicket,
    pub request: FetchRequest,
}

impl PendingFetch {
    /// Performs the call. Blocks for as long as `api` does.
    pub fn dispatch<A: TravelApi + ?Sized>(&self, api: &A) -> FetchResponse {
        match &self.request {
            FetchRequest::Recommendations { preferences } => {
                FetchResponse::Recommendations(api.recommendations(preferences))
            }
            FetchRequest::Itinerary {
                preferences,
                destination,
            } => FetchResponse::Itinerary(api.itinerary(preferences, destination)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The ticket was stale; nothing changed.
    Discarded,
}

/// User edits to the preferences.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceEvent {
    StartingPoint(String),
    ToggleTripType(TripType),
    Travelers(u32),
    Month(Option<Month>),
    StartDate(NaiveDate),
    EndDate(NaiveDate),
    ClearDates,
    Duration(u32),
    Budget(u32),
    International(bool),
}

/// Read-only snapshot handed to the rendering layer.
#[derive(Debug, Clone, Copy)]
pub struct WizardView<'a> {
    pub step: WizardStep,
    pub preferences: &'a TravelPreferences,
    pub destinations: &'a [Destination],
    pub selected: Option<&'a Destination>,
    pub busy: bool,
    pub loading_message: Option<&'static str>,
    pub error: Option<&'a WizardError>,
    pub share_link: Option<&'a str>,
}

impl WizardView<'_> {
    /// The "trip overview" paragraph shown above an itinerary.
    pub fn trip_overview(&self) -> Option<String> {
        if self.step != WizardStep::ReviewingItinerary {
            return None;
        }
        let destination = self.selected?;
        let prefs = self.preferences;

        let interests = if prefs.trip_type().is_empty() {
            String::new()
        } else {
            format!(" for {}", prefs.trip_type().describe())
        };
        let travelers = match prefs.travelers() {
            1 => "1 traveler".to_string(),
            n => format!("{n} travelers"),
        };
        let kind = if prefs.is_international() {
            "an international adventure"
        } else {
            "a getaway closer to home"
        };
        Some(format!(
            "Based on your preferences{} and a budget of ${} per person, we've crafted a {}-day journey to {}. Perfect for {} looking for {}.",
            interests,
            prefs.budget_per_person(),
            prefs.duration_days(),
            destination.label(),
            travelers,
            kind
        ))
    }
}

pub struct Wizard {
    preferences: TravelPreferences,
    state: WizardState,
    parser: RecommendationParser,
    generation: u64,
    in_flight: Option<FetchTicket>,
    last_error: Option<WizardError>,
    share_base: Option<Url>,
    share_link: Option<String>,
}

impl Wizard {
    pub fn new(config: &WizardConfig) -> Self {
        Self {
            preferences: TravelPreferences::default(),
            state: WizardState::CollectingBasics,
            parser: RecommendationParser::new(config.scoring.clone()),
            generation: 0,
            in_flight: None,
            last_error: None,
            share_base: config.share_base(),
            share_link: None,
        }
    }

    /// Builds a wizard for the given entry link. When the link carries a
    /// shared trip, the wizard restores it and returns the itinerary fetch
    /// that reopens it.
    pub fn from_entry(config: &WizardConfig, entry: Option<&str>) -> (Self, Option<PendingFetch>) {
        let mut wizard = Self::new(config);
        let pending = entry
            .and_then(share::snapshot_from_entry)
            .map(|snapshot| wizard.restore(&snapshot));
        (wizard, pending)
    }

    /// [`from_entry`](Self::from_entry) with the fetch performed. A failed
    /// fetch leaves the wizard at the first step with the error recorded.
    pub fn resume<A: TravelApi + ?Sized>(
        config: &WizardConfig,
        api: &A,
        entry: Option<&str>,
    ) -> Self {
        let (mut wizard, pending) = Self::from_entry(config, entry);
        if let Some(pending) = pending {
            if let Err(e) = wizard.run(api, pending) {
                warn!("[Wizard] Could not reopen shared trip: {}", e);
            }
        }
        wizard
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step()
    }

    pub fn preferences(&self) -> &TravelPreferences {
        &self.preferences
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&WizardError> {
        self.last_error.as_ref()
    }

    pub fn share_link(&self) -> Option<&str> {
        self.share_link.as_deref()
    }

    pub fn destinations(&self) -> &[Destination] {
        match &self.state {
            WizardState::ReviewingRecommendations { destinations }
            | WizardState::AwaitingItinerary { destinations, .. }
            | WizardState::ReviewingItinerary { destinations, .. } => destinations,
            _ => &[],
        }
    }

    pub fn selected(&self) -> Option<&Destination> {
        match &self.state {
            WizardState::AwaitingItinerary { selected, .. }
            | WizardState::ReviewingItinerary { selected, .. } => Some(selected),
            _ => None,
        }
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        match &self.state {
            WizardState::ReviewingItinerary { selected, .. } => selected.itinerary.as_ref(),
            _ => None,
        }
    }

    pub fn view(&self) -> WizardView<'_> {
        let step = self.step();
        WizardView {
            step,
            preferences: &self.preferences,
            destinations: self.destinations(),
            selected: self.selected(),
            busy: self.is_busy(),
            loading_message: match step {
                WizardStep::AwaitingRecommendations => Some(RECOMMENDATIONS_LOADING),
                WizardStep::AwaitingItinerary => Some(ITINERARY_LOADING),
                _ => None,
            },
            error: self.last_error.as_ref(),
            share_link: match step {
                WizardStep::ReviewingItinerary => self.share_link.as_deref(),
                _ => None,
            },
        }
    }

    /// Applies one preference edit. Only allowed while collecting input.
    pub fn edit(&mut self, event: PreferenceEvent) -> Result<(), WizardError> {
        let step = self.step();
        if !step.accepts_input() {
            return Err(self.fail(WizardError::InvalidStep {
                action: "edit preferences",
                step,
            }));
        }

        debug!("[Wizard] Edit: {:?}", event);
        let prefs = &mut self.preferences;
        let result = match event {
            PreferenceEvent::StartingPoint(value) => {
                prefs.set_starting_point(value);
                Ok(())
            }
            PreferenceEvent::ToggleTripType(tag) => {
                if !prefs.toggle_trip_type(tag) {
                    debug!("[Wizard] Trip type limit reached, ignoring {}", tag.id());
                }
                Ok(())
            }
            PreferenceEvent::Travelers(n) => prefs.set_travelers(n),
            PreferenceEvent::Month(month) => {
                prefs.set_month(month);
                Ok(())
            }
            PreferenceEvent::StartDate(date) => {
                prefs.set_start_date(date);
                Ok(())
            }
            PreferenceEvent::EndDate(date) => {
                prefs.set_end_date(date);
                Ok(())
            }
            PreferenceEvent::ClearDates => {
                prefs.clear_dates();
                Ok(())
            }
            PreferenceEvent::Duration(days) => prefs.set_duration(days),
            PreferenceEvent::Budget(amount) => {
                prefs.set_budget(amount);
                Ok(())
            }
            PreferenceEvent::International(flag) => {
                prefs.set_international(flag);
                Ok(())
            }
        };
        result.map_err(|e| self.fail(e.into()))
    }

    /// Basics to details. Always allowed from the first step.
    pub fn next(&mut self) -> Result<(), WizardError> {
        match self.state {
            WizardState::CollectingBasics => {
                self.state = WizardState::CollectingDetails;
                info!("[Wizard] -> {}", self.step());
                Ok(())
            }
            _ => {
                let step = self.step();
                Err(self.fail(WizardError::InvalidStep {
                    action: "continue",
                    step,
                }))
            }
        }
    }

    /// One step backwards. Leaving a loading step abandons its fetch.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let next = match std::mem::replace(&mut self.state, WizardState::CollectingBasics) {
            WizardState::CollectingBasics => {
                return Err(self.fail(WizardError::InvalidStep {
                    action: "go back",
                    step: WizardStep::CollectingBasics,
                }));
            }
            WizardState::CollectingDetails => WizardState::CollectingBasics,
            WizardState::AwaitingRecommendations { .. } => {
                self.abandon();
                WizardState::CollectingDetails
            }
            WizardState::ReviewingRecommendations { .. } => WizardState::CollectingDetails,
            WizardState::AwaitingItinerary {
                destinations,
                origin,
                ..
            } => {
                self.abandon();
                rollback(origin, destinations)
            }
            WizardState::ReviewingItinerary { destinations, .. } => {
                self.share_link = None;
                WizardState::ReviewingRecommendations { destinations }
            }
        };
        self.state = next;
        info!("[Wizard] <- {}", self.step());
        Ok(self.step())
    }

    /// Validates the preferences and starts the recommendations fetch.
    pub fn request_recommendations(&mut self) -> Result<PendingFetch, WizardError> {
        if self.is_busy() {
            return Err(WizardError::Busy);
        }
        let step = self.step();
        if step != WizardStep::CollectingDetails {
            return Err(self.fail(WizardError::InvalidStep {
                action: "request recommendations",
                step,
            }));
        }
        if let Err(e) = self.preferences.validate() {
            return Err(self.fail(e.into()));
        }

        let ticket = self.issue(FetchKind::Recommendations);
        self.state = WizardState::AwaitingRecommendations { ticket };
        info!(
            "[Wizard] Requesting recommendations: from={:?} types={}",
            self.preferences.starting_point(),
            self.preferences.trip_type().describe()
        );
        Ok(PendingFetch {
            ticket,
            request: FetchRequest::Recommendations {
                preferences: self.preferences.clone(),
            },
        })
    }

    /// Picks a recommended destination and starts its itinerary fetch.
    pub fn select_destination(&mut self, index: usize) -> Result<PendingFetch, WizardError> {
        if self.is_busy() {
            return Err(WizardError::Busy);
        }
        let lookup = match &self.state {
            WizardState::ReviewingRecommendations { destinations } => {
                Some(destinations.get(index).cloned())
            }
            _ => None,
        };
        let selected = match lookup {
            Some(Some(selected)) => selected,
            Some(None) => return Err(self.fail(WizardError::UnknownDestination(index))),
            None => {
                let step = self.step();
                return Err(self.fail(WizardError::InvalidStep {
                    action: "select a destination",
                    step,
                }));
            }
        };
        let destinations = match std::mem::replace(&mut self.state, WizardState::CollectingBasics) {
            WizardState::ReviewingRecommendations { destinations } => destinations,
            _ => Vec::new(),
        };
        Ok(self.begin_itinerary(destinations, selected, ItineraryOrigin::Recommendations))
    }

    /// Applies a fetch result to whichever fetch `ticket` belongs to.
    ///
    /// A response of the wrong kind fails the fetch as if the service had
    /// returned nothing usable.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        response: FetchResponse,
    ) -> Result<Outcome, WizardError> {
        match (ticket.kind, response) {
            (FetchKind::Recommendations, FetchResponse::Recommendations(r)) => {
                self.finish_recommendations(ticket, r)
            }
            (FetchKind::Itinerary, FetchResponse::Itinerary(r)) => self.finish_itinerary(ticket, r),
            (FetchKind::Recommendations, _) => {
                warn!("[Wizard] Itinerary response delivered for a recommendations ticket");
                self.finish_recommendations(ticket, Err(mismatched(ticket.kind)))
            }
            (FetchKind::Itinerary, _) => {
                warn!("[Wizard] Recommendations response delivered for an itinerary ticket");
                self.finish_itinerary(ticket, Err(mismatched(ticket.kind)))
            }
        }
    }

    pub fn finish_recommendations(
        &mut self,
        ticket: FetchTicket,
        response: Result<RecommendationsResponse, WizardError>,
    ) -> Result<Outcome, WizardError> {
        if !self.accept(ticket) {
            return Ok(Outcome::Discarded);
        }
        match response.and_then(|r| read_recommendations(&self.parser, r)) {
            Ok(destinations) => {
                info!(
                    "[Wizard] Received {} destinations: {}",
                    destinations.len(),
                    destinations
                        .iter()
                        .map(Destination::label)
                        .collect::<Vec<_>>()
                        .join("; ")
                );
                self.state = WizardState::ReviewingRecommendations { destinations };
                self.last_error = None;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                warn!("[Wizard] Recommendations failed: {}", e);
                self.state = WizardState::CollectingDetails;
                Err(self.fail(e))
            }
        }
    }

    pub fn finish_itinerary(
        &mut self,
        ticket: FetchTicket,
        response: Result<ItineraryResponse, WizardError>,
    ) -> Result<Outcome, WizardError> {
        if !self.accept(ticket) {
            return Ok(Outcome::Discarded);
        }
        let (destinations, selected, origin) =
            match std::mem::replace(&mut self.state, WizardState::CollectingBasics) {
                WizardState::AwaitingItinerary {
                    destinations,
                    selected,
                    origin,
                    ..
                } => (destinations, selected, origin),
                other => {
                    self.state = other;
                    return Ok(Outcome::Discarded);
                }
            };

        match response.and_then(read_itinerary) {
            Ok(itinerary) => {
                info!(
                    "[Wizard] Itinerary ready: destination={} days={}",
                    selected.label(),
                    itinerary.days.len()
                );
                let selected = selected.with_itinerary(itinerary);
                self.share_link = self.link_for(&selected);
                self.state = WizardState::ReviewingItinerary {
                    destinations,
                    selected,
                };
                self.last_error = None;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                warn!(
                    "[Wizard] Itinerary failed: destination={} error={}",
                    selected.label(),
                    e
                );
                self.state = rollback(origin, destinations);
                Err(self.fail(e))
            }
        }
    }

    /// Requests recommendations through `api` and applies the answer.
    pub fn submit<A: TravelApi + ?Sized>(&mut self, api: &A) -> Result<(), WizardError> {
        let pending = self.request_recommendations()?;
        self.run(api, pending)
    }

    /// Selects `index` and loads its itinerary through `api`.
    pub fn open_itinerary<A: TravelApi + ?Sized>(
        &mut self,
        api: &A,
        index: usize,
    ) -> Result<(), WizardError> {
        let pending = self.select_destination(index)?;
        self.run(api, pending)
    }

    fn run<A: TravelApi + ?Sized>(&mut self, api: &A, pending: PendingFetch) -> Result<(), WizardError> {
        let response = pending.dispatch(api);
        self.complete(pending.ticket, response).map(|_| ())
    }

    fn restore(&mut self, snapshot: &ShareSnapshot) -> PendingFetch {
        info!(
            "[Wizard] Restoring shared trip: destination={}, {}",
            snapshot.city, snapshot.country
        );
        self.preferences = snapshot.restore_preferences();
        self.state = WizardState::CollectingBasics;
        let destination = snapshot.destination();
        self.begin_itinerary(
            vec![destination.clone()],
            destination,
            ItineraryOrigin::SharedLink,
        )
    }

    fn begin_itinerary(
        &mut self,
        destinations: Vec<Destination>,
        selected: Destination,
        origin: ItineraryOrigin,
    ) -> PendingFetch {
        let ticket = self.issue(FetchKind::Itinerary);
        info!("[Wizard] Requesting itinerary: destination={}", selected.label());
        self.share_link = None;
        self.state = WizardState::AwaitingItinerary {
            ticket,
            destinations,
            selected: selected.clone(),
            origin,
        };
        PendingFetch {
            ticket,
            request: FetchRequest::Itinerary {
                preferences: self.preferences.clone(),
                destination: selected,
            },
        }
    }

    fn issue(&mut self, kind: FetchKind) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            kind,
        };
        self.in_flight = Some(ticket);
        self.last_error = None;
        ticket
    }

    /// Leaves the outstanding fetch running but makes its answer stale.
    fn abandon(&mut self) {
        self.generation += 1;
        debug!("[Wizard] Abandoned fetch, generation now {}", self.generation);
    }

    /// Releases the busy flag held by `ticket` and reports whether its
    /// response still applies.
    fn accept(&mut self, ticket: FetchTicket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
        }
        let current = ticket.generation == self.generation && self.state.ticket() == Some(ticket);
        if !current {
            warn!(
                "[Wizard] Discarding stale {:?} response: generation={} current={}",
                ticket.kind, ticket.generation, self.generation
            );
        }
        current
    }

    fn fail(&mut self, error: WizardError) -> WizardError {
        self.last_error = Some(error.clone());
        error
    }

    fn link_for(&self, destination: &Destination) -> Option<String> {
        let token = match ShareSnapshot::capture(destination, &self.preferences).encode() {
            Ok(token) => token,
            Err(e) => {
                warn!("[Wizard] Could not encode share link for {}: {}", destination.label(), e);
                return None;
            }
        };
        Some(match &self.share_base {
            Some(base) => share::share_link(base, &token).to_string(),
            None => format!("?{}={}", SHARE_PARAM, token),
        })
    }
}

fn mismatched(kind: FetchKind) -> WizardError {
    WizardError::MissingData(format!("response does not answer the {:?} request", kind))
}

fn rollback(origin: ItineraryOrigin, destinations: Vec<Destination>) -> WizardState {
    match origin {
        ItineraryOrigin::Recommendations => WizardState::ReviewingRecommendations { destinations },
        ItineraryOrigin::SharedLink => WizardState::CollectingBasics,
    }
}

fn read_recommendations(
    parser: &RecommendationParser,
    response: RecommendationsResponse,
) -> Result<Vec<Destination>, WizardError> {
    if !response.success {
        return Err(WizardError::MissingData(
            response
                .error
                .unwrap_or_else(|| RECOMMENDATIONS_FAILED.to_string()),
        ));
    }
    match response.recommendations {
        Some(text) if !text.trim().is_empty() => destinations_from_text(parser, &text),
        _ => Err(WizardError::MissingData(NO_DESTINATIONS_MESSAGE.to_string())),
    }
}

fn read_itinerary(response: ItineraryResponse) -> Result<Itinerary, WizardError> {
    if !response.success {
        return Err(WizardError::MissingData(
            response.error.unwrap_or_else(|| ITINERARY_FAILED.to_string()),
        ));
    }
    match response.itinerary {
        Some(raw) if !raw.is_null() => Ok(normalize_itinerary(&raw)?),
        _ => Err(WizardError::MissingData(ITINERARY_FAILED.to_string())),
    }
}

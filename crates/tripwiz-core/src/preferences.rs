// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::error::ValidationError;
use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_TRIP_TYPES: usize = 2;
pub const MIN_BUDGET: u32 = 100;
pub const MAX_BUDGET: u32 = 10_000;
pub const DEFAULT_DURATION_DAYS: u32 = 7;
pub const DEFAULT_BUDGET: u32 = 1_000;

/// Wire format for dates in requests and share snapshots.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Nightlife,
    Relaxation,
    Wilderness,
    Cultural,
    Romantic,
}

impl TripType {
    pub const ALL: [TripType; 5] = [
        TripType::Nightlife,
        TripType::Relaxation,
        TripType::Wilderness,
        TripType::Cultural,
        TripType::Romantic,
    ];

    pub fn id(self) -> &'static str {
        match self {
            TripType::Nightlife => "nightlife",
            TripType::Relaxation => "relaxation",
            TripType::Wilderness => "wilderness",
            TripType::Cultural => "cultural",
            TripType::Romantic => "romantic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TripType::Nightlife => "Nightlife & Partying",
            TripType::Relaxation => "Relaxation & Wellness",
            TripType::Wilderness => "Off the Beaten Path",
            TripType::Cultural => "Cultural Immersion",
            TripType::Romantic => "Romantic Getaway",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered set of at most [`MAX_TRIP_TYPES`] tags, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TripType>", into = "Vec<TripType>")]
pub struct TripTypeSelection(Vec<TripType>);

impl TripTypeSelection {
    /// Removes `tag` if selected, otherwise adds it when there is room.
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, tag: TripType) -> bool {
        if let Some(pos) = self.0.iter().position(|t| *t == tag) {
            self.0.remove(pos);
            true
        } else if self.0.len() < MAX_TRIP_TYPES {
            self.0.push(tag);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, tag: TripType) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[TripType] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = TripType> + '_ {
        self.0.iter().copied()
    }

    /// Labels joined with " and ", as used in the trip overview.
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

impl From<Vec<TripType>> for TripTypeSelection {
    /// Keeps the first occurrence of each tag and drops anything past the limit.
    fn from(tags: Vec<TripType>) -> Self {
        let mut selection = TripTypeSelection::default();
        for tag in tags {
            if !selection.contains(tag) {
                selection.toggle(tag);
            }
        }
        selection
    }
}

impl From<TripTypeSelection> for Vec<TripType> {
    fn from(selection: TripTypeSelection) -> Self {
        selection.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Inclusive day count when both bounds are set.
    pub fn days_inclusive(&self) -> Option<u32> {
        let (start, end) = (self.start?, self.end?);
        let days = end.signed_duration_since(start).num_days().max(0) + 1;
        u32::try_from(days).ok()
    }
}

/// Everything the user told us about the trip.
///
/// Fields are private so the invariants hold at all times: at most two trip
/// types, month and dates never both set, `end >= start`, duration derived
/// from a complete date range, budget inside `[MIN_BUDGET, MAX_BUDGET]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelPreferences {
    starting_point: String,
    trip_type: TripTypeSelection,
    travelers: u32,
    month: Option<Month>,
    dates: DateRange,
    duration_days: u32,
    budget_per_person: u32,
    is_international: bool,
}

impl Default for TravelPreferences {
    fn default() -> Self {
        Self {
            starting_point: String::new(),
            trip_type: TripTypeSelection::default(),
            travelers: 1,
            month: None,
            dates: DateRange::default(),
            duration_days: DEFAULT_DURATION_DAYS,
            budget_per_person: DEFAULT_BUDGET,
            is_international: true,
        }
    }
}

impl TravelPreferences {
    pub fn starting_point(&self) -> &str {
        &self.starting_point
    }

    pub fn trip_type(&self) -> &TripTypeSelection {
        &self.trip_type
    }

    pub fn travelers(&self) -> u32 {
        self.travelers
    }

    pub fn month(&self) -> Option<Month> {
        self.month
    }

    pub fn dates(&self) -> DateRange {
        self.dates
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn budget_per_person(&self) -> u32 {
        self.budget_per_person
    }

    pub fn is_international(&self) -> bool {
        self.is_international
    }

    pub fn set_starting_point(&mut self, value: impl Into<String>) {
        self.starting_point = value.into();
    }

    pub fn toggle_trip_type(&mut self, tag: TripType) -> bool {
        self.trip_type.toggle(tag)
    }

    pub fn set_travelers(&mut self, travelers: u32) -> Result<(), ValidationError> {
        if travelers == 0 {
            return Err(ValidationError::ZeroTravelers);
        }
        self.travelers = travelers;
        Ok(())
    }

    /// Choosing a month clears any explicit dates.
    pub fn set_month(&mut self, month: Option<Month>) {
        if month.is_some() {
            self.dates = DateRange::default();
        }
        self.month = month;
    }

    /// Sets the first day. An unset or earlier end is raised to match.
    pub fn set_start_date(&mut self, start: NaiveDate) {
        self.month = None;
        self.dates.start = Some(start);
        if self.dates.end.map_or(true, |end| end < start) {
            self.dates.end = Some(start);
        }
        self.sync_duration();
    }

    /// Sets the last day. An end before the start is raised to the start.
    pub fn set_end_date(&mut self, end: NaiveDate) {
        self.month = None;
        self.dates.end = Some(match self.dates.start {
            Some(start) if end < start => start,
            _ => end,
        });
        self.sync_duration();
    }

    pub fn clear_dates(&mut self) {
        self.dates = DateRange::default();
    }

    pub fn set_duration(&mut self, days: u32) -> Result<(), ValidationError> {
        if self.dates.is_complete() {
            return Err(ValidationError::DurationDerivedFromDates);
        }
        if days == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        self.duration_days = days;
        Ok(())
    }

    /// Stores the budget clamped into range and returns what was stored.
    pub fn set_budget(&mut self, budget: u32) -> u32 {
        self.budget_per_person = budget.clamp(MIN_BUDGET, MAX_BUDGET);
        self.budget_per_person
    }

    pub fn set_international(&mut self, international: bool) {
        self.is_international = international;
    }

    /// Guard for requesting recommendations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.starting_point.trim().is_empty() {
            return Err(ValidationError::MissingStartingPoint);
        }
        if self.trip_type.is_empty() {
            return Err(ValidationError::EmptyTripType);
        }
        Ok(())
    }

    /// Rounded per-day share of the per-person budget.
    pub fn daily_budget(&self) -> u32 {
        let days = self.duration_days.max(1);
        (self.budget_per_person + days / 2) / days
    }

    pub fn to_payload(&self) -> PreferencesPayload {
        let format = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        PreferencesPayload {
            starting_point: self.starting_point.trim().to_string(),
            trip_type: self.trip_type.as_slice().to_vec(),
            travelers: self.travelers,
            month: self
                .month
                .map(|m| m.name().to_string())
                .unwrap_or_default(),
            specific_dates: DatesPayload {
                start: format(self.dates.start),
                end: format(self.dates.end),
            },
            duration: self.duration_days,
            budget_per_person: self.budget_per_person,
            is_international: self.is_international,
        }
    }

    fn sync_duration(&mut self) {
        if let Some(days) = self.dates.days_inclusive() {
            self.duration_days = days;
        }
    }
}

/// Request body form of [`TravelPreferences`]. Unset month and dates are sent
/// as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPayload {
    pub starting_point: String,
    pub trip_type: Vec<TripType>,
    pub travelers: u32,
    pub month: String,
    pub specific_dates: DatesPayload,
    pub duration: u32,
    pub budget_per_person: u32,
    pub is_international: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatesPayload {
    pub start: String,
    pub end: String,
}

/// Accepts a full month name or its three-letter abbreviation, any case.
pub fn parse_month(text: &str) -> Option<Month> {
    text.trim().parse::<Month>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults_match_the_form() {
        let prefs = TravelPreferences::default();
        assert_eq!(prefs.travelers(), 1);
        assert_eq!(prefs.duration_days(), 7);
        assert_eq!(prefs.budget_per_person(), 1000);
        assert!(prefs.is_international());
        assert!(prefs.trip_type().is_empty());
        assert!(prefs.month().is_none());
        assert!(prefs.dates().is_empty());
    }

    #[test]
    fn test_trip_type_never_exceeds_two() {
        let mut prefs = TravelPreferences::default();
        assert!(prefs.toggle_trip_type(TripType::Cultural));
        assert!(prefs.toggle_trip_type(TripType::Romantic));
        assert!(!prefs.toggle_trip_type(TripType::Nightlife));
        assert_eq!(
            prefs.trip_type().as_slice(),
            &[TripType::Cultural, TripType::Romantic]
        );

        // Re-selecting removes, which frees a slot.
        assert!(prefs.toggle_trip_type(TripType::Cultural));
        assert!(prefs.toggle_trip_type(TripType::Nightlife));
        assert_eq!(
            prefs.trip_type().as_slice(),
            &[TripType::Romantic, TripType::Nightlife]
        );
    }

    #[test]
    fn test_any_click_order_stays_within_limit() {
        let clicks = [
            TripType::Nightlife,
            TripType::Wilderness,
            TripType::Nightlife,
            TripType::Cultural,
            TripType::Relaxation,
            TripType::Wilderness,
            TripType::Romantic,
            TripType::Romantic,
        ];
        let mut selection = TripTypeSelection::default();
        for tag in clicks {
            selection.toggle(tag);
            assert!(selection.len() <= MAX_TRIP_TYPES);
        }
        assert_eq!(selection.as_slice(), &[TripType::Cultural]);
    }

    #[test]
    fn test_selection_from_list_deduplicates_and_truncates() {
        let selection = TripTypeSelection::from(vec![
            TripType::Relaxation,
            TripType::Relaxation,
            TripType::Cultural,
            TripType::Romantic,
        ]);
        assert_eq!(
            selection.as_slice(),
            &[TripType::Relaxation, TripType::Cultural]
        );
    }

    #[test]
    fn test_duration_follows_date_range() {
        let mut prefs = TravelPreferences::default();
        prefs.set_start_date(date(2026, 6, 1));
        assert_eq!(prefs.dates().end, Some(date(2026, 6, 1)));
        assert_eq!(prefs.duration_days(), 1);

        prefs.set_end_date(date(2026, 6, 10));
        assert_eq!(prefs.duration_days(), 10);
    }

    #[test]
    fn test_end_before_start_is_raised() {
        let mut prefs = TravelPreferences::default();
        prefs.set_start_date(date(2026, 6, 10));
        prefs.set_end_date(date(2026, 6, 3));
        assert_eq!(prefs.dates().end, Some(date(2026, 6, 10)));
        assert_eq!(prefs.duration_days(), 1);

        prefs.set_end_date(date(2026, 6, 14));
        prefs.set_start_date(date(2026, 6, 20));
        assert_eq!(prefs.dates().end, Some(date(2026, 6, 20)));
    }

    #[test]
    fn test_month_and_dates_are_exclusive() {
        let mut prefs = TravelPreferences::default();
        prefs.set_start_date(date(2026, 3, 1));
        prefs.set_month(Some(Month::September));
        assert!(prefs.dates().is_empty());
        assert_eq!(prefs.month(), Some(Month::September));

        prefs.set_end_date(date(2026, 3, 5));
        assert!(prefs.month().is_none());
    }

    #[test]
    fn test_duration_locked_by_full_range() {
        let mut prefs = TravelPreferences::default();
        assert_eq!(prefs.set_duration(0), Err(ValidationError::ZeroDuration));
        assert!(prefs.set_duration(12).is_ok());

        prefs.set_start_date(date(2026, 1, 1));
        assert_eq!(
            prefs.set_duration(3),
            Err(ValidationError::DurationDerivedFromDates)
        );
        prefs.clear_dates();
        assert!(prefs.set_duration(3).is_ok());
    }

    #[test]
    fn test_budget_clamped_and_travelers_positive() {
        let mut prefs = TravelPreferences::default();
        assert_eq!(prefs.set_budget(20), MIN_BUDGET);
        assert_eq!(prefs.set_budget(50_000), MAX_BUDGET);
        assert_eq!(prefs.set_budget(2500), 2500);
        assert_eq!(prefs.set_travelers(0), Err(ValidationError::ZeroTravelers));
        assert_eq!(prefs.travelers(), 1);
    }

    #[test]
    fn test_validation_guard() {
        let mut prefs = TravelPreferences::default();
        assert_eq!(prefs.validate(), Err(ValidationError::MissingStartingPoint));
        prefs.set_starting_point("   ");
        assert_eq!(prefs.validate(), Err(ValidationError::MissingStartingPoint));
        prefs.set_starting_point("Boston");
        assert_eq!(prefs.validate(), Err(ValidationError::EmptyTripType));
        prefs.toggle_trip_type(TripType::Wilderness);
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn test_payload_shape() {
        let mut prefs = TravelPreferences::default();
        prefs.set_starting_point(" New York ");
        prefs.toggle_trip_type(TripType::Cultural);
        prefs.set_month(Some(Month::May));

        let json = serde_json::to_value(prefs.to_payload()).unwrap();
        assert_eq!(json["startingPoint"], "New York");
        assert_eq!(json["tripType"], serde_json::json!(["cultural"]));
        assert_eq!(json["month"], "May");
        assert_eq!(json["specificDates"]["start"], "");
        assert_eq!(json["budgetPerPerson"], 1000);
        assert_eq!(json["isInternational"], true);

        prefs.set_start_date(date(2026, 5, 2));
        let json = serde_json::to_value(prefs.to_payload()).unwrap();
        assert_eq!(json["month"], "");
        assert_eq!(json["specificDates"]["end"], "2026-05-02");
    }

    #[test]
    fn test_daily_budget_rounds() {
        let mut prefs = TravelPreferences::default();
        assert_eq!(prefs.daily_budget(), 143);
        prefs.set_duration(4).unwrap();
        assert_eq!(prefs.daily_budget(), 250);
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("july"), Some(Month::July));
        assert_eq!(parse_month("Dec"), Some(Month::December));
        assert_eq!(parse_month("Smarch"), None);
    }

    #[test]
    fn test_trip_type_ids() {
        for tag in TripType::ALL {
            assert_eq!(TripType::from_id(tag.id()), Some(tag));
        }
        assert_eq!(TripType::from_id("ROMANTIC"), Some(TripType::Romantic));
        assert_eq!(TripType::from_id("beach"), None);
    }
}

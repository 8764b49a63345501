// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Canonical itinerary records and the normalizer that produces them.
//!
//! The itinerary service answers with whatever a language model wrote: an
//! object, or a string holding something close to JSON. Numbers arrive as
//! strings, ranges or not at all, and whole sections go missing. Everything
//! past [`normalize_itinerary`] is fully populated, so consumers never check
//! for absent fields.

use crate::error::ParseError;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tripwiz_text::json_text::clean_json_text;

pub const DEFAULT_BREAKFAST: &str = "Local breakfast";
pub const DEFAULT_LUNCH: &str = "Local lunch";
pub const DEFAULT_DINNER: &str = "Local dinner";
pub const DEFAULT_TRANSPORTATION: &str = "Walking";
pub const DEFAULT_ACCOMMODATION: &str = "Hotel";
pub const DEFAULT_LOCATION_CATEGORY: &str = "attraction";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    pub duration: String,
    pub description: String,
    pub details: Vec<String>,
    pub tip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meals {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

impl Default for Meals {
    fn default() -> Self {
        Self {
            breakfast: DEFAULT_BREAKFAST.to_string(),
            lunch: DEFAULT_LUNCH.to_string(),
            dinner: DEFAULT_DINNER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayCosts {
    pub activities: f64,
    pub meals: f64,
    pub transport: f64,
}

impl DayCosts {
    pub fn total(&self) -> f64 {
        self.activities + self.meals + self.transport
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub activities: Vec<Activity>,
    pub meals: Meals,
    pub transportation: String,
    pub accommodation: String,
    pub costs: DayCosts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelRequirements {
    pub visas: Vec<String>,
    pub vaccinations: Vec<String>,
    pub currency_tips: Vec<String>,
    pub customs: Vec<String>,
}

impl TravelRequirements {
    pub fn is_empty(&self) -> bool {
        self.visas.is_empty()
            && self.vaccinations.is_empty()
            && self.currency_tips.is_empty()
            && self.customs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub transportation: f64,
    pub accommodation: f64,
    pub activities: f64,
    pub food: f64,
    pub misc: f64,
}

impl BudgetBreakdown {
    pub fn total(&self) -> f64 {
        self.categories().iter().map(|(_, amount)| amount).sum()
    }

    /// What is left of `budget` after the estimate. Negative when over budget.
    pub fn remaining(&self, budget: u32) -> f64 {
        f64::from(budget) - self.total()
    }

    pub fn categories(&self) -> [(&'static str, f64); 5] {
        [
            ("Transportation", self.transportation),
            ("Accommodation", self.accommodation),
            ("Activities", self.activities),
            ("Food", self.food),
            ("Miscellaneous", self.misc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// `(latitude, longitude)` in degrees.
    pub coordinates: (f64, f64),
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub days: Vec<DayPlan>,
    pub requirements: TravelRequirements,
    pub budget: BudgetBreakdown,
    pub locations: Vec<Location>,
}

impl Itinerary {
    /// Sum of every day's estimated costs.
    pub fn total_daily_costs(&self) -> f64 {
        self.days.iter().map(|d| d.costs.total()).sum()
    }
}

/// Parses a textual itinerary after stripping fences, prose and comments.
///
/// A string that decodes to another JSON string (double-encoded payload) is
/// decoded once more.
pub fn parse_itinerary_text(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyPayload);
    }
    if trimmed.starts_with('"') {
        if let Ok(Value::String(inner)) = serde_json::from_str::<Value>(trimmed) {
            return parse_itinerary_text(&inner);
        }
    }
    let cleaned = clean_json_text(trimmed);
    serde_json::from_str(&cleaned).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// Turns a raw itinerary payload into a fully-populated [`Itinerary`].
///
/// Only an unparseable text payload or a non-object payload fails; every
/// field is coerced on its own, so a broken field never hides the others.
pub fn normalize_itinerary(raw: &Value) -> Result<Itinerary, ParseError> {
    let parsed;
    let value = match raw {
        Value::String(text) => {
            parsed = parse_itinerary_text(text)?;
            &parsed
        }
        other => other,
    };
    let map = value.as_object().ok_or(ParseError::NotAnObject)?;

    let itinerary = Itinerary {
        days: coerce_days(field(map, &["dailyItinerary", "days"])),
        requirements: coerce_requirements(field(map, &["travelRequirements", "requirements"])),
        budget: coerce_budget(field(map, &["budgetBreakdown", "costs"])),
        locations: coerce_locations(field(map, &["locations"])),
    };
    debug!(
        "[Itinerary] Normalized: days={} locations={} budget_total={}",
        itinerary.days.len(),
        itinerary.locations.len(),
        itinerary.budget.total()
    );
    Ok(itinerary)
}

/// Coerces a cost-like value into a finite, non-negative amount.
///
/// Numbers pass through, numeric strings may carry currency symbols and
/// thousands separators, ranges such as `"150-250"` become their midpoint and
/// anything else is zero.
pub fn coerce_cost(value: Option<&Value>) -> f64 {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_amount(s),
        _ => None,
    };
    amount
        .filter(|n| n.is_finite())
        .map(|n| n.max(0.0))
        .unwrap_or(0.0)
}

/// Amount in a free-form cost string, `None` when there is no number at all.
pub fn parse_amount(text: &str) -> Option<f64> {
    static RANGE_RE: OnceLock<Regex> = OnceLock::new();
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    let range = RANGE_RE.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:-|–|—|to)\s*[^\d\s]?\s*(\d+(?:\.\d+)?)").unwrap()
    });
    let number = NUMBER_RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '$' | '€' | '£' | '¥' | ','))
        .collect();
    if let Ok(n) = compact.parse::<f64>() {
        return Some(n);
    }

    let without_separators = text.replace(',', "");
    if let Some(caps) = range.captures(&without_separators) {
        let low = caps[1].parse::<f64>().ok()?;
        let high = caps[2].parse::<f64>().ok()?;
        return Some((low + high) / 2.0);
    }
    number
        .find(&without_separators)
        .and_then(|m| m.as_str().parse().ok())
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_or(value: Option<&Value>, fallback: &str) -> String {
    text(value).unwrap_or_else(|| fallback.to_string())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| text(Some(v))).collect(),
        Some(v @ Value::String(_)) => text(Some(v)).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn number_like(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn coerce_days(value: Option<&Value>) -> Vec<DayPlan> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(position, entry)| match entry.as_object() {
            Some(day) => Some(coerce_day(position, day)),
            None => {
                debug!("[Itinerary] Skipping non-object day entry at position {position}");
                None
            }
        })
        .collect()
}

fn coerce_day(position: usize, day: &Map<String, Value>) -> DayPlan {
    let fallback_index = u32::try_from(position + 1).unwrap_or(u32::MAX);
    let index = day
        .get("day")
        .and_then(number_like)
        .filter(|n| *n >= 1.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.round() as u32)
        .unwrap_or(fallback_index);

    let meals = match day.get("meals").and_then(Value::as_object) {
        Some(m) => Meals {
            breakfast: text_or(m.get("breakfast"), DEFAULT_BREAKFAST),
            lunch: text_or(m.get("lunch"), DEFAULT_LUNCH),
            dinner: text_or(m.get("dinner"), DEFAULT_DINNER),
        },
        None => Meals::default(),
    };

    let costs = match day.get("estimatedCosts").and_then(Value::as_object) {
        Some(c) => DayCosts {
            activities: coerce_cost(c.get("activities")),
            meals: coerce_cost(c.get("meals")),
            transport: coerce_cost(c.get("transport").or_else(|| c.get("transportation"))),
        },
        None => DayCosts::default(),
    };

    DayPlan {
        day: index,
        activities: coerce_activities(day.get("activities")),
        meals,
        transportation: text_or(
            field(day, &["transportationType", "transportation"]),
            DEFAULT_TRANSPORTATION,
        ),
        accommodation: text_or(day.get("accommodation"), DEFAULT_ACCOMMODATION),
        costs,
    }
}

fn coerce_activities(value: Option<&Value>) -> Vec<Activity> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(v @ Value::String(_)) | Some(v @ Value::Object(_)) => vec![v],
        _ => return Vec::new(),
    };
    items.into_iter().filter_map(coerce_activity).collect()
}

fn coerce_activity(value: &Value) -> Option<Activity> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(Activity {
            name: s.trim().to_string(),
            ..Activity::default()
        }),
        Value::Object(a) => {
            let activity = Activity {
                name: text(field(a, &["name", "title", "activity"])).unwrap_or_default(),
                duration: text(a.get("duration")).unwrap_or_default(),
                description: text(a.get("description")).unwrap_or_default(),
                details: string_list(a.get("details")),
                tip: text(field(a, &["additionalInfo", "tip"])),
            };
            if activity.name.is_empty() && activity.description.is_empty() {
                None
            } else {
                Some(activity)
            }
        }
        _ => None,
    }
}

fn coerce_requirements(value: Option<&Value>) -> TravelRequirements {
    let Some(map) = value.and_then(Value::as_object) else {
        return TravelRequirements::default();
    };
    TravelRequirements {
        visas: string_list(map.get("visas")),
        vaccinations: string_list(map.get("vaccinations")),
        currency_tips: string_list(map.get("currencyTips")),
        customs: string_list(map.get("customs")),
    }
}

fn coerce_budget(value: Option<&Value>) -> BudgetBreakdown {
    let Some(map) = value.and_then(Value::as_object) else {
        return BudgetBreakdown::default();
    };
    BudgetBreakdown {
        transportation: coerce_cost(map.get("transportation")),
        accommodation: coerce_cost(map.get("accommodation")),
        activities: coerce_cost(map.get("activities")),
        food: coerce_cost(field(map, &["food", "meals"])),
        misc: coerce_cost(field(map, &["miscellaneous", "misc"])),
    }
}

fn coerce_locations(value: Option<&Value>) -> Vec<Location> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries.iter().filter_map(coerce_location).collect()
}

fn coerce_location(value: &Value) -> Option<Location> {
    let map = value.as_object()?;
    let name = text(map.get("name"))?;
    let coordinates = match map.get("coordinates") {
        Some(Value::Array(pair)) if pair.len() >= 2 => {
            (number_like(&pair[0])?, number_like(&pair[1])?)
        }
        Some(Value::Object(c)) => coordinate_object(c)?,
        _ => coordinate_object(map)?,
    };
    let (lat, lon) = coordinates;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        debug!("[Itinerary] Dropping location with out-of-range coordinates: name={name}");
        return None;
    }
    Some(Location {
        name,
        coordinates,
        category: text_or(
            field(map, &["type", "category"]),
            DEFAULT_LOCATION_CATEGORY,
        ),
    })
}

fn coordinate_object(map: &Map<String, Value>) -> Option<(f64, f64)> {
    let lat = field(map, &["lat", "latitude"]).and_then(number_like)?;
    let lon = field(map, &["lng", "lon", "longitude"]).and_then(number_like)?;
    Some((lat, lon))
}

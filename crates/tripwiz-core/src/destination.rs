// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::error::{ParseError, WizardError};
use crate::itinerary::Itinerary;
use log::warn;
use serde::{Deserialize, Serialize};
use tripwiz_text::{ParsedDestination, RecommendationParser};

pub const NO_DESTINATIONS_MESSAGE: &str = "No destinations found. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub city: String,
    pub country: String,
    pub match_score: u8,
    pub match_reason: String,
    pub activities: Vec<String>,
    pub best_areas: Vec<String>,
    pub itinerary: Option<Itinerary>,
}

impl From<ParsedDestination> for Destination {
    fn from(parsed: ParsedDestination) -> Self {
        Self {
            city: parsed.city,
            country: parsed.country,
            match_score: parsed.match_score,
            match_reason: parsed.match_reason,
            activities: parsed.activities,
            best_areas: parsed.best_areas,
            itinerary: None,
        }
    }
}

impl Destination {
    /// A destination known only by name, as restored from a share link.
    pub fn named(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            match_score: 0,
            match_reason: String::new(),
            activities: Vec::new(),
            best_areas: Vec::new(),
            itinerary: None,
        }
    }

    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }

    /// Attaches a freshly fetched itinerary, replacing any previous one.
    pub fn with_itinerary(self, itinerary: Itinerary) -> Self {
        Self {
            itinerary: Some(itinerary),
            ..self
        }
    }

    pub fn to_payload(&self) -> DestinationPayload {
        DestinationPayload {
            city: self.city.clone(),
            country: self.country.clone(),
            match_score: self.match_score,
            activities: self.activities.clone(),
            match_reason: self.match_reason.clone(),
        }
    }
}

/// The destination as sent with an itinerary request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationPayload {
    pub city: String,
    pub country: String,
    pub match_score: u8,
    pub activities: Vec<String>,
    pub match_reason: String,
}

/// Runs the recommendation parser and keeps the readable destinations.
///
/// Sections that fail are logged and dropped. No sections at all is missing
/// data; sections that all fail is a parse error.
pub fn destinations_from_text(
    parser: &RecommendationParser,
    text: &str,
) -> Result<Vec<Destination>, WizardError> {
    let results = parser.parse(text);
    if results.is_empty() {
        return Err(WizardError::MissingData(NO_DESTINATIONS_MESSAGE.to_string()));
    }

    let total = results.len();
    let destinations: Vec<Destination> = results
        .into_iter()
        .filter_map(|result| match result {
            Ok(parsed) => Some(Destination::from(parsed)),
            Err(e) => {
                warn!("[Recommendations] Dropping unreadable section: {}", e);
                None
            }
        })
        .collect();

    if destinations.is_empty() {
        return Err(ParseError::NoReadableDestinations(total).into());
    }
    Ok(destinations)
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::wizard::WizardStep;
use thiserror::Error;

/// Input problems reported in place; the wizard does not move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a starting point")]
    MissingStartingPoint,
    #[error("Please select at least one trip type")]
    EmptyTripType,
    #[error("At least one traveler is required")]
    ZeroTravelers,
    #[error("Trip length is set by the selected dates")]
    DurationDerivedFromDates,
    #[error("Trip length must be at least one day")]
    ZeroDuration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("itinerary payload is empty")]
    EmptyPayload,
    #[error("itinerary is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("itinerary payload is not an object")]
    NotAnObject,
    #[error("none of the {0} recommended destinations could be read")]
    NoReadableDestinations(usize),
}

/// Every failure the wizard can surface. All of them are recoverable: the
/// session keeps going and the user may retry the step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Could not read the response: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    MissingData(String),
    #[error("Another request is already in progress")]
    Busy,
    #[error("Cannot {action} while {step}")]
    InvalidStep {
        action: &'static str,
        step: WizardStep,
    },
    #[error("No destination at position {0}")]
    UnknownDestination(usize),
}

impl From<reqwest::Error> for WizardError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            WizardError::Parse(ParseError::InvalidJson(e.to_string()))
        } else {
            WizardError::Network(e.to_string())
        }
    }
}

impl WizardError {
    /// Whether the error leaves the wizard where it was, as opposed to rolling it back.
    pub fn is_in_place(&self) -> bool {
        matches!(
            self,
            WizardError::Validation(_)
                | WizardError::Busy
                | WizardError::InvalidStep { .. }
                | WizardError::UnknownDestination(_)
        )
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod api;
pub mod config;
pub mod destination;
pub mod error;
pub mod itinerary;
pub mod preferences;
pub mod share;
pub mod wizard;

use std::path::PathBuf;

pub use api::{HttpTravelApi, TravelApi};
pub use config::WizardConfig;
pub use destination::Destination;
pub use error::{ParseError, ValidationError, WizardError};
pub use itinerary::Itinerary;
pub use preferences::{TravelPreferences, TripType};
pub use wizard::{Wizard, WizardState, WizardStep, WizardView};

/// Per-user configuration directory, falling back to the working directory
/// when the platform has no notion of one.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "tripwiz", "tripwiz")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

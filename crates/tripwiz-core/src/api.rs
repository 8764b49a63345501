// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::WizardConfig;
use crate::destination::{Destination, DestinationPayload};
use crate::error::WizardError;
use crate::preferences::{PreferencesPayload, TravelPreferences};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const RECOMMENDATIONS_PATH: &str = "api/recommendations";
pub const ITINERARY_PATH: &str = "api/itinerary";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResponse {
    #[serde(default)]
    pub success: bool,
    /// Either an object or a string holding JSON-ish text.
    #[serde(default)]
    pub itinerary: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub preferences: PreferencesPayload,
    pub destination: DestinationPayload,
}

/// The remote recommendation/itinerary service.
///
/// Implementations block until the call completes or fails.
pub trait TravelApi {
    fn recommendations(
        &self,
        preferences: &TravelPreferences,
    ) -> Result<RecommendationsResponse, WizardError>;

    fn itinerary(
        &self,
        preferences: &TravelPreferences,
        destination: &Destination,
    ) -> Result<ItineraryResponse, WizardError>;
}

pub struct HttpTravelApi {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpTravelApi {
    pub fn new(config: &WizardConfig) -> Result<Self> {
        let base_url = Url::parse(config.api_base_url.trim())
            .with_context(|| format!("Invalid API base URL: {}", config.api_base_url))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{path}`, keeping any path prefix on the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, WizardError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))
            .map_err(|e| WizardError::Network(format!("invalid endpoint {path}: {e}")))
    }

    fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, WizardError> {
        let url = self.endpoint(path)?;
        info!("[Api] POST {}", url);
        let response = self.client.post(url.clone()).json(body).send()?.error_for_status()?;
        debug!("[Api] Response from {}: status={}", url, response.status());
        Ok(response.json::<R>()?)
    }
}

impl TravelApi for HttpTravelApi {
    fn recommendations(
        &self,
        preferences: &TravelPreferences,
    ) -> Result<RecommendationsResponse, WizardError> {
        self.post(RECOMMENDATIONS_PATH, &preferences.to_payload())
    }

    fn itinerary(
        &self,
        preferences: &TravelPreferences,
        destination: &Destination,
    ) -> Result<ItineraryResponse, WizardError> {
        let request = ItineraryRequest {
            preferences: preferences.to_payload(),
            destination: destination.to_payload(),
        };
        self.post(ITINERARY_PATH, &request)
    }
}

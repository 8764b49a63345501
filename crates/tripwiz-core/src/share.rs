// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Shareable trip links.
//!
//! A link carries just enough to ask for the same itinerary again: the
//! destination name and the preferences that shape the request. The
//! itinerary itself never travels in the link; opening one always re-fetches.

use crate::destination::Destination;
use crate::preferences::{parse_month, TravelPreferences, TripType, TripTypeSelection};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

/// Query parameter holding the encoded snapshot.
pub const SHARE_PARAM: &str = "trip";
pub const SNAPSHOT_VERSION: u8 = 1;

fn current_version() -> u8 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSnapshot {
    #[serde(default = "current_version")]
    pub v: u8,
    pub city: String,
    pub country: String,
    pub starting_point: String,
    pub trip_type: Vec<TripType>,
    pub duration: u32,
    pub budget_per_person: u32,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub specific_dates: SnapshotDates,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDates {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl ShareSnapshot {
    pub fn capture(destination: &Destination, prefs: &TravelPreferences) -> Self {
        let dates = prefs.dates();
        Self {
            v: SNAPSHOT_VERSION,
            city: destination.city.clone(),
            country: destination.country.clone(),
            starting_point: prefs.starting_point().to_string(),
            trip_type: prefs.trip_type().as_slice().to_vec(),
            duration: prefs.duration_days(),
            budget_per_person: prefs.budget_per_person(),
            month: prefs.month().map(|m| m.name().to_string()),
            specific_dates: SnapshotDates {
                start: dates.start,
                end: dates.end,
            },
        }
    }

    /// URL-safe token for the [`SHARE_PARAM`] query parameter.
    pub fn encode(&self) -> serde_json::Result<String> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?))
    }

    /// Reverses [`encode`](Self::encode). Any failure means "no shared trip".
    pub fn decode(token: &str) -> Option<Self> {
        let token = token.trim().trim_end_matches('=');
        if token.is_empty() {
            return None;
        }
        let bytes = match URL_SAFE_NO_PAD.decode(token) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("[Share] Ignoring token with bad encoding: {}", e);
                return None;
            }
        };
        let snapshot: ShareSnapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("[Share] Ignoring token with bad payload: {}", e);
                return None;
            }
        };
        if snapshot.v > SNAPSHOT_VERSION {
            debug!("[Share] Ignoring snapshot from a newer version: v={}", snapshot.v);
            return None;
        }
        if snapshot.city.trim().is_empty() || snapshot.country.trim().is_empty() {
            debug!("[Share] Ignoring snapshot without a destination");
            return None;
        }
        Some(snapshot)
    }

    pub fn destination(&self) -> Destination {
        Destination::named(self.city.trim(), self.country.trim())
    }

    /// Rebuilds the preferences the snapshot was taken from.
    ///
    /// Fields that are not part of a snapshot keep their session defaults.
    pub fn restore_preferences(&self) -> TravelPreferences {
        let mut prefs = TravelPreferences::default();
        prefs.set_starting_point(self.starting_point.as_str());
        for tag in TripTypeSelection::from(self.trip_type.clone()).iter() {
            prefs.toggle_trip_type(tag);
        }
        prefs.set_budget(self.budget_per_person);

        if let Some(start) = self.specific_dates.start {
            prefs.set_start_date(start);
        }
        if let Some(end) = self.specific_dates.end {
            prefs.set_end_date(end);
        }
        if prefs.dates().is_empty() {
            prefs.set_month(self.month.as_deref().and_then(parse_month));
        }
        if !prefs.dates().is_complete() {
            if let Err(e) = prefs.set_duration(self.duration) {
                debug!("[Share] Keeping default duration: {}", e);
            }
        }
        prefs
    }
}

/// `base` with the snapshot in its [`SHARE_PARAM`] parameter, replacing any
/// previous one and keeping other parameters.
pub fn share_link(base: &Url, token: &str) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != SHARE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(SHARE_PARAM, token);
    }
    url
}

/// Finds and decodes a snapshot in whatever the user pasted: a full link, a
/// bare query string or the token itself.
pub fn snapshot_from_entry(entry: &str) -> Option<ShareSnapshot> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    let from_query = |query: &str| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == SHARE_PARAM)
            .map(|(_, v)| v.into_owned())
    };

    let token = if let Ok(url) = Url::parse(entry) {
        url.query().and_then(from_query)
    } else if entry.contains('=') {
        from_query(entry.trim_start_matches('?'))
    } else {
        Some(entry.to_string())
    };

    match token {
        Some(token) => ShareSnapshot::decode(&token),
        None => {
            debug!("[Share] No {} parameter in entry", SHARE_PARAM);
            None
        }
    }
}

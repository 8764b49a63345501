// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};

/// How the terms of a [`Signal`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// At least one term must appear.
    #[default]
    Any,
    /// Every term must appear.
    All,
}

/// A textual signal that bumps the match score when detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub terms: Vec<String>,
    #[serde(default)]
    pub mode: MatchMode,
    pub increment: u8,
}

impl Signal {
    /// Case-sensitive substring detection.
    pub fn matches(&self, text: &str) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        match self.mode {
            MatchMode::Any => self.terms.iter().any(|t| text.contains(t.as_str())),
            MatchMode::All => self.terms.iter().all(|t| text.contains(t.as_str())),
        }
    }
}

/// Scoring rules for destinations that arrive without a score of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub base_score: u8,
    pub max_score: u8,
    pub signals: Vec<Signal>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let signal = |name: &str, terms: &[&str], mode| Signal {
            name: name.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
            mode,
            increment: 10,
        };

        Self {
            base_score: 60,
            max_score: 100,
            signals: vec![
                signal(
                    "Accessibility",
                    &["direct flights", "easily accessible"],
                    MatchMode::Any,
                ),
                signal("Timing", &["perfect time", "ideal time"], MatchMode::Any),
                signal("Budget Range", &["budget", "luxury"], MatchMode::All),
                signal("Trip Mix", &["cultural", "relaxation"], MatchMode::All),
            ],
        }
    }
}

impl ScoringConfig {
    /// Base score plus every detected signal, capped at `max_score` (and never above 100).
    pub fn score(&self, text: &str) -> u8 {
        let cap = u32::from(self.max_score.min(100));
        let total = self
            .signals
            .iter()
            .filter(|s| s.matches(text))
            .fold(u32::from(self.base_score), |acc, s| {
                acc + u32::from(s.increment)
            });
        total.min(cap) as u8
    }

    pub fn matched_signals<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.signals
            .iter()
            .filter(move |s| s.matches(text))
            .map(|s| s.name.as_str())
    }
}

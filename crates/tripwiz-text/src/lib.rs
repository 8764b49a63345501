// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Text heuristics for the trip wizard.
//!
//! Everything in this crate is a pure function of its input: no I/O, no
//! network, no shared state. The core crate feeds it raw service payloads and
//! gets structured records (or per-item failures) back.

pub mod json_text;
pub mod recommendations;
pub mod scoring;

pub use recommendations::{
    parse_recommendations, ParsedDestination, RecommendationParser, SectionError, SectionResult,
};
pub use scoring::{MatchMode, ScoringConfig, Signal};

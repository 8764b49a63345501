// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::json_text::strip_code_fences;
use crate::scoring::ScoringConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

pub const SECTION_MARKER: &str = "### Destination";
pub const MATCH_REASON_LABEL: &str = "Why it's a perfect match";
pub const ACTIVITIES_LABEL: &str = "Must-do activities and experiences";
pub const BEST_AREAS_LABEL: &str = "Best areas to stay";

/// One destination as extracted from the recommendation text, in presentation rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDestination {
    pub city: String,
    pub country: String,
    pub match_score: u8,
    pub match_reason: String,
    pub activities: Vec<String>,
    pub best_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("destination {index}: no \"City, Country\" heading")]
    MissingLocation { index: usize },
    #[error("destination {index}: missing \"{label}\" field")]
    MissingField { index: usize, label: &'static str },
    #[error("destination {index}: entry is not an object")]
    NotAnObject { index: usize },
}

impl SectionError {
    /// Zero-based position of the failing section in the source.
    pub fn index(&self) -> usize {
        match self {
            SectionError::MissingLocation { index }
            | SectionError::MissingField { index, .. }
            | SectionError::NotAnObject { index } => *index,
        }
    }
}

pub type SectionResult = Result<ParsedDestination, SectionError>;

#[derive(Debug, Clone, Default)]
pub struct RecommendationParser {
    scoring: ScoringConfig,
}

impl RecommendationParser {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Parses a recommendation payload into one result per destination, in source order.
    ///
    /// Accepts either the markdown-style text keyed by [`SECTION_MARKER`] or a
    /// JSON object with a `destinations` array. A malformed section yields an
    /// `Err` in its slot; the remaining sections are still parsed.
    pub fn parse(&self, text: &str) -> Vec<SectionResult> {
        let body = strip_code_fences(text);
        if body.starts_with('{') {
            if let Ok(value) = serde_json::from_str::<Value>(body) {
                if let Some(entries) = value.get("destinations").and_then(Value::as_array) {
                    log::debug!(
                        "[Recommendations] JSON payload with {} destinations",
                        entries.len()
                    );
                    return entries
                        .iter()
                        .enumerate()
                        .map(|(i, entry)| self.parse_json_entry(i, entry))
                        .collect();
                }
            }
        }

        let results: Vec<SectionResult> = text
            .split(SECTION_MARKER)
            .skip(1)
            .enumerate()
            .map(|(i, section)| self.parse_section(i, section))
            .collect();

        log::debug!(
            "[Recommendations] Parsed {} sections ({} failed)",
            results.len(),
            results.iter().filter(|r| r.is_err()).count()
        );
        results
    }

    fn parse_section(&self, index: usize, section: &str) -> SectionResult {
        let heading = section.lines().next().unwrap_or_default();
        let (city, country) =
            parse_heading(heading).ok_or(SectionError::MissingLocation { index })?;

        let match_reason = labeled_line(section, MATCH_REASON_LABEL).ok_or(
            SectionError::MissingField {
                index,
                label: MATCH_REASON_LABEL,
            },
        )?;
        let activities = labeled_block(section, ACTIVITIES_LABEL)
            .map(split_bullets)
            .ok_or(SectionError::MissingField {
                index,
                label: ACTIVITIES_LABEL,
            })?;
        let best_areas = labeled_block(section, BEST_AREAS_LABEL)
            .map(split_bullets)
            .unwrap_or_default();

        Ok(ParsedDestination {
            city,
            country,
            match_score: self.scoring.score(section),
            match_reason,
            activities,
            best_areas,
        })
    }

    fn parse_json_entry(&self, index: usize, entry: &Value) -> SectionResult {
        if !entry.is_object() {
            return Err(SectionError::NotAnObject { index });
        }
        let city = string_field(entry, "city").ok_or(SectionError::MissingLocation { index })?;
        let country =
            string_field(entry, "country").ok_or(SectionError::MissingLocation { index })?;

        let match_score = match entry.get("matchScore").and_then(number_like) {
            Some(score) => score.round().clamp(0.0, 100.0) as u8,
            None => self.scoring.score(&entry.to_string()),
        };

        Ok(ParsedDestination {
            city,
            country,
            match_score,
            match_reason: string_field(entry, "matchReason").unwrap_or_default(),
            activities: string_list(entry.get("activities")),
            best_areas: string_list(entry.get("bestAreas")),
        })
    }
}

/// Parses with the default scoring rules.
pub fn parse_recommendations(text: &str) -> Vec<SectionResult> {
    RecommendationParser::default().parse(text)
}

/// Extracts the trailing "City, Country" pair from a section heading such as
/// ` 1: Lisbon, Portugal`.
fn parse_heading(line: &str) -> Option<(String, String)> {
    let after_colon = match line.rfind(':') {
        Some(i) => &line[i + 1..],
        None => line,
    };
    let cleaned = after_colon
        .trim()
        .trim_matches(|c: char| c == '*' || c == '#')
        .trim_start_matches(|c: char| {
            c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | '-' | ')')
        })
        .trim();

    let (city, country) = cleaned.rsplit_once(',')?;
    let city = city.trim().trim_matches('*').trim();
    let country = country.trim().trim_matches('*').trim();
    if city.is_empty() || country.is_empty() {
        return None;
    }
    Some((city.to_string(), country.to_string()))
}

/// Byte offset just past a `**Label**:` (or `**Label:**`) marker.
fn find_label(section: &str, label: &str) -> Option<usize> {
    [format!("**{}**:", label), format!("**{}:**", label)]
        .iter()
        .filter_map(|marker| section.find(marker.as_str()).map(|i| i + marker.len()))
        .min()
}

fn labeled_line(section: &str, label: &str) -> Option<String> {
    let start = find_label(section, label)?;
    let rest = &section[start..];
    let line = rest.lines().next().unwrap_or_default();
    Some(line.trim().to_string())
}

/// Text after a label, up to the next line that opens with a `**Label**:`
/// marker, or the end of the section. Bold names inside bullets do not count.
fn labeled_block<'a>(section: &'a str, label: &str) -> Option<&'a str> {
    static NEXT_LABEL_RE: OnceLock<Regex> = OnceLock::new();
    let next_label = NEXT_LABEL_RE
        .get_or_init(|| Regex::new(r"(?m)^[ \t]*\*\*[^*\n]+(?:\*\*:|:\*\*)").unwrap());

    let start = find_label(section, label)?;
    let rest = &section[start..];
    let end = next_label.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Splits a bulleted block into items. Bullets are `-`, `*`, `•` or `1.` markers
/// at the start of a line or after whitespace, so `- A - B` gives `A`, `B`.
fn split_bullets(block: &str) -> Vec<String> {
    static BULLET_RE: OnceLock<Regex> = OnceLock::new();
    let bullet = BULLET_RE.get_or_init(|| Regex::new(r"(?:^|\s)(?:[-*•]|\d+[.)])\s+").unwrap());

    let trimmed = block.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if !bullet.is_match(trimmed) {
        return trimmed
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
    }
    bullet
        .split(trimmed)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn string_field(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn number_like(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

//! Generative (LLM) event extraction
//!
//! Sends the sentence, the user's timezone and their local "now" to a
//! chat-completion model, then validates the JSON it returns. Anything the
//! model gets wrong surfaces as a [`GenerativeError`] so the caller can fall
//! back to the rule-based extractor.

pub mod api;
pub mod prompt;

use crate::clock::TimezoneClock;
use crate::error::{GenerativeError, ParseError};
use crate::event::ParsedEvent;
use crate::parser::utils::{extract_json_object, meaningful, sanitize_user_input};
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use serde::Deserialize;

pub use api::{CompletionClient, HttpCompletionClient};

/// Longest input sent to the model
pub const MAX_INPUT_CHARS: usize = 1000;

/// Shape the model is asked to produce. Every field is optional here so a
/// missing one can be reported by name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionResponse {
    title: Option<String>,
    description: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    is_all_day: Option<bool>,
    location: Option<String>,
}

pub struct GenerativeExtractor<C> {
    client: C,
    clock: TimezoneClock,
}

impl<C: CompletionClient> GenerativeExtractor<C> {
    pub fn new(client: C, clock: TimezoneClock) -> Self {
        Self { client, clock }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Parse `text` in the named timezone with one model call
    pub async fn parse(&self, text: &str, timezone: &str) -> Result<ParsedEvent, ParseError> {
        let tz = TimezoneClock::resolve(timezone)?;
        Ok(self.parse_in(text, tz).await?)
    }

    pub async fn parse_in(&self, text: &str, tz: Tz) -> Result<ParsedEvent, GenerativeError> {
        let input = sanitize_user_input(text);
        let input = input.trim();
        if input.is_empty() {
            return Err(GenerativeError::EmptyInput);
        }
        let length = input.chars().count();
        if length > MAX_INPUT_CHARS {
            return Err(GenerativeError::InputTooLong(length));
        }

        let now = self.clock.now(tz);
        let user_prompt = prompt::build_prompt(input, tz, now);

        let content = self.client.complete(prompt::SYSTEM_PROMPT, &user_prompt).await?;
        debug!("Raw extraction from model: {}", content);

        event_from_response(&content, tz, &self.clock)
    }
}

/// Validate a model reply and turn it into an event
pub fn event_from_response(
    content: &str,
    tz: Tz,
    clock: &TimezoneClock,
) -> Result<ParsedEvent, GenerativeError> {
    let json = extract_json_object(content)
        .ok_or_else(|| GenerativeError::InvalidResponse("no JSON object in reply".to_string()))?;
    let response: ExtractionResponse = serde_json::from_str(json)?;

    let title = meaningful(response.title).ok_or(GenerativeError::MissingField("title"))?;
    let start_raw = response.start_time.ok_or(GenerativeError::MissingField("startTime"))?;
    let end_raw = response.end_time.ok_or(GenerativeError::MissingField("endTime"))?;
    let is_all_day = response.is_all_day.ok_or(GenerativeError::MissingField("isAllDay"))?;

    let start = parse_instant("startTime", &start_raw)?;
    let end = parse_instant("endTime", &end_raw)?;
    if end < start {
        return Err(GenerativeError::InvalidSpan { start: start_raw, end: end_raw });
    }

    let (start, end) = if is_all_day { all_day_geometry(start, end, tz, clock) } else { (start, end) };

    Ok(ParsedEvent::new(title, start, end, is_all_day)
        .with_location(meaningful(response.location))
        .with_description(meaningful(response.description)))
}

/// Snap model-supplied all-day bounds to local midnight and 23:59:59.
///
/// An exclusive end at the following midnight is read as ending on the
/// previous day.
fn all_day_geometry(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
    clock: &TimezoneClock,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = clock.to_local(start, tz).date();
    let end_local = clock.to_local(end, tz);
    let mut last = end_local.date();
    if end_local.time() == NaiveTime::MIN && last > first {
        last = last.pred_opt().unwrap_or(last);
    }

    let bounds = clock.all_day_range(first, last, tz);
    if bounds != (start, end) {
        warn!("Model all-day bounds {} - {} normalized to {} - {}", start, end, bounds.0, bounds.1);
    }
    bounds
}

/// ISO-8601 instant; a timestamp without an offset is taken as UTC
fn parse_instant(field: &'static str, value: &str) -> Result<DateTime<Utc>, GenerativeError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| GenerativeError::InvalidTimestamp { field, value: value.to_string() })
}

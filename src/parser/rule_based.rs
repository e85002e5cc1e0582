//! Deterministic fallback extractor
//!
//! Date/time recognition, then keyword segmentation of whatever is left,
//! then timezone normalization. Non-empty input always produces an event.

use crate::clock::TimezoneClock;
use crate::error::ParseError;
use crate::event::ParsedEvent;
use crate::parser::natural_language::segmenter::FieldSegmenter;
use crate::parser::natural_language::time_parser::DateTimeSpanExtractor;
use crate::parser::utils::collapse_whitespace;
use chrono::Duration;
use chrono_tz::Tz;
use log::{debug, warn};

pub const DEFAULT_DURATION_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct RuleBasedExtractor {
    clock: TimezoneClock,
    spans: DateTimeSpanExtractor,
    segmenter: FieldSegmenter,
    default_duration: Duration,
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::new(TimezoneClock::system())
    }
}

impl RuleBasedExtractor {
    pub fn new(clock: TimezoneClock) -> Self {
        Self {
            clock,
            spans: DateTimeSpanExtractor::new(),
            segmenter: FieldSegmenter::default(),
            default_duration: Duration::minutes(DEFAULT_DURATION_MINUTES),
        }
    }

    pub fn with_segmenter(mut self, segmenter: FieldSegmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Length of events whose text gives no end or duration
    pub fn with_default_duration(mut self, minutes: i64) -> Self {
        match Duration::try_minutes(minutes.max(0)) {
            Some(duration) => self.default_duration = duration,
            None => warn!(
                "Default duration of {} minutes is out of range, keeping {}",
                minutes, self.default_duration
            ),
        }
        self
    }

    /// Parse `text` in the named timezone.
    ///
    /// Returns `Ok(None)` for empty or whitespace-only text. The only error
    /// is an unknown timezone.
    pub fn parse(&self, text: &str, timezone: &str) -> Result<Option<ParsedEvent>, ParseError> {
        let tz = TimezoneClock::resolve(timezone)?;
        Ok(self.parse_in(text, tz))
    }

    /// Same as [`RuleBasedExtractor::parse`] with an already resolved zone
    pub fn parse_in(&self, text: &str, tz: Tz) -> Option<ParsedEvent> {
        if text.trim().is_empty() {
            debug!("Empty input, no event");
            return None;
        }

        let now = self.clock.now(tz);
        let span = self.spans.extract(text, now);

        let residual = collapse_whitespace(&span.residual(text));
        let segments = self.segmenter.segment(&residual);

        let (start, end) = if span.is_all_day {
            self.clock.all_day_bounds(span.start_local.date(), tz)
        } else {
            // Past the end of the calendar the event collapses to its start
            let end_local = span.end_local.unwrap_or_else(|| {
                span.start_local.checked_add_signed(self.default_duration).unwrap_or(span.start_local)
            });
            (self.clock.to_utc(span.start_local, tz), self.clock.to_utc(end_local, tz))
        };

        let event = ParsedEvent::new(segments.title, start, end, span.is_all_day)
            .with_location(segments.location)
            .with_description(segments.description);

        debug!("Rule-based extraction produced: {:?}", event);
        Some(event)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when nothing is left over for one
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// Events spanning at least this many minutes count as all-day
pub const ALL_DAY_MINUTES: i64 = 24 * 60;

/// A calendar event extracted from free text
///
/// `duration` and the implied all-day flag are derived from the bounds,
/// so the only way to build one is [`ParsedEvent::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Minutes between start and end
    pub duration: i64,
    pub is_all_day: bool,
    pub location: Option<String>,
}

impl ParsedEvent {
    /// Build an event, recomputing duration and the all-day flag.
    ///
    /// An end before the start collapses to a zero-length event.
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        all_day_detected: bool,
    ) -> Self {
        let end_time = end_time.max(start_time);
        let duration = (end_time - start_time).num_minutes();
        let title = title.into();
        let title = if title.trim().is_empty() { UNTITLED_EVENT.to_string() } else { title };

        Self {
            title,
            description: None,
            start_time,
            end_time,
            duration,
            is_all_day: all_day_detected || duration >= ALL_DAY_MINUTES,
            location: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = non_empty(description);
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = non_empty(location);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

//! Prompt construction for structured event extraction

use chrono::NaiveDateTime;
use chrono_tz::Tz;

pub const SYSTEM_PROMPT: &str = "You are a strict JSON calendar event extraction engine. \
You read a user's sentence and reply ONLY with a single JSON object, with no markdown, \
no backticks and no extra text.";

/// Build the user prompt for one extraction request.
///
/// The user's local wall-clock time and timezone are embedded so relative
/// expressions like "tomorrow" resolve against the user's day, not the
/// server's.
pub fn build_prompt(input: &str, tz: Tz, now_local: NaiveDateTime) -> String {
    format!(
        r#"Extract a calendar event from the user message below.
Current local date and time: {now} ({weekday})
User timezone: {tz}

Rules:
1. "title" is a short name for the event, without date, time or location words.
2. "startTime" and "endTime" are ISO-8601 timestamps in UTC ending in "Z", converted from the user's timezone.
3. Resolve relative dates ("tomorrow", "next Friday") against the current local date above.
4. "next <weekday>" means the occurrence in the following week, at least 7 days from today.
5. If no time is given, start at the current local time.
6. If no end or duration is given, end one hour after the start.
7. If the event lasts all day, set "isAllDay" to true, start at 00:00:00 and end at 23:59:59 local time on the same date, both converted to UTC.
8. "location" and "description" are null when not mentioned.
9. Never invent details that are not in the message.

The JSON shape must be exactly:
{{"title":"<string>","description":"<string or null>","startTime":"<ISO-8601 UTC>","endTime":"<ISO-8601 UTC>","isAllDay":<true|false>,"location":"<string or null>"}}

User message: "{input}""#,
        now = now_local.format("%Y-%m-%d %H:%M:%S"),
        weekday = now_local.format("%A"),
        tz = tz.name(),
        input = input.replace('"', "'"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_prompt_embeds_local_context() {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(10, 5, 0).unwrap();
        let prompt = build_prompt("Lunch \"tomorrow\" at noon", tz, now);

        assert!(prompt.contains("Current local date and time: 2024-06-10 10:05:00 (Monday)"));
        assert!(prompt.contains("User timezone: America/Los_Angeles"));
        assert!(prompt.contains("User message: \"Lunch 'tomorrow' at noon\""));
        assert!(prompt.contains("\"isAllDay\""));
    }
}

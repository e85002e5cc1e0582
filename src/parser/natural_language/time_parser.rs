//! Date/time span recognition for natural language event text
//!
//! Scans a sentence for the first date/time expression ("tomorrow at noon",
//! "on December 25th", "from 9am to 10am", "in 30 minutes", "for 45 minutes")
//! and resolves it against the caller's local "now".
//!
//! Only the first expression is used. Pieces that sit directly next to each
//! other (separated by whitespace or commas) belong to the same expression,
//! so "Friday, Dec 20 at 3pm for an hour" is read as one span, but in
//! "lunch tomorrow, then dinner on Friday" the Friday part is ignored.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

/// Time used when a date is given without a clock time
const DATE_ONLY_HOUR: u32 = 9;

static ALL_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:all[\s-]+day|whole\s+day|entire\s+day)\b").unwrap());

static RELATIVE_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:on|by)\s+)?\b(?P<day>the\s+day\s+after\s+tomorrow|day\s+after\s+tomorrow|today|tonight|tomorrow|tmrw)(?:\s+(?P<night>night))?\b",
    )
    .unwrap()
});

static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:on|by)\s+)?\b(?:(?P<qualifier>this|next|coming)\s+)?(?P<weekday>monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    )
    .unwrap()
});

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\b(?:on|by)\s+)?\b(?P<year>\d{4})-(?P<month>\d{1,2})-(?P<day>\d{1,2})\b")
        .unwrap()
});

static SLASH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:on|by)\s+)?\b(?P<month>\d{1,2})/(?P<day>\d{1,2})(?:/(?P<year>\d{4}|\d{2}))?\b",
    )
    .unwrap()
});

const MONTH_NAMES: &str =
    r"january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:\b(?:on|by)\s+)?\b(?P<month>{MONTH_NAMES})\.?\s+(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s*(?P<year>\d{{4}})\b)?"
    ))
    .unwrap()
});

static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:\b(?:on|by)\s+)?(?:\bthe\s+)?\b(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?(?P<month>{MONTH_NAMES})\b(?:,?\s*(?P<year>\d{{4}})\b)?"
    ))
    .unwrap()
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:at|by|around|from)\s+|@\s*)?(?:\b(?P<h>\d{1,2})(?::(?P<m>\d{2}))?\s*(?P<p>[ap])\.?m\b\.?|\b(?P<h24>[01]?\d|2[0-3]):(?P<m24>[0-5]\d)\b|\b(?P<named>noon|midday|midnight)\b)",
    )
    .unwrap()
});

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b(?P<prefix>from|between)\s+)?\b(?P<h1>\d{1,2})(?::(?P<m1>\d{2}))?\s*(?:(?P<p1>[ap])\.?m\b\.?)?\s*(?P<sep>-|–|\bto\b|\buntil\b|\btill\b|\band\b)\s*(?P<h2>\d{1,2})(?::(?P<m2>\d{2}))?\s*(?:(?P<p2>[ap])\.?m\b\.?)?",
    )
    .unwrap()
});

static PART_OF_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\b(?:in\s+the|this)\s+)?\b(?P<part>morning|afternoon|evening)\b").unwrap()
});

const AMOUNT: &str = r"(?P<amount>an?|half\s+an|\d+(?:\.\d+)?)";
const UNIT: &str = r"(?P<unit>minutes?|mins?|hours?|hrs?|h|m|days?|weeks?)";

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\bfor\s+{AMOUNT}\s*{UNIT}\b")).unwrap());

static OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\bin\s+{AMOUNT}\s*{UNIT}\b")).unwrap());

/// Result of scanning text for a date/time expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeSpan {
    pub start_local: NaiveDateTime,
    pub end_local: Option<NaiveDateTime>,
    pub is_all_day: bool,
    /// Exact substring of the input that was recognized
    pub consumed_text: String,
    /// Byte range of `consumed_text` within the input
    pub consumed_range: Range<usize>,
}

impl DateTimeSpan {
    /// Input text with the recognized expression and any all-day phrase removed
    pub fn residual(&self, text: &str) -> String {
        let range = &self.consumed_range;
        let without_span = match (text.get(..range.start), text.get(range.end..)) {
            (Some(before), Some(after)) if !range.is_empty() => format!("{} {}", before, after),
            _ => text.to_string(),
        };
        ALL_DAY_RE.replace_all(&without_span, " ").into_owned()
    }
}

/// Case-insensitive check for "all day", "whole day" or "entire day"
pub fn contains_all_day_phrase(text: &str) -> bool {
    ALL_DAY_RE.is_match(text)
}

/// Finds and resolves the first date/time expression in a piece of text
#[derive(Debug, Clone, Copy)]
pub struct DateTimeSpanExtractor {
    date_only_time: NaiveTime,
}

impl Default for DateTimeSpanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DateTimeSpanExtractor {
    pub fn new() -> Self {
        Self { date_only_time: hm(DATE_ONLY_HOUR, 0).unwrap_or(NaiveTime::MIN) }
    }

    /// Scan `text` and resolve the first expression against `now`.
    ///
    /// Never fails. When nothing is recognized the span starts at `now`,
    /// has no end and consumes nothing.
    pub fn extract(&self, text: &str, now: NaiveDateTime) -> DateTimeSpan {
        let is_all_day = contains_all_day_phrase(text);
        let pieces = first_expression(text);

        let (first, last) = match (pieces.first(), pieces.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                debug!("No date/time expression found in '{}'", text);
                return DateTimeSpan {
                    start_local: now,
                    end_local: None,
                    is_all_day,
                    consumed_text: String::new(),
                    consumed_range: 0..0,
                };
            }
        };
        let consumed_range = first.start..last.end;
        let consumed_text = text[consumed_range.clone()].to_string();

        let mut accum = Accumulator::default();
        for found in &pieces {
            accum.apply(found.piece);
        }
        let (start_local, end_local) = accum.resolve(now, self.date_only_time);

        debug!(
            "Recognized '{}' -> start {}, end {:?}, all day {}",
            consumed_text, start_local, end_local, is_all_day
        );

        DateTimeSpan { start_local, end_local, is_all_day, consumed_text, consumed_range }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeekdayQualifier {
    Coming,
    This,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateSpec {
    /// Days after today
    Relative(i64),
    Weekday(Weekday, WeekdayQualifier),
    Calendar { month: u32, day: u32, year: Option<i32> },
}

impl DateSpec {
    fn resolve(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateSpec::Relative(days) => Some(today + Duration::days(days)),
            DateSpec::Weekday(target, qualifier) => {
                let ahead = (i64::from(target.num_days_from_monday())
                    - i64::from(today.weekday().num_days_from_monday()))
                .rem_euclid(7);
                let days = match qualifier {
                    WeekdayQualifier::This => ahead,
                    WeekdayQualifier::Coming if ahead == 0 => 7,
                    WeekdayQualifier::Coming => ahead,
                    WeekdayQualifier::Next if ahead == 0 => 7,
                    WeekdayQualifier::Next => ahead + 7,
                };
                Some(today + Duration::days(days))
            }
            DateSpec::Calendar { month, day, year: Some(year) } => {
                NaiveDate::from_ymd_opt(year, month, day)
            }
            DateSpec::Calendar { month, day, year: None } => {
                // Next occurrence on or after today; Feb 29 may be a few years out
                (today.year()..today.year() + 8)
                    .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
                    .find(|date| *date >= today)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Date(DateSpec),
    /// A day with an implied time of day ("tonight", "tomorrow night")
    DatePart(DateSpec, NaiveTime),
    Time(NaiveTime),
    /// "morning", "this afternoon": weaker than an explicit clock time
    PartOfDay(NaiveTime),
    Range(NaiveTime, NaiveTime),
    Duration(Duration),
    Offset(Duration),
}

#[derive(Debug, Clone, Copy)]
struct Found {
    start: usize,
    end: usize,
    piece: Piece,
}

#[derive(Debug, Default)]
struct Accumulator {
    date: Option<DateSpec>,
    time: Option<NaiveTime>,
    part_of_day: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    duration: Option<Duration>,
    offset: Option<Duration>,
}

impl Accumulator {
    fn apply(&mut self, piece: Piece) {
        match piece {
            Piece::Date(spec) => self.apply_date(spec),
            Piece::DatePart(spec, time) => {
                self.apply_date(spec);
                self.part_of_day.get_or_insert(time);
            }
            Piece::Time(time) => {
                self.time.get_or_insert(time);
            }
            Piece::PartOfDay(time) => {
                self.part_of_day.get_or_insert(time);
            }
            Piece::Range(start, end) => {
                if self.time.is_none() {
                    self.time = Some(start);
                    self.end_time = Some(end);
                }
            }
            Piece::Duration(duration) => {
                self.duration.get_or_insert(duration);
            }
            Piece::Offset(offset) => {
                self.offset.get_or_insert(offset);
            }
        }
    }

    fn apply_date(&mut self, spec: DateSpec) {
        match (self.date, spec) {
            (None, _) => self.date = Some(spec),
            // "Friday, December 20": the calendar date is the precise one
            (Some(DateSpec::Weekday(..)), DateSpec::Calendar { .. }) => self.date = Some(spec),
            _ => {}
        }
    }

    fn resolve(
        &self,
        now: NaiveDateTime,
        date_only_time: NaiveTime,
    ) -> (NaiveDateTime, Option<NaiveDateTime>) {
        let explicit_time = self.time.or(self.part_of_day);

        // An offset past the calendar's range is ignored
        let shifted = self.offset.and_then(|offset| now.checked_add_signed(offset));
        let start = match shifted {
            Some(shifted) => match explicit_time {
                Some(time) => shifted.date().and_time(time),
                None => shifted,
            },
            None => {
                let today = now.date();
                let date = self.date.and_then(|spec| spec.resolve(today));
                match (date, explicit_time) {
                    (Some(date), Some(time)) => date.and_time(time),
                    (Some(date), None) => date.and_time(date_only_time),
                    (None, Some(time)) => today.and_time(time),
                    (None, None) => now,
                }
            }
        };

        let end = match (self.end_time, self.duration) {
            (Some(end_time), _) => {
                let end = start.date().and_time(end_time);
                if end <= start {
                    end.checked_add_signed(Duration::days(1))
                } else {
                    Some(end)
                }
            }
            (None, Some(duration)) => start.checked_add_signed(duration),
            (None, None) => None,
        };

        (start, end)
    }
}

/// All pieces of the first expression, in text order
fn first_expression(text: &str) -> Vec<Found> {
    let all = recognize(text);
    let mut pieces: Vec<Found> = Vec::new();

    for found in all {
        match pieces.last() {
            None => pieces.push(found),
            Some(prev) => {
                let gap = &text[prev.end..found.start];
                if gap.chars().all(|c| c.is_whitespace() || c == ',') {
                    pieces.push(found);
                } else {
                    break;
                }
            }
        }
    }

    pieces
}

/// Every recognized piece, non-overlapping, earliest and longest first
fn recognize(text: &str) -> Vec<Found> {
    let recognizers: [(&Lazy<Regex>, fn(&Captures) -> Option<Piece>); 10] = [
        (&RANGE_RE, range_piece),
        (&TIME_RE, time_piece),
        (&RELATIVE_DAY_RE, relative_day_piece),
        (&WEEKDAY_RE, weekday_piece),
        (&ISO_DATE_RE, calendar_piece),
        (&SLASH_DATE_RE, calendar_piece),
        (&MONTH_DAY_RE, calendar_piece),
        (&DAY_MONTH_RE, calendar_piece),
        (&PART_OF_DAY_RE, part_of_day_piece),
        (&DURATION_RE, duration_piece),
    ];

    let mut candidates: Vec<Found> = Vec::new();
    for (re, build) in recognizers.iter() {
        for caps in re.captures_iter(text) {
            if let (Some(whole), Some(piece)) = (caps.get(0), build(&caps)) {
                candidates.push(Found { start: whole.start(), end: whole.end(), piece });
            }
        }
    }
    for caps in OFFSET_RE.captures_iter(text) {
        if let (Some(whole), Some(duration)) = (caps.get(0), amount_duration(&caps)) {
            candidates.push(Found { start: whole.start(), end: whole.end(), piece: Piece::Offset(duration) });
        }
    }

    candidates.sort_by(|a, b| a.start.cmp(&b.start).then((b.end - b.start).cmp(&(a.end - a.start))));

    let mut kept: Vec<Found> = Vec::new();
    for candidate in candidates {
        if kept.last().map_or(true, |last| candidate.start >= last.end) {
            kept.push(candidate);
        }
    }
    kept
}

fn hm(hour: u32, minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Convert a 12-hour clock reading to a 24-hour time
fn twelve_hour(hour: u32, minute: u32, meridiem: &str) -> Option<NaiveTime> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour_24 = match (hour, meridiem.to_ascii_lowercase().as_str()) {
        (12, "a") => 0,
        (h, "a") => h,
        (12, "p") => 12,
        (h, _) => h + 12,
    };
    hm(hour_24, minute)
}

fn capture_u32(caps: &Captures, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn time_piece(caps: &Captures) -> Option<Piece> {
    if let Some(named) = caps.name("named") {
        let time = match named.as_str().to_ascii_lowercase().as_str() {
            "midnight" => NaiveTime::MIN,
            _ => hm(12, 0)?,
        };
        return Some(Piece::Time(time));
    }
    if let Some(hour) = capture_u32(caps, "h24") {
        return hm(hour, capture_u32(caps, "m24")?).map(Piece::Time);
    }
    let hour = capture_u32(caps, "h")?;
    let minute = capture_u32(caps, "m").unwrap_or(0);
    twelve_hour(hour, minute, caps.name("p")?.as_str()).map(Piece::Time)
}

fn range_piece(caps: &Captures) -> Option<Piece> {
    let sep = caps.name("sep")?.as_str().to_ascii_lowercase();
    let prefix = caps.name("prefix").map(|m| m.as_str().to_ascii_lowercase());
    if sep == "and" && prefix.as_deref() != Some("between") {
        return None;
    }

    let (h1, m1) = (capture_u32(caps, "h1")?, capture_u32(caps, "m1"));
    let (h2, m2) = (capture_u32(caps, "h2")?, capture_u32(caps, "m2"));
    let p1 = caps.name("p1").map(|m| m.as_str());
    let p2 = caps.name("p2").map(|m| m.as_str());

    // Bare "2-3" is more often a count than a time range
    if p1.is_none() && p2.is_none() && m1.is_none() && m2.is_none() && prefix.is_none() {
        return None;
    }

    let (m1, m2) = (m1.unwrap_or(0), m2.unwrap_or(0));
    let (start, end) = match (p1, p2) {
        (Some(p1), Some(p2)) => (twelve_hour(h1, m1, p1)?, twelve_hour(h2, m2, p2)?),
        (None, Some(p2)) => {
            let end = twelve_hour(h2, m2, p2)?;
            let same = twelve_hour(h1, m1, p2)?;
            // "11-1pm" starts in the morning
            let start = if same > end { same - Duration::hours(12) } else { same };
            (start, end)
        }
        (Some(p1), None) => {
            let start = twelve_hour(h1, m1, p1)?;
            let same = twelve_hour(h2, m2, p1)?;
            let end = if same <= start { same + Duration::hours(12) } else { same };
            (start, end)
        }
        (None, None) => {
            let start = hm(h1, m1)?;
            let mut end = hm(h2, m2)?;
            // "from 9 to 5" is a working day, not an overnight shift
            if end <= start && h2 < 12 {
                end += Duration::hours(12);
            }
            (start, end)
        }
    };
    Some(Piece::Range(start, end))
}

fn relative_day_piece(caps: &Captures) -> Option<Piece> {
    let day = caps.name("day")?.as_str().to_ascii_lowercase();
    let night = caps.name("night").is_some();
    let tonight = hm(20, 0)?;

    let spec = if day.contains("after") {
        DateSpec::Relative(2)
    } else if day.starts_with("tom") || day == "tmrw" {
        DateSpec::Relative(1)
    } else {
        DateSpec::Relative(0)
    };

    if day == "tonight" || night {
        Some(Piece::DatePart(spec, tonight))
    } else {
        Some(Piece::Date(spec))
    }
}

fn weekday_piece(caps: &Captures) -> Option<Piece> {
    let weekday: Weekday = caps.name("weekday")?.as_str().parse().ok()?;
    let qualifier = match caps.name("qualifier").map(|m| m.as_str().to_ascii_lowercase()) {
        Some(q) if q == "this" => WeekdayQualifier::This,
        Some(q) if q == "next" => WeekdayQualifier::Next,
        _ => WeekdayQualifier::Coming,
    };
    Some(Piece::Date(DateSpec::Weekday(weekday, qualifier)))
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_ascii_lowercase();
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn calendar_piece(caps: &Captures) -> Option<Piece> {
    let month_text = caps.name("month")?.as_str();
    let month = month_text.parse::<u32>().ok().or_else(|| month_number(month_text))?;
    let day = capture_u32(caps, "day")?;
    let year = caps.name("year").and_then(|m| m.as_str().parse::<i32>().ok()).map(|y| {
        if y < 100 { 2000 + y } else { y }
    });

    // 2000 is a leap year, so Feb 29 passes when no year is given
    NaiveDate::from_ymd_opt(year.unwrap_or(2000), month, day)?;
    Some(Piece::Date(DateSpec::Calendar { month, day, year }))
}

fn part_of_day_piece(caps: &Captures) -> Option<Piece> {
    let time = match caps.name("part")?.as_str().to_ascii_lowercase().as_str() {
        "morning" => hm(9, 0)?,
        "afternoon" => hm(14, 0)?,
        _ => hm(19, 0)?,
    };
    Some(Piece::PartOfDay(time))
}

fn duration_piece(caps: &Captures) -> Option<Piece> {
    amount_duration(caps).map(Piece::Duration)
}

fn amount_duration(caps: &Captures) -> Option<Duration> {
    let amount = caps.name("amount")?.as_str().to_ascii_lowercase();
    let amount: f64 = match amount.as_str() {
        "a" | "an" => 1.0,
        a if a.starts_with("half") => 0.5,
        a => a.parse().ok()?,
    };
    let unit = caps.name("unit")?.as_str().to_ascii_lowercase();
    let unit_minutes = if unit.starts_with('h') {
        60.0
    } else if unit.starts_with('d') {
        1440.0
    } else if unit.starts_with('w') {
        10080.0
    } else {
        1.0
    };
    let minutes = amount * unit_minutes;
    if !minutes.is_finite() || minutes.round() < 1.0 || minutes >= i64::MAX as f64 {
        return None;
    }
    Duration::try_minutes(minutes.round() as i64)
}

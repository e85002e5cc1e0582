//! Timezone-aware clock
//!
//! All conversions go through civil (wall-clock) time in the named zone via
//! chrono-tz, never through fixed offset arithmetic, so they stay correct
//! across daylight saving transitions.

use crate::error::ParseError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;

/// Resolves "now" in a timezone and converts between local wall-clock
/// moments and UTC instants.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimezoneClock {
    fixed_now: Option<DateTime<Utc>>,
}

impl TimezoneClock {
    /// A clock reading the system time
    pub fn system() -> Self {
        Self { fixed_now: None }
    }

    /// A clock pinned to the given instant
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self { fixed_now: Some(now) }
    }

    /// Resolve an IANA timezone name such as "America/Los_Angeles"
    pub fn resolve(name: &str) -> Result<Tz, ParseError> {
        name.trim().parse::<Tz>().map_err(|_| ParseError::InvalidTimezone(name.to_string()))
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Current wall-clock time in `tz`
    pub fn now(&self, tz: Tz) -> NaiveDateTime {
        self.to_local(self.now_utc(), tz)
    }

    /// Wall-clock reading of `instant` in `tz`
    pub fn to_local(&self, instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
        instant.with_timezone(&tz).naive_local()
    }

    /// Resolve a local wall-clock moment in `tz` to a UTC instant.
    ///
    /// Ambiguous moments (clocks falling back) resolve to the earlier
    /// instant. Moments inside a spring-forward gap do not exist and are
    /// moved forward by the length of the gap.
    pub fn to_utc(&self, local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return dt.with_timezone(&Utc);
        }

        // Inside a gap: apply the offset in force just before it, which
        // lands the same distance past the transition
        let mut probe = local;
        for _ in 0..(24 * 4) {
            probe -= Duration::minutes(15);
            if let Some(before) = tz.from_local_datetime(&probe).earliest() {
                let offset = before.offset().fix().local_minus_utc();
                debug!("Local time {} does not exist in {}, shifting past the gap", local, tz.name());
                return Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(offset))));
            }
        }

        // Unreachable for tzdata zones; treat the wall clock as UTC
        Utc.from_utc_datetime(&local)
    }

    /// UTC bounds of an all-day event on `date`: local 00:00:00 to 23:59:59
    pub fn all_day_bounds(&self, date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        self.all_day_range(date, date, tz)
    }

    /// UTC bounds of an all-day event covering `first` through `last`
    pub fn all_day_range(
        &self,
        first: NaiveDate,
        last: NaiveDate,
        tz: Tz,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let last = last.max(first);
        let start = self.to_utc(first.and_time(NaiveTime::MIN), tz);
        let end = self.to_utc(last.and_time(end_of_day()), tz);
        (start, end)
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

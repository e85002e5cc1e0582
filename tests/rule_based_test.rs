use chrono::{Duration, NaiveDate, TimeZone, Timelike, Utc};
use eventparse::{ParseError, RuleBasedExtractor, TimezoneClock};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn extractor() -> RuleBasedExtractor {
    // Monday 2024-06-10 17:00 UTC
    RuleBasedExtractor::new(TimezoneClock::fixed(Utc.with_ymd_and_hms(2024, 6, 10, 17, 0, 0).unwrap()))
}

#[test_case("Team lunch at Pizzeria Delfina tomorrow at noon"; "located lunch")]
#[test_case("Dentist friday 8:15am"; "weekday and time")]
#[test_case("Standup"; "title only")]
#[test_case("???"; "punctuation")]
#[test_case("at in about"; "indicators only")]
#[test_case("from 11pm to 1am"; "range over midnight")]
#[test_case("Flight in 3 hours for 2 hours"; "offset and duration")]
#[test_case("meeting on 2/30"; "impossible date")]
#[test_case("call at 25:99"; "impossible time")]
#[test_case("日本語のテキスト"; "non latin")]
fn test_non_empty_text_always_yields_a_consistent_event(text: &str) {
    for tz in ["UTC", "America/Los_Angeles", "Asia/Kolkata", "Australia/Lord_Howe"] {
        let event = extractor().parse(text, tz).unwrap().expect("non-empty text gives an event");
        assert!(event.end_time >= event.start_time, "{:?} in {}", text, tz);
        assert_eq!(event.duration, (event.end_time - event.start_time).num_minutes());
        assert!(!event.title.trim().is_empty());
    }
}

#[test_case("Company holiday party all day on December 25th", "America/Los_Angeles", NaiveDate::from_ymd_opt(2024, 12, 25).unwrap())]
#[test_case("ALL DAY offsite on 2024-07-04", "Europe/Berlin", NaiveDate::from_ymd_opt(2024, 7, 4).unwrap())]
#[test_case("Hackathon, All-Day, friday", "Asia/Tokyo", NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())]
#[test_case("all day retreat", "UTC", NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())]
fn test_all_day_covers_one_local_date(text: &str, tz_name: &str, date: NaiveDate) {
    let clock = TimezoneClock::fixed(Utc.with_ymd_and_hms(2024, 6, 10, 17, 0, 0).unwrap());
    let tz = TimezoneClock::resolve(tz_name).unwrap();
    let event = extractor().parse(text, tz_name).unwrap().unwrap();

    assert!(event.is_all_day);
    let start = clock.to_local(event.start_time, tz);
    let end = clock.to_local(event.end_time, tz);
    assert_eq!(start, date.and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(end, date.and_hms_opt(23, 59, 59).unwrap());
}

#[test]
fn test_empty_text_gives_no_event() {
    assert_eq!(extractor().parse("", "Europe/London").unwrap(), None);
    assert_eq!(extractor().parse("   \n\t ", "Europe/London").unwrap(), None);
}

#[test]
fn test_invalid_timezone_is_rejected_before_parsing() {
    let err = extractor().parse("", "Mars/Olympus_Mons").unwrap_err();
    assert!(matches!(err, ParseError::InvalidTimezone(name) if name == "Mars/Olympus_Mons"));
}

#[test]
fn test_location_comes_from_residual_text() {
    let event = extractor().parse("Team lunch at Pizzeria Delfina tomorrow at noon", "America/Los_Angeles").unwrap().unwrap();
    assert_eq!(event.title, "Team lunch");
    assert_eq!(event.location.as_deref(), Some("Pizzeria Delfina"));
    assert_eq!(event.start_time, Utc.with_ymd_and_hms(2024, 6, 11, 19, 0, 0).unwrap());
    assert_eq!(event.duration, 60);
}

#[test]
fn test_same_text_different_zones_differ_by_offset() {
    let la = extractor().parse("Review tomorrow at 9am", "America/Los_Angeles").unwrap().unwrap();
    let ny = extractor().parse("Review tomorrow at 9am", "America/New_York").unwrap().unwrap();
    assert_eq!(la.start_time - ny.start_time, Duration::hours(3));
    assert_eq!(la.start_time.hour(), 16);
}

#[test_case("Trip in 99999999 weeks", "Trip"; "offset beyond the calendar")]
#[test_case("Ping in 99999999999999999999 days", "Ping"; "amount beyond any duration")]
#[test_case("Retreat for 99999999 weeks", "Retreat"; "duration beyond the calendar")]
fn test_huge_amounts_degrade_instead_of_panicking(text: &str, title: &str) {
    let event = extractor().parse(text, "UTC").unwrap().unwrap();
    assert_eq!(event.title, title);
    assert_eq!(event.start_time, Utc.with_ymd_and_hms(2024, 6, 10, 17, 0, 0).unwrap());
    assert_eq!(event.duration, 60);
}

#[test]
fn test_huge_configured_duration_keeps_the_default() {
    let extractor = extractor().with_default_duration(i64::MAX);
    let event = extractor.parse("Standup at 9:30", "UTC").unwrap().unwrap();
    assert_eq!(event.duration, 60);
}

#[test]
fn test_residual_keeps_words_that_contain_the_date() {
    let event = extractor().parse("tomorrowland planning tomorrow", "UTC").unwrap().unwrap();
    assert_eq!(event.title, "tomorrowland planning");
    assert_eq!(event.start_time, Utc.with_ymd_and_hms(2024, 6, 11, 9, 0, 0).unwrap());
}

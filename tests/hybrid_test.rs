use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use eventparse::parser::{CompletionClient, ExtractionSource, GenerativeExtractor};
use eventparse::{GenerativeError, HybridOrchestrator, ParseError, RuleBasedExtractor, TimezoneClock};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use test_case::test_case;

/// Fails every call the way a dead provider would
#[derive(Default)]
struct FailingClient {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, GenerativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerativeError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
    }
}

/// Always answers with the same body
struct FixedReply(&'static str);

#[async_trait]
impl CompletionClient for FixedReply {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, GenerativeError> {
        Ok(self.0.to_string())
    }
}

fn clock() -> TimezoneClock {
    TimezoneClock::fixed(Utc.with_ymd_and_hms(2024, 6, 10, 17, 0, 0).unwrap())
}

fn orchestrator<C: CompletionClient>(client: C) -> HybridOrchestrator<C> {
    HybridOrchestrator::new(GenerativeExtractor::new(client, clock()), RuleBasedExtractor::new(clock()))
}

#[test_case("Team lunch at Pizzeria Delfina tomorrow at noon", "America/Los_Angeles")]
#[test_case("Company holiday party all day on December 25th", "America/Los_Angeles")]
#[test_case("Sprint planning next monday from 10 to 11:30 in the big room", "Europe/Berlin")]
#[test_case("Pick up dry cleaning", "Asia/Singapore")]
#[tokio::test]
async fn test_fallback_matches_rule_based_alone(text: &str, tz: &str) {
    let hybrid = orchestrator(FailingClient::default()).parse_event(text, tz).await.unwrap();
    let rules = RuleBasedExtractor::new(clock()).parse(text, tz).unwrap().unwrap();
    assert_eq!(hybrid, rules);
}

#[tokio::test]
async fn test_unparseable_reply_falls_back() {
    let orchestrator = orchestrator(FixedReply("Sorry, I can't help with that."));
    let (event, source) = orchestrator.parse_with_source("Call mom at 6pm", "UTC").await.unwrap();
    assert_eq!(source, ExtractionSource::RuleBased);
    assert_eq!(event.title, "Call mom");
    assert_eq!(event.start_time, Utc.with_ymd_and_hms(2024, 6, 10, 18, 0, 0).unwrap());
}

#[tokio::test]
async fn test_generative_result_wins_when_valid() {
    let reply = r#"{"title": "Team lunch", "description": null,
        "startTime": "2024-06-11T19:00:00Z", "endTime": "2024-06-11T20:30:00Z",
        "isAllDay": false, "location": "Pizzeria Delfina"}"#;
    let orchestrator = orchestrator(FixedReply(reply));
    let (event, source) = orchestrator
        .parse_with_source("Team lunch at Pizzeria Delfina tomorrow at noon", "America/Los_Angeles")
        .await
        .unwrap();

    assert_eq!(source, ExtractionSource::Generative);
    assert_eq!(event.duration, 90);
    assert_eq!(event.location.as_deref(), Some("Pizzeria Delfina"));
}

#[tokio::test]
async fn test_empty_input_fails_both_paths() {
    let err = orchestrator(FailingClient::default()).parse_event("   ", "UTC").await.unwrap_err();
    assert!(matches!(err, ParseError::BothFailed));
    assert_eq!(err.to_string(), "Could not parse event details");
}

#[tokio::test]
async fn test_invalid_timezone_skips_both_extractors() {
    let orchestrator = orchestrator(FailingClient::default());
    let err = orchestrator.parse_event("Lunch at noon", "Not/AZone").await.unwrap_err();
    assert!(matches!(err, ParseError::InvalidTimezone(_)));

    let (event, _) = orchestrator.parse_with_source("Lunch at noon", "UTC").await.unwrap();
    assert_eq!(event.title, "Lunch");
}

#[tokio::test]
async fn test_each_call_is_independent() {
    let client = FailingClient::default();
    let orchestrator = orchestrator(client);
    let first = orchestrator.parse_event("Yoga at 7am", "UTC").await.unwrap();
    let second = orchestrator.parse_event("Yoga at 7am", "UTC").await.unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_orchestrator_can_be_shared_across_tasks() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HybridOrchestrator<eventparse::parser::HttpCompletionClient>>();
    assert_send_sync::<HybridOrchestrator<FailingClient>>();
}

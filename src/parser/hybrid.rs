//! Hybrid orchestration: generative first, rules as the fallback
//!
//! The sequence is an explicit two-state machine so each transition can be
//! exercised on its own:
//!
//! ```text
//! TryGenerative --ok--> Success(generative event)
//!       |
//!     error (logged, not surfaced)
//!       v
//! FallbackRule  --ok--> Success(rule-based event)
//!       |
//!     no event
//!       v
//! Failure(BothFailed)
//! ```
//!
//! Nothing is kept between calls and the two results are never merged.

use crate::clock::TimezoneClock;
use crate::config::Config;
use crate::error::{GenerativeError, ParseError};
use crate::event::ParsedEvent;
use crate::parser::generative::{CompletionClient, GenerativeExtractor, HttpCompletionClient};
use crate::parser::rule_based::RuleBasedExtractor;
use chrono_tz::Tz;
use log::{debug, warn};

/// Which extractor produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    Generative,
    RuleBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TryGenerative,
    FallbackRule,
}

#[derive(Debug)]
pub enum Outcome {
    Success { event: ParsedEvent, source: ExtractionSource },
    Failure(ParseError),
}

#[derive(Debug)]
pub enum Step {
    Next(Stage),
    Done(Outcome),
}

pub struct HybridOrchestrator<C> {
    generative: GenerativeExtractor<C>,
    rules: RuleBasedExtractor,
}

impl HybridOrchestrator<HttpCompletionClient> {
    /// Orchestrator wired from the user's config, using the system clock
    pub fn from_config(config: &Config) -> Result<Self, GenerativeError> {
        Self::from_config_with_clock(config, TimezoneClock::system())
    }

    pub fn from_config_with_clock(
        config: &Config,
        clock: TimezoneClock,
    ) -> Result<Self, GenerativeError> {
        let client = HttpCompletionClient::from_config(&config.language_model)?;
        let rules = RuleBasedExtractor::new(clock)
            .with_segmenter(config.segmenter())
            .with_default_duration(config.parser.default_duration_minutes);
        Ok(Self::new(GenerativeExtractor::new(client, clock), rules))
    }
}

impl<C: CompletionClient> HybridOrchestrator<C> {
    pub fn new(generative: GenerativeExtractor<C>, rules: RuleBasedExtractor) -> Self {
        Self { generative, rules }
    }

    /// Parse `text` into an event in the named timezone.
    ///
    /// Fails with `InvalidTimezone` before either extractor runs, and with
    /// `BothFailed` when neither produced an event.
    pub async fn parse_event(&self, text: &str, timezone: &str) -> Result<ParsedEvent, ParseError> {
        self.parse_with_source(text, timezone).await.map(|(event, _)| event)
    }

    /// Like [`HybridOrchestrator::parse_event`], also reporting which path won
    pub async fn parse_with_source(
        &self,
        text: &str,
        timezone: &str,
    ) -> Result<(ParsedEvent, ExtractionSource), ParseError> {
        let tz = TimezoneClock::resolve(timezone)?;

        let mut stage = Stage::TryGenerative;
        let outcome = loop {
            match self.step(stage, text, tz).await {
                Step::Next(next) => stage = next,
                Step::Done(outcome) => break outcome,
            }
        };

        match outcome {
            Outcome::Success { event, source } => Ok((event, source)),
            Outcome::Failure(err) => Err(err),
        }
    }

    /// Run one stage and decide what follows it
    pub async fn step(&self, stage: Stage, text: &str, tz: Tz) -> Step {
        match stage {
            Stage::TryGenerative => match self.generative.parse_in(text, tz).await {
                Ok(event) => {
                    debug!("Generative extraction succeeded");
                    Step::Done(Outcome::Success { event, source: ExtractionSource::Generative })
                }
                Err(e) => {
                    warn!("Generative extraction failed, falling back to rules: {}", e);
                    Step::Next(Stage::FallbackRule)
                }
            },
            Stage::FallbackRule => match self.rules.parse_in(text, tz) {
                Some(event) => {
                    Step::Done(Outcome::Success { event, source: ExtractionSource::RuleBased })
                }
                None => Step::Done(Outcome::Failure(ParseError::BothFailed)),
            },
        }
    }
}

//! Error types for the event parsing engine.

/// Errors surfaced by the parsing pipeline
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid timezone: '{0}'")]
    InvalidTimezone(String),
    #[error("Generative extraction failed: {0}")]
    ExtractionFailed(#[from] GenerativeError),
    #[error("Could not parse event details")]
    BothFailed,
}

/// Failures of the generative (LLM) extraction path
///
/// None of these reach the caller of the hybrid orchestrator; they only
/// decide that the rule-based fallback runs.
#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    #[error("Empty input provided")]
    EmptyInput,
    #[error("Input too long ({0} characters, max {max})", max = crate::parser::generative::MAX_INPUT_CHARS)]
    InputTooLong(usize),
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),
    #[error("Request to language model failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Language model API error: {0}")]
    Status(reqwest::StatusCode),
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
    #[error("Response is not valid event JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Response is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid timestamp for '{field}': {value}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("End time {end} is before start time {start}")]
    InvalidSpan { start: String, end: String },
}

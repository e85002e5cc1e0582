pub mod clock;
pub mod config;
pub mod env_manager;
pub mod error;
pub mod event;
pub mod parser;

use std::env;

/// Variable holding the log level filter, e.g. `debug` or `eventparse=trace`
pub const LOG_LEVEL_VAR: &str = "EVENTPARSE_LOG_LEVEL";

pub fn init_logger() {
    let filters = env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::new()
        .parse_filters(&filters)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

// Re-export commonly used types
pub use clock::TimezoneClock;
pub use config::Config;
pub use error::{GenerativeError, ParseError};
pub use event::ParsedEvent;
pub use parser::{HybridOrchestrator, RuleBasedExtractor};

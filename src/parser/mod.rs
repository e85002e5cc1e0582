/// Event parsers
///
/// A generative extractor backed by a language model, a rule-based fallback,
/// and the orchestrator that chooses between them.
pub mod generative;
pub mod hybrid;
pub mod natural_language;
pub mod rule_based;
pub mod utils;

pub use generative::{CompletionClient, GenerativeExtractor, HttpCompletionClient};
pub use hybrid::{ExtractionSource, HybridOrchestrator};
pub use natural_language::segmenter::FieldSegmenter;
pub use natural_language::time_parser::{DateTimeSpan, DateTimeSpanExtractor};
pub use rule_based::RuleBasedExtractor;

//! Natural language building blocks shared by the rule-based extractor

pub mod segmenter;
pub mod time_parser;

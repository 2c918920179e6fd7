//! Lexical toxicity classification and the dual-path service built on it.

pub mod cache;
pub mod lexicon;
pub mod matcher;
pub mod service;

pub use cache::{CacheStats, VerdictCache};
pub use lexicon::{Lexicon, LexiconError};
pub use matcher::LexicalMatcher;
pub use service::ClassificationService;

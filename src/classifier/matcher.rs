use std::sync::Arc;

use crate::domain::{ModelTag, Verdict};

use super::lexicon::Lexicon;

/// Case-insensitive substring matcher over a [`Lexicon`].
///
/// There is no tokenisation or word-boundary check: "glasses" is flagged
/// because it contains "ass".
#[derive(Debug, Clone)]
pub struct LexicalMatcher {
    lexicon: Arc<Lexicon>,
}

impl LexicalMatcher {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// The entry that made `content` toxic, if any.
    pub fn first_match(&self, content: &str) -> Option<&str> {
        if content.is_empty() {
            return None;
        }
        self.lexicon.find(&content.to_lowercase())
    }

    /// Verdict tagged [`ModelTag::Lexicon`]. Empty text is non-toxic.
    pub fn classify(&self, content: &str) -> Verdict {
        Verdict::lexical(self.first_match(content).is_some(), ModelTag::Lexicon)
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

impl Default for LexicalMatcher {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::builtin()))
    }
}

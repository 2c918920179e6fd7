//! Static word lists consulted by the lexical matcher.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// Tamil slang terms, romanised.
const LOCAL_SLANG: &[&str] = &[
    "punda", "otha", "thevdiya", "baadu", "thevidiya", "sunni", "ennoda", "naaye", "loosu",
    "venna", "koothi", "thayoli", "ommala", "myir", "kaai", "molai", "layam", "akka",
    "thangachi", "poolu", "sappi", "oombu", "pundai", "soothu", "munda", "lavada", "chunni",
    "pavadai", "thevudiya", "puluthi", "kena",
];

const ENGLISH: &[&str] = &[
    "hate", "stupid", "idiot", "dumb", "terrible", "awful", "worst", "bad", "ugly", "horrible",
    "nasty", "evil", "fuck", "shit", "ass", "bitch", "damn", "crap", "fool", "moron", "jerk",
    "loser",
];

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lexicon file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("lexicon file {0} contains no usable entries")]
    Empty(String),
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    local_slang: Vec<String>,
    #[serde(default)]
    english: Vec<String>,
}

/// Two lower-cased lists of substrings. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    local_slang: Vec<String>,
    english: Vec<String>,
}

impl Lexicon {
    pub fn builtin() -> Self {
        Self::from_words(LOCAL_SLANG.iter().copied(), ENGLISH.iter().copied())
    }

    /// Entries are trimmed, lower-cased and de-duplicated. Blank entries are
    /// dropped since an empty needle matches every text.
    pub fn from_words<L, E, S>(local_slang: L, english: E) -> Self
    where
        L: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            local_slang: normalize(local_slang),
            english: normalize(english),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, LexiconError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| LexiconError::Read {
            path: display.clone(),
            source,
        })?;
        let file: LexiconFile =
            serde_json::from_str(&raw).map_err(|source| LexiconError::Parse {
                path: display.clone(),
                source,
            })?;
        let lexicon = Self::from_words(file.local_slang, file.english);
        if lexicon.is_empty() {
            return Err(LexiconError::Empty(display));
        }
        Ok(lexicon)
    }

    /// First entry contained in `lowered`, local list first.
    ///
    /// `lowered` must already be lower-cased.
    pub fn find(&self, lowered: &str) -> Option<&str> {
        self.local_slang
            .iter()
            .chain(self.english.iter())
            .find(|word| lowered.contains(word.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.local_slang.len() + self.english.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for word in words {
        let word = word.as_ref().trim().to_lowercase();
        if !word.is_empty() && !out.contains(&word) {
            out.push(word);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_lists_have_expected_sizes() {
        let lexicon = Lexicon::builtin();
        assert_eq!(lexicon.local_slang.len(), 31);
        assert_eq!(lexicon.english.len(), 22);
    }

    #[test]
    fn normalisation_drops_blanks_and_duplicates() {
        let lexicon = Lexicon::from_words(vec!["  Otha ", "otha", ""], vec!["HATE", "   "]);
        assert_eq!(lexicon.local_slang, vec!["otha".to_string()]);
        assert_eq!(lexicon.english, vec!["hate".to_string()]);
    }

    #[test]
    fn find_reports_local_entries_first() {
        let lexicon = Lexicon::from_words(vec!["loosu"], vec!["hate"]);
        assert_eq!(lexicon.find("i hate this loosu"), Some("loosu"));
        assert_eq!(lexicon.find("lovely"), None);
    }

    #[test]
    fn loads_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"local_slang": ["Naaye"], "english": ["rude"]}}"#).unwrap();
        let lexicon = Lexicon::from_file(file.path()).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.find("so rude"), Some("rude"));
    }

    #[test]
    fn rejects_empty_or_malformed_files() {
        let mut empty = tempfile::NamedTempFile::new().unwrap();
        write!(empty, r#"{{"local_slang": [" "], "english": []}}"#).unwrap();
        assert!(matches!(
            Lexicon::from_file(empty.path()),
            Err(LexiconError::Empty(_))
        ));

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "not json").unwrap();
        assert!(matches!(
            Lexicon::from_file(broken.path()),
            Err(LexiconError::Parse { .. })
        ));
    }
}

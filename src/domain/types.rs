use std::fmt;

use serde::{Deserialize, Serialize};

pub const TOXIC_CONFIDENCE: f32 = 0.85;
pub const NON_TOXIC_CONFIDENCE: f32 = 0.75;
/// Confidence assumed when an authoritative source omits one.
pub const DEFAULT_MODEL_CONFIDENCE: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    Toxic,
    #[default]
    NonToxic,
}

impl Label {
    pub fn from_flag(is_toxic: bool) -> Self {
        if is_toxic {
            Label::Toxic
        } else {
            Label::NonToxic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Toxic => "toxic",
            Label::NonToxic => "non-toxic",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which path produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTag {
    /// The external model answered.
    Trained,
    /// An authoritative pass degraded to the lexicon.
    Fallback,
    /// The immediate local pass.
    Lexicon,
}

impl ModelTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTag::Trained => "trained",
            ModelTag::Fallback => "fallback",
            ModelTag::Lexicon => "lexicon",
        }
    }

    /// Lenient parse used for remote payloads; unknown tags count as trained.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("fallback") => ModelTag::Fallback,
            Some("lexicon") => ModelTag::Lexicon,
            _ => ModelTag::Trained,
        }
    }
}

impl fmt::Display for ModelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one text.
///
/// Fields are private so the label always mirrors `is_toxic`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    is_toxic: bool,
    classification: Label,
    confidence: f32,
    model: ModelTag,
}

impl Verdict {
    pub fn new(is_toxic: bool, confidence: f32, model: ModelTag) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.5
        };
        Self {
            is_toxic,
            classification: Label::from_flag(is_toxic),
            confidence,
            model,
        }
    }

    /// Verdict with the fixed per-branch confidence used by the lexicon.
    pub fn lexical(is_toxic: bool, model: ModelTag) -> Self {
        let confidence = if is_toxic {
            TOXIC_CONFIDENCE
        } else {
            NON_TOXIC_CONFIDENCE
        };
        Self::new(is_toxic, confidence, model)
    }

    pub fn is_toxic(&self) -> bool {
        self.is_toxic
    }

    pub fn classification(&self) -> Label {
        self.classification
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn model(&self) -> ModelTag {
        self.model
    }

    pub fn with_model(self, model: ModelTag) -> Self {
        Self { model, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ToxicitySummary {
    pub total: usize,
    pub appropriate: usize,
    pub flagged: usize,
}

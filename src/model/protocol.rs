use serde::{Deserialize, Serialize};

use crate::domain::{ModelTag, Verdict, types::DEFAULT_MODEL_CONFIDENCE};

use super::ClassifyError;

pub const CLASSIFY_PATH: &str = "api/classify/comment";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// Body returned by the classification endpoint.
///
/// `is_toxic` is authoritative; the label is re-derived from it.
#[derive(Debug, Deserialize)]
pub struct ClassifyResponse {
    pub is_toxic: bool,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub model: Option<String>,
}

impl ClassifyResponse {
    pub fn into_verdict(self) -> Verdict {
        Verdict::new(
            self.is_toxic,
            self.confidence.unwrap_or(DEFAULT_MODEL_CONFIDENCE),
            ModelTag::parse_lenient(self.model.as_deref()),
        )
    }
}

/// One JSON line printed by the model runner.
#[derive(Debug, Deserialize)]
pub struct ProcessOutput {
    #[serde(default)]
    pub is_toxic: Option<bool>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub error: Option<String>,
}

pub fn parse_process_output(stdout: &str) -> Result<Verdict, ClassifyError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or(ClassifyError::EmptyOutput)?;

    let output: ProcessOutput =
        serde_json::from_str(line).map_err(|err| ClassifyError::Malformed(err.to_string()))?;

    // The runner reports its own failures inline with a placeholder verdict.
    if let Some(message) = output.error {
        return Err(ClassifyError::ModelError(message));
    }

    let is_toxic = output
        .is_toxic
        .ok_or_else(|| ClassifyError::Malformed("missing is_toxic".to_string()))?;

    Ok(Verdict::new(
        is_toxic,
        output.confidence.unwrap_or(DEFAULT_MODEL_CONFIDENCE),
        ModelTag::Trained,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Label;

    #[test]
    fn response_label_follows_flag() {
        let response: ClassifyResponse = serde_json::from_str(
            r#"{"is_toxic": true, "classification": "non-toxic", "confidence": 0.66, "model": "trained"}"#,
        )
        .unwrap();
        let verdict = response.into_verdict();
        assert_eq!(verdict.classification(), Label::Toxic);
        assert_eq!(verdict.confidence(), 0.66);
        assert_eq!(verdict.model(), ModelTag::Trained);
    }

    #[test]
    fn response_defaults_missing_fields() {
        let response: ClassifyResponse = serde_json::from_str(r#"{"is_toxic": false}"#).unwrap();
        let verdict = response.into_verdict();
        assert!(!verdict.is_toxic());
        assert_eq!(verdict.confidence(), DEFAULT_MODEL_CONFIDENCE);
    }

    #[test]
    fn process_output_uses_first_non_empty_line() {
        let verdict =
            parse_process_output("\n  {\"is_toxic\": true, \"confidence\": 0.97}\nnoise\n").unwrap();
        assert!(verdict.is_toxic());
        assert_eq!(verdict.confidence(), 0.97);
        assert_eq!(verdict.model(), ModelTag::Trained);
    }

    #[test]
    fn process_error_line_is_a_failure() {
        let err = parse_process_output(
            r#"{"error": "No module named sklearn", "is_toxic": false, "confidence": 0.5}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ClassifyError::ModelError(_)));
    }

    #[test]
    fn process_output_failures() {
        assert!(matches!(
            parse_process_output("   \n"),
            Err(ClassifyError::EmptyOutput)
        ));
        assert!(matches!(
            parse_process_output("Traceback (most recent call last):"),
            Err(ClassifyError::Malformed(_))
        ));
        assert!(matches!(
            parse_process_output(r#"{"confidence": 0.7}"#),
            Err(ClassifyError::Malformed(_))
        ));
    }
}

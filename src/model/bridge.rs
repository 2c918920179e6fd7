use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};

use crate::{
    classifier::LexicalMatcher,
    config::ModelConfig,
    domain::{ModelTag, Verdict},
};

use super::{AuthoritativeClassifier, ClassifyError, ExternalModelProcess};

/// Capability chosen once at startup from artifact availability.
#[derive(Debug, Clone)]
pub enum ModelBackend {
    Local,
    External(ExternalModelProcess),
}

impl ModelBackend {
    pub fn detect(config: &ModelConfig) -> Self {
        match ExternalModelProcess::from_config(config) {
            Some(process) => {
                tracing::info!(
                    target: "model",
                    dir = %config.model_dir.display(),
                    runner = %config.runner,
                    "model artifacts found; using external model runner"
                );
                ModelBackend::External(process)
            }
            None => {
                tracing::info!(
                    target: "model",
                    dir = %config.model_dir.display(),
                    "model artifacts missing; bridge serves lexical fallback"
                );
                ModelBackend::Local
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelBackend::Local => "local",
            ModelBackend::External(_) => "external",
        }
    }
}

/// Serves the authoritative pass. Never fails: any runner problem is answered
/// by the lexical matcher and tagged [`ModelTag::Fallback`].
pub struct ClassificationBridge {
    backend: ModelBackend,
    matcher: Arc<LexicalMatcher>,
}

impl ClassificationBridge {
    pub fn new(backend: ModelBackend, matcher: Arc<LexicalMatcher>) -> Self {
        Self { backend, matcher }
    }

    pub fn backend(&self) -> &ModelBackend {
        &self.backend
    }

    pub async fn classify(&self, content: &str) -> Verdict {
        match &self.backend {
            ModelBackend::Local => self.fallback(content),
            ModelBackend::External(process) => match process.classify(content).await {
                Ok(verdict) => verdict,
                Err(err) => {
                    tracing::warn!(
                        target: "model",
                        error = %err,
                        "model runner failed; using lexical fallback"
                    );
                    self.fallback(content)
                }
            },
        }
    }

    fn fallback(&self, content: &str) -> Verdict {
        self.matcher.classify(content).with_model(ModelTag::Fallback)
    }
}

impl AuthoritativeClassifier for ClassificationBridge {
    fn name(&self) -> &'static str {
        "bridge"
    }

    fn classify<'a>(&'a self, content: &'a str) -> BoxFuture<'a, Result<Verdict, ClassifyError>> {
        async move { Ok(ClassificationBridge::classify(self, content).await) }.boxed()
    }
}

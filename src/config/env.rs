use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub classifier: ClassifierConfig,
    pub model: ModelConfig,
    pub remote: RemoteConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub lexicon_path: Option<PathBuf>,
    pub cache_capacity: usize,
    pub authority_timeout: Duration,
}

/// Location of the external model runner and its artifacts.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
    pub model_file: String,
    pub vectorizer_file: String,
    pub script_file: String,
    pub runner: String,
    pub runner_args: Vec<String>,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.model_dir.join(&self.vectorizer_file)
    }

    pub fn script_path(&self) -> PathBuf {
        self.model_dir.join(&self.script_file)
    }
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use url::Url;

use super::env::{
    AppConfig, ClassifierConfig, ConfigError, DirectoryConfig, LoggingConfig, ModelConfig,
    RemoteConfig, ServerConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            bind_addr: var("SERVER_BIND").unwrap_or_else(|| "0.0.0.0:4000".to_string()),
        };

        let classifier = ClassifierConfig {
            lexicon_path: var("LEXICON_PATH").map(PathBuf::from),
            cache_capacity: parse_or("CACHE_CAPACITY", var("CACHE_CAPACITY"), 10_000usize)?
                .max(1),
            authority_timeout: Duration::from_millis(parse_or(
                "AUTHORITY_TIMEOUT_MS",
                var("AUTHORITY_TIMEOUT_MS"),
                3_000u64,
            )?),
        };

        let model = ModelConfig {
            model_dir: PathBuf::from(
                var("MODEL_DIR").unwrap_or_else(|| "comment_classify".to_string()),
            ),
            model_file: var("MODEL_FILE").unwrap_or_else(|| "model.pkl".to_string()),
            vectorizer_file: var("VECTORIZER_FILE").unwrap_or_else(|| "vectorizer.pkl".to_string()),
            script_file: var("MODEL_SCRIPT").unwrap_or_else(|| "classify.py".to_string()),
            runner: var("MODEL_RUNNER").unwrap_or_else(|| "python".to_string()),
            runner_args: lookup("MODEL_RUNNER_ARGS")
                .map(|value| value.split_whitespace().map(str::to_string).collect())
                .unwrap_or_else(|| vec!["-u".to_string()]),
            timeout: Duration::from_millis(parse_or(
                "MODEL_TIMEOUT_MS",
                var("MODEL_TIMEOUT_MS"),
                3_000u64,
            )?),
        };

        let remote = RemoteConfig {
            base_url: var("CLASSIFY_REMOTE_URL")
                .map(|raw| parse_base_url(&raw))
                .transpose()?,
        };

        let directories = DirectoryConfig {
            logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            server,
            classifier,
            model,
            remote,
            directories,
            logging,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|err| ConfigError::Invalid {
                key,
                reason: err.to_string(),
                value,
            }),
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|err| ConfigError::Invalid {
        key: "CLASSIFY_REMOTE_URL",
        value: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key: "CLASSIFY_REMOTE_URL",
            value: raw.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    // Url::join replaces the last path segment unless the base ends with '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:4000");
        assert_eq!(config.classifier.cache_capacity, 10_000);
        assert_eq!(config.classifier.authority_timeout, Duration::from_secs(3));
        assert!(config.classifier.lexicon_path.is_none());
        assert!(config.remote.base_url.is_none());
        assert_eq!(config.model.runner, "python");
        assert_eq!(config.model.runner_args, vec!["-u".to_string()]);
        assert_eq!(
            config.model.model_path(),
            PathBuf::from("comment_classify/model.pkl")
        );
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = config_from(&[("AUTHORITY_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("AUTHORITY_TIMEOUT_MS"));
    }

    #[test]
    fn zero_cache_capacity_is_raised_to_one() {
        let config = config_from(&[("CACHE_CAPACITY", "0")]).unwrap();
        assert_eq!(config.classifier.cache_capacity, 1);
    }

    #[test]
    fn remote_url_gets_trailing_slash() {
        let config = config_from(&[("CLASSIFY_REMOTE_URL", "http://localhost:5000/guard")]).unwrap();
        let base = config.remote.base_url.unwrap();
        assert_eq!(base.as_str(), "http://localhost:5000/guard/");
        assert_eq!(
            base.join("api/classify/comment").unwrap().as_str(),
            "http://localhost:5000/guard/api/classify/comment"
        );
    }

    #[test]
    fn remote_url_must_be_http() {
        assert!(config_from(&[("CLASSIFY_REMOTE_URL", "ftp://example.com")]).is_err());
        assert!(config_from(&[("CLASSIFY_REMOTE_URL", "not a url")]).is_err());
    }

    #[test]
    fn empty_runner_args_are_honoured() {
        let config = config_from(&[("MODEL_RUNNER", "sh"), ("MODEL_RUNNER_ARGS", "")]).unwrap();
        assert_eq!(config.model.runner, "sh");
        assert!(config.model.runner_args.is_empty());
    }
}

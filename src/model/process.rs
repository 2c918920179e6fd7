use std::{path::PathBuf, process::Stdio, time::Duration};

use tokio::{process::Command, time::timeout};

use crate::{config::ModelConfig, domain::Verdict};

use super::{ClassifyError, protocol::parse_process_output};

/// Runs the trained model as a child process, one invocation per text.
#[derive(Debug, Clone)]
pub struct ExternalModelProcess {
    runner: String,
    runner_args: Vec<String>,
    script: PathBuf,
    model: PathBuf,
    vectorizer: PathBuf,
    timeout: Duration,
}

impl ExternalModelProcess {
    /// `None` unless the script and both artifacts are present.
    pub fn from_config(config: &ModelConfig) -> Option<Self> {
        let script = config.script_path();
        let model = config.model_path();
        let vectorizer = config.vectorizer_path();
        if !(script.is_file() && model.is_file() && vectorizer.is_file()) {
            return None;
        }
        Some(Self {
            runner: config.runner.clone(),
            runner_args: config.runner_args.clone(),
            script,
            model,
            vectorizer,
            timeout: config.timeout,
        })
    }

    pub async fn classify(&self, content: &str) -> Result<Verdict, ClassifyError> {
        let child = Command::new(&self.runner)
            .args(&self.runner_args)
            .arg(&self.script)
            .arg(content)
            .arg(&self.model)
            .arg(&self.vectorizer)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ClassifyError::Spawn)?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ClassifyError::Timeout(self.timeout))?
            .map_err(ClassifyError::Spawn)?;

        if !output.status.success() {
            return Err(ClassifyError::ProcessFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_process_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::{fs, path::Path};

    use tempfile::TempDir;

    use super::*;
    use crate::domain::ModelTag;

    fn model_dir(script: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("classify.sh"), script).unwrap();
        fs::write(dir.path().join("model.pkl"), b"model").unwrap();
        fs::write(dir.path().join("vectorizer.pkl"), b"vectorizer").unwrap();
        dir
    }

    fn config(dir: &Path, timeout_ms: u64) -> ModelConfig {
        ModelConfig {
            model_dir: dir.to_path_buf(),
            model_file: "model.pkl".to_string(),
            vectorizer_file: "vectorizer.pkl".to_string(),
            script_file: "classify.sh".to_string(),
            runner: "sh".to_string(),
            runner_args: Vec::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[test]
    fn missing_artifacts_disable_the_process() {
        let dir = model_dir("echo '{}'");
        fs::remove_file(dir.path().join("vectorizer.pkl")).unwrap();
        assert!(ExternalModelProcess::from_config(&config(dir.path(), 1_000)).is_none());
    }

    #[tokio::test]
    async fn passes_content_and_reads_verdict() {
        let script = r#"case "$1" in
  *toxic*) echo '{"is_toxic": true, "confidence": 0.91}' ;;
  *) echo '{"is_toxic": false, "confidence": 0.88}' ;;
esac"#;
        let dir = model_dir(script);
        let process = ExternalModelProcess::from_config(&config(dir.path(), 5_000)).unwrap();

        let verdict = process.classify("very toxic words").await.unwrap();
        assert!(verdict.is_toxic());
        assert_eq!(verdict.confidence(), 0.91);
        assert_eq!(verdict.model(), ModelTag::Trained);

        let verdict = process.classify("kind words").await.unwrap();
        assert!(!verdict.is_toxic());
    }

    #[tokio::test]
    async fn receives_artifact_paths() {
        let script = r#"[ -f "$2" ] && [ -f "$3" ] && echo '{"is_toxic": false}' || exit 3"#;
        let dir = model_dir(script);
        let process = ExternalModelProcess::from_config(&config(dir.path(), 5_000)).unwrap();
        assert!(process.classify("hello").await.is_ok());
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let dir = model_dir("echo 'boom' >&2; exit 2");
        let process = ExternalModelProcess::from_config(&config(dir.path(), 5_000)).unwrap();
        match process.classify("text").await {
            Err(ClassifyError::ProcessFailed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_runner_times_out() {
        let dir = model_dir("sleep 5; echo '{\"is_toxic\": true}'");
        let process = ExternalModelProcess::from_config(&config(dir.path(), 100)).unwrap();
        assert!(matches!(
            process.classify("text").await,
            Err(ClassifyError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn missing_runner_binary_is_a_spawn_error() {
        let dir = model_dir("echo '{}'");
        let mut cfg = config(dir.path(), 1_000);
        cfg.runner = "/nonexistent/interpreter".to_string();
        let process = ExternalModelProcess::from_config(&cfg).unwrap();
        assert!(matches!(
            process.classify("text").await,
            Err(ClassifyError::Spawn(_))
        ));
    }
}

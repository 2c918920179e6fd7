use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    /// Canonical when the directory exists; the configured path otherwise.
    pub model_dir: PathBuf,
}

/// Creates the logs directory and checks it is writable. The model directory
/// is optional and only resolved.
pub fn ensure_directories(config: &AppConfig) -> Result<ResolvedPaths> {
    let logs_dir = writable_dir(PathBuf::from(&config.directories.logs_dir))?;
    let model_dir = config
        .model
        .model_dir
        .canonicalize()
        .unwrap_or_else(|_| config.model.model_dir.clone());

    Ok(ResolvedPaths {
        logs_dir,
        model_dir,
    })
}

fn writable_dir(dir: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let probe = dir.join(".write-test");
    fs::write(&probe, b"ok")
        .with_context(|| format!("directory {} is not writable", dir.display()))?;
    fs::remove_file(&probe)?;

    Ok(dir.canonicalize().unwrap_or(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_nested_logs_dir_and_removes_probe() {
        let root = tempfile::TempDir::new().unwrap();
        let dir = writable_dir(root.path().join("nested/logs")).unwrap();
        assert!(dir.is_dir());
        assert!(dir.ends_with("nested/logs"));
        assert!(!dir.join(".write-test").exists());
    }
}

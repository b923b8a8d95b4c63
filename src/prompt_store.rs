use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Error;
use crate::prompt::PromptConfig;

/// File-backed store for the operator-editable prompt settings.
///
/// `load` is called fresh on every generation and never fails; a missing or
/// unreadable document yields defaults. `save` writes the whole document to a
/// sibling temp file and renames it into place so a concurrent reader never
/// observes a half-written document. Concurrent writers are not serialized;
/// last writer wins.
#[derive(Debug, Clone)]
pub struct PromptStore {
    path: PathBuf,
}

impl PromptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> PromptConfig {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no prompt config on disk, using defaults");
                return PromptConfig::default();
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to read prompt config, using defaults"
                );
                return PromptConfig::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "prompt config is not valid JSON, using defaults"
                );
                PromptConfig::default()
            }
        }
    }

    pub fn save(&self, config: &PromptConfig) -> Result<(), Error> {
        let payload = serde_json::to_string_pretty(config)
            .map_err(|err| self.storage_error(err.to_string()))?;

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| self.storage_error(err.to_string()))?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, payload).map_err(|err| self.storage_error(err.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|err| {
            let _ = fs::remove_file(&tmp_path);
            self.storage_error(err.to_string())
        })?;

        debug!(path = %self.path.display(), "saved prompt config");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn storage_error(&self, detail: String) -> Error {
        Error::Storage {
            path: self.path.display().to_string(),
            detail,
        }
    }
}

//! File-backed memo of the last harvester-offline detail that was sent

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::errors::MonitorError;

#[derive(Debug, Clone)]
pub struct OfflineFlag {
    path: PathBuf,
}

impl OfflineFlag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last stored detail, `None` if nothing was ever stored
    pub async fn load(&self) -> Result<Option<String>, MonitorError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.error(e)),
        }
    }

    pub async fn store(&self, detail: &str) -> Result<(), MonitorError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| self.error(e))?;
        }
        fs::write(&self.path, detail).await.map_err(|e| self.error(e))
    }

    fn error(&self, e: std::io::Error) -> MonitorError {
        MonitorError::FlagFile {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

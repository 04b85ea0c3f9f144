//! Persisted choice between the local capture device and the RTSP stream.
//!
//! The web tier writes this file; the capture process re-reads it at every
//! (re)connect attempt. The handoff is eventually consistent on purpose:
//! there is no signal that the capture side has finished applying a new
//! value, only the external restart plus the stream itself.

use crate::errors::AppError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Rtsp,
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "local" => Ok(SourceKind::Local),
            "rtsp" => Ok(SourceKind::Rtsp),
            other => Err(AppError::InvalidRequest(format!(
                "unknown source '{}', expected 'local' or 'rtsp'",
                other
            ))),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Local => write!(f, "local"),
            SourceKind::Rtsp => write!(f, "rtsp"),
        }
    }
}

pub struct SourceSelector {
    path: PathBuf,
}

impl SourceSelector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SourceSelector { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted selection. Any failure (missing file, unreadable
    /// content, unknown token) falls back to the local device.
    pub fn read(&self) -> SourceKind {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => match contents.parse::<SourceKind>() {
                Ok(kind) => {
                    debug!("🎛️ Source selector at {} reads '{}'", self.path.display(), kind);
                    kind
                }
                Err(e) => {
                    warn!(
                        "⚠️ Source selector at {} holds invalid content ({}). Defaulting to local.",
                        self.path.display(),
                        e
                    );
                    SourceKind::Local
                }
            },
            Err(e) => {
                debug!(
                    "Source selector at {} unreadable ({}). Defaulting to local.",
                    self.path.display(),
                    e
                );
                SourceKind::Local
            }
        }
    }

    /// Persist a selection. Parent directories are created so a fresh
    /// deployment does not need manual setup.
    pub fn write(&self, kind: SourceKind) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Io(format!(
                        "Failed to create selector directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        std::fs::write(&self.path, kind.to_string()).map_err(|e| {
            AppError::Io(format!(
                "Failed to write source selector '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_both_valid_values() {
        let dir = tempfile::tempdir().unwrap();
        let selector = SourceSelector::new(dir.path().join("source"));
        for kind in [SourceKind::Local, SourceKind::Rtsp] {
            selector.write(kind).unwrap();
            assert_eq!(selector.read(), kind);
        }
    }

    #[test]
    fn missing_file_defaults_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let selector = SourceSelector::new(dir.path().join("missing"));
        assert_eq!(selector.read(), SourceKind::Local);
    }

    #[test]
    fn garbage_content_defaults_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source");
        std::fs::write(&path, "bogus\n").unwrap();
        let selector = SourceSelector::new(path);
        assert_eq!(selector.read(), SourceKind::Local);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source");
        std::fs::write(&path, " rtsp\n").unwrap();
        let selector = SourceSelector::new(path);
        assert_eq!(selector.read(), SourceKind::Rtsp);
    }

    #[test]
    fn from_str_rejects_unknown_tokens() {
        assert!("bogus".parse::<SourceKind>().is_err());
        assert!("".parse::<SourceKind>().is_err());
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let selector = SourceSelector::new(dir.path().join("nested/dir/source"));
        selector.write(SourceKind::Rtsp).unwrap();
        assert_eq!(selector.read(), SourceKind::Rtsp);
    }
}

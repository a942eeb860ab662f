//! File persistence for operator-pinned reference levels.
//!
//! Fetched levels are always refreshed from the source on startup; only
//! manually pinned levels survive a restart, covering the workflow where
//! the upstream feed is down and an operator enters levels by hand.

use crate::models::ReferenceLevels;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug)]
pub struct LevelsStore {
    path: PathBuf,
}

impl LevelsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load previously pinned levels. A missing file is a normal first
    /// run; a corrupt file is logged and ignored.
    pub fn load(&self) -> Option<ReferenceLevels> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read pinned levels file");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(levels) => Some(levels),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "pinned levels file is corrupt, ignoring");
                None
            }
        }
    }

    pub fn save(&self, levels: &ReferenceLevels) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(levels).map_err(io::Error::other)?;
        fs::write(&self.path, raw)
    }
}

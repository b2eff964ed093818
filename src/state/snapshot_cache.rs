use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

use crate::market_data::types::MarketSnapshot;

/// On-disk cache of the last successful snapshot. One fixed file, no
/// expiry, no versioning: `save` overwrites, `load` validates by a full
/// decode and treats anything invalid as absent.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Option<MarketSnapshot> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "no cached snapshot");
                return None;
            }
        };
        match serde_json::from_str(&body) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "discarding invalid cached snapshot");
                None
            }
        }
    }

    pub fn save(&self, snapshot: &MarketSnapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache dir {}", parent.display()))?;
        }
        let body = serde_json::to_string(snapshot)?;
        fs::write(&self.path, body)
            .with_context(|| format!("writing snapshot cache {}", self.path.display()))?;
        Ok(())
    }
}

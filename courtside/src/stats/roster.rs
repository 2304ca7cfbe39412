use std::path::{Path, PathBuf};

use crate::error::{CourtsideError, Result};
use crate::models::PlayerIndexEntry;

/// Read a static player list (a JSON array of `{id, full_name, ...}`
/// objects) on the blocking pool.
pub async fn load_roster_file(path: &Path) -> Result<Vec<PlayerIndexEntry>> {
    let path: PathBuf = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<Vec<PlayerIndexEntry>> {
        let bytes = std::fs::read(&path)?;
        let entries: Vec<PlayerIndexEntry> = serde_json::from_slice(&bytes)?;
        tracing::debug!(path = %path.display(), players = entries.len(), "Roster file parsed");
        Ok(entries)
    })
    .await
    .map_err(|e| CourtsideError::Worker(format!("Roster loader failed: {e}")))?
}

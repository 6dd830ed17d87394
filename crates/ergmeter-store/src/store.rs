//! JSON file store with atomic replacement.

use crate::error::{StoreError, StoreResult};
use ergmeter_core::MeterState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Version stamped into every stored record. Bump on schema changes.
const STORAGE_VERSION: u32 = 1;

/// On-disk envelope around the state record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    version: u32,
    data: MeterState,
}

/// Durable key/value record for one account.
///
/// Saves go through a sibling temp file plus rename, so an interrupted write
/// leaves the previous record intact. A missing file is the first-run state,
/// not an error; an unreadable or undecodable file is an error, because
/// silently resetting the baseline would corrupt every later day count.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store backed by `path`. Nothing is touched on disk until
    /// the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted record, defaulting when none exists yet.
    pub async fn load(&self) -> StoreResult<MeterState> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let record: StoredRecord = serde_json::from_slice(&bytes)?;
                if record.version != STORAGE_VERSION {
                    return Err(StoreError::UnsupportedVersion(record.version));
                }
                Ok(record.data)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted state yet");
                Ok(MeterState::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persist the record atomically.
    pub async fn save(&self, state: &MeterState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let record = StoredRecord {
            version: STORAGE_VERSION,
            data: *state,
        };
        let payload = serde_json::to_vec_pretty(&record)?;
        let tmp_path = self
            .path
            .with_extension(format!("tmp.{}", std::process::id()));
        fs::write(&tmp_path, payload).await?;
        if let Err(err) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        debug!(
            path = %self.path.display(),
            lifetime = state.lifetime,
            season = state.season,
            baseline = state.baseline,
            "persisted state"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_state() -> MeterState {
        MeterState {
            date: NaiveDate::from_ymd_opt(2024, 1, 2),
            baseline: 1500,
            lifetime: 1800,
            season: 300,
        }
    }

    #[tokio::test]
    async fn missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("alice.json"));
        assert_eq!(store.load().await.unwrap(), MeterState::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("alice.json"));

        store.save(&sample_state()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), sample_state());
    }

    #[tokio::test]
    async fn save_overwrites_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("alice.json"));

        store.save(&sample_state()).await.unwrap();
        let mut updated = sample_state();
        updated.lifetime = 2100;
        store.save(&updated).await.unwrap();

        assert_eq!(store.load().await.unwrap().lifetime, 2100);
    }

    #[tokio::test]
    async fn save_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nested/deeper/alice.json"));
        store.save(&sample_state()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), sample_state());
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("alice.json"));
        store.save(&sample_state()).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "alice.json");
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alice.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = StateStore::new(&path);
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn record_is_version_stamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alice.json");
        let store = StateStore::new(&path);
        store.save(&sample_state()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["data"]["baseline"], 1500);
    }

    #[tokio::test]
    async fn unknown_version_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alice.json");
        std::fs::write(&path, br#"{"version": 99, "data": {}}"#).unwrap();

        let store = StateStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(StoreError::UnsupportedVersion(99))
        ));
    }
}

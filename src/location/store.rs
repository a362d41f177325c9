//! JSON file holding the last accepted position.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::LocationStore;
use crate::common::utils::{private_path, write_atomically};
use crate::geo::GeoPosition;

/// On-disk layout of the location record.
#[derive(Debug, Serialize, Deserialize)]
struct LocationRecord {
    latitude: f64,
    longitude: f64,
    label: String,
    last_updated: DateTime<Utc>,
}

/// Stores the position as a single JSON record, replaced atomically.
pub struct FileLocationStore {
    path: PathBuf,
}

impl FileLocationStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store in the state directory of the current config namespace.
    pub fn in_state_dir() -> Result<Self> {
        Ok(Self::new(crate::state::location_path()?))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl LocationStore for FileLocationStore {
    fn load(&self) -> Result<Option<GeoPosition>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", private_path(&self.path)))?;
        let record: LocationRecord = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt location record in {}", private_path(&self.path)))?;

        let position = GeoPosition::new(
            record.latitude,
            record.longitude,
            record.label,
            record.last_updated,
        )
        .with_context(|| format!("Invalid location record in {}", private_path(&self.path)))?;

        Ok(Some(position))
    }

    fn save(&self, position: &GeoPosition) -> Result<()> {
        let record = LocationRecord {
            latitude: position.latitude,
            longitude: position.longitude,
            label: position.label.clone(),
            last_updated: position.observed_at,
        };
        let json = serde_json::to_vec_pretty(&record)?;
        write_atomically(&self.path, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::test_constants::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_record() {
        let dir = tempdir().unwrap();
        let store = FileLocationStore::new(dir.path().join("location.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = FileLocationStore::new(dir.path().join("state").join("location.json"));
        let observed = DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let position =
            GeoPosition::new(TEST_LATITUDE, TEST_LONGITUDE, TEST_LABEL, observed).unwrap();

        store.save(&position).unwrap();
        assert_eq!(store.load().unwrap(), Some(position));

        // Field names are part of the on-disk format
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"last_updated\""));
        assert!(raw.contains("\"label\": \"Berlin, Germany\""));
    }

    #[test]
    fn test_corrupt_and_invalid_records_are_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("location.json");
        let store = FileLocationStore::new(path.clone());

        fs::write(&path, "{ not json").unwrap();
        assert!(store.load().is_err());

        fs::write(
            &path,
            r#"{"latitude":95.0,"longitude":0.0,"label":"","last_updated":"2024-06-01T08:00:00Z"}"#,
        )
        .unwrap();
        assert!(store.load().is_err());
    }
}

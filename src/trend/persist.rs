//! JSON snapshots of trend memory, so history survives between CLI runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{RecommendationRecord, RiskPoint};
use crate::core::{Error, Result};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub version: u32,
    /// Oldest point first per customer
    pub customers: BTreeMap<String, Vec<RiskPoint>>,
    /// Oldest record first per customer
    #[serde(default)]
    pub recommendations: BTreeMap<String, Vec<RecommendationRecord>>,
}

impl TrendSnapshot {
    pub fn new(
        customers: BTreeMap<String, Vec<RiskPoint>>,
        recommendations: BTreeMap<String, Vec<RecommendationRecord>>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            customers,
            recommendations,
        }
    }
}

impl Default for TrendSnapshot {
    fn default() -> Self {
        Self::new(BTreeMap::new(), BTreeMap::new())
    }
}

/// Load a snapshot; a missing file is an empty history.
pub fn load_snapshot(path: &Path) -> Result<TrendSnapshot> {
    if !path.exists() {
        log::debug!("No trend snapshot at {}, starting empty", path.display());
        return Ok(TrendSnapshot::default());
    }
    let contents = fs::read_to_string(path)?;
    let snapshot: TrendSnapshot = serde_json::from_str(&contents)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(Error::configuration(format!(
            "trend snapshot {} has version {}, expected {}",
            path.display(),
            snapshot.version,
            SNAPSHOT_VERSION
        )));
    }
    Ok(snapshot)
}

/// Write through a temporary file and rename so readers never see a partial file.
pub fn save_snapshot(path: &Path, snapshot: &TrendSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(snapshot)?;
    fs::write(&temp_path, data)?;
    fs::rename(&temp_path, path)?;
    log::debug!(
        "Saved trend snapshot for {} customers to {}",
        snapshot.customers.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let snapshot = load_snapshot(&dir.path().join("trend.json")).unwrap();
        assert!(snapshot.customers.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("trend.json");
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut customers = BTreeMap::new();
        customers.insert("c1".to_string(), vec![RiskPoint { timestamp, score: 42 }]);
        let mut recommendations = BTreeMap::new();
        recommendations.insert(
            "c1".to_string(),
            vec![RecommendationRecord {
                timestamp,
                feature_ids: vec!["feat_core_reports".to_string()],
            }],
        );
        let snapshot = TrendSnapshot::new(customers, recommendations);

        save_snapshot(&path, &snapshot).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), snapshot);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_snapshot_without_recommendations_still_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trend.json");
        fs::write(
            &path,
            r#"{"version": 1, "customers": {"c1": [{"timestamp": "2026-01-01T00:00:00Z", "score": 10}]}}"#,
        )
        .unwrap();
        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.customers["c1"].len(), 1);
        assert!(snapshot.recommendations.is_empty());
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trend.json");
        fs::write(&path, r#"{"version": 99, "customers": {}}"#).unwrap();
        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}

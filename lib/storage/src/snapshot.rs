// Catalog snapshots on disk
use anyhow::{anyhow, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use craftrec_core::ItemRecord;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

/// Snapshot format written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Every record in the catalog at the time of the save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub items: Vec<ItemRecord>,
    pub saved_at: DateTime<Utc>,
}

/// Accepted on-disk shapes: a full snapshot, or a bare list of records
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Snapshot(CatalogSnapshot),
    Items(Vec<ItemRecord>),
}

impl CatalogSnapshot {
    pub fn new(items: Vec<ItemRecord>) -> Self {
        Self { version: SNAPSHOT_VERSION, items, saved_at: Utc::now() }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open catalog {}", path.display()))?;
        let parsed: SnapshotFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse catalog {}", path.display()))?;

        let snapshot = match parsed {
            SnapshotFile::Snapshot(snapshot) => snapshot,
            SnapshotFile::Items(items) => CatalogSnapshot::new(items),
        };
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(anyhow!(
                "catalog {} has snapshot version {}, newest supported is {}",
                path.display(),
                snapshot.version,
                SNAPSHOT_VERSION
            ));
        }
        Ok(snapshot)
    }

    /// Write to a temp file and rename over `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(self)?;
        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&data))
            .map_err(|e| anyhow!("failed to write catalog {}: {}", path.display(), e))?;
        Ok(())
    }
}

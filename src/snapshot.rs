//! Pool snapshots on disk.
//!
//! A snapshot is the set of pools with the reserves they had at one instant. The bot
//! warm-starts from it and the snapshot reserve source re-reads it on every refresh.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use log::info;
use serde::{Deserialize, Serialize};

use crate::arb::{ConstantProductPool, PoolRecord};

/// Pools and the time their reserves were read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// When the reserves were read
    pub taken_at: DateTime<Utc>,
    /// The pools
    pub pools: Vec<PoolRecord>,
}

impl PoolSnapshot {
    /// Snapshot of `pools` taken now
    #[must_use]
    pub fn capture<'a>(pools: impl IntoIterator<Item = &'a ConstantProductPool>) -> Self {
        Self {
            taken_at: Utc::now(),
            pools: pools.into_iter().map(PoolRecord::from).collect(),
        }
    }

    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    /// * If the file cannot be read
    /// * If the content is not a valid snapshot
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Self = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Invalid snapshot {}", path.display()))?;
        info!(
            "Loaded {} pools from {} (taken at {})",
            snapshot.pools.len(),
            path.display(),
            snapshot.taken_at
        );
        Ok(snapshot)
    }

    /// Writes the snapshot as pretty JSON.
    ///
    /// # Errors
    /// * If serialization or the write fails
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .wrap_err_with(|| format!("Failed to write snapshot {}", path.display()))?;
        info!("Dumped {} pools to {}", self.pools.len(), path.display());
        Ok(())
    }

    /// Builds the pools described by the snapshot.
    ///
    /// # Errors
    /// * If a record names the same asset twice
    pub fn into_pools(self) -> Result<Vec<Arc<ConstantProductPool>>> {
        self.pools
            .into_iter()
            .map(|record| {
                let id = record.id.clone();
                ConstantProductPool::try_from(record)
                    .map(Arc::new)
                    .wrap_err_with(|| format!("Invalid pool record {id}"))
            })
            .collect()
    }
}

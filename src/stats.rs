//! Race record ledger
//!
//! Persisted as JSON next to the runner. A missing or corrupt file never stops a
//! race: loading falls back to an empty ledger.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{RaceError, StatsSerializeSnafu, StatsWriteSnafu};
use crate::sim::RaceRecord;

/// Running totals across races
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceStats {
    /// Fastest winning time (seconds); `None` until the first win
    pub best_time: Option<f32>,
    pub victories: u32,
    pub defeats: u32,
    /// Sum of race clocks (seconds)
    pub total_time_played: f32,
    pub best_lap_count: u32,
    pub races: u32,
}

impl RaceStats {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished race into the totals.
    /// Returns true when the race set a new best time.
    pub fn record(&mut self, record: &RaceRecord) -> bool {
        self.races += 1;
        self.total_time_played += record.elapsed_time;
        self.best_lap_count = self.best_lap_count.max(record.lap_count);

        if !record.outcome.is_win() {
            self.defeats += 1;
            return false;
        }
        self.victories += 1;
        let improved = self.best_time.is_none_or(|best| record.elapsed_time < best);
        if improved {
            self.best_time = Some(record.elapsed_time);
        }
        improved
    }

    /// Load the ledger, substituting an empty one on any failure
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("No stats at {} ({}), starting fresh", path.display(), err);
                return Self::new();
            }
        };
        match serde_json::from_str::<RaceStats>(&json) {
            Ok(stats) => {
                log::info!("Loaded stats for {} races", stats.races);
                stats
            }
            Err(err) => {
                log::warn!("Corrupt stats at {} ({}), starting fresh", path.display(), err);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), RaceError> {
        let json = serde_json::to_string_pretty(self).context(StatsSerializeSnafu)?;
        fs::write(path, json).context(StatsWriteSnafu { path })?;
        log::info!("Stats saved ({} races)", self.races);
        Ok(())
    }
}

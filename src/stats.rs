// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CSV persistence of finalized classification decisions.
//!
//! The file holds one row per decision:
//!
//! ```text
//! Timestamp,Category,Count
//! 2025-03-01 14:02:11,Glass,1
//! 2025-03-01 14:02:40,Paper,1
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::category::{Category, CategoryCounts};
use crate::error::{ClassifierError, Result};

/// File name used inside the stats directory.
pub const DEFAULT_STATS_FILENAME: &str = "waste_classification_stats.csv";

/// Header row of a new stats file.
pub const STATS_HEADER: &str = "Timestamp,Category,Count";

/// Timestamp format of data rows.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only stats file.
#[derive(Debug, Clone)]
pub struct StatsFile {
    path: PathBuf,
}

impl StatsFile {
    /// Open the stats file in `dir`, creating the directory and a header-only
    /// file if they don't exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file can't be created.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            ClassifierError::StatsError(format!("Failed to create {}: {e}", dir.display()))
        })?;

        let path = dir.join(DEFAULT_STATS_FILENAME);
        if !path.exists() {
            fs::write(&path, format!("{STATS_HEADER}\n")).map_err(|e| {
                ClassifierError::StatsError(format!("Failed to create stats file: {e}"))
            })?;
        }

        Ok(Self { path })
    }

    /// Path of the CSV file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count the rows per category.
    ///
    /// The header is skipped. Rows with fewer than three fields or an unknown
    /// category are ignored; the `Count` column is not trusted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read.
    pub fn load_counts(&self) -> Result<CategoryCounts> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ClassifierError::StatsError(format!("Failed to load stats: {e}")))?;

        let mut counts = CategoryCounts::new();
        for line in content.lines().skip(1) {
            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() < 3 {
                continue;
            }
            if let Ok(category) = parts[1].parse::<Category>() {
                counts.increment(category);
            }
        }

        Ok(counts)
    }

    /// Append a row stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn append(&self, category: Category, count: usize) -> Result<()> {
        self.append_at(Local::now().naive_local(), category, count)
    }

    /// Append a row with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn append_at(&self, timestamp: NaiveDateTime, category: Category, count: usize) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| ClassifierError::StatsError(format!("Failed to save stats: {e}")))?;

        writeln!(file, "{},{category},{count}", timestamp.format(TIMESTAMP_FORMAT))
            .map_err(|e| ClassifierError::StatsError(format!("Failed to save stats: {e}")))
    }
}

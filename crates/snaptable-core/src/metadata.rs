//! Versioned table metadata: snapshots, schema, and the metadata store.
//!
//! A snaptable table keeps its metadata as versioned JSON files under a
//! `metadata/` directory at the table root:
//!
//! ```text
//! table_root/
//!   metadata/
//!     v1.metadata.json
//!     v2.metadata.json        # highest version wins
//!   data/                     # data files live here (read elsewhere)
//! ```
//!
//! Each file contains a single [`TableMetadata`] value: the format version,
//! the logical schema, the current snapshot id, and the snapshot list.
//! [`MetadataStore`] discovers the newest version by directory scan and
//! parses it; readers never mutate metadata files.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::schema::Schema;

/// Current metadata format version.
///
/// Bumped only on breaking changes to the on-disk JSON format.
pub const METADATA_FORMAT_VERSION: u32 = 1;

/// A committed table version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Monotonically increasing identifier of this snapshot.
    pub snapshot_id: i64,
    /// Snapshot this one was derived from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_snapshot_id: Option<i64>,
    /// Commit timestamp, stored as RFC3339 UTC.
    pub timestamp: DateTime<Utc>,
}

/// Parsed table metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableMetadata {
    /// On-disk metadata format version.
    pub format_version: u32,
    /// The table's logical schema.
    pub schema: Schema,
    /// Snapshot the table currently points at, if any commit exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_snapshot_id: Option<i64>,
    /// All retained snapshots, oldest first.
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    /// Creation timestamp of the table, stored as RFC3339 UTC.
    pub created_at: DateTime<Utc>,
}

impl TableMetadata {
    /// Look up a snapshot by id.
    pub fn snapshot(&self, snapshot_id: i64) -> Option<&Snapshot> {
        self.snapshots
            .iter()
            .find(|s| s.snapshot_id == snapshot_id)
    }

    /// The snapshot referenced by `current_snapshot_id`, if both exist.
    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.snapshot(self.current_snapshot_id?)
    }
}

/// Errors raised while locating or parsing table metadata.
#[derive(Debug, Snafu)]
pub enum MetadataError {
    /// No metadata directory, or no versioned metadata files under it.
    #[snafu(display("No table metadata found under {path}"))]
    NotFound {
        /// The metadata directory that was searched.
        path: String,
    },

    /// I/O failure while scanning or reading metadata.
    #[snafu(display("Failed to read table metadata at {path}: {source}"))]
    Io {
        /// Path being read when the failure occurred.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A metadata file exists but does not parse as [`TableMetadata`].
    #[snafu(display("Corrupt table metadata at {path}: {source}"))]
    Corrupt {
        /// Path of the unparsable file.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Reads versioned metadata files under a table root.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    /// Name of the subdirectory containing metadata files.
    pub const METADATA_DIR_NAME: &str = "metadata";
    /// Suffix shared by all versioned metadata files.
    pub const METADATA_FILE_SUFFIX: &str = ".metadata.json";

    /// Create a store rooted at a table directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The table root this store reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn metadata_dir(&self) -> PathBuf {
        self.root.join(Self::METADATA_DIR_NAME)
    }

    fn metadata_file_path(&self, version: u64) -> PathBuf {
        self.metadata_dir()
            .join(format!("v{version}{}", Self::METADATA_FILE_SUFFIX))
    }

    /// Discover the newest committed metadata version by directory scan.
    ///
    /// Files that do not match `v<N>.metadata.json` are skipped with a
    /// warning. Returns [`MetadataError::NotFound`] when the directory is
    /// missing or holds no versioned metadata files.
    pub async fn latest_version(&self) -> Result<u64, MetadataError> {
        let dir = self.metadata_dir();
        let dir_display = dir.display().to_string();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return NotFoundSnafu { path: dir_display }.fail();
            }
            Err(source) => {
                return Err(MetadataError::Io {
                    path: dir_display,
                    source,
                });
            }
        };

        let mut latest: Option<u64> = None;
        while let Some(entry) = entries.next_entry().await.context(IoSnafu {
            path: dir_display.clone(),
        })? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!("Skipping non-UTF-8 file name in {dir_display}");
                continue;
            };
            match parse_metadata_version(name) {
                Some(version) => {
                    latest = Some(latest.map_or(version, |current| current.max(version)));
                }
                None => warn!("Skipping non-metadata file {name:?} in {dir_display}"),
            }
        }

        latest.context(NotFoundSnafu { path: dir_display })
    }

    /// Load a specific metadata version.
    pub async fn load_version(&self, version: u64) -> Result<TableMetadata, MetadataError> {
        let path = self.metadata_file_path(version);
        let path_display = path.display().to_string();

        let json = tokio::fs::read_to_string(&path).await.context(IoSnafu {
            path: path_display.clone(),
        })?;
        serde_json::from_str(&json).context(CorruptSnafu { path: path_display })
    }

    /// Load the newest metadata version.
    pub async fn load(&self) -> Result<TableMetadata, MetadataError> {
        let version = self.latest_version().await?;
        self.load_version(version).await
    }
}

fn parse_metadata_version(file_name: &str) -> Option<u64> {
    let rest = file_name.strip_prefix('v')?;
    let digits = rest.strip_suffix(MetadataStore::METADATA_FILE_SUFFIX)?;
    digits.parse().ok()
}

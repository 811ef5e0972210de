//! Point-in-time backups of the whole store
//!
//! Encoded layout:
//! - 4 bytes magic `SSBK`
//! - u32 little-endian format version
//! - MessagePack payload of [`StorageBackup`]
//!
//! Files are written atomically via temp + rename.

use super::TransactionalStorage;
use chrono::{DateTime, Utc};
use schedstore_core::{StorageError, StorageResult};
use schedstore_storage::{StoreImage, StoreState};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

const BACKUP_MAGIC: &[u8; 4] = b"SSBK";
const HEADER_LEN: usize = 8;

/// Current backup format version
pub const BACKUP_FORMAT_VERSION: u32 = 1;

/// Copy of every record at one committed version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBackup {
    /// Unique backup id
    pub id: Uuid,
    /// When the backup was taken
    pub created_at: DateTime<Utc>,
    /// Committed version the image was taken at
    pub version: u64,
    /// The records
    pub image: StoreImage,
}

impl StorageBackup {
    /// Wrap an image taken at `version`
    pub fn new(version: u64, image: StoreImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            version,
            image,
        }
    }

    /// Serialize to the framed MessagePack format
    pub fn encode(&self) -> StorageResult<Vec<u8>> {
        let payload =
            rmp_serde::to_vec(self).map_err(|e| StorageError::serialization(e.to_string()))?;

        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(BACKUP_MAGIC);
        buf.extend_from_slice(&BACKUP_FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Parse the framed MessagePack format
    ///
    /// # Errors
    ///
    /// - `Serialization` if the header is missing or the payload is corrupt
    /// - `BackupFormat` if the image was written by another format version
    pub fn decode(bytes: &[u8]) -> StorageResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(StorageError::serialization("backup too small"));
        }
        if &bytes[0..4] != BACKUP_MAGIC {
            return Err(StorageError::serialization("bad backup magic"));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[4..HEADER_LEN]);
        let found = u32::from_le_bytes(version);
        if found != BACKUP_FORMAT_VERSION {
            return Err(StorageError::BackupFormat {
                expected: BACKUP_FORMAT_VERSION,
                found,
            });
        }
        rmp_serde::from_slice(&bytes[HEADER_LEN..])
            .map_err(|e| StorageError::serialization(format!("decode error: {}", e)))
    }

    /// Write the encoded backup to `path`
    pub fn write_to_file(&self, path: &Path) -> StorageResult<()> {
        let buf = self.encode()?;
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(&buf)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Read and decode a backup file
    pub fn read_from_file(path: &Path) -> StorageResult<Self> {
        let buf = std::fs::read(path)?;
        Self::decode(&buf)
    }
}

impl TransactionalStorage {
    /// Copy every record of the latest committed state
    pub fn backup(&self) -> StorageBackup {
        let snapshot = self.snapshot();
        let backup = StorageBackup::new(snapshot.version(), snapshot.to_image());
        info!(
            target: "schedstore::backup",
            id = %backup.id,
            version = backup.version,
            records = backup.image.record_count(),
            "Backup taken"
        );
        backup
    }

    /// Replace every store with the contents of `backup`
    ///
    /// Runs as one write: readers see either the old state or the restored
    /// one. The restored state is committed at a new version, which is
    /// returned.
    pub fn restore(&self, backup: StorageBackup) -> u64 {
        let id = backup.id;
        let taken_at = backup.version;
        let records = backup.image.record_count();
        let version = self.replace_state(StoreState::from_image(backup.image));
        info!(
            target: "schedstore::backup",
            id = %id,
            taken_at,
            version,
            records,
            "Backup restored"
        );
        version
    }
}

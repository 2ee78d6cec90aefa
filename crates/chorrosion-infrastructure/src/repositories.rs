// SPDX-License-Identifier: GPL-3.0-or-later
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use anyhow::{anyhow, bail, Context, Result};
use chorrosion_application::custom_formats::CustomFormat;
use chorrosion_application::ports::{
    CustomFormatRepository, HistoryService, MediaFileService, PendingReleaseService,
};
use chorrosion_domain::{
    CustomFormatId, DownloadProtocol, HistoryRecord, MediaFile, MediaId, ReleaseInfo,
};
use tracing::{debug, info};

use crate::records::{custom_format_to_record, record_to_custom_format, CustomFormatRecord};

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("repository lock poisoned")
}

// ============================================================================
// Custom Formats
// ============================================================================

/// Custom formats held in memory as storage records.
#[derive(Default)]
pub struct InMemoryCustomFormatRepository {
    records: RwLock<Vec<CustomFormatRecord>>,
}

impl InMemoryCustomFormatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<CustomFormatRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl CustomFormatRepository for InMemoryCustomFormatRepository {
    fn all(&self) -> Result<Vec<CustomFormat>> {
        let records = self.records.read().map_err(poisoned)?;
        records.iter().map(record_to_custom_format).collect()
    }

    fn find(&self, id: CustomFormatId) -> Result<Option<CustomFormat>> {
        let records = self.records.read().map_err(poisoned)?;
        records
            .iter()
            .find(|record| record.id == id.0)
            .map(record_to_custom_format)
            .transpose()
    }

    fn insert(&self, format: &CustomFormat) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        if records.iter().any(|record| record.id == format.id.0) {
            bail!("custom format {} already exists", format.id);
        }
        debug!(target: "repository", format_id = %format.id, "inserting custom format");
        records.push(custom_format_to_record(format));
        Ok(())
    }

    fn update(&self, format: &CustomFormat) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = records
            .iter_mut()
            .find(|record| record.id == format.id.0)
            .ok_or_else(|| anyhow!("custom format {} not found", format.id))?;
        debug!(target: "repository", format_id = %format.id, "updating custom format");
        *record = custom_format_to_record(format);
        Ok(())
    }

    fn delete(&self, id: CustomFormatId) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        debug!(target: "repository", format_id = %id, "deleting custom format");
        records.retain(|record| record.id != id.0);
        Ok(())
    }
}

/// Custom formats persisted as a JSON array of records. Every write
/// rewrites the whole file.
pub struct JsonFileCustomFormatRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCustomFormatRepository {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !path.exists() {
            fs::write(&path, "[]")?;
            info!(target: "infrastructure", path = %path.display(), "created custom format store");
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<CustomFormatRecord>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let records = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(records)
    }

    fn write_records(&self, records: &[CustomFormatRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json).with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut Vec<CustomFormatRecord>) -> Result<()>) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(poisoned)?;
        let mut records = self.read_records()?;
        change(&mut records)?;
        self.write_records(&records)
    }
}

impl CustomFormatRepository for JsonFileCustomFormatRepository {
    fn all(&self) -> Result<Vec<CustomFormat>> {
        self.read_records()?
            .iter()
            .map(record_to_custom_format)
            .collect()
    }

    fn find(&self, id: CustomFormatId) -> Result<Option<CustomFormat>> {
        self.read_records()?
            .iter()
            .find(|record| record.id == id.0)
            .map(record_to_custom_format)
            .transpose()
    }

    fn insert(&self, format: &CustomFormat) -> Result<()> {
        self.modify(|records| {
            if records.iter().any(|record| record.id == format.id.0) {
                bail!("custom format {} already exists", format.id);
            }
            records.push(custom_format_to_record(format));
            Ok(())
        })
    }

    fn update(&self, format: &CustomFormat) -> Result<()> {
        self.modify(|records| {
            let record = records
                .iter_mut()
                .find(|record| record.id == format.id.0)
                .ok_or_else(|| anyhow!("custom format {} not found", format.id))?;
            *record = custom_format_to_record(format);
            Ok(())
        })
    }

    fn delete(&self, id: CustomFormatId) -> Result<()> {
        self.modify(|records| {
            records.retain(|record| record.id != id.0);
            Ok(())
        })
    }
}

// ============================================================================
// Library
// ============================================================================

/// Files, history and pending releases for the library, kept in memory.
#[derive(Default)]
pub struct InMemoryLibrary {
    media_files: RwLock<Vec<MediaFile>>,
    history: RwLock<Vec<HistoryRecord>>,
    pending: RwLock<Vec<(MediaId, ReleaseInfo)>>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_media_file(&self, file: MediaFile) -> Result<()> {
        self.media_files.write().map_err(poisoned)?.push(file);
        Ok(())
    }

    pub fn record_history(&self, record: HistoryRecord) -> Result<()> {
        self.history.write().map_err(poisoned)?.push(record);
        Ok(())
    }

    pub fn add_pending_release(&self, media_id: MediaId, release: ReleaseInfo) -> Result<()> {
        self.pending.write().map_err(poisoned)?.push((media_id, release));
        Ok(())
    }
}

impl MediaFileService for InMemoryLibrary {
    fn files_for_media(&self, media_id: MediaId) -> Result<Vec<MediaFile>> {
        let files = self.media_files.read().map_err(poisoned)?;
        Ok(files
            .iter()
            .filter(|file| file.media_id == media_id)
            .cloned()
            .collect())
    }
}

impl HistoryService for InMemoryLibrary {
    fn most_recent_for_media(&self, media_id: MediaId) -> Result<Option<HistoryRecord>> {
        let history = self.history.read().map_err(poisoned)?;
        Ok(history
            .iter()
            .filter(|record| record.media_id == media_id)
            .max_by_key(|record| record.date)
            .cloned())
    }
}

impl PendingReleaseService for InMemoryLibrary {
    fn oldest_pending_release(
        &self,
        media_id: MediaId,
        protocol: DownloadProtocol,
    ) -> Result<Option<ReleaseInfo>> {
        let pending = self.pending.read().map_err(poisoned)?;
        Ok(pending
            .iter()
            .filter(|(id, release)| *id == media_id && release.protocol == protocol)
            .map(|(_, release)| release)
            .min_by_key(|release| release.publish_date)
            .cloned())
    }
}

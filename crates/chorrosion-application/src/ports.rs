// SPDX-License-Identifier: GPL-3.0-or-later

//! Collaborators the decision engine reads from. Implementations live in the
//! infrastructure crate; tests use small hand-written fakes.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chorrosion_domain::{
    CustomFormatId, DelayProfile, DownloadProtocol, HistoryRecord, Media, MediaFile, MediaId,
    ReleaseInfo,
};

use crate::custom_formats::CustomFormat;

/// Storage for custom formats.
pub trait CustomFormatRepository: Send + Sync {
    fn all(&self) -> Result<Vec<CustomFormat>>;
    fn find(&self, id: CustomFormatId) -> Result<Option<CustomFormat>>;
    fn insert(&self, format: &CustomFormat) -> Result<()>;
    fn update(&self, format: &CustomFormat) -> Result<()>;
    fn delete(&self, id: CustomFormatId) -> Result<()>;
}

/// Read access to the current set of custom formats.
pub trait CustomFormatProvider: Send + Sync {
    fn all_formats(&self) -> Result<Arc<Vec<CustomFormat>>>;
}

pub trait HistoryService: Send + Sync {
    fn most_recent_for_media(&self, media_id: MediaId) -> Result<Option<HistoryRecord>>;
}

pub trait MediaFileService: Send + Sync {
    fn files_for_media(&self, media_id: MediaId) -> Result<Vec<MediaFile>>;
}

pub trait PendingReleaseService: Send + Sync {
    /// The oldest release held back by a delay for this item and protocol.
    fn oldest_pending_release(
        &self,
        media_id: MediaId,
        protocol: DownloadProtocol,
    ) -> Result<Option<ReleaseInfo>>;
}

pub trait DelayProfileProvider: Send + Sync {
    fn profile_for(&self, media: &Media) -> Result<DelayProfile>;
}

pub trait DiskProvider: Send + Sync {
    fn file_exists(&self, path: &Path) -> bool;
    fn folder_exists(&self, path: &Path) -> bool;
}

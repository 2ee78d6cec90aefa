// SPDX-License-Identifier: GPL-3.0-or-later
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chorrosion_domain::{
    DelayProfile, DownloadProtocol, HistoryRecord, Media, MediaFile, MediaId, ProfileId,
    ProfileQualityItem, Quality, QualityModel, QualityProfile, ReleaseInfo,
};

use crate::custom_formats::{CustomFormat, FormatCalculationService};
use crate::decision::RemoteRelease;
use crate::ports::{
    CustomFormatProvider, DelayProfileProvider, DiskProvider, HistoryService, MediaFileService,
    PendingReleaseService,
};
use crate::release_parsing::parse_release_title;

pub(crate) fn hd_profile() -> QualityProfile {
    QualityProfile::new(
        "HD",
        vec![
            ProfileQualityItem::single(Quality::Sdtv, true),
            ProfileQualityItem::single(Quality::Hdtv720p, true),
            ProfileQualityItem::single(Quality::Webdl720p, true),
            ProfileQualityItem::single(Quality::Hdtv1080p, true),
            ProfileQualityItem::single(Quality::Webdl1080p, true),
            ProfileQualityItem::single(Quality::Bluray1080p, true),
            ProfileQualityItem::single(Quality::Remux2160p, false),
        ],
        Quality::Bluray1080p,
    )
}

pub(crate) fn media() -> Media {
    Media::new("Movie", "/library/Movie (2020)", ProfileId::new())
}

pub(crate) fn remote(title: &str, protocol: DownloadProtocol) -> RemoteRelease {
    let parsed = parse_release_title(title).expect("test title parses");
    RemoteRelease {
        release: ReleaseInfo::new(title, protocol, 4 * 1024 * 1024 * 1024),
        parsed,
        media: media(),
        profile: hd_profile(),
        custom_formats: Vec::new(),
        custom_format_score: 0,
        target_unit_ids: Vec::new(),
    }
}

pub(crate) fn file(media_id: MediaId, quality: Quality) -> MediaFile {
    MediaFile::new(
        media_id,
        "Movie.2020.mkv",
        QualityModel::new(quality),
        2 * 1024 * 1024 * 1024,
    )
}

pub(crate) struct StaticFormats(pub Vec<CustomFormat>);

impl CustomFormatProvider for StaticFormats {
    fn all_formats(&self) -> Result<Arc<Vec<CustomFormat>>> {
        Ok(Arc::new(self.0.clone()))
    }
}

pub(crate) fn formats(list: Vec<CustomFormat>) -> FormatCalculationService {
    FormatCalculationService::new(Arc::new(StaticFormats(list)))
}

pub(crate) fn no_formats() -> FormatCalculationService {
    formats(Vec::new())
}

#[derive(Default)]
pub(crate) struct FakeMediaFiles(pub Vec<MediaFile>);

impl MediaFileService for FakeMediaFiles {
    fn files_for_media(&self, media_id: MediaId) -> Result<Vec<MediaFile>> {
        Ok(self
            .0
            .iter()
            .filter(|file| file.media_id == media_id)
            .cloned()
            .collect())
    }
}

pub(crate) struct FailingMediaFiles;

impl MediaFileService for FailingMediaFiles {
    fn files_for_media(&self, _media_id: MediaId) -> Result<Vec<MediaFile>> {
        Err(anyhow!("media file table unavailable"))
    }
}

#[derive(Default)]
pub(crate) struct FakeHistory(pub Option<HistoryRecord>);

impl HistoryService for FakeHistory {
    fn most_recent_for_media(&self, media_id: MediaId) -> Result<Option<HistoryRecord>> {
        Ok(self.0.clone().filter(|record| record.media_id == media_id))
    }
}

#[derive(Default)]
pub(crate) struct FakePending(pub Option<ReleaseInfo>);

impl PendingReleaseService for FakePending {
    fn oldest_pending_release(
        &self,
        _media_id: MediaId,
        protocol: DownloadProtocol,
    ) -> Result<Option<ReleaseInfo>> {
        Ok(self.0.clone().filter(|release| release.protocol == protocol))
    }
}

pub(crate) struct FixedDelayProfile(pub DelayProfile);

impl DelayProfileProvider for FixedDelayProfile {
    fn profile_for(&self, _media: &Media) -> Result<DelayProfile> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeDisk {
    pub files: HashSet<PathBuf>,
    pub folders: HashSet<PathBuf>,
}

impl DiskProvider for FakeDisk {
    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn folder_exists(&self, path: &Path) -> bool {
        self.folders.contains(path)
    }
}

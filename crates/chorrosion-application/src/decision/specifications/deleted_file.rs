// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::decision::{
    Decision, DecisionSpecification, RejectionReason, RemoteRelease, SearchCriteria,
    SpecificationPriority,
};
use crate::ports::{DiskProvider, MediaFileService};

/// Stops re-grabbing an item whose recorded file was deleted outside the
/// application, when such items are meant to be unmonitored.
pub struct DeletedFileSpecification {
    media_files: Arc<dyn MediaFileService>,
    disk: Arc<dyn DiskProvider>,
    auto_unmonitor_previously_downloaded: bool,
}

impl DeletedFileSpecification {
    pub fn new(
        media_files: Arc<dyn MediaFileService>,
        disk: Arc<dyn DiskProvider>,
        auto_unmonitor_previously_downloaded: bool,
    ) -> Self {
        Self {
            media_files,
            disk,
            auto_unmonitor_previously_downloaded,
        }
    }
}

impl DecisionSpecification for DeletedFileSpecification {
    fn name(&self) -> &'static str {
        "deleted_file"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Disk
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        if !self.auto_unmonitor_previously_downloaded {
            return Ok(Decision::accept());
        }

        if search.is_some() {
            debug!(target: "decision", "search in progress, skipping deleted file check");
            return Ok(Decision::accept());
        }

        let media_folder = Path::new(&remote.media.path);
        if !self.disk.folder_exists(media_folder) {
            debug!(target: "decision", folder = %media_folder.display(), "media folder missing, cannot verify files");
            return Ok(Decision::accept());
        }

        for file in self.media_files.files_for_media(remote.media.id)? {
            let path = media_folder.join(&file.relative_path);
            if !self.disk.file_exists(&path) {
                warn!(target: "decision", path = %path.display(), "file missing from disk, treating as unmonitored");
                return Ok(Decision::reject(RejectionReason::MissingFromDisk));
            }
        }

        Ok(Decision::accept())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::specifications::test_support::{file, remote, FakeDisk, FakeMediaFiles};
    use chorrosion_domain::{DownloadProtocol, Quality};
    use std::path::PathBuf;

    fn setup(file_present: bool, enabled: bool) -> (DeletedFileSpecification, RemoteRelease) {
        let remote = remote("Movie.2020.1080p.WEB-DL-GRP", DownloadProtocol::Usenet);
        let existing = file(remote.media.id, Quality::Webdl720p);

        let folder = PathBuf::from(&remote.media.path);
        let mut disk = FakeDisk::default();
        disk.folders.insert(folder.clone());
        if file_present {
            disk.files.insert(folder.join(&existing.relative_path));
        }

        let spec = DeletedFileSpecification::new(
            Arc::new(FakeMediaFiles(vec![existing])),
            Arc::new(disk),
            enabled,
        );
        (spec, remote)
    }

    #[test]
    fn missing_file_is_rejected_when_enabled() {
        let (spec, remote) = setup(false, true);
        let decision = spec.is_satisfied_by(&remote, None).unwrap();
        assert_eq!(
            decision.rejection().map(|r| r.reason.clone()),
            Some(RejectionReason::MissingFromDisk)
        );
    }

    #[test]
    fn present_file_is_accepted() {
        let (spec, remote) = setup(true, true);
        assert!(spec.is_satisfied_by(&remote, None).unwrap().is_accepted());
    }

    #[test]
    fn setting_disabled_skips_check() {
        let (spec, remote) = setup(false, false);
        assert!(spec.is_satisfied_by(&remote, None).unwrap().is_accepted());
    }

    #[test]
    fn any_search_skips_check() {
        let (spec, remote) = setup(false, true);
        assert!(spec
            .is_satisfied_by(&remote, Some(&SearchCriteria::automatic()))
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn missing_media_folder_cannot_be_verified() {
        let remote = remote("Movie.2020.1080p.WEB-DL-GRP", DownloadProtocol::Usenet);
        let existing = file(remote.media.id, Quality::Webdl720p);
        let spec = DeletedFileSpecification::new(
            Arc::new(FakeMediaFiles(vec![existing])),
            Arc::new(FakeDisk::default()),
            true,
        );
        assert!(spec.is_satisfied_by(&remote, None).unwrap().is_accepted());
    }
}

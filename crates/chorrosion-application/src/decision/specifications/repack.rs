// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use anyhow::Result;
use chorrosion_config::ProperDownloadPolicy;
use tracing::debug;

use crate::decision::{Decision, DecisionSpecification, RejectionReason, RemoteRelease, SearchCriteria};
use crate::ports::MediaFileService;
use crate::upgrade::UpgradableSpecification;

/// A repack only replaces a file that came from the same release group.
pub struct RepackSpecification {
    media_files: Arc<dyn MediaFileService>,
    policy: ProperDownloadPolicy,
}

impl RepackSpecification {
    pub fn new(media_files: Arc<dyn MediaFileService>, policy: ProperDownloadPolicy) -> Self {
        Self {
            media_files,
            policy,
        }
    }
}

fn known_group(group: Option<&str>) -> Option<&str> {
    group.map(str::trim).filter(|group| !group.is_empty())
}

impl DecisionSpecification for RepackSpecification {
    fn name(&self) -> &'static str {
        "repack"
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        _search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        if !remote.parsed.quality.revision.is_repack {
            return Ok(Decision::accept());
        }

        if self.policy == ProperDownloadPolicy::DoNotPrefer {
            debug!(target: "decision", "repacks are not preferred, skipping check");
            return Ok(Decision::accept());
        }

        for file in self.media_files.files_for_media(remote.media.id)? {
            if !UpgradableSpecification::is_revision_upgrade(&file.quality, &remote.parsed.quality) {
                continue;
            }

            if self.policy == ProperDownloadPolicy::DoNotUpgrade {
                debug!(target: "decision", "repack downloading is disabled");
                return Ok(Decision::reject(RejectionReason::RepacksNotWanted));
            }

            let Some(existing) = known_group(file.release_group.as_deref()) else {
                debug!(target: "decision", file = %file.relative_path, "existing file has no release group");
                return Ok(Decision::reject(RejectionReason::RepackExistingGroupUnknown));
            };

            let Some(release) = known_group(remote.parsed.release_group.as_deref()) else {
                debug!(target: "decision", release = %remote.release.title, "repack has no release group");
                return Ok(Decision::reject(RejectionReason::RepackReleaseGroupUnknown));
            };

            if !existing.eq_ignore_ascii_case(release) {
                debug!(target: "decision", existing, release, "repack is from a different release group");
                return Ok(Decision::reject(RejectionReason::RepackReleaseGroupMismatch {
                    existing: existing.to_string(),
                    release: release.to_string(),
                }));
            }
        }

        Ok(Decision::accept())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::specifications::test_support::{file, remote, FakeMediaFiles};
    use chorrosion_domain::{DownloadProtocol, MediaFile, Quality};

    fn spec(files: Vec<MediaFile>, policy: ProperDownloadPolicy) -> RepackSpecification {
        RepackSpecification::new(Arc::new(FakeMediaFiles(files)), policy)
    }

    fn repack() -> RemoteRelease {
        remote("Movie.2020.720p.HDTV.REPACK.x264-GRP", DownloadProtocol::Usenet)
    }

    fn existing(remote: &RemoteRelease, group: Option<&str>) -> MediaFile {
        let mut file = file(remote.media.id, Quality::Hdtv720p);
        file.release_group = group.map(str::to_string);
        file
    }

    fn reason(decision: Decision) -> Option<RejectionReason> {
        decision.rejection().map(|r| r.reason.clone())
    }

    #[test]
    fn non_repack_is_accepted() {
        let remote = remote("Movie.2020.720p.HDTV.x264-OTHER", DownloadProtocol::Usenet);
        let file = existing(&remote, Some("GRP"));
        assert!(spec(vec![file], ProperDownloadPolicy::PreferAndUpgrade)
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn repack_from_same_group_is_accepted() {
        let remote = repack();
        let file = existing(&remote, Some("grp"));
        assert!(spec(vec![file], ProperDownloadPolicy::PreferAndUpgrade)
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn repack_from_other_group_is_rejected() {
        let remote = repack();
        let file = existing(&remote, Some("OTHER"));
        assert_eq!(
            reason(
                spec(vec![file], ProperDownloadPolicy::PreferAndUpgrade)
                    .is_satisfied_by(&remote, None)
                    .unwrap()
            ),
            Some(RejectionReason::RepackReleaseGroupMismatch {
                existing: "OTHER".to_string(),
                release: "GRP".to_string()
            })
        );
    }

    #[test]
    fn unknown_groups_are_rejected() {
        let remote = repack();
        let file = existing(&remote, None);
        assert_eq!(
            reason(
                spec(vec![file], ProperDownloadPolicy::PreferAndUpgrade)
                    .is_satisfied_by(&remote, None)
                    .unwrap()
            ),
            Some(RejectionReason::RepackExistingGroupUnknown)
        );

        let mut remote = repack();
        remote.parsed.release_group = None;
        let file = existing(&remote, Some("GRP"));
        assert_eq!(
            reason(
                spec(vec![file], ProperDownloadPolicy::PreferAndUpgrade)
                    .is_satisfied_by(&remote, None)
                    .unwrap()
            ),
            Some(RejectionReason::RepackReleaseGroupUnknown)
        );
    }

    #[test]
    fn policy_controls_repacks() {
        let remote = repack();
        let file = existing(&remote, Some("OTHER"));

        assert_eq!(
            reason(
                spec(vec![file.clone()], ProperDownloadPolicy::DoNotUpgrade)
                    .is_satisfied_by(&remote, None)
                    .unwrap()
            ),
            Some(RejectionReason::RepacksNotWanted)
        );
        assert!(spec(vec![file], ProperDownloadPolicy::DoNotPrefer)
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());
    }
}

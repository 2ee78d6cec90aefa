// SPDX-License-Identifier: GPL-3.0-or-later
use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::comparer::QualityModelComparer;
use crate::custom_formats::FormatCalculationService;
use crate::decision::{
    is_user_invoked, Decision, DecisionSpecification, RejectionReason, RemoteRelease,
    SearchCriteria, SpecificationPriority,
};
use crate::ports::{DelayProfileProvider, MediaFileService, PendingReleaseService};
use crate::upgrade::UpgradableSpecification;

/// Waits out the protocol delay so a better release has a chance to show up.
pub struct DelaySpecification {
    delay_profiles: Arc<dyn DelayProfileProvider>,
    pending: Arc<dyn PendingReleaseService>,
    media_files: Arc<dyn MediaFileService>,
    formats: FormatCalculationService,
    upgradable: UpgradableSpecification,
}

impl DelaySpecification {
    pub fn new(
        delay_profiles: Arc<dyn DelayProfileProvider>,
        pending: Arc<dyn PendingReleaseService>,
        media_files: Arc<dyn MediaFileService>,
        formats: FormatCalculationService,
        upgradable: UpgradableSpecification,
    ) -> Self {
        Self {
            delay_profiles,
            pending,
            media_files,
            formats,
            upgradable,
        }
    }

    fn upgrades_existing_file(&self, remote: &RemoteRelease) -> Result<bool> {
        for file in self.media_files.files_for_media(remote.media.id)? {
            let current_formats = self.formats.for_media_file(&file)?;
            let verdict = self.upgradable.is_upgradable(
                &remote.profile,
                &file.quality,
                &current_formats,
                &remote.parsed.quality,
                remote.custom_format_score,
            );
            if verdict.is_upgrade() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl DecisionSpecification for DelaySpecification {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Database
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        if is_user_invoked(search) {
            debug!(target: "decision", "user invoked search, ignoring delay");
            return Ok(Decision::accept());
        }

        let delay_profile = self.delay_profiles.profile_for(&remote.media)?;
        let protocol = remote.release.protocol;
        let delay = delay_profile.delay_for(protocol);

        if delay == 0 {
            debug!(target: "decision", %protocol, "no delay for protocol");
            return Ok(Decision::accept());
        }

        if self.upgrades_existing_file(remote)? {
            debug!(target: "decision", release = %remote.release.title, "upgrade for existing file, skipping delay");
            return Ok(Decision::accept());
        }

        let is_preferred_protocol = protocol == delay_profile.preferred_protocol;
        if delay_profile.bypass_if_highest_quality && is_preferred_protocol {
            if let Some(best) = remote.profile.last_allowed_quality() {
                let comparer = QualityModelComparer::new(&remote.profile);
                if comparer.compare_quality(remote.parsed.quality.quality, best) != Ordering::Less {
                    debug!(target: "decision", quality = %remote.parsed.quality, "highest allowed quality on preferred protocol, skipping delay");
                    return Ok(Decision::accept());
                }
            }
        }

        if let Some(oldest) = self.pending.oldest_pending_release(remote.media.id, protocol)? {
            if oldest.age_minutes() > f64::from(delay) {
                debug!(target: "decision", pending = %oldest.title, "pending release has waited out the delay");
                return Ok(Decision::accept());
            }
        }

        let age = remote.release.age_minutes();
        if age < f64::from(delay) {
            debug!(target: "decision", age_minutes = age, delay_minutes = delay, "waiting for better quality release");
            return Ok(Decision::reject_temporarily(RejectionReason::DelayWaiting {
                delay_minutes: delay,
                age_minutes: age.floor() as i64,
            }));
        }

        Ok(Decision::accept())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::specifications::test_support::{
        file, no_formats, remote, FakeMediaFiles, FakePending, FixedDelayProfile,
    };
    use crate::decision::RejectionKind;
    use chorrosion_domain::{DelayProfile, DownloadProtocol, MediaFile, Quality, ReleaseInfo};
    use chrono::{Duration, Utc};

    fn spec(profile: DelayProfile, files: Vec<MediaFile>, pending: Option<ReleaseInfo>) -> DelaySpecification {
        DelaySpecification::new(
            Arc::new(FixedDelayProfile(profile)),
            Arc::new(FakePending(pending)),
            Arc::new(FakeMediaFiles(files)),
            no_formats(),
            UpgradableSpecification::default(),
        )
    }

    fn delayed(minutes: u32) -> DelayProfile {
        DelayProfile {
            preferred_protocol: DownloadProtocol::Usenet,
            usenet_delay_minutes: minutes,
            torrent_delay_minutes: minutes,
            bypass_if_highest_quality: true,
        }
    }

    #[test]
    fn zero_delay_accepts_fresh_release() {
        let remote = remote("Movie.2020.720p.HDTV.x264-GRP", DownloadProtocol::Torrent);
        assert!(remote.release.age_minutes() < 1.0);

        let spec = spec(DelayProfile::default(), vec![], None);
        assert!(spec.is_satisfied_by(&remote, None).unwrap().is_accepted());
    }

    #[test]
    fn fresh_release_waits_temporarily() {
        let remote = remote("Movie.2020.720p.HDTV.x264-GRP", DownloadProtocol::Usenet);
        let decision = spec(delayed(120), vec![], None)
            .is_satisfied_by(&remote, None)
            .unwrap();

        let rejection = decision.rejection().expect("release should wait");
        assert_eq!(rejection.kind, RejectionKind::Temporary);
        assert!(matches!(
            rejection.reason,
            RejectionReason::DelayWaiting { delay_minutes: 120, .. }
        ));
    }

    #[test]
    fn old_release_is_accepted() {
        let mut remote = remote("Movie.2020.720p.HDTV.x264-GRP", DownloadProtocol::Usenet);
        remote.release.publish_date = Utc::now() - Duration::minutes(180);
        assert!(spec(delayed(120), vec![], None)
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn user_search_ignores_delay() {
        let remote = remote("Movie.2020.720p.HDTV.x264-GRP", DownloadProtocol::Usenet);
        let spec = spec(delayed(120), vec![], None);
        assert!(spec
            .is_satisfied_by(&remote, Some(&SearchCriteria::user_invoked()))
            .unwrap()
            .is_accepted());
        assert!(!spec
            .is_satisfied_by(&remote, Some(&SearchCriteria::automatic()))
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn highest_quality_on_preferred_protocol_skips_delay() {
        let spec = spec(delayed(120), vec![], None);

        let usenet = remote("Movie.2020.1080p.BluRay.x264-GRP", DownloadProtocol::Usenet);
        assert!(spec.is_satisfied_by(&usenet, None).unwrap().is_accepted());

        let torrent = remote("Movie.2020.1080p.BluRay.x264-GRP", DownloadProtocol::Torrent);
        assert!(!spec.is_satisfied_by(&torrent, None).unwrap().is_accepted());
    }

    #[test]
    fn bypass_can_be_disabled() {
        let mut profile = delayed(120);
        profile.bypass_if_highest_quality = false;
        let remote = remote("Movie.2020.1080p.BluRay.x264-GRP", DownloadProtocol::Usenet);
        assert!(!spec(profile, vec![], None)
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn upgrade_over_existing_file_skips_delay() {
        let remote = remote("Movie.2020.720p.HDTV.x264-GRP", DownloadProtocol::Usenet);
        let existing = file(remote.media.id, Quality::Sdtv);
        assert!(spec(delayed(120), vec![existing], None)
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn pending_release_past_delay_releases_candidate() {
        let remote = remote("Movie.2020.720p.HDTV.x264-GRP", DownloadProtocol::Usenet);
        let mut pending = ReleaseInfo::new("Movie.2020.720p.WEB-DL-GRP", DownloadProtocol::Usenet, 1);
        pending.publish_date = Utc::now() - Duration::minutes(200);

        assert!(spec(delayed(120), vec![], Some(pending.clone()))
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());

        pending.protocol = DownloadProtocol::Torrent;
        assert!(!spec(delayed(120), vec![], Some(pending))
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use anyhow::Result;
use chorrosion_config::{DecisionConfig, ProperDownloadPolicy};
use chrono::{Duration, Utc};
use tracing::debug;

use crate::decision::{Decision, DecisionSpecification, RejectionReason, RemoteRelease, SearchCriteria};
use crate::ports::MediaFileService;
use crate::upgrade::UpgradableSpecification;

/// Limits propers and repacks that only bump the revision of an owned file.
pub struct ProperSpecification {
    media_files: Arc<dyn MediaFileService>,
    policy: ProperDownloadPolicy,
    max_file_age_days: i64,
}

impl ProperSpecification {
    pub fn new(media_files: Arc<dyn MediaFileService>, config: &DecisionConfig) -> Self {
        Self {
            media_files,
            policy: config.propers_and_repacks,
            max_file_age_days: config.proper_max_file_age_days,
        }
    }
}

impl DecisionSpecification for ProperSpecification {
    fn name(&self) -> &'static str {
        "proper"
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        if search.is_some() {
            return Ok(Decision::accept());
        }

        if self.policy == ProperDownloadPolicy::DoNotPrefer {
            debug!(target: "decision", "propers are not preferred, skipping check");
            return Ok(Decision::accept());
        }

        let oldest_allowed = Utc::now() - Duration::days(self.max_file_age_days);

        for file in self.media_files.files_for_media(remote.media.id)? {
            if !UpgradableSpecification::is_revision_upgrade(&file.quality, &remote.parsed.quality) {
                continue;
            }

            if self.policy == ProperDownloadPolicy::DoNotUpgrade {
                debug!(target: "decision", file = %file.relative_path, "proper downloading is disabled");
                return Ok(Decision::reject(RejectionReason::PropersNotWanted));
            }

            if file.date_added < oldest_allowed {
                debug!(target: "decision", file = %file.relative_path, "proper for old file");
                return Ok(Decision::reject(RejectionReason::ProperForOldFile {
                    max_age_days: self.max_file_age_days,
                }));
            }
        }

        Ok(Decision::accept())
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::custom_formats::FormatCalculationService;
use crate::decision::{Decision, DecisionSpecification, RejectionReason, RemoteRelease, SearchCriteria};
use crate::ports::MediaFileService;
use crate::upgrade::UpgradableSpecification;

/// Rejects a release when a file in the library is already at least as good.
pub struct UpgradeDiskSpecification {
    media_files: Arc<dyn MediaFileService>,
    formats: FormatCalculationService,
    upgradable: UpgradableSpecification,
}

impl UpgradeDiskSpecification {
    pub fn new(
        media_files: Arc<dyn MediaFileService>,
        formats: FormatCalculationService,
        upgradable: UpgradableSpecification,
    ) -> Self {
        Self {
            media_files,
            formats,
            upgradable,
        }
    }
}

impl DecisionSpecification for UpgradeDiskSpecification {
    fn name(&self) -> &'static str {
        "upgrade_disk"
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        _search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        for file in self.media_files.files_for_media(remote.media.id)? {
            let current_formats = self.formats.for_media_file(&file)?;
            let verdict = self.upgradable.is_upgradable(
                &remote.profile,
                &file.quality,
                &current_formats,
                &remote.parsed.quality,
                remote.custom_format_score,
            );

            if let Some(reason) = RejectionReason::from_disk(verdict) {
                debug!(target: "decision", file = %file.relative_path, %verdict, "existing file is at least as good");
                return Ok(Decision::reject(reason));
            }
        }

        Ok(Decision::accept())
    }
}

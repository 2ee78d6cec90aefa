// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::custom_formats::FormatCalculationService;
use crate::decision::{Decision, DecisionSpecification, RejectionReason, RemoteRelease, SearchCriteria};
use crate::ports::MediaFileService;
use crate::upgrade::UpgradableSpecification;

/// Rejects once every owned file has reached the profile cutoff.
pub struct CutoffSpecification {
    media_files: Arc<dyn MediaFileService>,
    formats: FormatCalculationService,
    upgradable: UpgradableSpecification,
}

impl CutoffSpecification {
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

impl DecisionSpecification for CutoffSpecification {
    fn name(&self) -> &'static str {
        "cutoff"
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        _search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        let files = self.media_files.files_for_media(remote.media.id)?;
        if files.is_empty() {
            return Ok(Decision::accept());
        }

        for file in &files {
            let current_formats = self.formats.for_media_file(file)?;
            if self.upgradable.cutoff_not_met(
                &remote.profile,
                &file.quality,
                &current_formats,
                Some(&remote.parsed.quality),
            ) {
                return Ok(Decision::accept());
            }
        }

        debug!(target: "decision", media = %remote.media.title, "existing files meet cutoff");
        Ok(Decision::reject(RejectionReason::CutoffMet))
    }
}

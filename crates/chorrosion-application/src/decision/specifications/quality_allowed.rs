// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Result;
use tracing::debug;

use crate::decision::{Decision, DecisionSpecification, RejectionReason, RemoteRelease, SearchCriteria};

#[derive(Debug, Default)]
pub struct QualityAllowedByProfileSpecification;

impl QualityAllowedByProfileSpecification {
    pub fn new() -> Self {
        Self
    }
}

impl DecisionSpecification for QualityAllowedByProfileSpecification {
    fn name(&self) -> &'static str {
        "quality_allowed_by_profile"
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        _search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        let quality = remote.parsed.quality.quality;
        if !remote.profile.is_allowed(quality) {
            debug!(target: "decision", %quality, profile = %remote.profile.name, "quality rejected by profile");
            return Ok(Decision::reject(RejectionReason::QualityNotWanted {
                quality: quality.to_string(),
            }));
        }

        Ok(Decision::accept())
    }
}

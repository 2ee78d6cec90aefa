// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Result;
use tracing::debug;

use crate::decision::{Decision, DecisionSpecification, RejectionReason, RemoteRelease, SearchCriteria};

/// Rejects releases whose format score is below the profile minimum.
#[derive(Debug, Default)]
pub struct CustomFormatAllowedByProfileSpecification;

impl CustomFormatAllowedByProfileSpecification {
    pub fn new() -> Self {
        Self
    }
}

impl DecisionSpecification for CustomFormatAllowedByProfileSpecification {
    fn name(&self) -> &'static str {
        "custom_format_allowed_by_profile"
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        _search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        let minimum = remote.profile.min_format_score;
        let score = remote.custom_format_score;

        if score < minimum {
            debug!(target: "decision", score, minimum, "custom format score below profile minimum");
            return Ok(Decision::reject(RejectionReason::CustomFormatMinimumScore {
                score,
                minimum,
            }));
        }

        Ok(Decision::accept())
    }
}

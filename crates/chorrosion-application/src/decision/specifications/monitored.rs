// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Result;
use tracing::debug;

use crate::decision::{
    is_user_invoked, Decision, DecisionSpecification, RejectionReason, RemoteRelease,
    SearchCriteria,
};

#[derive(Debug, Default)]
pub struct MonitoredSpecification;

impl MonitoredSpecification {
    pub fn new() -> Self {
        Self
    }
}

impl DecisionSpecification for MonitoredSpecification {
    fn name(&self) -> &'static str {
        "monitored"
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        if is_user_invoked(search) {
            debug!(target: "decision", "user invoked search, skipping monitored check");
            return Ok(Decision::accept());
        }

        if !remote.media.monitored {
            debug!(target: "decision", media = %remote.media.title, "item is not monitored");
            return Ok(Decision::reject(RejectionReason::MediaNotMonitored));
        }

        if remote.target_unit_ids.is_empty() {
            return Ok(Decision::accept());
        }

        let any_monitored = remote
            .target_unit_ids
            .iter()
            .filter_map(|id| remote.media.unit(*id))
            .any(|unit| unit.monitored);

        if !any_monitored {
            debug!(target: "decision", media = %remote.media.title, "targeted units are not monitored");
            return Ok(Decision::reject(RejectionReason::UnitsNotMonitored));
        }

        Ok(Decision::accept())
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use anyhow::Result;
use chorrosion_config::DecisionConfig;
use chorrosion_domain::HistoryEventType;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::custom_formats::FormatCalculationService;
use crate::decision::{
    Decision, DecisionSpecification, RejectionReason, RemoteRelease, SearchCriteria,
    SpecificationPriority,
};
use crate::ports::HistoryService;
use crate::upgrade::UpgradableSpecification;

/// Blocks a release when something at least as good was already grabbed and
/// may still be downloading. Searches skip this check.
pub struct HistorySpecification {
    history: Arc<dyn HistoryService>,
    formats: FormatCalculationService,
    upgradable: UpgradableSpecification,
    grab_window: Duration,
    completed_download_handling: bool,
}

impl HistorySpecification {
    pub fn new(
        history: Arc<dyn HistoryService>,
        formats: FormatCalculationService,
        upgradable: UpgradableSpecification,
        config: &DecisionConfig,
    ) -> Self {
        Self {
            history,
            formats,
            upgradable,
            grab_window: Duration::hours(config.history_grab_window_hours),
            completed_download_handling: config.enable_completed_download_handling,
        }
    }
}

impl DecisionSpecification for HistorySpecification {
    fn name(&self) -> &'static str {
        "history"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Database
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        if search.is_some() {
            debug!(target: "decision", "search in progress, skipping history check");
            return Ok(Decision::accept());
        }

        let Some(record) = self.history.most_recent_for_media(remote.media.id)? else {
            return Ok(Decision::accept());
        };

        if record.event_type != HistoryEventType::Grabbed {
            return Ok(Decision::accept());
        }

        let recent = record.date > Utc::now() - self.grab_window;
        if !recent && self.completed_download_handling {
            debug!(target: "decision", grabbed = %record.source_title, "grab is outside the history window");
            return Ok(Decision::accept());
        }

        let grabbed_formats = self.formats.for_history(&record)?;
        let cutoff_not_met = self.upgradable.cutoff_not_met(
            &remote.profile,
            &record.quality,
            &grabbed_formats,
            Some(&remote.parsed.quality),
        );

        if !cutoff_not_met {
            debug!(target: "decision", grabbed = %record.source_title, recent, "grabbed release meets cutoff");
            return Ok(Decision::reject(RejectionReason::HistoryCutoffMet { recent }));
        }

        let verdict = self.upgradable.is_upgradable(
            &remote.profile,
            &record.quality,
            &grabbed_formats,
            &remote.parsed.quality,
            remote.custom_format_score,
        );

        match RejectionReason::from_history(verdict, recent) {
            Some(reason) => {
                debug!(target: "decision", grabbed = %record.source_title, %verdict, "grabbed release is at least as good");
                Ok(Decision::reject(reason))
            }
            None => Ok(Decision::accept()),
        }
    }
}

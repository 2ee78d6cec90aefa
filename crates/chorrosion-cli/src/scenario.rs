// SPDX-License-Identifier: GPL-3.0-or-later

//! A batch of releases to judge, together with the library state they are
//! judged against.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chorrosion_application::ports::CustomFormatRepository;
use chorrosion_application::{
    CustomFormatService, DecisionMaker, DecisionServices, DownloadDecision,
    FormatCalculationService, InMemoryEventBus, ReleaseCandidate,
};
use chorrosion_config::AppConfig;
use chorrosion_domain::{DelayProfile, HistoryRecord, MediaFile, MediaId, ReleaseInfo};
use chorrosion_infrastructure::records::CustomFormatRecord;
use chorrosion_infrastructure::{
    init_custom_format_store, ConfiguredDelayProfileProvider, InMemoryCustomFormatRepository,
    InMemoryLibrary, LocalDiskProvider,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct PendingRelease {
    pub media_id: MediaId,
    pub release: ReleaseInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// When empty, the configured custom format store is used instead.
    #[serde(default)]
    pub formats: Vec<CustomFormatRecord>,
    #[serde(default)]
    pub media_files: Vec<MediaFile>,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub pending: Vec<PendingRelease>,
    #[serde(default)]
    pub delay_profile: Option<DelayProfile>,
    #[serde(default)]
    pub candidates: Vec<ReleaseCandidate>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn delay_profile(&self, config: &AppConfig) -> DelayProfile {
        self.delay_profile
            .clone()
            .unwrap_or_else(|| config.delay_profile.clone())
    }

    pub fn format_repository(&self, config: &AppConfig) -> Result<Arc<dyn CustomFormatRepository>> {
        if self.formats.is_empty() {
            return init_custom_format_store(&config.storage);
        }
        Ok(Arc::new(InMemoryCustomFormatRepository::with_records(
            self.formats.clone(),
        )))
    }

    fn library(&self) -> Result<InMemoryLibrary> {
        let library = InMemoryLibrary::new();
        for file in &self.media_files {
            library.add_media_file(file.clone())?;
        }
        for record in &self.history {
            library.record_history(record.clone())?;
        }
        for pending in &self.pending {
            library.add_pending_release(pending.media_id, pending.release.clone())?;
        }
        Ok(library)
    }

    /// Wire the standard decision pipeline over this scenario's state.
    pub fn decision_maker(&self, config: &AppConfig) -> Result<DecisionMaker> {
        let formats = Arc::new(CustomFormatService::new(
            self.format_repository(config)?,
            InMemoryEventBus::new(),
        ));
        let library = Arc::new(self.library()?);

        let services = DecisionServices {
            config: config.decision.clone(),
            formats: FormatCalculationService::new(formats),
            media_files: library.clone(),
            history: library.clone(),
            pending: library,
            delay_profiles: Arc::new(ConfiguredDelayProfileProvider::new(
                self.delay_profile(config),
            )),
            disk: Arc::new(LocalDiskProvider),
        };

        info!(
            target: "cli",
            candidates = self.candidates.len(),
            files = self.media_files.len(),
            history = self.history.len(),
            "scenario loaded"
        );
        Ok(DecisionMaker::with_standard_specifications(services))
    }
}

/// The printable outcome for one release.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionReport {
    pub title: String,
    pub approved: bool,
    pub temporarily_rejected: bool,
    pub quality: Option<String>,
    pub custom_formats: Vec<String>,
    pub custom_format_score: Option<i32>,
    pub rejections: Vec<chorrosion_application::Rejection>,
}

impl From<&DownloadDecision> for DecisionReport {
    fn from(decision: &DownloadDecision) -> Self {
        let remote = decision.remote.as_ref();
        Self {
            title: decision.title.clone(),
            approved: decision.is_approved(),
            temporarily_rejected: decision.is_temporarily_rejected(),
            quality: remote.map(|remote| remote.parsed.quality.to_string()),
            custom_formats: remote
                .map(|remote| {
                    remote
                        .custom_formats
                        .iter()
                        .map(|format| format.name.clone())
                        .collect()
                })
                .unwrap_or_default(),
            custom_format_score: remote.map(|remote| remote.custom_format_score),
            rejections: decision.rejections.clone(),
        }
    }
}

impl std::fmt::Display for DecisionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.approved {
            "ACCEPT"
        } else if self.temporarily_rejected {
            "PENDING"
        } else {
            "REJECT"
        };
        write!(f, "{verdict:<7} {}", self.title)?;
        if let Some(quality) = &self.quality {
            write!(f, " [{quality}]")?;
        }
        if let Some(score) = self.custom_format_score {
            write!(f, " score={score}")?;
        }
        if !self.custom_formats.is_empty() {
            write!(f, " formats={}", self.custom_formats.join(","))?;
        }
        for rejection in &self.rejections {
            write!(f, "\n        - {rejection}")?;
        }
        Ok(())
    }
}

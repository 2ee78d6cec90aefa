// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::{Path, PathBuf};

use anyhow::Result;
use chorrosion_domain::DelayProfile;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// How proper and repack releases are treated when something is already owned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProperDownloadPolicy {
    #[default]
    PreferAndUpgrade,
    DoNotUpgrade,
    DoNotPrefer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub propers_and_repacks: ProperDownloadPolicy,
    pub auto_unmonitor_previously_downloaded: bool,
    pub enable_completed_download_handling: bool,
    pub availability_delay_days: i64,
    pub history_grab_window_hours: i64,
    pub proper_max_file_age_days: i64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            propers_and_repacks: ProperDownloadPolicy::default(),
            auto_unmonitor_previously_downloaded: false,
            enable_completed_download_handling: true,
            availability_delay_days: 0,
            history_grab_window_hours: 12,
            proper_max_file_age_days: 7,
        }
    }
}

/// Where custom formats are kept. Without a path they live in memory only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    pub custom_formats_path: Option<PathBuf>,
    pub seed_default_formats: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub decision: DecisionConfig,
    pub delay_profile: DelayProfile,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: CHORROSION_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("CHORROSION_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(
        target: "config",
        propers = ?config.decision.propers_and_repacks,
        preferred_protocol = %config.delay_profile.preferred_protocol,
        "configuration loaded"
    );
    Ok(config)
}

// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use chorrosion_application::ports::{DelayProfileProvider, DiskProvider};
use chorrosion_domain::{DelayProfile, Media};

/// Answers existence checks against the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDiskProvider;

impl DiskProvider for LocalDiskProvider {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn folder_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// One delay profile applied to every library item.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDelayProfileProvider {
    profile: DelayProfile,
}

impl ConfiguredDelayProfileProvider {
    pub fn new(profile: DelayProfile) -> Self {
        Self { profile }
    }
}

impl DelayProfileProvider for ConfiguredDelayProfileProvider {
    fn profile_for(&self, _media: &Media) -> Result<DelayProfile> {
        Ok(self.profile.clone())
    }
}

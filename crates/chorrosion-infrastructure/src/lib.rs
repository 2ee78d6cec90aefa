// SPDX-License-Identifier: GPL-3.0-or-later
pub mod providers;
pub mod records;
pub mod repositories;

use std::sync::Arc;

use anyhow::Result;
use chorrosion_application::custom_formats::default_templates;
use chorrosion_application::ports::CustomFormatRepository;
use chorrosion_config::StorageConfig;
use tracing::info;

pub use providers::{ConfiguredDelayProfileProvider, LocalDiskProvider};
pub use repositories::{
    InMemoryCustomFormatRepository, InMemoryLibrary, JsonFileCustomFormatRepository,
};

/// Open the configured custom format store, seeding the built-in templates
/// into an empty store when asked to.
pub fn init_custom_format_store(storage: &StorageConfig) -> Result<Arc<dyn CustomFormatRepository>> {
    let repository: Arc<dyn CustomFormatRepository> = match &storage.custom_formats_path {
        Some(path) => {
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                std::env::current_dir()?.join(path)
            };
            info!(target: "infrastructure", path = %absolute.display(), "opening custom format store");
            Arc::new(JsonFileCustomFormatRepository::open(absolute)?)
        }
        None => {
            info!(target: "infrastructure", "using in-memory custom format store");
            Arc::new(InMemoryCustomFormatRepository::new())
        }
    };

    if storage.seed_default_formats && repository.all()?.is_empty() {
        let templates = default_templates()?;
        info!(target: "infrastructure", count = templates.len(), "seeding default custom formats");
        for template in &templates {
            repository.insert(template)?;
        }
    }

    Ok(repository)
}

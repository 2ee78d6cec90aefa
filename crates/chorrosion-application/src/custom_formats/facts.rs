// SPDX-License-Identifier: GPL-3.0-or-later
use chorrosion_domain::{IndexerFlags, Language, QualityModel};
use serde::{Deserialize, Serialize};

/// Facts only some sources can supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraFacts {
    pub indexer_flags: IndexerFlags,
    pub size: Option<u64>,
    pub filename: Option<String>,
}

/// Normalised view of a release, file, history or blocklist entry that format
/// tags are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatFacts {
    pub simple_release_title: String,
    pub quality: QualityModel,
    pub languages: Vec<Language>,
    pub edition: Option<String>,
    pub release_group: Option<String>,
    pub extra: ExtraFacts,
}

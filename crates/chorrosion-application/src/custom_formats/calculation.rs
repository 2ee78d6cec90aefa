// SPDX-License-Identifier: GPL-3.0-or-later

//! Builds [`FormatFacts`] from the four places a release can be described
//! (parsed release, library file, history entry, blocklist entry) and
//! evaluates every known custom format against them.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chorrosion_domain::{BlocklistRecord, HistoryRecord, MediaFile, ReleaseInfo};
use tracing::debug;

use super::facts::{ExtraFacts, FormatFacts};
use super::format::CustomFormat;
use crate::ports::CustomFormatProvider;
use crate::release_parsing::{parse_release_title, simplify_release_title, ParsedReleaseInfo};

/// Formats that match `facts`, ordered by name.
pub fn matching_formats(formats: &[CustomFormat], facts: &FormatFacts) -> Vec<CustomFormat> {
    let mut matched: Vec<CustomFormat> = formats
        .iter()
        .filter(|format| format.matches(facts))
        .cloned()
        .collect();
    matched.sort_by(|a, b| a.name.cmp(&b.name));
    matched
}

pub fn facts_for_release(parsed: &ParsedReleaseInfo, release: Option<&ReleaseInfo>) -> FormatFacts {
    FormatFacts {
        simple_release_title: parsed.simple_release_title.clone(),
        quality: parsed.quality,
        languages: parsed.languages.clone(),
        edition: parsed.edition.clone(),
        release_group: parsed.release_group.clone(),
        extra: ExtraFacts {
            indexer_flags: release.map(|r| r.indexer_flags).unwrap_or_default(),
            size: release.map(|r| r.size),
            filename: None,
        },
    }
}

/// Facts for a file being imported: the parsed scene name plus what is known
/// about the file on disk.
pub fn facts_for_local_file(parsed: &ParsedReleaseInfo, path: &Path, size: u64) -> FormatFacts {
    FormatFacts {
        extra: ExtraFacts {
            indexer_flags: Default::default(),
            size: Some(size),
            filename: file_name(path),
        },
        ..facts_for_release(parsed, None)
    }
}

pub fn facts_for_media_file(file: &MediaFile) -> FormatFacts {
    let scene_name = file
        .scene_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            file.original_file_path
                .as_deref()
                .filter(|path| !path.trim().is_empty())
                .and_then(|path| file_name(Path::new(path)))
        })
        .or_else(|| file_name(Path::new(&file.relative_path)))
        .unwrap_or_else(|| file.relative_path.clone());

    let (simple_release_title, _) = simple_title_from_stored(&scene_name);

    FormatFacts {
        simple_release_title,
        quality: file.quality,
        languages: file.languages.clone(),
        edition: file.edition.clone(),
        release_group: file.release_group.clone(),
        extra: ExtraFacts {
            indexer_flags: file.indexer_flags,
            size: Some(file.size),
            filename: file_name(Path::new(&file.relative_path)),
        },
    }
}

pub fn facts_for_history(record: &HistoryRecord) -> FormatFacts {
    let (simple_release_title, parsed) = simple_title_from_stored(&record.source_title);

    FormatFacts {
        simple_release_title,
        quality: record.quality,
        languages: record.languages.clone(),
        edition: parsed.as_ref().and_then(|p| p.edition.clone()),
        release_group: parsed.and_then(|p| p.release_group),
        extra: ExtraFacts {
            indexer_flags: record.indexer_flags,
            size: record.size,
            filename: None,
        },
    }
}

pub fn facts_for_blocklist(record: &BlocklistRecord) -> FormatFacts {
    let (simple_release_title, parsed) = simple_title_from_stored(&record.source_title);

    FormatFacts {
        simple_release_title,
        quality: record.quality,
        languages: record.languages.clone(),
        edition: parsed.as_ref().and_then(|p| p.edition.clone()),
        release_group: parsed.and_then(|p| p.release_group),
        extra: ExtraFacts {
            indexer_flags: record.indexer_flags,
            size: record.size,
            filename: None,
        },
    }
}

/// Reuse the parser's simplified title when the stored title still parses,
/// otherwise simplify the raw string.
fn simple_title_from_stored(title: &str) -> (String, Option<ParsedReleaseInfo>) {
    match parse_release_title(title) {
        Some(parsed) => (parsed.simple_release_title.clone(), Some(parsed)),
        None => {
            debug!(target: "custom_formats", title, "stored title did not parse, simplifying raw title");
            (simplify_release_title(title), None)
        }
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Evaluates the current custom formats against any supported source.
#[derive(Clone)]
pub struct FormatCalculationService {
    formats: Arc<dyn CustomFormatProvider>,
}

impl FormatCalculationService {
    pub fn new(formats: Arc<dyn CustomFormatProvider>) -> Self {
        Self { formats }
    }

    fn evaluate(&self, facts: &FormatFacts) -> Result<Vec<CustomFormat>> {
        let formats = self.formats.all_formats()?;
        Ok(matching_formats(&formats, facts))
    }

    pub fn for_release(
        &self,
        parsed: &ParsedReleaseInfo,
        release: Option<&ReleaseInfo>,
    ) -> Result<Vec<CustomFormat>> {
        self.evaluate(&facts_for_release(parsed, release))
    }

    pub fn for_local_file(
        &self,
        parsed: &ParsedReleaseInfo,
        path: &Path,
        size: u64,
    ) -> Result<Vec<CustomFormat>> {
        self.evaluate(&facts_for_local_file(parsed, path, size))
    }

    pub fn for_media_file(&self, file: &MediaFile) -> Result<Vec<CustomFormat>> {
        self.evaluate(&facts_for_media_file(file))
    }

    pub fn for_history(&self, record: &HistoryRecord) -> Result<Vec<CustomFormat>> {
        self.evaluate(&facts_for_history(record))
    }

    pub fn for_blocklist(&self, record: &BlocklistRecord) -> Result<Vec<CustomFormat>> {
        self.evaluate(&facts_for_blocklist(record))
    }
}

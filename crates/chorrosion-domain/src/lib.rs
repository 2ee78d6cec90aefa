// SPDX-License-Identifier: GPL-3.0-or-later
use bitflags::bitflags;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod language;
pub mod quality;

pub use language::Language;
pub use quality::{Modifier, Quality, QualityModel, Resolution, Revision, Source};

// ============================================================================
// Value Objects & IDs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomFormatId(pub Uuid);

impl CustomFormatId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CustomFormatId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CustomFormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId(pub Uuid);

impl MediaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaUnitId(pub Uuid);

impl MediaUnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for MediaUnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MediaUnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaFileId(pub Uuid);

impl MediaFileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for MediaFileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MediaFileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Indexer Flags & Protocol
// ============================================================================

bitflags! {
    /// Tracker-specific release flags reported by an indexer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct IndexerFlags: u32 {
        const G_FREELEECH = 1;
        const G_HALFLEECH = 2;
        const G_DOUBLE_UPLOAD = 4;
        const PTP_GOLDEN = 8;
        const PTP_APPROVED = 16;
        const HDB_INTERNAL = 32;
        const AHD_INTERNAL = 64;
        const G_SCENE = 128;
        const G_FREELEECH75 = 256;
        const G_FREELEECH25 = 512;
    }
}

impl Default for IndexerFlags {
    fn default() -> Self {
        IndexerFlags::empty()
    }
}

impl IndexerFlags {
    /// Look up a single flag by name, ignoring case and underscores
    /// (`g_freeleech`, `GFreeleech` and `G_FREELEECH` are all accepted).
    pub fn from_flag_name(name: &str) -> Option<IndexerFlags> {
        let wanted = normalize_flag_name(name);
        IndexerFlags::all()
            .iter_names()
            .find(|(flag_name, _)| normalize_flag_name(flag_name) == wanted)
            .map(|(_, flag)| flag)
    }
}

fn normalize_flag_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadProtocol {
    #[default]
    Unknown,
    Usenet,
    Torrent,
}

impl std::fmt::Display for DownloadProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadProtocol::Unknown => write!(f, "unknown"),
            DownloadProtocol::Usenet => write!(f, "usenet"),
            DownloadProtocol::Torrent => write!(f, "torrent"),
        }
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// One rank in a quality profile. A group holds several qualities that are
/// treated as equal when comparing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileQualityItem {
    #[serde(default)]
    pub name: Option<String>,
    pub qualities: Vec<Quality>,
    pub allowed: bool,
}

impl ProfileQualityItem {
    pub fn single(quality: Quality, allowed: bool) -> Self {
        Self {
            name: None,
            qualities: vec![quality],
            allowed,
        }
    }

    pub fn group(name: impl Into<String>, qualities: Vec<Quality>, allowed: bool) -> Self {
        Self {
            name: Some(name.into()),
            qualities,
            allowed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFormatItem {
    pub format_id: CustomFormatId,
    #[serde(default)]
    pub name: String,
    pub score: i32,
}

fn default_min_upgrade_format_score() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityProfile {
    #[serde(default)]
    pub id: ProfileId,
    pub name: String,
    /// Lowest rank first.
    pub items: Vec<ProfileQualityItem>,
    pub cutoff: Quality,
    pub upgrade_allowed: bool,
    /// Position in this list is the format's rank; the score is independent.
    #[serde(default)]
    pub format_items: Vec<ProfileFormatItem>,
    #[serde(default)]
    pub min_format_score: i32,
    #[serde(default)]
    pub cutoff_format_score: i32,
    #[serde(default = "default_min_upgrade_format_score")]
    pub min_upgrade_format_score: i32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl QualityProfile {
    pub fn new(name: impl Into<String>, items: Vec<ProfileQualityItem>, cutoff: Quality) -> Self {
        let now = Utc::now();
        Self {
            id: ProfileId::new(),
            name: name.into(),
            items,
            cutoff,
            upgrade_allowed: true,
            format_items: Vec::new(),
            min_format_score: 0,
            cutoff_format_score: 0,
            min_upgrade_format_score: default_min_upgrade_format_score(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rank of the item holding `quality`, or `None` when the profile does not list it.
    pub fn index_of(&self, quality: Quality) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.qualities.contains(&quality))
    }

    pub fn is_allowed(&self, quality: Quality) -> bool {
        self.items
            .iter()
            .any(|item| item.allowed && item.qualities.contains(&quality))
    }

    pub fn last_allowed_quality(&self) -> Option<Quality> {
        self.items
            .iter()
            .rev()
            .find(|item| item.allowed)
            .and_then(|item| item.qualities.last().copied())
    }

    pub fn format_rank(&self, format_id: CustomFormatId) -> Option<usize> {
        self.format_items
            .iter()
            .position(|item| item.format_id == format_id)
    }

    pub fn format_score(&self, format_id: CustomFormatId) -> i32 {
        self.format_items
            .iter()
            .find(|item| item.format_id == format_id)
            .map(|item| item.score)
            .unwrap_or(0)
    }

    /// Sum of the profile scores of the given matched formats, saturating at
    /// the `i32` bounds.
    pub fn calculate_custom_format_score<'a>(
        &self,
        format_ids: impl IntoIterator<Item = &'a CustomFormatId>,
    ) -> i32 {
        format_ids
            .into_iter()
            .map(|id| self.format_score(*id))
            .fold(0, i32::saturating_add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayProfile {
    pub preferred_protocol: DownloadProtocol,
    pub usenet_delay_minutes: u32,
    pub torrent_delay_minutes: u32,
    pub bypass_if_highest_quality: bool,
}

impl Default for DelayProfile {
    fn default() -> Self {
        Self {
            preferred_protocol: DownloadProtocol::Usenet,
            usenet_delay_minutes: 0,
            torrent_delay_minutes: 0,
            bypass_if_highest_quality: true,
        }
    }
}

impl DelayProfile {
    pub fn delay_for(&self, protocol: DownloadProtocol) -> u32 {
        match protocol {
            DownloadProtocol::Usenet => self.usenet_delay_minutes,
            DownloadProtocol::Torrent => self.torrent_delay_minutes,
            DownloadProtocol::Unknown => 0,
        }
    }
}

// ============================================================================
// Library Items
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumAvailability {
    Announced,
    InCinemas,
    #[default]
    Released,
}

/// A monitorable sub-item of a library entry (episode, album, book).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaUnit {
    #[serde(default)]
    pub id: MediaUnitId,
    pub title: String,
    pub monitored: bool,
}

impl MediaUnit {
    pub fn new(title: impl Into<String>, monitored: bool) -> Self {
        Self {
            id: MediaUnitId::new(),
            title: title.into(),
            monitored,
        }
    }
}

/// Releases announced for cinema count as released this many days later
/// when no physical or digital date is known.
const CINEMA_TO_RELEASE_DAYS: i64 = 90;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub id: MediaId,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    pub monitored: bool,
    #[serde(default)]
    pub profile_id: ProfileId,
    #[serde(default)]
    pub minimum_availability: MinimumAvailability,
    #[serde(default)]
    pub in_cinemas: Option<DateTime<Utc>>,
    #[serde(default)]
    pub physical_release: Option<DateTime<Utc>>,
    #[serde(default)]
    pub digital_release: Option<DateTime<Utc>>,
    pub path: String,
    #[serde(default)]
    pub units: Vec<MediaUnit>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Media {
    pub fn new(title: impl Into<String>, path: impl Into<String>, profile_id: ProfileId) -> Self {
        let now = Utc::now();
        Self {
            id: MediaId::new(),
            title: title.into(),
            year: None,
            monitored: true,
            profile_id,
            minimum_availability: MinimumAvailability::default(),
            in_cinemas: None,
            physical_release: None,
            digital_release: None,
            path: path.into(),
            units: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The moment this item satisfies its minimum availability, shifted by
    /// `delay_days`. `None` when no usable release date is known; an item
    /// waiting for cinemas needs its cinema date.
    pub fn available_from(&self, delay_days: i64) -> Option<DateTime<Utc>> {
        if self.minimum_availability == MinimumAvailability::Announced {
            return Some(DateTime::<Utc>::MIN_UTC);
        }

        let base = match (self.minimum_availability, self.in_cinemas) {
            (MinimumAvailability::InCinemas, in_cinemas) => in_cinemas,
            _ => {
                let release = match (self.physical_release, self.digital_release) {
                    (Some(physical), Some(digital)) => Some(physical.min(digital)),
                    (physical, digital) => physical.or(digital),
                };
                release.or_else(|| {
                    self.in_cinemas
                        .map(|date| date + Duration::days(CINEMA_TO_RELEASE_DAYS))
                })
            }
        }?;

        Some(base + Duration::days(delay_days))
    }

    pub fn is_available(&self, delay_days: i64) -> bool {
        self.is_available_at(delay_days, Utc::now())
    }

    pub fn is_available_at(&self, delay_days: i64, now: DateTime<Utc>) -> bool {
        self.available_from(delay_days)
            .map(|from| now >= from)
            .unwrap_or(false)
    }

    pub fn unit(&self, id: MediaUnitId) -> Option<&MediaUnit> {
        self.units.iter().find(|unit| unit.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    #[serde(default)]
    pub id: MediaFileId,
    pub media_id: MediaId,
    /// Path relative to the owning media's folder.
    pub relative_path: String,
    #[serde(default)]
    pub original_file_path: Option<String>,
    #[serde(default)]
    pub scene_name: Option<String>,
    #[serde(default)]
    pub release_group: Option<String>,
    #[serde(default)]
    pub edition: Option<String>,
    pub quality: QualityModel,
    #[serde(default)]
    pub languages: Vec<Language>,
    pub size: u64,
    #[serde(default)]
    pub indexer_flags: IndexerFlags,
    #[serde(default = "Utc::now")]
    pub date_added: DateTime<Utc>,
}

impl MediaFile {
    pub fn new(
        media_id: MediaId,
        relative_path: impl Into<String>,
        quality: QualityModel,
        size: u64,
    ) -> Self {
        Self {
            id: MediaFileId::new(),
            media_id,
            relative_path: relative_path.into(),
            original_file_path: None,
            scene_name: None,
            release_group: None,
            edition: None,
            quality,
            languages: Vec::new(),
            size,
            indexer_flags: IndexerFlags::empty(),
            date_added: Utc::now(),
        }
    }
}

// ============================================================================
// History & Blocklist
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventType {
    Unknown,
    Grabbed,
    DownloadFolderImported,
    DownloadFailed,
    FileDeleted,
    FileRenamed,
    DownloadIgnored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub media_id: MediaId,
    pub source_title: String,
    pub quality: QualityModel,
    #[serde(default)]
    pub languages: Vec<Language>,
    pub event_type: HistoryEventType,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub indexer_flags: IndexerFlags,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub download_id: Option<String>,
}

impl HistoryRecord {
    pub fn grabbed(media_id: MediaId, source_title: impl Into<String>, quality: QualityModel) -> Self {
        Self {
            media_id,
            source_title: source_title.into(),
            quality,
            languages: Vec::new(),
            event_type: HistoryEventType::Grabbed,
            date: Utc::now(),
            indexer_flags: IndexerFlags::empty(),
            size: None,
            download_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocklistRecord {
    pub media_id: MediaId,
    pub source_title: String,
    pub quality: QualityModel,
    #[serde(default)]
    pub languages: Vec<Language>,
    pub date: DateTime<Utc>,
    pub protocol: DownloadProtocol,
    #[serde(default)]
    pub indexer: Option<String>,
    #[serde(default)]
    pub indexer_flags: IndexerFlags,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Releases
// ============================================================================

/// A release as reported by an indexer, before parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseInfo {
    #[serde(default)]
    pub guid: String,
    pub title: String,
    pub size: u64,
    #[serde(default)]
    pub indexer: String,
    pub protocol: DownloadProtocol,
    pub publish_date: DateTime<Utc>,
    #[serde(default)]
    pub indexer_flags: IndexerFlags,
    #[serde(default)]
    pub seeders: Option<u32>,
    #[serde(default)]
    pub peers: Option<u32>,
}

impl ReleaseInfo {
    pub fn new(title: impl Into<String>, protocol: DownloadProtocol, size: u64) -> Self {
        let title = title.into();
        Self {
            guid: title.clone(),
            title,
            size,
            indexer: String::new(),
            protocol,
            publish_date: Utc::now(),
            indexer_flags: IndexerFlags::empty(),
            seeders: None,
            peers: None,
        }
    }

    pub fn age_minutes_at(&self, now: DateTime<Utc>) -> f64 {
        (now - self.publish_date).num_seconds() as f64 / 60.0
    }

    pub fn age_minutes(&self) -> f64 {
        self.age_minutes_at(Utc::now())
    }

    pub fn age_hours(&self) -> f64 {
        self.age_minutes() / 60.0
    }

    pub fn age_days(&self) -> i64 {
        (Utc::now() - self.publish_date).num_days()
    }
}

// ============================================================================
// Domain Validation
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

impl Validate for QualityProfile {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ValidationError {
                field: "name",
                message: "name cannot be empty".into(),
            });
        }
        if self.items.is_empty() {
            errors.push(ValidationError {
                field: "items",
                message: "at least one quality item is required".into(),
            });
        } else if !self.items.iter().any(|item| item.allowed) {
            errors.push(ValidationError {
                field: "items",
                message: "at least one quality must be allowed".into(),
            });
        }
        if self.items.iter().any(|item| item.qualities.is_empty()) {
            errors.push(ValidationError {
                field: "items",
                message: "quality groups cannot be empty".into(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        if self
            .items
            .iter()
            .flat_map(|item| item.qualities.iter())
            .any(|quality| !seen.insert(*quality))
        {
            errors.push(ValidationError {
                field: "items",
                message: "a quality may only appear once".into(),
            });
        }
        if !self.items.is_empty() && !self.is_allowed(self.cutoff) {
            errors.push(ValidationError {
                field: "cutoff",
                message: "cutoff must be an allowed quality".into(),
            });
        }
        let mut seen_formats = std::collections::HashSet::new();
        if self
            .format_items
            .iter()
            .any(|item| !seen_formats.insert(item.format_id))
        {
            errors.push(ValidationError {
                field: "format_items",
                message: "a custom format may only be scored once".into(),
            });
        }
        if self.min_upgrade_format_score < 1 {
            errors.push(ValidationError {
                field: "min_upgrade_format_score",
                message: "minimum upgrade score must be at least 1".into(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Validate for Media {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(ValidationError {
                field: "title",
                message: "title cannot be empty".into(),
            });
        }
        if self.path.trim().is_empty() {
            errors.push(ValidationError {
                field: "path",
                message: "path cannot be empty".into(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// Domain Events (lightweight scaffolding)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent<TPayload> {
    pub name: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub payload: TPayload,
}

impl<TPayload> DomainEvent<TPayload> {
    pub fn new(name: &'static str, payload: TPayload) -> Self {
        Self {
            name,
            occurred_at: Utc::now(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFormatSavedPayload {
    pub format_id: CustomFormatId,
    pub name: String,
    pub tag_count: usize,
}

pub type CustomFormatCreated = DomainEvent<CustomFormatSavedPayload>;
pub type CustomFormatUpdated = DomainEvent<CustomFormatSavedPayload>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFormatDeletedPayload {
    pub format_id: CustomFormatId,
}

pub type CustomFormatDeleted = DomainEvent<CustomFormatDeletedPayload>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> QualityProfile {
        QualityProfile::new(
            "HD",
            vec![
                ProfileQualityItem::single(Quality::Sdtv, false),
                ProfileQualityItem::single(Quality::Hdtv720p, true),
                ProfileQualityItem::group(
                    "WEB 1080p",
                    vec![Quality::Webdl1080p, Quality::Hdtv1080p],
                    true,
                ),
                ProfileQualityItem::single(Quality::Bluray1080p, true),
            ],
            Quality::Bluray1080p,
        )
    }

    #[test]
    fn grouped_qualities_share_an_index() {
        let profile = profile();
        assert_eq!(profile.index_of(Quality::Webdl1080p), Some(2));
        assert_eq!(profile.index_of(Quality::Hdtv1080p), Some(2));
        assert_eq!(profile.index_of(Quality::Remux2160p), None);
    }

    #[test]
    fn allowed_and_last_allowed_quality() {
        let profile = profile();
        assert!(!profile.is_allowed(Quality::Sdtv));
        assert!(profile.is_allowed(Quality::Hdtv1080p));
        assert_eq!(profile.last_allowed_quality(), Some(Quality::Bluray1080p));
    }

    #[test]
    fn format_score_sums_matched_formats() {
        let mut profile = profile();
        let a = CustomFormatId::new();
        let b = CustomFormatId::new();
        profile.format_items = vec![
            ProfileFormatItem {
                format_id: a,
                name: "A".into(),
                score: 10,
            },
            ProfileFormatItem {
                format_id: b,
                name: "B".into(),
                score: -3,
            },
        ];
        assert_eq!(profile.calculate_custom_format_score(&[a, b]), 7);
        assert_eq!(profile.calculate_custom_format_score(&[CustomFormatId::new()]), 0);
        assert_eq!(profile.format_rank(b), Some(1));
    }

    #[test]
    fn format_score_saturates_instead_of_overflowing() {
        let mut profile = profile();
        let ids: Vec<_> = (0..2).map(|_| CustomFormatId::new()).collect();
        profile.format_items = ids
            .iter()
            .map(|id| ProfileFormatItem {
                format_id: *id,
                name: id.to_string(),
                score: 2_000_000_000,
            })
            .collect();
        assert_eq!(profile.calculate_custom_format_score(&ids), i32::MAX);

        for item in &mut profile.format_items {
            item.score = -2_000_000_000;
        }
        assert_eq!(profile.calculate_custom_format_score(&ids), i32::MIN);
    }

    #[test]
    fn validate_quality_profile() {
        let mut profile = profile();
        assert!(profile.validate().is_ok());

        profile.cutoff = Quality::Sdtv;
        profile.name = " ".into();
        let errors = profile.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "name"));
        assert!(errors.iter().any(|e| e.field == "cutoff"));
    }

    #[test]
    fn validate_rejects_duplicate_qualities() {
        let mut profile = profile();
        profile
            .items
            .push(ProfileQualityItem::single(Quality::Hdtv720p, true));
        let errors = profile.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("only appear once")));
    }

    #[test]
    fn indexer_flag_lookup_ignores_case_and_underscores() {
        assert_eq!(
            IndexerFlags::from_flag_name("g_freeleech"),
            Some(IndexerFlags::G_FREELEECH)
        );
        assert_eq!(
            IndexerFlags::from_flag_name("HDBInternal"),
            Some(IndexerFlags::HDB_INTERNAL)
        );
        assert_eq!(
            IndexerFlags::from_flag_name("g_doubleupload"),
            Some(IndexerFlags::G_DOUBLE_UPLOAD)
        );
        assert_eq!(IndexerFlags::from_flag_name("nope"), None);
    }

    #[test]
    fn delay_for_protocol() {
        let profile = DelayProfile {
            usenet_delay_minutes: 60,
            torrent_delay_minutes: 120,
            ..DelayProfile::default()
        };
        assert_eq!(profile.delay_for(DownloadProtocol::Usenet), 60);
        assert_eq!(profile.delay_for(DownloadProtocol::Torrent), 120);
    }

    #[test]
    fn announced_media_is_always_available() {
        let mut media = Media::new("Movie", "/movies/Movie", ProfileId::new());
        media.minimum_availability = MinimumAvailability::Announced;
        assert!(media.is_available(30));
    }

    #[test]
    fn in_cinemas_availability_respects_delay() {
        let now = Utc::now();
        let mut media = Media::new("Movie", "/movies/Movie", ProfileId::new());
        media.minimum_availability = MinimumAvailability::InCinemas;
        media.in_cinemas = Some(now - Duration::days(5));

        assert!(media.is_available_at(0, now));
        assert!(media.is_available_at(5, now));
        assert!(!media.is_available_at(6, now));
    }

    #[test]
    fn in_cinemas_without_cinema_date_is_unavailable() {
        let now = Utc::now();
        let mut media = Media::new("Movie", "/movies/Movie", ProfileId::new());
        media.minimum_availability = MinimumAvailability::InCinemas;
        media.digital_release = Some(now - Duration::days(30));

        assert_eq!(media.available_from(0), None);
        assert!(!media.is_available_at(0, now));
    }

    #[test]
    fn released_uses_earliest_home_release() {
        let now = Utc::now();
        let mut media = Media::new("Movie", "/movies/Movie", ProfileId::new());
        media.physical_release = Some(now + Duration::days(10));
        media.digital_release = Some(now - Duration::days(1));
        assert!(media.is_available_at(0, now));
    }

    #[test]
    fn released_falls_back_to_cinema_date_plus_ninety_days() {
        let now = Utc::now();
        let mut media = Media::new("Movie", "/movies/Movie", ProfileId::new());
        media.in_cinemas = Some(now - Duration::days(60));
        assert!(!media.is_available_at(0, now));

        media.in_cinemas = Some(now - Duration::days(91));
        assert!(media.is_available_at(0, now));
    }

    #[test]
    fn media_without_dates_is_unavailable() {
        let media = Media::new("Movie", "/movies/Movie", ProfileId::new());
        assert!(!media.is_available(0));
    }

    #[test]
    fn release_age_in_minutes() {
        let now = Utc::now();
        let mut release = ReleaseInfo::new("Movie.2020.1080p", DownloadProtocol::Usenet, 1);
        release.publish_date = now - Duration::minutes(90);
        assert!((release.age_minutes_at(now) - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn custom_format_event_wraps_payload() {
        let id = CustomFormatId::new();
        let evt: CustomFormatCreated = DomainEvent::new(
            "custom_format.created",
            CustomFormatSavedPayload {
                format_id: id,
                name: "x264".into(),
                tag_count: 1,
            },
        );
        assert_eq!(evt.name, "custom_format.created");
        assert_eq!(evt.payload.format_id, id);
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later

//! Release acceptance: a set of independent specifications, each of which can
//! veto a candidate, and the decision maker that runs them.

pub mod maker;
pub mod prioritize;
pub mod specifications;

use std::fmt;

use anyhow::Result;
use chorrosion_domain::{Media, MediaUnitId, QualityProfile, ReleaseInfo};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::custom_formats::CustomFormat;
use crate::release_parsing::ParsedReleaseInfo;
use crate::upgrade::UpgradeableRejectReason;

pub use maker::{DecisionMaker, DecisionServices, DownloadDecision, ReleaseCandidate};
pub use prioritize::{prioritize_decisions, DownloadDecisionComparer};

/// Why a candidate was rejected. Presentation text comes from `Display`;
/// callers that group or translate rejections should match on the variant
/// or use [`RejectionReason::code`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RejectionReason {
    UnableToParse,
    EvaluationError { specification: String },
    InvalidProfile { errors: Vec<String> },
    InvalidMedia { errors: Vec<String> },

    NotAvailable { available_from: Option<DateTime<Utc>> },
    MediaNotMonitored,
    UnitsNotMonitored,
    DelayWaiting { delay_minutes: u32, age_minutes: i64 },

    HistoryCutoffMet { recent: bool },
    HistoryHigherQuality { recent: bool },
    HistoryHigherRevision { recent: bool },
    HistoryQualityCutoff { recent: bool },
    HistoryCustomFormatCutoff { recent: bool },
    HistoryCustomFormatScore { recent: bool },
    HistoryCustomFormatScoreIncrement { recent: bool },
    HistoryUpgradesNotAllowed { recent: bool },

    DiskHigherQuality,
    DiskHigherRevision,
    DiskCutoffMet,
    DiskCustomFormatCutoff,
    DiskCustomFormatScore,
    DiskCustomFormatScoreIncrement,
    DiskUpgradesNotAllowed,

    CutoffMet,
    QualityNotWanted { quality: String },
    CustomFormatMinimumScore { score: i32, minimum: i32 },

    PropersNotWanted,
    ProperForOldFile { max_age_days: i64 },
    RepacksNotWanted,
    RepackExistingGroupUnknown,
    RepackReleaseGroupUnknown,
    RepackReleaseGroupMismatch { existing: String, release: String },

    MissingFromDisk,
}

impl RejectionReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::UnableToParse => "unable_to_parse",
            RejectionReason::EvaluationError { .. } => "evaluation_error",
            RejectionReason::InvalidProfile { .. } => "invalid_profile",
            RejectionReason::InvalidMedia { .. } => "invalid_media",
            RejectionReason::NotAvailable { .. } => "not_available",
            RejectionReason::MediaNotMonitored => "media_not_monitored",
            RejectionReason::UnitsNotMonitored => "units_not_monitored",
            RejectionReason::DelayWaiting { .. } => "delay_waiting",
            RejectionReason::HistoryCutoffMet { .. } => "history_cutoff_met",
            RejectionReason::HistoryHigherQuality { .. } => "history_higher_quality",
            RejectionReason::HistoryHigherRevision { .. } => "history_higher_revision",
            RejectionReason::HistoryQualityCutoff { .. } => "history_quality_cutoff",
            RejectionReason::HistoryCustomFormatCutoff { .. } => "history_custom_format_cutoff",
            RejectionReason::HistoryCustomFormatScore { .. } => "history_custom_format_score",
            RejectionReason::HistoryCustomFormatScoreIncrement { .. } => {
                "history_custom_format_score_increment"
            }
            RejectionReason::HistoryUpgradesNotAllowed { .. } => "history_upgrades_not_allowed",
            RejectionReason::DiskHigherQuality => "disk_higher_quality",
            RejectionReason::DiskHigherRevision => "disk_higher_revision",
            RejectionReason::DiskCutoffMet => "disk_cutoff_met",
            RejectionReason::DiskCustomFormatCutoff => "disk_custom_format_cutoff",
            RejectionReason::DiskCustomFormatScore => "disk_custom_format_score",
            RejectionReason::DiskCustomFormatScoreIncrement => "disk_custom_format_score_increment",
            RejectionReason::DiskUpgradesNotAllowed => "disk_upgrades_not_allowed",
            RejectionReason::CutoffMet => "cutoff_met",
            RejectionReason::QualityNotWanted { .. } => "quality_not_wanted",
            RejectionReason::CustomFormatMinimumScore { .. } => "custom_format_minimum_score",
            RejectionReason::PropersNotWanted => "propers_not_wanted",
            RejectionReason::ProperForOldFile { .. } => "proper_for_old_file",
            RejectionReason::RepacksNotWanted => "repacks_not_wanted",
            RejectionReason::RepackExistingGroupUnknown => "repack_existing_group_unknown",
            RejectionReason::RepackReleaseGroupUnknown => "repack_release_group_unknown",
            RejectionReason::RepackReleaseGroupMismatch { .. } => "repack_release_group_mismatch",
            RejectionReason::MissingFromDisk => "missing_from_disk",
        }
    }

    /// Map an upgrade verdict against a grabbed history entry. `None` for an upgrade.
    pub fn from_history(reason: UpgradeableRejectReason, recent: bool) -> Option<Self> {
        let mapped = match reason {
            UpgradeableRejectReason::None => return None,
            UpgradeableRejectReason::BetterQuality => RejectionReason::HistoryHigherQuality { recent },
            UpgradeableRejectReason::BetterRevision => RejectionReason::HistoryHigherRevision { recent },
            UpgradeableRejectReason::QualityCutoff => RejectionReason::HistoryQualityCutoff { recent },
            UpgradeableRejectReason::CustomFormatCutoff => {
                RejectionReason::HistoryCustomFormatCutoff { recent }
            }
            UpgradeableRejectReason::CustomFormatScore => {
                RejectionReason::HistoryCustomFormatScore { recent }
            }
            UpgradeableRejectReason::MinCustomFormatScore => {
                RejectionReason::HistoryCustomFormatScoreIncrement { recent }
            }
            UpgradeableRejectReason::UpgradesNotAllowed => {
                RejectionReason::HistoryUpgradesNotAllowed { recent }
            }
        };
        Some(mapped)
    }

    /// Map an upgrade verdict against a file on disk. `None` for an upgrade.
    pub fn from_disk(reason: UpgradeableRejectReason) -> Option<Self> {
        let mapped = match reason {
            UpgradeableRejectReason::None => return None,
            UpgradeableRejectReason::BetterQuality => RejectionReason::DiskHigherQuality,
            UpgradeableRejectReason::BetterRevision => RejectionReason::DiskHigherRevision,
            UpgradeableRejectReason::QualityCutoff => RejectionReason::DiskCutoffMet,
            UpgradeableRejectReason::CustomFormatCutoff => RejectionReason::DiskCustomFormatCutoff,
            UpgradeableRejectReason::CustomFormatScore => RejectionReason::DiskCustomFormatScore,
            UpgradeableRejectReason::MinCustomFormatScore => {
                RejectionReason::DiskCustomFormatScoreIncrement
            }
            UpgradeableRejectReason::UpgradesNotAllowed => RejectionReason::DiskUpgradesNotAllowed,
        };
        Some(mapped)
    }
}

fn history_prefix(recent: bool) -> &'static str {
    if recent {
        "recent grab event in history"
    } else {
        "grab event in history (completed download handling disabled)"
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnableToParse => f.write_str("unable to parse release"),
            RejectionReason::EvaluationError { specification } => {
                write!(f, "unexpected error while checking {specification}")
            }
            RejectionReason::InvalidProfile { errors } => {
                write!(f, "quality profile is invalid: {}", errors.join(", "))
            }
            RejectionReason::InvalidMedia { errors } => {
                write!(f, "item is invalid: {}", errors.join(", "))
            }
            RejectionReason::NotAvailable { available_from: Some(date) } => {
                write!(f, "not considered available until {}", date.format("%Y-%m-%d"))
            }
            RejectionReason::NotAvailable { available_from: None } => {
                f.write_str("no release date known, not considered available")
            }
            RejectionReason::MediaNotMonitored => f.write_str("item is not monitored"),
            RejectionReason::UnitsNotMonitored => f.write_str("none of the targeted units are monitored"),
            RejectionReason::DelayWaiting { delay_minutes, age_minutes } => write!(
                f,
                "waiting for better quality release ({age_minutes} of {delay_minutes} minutes)"
            ),
            RejectionReason::HistoryCutoffMet { recent } => {
                write!(f, "{} meets cutoff", history_prefix(*recent))
            }
            RejectionReason::HistoryHigherQuality { recent } => {
                write!(f, "{} has higher quality", history_prefix(*recent))
            }
            RejectionReason::HistoryHigherRevision { recent } => {
                write!(f, "{} has a higher revision", history_prefix(*recent))
            }
            RejectionReason::HistoryQualityCutoff { recent } => {
                write!(f, "{} meets quality cutoff", history_prefix(*recent))
            }
            RejectionReason::HistoryCustomFormatCutoff { recent } => {
                write!(f, "{} meets custom format cutoff", history_prefix(*recent))
            }
            RejectionReason::HistoryCustomFormatScore { recent } => {
                write!(f, "{} has an equal or higher custom format score", history_prefix(*recent))
            }
            RejectionReason::HistoryCustomFormatScoreIncrement { recent } => write!(
                f,
                "{} scores too close to this release to upgrade",
                history_prefix(*recent)
            ),
            RejectionReason::HistoryUpgradesNotAllowed { recent } => {
                write!(f, "{} exists and upgrades are disabled", history_prefix(*recent))
            }
            RejectionReason::DiskHigherQuality => f.write_str("existing file has higher quality"),
            RejectionReason::DiskHigherRevision => f.write_str("existing file has a higher revision"),
            RejectionReason::DiskCutoffMet => f.write_str("existing file meets quality cutoff"),
            RejectionReason::DiskCustomFormatCutoff => {
                f.write_str("existing file meets custom format cutoff")
            }
            RejectionReason::DiskCustomFormatScore => {
                f.write_str("existing file has an equal or higher custom format score")
            }
            RejectionReason::DiskCustomFormatScoreIncrement => {
                f.write_str("custom format score increase over existing file is too small")
            }
            RejectionReason::DiskUpgradesNotAllowed => {
                f.write_str("existing file and profile does not allow upgrades")
            }
            RejectionReason::CutoffMet => f.write_str("existing file meets cutoff"),
            RejectionReason::QualityNotWanted { quality } => {
                write!(f, "{quality} is not wanted in profile")
            }
            RejectionReason::CustomFormatMinimumScore { score, minimum } => write!(
                f,
                "custom format score {score} is below the profile minimum of {minimum}"
            ),
            RejectionReason::PropersNotWanted => f.write_str("proper downloading is disabled"),
            RejectionReason::ProperForOldFile { max_age_days } => write!(
                f,
                "proper for a file older than {max_age_days} days"
            ),
            RejectionReason::RepacksNotWanted => f.write_str("repack downloading is disabled"),
            RejectionReason::RepackExistingGroupUnknown => {
                f.write_str("release group of the existing file is unknown")
            }
            RejectionReason::RepackReleaseGroupUnknown => {
                f.write_str("release group of the repack is unknown")
            }
            RejectionReason::RepackReleaseGroupMismatch { existing, release } => write!(
                f,
                "repack from {release} does not match existing release group {existing}"
            ),
            RejectionReason::MissingFromDisk => {
                f.write_str("file missing from disk, treating as unmonitored")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    Permanent,
    /// Retried on a later sync, e.g. while a delay is running.
    Temporary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    #[serde(flatten)]
    pub reason: RejectionReason,
    pub kind: RejectionKind,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(Rejection),
}

impl Decision {
    pub fn accept() -> Self {
        Decision::Accept
    }

    pub fn reject(reason: RejectionReason) -> Self {
        Decision::Reject(Rejection {
            reason,
            kind: RejectionKind::Permanent,
        })
    }

    pub fn reject_temporarily(reason: RejectionReason) -> Self {
        Decision::Reject(Rejection {
            reason,
            kind: RejectionKind::Temporary,
        })
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accept)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Decision::Accept => None,
            Decision::Reject(rejection) => Some(rejection),
        }
    }
}

/// Context of the search that produced the candidate. Absent for RSS sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub user_invoked: bool,
}

impl SearchCriteria {
    pub fn automatic() -> Self {
        Self { user_invoked: false }
    }

    pub fn user_invoked() -> Self {
        Self { user_invoked: true }
    }
}

pub(crate) fn is_user_invoked(search: Option<&SearchCriteria>) -> bool {
    search.is_some_and(|criteria| criteria.user_invoked)
}

/// Evaluation tiers. Cheap in-memory checks run first, checks that read
/// the library database next and checks that touch the filesystem last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecificationPriority {
    Default,
    Database,
    Disk,
}

/// A parsed release resolved against the library item it targets.
#[derive(Debug, Clone)]
pub struct RemoteRelease {
    pub release: ReleaseInfo,
    pub parsed: ParsedReleaseInfo,
    pub media: Media,
    pub profile: QualityProfile,
    pub custom_formats: Vec<CustomFormat>,
    pub custom_format_score: i32,
    pub target_unit_ids: Vec<MediaUnitId>,
}

pub trait DecisionSpecification: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Default
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        search: Option<&SearchCriteria>,
    ) -> Result<Decision>;
}

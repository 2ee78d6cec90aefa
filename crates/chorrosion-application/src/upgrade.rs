// SPDX-License-Identifier: GPL-3.0-or-later
use std::cmp::Ordering;
use std::fmt;

use chorrosion_config::ProperDownloadPolicy;
use chorrosion_domain::{Quality, QualityModel, QualityProfile};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::comparer::QualityModelComparer;
use crate::custom_formats::CustomFormat;

/// Outcome of an upgrade check. `None` means the candidate is an upgrade;
/// every other variant names why the current item wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeableRejectReason {
    None,
    BetterQuality,
    BetterRevision,
    QualityCutoff,
    CustomFormatCutoff,
    CustomFormatScore,
    MinCustomFormatScore,
    UpgradesNotAllowed,
}

impl UpgradeableRejectReason {
    pub fn is_upgrade(&self) -> bool {
        matches!(self, UpgradeableRejectReason::None)
    }
}

impl fmt::Display for UpgradeableRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UpgradeableRejectReason::None => "upgrade",
            UpgradeableRejectReason::BetterQuality => "existing quality is better",
            UpgradeableRejectReason::BetterRevision => "existing revision is better",
            UpgradeableRejectReason::QualityCutoff => "existing quality meets cutoff",
            UpgradeableRejectReason::CustomFormatCutoff => "existing custom format score meets cutoff",
            UpgradeableRejectReason::CustomFormatScore => "existing custom format score is not lower",
            UpgradeableRejectReason::MinCustomFormatScore => {
                "custom format score increase is below the minimum upgrade step"
            }
            UpgradeableRejectReason::UpgradesNotAllowed => "profile does not allow upgrades",
        };
        f.write_str(text)
    }
}

/// Decides whether a candidate improves on something already owned.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpgradableSpecification {
    propers: ProperDownloadPolicy,
}

impl UpgradableSpecification {
    pub fn new(propers: ProperDownloadPolicy) -> Self {
        Self { propers }
    }

    pub fn is_upgradable(
        &self,
        profile: &QualityProfile,
        current_quality: &QualityModel,
        current_formats: &[CustomFormat],
        new_quality: &QualityModel,
        new_format_score: i32,
    ) -> UpgradeableRejectReason {
        if !profile.upgrade_allowed {
            debug!(target: "decision", profile = %profile.name, "upgrades disabled by profile");
            return UpgradeableRejectReason::UpgradesNotAllowed;
        }

        let comparer = QualityModelComparer::new(profile);
        let quality_compare = comparer.compare_quality(new_quality.quality, current_quality.quality);

        if quality_compare == Ordering::Greater && Self::quality_cutoff_not_met(profile, current_quality) {
            debug!(target: "decision", current = %current_quality, new = %new_quality, "new quality is an upgrade");
            return UpgradeableRejectReason::None;
        }

        if quality_compare == Ordering::Less {
            return UpgradeableRejectReason::BetterQuality;
        }

        if quality_compare == Ordering::Equal {
            match new_quality.revision.cmp(&current_quality.revision) {
                Ordering::Greater if self.propers != ProperDownloadPolicy::DoNotPrefer => {
                    debug!(target: "decision", current = %current_quality, new = %new_quality, "new revision is an upgrade");
                    return UpgradeableRejectReason::None;
                }
                Ordering::Less => return UpgradeableRejectReason::BetterRevision,
                _ => {}
            }
        }

        if quality_compare == Ordering::Greater {
            return UpgradeableRejectReason::QualityCutoff;
        }

        let current_format_score =
            profile.calculate_custom_format_score(current_formats.iter().map(|f| &f.id));

        if current_format_score >= profile.cutoff_format_score {
            return UpgradeableRejectReason::CustomFormatCutoff;
        }

        if new_format_score <= current_format_score {
            return UpgradeableRejectReason::CustomFormatScore;
        }

        if new_format_score.saturating_sub(current_format_score) < profile.min_upgrade_format_score {
            return UpgradeableRejectReason::MinCustomFormatScore;
        }

        debug!(
            target: "decision",
            current_format_score,
            new_format_score,
            "custom format score is an upgrade"
        );
        UpgradeableRejectReason::None
    }

    /// When upgrades are off the first allowed quality acts as the cutoff.
    pub fn quality_cutoff_not_met(profile: &QualityProfile, current_quality: &QualityModel) -> bool {
        let cutoff = if profile.upgrade_allowed {
            Some(profile.cutoff)
        } else {
            first_allowed_quality(profile)
        };

        match cutoff {
            Some(cutoff) => {
                QualityModelComparer::new(profile).compare_quality(current_quality.quality, cutoff)
                    == Ordering::Less
            }
            None => false,
        }
    }

    pub fn custom_format_cutoff_not_met(profile: &QualityProfile, current_formats: &[CustomFormat]) -> bool {
        let score = profile.calculate_custom_format_score(current_formats.iter().map(|f| &f.id));
        score < profile.cutoff_format_score
    }

    /// True while the current item has room to improve: quality below the
    /// cutoff, a revision upgrade is on offer, or the format score is below
    /// the format cutoff.
    pub fn cutoff_not_met(
        &self,
        profile: &QualityProfile,
        current_quality: &QualityModel,
        current_formats: &[CustomFormat],
        new_quality: Option<&QualityModel>,
    ) -> bool {
        if Self::quality_cutoff_not_met(profile, current_quality) {
            return true;
        }

        if new_quality.is_some_and(|new| Self::is_revision_upgrade(current_quality, new)) {
            return true;
        }

        Self::custom_format_cutoff_not_met(profile, current_formats)
    }

    /// Only the identical quality counts; a proper WEBDL does not upgrade a WEBRip.
    pub fn is_revision_upgrade(current_quality: &QualityModel, new_quality: &QualityModel) -> bool {
        current_quality.quality == new_quality.quality
            && new_quality.revision > current_quality.revision
    }
}

fn first_allowed_quality(profile: &QualityProfile) -> Option<Quality> {
    profile
        .items
        .iter()
        .find(|item| item.allowed)
        .and_then(|item| item.qualities.first().copied())
}

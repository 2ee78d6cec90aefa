// SPDX-License-Identifier: GPL-3.0-or-later
use std::cmp::Ordering;

use chorrosion_domain::{Quality, QualityModel, QualityProfile};

use crate::custom_formats::CustomFormat;

/// Orders qualities by their rank in a profile. Qualities the profile does
/// not list rank below everything it does.
pub struct QualityModelComparer<'a> {
    profile: &'a QualityProfile,
}

impl<'a> QualityModelComparer<'a> {
    pub fn new(profile: &'a QualityProfile) -> Self {
        Self { profile }
    }

    pub fn compare_quality(&self, left: Quality, right: Quality) -> Ordering {
        let rank = |quality| self.profile.index_of(quality).map(|i| i as i64).unwrap_or(-1);
        rank(left).cmp(&rank(right))
    }

    /// Rank first, then revision.
    pub fn compare(&self, left: &QualityModel, right: &QualityModel) -> Ordering {
        self.compare_quality(left.quality, right.quality)
            .then_with(|| left.revision.cmp(&right.revision))
    }
}

/// Orders matched format sets by profile rank.
///
/// Each format contributes `2^rank`, so a single higher-ranked format beats
/// any combination of lower-ranked ones. The sums are compared as descending
/// rank sequences, which is equivalent and cannot overflow.
pub struct CustomFormatComparer<'a> {
    profile: &'a QualityProfile,
}

impl<'a> CustomFormatComparer<'a> {
    /// # Panics
    ///
    /// Panics if the profile has no ranked formats.
    pub fn new(profile: &'a QualityProfile) -> Self {
        assert!(
            !profile.format_items.is_empty(),
            "custom format comparison requires a profile with ranked formats"
        );
        Self { profile }
    }

    pub fn compare(&self, left: &[CustomFormat], right: &[CustomFormat]) -> Ordering {
        self.ranks(left).cmp(&self.ranks(right))
    }

    fn ranks(&self, formats: &[CustomFormat]) -> Vec<usize> {
        let mut ranks: Vec<usize> = formats
            .iter()
            .filter_map(|format| self.profile.format_rank(format.id))
            .collect();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        ranks.dedup();
        ranks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorrosion_domain::{ProfileFormatItem, ProfileQualityItem, Revision};

    fn profile() -> QualityProfile {
        QualityProfile::new(
            "Any",
            vec![
                ProfileQualityItem::single(Quality::Sdtv, true),
                ProfileQualityItem::group(
                    "HD-720p",
                    vec![Quality::Hdtv720p, Quality::Webdl720p],
                    true,
                ),
                ProfileQualityItem::single(Quality::Bluray1080p, true),
            ],
            Quality::Bluray1080p,
        )
    }

    fn format(name: &str) -> CustomFormat {
        CustomFormat::new(name, vec![])
    }

    fn ranked(profile: &mut QualityProfile, formats: &[&CustomFormat]) {
        profile.format_items = formats
            .iter()
            .map(|f| ProfileFormatItem {
                format_id: f.id,
                name: f.name.clone(),
                score: 0,
            })
            .collect();
    }

    #[test]
    fn quality_rank_follows_profile_order() {
        let profile = profile();
        let comparer = QualityModelComparer::new(&profile);
        assert_eq!(
            comparer.compare_quality(Quality::Bluray1080p, Quality::Sdtv),
            Ordering::Greater
        );
        assert_eq!(
            comparer.compare_quality(Quality::Hdtv720p, Quality::Webdl720p),
            Ordering::Equal
        );
        assert_eq!(
            comparer.compare_quality(Quality::Remux2160p, Quality::Sdtv),
            Ordering::Less
        );
    }

    #[test]
    fn revision_breaks_quality_ties() {
        let profile = profile();
        let comparer = QualityModelComparer::new(&profile);
        let v1 = QualityModel::new(Quality::Hdtv720p);
        let v2 = QualityModel::with_revision(Quality::Webdl720p, Revision::new(2, 0, false));
        assert_eq!(comparer.compare(&v2, &v1), Ordering::Greater);
    }

    #[test]
    fn higher_ranked_format_beats_any_lower_combination() {
        let a = format("A");
        let a2 = format("A2");
        let a3 = format("A3");
        let b = format("B");
        let mut profile = profile();
        ranked(&mut profile, &[&a, &a2, &a3, &b]);
        let comparer = CustomFormatComparer::new(&profile);

        let lower = vec![a.clone(), a2.clone(), a3.clone()];
        assert_eq!(comparer.compare(&[b.clone()], &lower), Ordering::Greater);
        assert_eq!(comparer.compare(&lower, &[b.clone()]), Ordering::Less);
        assert_eq!(
            comparer.compare(&[b.clone(), a.clone()], &[b.clone()]),
            Ordering::Greater
        );
    }

    #[test]
    fn two_format_profile() {
        let a = format("A");
        let b = format("B");
        let mut profile = profile();
        ranked(&mut profile, &[&a, &b]);
        let comparer = CustomFormatComparer::new(&profile);

        assert_eq!(comparer.compare(&[b.clone()], &[a.clone()]), Ordering::Greater);
        assert_eq!(comparer.compare(&[a.clone()], &[a.clone()]), Ordering::Equal);
        assert_eq!(comparer.compare(&[], &[a.clone()]), Ordering::Less);
    }

    #[test]
    fn unranked_formats_are_ignored() {
        let a = format("A");
        let stray = format("Stray");
        let mut profile = profile();
        ranked(&mut profile, &[&a]);
        let comparer = CustomFormatComparer::new(&profile);

        assert_eq!(
            comparer.compare(&[a.clone(), stray], &[a.clone()]),
            Ordering::Equal
        );
    }

    #[test]
    #[should_panic(expected = "ranked formats")]
    fn empty_ranked_list_is_a_programming_error() {
        let profile = profile();
        let _ = CustomFormatComparer::new(&profile);
    }

    #[test]
    fn comparison_is_consistent_with_powers_of_two() {
        let formats: Vec<CustomFormat> = (0..6).map(|i| format(&format!("F{i}"))).collect();
        let mut profile = profile();
        ranked(&mut profile, &formats.iter().collect::<Vec<_>>());
        let comparer = CustomFormatComparer::new(&profile);

        let subsets: Vec<Vec<CustomFormat>> = (0u32..64)
            .map(|mask| {
                formats
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, f)| f.clone())
                    .collect()
            })
            .collect();

        for (left_mask, left) in subsets.iter().enumerate() {
            for (right_mask, right) in subsets.iter().enumerate() {
                assert_eq!(
                    comparer.compare(left, right),
                    left_mask.cmp(&right_mask),
                    "masks {left_mask} vs {right_mask}"
                );
            }
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use std::cmp::Ordering;

use chorrosion_config::ProperDownloadPolicy;
use chorrosion_domain::{DelayProfile, DownloadProtocol, MediaId};

use super::maker::DownloadDecision;
use super::RemoteRelease;
use crate::comparer::QualityModelComparer;

const SIZE_BUCKET_BYTES: u64 = 200 * 1024 * 1024;

/// Orders approved decisions from most to least preferred.
pub struct DownloadDecisionComparer<'a> {
    delay_profile: &'a DelayProfile,
    propers: ProperDownloadPolicy,
}

impl<'a> DownloadDecisionComparer<'a> {
    pub fn new(delay_profile: &'a DelayProfile, propers: ProperDownloadPolicy) -> Self {
        Self {
            delay_profile,
            propers,
        }
    }

    /// `Greater` means `left` is preferred.
    pub fn compare(&self, left: &RemoteRelease, right: &RemoteRelease) -> Ordering {
        self.compare_quality(left, right)
            .then_with(|| left.custom_format_score.cmp(&right.custom_format_score))
            .then_with(|| self.compare_revision(left, right))
            .then_with(|| self.compare_protocol(left, right))
            .then_with(|| compare_peers_if_torrent(left, right))
            .then_with(|| compare_age_if_usenet(left, right))
            .then_with(|| size_bucket(left).cmp(&size_bucket(right)))
    }

    fn compare_quality(&self, left: &RemoteRelease, right: &RemoteRelease) -> Ordering {
        QualityModelComparer::new(&left.profile)
            .compare_quality(left.parsed.quality.quality, right.parsed.quality.quality)
    }

    fn compare_revision(&self, left: &RemoteRelease, right: &RemoteRelease) -> Ordering {
        if self.propers == ProperDownloadPolicy::DoNotPrefer {
            return Ordering::Equal;
        }
        left.parsed
            .quality
            .revision
            .cmp(&right.parsed.quality.revision)
    }

    fn compare_protocol(&self, left: &RemoteRelease, right: &RemoteRelease) -> Ordering {
        let preferred = |remote: &RemoteRelease| remote.release.protocol == self.delay_profile.preferred_protocol;
        preferred(left).cmp(&preferred(right))
    }
}

fn log10_bucket(value: Option<u32>) -> i64 {
    match value {
        Some(value) if value > 0 => f64::from(value).log10().round() as i64,
        _ => 0,
    }
}

fn compare_peers_if_torrent(left: &RemoteRelease, right: &RemoteRelease) -> Ordering {
    if left.release.protocol != DownloadProtocol::Torrent
        || right.release.protocol != DownloadProtocol::Torrent
    {
        return Ordering::Equal;
    }

    log10_bucket(left.release.seeders)
        .cmp(&log10_bucket(right.release.seeders))
        .then_with(|| log10_bucket(left.release.peers).cmp(&log10_bucket(right.release.peers)))
}

/// Newer usenet posts are more likely to be complete.
fn usenet_age_bucket(remote: &RemoteRelease) -> i64 {
    let hours = remote.release.age_hours();
    let days = remote.release.age_days();
    if hours < 1.0 {
        1000
    } else if hours <= 24.0 {
        100
    } else if days <= 7 {
        10
    } else {
        -((days as f64).log10().round() as i64)
    }
}

fn compare_age_if_usenet(left: &RemoteRelease, right: &RemoteRelease) -> Ordering {
    if left.release.protocol != DownloadProtocol::Usenet
        || right.release.protocol != DownloadProtocol::Usenet
    {
        return Ordering::Equal;
    }
    usenet_age_bucket(left).cmp(&usenet_age_bucket(right))
}

fn size_bucket(remote: &RemoteRelease) -> u64 {
    (remote.release.size + SIZE_BUCKET_BYTES / 2) / SIZE_BUCKET_BYTES
}

/// Approved decisions first, best first within each library item, with
/// items kept in the order they were first seen. Rejections follow
/// unchanged.
pub fn prioritize_decisions(
    decisions: Vec<DownloadDecision>,
    delay_profile: &DelayProfile,
    propers: ProperDownloadPolicy,
) -> Vec<DownloadDecision> {
    let comparer = DownloadDecisionComparer::new(delay_profile, propers);

    let mut groups: Vec<(MediaId, Vec<DownloadDecision>)> = Vec::new();
    let mut rejected = Vec::new();

    for decision in decisions {
        let media_id = match (&decision.remote, decision.is_approved()) {
            (Some(remote), true) => remote.media.id,
            _ => {
                rejected.push(decision);
                continue;
            }
        };

        match groups.iter_mut().find(|(id, _)| *id == media_id) {
            Some((_, group)) => group.push(decision),
            None => groups.push((media_id, vec![decision])),
        }
    }

    let mut ordered = Vec::new();
    for (_, mut group) in groups {
        group.sort_by(|left, right| match (&left.remote, &right.remote) {
            (Some(l), Some(r)) => comparer.compare(r, l),
            _ => Ordering::Equal,
        });
        ordered.extend(group);
    }
    ordered.extend(rejected);
    ordered
}

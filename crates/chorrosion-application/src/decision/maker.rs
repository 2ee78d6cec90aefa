// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use chorrosion_config::DecisionConfig;
use chorrosion_domain::{Media, MediaUnitId, QualityProfile, ReleaseInfo, Validate, ValidationError};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::specifications::{
    AvailabilitySpecification, CustomFormatAllowedByProfileSpecification, CutoffSpecification,
    DelaySpecification, DeletedFileSpecification, HistorySpecification, MonitoredSpecification,
    ProperSpecification, QualityAllowedByProfileSpecification, RepackSpecification,
    UpgradeDiskSpecification,
};
use super::{
    Decision, DecisionSpecification, Rejection, RejectionKind, RejectionReason, RemoteRelease,
    SearchCriteria,
};
use crate::custom_formats::FormatCalculationService;
use crate::ports::{
    DelayProfileProvider, DiskProvider, HistoryService, MediaFileService, PendingReleaseService,
};
use crate::release_parsing::parse_release_title;
use crate::upgrade::UpgradableSpecification;

/// A release reported for a known library item, not yet parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseCandidate {
    pub release: ReleaseInfo,
    pub media: Media,
    pub profile: QualityProfile,
    #[serde(default)]
    pub target_unit_ids: Vec<MediaUnitId>,
}

#[derive(Debug, Clone)]
pub struct DownloadDecision {
    pub title: String,
    /// `None` when the title could not be parsed.
    pub remote: Option<RemoteRelease>,
    pub rejections: Vec<Rejection>,
}

impl DownloadDecision {
    fn approved(remote: RemoteRelease) -> Self {
        Self {
            title: remote.release.title.clone(),
            remote: Some(remote),
            rejections: Vec::new(),
        }
    }

    fn rejected(title: String, remote: Option<RemoteRelease>, rejection: Rejection) -> Self {
        Self {
            title,
            remote,
            rejections: vec![rejection],
        }
    }

    pub fn is_approved(&self) -> bool {
        self.rejections.is_empty()
    }

    pub fn is_temporarily_rejected(&self) -> bool {
        !self.rejections.is_empty()
            && self
                .rejections
                .iter()
                .all(|rejection| rejection.kind == RejectionKind::Temporary)
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_approved() && !self.is_temporarily_rejected()
    }
}

/// Everything the standard specification set reads from.
#[derive(Clone)]
pub struct DecisionServices {
    pub config: DecisionConfig,
    pub formats: FormatCalculationService,
    pub media_files: Arc<dyn MediaFileService>,
    pub history: Arc<dyn HistoryService>,
    pub pending: Arc<dyn PendingReleaseService>,
    pub delay_profiles: Arc<dyn DelayProfileProvider>,
    pub disk: Arc<dyn DiskProvider>,
}

/// Runs every specification against each candidate. Specifications are
/// evaluated in priority order and the first rejection ends evaluation.
pub struct DecisionMaker {
    specifications: Vec<Box<dyn DecisionSpecification>>,
    formats: FormatCalculationService,
}

impl DecisionMaker {
    pub fn new(
        mut specifications: Vec<Box<dyn DecisionSpecification>>,
        formats: FormatCalculationService,
    ) -> Self {
        specifications.sort_by_key(|spec| spec.priority());
        Self {
            specifications,
            formats,
        }
    }

    pub fn with_standard_specifications(services: DecisionServices) -> Self {
        let config = &services.config;
        let upgradable = UpgradableSpecification::new(config.propers_and_repacks);

        let specifications: Vec<Box<dyn DecisionSpecification>> = vec![
            Box::new(QualityAllowedByProfileSpecification::new()),
            Box::new(CustomFormatAllowedByProfileSpecification::new()),
            Box::new(AvailabilitySpecification::new(config.availability_delay_days)),
            Box::new(MonitoredSpecification::new()),
            Box::new(CutoffSpecification::new(
                services.media_files.clone(),
                services.formats.clone(),
                upgradable,
            )),
            Box::new(UpgradeDiskSpecification::new(
                services.media_files.clone(),
                services.formats.clone(),
                upgradable,
            )),
            Box::new(ProperSpecification::new(services.media_files.clone(), config)),
            Box::new(RepackSpecification::new(
                services.media_files.clone(),
                config.propers_and_repacks,
            )),
            Box::new(DelaySpecification::new(
                services.delay_profiles.clone(),
                services.pending.clone(),
                services.media_files.clone(),
                services.formats.clone(),
                upgradable,
            )),
            Box::new(HistorySpecification::new(
                services.history.clone(),
                services.formats.clone(),
                upgradable,
                config,
            )),
            Box::new(DeletedFileSpecification::new(
                services.media_files.clone(),
                services.disk.clone(),
                config.auto_unmonitor_previously_downloaded,
            )),
        ];

        info!(target: "decision", count = specifications.len(), "decision specifications registered");
        Self::new(specifications, services.formats)
    }

    pub fn specification_names(&self) -> Vec<&'static str> {
        self.specifications.iter().map(|spec| spec.name()).collect()
    }

    pub fn evaluate(
        &self,
        candidate: ReleaseCandidate,
        search: Option<&SearchCriteria>,
    ) -> DownloadDecision {
        let title = candidate.release.title.clone();

        let Some(parsed) = parse_release_title(&title) else {
            debug!(target: "decision", release = %title, "unable to parse release");
            return DownloadDecision::rejected(title, None, permanent(RejectionReason::UnableToParse));
        };

        if let Err(errors) = candidate.profile.validate() {
            let errors = messages(&errors);
            warn!(target: "decision", release = %title, profile = %candidate.profile.name, ?errors, "candidate has an invalid quality profile");
            return DownloadDecision::rejected(
                title,
                None,
                permanent(RejectionReason::InvalidProfile { errors }),
            );
        }
        if let Err(errors) = candidate.media.validate() {
            let errors = messages(&errors);
            warn!(target: "decision", release = %title, ?errors, "candidate targets an invalid item");
            return DownloadDecision::rejected(
                title,
                None,
                permanent(RejectionReason::InvalidMedia { errors }),
            );
        }

        let custom_formats = match self.formats.for_release(&parsed, Some(&candidate.release)) {
            Ok(formats) => formats,
            Err(err) => {
                error!(target: "decision", release = %title, error = %err, "custom format calculation failed");
                return DownloadDecision::rejected(
                    title,
                    None,
                    permanent(RejectionReason::EvaluationError {
                        specification: "custom_formats".to_string(),
                    }),
                );
            }
        };

        let custom_format_score = candidate
            .profile
            .calculate_custom_format_score(custom_formats.iter().map(|format| &format.id));

        let remote = RemoteRelease {
            release: candidate.release,
            parsed,
            media: candidate.media,
            profile: candidate.profile,
            custom_formats,
            custom_format_score,
            target_unit_ids: candidate.target_unit_ids,
        };

        for spec in &self.specifications {
            match spec.is_satisfied_by(&remote, search) {
                Ok(Decision::Accept) => {}
                Ok(Decision::Reject(rejection)) => {
                    debug!(
                        target: "decision",
                        release = %title,
                        specification = spec.name(),
                        reason = rejection.reason.code(),
                        "release rejected: {}",
                        rejection
                    );
                    return DownloadDecision::rejected(title, Some(remote), rejection);
                }
                Err(err) => {
                    error!(
                        target: "decision",
                        release = %title,
                        specification = spec.name(),
                        error = %err,
                        "couldn't evaluate decision"
                    );
                    return DownloadDecision::rejected(
                        title,
                        Some(remote),
                        permanent(RejectionReason::EvaluationError {
                            specification: spec.name().to_string(),
                        }),
                    );
                }
            }
        }

        debug!(target: "decision", release = %title, score = remote.custom_format_score, "release accepted");
        DownloadDecision::approved(remote)
    }

    /// A failing candidate never stops the rest of the batch.
    pub fn evaluate_all(
        &self,
        candidates: Vec<ReleaseCandidate>,
        search: Option<&SearchCriteria>,
    ) -> Vec<DownloadDecision> {
        let total = candidates.len();
        let decisions: Vec<DownloadDecision> = candidates
            .into_iter()
            .map(|candidate| self.evaluate(candidate, search))
            .collect();

        let approved = decisions.iter().filter(|d| d.is_approved()).count();
        info!(target: "decision", total, approved, "processed releases");
        decisions
    }
}

fn messages(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

fn permanent(reason: RejectionReason) -> Rejection {
    Rejection {
        reason,
        kind: RejectionKind::Permanent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::specifications::test_support::{hd_profile, media, no_formats};
    use crate::decision::SpecificationPriority;
    use anyhow::{anyhow, Result};
    use chorrosion_domain::{DownloadProtocol, ProfileQualityItem, Quality};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: &'static str,
        priority: SpecificationPriority,
        outcome: fn() -> Result<Decision>,
        calls: Arc<AtomicUsize>,
    }

    impl DecisionSpecification for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> SpecificationPriority {
            self.priority
        }

        fn is_satisfied_by(
            &self,
            _remote: &RemoteRelease,
            _search: Option<&SearchCriteria>,
        ) -> Result<Decision> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn scripted(
        name: &'static str,
        priority: SpecificationPriority,
        outcome: fn() -> Result<Decision>,
    ) -> (Box<dyn DecisionSpecification>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let spec = Scripted {
            name,
            priority,
            outcome,
            calls: calls.clone(),
        };
        (Box::new(spec), calls)
    }

    fn candidate(title: &str) -> ReleaseCandidate {
        ReleaseCandidate {
            release: ReleaseInfo::new(title, DownloadProtocol::Torrent, 1024),
            media: media(),
            profile: hd_profile(),
            target_unit_ids: Vec::new(),
        }
    }

    fn accept() -> Result<Decision> {
        Ok(Decision::accept())
    }

    fn reject() -> Result<Decision> {
        Ok(Decision::reject(RejectionReason::CutoffMet))
    }

    fn fail() -> Result<Decision> {
        Err(anyhow!("database locked"))
    }

    #[test]
    fn specifications_run_in_priority_order() {
        let (disk, _) = scripted("disk", SpecificationPriority::Disk, accept);
        let (database, _) = scripted("database", SpecificationPriority::Database, accept);
        let (default, _) = scripted("default", SpecificationPriority::Default, accept);

        let maker = DecisionMaker::new(vec![disk, database, default], no_formats());
        assert_eq!(maker.specification_names(), vec!["default", "database", "disk"]);
    }

    #[test]
    fn all_accepting_specifications_approve() {
        let (a, _) = scripted("a", SpecificationPriority::Default, accept);
        let (b, _) = scripted("b", SpecificationPriority::Disk, accept);
        let maker = DecisionMaker::new(vec![a, b], no_formats());

        let decision = maker.evaluate(candidate("Movie.2020.1080p.WEB-DL-GRP"), None);
        assert!(decision.is_approved());
        assert!(decision.remote.is_some());
    }

    #[test]
    fn first_rejection_short_circuits() {
        let (first, _) = scripted("first", SpecificationPriority::Default, reject);
        let (later, later_calls) = scripted("later", SpecificationPriority::Disk, accept);
        let maker = DecisionMaker::new(vec![later, first], no_formats());

        let decision = maker.evaluate(candidate("Movie.2020.1080p.WEB-DL-GRP"), None);
        assert!(decision.is_rejected());
        assert_eq!(decision.rejections[0].reason, RejectionReason::CutoffMet);
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unparseable_title_is_rejected_before_specifications() {
        let (spec, calls) = scripted("any", SpecificationPriority::Default, accept);
        let maker = DecisionMaker::new(vec![spec], no_formats());

        let decision = maker.evaluate(candidate("just some words"), None);
        assert_eq!(decision.rejections[0].reason, RejectionReason::UnableToParse);
        assert!(decision.remote.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_profile_is_rejected_before_specifications() {
        let (spec, calls) = scripted("any", SpecificationPriority::Default, accept);
        let maker = DecisionMaker::new(vec![spec], no_formats());

        let mut candidate = candidate("Movie.2020.1080p.WEB-DL-GRP");
        candidate.profile = QualityProfile::new(
            "Broken",
            vec![
                ProfileQualityItem::single(Quality::Sdtv, true),
                ProfileQualityItem::single(Quality::Webdl1080p, true),
            ],
            Quality::Bluray2160p,
        );

        let decision = maker.evaluate(candidate, None);
        assert!(decision.is_rejected());
        assert!(!decision.is_temporarily_rejected());
        assert!(matches!(
            &decision.rejections[0].reason,
            RejectionReason::InvalidProfile { errors } if errors.iter().any(|e| e.contains("cutoff"))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_media_is_rejected_before_specifications() {
        let (spec, calls) = scripted("any", SpecificationPriority::Default, accept);
        let maker = DecisionMaker::new(vec![spec], no_formats());

        let mut candidate = candidate("Movie.2020.1080p.WEB-DL-GRP");
        candidate.media.path = String::new();

        let decision = maker.evaluate(candidate, None);
        assert_eq!(decision.rejections[0].reason.code(), "invalid_media");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn specification_error_rejects_only_that_candidate() {
        let (broken, _) = scripted("broken", SpecificationPriority::Database, fail);
        let maker = DecisionMaker::new(vec![broken], no_formats());

        let decisions = maker.evaluate_all(
            vec![
                candidate("Movie.2020.1080p.WEB-DL-GRP"),
                candidate("Movie.2020.720p.HDTV-GRP"),
            ],
            None,
        );

        assert_eq!(decisions.len(), 2);
        for decision in decisions {
            assert_eq!(
                decision.rejections[0].reason,
                RejectionReason::EvaluationError {
                    specification: "broken".to_string()
                }
            );
        }
    }

    #[test]
    fn temporary_rejections_are_reported_separately() {
        fn wait() -> Result<Decision> {
            Ok(Decision::reject_temporarily(RejectionReason::DelayWaiting {
                delay_minutes: 60,
                age_minutes: 0,
            }))
        }
        let (delay, _) = scripted("delay", SpecificationPriority::Database, wait);
        let maker = DecisionMaker::new(vec![delay], no_formats());

        let decision = maker.evaluate(candidate("Movie.2020.1080p.WEB-DL-GRP"), None);
        assert!(decision.is_temporarily_rejected());
        assert!(!decision.is_rejected());
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Result;
use tracing::debug;

use crate::decision::{
    is_user_invoked, Decision, DecisionSpecification, RejectionReason, RemoteRelease,
    SearchCriteria,
};

/// Holds releases back until the item counts as available. User searches
/// bypass it.
pub struct AvailabilitySpecification {
    delay_days: i64,
}

impl AvailabilitySpecification {
    pub fn new(delay_days: i64) -> Self {
        Self { delay_days }
    }
}

impl DecisionSpecification for AvailabilitySpecification {
    fn name(&self) -> &'static str {
        "availability"
    }

    fn is_satisfied_by(
        &self,
        remote: &RemoteRelease,
        search: Option<&SearchCriteria>,
    ) -> Result<Decision> {
        if is_user_invoked(search) {
            debug!(target: "decision", "user invoked search, skipping availability check");
            return Ok(Decision::accept());
        }

        if !remote.media.is_available(self.delay_days) {
            let available_from = remote.media.available_from(self.delay_days);
            debug!(
                target: "decision",
                media = %remote.media.title,
                ?available_from,
                "item not yet available"
            );
            return Ok(Decision::reject(RejectionReason::NotAvailable { available_from }));
        }

        Ok(Decision::accept())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::specifications::test_support::remote;
    use chorrosion_domain::{DownloadProtocol, MinimumAvailability};
    use chrono::{Duration, Utc};

    fn release() -> RemoteRelease {
        remote("Movie.2020.1080p.WEB-DL-GRP", DownloadProtocol::Usenet)
    }

    #[test]
    fn released_item_is_accepted() {
        let mut remote = release();
        remote.media.digital_release = Some(Utc::now() - Duration::days(3));
        let spec = AvailabilitySpecification::new(0);
        assert!(spec.is_satisfied_by(&remote, None).unwrap().is_accepted());
    }

    #[test]
    fn delay_pushes_availability_back() {
        let mut remote = release();
        remote.media.digital_release = Some(Utc::now() - Duration::days(3));
        let spec = AvailabilitySpecification::new(7);

        let decision = spec.is_satisfied_by(&remote, None).unwrap();
        assert!(matches!(
            decision.rejection().map(|r| &r.reason),
            Some(RejectionReason::NotAvailable { available_from: Some(_) })
        ));
    }

    #[test]
    fn unknown_dates_are_unavailable() {
        let remote = release();
        let decision = AvailabilitySpecification::new(0)
            .is_satisfied_by(&remote, None)
            .unwrap();
        assert_eq!(
            decision.rejection().map(|r| r.reason.clone()),
            Some(RejectionReason::NotAvailable { available_from: None })
        );
    }

    #[test]
    fn announced_items_are_always_available() {
        let mut remote = release();
        remote.media.minimum_availability = MinimumAvailability::Announced;
        assert!(AvailabilitySpecification::new(30)
            .is_satisfied_by(&remote, None)
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn user_search_skips_check() {
        let remote = release();
        let spec = AvailabilitySpecification::new(0);

        assert!(!spec
            .is_satisfied_by(&remote, Some(&SearchCriteria::automatic()))
            .unwrap()
            .is_accepted());
        assert!(spec
            .is_satisfied_by(&remote, Some(&SearchCriteria::user_invoked()))
            .unwrap()
            .is_accepted());
    }
}

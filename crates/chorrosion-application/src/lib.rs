// SPDX-License-Identifier: GPL-3.0-or-later
pub mod comparer;
pub mod custom_formats;
pub mod decision;
pub mod events;
pub mod ports;
pub mod release_parsing;
pub mod upgrade;

pub use comparer::{CustomFormatComparer, QualityModelComparer};
pub use custom_formats::{
    default_templates, CustomFormat, CustomFormatError, CustomFormatResult, CustomFormatService,
    FormatCalculationService, FormatFacts, FormatTag, TagParseError,
};
pub use decision::{
    prioritize_decisions, Decision, DecisionMaker, DecisionServices, DecisionSpecification,
    DownloadDecision, DownloadDecisionComparer, Rejection, RejectionKind, RejectionReason,
    ReleaseCandidate, RemoteRelease, SearchCriteria, SpecificationPriority,
};
pub use events::{EventPublisher, InMemoryEventBus, RecordedEvent};
pub use release_parsing::{parse_release_title, ParsedReleaseInfo};
pub use upgrade::{UpgradableSpecification, UpgradeableRejectReason};

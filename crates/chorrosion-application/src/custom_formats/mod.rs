// SPDX-License-Identifier: GPL-3.0-or-later

//! Custom formats: user-defined, named tag sets used to score releases.

pub mod calculation;
pub mod facts;
pub mod format;
pub mod service;
pub mod tag;
pub mod templates;

pub use calculation::{facts_for_release, matching_formats, FormatCalculationService};
pub use facts::{ExtraFacts, FormatFacts};
pub use format::{CustomFormat, FormatMatchResult, TagGroupMatch, TagMatch};
pub use service::{CustomFormatError, CustomFormatResult, CustomFormatService};
pub use tag::{FormatTag, TagModifier, TagParseError, TagType, TagValue, TextMatcher};
pub use templates::default_templates;

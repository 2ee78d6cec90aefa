// SPDX-License-Identifier: GPL-3.0-or-later

//! Format tags: atomic matching rules written as `TYPE[_MODIFIER]{1,3}_VALUE`.
//!
//! | type | value                                              |
//! |------|----------------------------------------------------|
//! | `R`  | resolution: 480, 576, 720, 1080, 2160              |
//! | `S`  | source: cam, telesync, telecine, workprint, dvd, tv, webdl, bluray |
//! | `M`  | modifier: regional, screener, rawhd, brdisk, remux |
//! | `E`  | edition text or pattern                            |
//! | `L`  | language name                                      |
//! | `C`  | release title text or pattern                      |
//! | `I`  | indexer flag name                                  |
//! | `G`  | size range in GiB, `min<>max`                      |
//!
//! Modifiers: `R` compiles the value as a case-insensitive pattern, `RE` makes
//! the tag absolutely required within its group, `N` negates the result.

use std::str::FromStr;

use bitflags::bitflags;
use chorrosion_domain::{IndexerFlags, Language, Modifier, Resolution, Source};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::facts::FormatFacts;
use crate::release_parsing::parse_languages;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TagParseError {
    #[error("format tag '{0}' is not in the correct format")]
    InvalidFormat(String),

    #[error("unknown resolution '{0}' in format tag")]
    UnknownResolution(String),

    #[error("unknown source '{0}' in format tag")]
    UnknownSource(String),

    #[error("unknown quality modifier '{0}' in format tag")]
    UnknownModifier(String),

    #[error("unknown language '{0}' in format tag")]
    UnknownLanguage(String),

    #[error("unknown indexer flag '{0}' in format tag")]
    UnknownIndexerFlag(String),

    #[error("invalid size range '{0}', expected '<min><><max>' in gigabytes with min < max")]
    InvalidSizeRange(String),

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Closed set of tag kinds; discriminants are bit-flag friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TagType {
    Resolution = 1,
    Source = 2,
    Modifier = 4,
    Edition = 8,
    Language = 16,
    Custom = 32,
    Indexer = 64,
    Size = 128,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagModifier: u8 {
        const REGEX = 1;
        const NOT = 2;
        const ABSOLUTELY_REQUIRED = 4;
    }
}

/// Free-text or pattern matcher used by edition and custom tags.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Lowercased with spaces and hyphens removed.
    Literal(String),
    Pattern(Regex),
}

impl TextMatcher {
    fn literal(value: &str) -> Self {
        TextMatcher::Literal(squash(value))
    }

    fn pattern(value: &str) -> Result<Self, TagParseError> {
        RegexBuilder::new(value)
            .case_insensitive(true)
            .build()
            .map(TextMatcher::Pattern)
            .map_err(|err| TagParseError::InvalidPattern {
                pattern: value.to_string(),
                message: err.to_string(),
            })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            TextMatcher::Literal(needle) => squash(haystack).contains(needle.as_str()),
            TextMatcher::Pattern(regex) => regex.is_match(haystack),
        }
    }
}

fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Parsed payload of a tag; the variant determines the tag's type.
#[derive(Debug, Clone)]
pub enum TagValue {
    Resolution(Resolution),
    Source(Source),
    Modifier(Modifier),
    Edition(TextMatcher),
    Language(Language),
    Custom(TextMatcher),
    Indexer(IndexerFlags),
    /// Exclusive byte bounds.
    Size { min: u64, max: u64 },
}

impl TagValue {
    pub fn tag_type(&self) -> TagType {
        match self {
            TagValue::Resolution(_) => TagType::Resolution,
            TagValue::Source(_) => TagType::Source,
            TagValue::Modifier(_) => TagType::Modifier,
            TagValue::Edition(_) => TagType::Edition,
            TagValue::Language(_) => TagType::Language,
            TagValue::Custom(_) => TagType::Custom,
            TagValue::Indexer(_) => TagType::Indexer,
            TagValue::Size { .. } => TagType::Size,
        }
    }
}

/// An immutable, parsed format tag.
#[derive(Debug, Clone)]
pub struct FormatTag {
    raw: String,
    modifier: TagModifier,
    value: TagValue,
}

impl FormatTag {
    pub fn parse(raw: &str) -> Result<Self, TagParseError> {
        lazy_static! {
            // `(_(R|RE|N)){1,3}` collected as one group: a repeated capture only
            // keeps its last iteration, so the modifiers are split afterwards.
            static ref TAG_REGEX: Regex = Regex::new(
                r"(?i)^(?P<type>R|S|M|E|L|C|I|G)(?P<modifiers>(?:_(?:R|RE|N)){1,3})?_(?P<value>.*)$"
            )
            .expect("valid format tag regex");
        }

        let captures = TAG_REGEX
            .captures(raw)
            .ok_or_else(|| TagParseError::InvalidFormat(raw.to_string()))?;

        let kind = captures
            .name("type")
            .map(|m| m.as_str().to_ascii_uppercase())
            .ok_or_else(|| TagParseError::InvalidFormat(raw.to_string()))?;
        let raw_value = captures.name("value").map(|m| m.as_str()).unwrap_or("");
        let modifier = captures
            .name("modifiers")
            .map(|m| parse_modifiers(m.as_str()))
            .unwrap_or_else(TagModifier::empty);

        let value = parse_value(&kind, raw_value, modifier)?;

        Ok(Self {
            raw: raw.to_string(),
            modifier,
            value,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tag_type(&self) -> TagType {
        self.value.tag_type()
    }

    pub fn modifier(&self) -> TagModifier {
        self.modifier
    }

    pub fn value(&self) -> &TagValue {
        &self.value
    }

    pub fn is_absolutely_required(&self) -> bool {
        self.modifier.contains(TagModifier::ABSOLUTELY_REQUIRED)
    }

    /// Evaluate the tag, honouring the `N` modifier.
    pub fn matches(&self, facts: &FormatFacts) -> bool {
        let matched = self.matches_without_modifiers(facts);
        if self.modifier.contains(TagModifier::NOT) {
            !matched
        } else {
            matched
        }
    }

    pub fn matches_without_modifiers(&self, facts: &FormatFacts) -> bool {
        match &self.value {
            TagValue::Resolution(resolution) => facts.quality.quality.resolution() == *resolution,
            TagValue::Source(source) => facts.quality.quality.source() == *source,
            TagValue::Modifier(modifier) => facts.quality.quality.modifier() == *modifier,
            TagValue::Edition(matcher) => matcher.is_match(facts.edition.as_deref().unwrap_or("")),
            TagValue::Language(language) => facts.languages.contains(language),
            TagValue::Custom(matcher) => {
                matcher.is_match(&facts.simple_release_title)
                    || facts
                        .extra
                        .filename
                        .as_deref()
                        .map(|filename| matcher.is_match(filename))
                        .unwrap_or(false)
            }
            TagValue::Indexer(flag) => facts.extra.indexer_flags.contains(*flag),
            TagValue::Size { min, max } => facts
                .extra
                .size
                .map(|size| size > *min && size < *max)
                .unwrap_or(false),
        }
    }
}

impl FromStr for FormatTag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatTag::parse(s)
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Tags compare by their source text, case-insensitively.
impl PartialEq for FormatTag {
    fn eq(&self, other: &Self) -> bool {
        self.raw.eq_ignore_ascii_case(&other.raw)
    }
}

fn parse_modifiers(segment: &str) -> TagModifier {
    segment
        .split('_')
        .filter(|part| !part.is_empty())
        .fold(TagModifier::empty(), |acc, part| {
            match part.to_ascii_uppercase().as_str() {
                "R" => acc | TagModifier::REGEX,
                "RE" => acc | TagModifier::ABSOLUTELY_REQUIRED,
                "N" => acc | TagModifier::NOT,
                _ => acc,
            }
        })
}

fn parse_value(kind: &str, raw_value: &str, modifier: TagModifier) -> Result<TagValue, TagParseError> {
    let value = raw_value.to_lowercase();

    match kind {
        "R" => parse_resolution(&value).map(TagValue::Resolution),
        "S" => parse_source(&value).map(TagValue::Source),
        "M" => parse_modifier(&value).map(TagValue::Modifier),
        "E" => parse_text(raw_value, modifier).map(TagValue::Edition),
        "L" => parse_language(&value).map(TagValue::Language),
        "I" => IndexerFlags::from_flag_name(&value)
            .map(TagValue::Indexer)
            .ok_or(TagParseError::UnknownIndexerFlag(value)),
        "G" => parse_size(&value),
        _ => parse_text(raw_value, modifier).map(TagValue::Custom),
    }
}

fn parse_text(raw_value: &str, modifier: TagModifier) -> Result<TextMatcher, TagParseError> {
    if modifier.contains(TagModifier::REGEX) {
        // patterns keep their case; `\D` and `\d` differ
        TextMatcher::pattern(raw_value)
    } else {
        Ok(TextMatcher::literal(raw_value))
    }
}

fn parse_resolution(value: &str) -> Result<Resolution, TagParseError> {
    match value.trim_end_matches('p') {
        "2160" => Ok(Resolution::R2160p),
        "1080" => Ok(Resolution::R1080p),
        "720" => Ok(Resolution::R720p),
        "576" => Ok(Resolution::R576p),
        "480" => Ok(Resolution::R480p),
        _ => Err(TagParseError::UnknownResolution(value.to_string())),
    }
}

fn parse_source(value: &str) -> Result<Source, TagParseError> {
    match value {
        "cam" => Ok(Source::Cam),
        "telesync" => Ok(Source::Telesync),
        "telecine" => Ok(Source::Telecine),
        "workprint" => Ok(Source::Workprint),
        "dvd" => Ok(Source::Dvd),
        "tv" => Ok(Source::Tv),
        "webdl" => Ok(Source::Webdl),
        "bluray" => Ok(Source::Bluray),
        _ => Err(TagParseError::UnknownSource(value.to_string())),
    }
}

fn parse_modifier(value: &str) -> Result<Modifier, TagParseError> {
    match value {
        "regional" => Ok(Modifier::Regional),
        "screener" => Ok(Modifier::Screener),
        "rawhd" => Ok(Modifier::Rawhd),
        "brdisk" => Ok(Modifier::Brdisk),
        "remux" => Ok(Modifier::Remux),
        _ => Err(TagParseError::UnknownModifier(value.to_string())),
    }
}

fn parse_language(value: &str) -> Result<Language, TagParseError> {
    Language::from_name(value)
        .or_else(|| parse_languages(value).into_iter().next())
        .filter(|language| *language != Language::Unknown)
        .ok_or_else(|| TagParseError::UnknownLanguage(value.to_string()))
}

fn parse_size(value: &str) -> Result<TagValue, TagParseError> {
    lazy_static! {
        static ref SIZE_REGEX: Regex =
            Regex::new(r"(?P<min>\d+(\.\d+)?)\s*<>\s*(?P<max>\d+(\.\d+)?)").expect("valid size regex");
    }

    let invalid = || TagParseError::InvalidSizeRange(value.to_string());
    let captures = SIZE_REGEX.captures(value).ok_or_else(invalid)?;
    let min = captures
        .name("min")
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .ok_or_else(invalid)?;
    let max = captures
        .name("max")
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .ok_or_else(invalid)?;

    if min >= max {
        return Err(invalid());
    }

    Ok(TagValue::Size {
        min: (min * BYTES_PER_GIB) as u64,
        max: (max * BYTES_PER_GIB) as u64,
    })
}

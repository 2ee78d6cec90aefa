// SPDX-License-Identifier: GPL-3.0-or-later
use std::collections::BTreeMap;

use chorrosion_domain::{CustomFormatId, Validate, ValidationError};

use super::facts::FormatFacts;
use super::tag::{FormatTag, TagParseError, TagType};

/// A named set of tags. A format without tags matches everything.
#[derive(Debug, Clone)]
pub struct CustomFormat {
    pub id: CustomFormatId,
    pub name: String,
    pub tags: Vec<FormatTag>,
}

impl CustomFormat {
    pub fn new(name: impl Into<String>, tags: Vec<FormatTag>) -> Self {
        Self {
            id: CustomFormatId::new(),
            name: name.into(),
            tags,
        }
    }

    /// Parse every raw tag; the first malformed tag aborts construction.
    pub fn from_raw<S: AsRef<str>>(
        id: CustomFormatId,
        name: impl Into<String>,
        raw_tags: &[S],
    ) -> Result<Self, TagParseError> {
        let tags = raw_tags
            .iter()
            .map(|raw| FormatTag::parse(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            name: name.into(),
            tags,
        })
    }

    pub fn raw_tags(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.raw().to_string()).collect()
    }

    pub fn evaluate(&self, facts: &FormatFacts) -> FormatMatchResult<'_> {
        let mut groups: BTreeMap<TagType, Vec<TagMatch<'_>>> = BTreeMap::new();
        for tag in &self.tags {
            groups.entry(tag.tag_type()).or_default().push(TagMatch {
                tag,
                matched: tag.matches(facts),
            });
        }

        FormatMatchResult {
            groups: groups
                .into_iter()
                .map(|(tag_type, matches)| TagGroupMatch { tag_type, matches })
                .collect(),
        }
    }

    pub fn matches(&self, facts: &FormatFacts) -> bool {
        self.evaluate(facts).is_satisfied()
    }
}

impl PartialEq for CustomFormat {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::fmt::Display for CustomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Validate for CustomFormat {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ValidationError {
                field: "name",
                message: "name cannot be empty".into(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone)]
pub struct TagMatch<'a> {
    pub tag: &'a FormatTag,
    pub matched: bool,
}

/// Results for all tags of one type.
#[derive(Debug, Clone)]
pub struct TagGroupMatch<'a> {
    pub tag_type: TagType,
    pub matches: Vec<TagMatch<'a>>,
}

impl TagGroupMatch<'_> {
    /// Any ordinary match satisfies the group, but every absolutely required
    /// tag must match.
    pub fn is_satisfied(&self) -> bool {
        let required_failed = self
            .matches
            .iter()
            .any(|m| m.tag.is_absolutely_required() && !m.matched);
        let none_matched = self.matches.iter().all(|m| !m.matched);

        !(required_failed || none_matched)
    }
}

#[derive(Debug, Clone)]
pub struct FormatMatchResult<'a> {
    pub groups: Vec<TagGroupMatch<'a>>,
}

impl FormatMatchResult<'_> {
    pub fn is_satisfied(&self) -> bool {
        self.groups.iter().all(|group| group.is_satisfied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom_formats::facts::ExtraFacts;
    use chorrosion_domain::{Language, Quality, QualityModel};

    fn facts(title: &str, quality: Quality) -> FormatFacts {
        FormatFacts {
            simple_release_title: title.to_string(),
            quality: QualityModel::new(quality),
            languages: vec![Language::English],
            edition: None,
            release_group: None,
            extra: ExtraFacts::default(),
        }
    }

    fn format(tags: &[&str]) -> CustomFormat {
        CustomFormat::from_raw(CustomFormatId::new(), "test", tags).unwrap()
    }

    #[test]
    fn empty_format_matches_everything() {
        let format = format(&[]);
        assert!(format.matches(&facts("anything", Quality::Unknown)));
        assert!(format.matches(&facts("", Quality::Remux2160p)));
    }

    #[test]
    fn tags_of_one_type_are_alternatives() {
        let format = format(&["C_R_x264", "C_R_x265"]);
        assert!(format.matches(&facts("Movie.2020.1080p.BluRay.x264-GRP", Quality::Bluray1080p)));
        assert!(format.matches(&facts("Movie.2020.1080p.BluRay.x265-GRP", Quality::Bluray1080p)));
        assert!(!format.matches(&facts("Movie.2020.1080p.BluRay.AV1-GRP", Quality::Bluray1080p)));
    }

    #[test]
    fn failed_required_tag_fails_its_group() {
        let format = format(&["R_RE_1080", "R_720"]);
        let result = format.evaluate(&facts("Movie", Quality::Hdtv720p));

        assert_eq!(result.groups.len(), 1);
        assert!(result.groups[0].matches.iter().any(|m| m.matched));
        assert!(!result.is_satisfied());
    }

    #[test]
    fn every_group_must_be_satisfied() {
        let format = format(&["S_bluray", "R_1080", "R_2160"]);
        assert!(format.matches(&facts("Movie", Quality::Bluray2160p)));
        assert!(!format.matches(&facts("Movie", Quality::Webdl2160p)));
        assert!(!format.matches(&facts("Movie", Quality::Bluray720p)));
    }

    #[test]
    fn negated_tag_in_group() {
        let format = format(&["C_N_R_hdcam"]);
        assert!(format.matches(&facts("Movie.2020.1080p.WEB", Quality::Webdl1080p)));
        assert!(!format.matches(&facts("Movie.2020.HDCAM", Quality::Cam)));
    }

    #[test]
    fn groups_are_ordered_by_type() {
        let format = format(&["C_foo", "R_1080", "S_bluray"]);
        let result = format.evaluate(&facts("foo", Quality::Bluray1080p));
        let types: Vec<TagType> = result.groups.iter().map(|g| g.tag_type).collect();
        assert_eq!(types, vec![TagType::Resolution, TagType::Source, TagType::Custom]);
    }

    #[test]
    fn from_raw_fails_on_first_bad_tag() {
        let err = CustomFormat::from_raw(CustomFormatId::new(), "bad", &["R_1080", "R_9999"])
            .unwrap_err();
        assert!(matches!(err, TagParseError::UnknownResolution(_)));
    }

    #[test]
    fn validate_requires_name() {
        let format = CustomFormat::new("  ", vec![]);
        assert!(format.validate().is_err());
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later

//! Storage shapes and the explicit mapping between them and the domain.

use anyhow::{Context, Result};
use chorrosion_application::custom_formats::CustomFormat;
use chorrosion_domain::CustomFormatId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A custom format as persisted: tags are kept as their raw strings and only
/// compiled when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFormatRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub format_tags: Vec<String>,
}

pub fn custom_format_to_record(format: &CustomFormat) -> CustomFormatRecord {
    CustomFormatRecord {
        id: format.id.0,
        name: format.name.clone(),
        format_tags: format.raw_tags(),
    }
}

pub fn record_to_custom_format(record: &CustomFormatRecord) -> Result<CustomFormat> {
    CustomFormat::from_raw(
        CustomFormatId::from_uuid(record.id),
        record.name.clone(),
        &record.format_tags,
    )
    .with_context(|| format!("stored custom format '{}' has an invalid tag", record.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_keeps_id_name_and_raw_tags() {
        let format = CustomFormat::from_raw(
            CustomFormatId::new(),
            "HEVC",
            &["C_R_(x|h)\\.?265", "R_RE_2160"],
        )
        .unwrap();

        let record = custom_format_to_record(&format);
        assert_eq!(record.id, format.id.0);
        assert_eq!(record.format_tags, vec!["C_R_(x|h)\\.?265", "R_RE_2160"]);

        let restored = record_to_custom_format(&record).unwrap();
        assert_eq!(restored, format);
        assert_eq!(restored.raw_tags(), format.raw_tags());
    }

    #[test]
    fn invalid_stored_tag_is_an_error() {
        let record = CustomFormatRecord {
            id: Uuid::new_v4(),
            name: "Broken".into(),
            format_tags: vec!["Z_nope".into()],
        };
        let err = record_to_custom_format(&record).unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use chorrosion_domain::CustomFormatId;

use super::format::CustomFormat;
use super::tag::TagParseError;

const TEMPLATES: &[(&str, &[&str])] = &[
    ("x264", &[r"C_R_(x|h)\.?264"]),
    ("x265", &[r"C_R_(((x|h)\.?265)|(HEVC))"]),
    ("Simple Hardcoded Subs", &["C_R_subs?"]),
    ("Multi Language", &["L_RE_English", "L_RE_French"]),
    (
        "Hardcoded Subs",
        &[r"C_R_\b(?P<hcsub>(\w+SUBS?)\b)|(?P<hc>(HC|SUBBED))\b"],
    ),
    ("Surround", &[r"C_R_\b((7|5).1)\b"]),
    ("Scene", &["I_G_Scene"]),
    ("Internal Releases", &["I_HDB_Internal", "I_AHD_Internal"]),
];

/// Starter formats offered when a library has none of its own. Each call
/// produces fresh ids.
pub fn default_templates() -> Result<Vec<CustomFormat>, TagParseError> {
    TEMPLATES
        .iter()
        .map(|(name, tags)| CustomFormat::from_raw(CustomFormatId::new(), *name, *tags))
        .collect()
}

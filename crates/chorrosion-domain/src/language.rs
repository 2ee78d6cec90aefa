// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Language {
    #[default]
    Unknown,
    English,
    French,
    Spanish,
    German,
    Italian,
    Danish,
    Dutch,
    Japanese,
    Icelandic,
    Chinese,
    Russian,
    Polish,
    Vietnamese,
    Swedish,
    Norwegian,
    Finnish,
    Turkish,
    Portuguese,
    Flemish,
    Greek,
    Korean,
    Hungarian,
    Hebrew,
    Lithuanian,
    Czech,
    Arabic,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 28] = [
        Language::Unknown,
        Language::English,
        Language::French,
        Language::Spanish,
        Language::German,
        Language::Italian,
        Language::Danish,
        Language::Dutch,
        Language::Japanese,
        Language::Icelandic,
        Language::Chinese,
        Language::Russian,
        Language::Polish,
        Language::Vietnamese,
        Language::Swedish,
        Language::Norwegian,
        Language::Finnish,
        Language::Turkish,
        Language::Portuguese,
        Language::Flemish,
        Language::Greek,
        Language::Korean,
        Language::Hungarian,
        Language::Hebrew,
        Language::Lithuanian,
        Language::Czech,
        Language::Arabic,
        Language::Hindi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::Unknown => "Unknown",
            Language::English => "English",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Danish => "Danish",
            Language::Dutch => "Dutch",
            Language::Japanese => "Japanese",
            Language::Icelandic => "Icelandic",
            Language::Chinese => "Chinese",
            Language::Russian => "Russian",
            Language::Polish => "Polish",
            Language::Vietnamese => "Vietnamese",
            Language::Swedish => "Swedish",
            Language::Norwegian => "Norwegian",
            Language::Finnish => "Finnish",
            Language::Turkish => "Turkish",
            Language::Portuguese => "Portuguese",
            Language::Flemish => "Flemish",
            Language::Greek => "Greek",
            Language::Korean => "Korean",
            Language::Hungarian => "Hungarian",
            Language::Hebrew => "Hebrew",
            Language::Lithuanian => "Lithuanian",
            Language::Czech => "Czech",
            Language::Arabic => "Arabic",
            Language::Hindi => "Hindi",
        }
    }

    /// Exact (case-insensitive) lookup by English name.
    pub fn from_name(name: &str) -> Option<Language> {
        let name = name.trim();
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_ignores_case() {
        assert_eq!(Language::from_name("FRENCH"), Some(Language::French));
        assert_eq!(Language::from_name(" german "), Some(Language::German));
        assert_eq!(Language::from_name("klingon"), None);
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use chorrosion_domain::{Language, Quality, QualityModel, Resolution, Revision};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReleaseInfo {
    pub original_title: String,
    pub title: String,
    pub year: Option<u32>,
    pub quality: QualityModel,
    pub edition: Option<String>,
    pub release_group: Option<String>,
    pub languages: Vec<Language>,
    /// Release title with site noise stripped; what custom text tags match against.
    pub simple_release_title: String,
}

/// Parse a release or file name. Returns `None` when no title and year can be
/// located, which callers treat as "unparseable".
pub fn parse_release_title(title: &str) -> Option<ParsedReleaseInfo> {
    lazy_static! {
        static ref TITLE_YEAR_REGEX: Regex = Regex::new(
            r"^(?P<title>.+?)[-_. (\[]+(?P<year>(?:19|20)\d{2})(?:[-_. )\]]|$)"
        )
        .expect("valid title/year regex");
    }

    let simple_release_title = simplify_release_title(title);
    let stripped = strip_file_extension(&simple_release_title);

    let Some(captures) = TITLE_YEAR_REGEX.captures(stripped) else {
        debug!(target: "parser", title, "unable to locate title and year");
        return None;
    };

    let movie_title = captures
        .name("title")
        .map(|m| clean_title(m.as_str()))
        .filter(|t| !t.is_empty())?;
    let year = captures
        .name("year")
        .and_then(|m| m.as_str().parse::<u32>().ok());

    Some(ParsedReleaseInfo {
        original_title: title.to_string(),
        title: movie_title,
        year,
        quality: parse_quality(stripped),
        edition: parse_edition(stripped),
        release_group: parse_release_group(stripped),
        languages: parse_languages(stripped),
        simple_release_title,
    })
}

/// Remove website prefixes/postfixes, torrent site suffixes and characters that
/// cannot appear in file names.
pub fn simplify_release_title(title: &str) -> String {
    lazy_static! {
        static ref WEBSITE_PREFIX_REGEX: Regex = Regex::new(
            r"(?i)^\[\s*[-a-z]+(?:\.[a-z]+)+\s*\][-_. ]*|^www\.[a-z]+\.(?:com|net|org)[-_. ]*"
        )
        .expect("valid website prefix regex");
        static ref WEBSITE_POSTFIX_REGEX: Regex =
            Regex::new(r"(?i)\[\s*[-a-z]+(?:\.[a-z0-9]+)+\s*\]$").expect("valid website postfix regex");
        static ref TORRENT_SUFFIX_REGEX: Regex = Regex::new(
            r"(?i)\[(?:ettv|rartv|rarbg|cttv|publichd|eztv|tgx)\]$"
        )
        .expect("valid torrent suffix regex");
        static ref INVALID_CHARS_REGEX: Regex =
            Regex::new(r"\s*[<>?*|]").expect("valid invalid chars regex");
    }

    let composed: String = title.trim().nfc().collect();
    let without_prefix = WEBSITE_PREFIX_REGEX.replace(&composed, "");
    let without_postfix = WEBSITE_POSTFIX_REGEX.replace(&without_prefix, "");
    let without_suffix = TORRENT_SUFFIX_REGEX.replace(&without_postfix, "");
    INVALID_CHARS_REGEX
        .replace_all(&without_suffix, "")
        .trim()
        .to_string()
}

pub fn parse_quality(title: &str) -> QualityModel {
    QualityModel::with_revision(detect_quality(title), detect_revision(title))
}

fn detect_quality(title: &str) -> Quality {
    lazy_static! {
        static ref BRDISK_REGEX: Regex = Regex::new(
            r"(?i)\b(?:complete[-_. ]bluray|bd[-_. ]?iso|bd25|bd50|br[-_. ]?disk)\b"
        )
        .expect("valid brdisk regex");
        static ref RAWHD_REGEX: Regex =
            Regex::new(r"(?i)\b(?:raw[-_. ]?hd|mpeg[-_. ]?2)\b").expect("valid rawhd regex");
        static ref REMUX_REGEX: Regex =
            Regex::new(r"(?i)\b(?:bd)?remux\b").expect("valid remux regex");
        static ref BLURAY_REGEX: Regex = Regex::new(
            r"(?i)\b(?:blu[-_. ]?ray|bdrip|brrip|bd|uhd[-_. ]?bd)\b"
        )
        .expect("valid bluray regex");
        static ref WEBDL_REGEX: Regex = Regex::new(
            r"(?i)\b(?:web[-_. ]?dl|webrip|web|amzn|nf|itunes)\b"
        )
        .expect("valid webdl regex");
        static ref HDTV_REGEX: Regex =
            Regex::new(r"(?i)\b(?:hdtv|pdtv|sdtv|tvrip|dsr)\b").expect("valid hdtv regex");
        static ref DVDR_REGEX: Regex =
            Regex::new(r"(?i)\b(?:dvd[-_. ]?r|dvd9|dvd5)\b").expect("valid dvdr regex");
        static ref DVD_REGEX: Regex =
            Regex::new(r"(?i)\b(?:dvd|dvdrip|ntsc|pal)\b").expect("valid dvd regex");
        static ref SCREENER_REGEX: Regex = Regex::new(
            r"(?i)\b(?:dvd[-_. ]?scr|screener|scr)\b"
        )
        .expect("valid screener regex");
        static ref REGIONAL_REGEX: Regex =
            Regex::new(r"\bR[1-9]\b").expect("valid regional regex");
        static ref WORKPRINT_REGEX: Regex =
            Regex::new(r"(?i)\bworkprint\b").expect("valid workprint regex");
        static ref CAM_REGEX: Regex =
            Regex::new(r"(?i)\b(?:cam|camrip|hdcam)\b").expect("valid cam regex");
        static ref TELESYNC_REGEX: Regex =
            Regex::new(r"(?i)\b(?:ts|telesync|hdts|pdvd)\b").expect("valid telesync regex");
        static ref TELECINE_REGEX: Regex =
            Regex::new(r"(?i)\b(?:tc|telecine|hdtc)\b").expect("valid telecine regex");
    }

    let resolution = parse_resolution(title);

    if BRDISK_REGEX.is_match(title) {
        return Quality::BrDisk;
    }
    if RAWHD_REGEX.is_match(title) {
        return Quality::RawHd;
    }
    if REMUX_REGEX.is_match(title) {
        return if resolution == Resolution::R2160p {
            Quality::Remux2160p
        } else {
            Quality::Remux1080p
        };
    }
    if BLURAY_REGEX.is_match(title) {
        return match resolution {
            Resolution::R2160p => Quality::Bluray2160p,
            Resolution::R1080p => Quality::Bluray1080p,
            Resolution::R576p => Quality::Bluray576p,
            Resolution::R480p => Quality::Bluray480p,
            Resolution::R720p | Resolution::Unknown => Quality::Bluray720p,
        };
    }
    if WEBDL_REGEX.is_match(title) {
        return match resolution {
            Resolution::R2160p => Quality::Webdl2160p,
            Resolution::R1080p => Quality::Webdl1080p,
            Resolution::R720p => Quality::Webdl720p,
            _ => Quality::Webdl480p,
        };
    }
    if HDTV_REGEX.is_match(title) {
        return match resolution {
            Resolution::R2160p => Quality::Hdtv2160p,
            Resolution::R1080p => Quality::Hdtv1080p,
            Resolution::R720p => Quality::Hdtv720p,
            _ => Quality::Sdtv,
        };
    }
    if SCREENER_REGEX.is_match(title) {
        return Quality::Dvdscr;
    }
    if DVDR_REGEX.is_match(title) {
        return Quality::DvdR;
    }
    if REGIONAL_REGEX.is_match(title) {
        return Quality::Regional;
    }
    if DVD_REGEX.is_match(title) {
        return Quality::Dvd;
    }
    if WORKPRINT_REGEX.is_match(title) {
        return Quality::Workprint;
    }
    if CAM_REGEX.is_match(title) {
        return Quality::Cam;
    }
    if TELESYNC_REGEX.is_match(title) {
        return Quality::Telesync;
    }
    if TELECINE_REGEX.is_match(title) {
        return Quality::Telecine;
    }

    match resolution {
        Resolution::R2160p => Quality::Hdtv2160p,
        Resolution::R1080p => Quality::Hdtv1080p,
        Resolution::R720p => Quality::Hdtv720p,
        Resolution::R480p | Resolution::R576p => Quality::Sdtv,
        Resolution::Unknown => Quality::Unknown,
    }
}

pub fn parse_resolution(title: &str) -> Resolution {
    lazy_static! {
        static ref RESOLUTION_REGEX: Regex = Regex::new(
            r"(?i)\b(?:(?P<r2160>2160p|3840x2160|4k[-_. ](?:uhd|hevc|bd)|(?:uhd|hevc|bd)[-_. ]4k|uhd)|(?P<r1080>1080[pi]|1920x1080)|(?P<r720>720p|1280x720)|(?P<r576>576p)|(?P<r480>480p|640x480|848x480))\b"
        )
        .expect("valid resolution regex");
    }

    let Some(captures) = RESOLUTION_REGEX.captures(title) else {
        return Resolution::Unknown;
    };

    if captures.name("r2160").is_some() {
        Resolution::R2160p
    } else if captures.name("r1080").is_some() {
        Resolution::R1080p
    } else if captures.name("r720").is_some() {
        Resolution::R720p
    } else if captures.name("r576").is_some() {
        Resolution::R576p
    } else {
        Resolution::R480p
    }
}

fn detect_revision(title: &str) -> Revision {
    lazy_static! {
        static ref PROPER_REGEX: Regex =
            Regex::new(r"(?i)\bproper\b").expect("valid proper regex");
        static ref REPACK_REGEX: Regex =
            Regex::new(r"(?i)\b(?:repack|rerip)\b").expect("valid repack regex");
        static ref VERSION_REGEX: Regex =
            Regex::new(r"(?i)\bv(?P<version>[2-4])\b").expect("valid version regex");
        // REAL is only meaningful in upper case
        static ref REAL_REGEX: Regex = Regex::new(r"\bREAL\b").expect("valid real regex");
    }

    let mut revision = Revision::default();

    if PROPER_REGEX.is_match(title) {
        revision.version = 2;
    }
    if REPACK_REGEX.is_match(title) {
        revision.version = 2;
        revision.is_repack = true;
    }
    if let Some(version) = VERSION_REGEX
        .captures(title)
        .and_then(|c| c.name("version"))
        .and_then(|m| m.as_str().parse::<u32>().ok())
    {
        revision.version = version;
    }
    revision.real = REAL_REGEX.find_iter(title).count() as u32;

    revision
}

/// Every language named in the title, in order of appearance. Falls back to
/// `[Unknown]` so callers always see at least one entry.
pub fn parse_languages(title: &str) -> Vec<Language> {
    lazy_static! {
        static ref LANGUAGE_REGEX: Regex = Regex::new(
            r"(?i)\b(?:(?P<english>english|eng)|(?P<french>french|truefrench|vostfr|vff)|(?P<spanish>spanish|esp|castellano)|(?P<german>german|ger|deutsch)|(?P<italian>italian|ita)|(?P<danish>danish|dan)|(?P<dutch>dutch|nl)|(?P<japanese>japanese|jap)|(?P<icelandic>icelandic)|(?P<chinese>chinese|mandarin|cantonese)|(?P<russian>russian|rus)|(?P<polish>polish|pldub|pl)|(?P<vietnamese>vietnamese)|(?P<swedish>swedish|swe)|(?P<norwegian>norwegian|nor)|(?P<finnish>finnish|fin)|(?P<turkish>turkish)|(?P<portuguese>portuguese)|(?P<flemish>flemish)|(?P<greek>greek)|(?P<korean>korean|kor)|(?P<hungarian>hungarian|hun)|(?P<hebrew>hebrew|heb)|(?P<lithuanian>lithuanian|lt)|(?P<czech>czech|cz)|(?P<arabic>arabic)|(?P<hindi>hindi))\b"
        )
        .expect("valid language regex");
    }

    const GROUPS: [(&str, Language); 27] = [
        ("english", Language::English),
        ("french", Language::French),
        ("spanish", Language::Spanish),
        ("german", Language::German),
        ("italian", Language::Italian),
        ("danish", Language::Danish),
        ("dutch", Language::Dutch),
        ("japanese", Language::Japanese),
        ("icelandic", Language::Icelandic),
        ("chinese", Language::Chinese),
        ("russian", Language::Russian),
        ("polish", Language::Polish),
        ("vietnamese", Language::Vietnamese),
        ("swedish", Language::Swedish),
        ("norwegian", Language::Norwegian),
        ("finnish", Language::Finnish),
        ("turkish", Language::Turkish),
        ("portuguese", Language::Portuguese),
        ("flemish", Language::Flemish),
        ("greek", Language::Greek),
        ("korean", Language::Korean),
        ("hungarian", Language::Hungarian),
        ("hebrew", Language::Hebrew),
        ("lithuanian", Language::Lithuanian),
        ("czech", Language::Czech),
        ("arabic", Language::Arabic),
        ("hindi", Language::Hindi),
    ];

    let mut languages = Vec::new();
    for captures in LANGUAGE_REGEX.captures_iter(title) {
        if let Some((_, language)) = GROUPS
            .iter()
            .find(|(group, _)| captures.name(group).is_some())
        {
            if !languages.contains(language) {
                languages.push(*language);
            }
        }
    }

    if languages.is_empty() {
        languages.push(Language::Unknown);
    }
    languages
}

pub fn parse_edition(title: &str) -> Option<String> {
    lazy_static! {
        static ref EDITION_REGEX: Regex = Regex::new(
            r"(?i)\b(?P<edition>(?:extended|ultimate|director'?s|collector'?s|theatrical|special|final|anniversary|criterion)[-_. ](?:cut|edition|version)|extended|uncut|unrated|imax|remastered|criterion)\b"
        )
        .expect("valid edition regex");
    }

    EDITION_REGEX
        .captures(title)
        .and_then(|captures| captures.name("edition"))
        .map(|m| m.as_str().replace(['.', '_'], " "))
}

pub fn parse_release_group(title: &str) -> Option<String> {
    lazy_static! {
        static ref GROUP_REGEX: Regex = Regex::new(
            r"-(?P<group>[A-Za-z0-9][A-Za-z0-9_.]{1,31})(?:\[[^\]]+\])?$"
        )
        .expect("valid group regex");
    }

    let group = GROUP_REGEX
        .captures(title.trim())
        .and_then(|captures| captures.name("group").map(|m| m.as_str().to_string()))?;

    // resolutions and codecs that trail a dash are not release groups
    let lowercase = group.to_lowercase();
    if matches!(lowercase.as_str(), "dl" | "x264" | "x265" | "h264" | "1080p" | "720p") {
        return None;
    }
    Some(group)
}

fn strip_file_extension(title: &str) -> &str {
    lazy_static! {
        static ref EXTENSION_REGEX: Regex = Regex::new(
            r"(?i)\.(?:mkv|mp4|avi|m4v|wmv|mov|ts|m2ts|iso|nzb|torrent)$"
        )
        .expect("valid extension regex");
    }

    match EXTENSION_REGEX.find(title) {
        Some(m) => &title[..m.start()],
        None => title,
    }
}

fn clean_title(value: &str) -> String {
    value
        .replace(['.', '_'], " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == '(' || c == '[')
        .trim()
        .to_string()
}

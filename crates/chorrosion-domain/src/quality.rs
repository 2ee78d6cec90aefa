// SPDX-License-Identifier: GPL-3.0-or-later
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "480p")]
    R480p,
    #[serde(rename = "576p")]
    R576p,
    #[serde(rename = "720p")]
    R720p,
    #[serde(rename = "1080p")]
    R1080p,
    #[serde(rename = "2160p")]
    R2160p,
}

impl Resolution {
    pub fn lines(&self) -> u32 {
        match self {
            Resolution::Unknown => 0,
            Resolution::R480p => 480,
            Resolution::R576p => 576,
            Resolution::R720p => 720,
            Resolution::R1080p => 1080,
            Resolution::R2160p => 2160,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Unknown,
    Cam,
    Telesync,
    Telecine,
    Workprint,
    Dvd,
    Tv,
    Webdl,
    Bluray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    None,
    Regional,
    Screener,
    Rawhd,
    Brdisk,
    Remux,
}

/// The fixed quality catalogue. Declaration order is the default weight order
/// used when building a profile from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "WORKPRINT")]
    Workprint,
    #[serde(rename = "CAM")]
    Cam,
    #[serde(rename = "TELESYNC")]
    Telesync,
    #[serde(rename = "TELECINE")]
    Telecine,
    #[serde(rename = "REGIONAL")]
    Regional,
    #[serde(rename = "DVDSCR")]
    Dvdscr,
    #[serde(rename = "SDTV")]
    Sdtv,
    #[serde(rename = "DVD")]
    Dvd,
    #[serde(rename = "DVD-R")]
    DvdR,
    #[serde(rename = "WEBDL-480p")]
    Webdl480p,
    #[serde(rename = "Bluray-480p")]
    Bluray480p,
    #[serde(rename = "Bluray-576p")]
    Bluray576p,
    #[serde(rename = "HDTV-720p")]
    Hdtv720p,
    #[serde(rename = "WEBDL-720p")]
    Webdl720p,
    #[serde(rename = "Bluray-720p")]
    Bluray720p,
    #[serde(rename = "HDTV-1080p")]
    Hdtv1080p,
    #[serde(rename = "WEBDL-1080p")]
    Webdl1080p,
    #[serde(rename = "Bluray-1080p")]
    Bluray1080p,
    #[serde(rename = "Remux-1080p")]
    Remux1080p,
    #[serde(rename = "HDTV-2160p")]
    Hdtv2160p,
    #[serde(rename = "WEBDL-2160p")]
    Webdl2160p,
    #[serde(rename = "Bluray-2160p")]
    Bluray2160p,
    #[serde(rename = "Remux-2160p")]
    Remux2160p,
    #[serde(rename = "BR-DISK")]
    BrDisk,
    #[serde(rename = "Raw-HD")]
    RawHd,
}

impl Quality {
    pub const ALL: [Quality; 26] = [
        Quality::Unknown,
        Quality::Workprint,
        Quality::Cam,
        Quality::Telesync,
        Quality::Telecine,
        Quality::Regional,
        Quality::Dvdscr,
        Quality::Sdtv,
        Quality::Dvd,
        Quality::DvdR,
        Quality::Webdl480p,
        Quality::Bluray480p,
        Quality::Bluray576p,
        Quality::Hdtv720p,
        Quality::Webdl720p,
        Quality::Bluray720p,
        Quality::Hdtv1080p,
        Quality::Webdl1080p,
        Quality::Bluray1080p,
        Quality::Remux1080p,
        Quality::Hdtv2160p,
        Quality::Webdl2160p,
        Quality::Bluray2160p,
        Quality::Remux2160p,
        Quality::BrDisk,
        Quality::RawHd,
    ];

    /// Stable numeric id, as persisted by the library database.
    pub fn id(&self) -> u32 {
        match self {
            Quality::Unknown => 0,
            Quality::Sdtv => 1,
            Quality::Dvd => 2,
            Quality::Webdl1080p => 3,
            Quality::Hdtv720p => 4,
            Quality::Webdl720p => 5,
            Quality::Bluray720p => 6,
            Quality::Bluray1080p => 7,
            Quality::Webdl480p => 8,
            Quality::Hdtv1080p => 9,
            Quality::RawHd => 10,
            Quality::Hdtv2160p => 16,
            Quality::Webdl2160p => 18,
            Quality::Bluray2160p => 19,
            Quality::Bluray480p => 20,
            Quality::Bluray576p => 21,
            Quality::BrDisk => 22,
            Quality::DvdR => 23,
            Quality::Workprint => 24,
            Quality::Cam => 25,
            Quality::Telesync => 26,
            Quality::Telecine => 27,
            Quality::Dvdscr => 28,
            Quality::Regional => 29,
            Quality::Remux1080p => 30,
            Quality::Remux2160p => 31,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Quality::Unknown => "Unknown",
            Quality::Workprint => "WORKPRINT",
            Quality::Cam => "CAM",
            Quality::Telesync => "TELESYNC",
            Quality::Telecine => "TELECINE",
            Quality::Regional => "REGIONAL",
            Quality::Dvdscr => "DVDSCR",
            Quality::Sdtv => "SDTV",
            Quality::Dvd => "DVD",
            Quality::DvdR => "DVD-R",
            Quality::Webdl480p => "WEBDL-480p",
            Quality::Bluray480p => "Bluray-480p",
            Quality::Bluray576p => "Bluray-576p",
            Quality::Hdtv720p => "HDTV-720p",
            Quality::Webdl720p => "WEBDL-720p",
            Quality::Bluray720p => "Bluray-720p",
            Quality::Hdtv1080p => "HDTV-1080p",
            Quality::Webdl1080p => "WEBDL-1080p",
            Quality::Bluray1080p => "Bluray-1080p",
            Quality::Remux1080p => "Remux-1080p",
            Quality::Hdtv2160p => "HDTV-2160p",
            Quality::Webdl2160p => "WEBDL-2160p",
            Quality::Bluray2160p => "Bluray-2160p",
            Quality::Remux2160p => "Remux-2160p",
            Quality::BrDisk => "BR-DISK",
            Quality::RawHd => "Raw-HD",
        }
    }

    pub fn source(&self) -> Source {
        match self {
            Quality::Unknown => Source::Unknown,
            Quality::Workprint => Source::Workprint,
            Quality::Cam => Source::Cam,
            Quality::Telesync => Source::Telesync,
            Quality::Telecine => Source::Telecine,
            Quality::Regional | Quality::Dvdscr | Quality::Dvd | Quality::DvdR => Source::Dvd,
            Quality::Sdtv | Quality::Hdtv720p | Quality::Hdtv1080p | Quality::Hdtv2160p => {
                Source::Tv
            }
            Quality::RawHd => Source::Tv,
            Quality::Webdl480p | Quality::Webdl720p | Quality::Webdl1080p | Quality::Webdl2160p => {
                Source::Webdl
            }
            Quality::Bluray480p
            | Quality::Bluray576p
            | Quality::Bluray720p
            | Quality::Bluray1080p
            | Quality::Remux1080p
            | Quality::Bluray2160p
            | Quality::Remux2160p
            | Quality::BrDisk => Source::Bluray,
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            Quality::Unknown
            | Quality::Workprint
            | Quality::Cam
            | Quality::Telesync
            | Quality::Telecine
            | Quality::Dvd => Resolution::Unknown,
            Quality::Regional
            | Quality::Dvdscr
            | Quality::Sdtv
            | Quality::DvdR
            | Quality::Webdl480p
            | Quality::Bluray480p => Resolution::R480p,
            Quality::Bluray576p => Resolution::R576p,
            Quality::Hdtv720p | Quality::Webdl720p | Quality::Bluray720p => Resolution::R720p,
            Quality::Hdtv1080p
            | Quality::Webdl1080p
            | Quality::Bluray1080p
            | Quality::Remux1080p
            | Quality::BrDisk
            | Quality::RawHd => Resolution::R1080p,
            Quality::Hdtv2160p
            | Quality::Webdl2160p
            | Quality::Bluray2160p
            | Quality::Remux2160p => Resolution::R2160p,
        }
    }

    pub fn modifier(&self) -> Modifier {
        match self {
            Quality::Regional => Modifier::Regional,
            Quality::Dvdscr => Modifier::Screener,
            Quality::DvdR | Quality::Remux1080p | Quality::Remux2160p => Modifier::Remux,
            Quality::BrDisk => Modifier::Brdisk,
            Quality::RawHd => Modifier::Rawhd,
            _ => Modifier::None,
        }
    }

    pub fn from_id(id: u32) -> Option<Quality> {
        Quality::ALL.iter().copied().find(|q| q.id() == id)
    }

    pub fn from_name(name: &str) -> Option<Quality> {
        Quality::ALL
            .iter()
            .copied()
            .find(|q| q.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Proper/repack version of a release. Ordered by `real` first, then `version`;
/// `is_repack` does not take part in ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Revision {
    pub version: u32,
    pub real: u32,
    #[serde(default)]
    pub is_repack: bool,
}

impl Revision {
    pub fn new(version: u32, real: u32, is_repack: bool) -> Self {
        Self {
            version,
            real,
            is_repack,
        }
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self {
            version: 1,
            real: 0,
            is_repack: false,
        }
    }
}

impl PartialEq for Revision {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Revision {}

impl PartialOrd for Revision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Revision {
    fn cmp(&self, other: &Self) -> Ordering {
        self.real
            .cmp(&other.real)
            .then_with(|| self.version.cmp(&other.version))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityModel {
    pub quality: Quality,
    #[serde(default)]
    pub revision: Revision,
}

impl QualityModel {
    pub fn new(quality: Quality) -> Self {
        Self {
            quality,
            revision: Revision::default(),
        }
    }

    pub fn with_revision(quality: Quality, revision: Revision) -> Self {
        Self { quality, revision }
    }
}

impl Default for QualityModel {
    fn default() -> Self {
        Self::new(Quality::Unknown)
    }
}

impl std::fmt::Display for QualityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.quality, self.revision.version)?;
        if self.revision.real > 0 {
            write!(f, " REAL")?;
        }
        Ok(())
    }
}

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SpireError;

/// AMR annotation tool. Each tool is a distinct remote annotation set and is
/// fetched and cached under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AmrMode {
    Deeparg,
    Megares,
    Vfdb,
}

impl AmrMode {
    pub fn endpoint(&self, api_url: &str, sample_id: &str) -> String {
        match self {
            AmrMode::Deeparg => format!("{api_url}/download_deeparg/{sample_id}"),
            AmrMode::Megares => format!("{api_url}/download_abricate_megares/{sample_id}"),
            AmrMode::Vfdb => format!("{api_url}/download_abricate_vfdb/{sample_id}"),
        }
    }
}

impl fmt::Display for AmrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmrMode::Deeparg => write!(f, "deeparg"),
            AmrMode::Megares => write!(f, "megares"),
            AmrMode::Vfdb => write!(f, "vfdb"),
        }
    }
}

impl FromStr for AmrMode {
    type Err = SpireError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "deeparg" => Ok(AmrMode::Deeparg),
            "megares" => Ok(AmrMode::Megares),
            "vfdb" => Ok(AmrMode::Vfdb),
            _ => Err(SpireError::InvalidAmrMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewTarget {
    Metadata,
    Amr,
    Manifest,
    Eggnog,
    Mags,
}

impl fmt::Display for ViewTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewTarget::Metadata => write!(f, "metadata"),
            ViewTarget::Amr => write!(f, "amr"),
            ViewTarget::Manifest => write!(f, "manifest"),
            ViewTarget::Eggnog => write!(f, "eggnog"),
            ViewTarget::Mags => write!(f, "mags"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DownloadTarget {
    Mags,
    Proteins,
    Genecalls,
    Metadata,
}

impl fmt::Display for DownloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadTarget::Mags => write!(f, "mags"),
            DownloadTarget::Proteins => write!(f, "proteins"),
            DownloadTarget::Genecalls => write!(f, "genecalls"),
            DownloadTarget::Metadata => write!(f, "metadata"),
        }
    }
}

/// Per-study bulk archives served as fixed-name tar files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Mags,
    Assemblies,
    Genecalls,
    Proteins,
}

impl ArchiveKind {
    /// Slug used in the compiled archive file name.
    pub fn slug(&self) -> &'static str {
        match self {
            ArchiveKind::Mags => "MAGs",
            ArchiveKind::Assemblies => "assemblies",
            ArchiveKind::Genecalls => "genecalls",
            ArchiveKind::Proteins => "proteins",
        }
    }

    /// Subdirectory of the output folder the archive is extracted into.
    pub fn subdir(&self) -> &'static str {
        match self {
            ArchiveKind::Mags => "mags",
            ArchiveKind::Assemblies => "assemblies",
            ArchiveKind::Genecalls => "genecalls",
            ArchiveKind::Proteins => "proteins",
        }
    }

    pub fn archive_url(&self, bulk_url: &str, study_name: &str) -> String {
        format!(
            "{bulk_url}/compiled/{study_name}_spire_v1_{}.tar",
            self.slug()
        )
    }
}

/// A CLI input, classified as a sample or a study. SPIRE sample identifiers
/// are BioSamples accessions; anything else is treated as a study name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemId {
    Study(String),
    Sample(String),
}

fn sample_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^SAM(?:N|EA|D)\d+$").unwrap())
}

impl ItemId {
    pub fn classify(input: &str) -> Self {
        let trimmed = input.trim();
        if sample_id_pattern().is_match(trimmed) {
            ItemId::Sample(trimmed.to_string())
        } else {
            ItemId::Study(trimmed.to_string())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ItemId::Study(_) => "study",
            ItemId::Sample(_) => "sample",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemId::Study(name) => name,
            ItemId::Sample(id) => id,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::metadata::MetadataRecord;

/// Why a file was not placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// No title after every tier. Goes to the pending set.
    Unidentifiable,
    /// Destination already claimed or already on disk.
    Duplicate,
    /// Dismissed by an operator.
    Denied,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Unidentifiable => "Unidentifiable",
            RejectReason::Duplicate => "Duplicate",
            RejectReason::Denied => "Denied",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unidentifiable" => Ok(RejectReason::Unidentifiable),
            "duplicate" => Ok(RejectReason::Duplicate),
            "denied" => Ok(RejectReason::Denied),
            other => Err(format!("unknown reject reason: {}", other)),
        }
    }
}

/// One row of the rejected log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    #[serde(rename = "Origin Location")]
    pub origin: PathBuf,
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Note")]
    pub reason: RejectReason,
}

impl RejectedEntry {
    pub fn new(
        origin: impl Into<PathBuf>,
        file_name: impl Into<String>,
        reason: RejectReason,
    ) -> Self {
        Self {
            origin: origin.into(),
            file_name: file_name.into(),
            reason,
        }
    }
}

/// One row of the accepted log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedEntry {
    #[serde(rename = "Origin Location")]
    pub origin: PathBuf,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author")]
    pub author: Option<String>,
    #[serde(rename = "Series")]
    pub series: Option<String>,
    /// Position in the series.
    #[serde(rename = "Number")]
    pub number: Option<String>,
    /// Disc / part number.
    #[serde(rename = "Part")]
    pub part: Option<u32>,
}

impl AcceptedEntry {
    /// Builds the row for a placed file. Returns `None` without a title.
    pub fn from_record(origin: impl Into<PathBuf>, record: &MetadataRecord) -> Option<Self> {
        Some(Self {
            origin: origin.into(),
            title: record.title.clone()?,
            author: record.author.clone(),
            series: record.series.clone(),
            number: record.series_sequence.clone(),
            part: record.disc_number,
        })
    }
}

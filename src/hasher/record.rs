//! Header parsing for bcrypt records.
//!
//! A record looks like `$2y$12$wY1/VHIVFvpDAy5zoULyeu.5S/rQToxXyTN8i3gmyL5gT7HqSVlAW`: a version tag,
//! a two-digit cost and 53 characters of salt and digest. Only the header is checked here.

use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::{error::DecodeError, utils::text::trim};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$(2[abxy])\$(\d{2})\$").expect("header pattern is valid"));

static VERSION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$2[abxy]\$").expect("version pattern is valid"));

/// How much of a rejected record ends up in the error message.
const ERROR_RECORD_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    TwoA,
    TwoB,
    TwoX,
    TwoY,
}

impl Version {
    pub fn as_str(self) -> &'static str {
        match self {
            Version::TwoA => "2a",
            Version::TwoB => "2b",
            Version::TwoX => "2x",
            Version::TwoY => "2y",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "2a" => Some(Version::TwoA),
            "2b" => Some(Version::TwoB),
            "2x" => Some(Version::TwoX),
            "2y" => Some(Version::TwoY),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The algorithm tag and cost embedded at the start of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub version: Version,
    pub cost: u32,
}

impl RecordHeader {
    pub fn parse(record: &str) -> Result<Self, DecodeError> {
        let Some(captures) = HEADER.captures(record) else {
            return Err(if VERSION_TAG.is_match(record) {
                DecodeError::MalformedCost {
                    record: trim(record, ERROR_RECORD_LENGTH),
                }
            } else {
                DecodeError::UnsupportedAlgorithm {
                    record: trim(record, ERROR_RECORD_LENGTH),
                }
            });
        };

        let malformed = || DecodeError::MalformedCost {
            record: trim(record, ERROR_RECORD_LENGTH),
        };

        let version = Version::from_tag(&captures[1]).ok_or_else(malformed)?;
        let cost = captures[2].parse::<u32>().map_err(|_| malformed())?;

        Ok(Self { version, cost })
    }
}

/// Returns the cost embedded in `record`.
pub fn cost_of(record: &str) -> Result<u32, DecodeError> {
    RecordHeader::parse(record).map(|header| header.cost)
}

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use log::debug;
use regex::Regex;
use thiserror::Error;

// <yy><code><nnn><section> then a two-digit sequence, e.g. 24EG105G01
const ROLL_PATTERN: &str = r"^([0-9]{2}[A-Z]{2}[0-9]{3}[A-Z])([0-9]{2})$";

fn roll_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ROLL_PATTERN).expect("roll number pattern compiles"))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Invalid roll number format: '{0}'.")]
    InvalidFormat(String),
    #[error("Roll numbers must have the same prefix ({start} vs {end}).")]
    PrefixMismatch { start: String, end: String },
    #[error("Start roll number must be less than or equal to end roll number ({start} > {end}).")]
    Inverted { start: String, end: String },
}

/// A roll number split into its shared prefix and trailing sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollNumber {
    prefix: String,
    sequence: u8,
}

impl RollNumber {
    /// Parses after trimming and upper-casing the input.
    pub fn parse(raw: &str) -> Result<Self, RangeError> {
        let normalized = raw.trim().to_uppercase();
        let caps = roll_regex()
            .captures(&normalized)
            .ok_or_else(|| RangeError::InvalidFormat(raw.to_string()))?;
        let sequence = caps[2]
            .parse::<u8>()
            .map_err(|_| RangeError::InvalidFormat(raw.to_string()))?;
        Ok(RollNumber {
            prefix: caps[1].to_string(),
            sequence,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn is_comparable(&self, other: &RollNumber) -> bool {
        self.prefix == other.prefix
    }
}

impl FromStr for RollNumber {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RollNumber::parse(s)
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.prefix, self.sequence)
    }
}

pub fn validate_roll_number(raw: &str) -> bool {
    let valid = RollNumber::parse(raw).is_ok();
    debug!("Validating roll number '{}' -> {}", raw, valid);
    valid
}

/// Expands an inclusive range of comparable roll numbers.
pub fn expand_range(start: &str, end: &str) -> Result<Vec<String>, RangeError> {
    let first = RollNumber::parse(start)?;
    let last = RollNumber::parse(end)?;

    if !first.is_comparable(&last) {
        return Err(RangeError::PrefixMismatch {
            start: first.prefix,
            end: last.prefix,
        });
    }
    if first.sequence > last.sequence {
        return Err(RangeError::Inverted {
            start: first.to_string(),
            end: last.to_string(),
        });
    }

    Ok((first.sequence..=last.sequence)
        .map(|sequence| RollNumber { prefix: first.prefix.clone(), sequence }.to_string())
        .collect())
}

use std::fmt;
use serde::{Deserialize, Deserializer, Serialize};

/// Score placeholder used whenever no numeric CGPA is available.
pub const SCORE_SENTINEL: &str = "--";

const ACTIVE: &str = "Active";
const BACKLOG: &str = "Backlog";
const NOT_FOUND: &str = "Student does not exist.";
const EXTRACTION_ERROR: &str = "Error in extracting information.";

/// Outcome classification. Serialized as the literal strings the portal
/// front-end and the exports use; any other string round-trips as
/// `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Active,
    Backlog,
    NotFound,
    ExtractionError,
    Unrecognized(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Active => ACTIVE,
            Status::Backlog => BACKLOG,
            Status::NotFound => NOT_FOUND,
            Status::ExtractionError => EXTRACTION_ERROR,
            Status::Unrecognized(other) => other,
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            ACTIVE => Status::Active,
            BACKLOG => Status::Backlog,
            NOT_FOUND => Status::NotFound,
            EXTRACTION_ERROR => Status::ExtractionError,
            _ => Status::Unrecognized(raw),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one extraction attempt for one roll number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    #[serde(alias = "identifier")]
    pub roll_number: String,
    #[serde(rename = "cgpa", alias = "score", deserialize_with = "score_text")]
    pub score: String,
    pub status: Status,
}

impl OutcomeRecord {
    pub fn active(roll_number: &str, score: &str) -> Self {
        Self::new(roll_number, score, Status::Active)
    }

    pub fn backlog(roll_number: &str) -> Self {
        Self::new(roll_number, SCORE_SENTINEL, Status::Backlog)
    }

    pub fn not_found(roll_number: &str) -> Self {
        Self::new(roll_number, SCORE_SENTINEL, Status::NotFound)
    }

    pub fn extraction_error(roll_number: &str) -> Self {
        Self::new(roll_number, SCORE_SENTINEL, Status::ExtractionError)
    }

    pub fn new(roll_number: &str, score: &str, status: Status) -> Self {
        OutcomeRecord {
            roll_number: roll_number.to_string(),
            score: score.to_string(),
            status,
        }
    }

    pub fn numeric_score(&self) -> Option<f64> {
        parse_score(&self.score)
    }
}

/// A score is usable only when it is a finite decimal.
pub fn parse_score(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// Clients posting results back may send the CGPA as a JSON number.
fn score_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawScore::deserialize(deserializer)? {
        RawScore::Text(text) => text,
        RawScore::Number(n) => n.to_string(),
    })
}

/// Per-bucket counts over one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub active: usize,
    pub backlog: usize,
    pub not_found: usize,
    pub error: usize,
}

impl Summary {
    pub fn entries(&self) -> [(&'static str, usize); 4] {
        [
            ("active", self.active),
            ("backlog", self.backlog),
            ("not_found", self.not_found),
            ("error", self.error),
        ]
    }
}

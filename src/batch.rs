use std::fmt;
use std::str::FromStr;
use log::{info, warn};
use serde::Serialize;
use crate::aggregator::aggregate;
use crate::extractor::Extractor;
use crate::outcome::{OutcomeRecord, Summary};

/// How browser sessions are allotted across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Fresh session per roll number, torn down before the next one starts.
    #[default]
    PerRecord,
    /// One session reused for the whole batch.
    Shared,
}

impl FromStr for SessionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-record" | "per_record" => Ok(SessionPolicy::PerRecord),
            "shared" => Ok(SessionPolicy::Shared),
            other => Err(format!("unknown session policy '{}'", other)),
        }
    }
}

impl fmt::Display for SessionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionPolicy::PerRecord => "per-record",
            SessionPolicy::Shared => "shared",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub results: Vec<OutcomeRecord>,
    pub summary: Summary,
}

/// Extracts every roll number in order, then ranks and summarizes the batch.
pub fn run_batch(extractor: &Extractor, roll_numbers: &[String], policy: SessionPolicy) -> BatchReport {
    let total = roll_numbers.len();
    info!("Starting batch of {} roll numbers ({} sessions)", total, policy);

    let mut records = Vec::with_capacity(total);
    let shared = match policy {
        SessionPolicy::Shared => match extractor.launch_session() {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Could not open a shared browser session ({}); using one per roll number", e);
                None
            }
        },
        SessionPolicy::PerRecord => None,
    };

    match shared {
        Some(mut scoped) => {
            for (i, roll) in roll_numbers.iter().enumerate() {
                info!("Processing {} / {} : {}", i + 1, total, roll);
                records.push(extractor.extract(roll, Some(scoped.session())));
            }
            scoped.release();
        }
        None => {
            for (i, roll) in roll_numbers.iter().enumerate() {
                info!("Processing {} / {} : {}", i + 1, total, roll);
                records.push(extractor.extract(roll, None));
            }
        }
    }

    let (results, summary) = aggregate(records);
    info!(
        "Batch complete. Active: {}, Backlog: {}, Not found: {}, Error: {}",
        summary.active, summary.backlog, summary.not_found, summary.error
    );
    BatchReport { results, summary }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policies() {
        assert_eq!("per-record".parse::<SessionPolicy>().unwrap(), SessionPolicy::PerRecord);
        assert_eq!(" Shared ".parse::<SessionPolicy>().unwrap(), SessionPolicy::Shared);
        assert!("pooled".parse::<SessionPolicy>().is_err());
        assert_eq!(SessionPolicy::default().to_string(), "per-record");
    }
}

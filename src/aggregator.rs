use std::cmp::Ordering;
use crate::outcome::{OutcomeRecord, Status, Summary};

/// Ordering buckets, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bucket {
    Ranked,
    Backlog,
    NotFound,
    Other,
}

struct SortKey {
    bucket: Bucket,
    score: f64,
}

impl SortKey {
    fn of(record: &OutcomeRecord) -> Self {
        match (&record.status, record.numeric_score()) {
            (Status::Active, Some(score)) => SortKey { bucket: Bucket::Ranked, score },
            (Status::Backlog, _) => SortKey { bucket: Bucket::Backlog, score: 0.0 },
            (Status::NotFound, _) => SortKey { bucket: Bucket::NotFound, score: 0.0 },
            // also an Active record whose score does not parse
            _ => SortKey { bucket: Bucket::Other, score: 0.0 },
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.bucket.cmp(&other.bucket).then_with(|| match self.bucket {
            // higher score first
            Bucket::Ranked => other.score.partial_cmp(&self.score).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        })
    }
}

/// Ranks a batch of outcome records and counts them per bucket.
///
/// Sorting is stable, so records that compare equal keep their input order.
/// Records with an unrecognized status stay in the ordered list but are not
/// counted in any summary bucket.
pub fn aggregate(records: Vec<OutcomeRecord>) -> (Vec<OutcomeRecord>, Summary) {
    let summary = summarize(&records);

    let mut keyed: Vec<(SortKey, OutcomeRecord)> = records
        .into_iter()
        .map(|record| (SortKey::of(&record), record))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b));

    (keyed.into_iter().map(|(_, record)| record).collect(), summary)
}

pub fn summarize(records: &[OutcomeRecord]) -> Summary {
    let mut summary = Summary::default();
    for record in records {
        match record.status {
            Status::Active if record.numeric_score().is_some() => summary.active += 1,
            Status::Backlog => summary.backlog += 1,
            Status::NotFound => summary.not_found += 1,
            Status::ExtractionError => summary.error += 1,
            _ => {}
        }
    }
    summary
}

use proptest::prelude::*;
use result_extractor_lib::aggregator::summarize;
use result_extractor_lib::{aggregate, OutcomeRecord, Status, Summary};

fn status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Active),
        Just(Status::Backlog),
        Just(Status::NotFound),
        Just(Status::ExtractionError),
        Just(Status::Unrecognized("Unknown".to_string())),
    ]
}

fn score() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..=1000).prop_map(|v| format!("{:.2}", v as f64 / 100.0)),
        Just("--".to_string()),
        Just("N/A".to_string()),
    ]
}

fn records() -> impl Strategy<Value = Vec<OutcomeRecord>> {
    prop::collection::vec((status(), score()), 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (status, score))| OutcomeRecord::new(&format!("24EG105G{:02}", i), &score, status))
            .collect()
    })
}

fn bucket(record: &OutcomeRecord) -> u8 {
    match (&record.status, record.numeric_score()) {
        (Status::Active, Some(_)) => 0,
        (Status::Backlog, _) => 1,
        (Status::NotFound, _) => 2,
        _ => 3,
    }
}

proptest! {
    #[test]
    fn ordering_is_a_permutation(input in records()) {
        let (ordered, _) = aggregate(input.clone());
        let mut before: Vec<_> = input.iter().map(|r| r.roll_number.clone()).collect();
        let mut after: Vec<_> = ordered.iter().map(|r| r.roll_number.clone()).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn buckets_ascend_and_scores_descend(input in records()) {
        let (ordered, _) = aggregate(input);
        for pair in ordered.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(bucket(a) <= bucket(b));
            if bucket(a) == 0 && bucket(b) == 0 {
                prop_assert!(a.numeric_score() >= b.numeric_score());
            }
        }
    }

    #[test]
    fn summary_counts_only_known_statuses(input in records()) {
        let unrecognized = input.iter().filter(|r| matches!(r.status, Status::Unrecognized(_))).count();
        let malformed_active = input
            .iter()
            .filter(|r| r.status == Status::Active && r.numeric_score().is_none())
            .count();
        let (ordered, summary) = aggregate(input.clone());

        prop_assert_eq!(summary, summarize(&ordered));
        let counted = summary.active + summary.backlog + summary.not_found + summary.error;
        prop_assert_eq!(counted + unrecognized + malformed_active, input.len());
    }
}

#[test]
fn reference_batch() {
    let records = vec![
        OutcomeRecord::active("A", "3.2"),
        OutcomeRecord::backlog("B"),
        OutcomeRecord::active("C", "3.9"),
        OutcomeRecord::not_found("D"),
    ];
    let (ordered, summary) = aggregate(records);
    let order: Vec<_> = ordered.iter().map(|r| r.roll_number.as_str()).collect();
    assert_eq!(order, ["C", "A", "B", "D"]);
    assert_eq!(summary, Summary { active: 2, backlog: 1, not_found: 1, error: 0 });
}

#[test]
fn records_posted_back_as_json_aggregate_like_extracted_ones() {
    let posted = r#"[
        {"roll_number": "24EG105G01", "cgpa": "N/A", "status": "Active"},
        {"roll_number": "24EG105G02", "cgpa": 9.4, "status": "Active"},
        {"roll_number": "24EG105G03", "cgpa": "--", "status": "Unknown"},
        {"roll_number": "24EG105G04", "cgpa": "--", "status": "Error in extracting information."}
    ]"#;
    let records: Vec<OutcomeRecord> = serde_json::from_str(posted).unwrap();
    let (ordered, summary) = aggregate(records);

    let order: Vec<_> = ordered.iter().map(|r| r.roll_number.as_str()).collect();
    assert_eq!(order, ["24EG105G02", "24EG105G01", "24EG105G03", "24EG105G04"]);
    assert_eq!(summary, Summary { active: 1, backlog: 0, not_found: 0, error: 1 });
}

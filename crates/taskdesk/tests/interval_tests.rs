//! Tests for parsing the backend's approved-leave JSON.

use chrono::NaiveDate;
use taskdesk::error::ValidationReason;
use taskdesk::{parse_intervals, LeaveInterval, TaskdeskError};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn parses_well_formed_listing() {
    let set = parse_intervals(
        r#"[
            {"start_date": "2024-06-10", "end_date": "2024-06-12"},
            {"start_date": "2024-07-01", "end_date": "2024-07-01"}
        ]"#,
    )
    .unwrap();

    assert!(set.rejected.is_empty());
    assert_eq!(
        set.intervals,
        vec![
            LeaveInterval::new(d(2024, 6, 10), d(2024, 6, 12)),
            LeaveInterval::day(d(2024, 7, 1)),
        ]
    );
}

#[test]
fn empty_listing_is_not_an_error() {
    let set = parse_intervals("[]").unwrap();
    assert!(set.is_empty());
    assert!(set.rejected.is_empty());
}

#[test]
fn extra_backend_fields_are_ignored() {
    let set = parse_intervals(
        r#"[{"id": 9, "employee": 4, "leave_type": "Sick", "status": "Approved",
             "start_date": "2024-06-10", "end_date": "2024-06-10"}]"#,
    )
    .unwrap();
    assert_eq!(set.intervals.len(), 1);
}

#[test]
fn bad_entries_are_skipped_and_named() {
    let set = parse_intervals(
        r#"[
            {"start_date": "2024-06-10", "end_date": "2024-06-12"},
            {"start_date": "June 1st", "end_date": "2024-06-03"},
            {"start_date": "2024-08-05", "end_date": "2024-08-01"},
            {"start_date": "2024-09-01", "end_date": "2024-13-01"},
            {"start_date": "2024-10-01", "end_date": "2024-10-02"},
            {"start_date": "2024-06-100", "end_date": "2024-06-12junk"},
            {"start_date": "2024-11-01", "end_date": "2024-11-02junk"}
        ]"#,
    )
    .unwrap();

    assert_eq!(set.intervals.len(), 2);
    assert_eq!(set.intervals[1].start_date, d(2024, 10, 1));

    let reasons: Vec<_> = set.rejected.iter().map(|e| (e.index, e.reason.clone())).collect();
    assert_eq!(
        reasons,
        vec![
            (1, ValidationReason::UnparseableStart),
            (2, ValidationReason::EndBeforeStart),
            (3, ValidationReason::UnparseableEnd),
            (5, ValidationReason::UnparseableStart),
            (6, ValidationReason::UnparseableEnd),
        ]
    );

    let message = set.rejected[1].to_string();
    assert!(message.contains("#2"), "message should name the interval: {message}");
    assert!(message.contains("2024-08-05"));
}

#[test]
fn full_timestamps_keep_their_date() {
    let set = parse_intervals(
        r#"[{"start_date": "2024-06-10T00:00:00Z", "end_date": "2024-06-12T00:00:00"}]"#,
    )
    .unwrap();
    assert!(set.rejected.is_empty());
    assert_eq!(set.intervals, vec![LeaveInterval::new(d(2024, 6, 10), d(2024, 6, 12))]);
}

#[test]
fn non_array_document_is_a_json_error() {
    assert!(matches!(
        parse_intervals(r#"{"start_date": "2024-06-10"}"#),
        Err(TaskdeskError::Json(_))
    ));
    assert!(matches!(
        parse_intervals(r#"[{"start_date": "2024-06-10"}]"#),
        Err(TaskdeskError::Json(_))
    ));
}

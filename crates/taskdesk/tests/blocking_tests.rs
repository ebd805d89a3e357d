//! Tests for leave-conflict date blocking.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;
use taskdesk::blocking::DayStatus;
use taskdesk::{
    is_date_blocked, is_date_blocked_now, Clock, FixedClock, LeaveConflictCalculator,
    LeaveInterval, LocalClock,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn interval(start: NaiveDate, end: NaiveDate) -> LeaveInterval {
    LeaveInterval::new(start, end)
}

/// An evaluation day that precedes every leave range used below.
fn today() -> NaiveDate {
    d(2024, 1, 1)
}

// ── Past-date policy ────────────────────────────────────────────────────────

#[test]
fn past_dates_blocked_without_leave() {
    assert!(is_date_blocked(d(2023, 12, 31), &[], today()));
    assert!(is_date_blocked(d(2000, 1, 1), &[], today()));
}

#[test]
fn past_dates_blocked_even_when_outside_leave() {
    let leave = [interval(d(2024, 6, 10), d(2024, 6, 12))];
    assert!(is_date_blocked(d(2023, 6, 11), &leave, today()));
}

#[test]
fn past_dates_blocked_against_real_clock() {
    let yesterday = LocalClock.today() - Duration::days(1);
    assert!(is_date_blocked_now(yesterday, &[]));
}

// ── Empty interval set ──────────────────────────────────────────────────────

#[test]
fn today_and_future_free_without_leave() {
    assert!(!is_date_blocked(today(), &[], today()));
    assert!(!is_date_blocked(d(2030, 5, 17), &[], today()));
}

#[test]
fn far_future_free_against_real_clock() {
    let next_year = LocalClock.today() + Duration::days(366);
    assert!(!is_date_blocked_now(next_year, &[]));
}

// ── Interval membership ─────────────────────────────────────────────────────

#[test]
fn three_day_interval_blocks_exactly_three_days() {
    let leave = [interval(d(2024, 6, 10), d(2024, 6, 12))];

    assert!(!is_date_blocked(d(2024, 6, 9), &leave, today()));
    assert!(is_date_blocked(d(2024, 6, 10), &leave, today()));
    assert!(is_date_blocked(d(2024, 6, 11), &leave, today()));
    assert!(is_date_blocked(d(2024, 6, 12), &leave, today()));
    assert!(!is_date_blocked(d(2024, 6, 13), &leave, today()));
}

#[test]
fn single_day_interval_blocks_only_that_day() {
    let leave = [LeaveInterval::day(d(2024, 7, 1))];

    assert!(is_date_blocked(d(2024, 7, 1), &leave, today()));
    assert!(!is_date_blocked(d(2024, 6, 30), &leave, today()));
    assert!(!is_date_blocked(d(2024, 7, 2), &leave, today()));
}

#[test]
fn any_of_several_intervals_blocks() {
    let leave = [
        interval(d(2024, 3, 4), d(2024, 3, 5)),
        interval(d(2024, 9, 1), d(2024, 9, 1)),
    ];
    assert!(is_date_blocked(d(2024, 3, 5), &leave, today()));
    assert!(is_date_blocked(d(2024, 9, 1), &leave, today()));
    assert!(!is_date_blocked(d(2024, 6, 1), &leave, today()));
}

#[test]
fn overlapping_intervals_behave_like_their_union() {
    let overlapping = [
        interval(d(2024, 6, 10), d(2024, 6, 14)),
        interval(d(2024, 6, 12), d(2024, 6, 18)),
    ];
    let union = [interval(d(2024, 6, 10), d(2024, 6, 18))];

    for offset in 0..15 {
        let day = d(2024, 6, 7) + Duration::days(offset);
        assert_eq!(
            is_date_blocked(day, &overlapping, today()),
            is_date_blocked(day, &union, today()),
            "mismatch on {day}"
        );
    }
}

#[test]
fn time_of_day_does_not_matter() {
    let leave = [LeaveInterval::day(d(2024, 7, 1))];
    let midnight = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let evening = Los_Angeles.with_ymd_and_hms(2024, 7, 1, 22, 30, 0).unwrap();

    assert!(is_date_blocked(midnight, &leave, today()));
    assert!(is_date_blocked(evening, &leave, today()));
}

// ── Malformed intervals ─────────────────────────────────────────────────────

#[test]
fn inverted_interval_blocks_nothing() {
    let leave = [interval(d(2024, 8, 5), d(2024, 8, 1))];
    for day in 1..=5 {
        assert!(!is_date_blocked(d(2024, 8, day), &leave, today()));
    }
}

#[test]
fn inverted_interval_does_not_hide_valid_ones() {
    let leave = [
        interval(d(2024, 8, 5), d(2024, 8, 1)),
        interval(d(2024, 8, 3), d(2024, 8, 3)),
    ];
    assert!(is_date_blocked(d(2024, 8, 3), &leave, today()));
    assert!(!is_date_blocked(d(2024, 8, 2), &leave, today()));
}

// ── Determinism ─────────────────────────────────────────────────────────────

#[test]
fn repeated_calls_agree() {
    let leave = [interval(d(2024, 6, 10), d(2024, 6, 12))];
    for day in [d(2023, 1, 1), d(2024, 6, 11), d(2024, 6, 20)] {
        let first = is_date_blocked(day, &leave, today());
        let second = is_date_blocked(day, &leave, today());
        assert_eq!(first, second);
    }
}

// ── Cached calculator ───────────────────────────────────────────────────────

#[test]
fn calculator_matches_pure_function() {
    let leave = [
        interval(d(2024, 6, 10), d(2024, 6, 12)),
        interval(d(2024, 6, 11), d(2024, 6, 15)),
        interval(d(2024, 6, 30), d(2024, 6, 20)),
    ];
    let today = d(2024, 6, 11);
    let calc = LeaveConflictCalculator::with_clock(&leave, FixedClock(today));

    for offset in 0..40 {
        let day = d(2024, 6, 1) + Duration::days(offset);
        assert_eq!(calc.is_blocked(day), is_date_blocked(day, &leave, today), "{day}");
    }
}

#[test]
fn calculator_lists_leave_days_once() {
    let leave = [
        interval(d(2024, 6, 10), d(2024, 6, 12)),
        interval(d(2024, 6, 12), d(2024, 6, 13)),
    ];
    let calc = LeaveConflictCalculator::with_clock(&leave, FixedClock(today()));
    let days: Vec<_> = calc.leave_days().collect();
    assert_eq!(
        days,
        vec![d(2024, 6, 10), d(2024, 6, 11), d(2024, 6, 12), d(2024, 6, 13)]
    );
}

#[test]
fn month_view_marks_each_day() {
    let leave = [interval(d(2024, 6, 10), d(2024, 6, 12))];
    let calc = LeaveConflictCalculator::with_clock(&leave, FixedClock(d(2024, 6, 5)));
    let june = calc.month_view(2024, 6).unwrap();

    assert_eq!(june.len(), 30);
    assert_eq!(june[3], (d(2024, 6, 4), DayStatus::Past));
    assert_eq!(june[4], (d(2024, 6, 5), DayStatus::Available));
    assert_eq!(june[9], (d(2024, 6, 10), DayStatus::OnLeave));
    assert_eq!(june[12], (d(2024, 6, 13), DayStatus::Available));

    let blocked = june.iter().filter(|(_, s)| s.is_blocked()).count();
    assert_eq!(blocked, 4 + 3);
}

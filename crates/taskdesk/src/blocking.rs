//! Leave-conflict date blocking.
//!
//! Decides whether a date picker must disable a candidate day for the
//! currently assigned user:
//!
//! 1. Any day strictly before today is blocked, whatever the leave data.
//! 2. With no leave intervals, every other day is selectable.
//! 3. Otherwise a day is blocked iff it falls inside any approved interval
//!    (bounds inclusive). Inverted intervals block nothing.
//!
//! Overlapping intervals are not merged; membership is the same either way.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, LocalClock};
use crate::interval::LeaveInterval;

/// Anything that names a calendar day. Time-of-day is ignored.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// Whether `candidate` must be disabled, given the assignee's approved leave
/// and the evaluator's current day.
///
/// Pure: identical inputs always give identical answers.
pub fn is_date_blocked<D: CalendarDay>(
    candidate: D,
    intervals: &[LeaveInterval],
    today: NaiveDate,
) -> bool {
    let day = candidate.calendar_day();

    if day < today {
        return true;
    }

    if intervals.is_empty() {
        return false;
    }

    intervals.iter().any(|interval| interval.contains(day))
}

/// [`is_date_blocked`] against the local clock.
pub fn is_date_blocked_now<D: CalendarDay>(candidate: D, intervals: &[LeaveInterval]) -> bool {
    is_date_blocked(candidate, intervals, LocalClock.today())
}

/// How a single day renders in a month view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Before today.
    Past,
    /// Inside an approved leave interval.
    OnLeave,
    Available,
}

impl DayStatus {
    pub fn is_blocked(self) -> bool {
        !matches!(self, DayStatus::Available)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Past => "past",
            DayStatus::OnLeave => "on_leave",
            DayStatus::Available => "available",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blocking calculator for one interval set.
///
/// A date picker asks once per rendered cell, so the intervals are
/// normalized up front into sorted, disjoint ranges and each query is a
/// binary search. Memory stays proportional to the number of intervals, not
/// the number of days they cover. Answers always match [`is_date_blocked`]
/// for the same intervals and clock.
#[derive(Debug, Clone)]
pub struct LeaveConflictCalculator<C = LocalClock> {
    ranges: Vec<LeaveInterval>,
    clock: C,
}

impl LeaveConflictCalculator<LocalClock> {
    pub fn new(intervals: &[LeaveInterval]) -> Self {
        Self::with_clock(intervals, LocalClock)
    }
}

impl<C: Clock> LeaveConflictCalculator<C> {
    pub fn with_clock(intervals: &[LeaveInterval], clock: C) -> Self {
        Self {
            ranges: merge_ranges(intervals),
            clock,
        }
    }

    /// A calculator with no leave: only past days are blocked.
    pub fn empty(clock: C) -> Self {
        Self {
            ranges: Vec::new(),
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn is_blocked<D: CalendarDay>(&self, candidate: D) -> bool {
        self.status(candidate).is_blocked()
    }

    /// Like [`is_blocked`](Self::is_blocked) for an instant, placed on a
    /// calendar day in the clock's zone rather than in UTC.
    pub fn is_blocked_at(&self, at: DateTime<Utc>) -> bool {
        self.is_blocked(self.clock.day_of(at))
    }

    /// The calendar day `at` falls on for this calculator's clock.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        self.clock.day_of(at)
    }

    pub fn status<D: CalendarDay>(&self, candidate: D) -> DayStatus {
        let day = candidate.calendar_day();
        if day < self.clock.today() {
            DayStatus::Past
        } else if self.on_leave(day) {
            DayStatus::OnLeave
        } else {
            DayStatus::Available
        }
    }

    fn on_leave(&self, day: NaiveDate) -> bool {
        let idx = self.ranges.partition_point(|r| r.end_date < day);
        self.ranges.get(idx).is_some_and(|r| r.start_date <= day)
    }

    /// Every day covered by leave, sorted and de-duplicated. Past days are
    /// included. Days are produced lazily.
    pub fn leave_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.ranges.iter().flat_map(LeaveInterval::days)
    }

    /// Leave days within `[from, to]`, both inclusive. Empty when
    /// `from > to`.
    pub fn leave_days_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Iterator<Item = NaiveDate> + '_ {
        let first = self.ranges.partition_point(|r| r.end_date < from);
        self.ranges[first..]
            .iter()
            .take_while(move |r| r.start_date <= to)
            .flat_map(move |r| {
                LeaveInterval::new(r.start_date.max(from), r.end_date.min(to)).days()
            })
    }

    /// One status per day of the given month, first to last. `None` for an
    /// invalid year/month.
    pub fn month_view(&self, year: i32, month: u32) -> Option<Vec<(NaiveDate, DayStatus)>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let view = first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|d| (d, self.status(d)))
            .collect();
        Some(view)
    }
}

/// Sort well-formed intervals and fuse overlapping or adjacent ones.
fn merge_ranges(intervals: &[LeaveInterval]) -> Vec<LeaveInterval> {
    let mut sorted: Vec<LeaveInterval> = intervals
        .iter()
        .copied()
        .filter(LeaveInterval::is_well_formed)
        .collect();
    sorted.sort_by_key(|r| r.start_date);

    let mut merged: Vec<LeaveInterval> = Vec::with_capacity(sorted.len());
    for next in sorted {
        match merged.last_mut() {
            Some(last)
                if next.start_date <= last.end_date
                    || last.end_date.succ_opt() == Some(next.start_date) =>
            {
                last.end_date = last.end_date.max(next.end_date);
            }
            _ => merged.push(next),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn time_of_day_is_ignored() {
        let leave = [LeaveInterval::day(d(2024, 7, 1))];
        let late = d(2024, 7, 1).and_hms_opt(23, 59, 59).unwrap();
        assert!(is_date_blocked(late, &leave, d(2024, 6, 1)));
    }

    #[test]
    fn today_itself_is_not_past() {
        assert!(!is_date_blocked(d(2024, 6, 1), &[], d(2024, 6, 1)));
        assert!(is_date_blocked(d(2024, 5, 31), &[], d(2024, 6, 1)));
    }

    #[test]
    fn status_distinguishes_past_from_leave() {
        let calc = LeaveConflictCalculator::with_clock(
            &[LeaveInterval::new(d(2024, 5, 30), d(2024, 6, 2))],
            FixedClock(d(2024, 6, 1)),
        );
        assert_eq!(calc.status(d(2024, 5, 31)), DayStatus::Past);
        assert_eq!(calc.status(d(2024, 6, 1)), DayStatus::OnLeave);
        assert_eq!(calc.status(d(2024, 6, 3)), DayStatus::Available);
    }

    #[test]
    fn month_view_covers_whole_month() {
        let calc = LeaveConflictCalculator::empty(FixedClock(d(2024, 1, 1)));
        let feb = calc.month_view(2024, 2).unwrap();
        assert_eq!(feb.len(), 29);
        assert_eq!(feb.last().unwrap().0, d(2024, 2, 29));
        assert!(calc.month_view(2024, 13).is_none());
    }

    #[test]
    fn reversed_range_query_is_empty() {
        let calc = LeaveConflictCalculator::with_clock(
            &[LeaveInterval::new(d(2024, 6, 10), d(2024, 6, 12))],
            FixedClock(d(2024, 1, 1)),
        );
        assert_eq!(calc.leave_days_between(d(2024, 6, 12), d(2024, 6, 10)).count(), 0);
        assert_eq!(calc.leave_days_between(d(2024, 6, 11), d(2024, 6, 30)).count(), 2);
    }

    #[test]
    fn overlapping_and_adjacent_ranges_are_fused() {
        let merged = merge_ranges(&[
            LeaveInterval::new(d(2024, 6, 20), d(2024, 6, 22)),
            LeaveInterval::new(d(2024, 6, 10), d(2024, 6, 14)),
            LeaveInterval::new(d(2024, 6, 12), d(2024, 6, 15)),
            LeaveInterval::new(d(2024, 6, 16), d(2024, 6, 16)),
            LeaveInterval::new(d(2024, 7, 5), d(2024, 7, 1)),
        ]);
        assert_eq!(
            merged,
            vec![
                LeaveInterval::new(d(2024, 6, 10), d(2024, 6, 16)),
                LeaveInterval::new(d(2024, 6, 20), d(2024, 6, 22)),
            ]
        );
    }

    #[test]
    fn whole_calendar_interval_stays_cheap() {
        let everything = [LeaveInterval::new(NaiveDate::MIN, NaiveDate::MAX)];
        let today = d(2024, 6, 1);
        let calc = LeaveConflictCalculator::with_clock(&everything, FixedClock(today));

        assert!(calc.is_blocked(d(2024, 6, 1)));
        assert!(calc.is_blocked(NaiveDate::MAX));
        assert!(is_date_blocked(NaiveDate::MAX, &everything, today));
        assert_eq!(
            calc.leave_days_between(d(2024, 6, 1), d(2024, 6, 3)).count(),
            3
        );
        assert_eq!(calc.leave_days().next(), Some(NaiveDate::MIN));
    }

    #[test]
    fn instants_use_the_clock_zone() {
        use crate::clock::ZonedClock;

        // Far enough ahead that the real clock never makes it past.
        let leave = [LeaveInterval::day(d(2999, 6, 12))];
        let kolkata = ZonedClock::from_name("Asia/Kolkata").unwrap();
        let calc = LeaveConflictCalculator::with_clock(&leave, kolkata);

        // 2999-06-13 00:30 in Kolkata, still the 12th in UTC.
        let just_after_midnight = Utc.with_ymd_and_hms(2999, 6, 12, 19, 0, 0).unwrap();
        assert!(!calc.is_blocked_at(just_after_midnight));
        assert!(calc.is_blocked(just_after_midnight));

        let noon = Utc.with_ymd_and_hms(2999, 6, 12, 6, 30, 0).unwrap();
        assert!(calc.is_blocked_at(noon));
    }
}

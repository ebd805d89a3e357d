//! Per-assignee leave calendar.
//!
//! Approved leave belongs to whichever user a task is assigned to. The
//! calendar refetches it through a [`LeaveSource`] whenever the selected
//! assignee changes, and keeps a cached calculator for the current one.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::blocking::{CalendarDay, DayStatus, LeaveConflictCalculator};
use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::interval::{IntervalSet, RawLeaveInterval};

/// Backend user id.
pub type UserId = u64;

/// Where approved leave comes from.
pub trait LeaveSource {
    fn approved_leave(&self, user: UserId) -> Result<Vec<RawLeaveInterval>>;
}

/// Leave held in memory, keyed by user.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeaveSource {
    leave: HashMap<UserId, Vec<RawLeaveInterval>>,
}

impl InMemoryLeaveSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: UserId, leave: Vec<RawLeaveInterval>) {
        self.leave.insert(user, leave);
    }
}

impl LeaveSource for InMemoryLeaveSource {
    fn approved_leave(&self, user: UserId) -> Result<Vec<RawLeaveInterval>> {
        Ok(self.leave.get(&user).cloned().unwrap_or_default())
    }
}

/// Reads `<dir>/<user_id>.json`, each holding the backend's approved-leave
/// array. A missing file means the user has no approved leave.
#[derive(Debug, Clone)]
pub struct JsonDirLeaveSource {
    dir: PathBuf,
}

impl JsonDirLeaveSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LeaveSource for JsonDirLeaveSource {
    fn approved_leave(&self, user: UserId) -> Result<Vec<RawLeaveInterval>> {
        let path = self.dir.join(format!("{user}.json"));
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The leave calendar of the currently selected assignee.
pub struct AssigneeCalendar<S, C> {
    source: S,
    clock: C,
    assignee: Option<UserId>,
    rejected: Vec<ValidationError>,
    calculator: LeaveConflictCalculator<C>,
}

impl<S: LeaveSource, C: Clock + Clone> AssigneeCalendar<S, C> {
    /// Starts with nobody selected: only past days are blocked.
    pub fn new(source: S, clock: C) -> Self {
        let calculator = LeaveConflictCalculator::empty(clock.clone());
        Self {
            source,
            clock,
            assignee: None,
            rejected: Vec::new(),
            calculator,
        }
    }

    pub fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Select an assignee, refetching their leave only if the selection
    /// changed. Returns whether a fetch happened.
    ///
    /// On a fetch error the previous selection and its leave are kept.
    pub fn select_assignee(&mut self, assignee: Option<UserId>) -> Result<bool> {
        if assignee == self.assignee {
            return Ok(false);
        }
        self.load(assignee)?;
        Ok(true)
    }

    /// Force a refetch for the current assignee. On error the current leave
    /// is kept.
    pub fn refresh(&mut self) -> Result<()> {
        self.load(self.assignee)
    }

    /// Fetch before touching any state, so a failed fetch changes nothing.
    fn load(&mut self, assignee: Option<UserId>) -> Result<()> {
        let set = match assignee {
            Some(user) => {
                tracing::debug!(user, "fetching approved leave");
                IntervalSet::from_raw(&self.source.approved_leave(user)?)
            }
            None => IntervalSet::default(),
        };

        self.calculator = LeaveConflictCalculator::with_clock(&set.intervals, self.clock.clone());
        self.rejected = set.rejected;
        self.assignee = assignee;
        Ok(())
    }

    /// Intervals dropped from the last fetch.
    pub fn rejected(&self) -> &[ValidationError] {
        &self.rejected
    }

    pub fn is_blocked<D: CalendarDay>(&self, candidate: D) -> bool {
        self.calculator.is_blocked(candidate)
    }

    pub fn status<D: CalendarDay>(&self, candidate: D) -> DayStatus {
        self.calculator.status(candidate)
    }

    pub fn calculator(&self) -> &LeaveConflictCalculator<C> {
        &self.calculator
    }
}

//! Where "today" comes from.
//!
//! The past-date rule compares a candidate against the start of the
//! evaluator's current calendar day, so the calculator needs a notion of
//! today that tests can pin. Instants (task start/end times) are placed on a
//! calendar day in the same zone the clock reads today from.

use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{Result, TaskdeskError};

/// Source of the current calendar day.
pub trait Clock {
    fn today(&self) -> NaiveDate;

    /// The calendar day `at` falls on for this clock's evaluator.
    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate;
}

/// Today in the process's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

/// Today in a fixed IANA timezone, regardless of the host's local zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// # Errors
    /// Returns `TaskdeskError::InvalidTimezone` if `name` is not a valid IANA
    /// identifier.
    pub fn from_name(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| TaskdeskError::InvalidTimezone(name.to_string()))?;
        Ok(Self::new(tz))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Clock for ZonedClock {
    fn today(&self) -> NaiveDate {
        self.day_of(Utc::now())
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }
}

/// A clock stuck on one day. Instants are read in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.date_naive()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        (**self).day_of(at)
    }
}

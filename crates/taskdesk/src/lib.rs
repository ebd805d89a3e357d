//! # taskdesk
//!
//! Leave-aware scheduling logic for a task management dashboard.
//!
//! The heart of the crate is the leave-conflict calculator: given the approved
//! leave of the user a task is assigned to, it decides which days a date
//! picker must disable. Around it sit the pieces of the dashboard that carry
//! logic rather than layout: the task model and form, the task list search,
//! and a persisted light/dark theme.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use taskdesk::{is_date_blocked, parse_intervals};
//!
//! let set = parse_intervals(r#"[{"start_date":"2024-06-10","end_date":"2024-06-12"}]"#).unwrap();
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//!
//! let on_leave = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
//! let free = NaiveDate::from_ymd_opt(2024, 6, 13).unwrap();
//! assert!(is_date_blocked(on_leave, &set.intervals, today));
//! assert!(!is_date_blocked(free, &set.intervals, today));
//! ```
//!
//! ## Modules
//!
//! - [`interval`] — Leave intervals and the backend's JSON wire format
//! - [`blocking`] — Date blocking (pure function and cached calculator)
//! - [`clock`] — Where "today" comes from
//! - [`assignee`] — Per-assignee leave calendar with refetch on change
//! - [`task`] — Task records, form validation, submit payloads, list search
//! - [`theme`] — Persisted light/dark theme store
//! - [`error`] — Error types

pub mod assignee;
pub mod blocking;
pub mod clock;
pub mod error;
pub mod interval;
pub mod task;
pub mod theme;

pub use assignee::{AssigneeCalendar, JsonDirLeaveSource, LeaveSource, UserId};
pub use blocking::{is_date_blocked, is_date_blocked_now, DayStatus, LeaveConflictCalculator};
pub use clock::{Clock, FixedClock, LocalClock, ZonedClock};
pub use error::{TaskdeskError, ValidationError};
pub use interval::{parse_intervals, IntervalSet, LeaveInterval, RawLeaveInterval};
pub use task::{filter_tasks, FormMode, Task, TaskForm, TaskList};
pub use theme::{FileStorage, Theme, ThemeStore};

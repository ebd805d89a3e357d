//! Task records, the task form and the task list.
//!
//! Records mirror what the backend's task endpoints return. The form side
//! covers the three modes a task dialog opens in, validation against the
//! assignee's leave calendar, and the JSON bodies sent on submit.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::assignee::UserId;
use crate::blocking::LeaveConflictCalculator;
use crate::clock::Clock;
use crate::error::{Result, TaskdeskError};

pub type TaskId = u64;
pub type ProjectId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Urgent" => Ok(Priority::Urgent),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "NotStarted",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "NotStarted" => Ok(TaskStatus::NotStarted),
            "InProgress" => Ok(TaskStatus::InProgress),
            "Completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as returned by the backend. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub percentage_completed: Option<f64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project: Option<ProjectId>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub time_taken: Option<serde_json::Value>,
    #[serde(default)]
    pub created_by: Option<UserId>,
}

/// Select fields arrive as `""` when nothing was picked.
fn blank_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Numbers may come back as JSON numbers, numeric strings, or `""`.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, got {other}"
        ))),
    }
}

/// Parse the backend's task list.
pub fn parse_tasks(json: &str) -> Result<Vec<Task>> {
    Ok(serde_json::from_str(json)?)
}

/// Case-insensitive search over name, description and priority. An empty
/// query matches everything; order is preserved.
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let needle = query.to_lowercase();
    tasks.iter().filter(|task| task.matches(&needle)).collect()
}

impl Task {
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
            || self
                .priority
                .is_some_and(|p| p.as_str().to_lowercase().contains(needle))
    }
}

/// The task table's state: the loaded tasks plus the current search.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    query: String,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            query: String::new(),
        }
    }

    /// Replace the tasks after a reload; the search is kept.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn visible(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, &self.query)
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Drop a task after the backend confirmed its deletion.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }
}

/// How the task dialog was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Create,
    View,
    Update,
}

impl FormMode {
    pub fn is_read_only(self) -> bool {
        self == FormMode::View
    }

    /// Start/end dates are only part of the form when viewing or updating.
    pub fn shows_schedule(self) -> bool {
        matches!(self, FormMode::View | FormMode::Update)
    }
}

/// A single validation failure on the task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Editable task fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub id: Option<TaskId>,
    pub name: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub percentage_completed: Option<f64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub project: Option<ProjectId>,
    pub assigned_to: Option<UserId>,
}

impl TaskForm {
    /// Pre-fill from an existing task (view/update dialogs).
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            name: task.name.clone(),
            description: task.description.clone().unwrap_or_default(),
            priority: task.priority,
            status: task.status,
            percentage_completed: task.percentage_completed,
            start_time: task.start_time,
            end_time: task.end_time,
            project: task.project,
            assigned_to: task.assigned_to,
        }
    }

    /// Check the form before submission. Chosen dates are checked against
    /// the assignee's leave calendar the same way the date picker disables
    /// them: each instant is read as a day in the calendar clock's zone.
    pub fn validate<C: Clock>(
        &self,
        mode: FormMode,
        calendar: &LeaveConflictCalculator<C>,
    ) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Please enter the task name"));
        }

        if mode == FormMode::Update {
            if self.start_time.is_none() {
                errors.push(FieldError::new("start_time", "Please select the start date"));
            }
            if self.end_time.is_none() {
                errors.push(FieldError::new("end_time", "Please select the end date"));
            }
        }

        if mode.shows_schedule() {
            for (field, value) in [("start_time", self.start_time), ("end_time", self.end_time)] {
                if let Some(at) = value {
                    if calendar.is_blocked_at(at) {
                        errors.push(FieldError::new(
                            field,
                            format!("{} is not available for the assignee", calendar.day_of(at)),
                        ));
                    }
                }
            }
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                errors.push(FieldError::new("end_time", "End date is before the start date"));
            }
        }

        errors
    }

    /// Body for creating a task.
    pub fn create_payload(&self, created_by: UserId) -> TaskPayload {
        TaskPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            priority: self.priority,
            status: self.status,
            percentage_completed: self.percentage_completed,
            start_time: self.start_time.map(iso_timestamp),
            end_time: self.end_time.map(iso_timestamp),
            project: self.project,
            assigned_to: self.assigned_to,
            created_by,
        }
    }

    /// Body for updating a task; the assignee is whoever is selected in the
    /// dialog right now.
    pub fn update_payload(&self, created_by: UserId, assignee: Option<UserId>) -> TaskPayload {
        TaskPayload {
            assigned_to: assignee,
            ..self.create_payload(created_by)
        }
    }

    /// Build the request for the dialog's submit button.
    ///
    /// An update without a known task id falls back to creation.
    ///
    /// # Errors
    /// Returns `TaskdeskError::ReadOnlyForm` in view mode.
    pub fn submission(
        &self,
        mode: FormMode,
        created_by: UserId,
        assignee: Option<UserId>,
    ) -> Result<Submission> {
        match (mode, self.id) {
            (FormMode::View, _) => Err(TaskdeskError::ReadOnlyForm),
            (FormMode::Update, Some(id)) => Ok(Submission::Update {
                id,
                payload: self.update_payload(created_by, assignee),
            }),
            _ => Ok(Submission::Create(self.create_payload(created_by))),
        }
    }
}

/// Timestamps go out in UTC with millisecond precision, e.g.
/// `2024-06-10T00:00:00.000Z`.
fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// JSON body sent to the task endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPayload {
    pub name: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub percentage_completed: Option<f64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub project: Option<ProjectId>,
    pub assigned_to: Option<UserId>,
    pub created_by: UserId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(TaskPayload),
    Update { id: TaskId, payload: TaskPayload },
}

impl Submission {
    pub fn payload(&self) -> &TaskPayload {
        match self {
            Submission::Create(payload) | Submission::Update { payload, .. } => payload,
        }
    }
}

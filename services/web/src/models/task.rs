//! Task model and related functionality

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
    /// Soft-deleted; excluded from listings until the sweeper removes the row
    Deleted,
}

impl TaskStatus {
    /// Storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Deleted => "deleted",
        }
    }

    /// Parse the storage representation
    pub fn parse(raw: &str) -> Option<TaskStatus> {
        match raw {
            "pending" => Some(TaskStatus::Pending),
            "completed" => Some(TaskStatus::Completed),
            "deleted" => Some(TaskStatus::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task entity
#[derive(Debug, Clone)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New task creation payload
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Task update payload (edit form)
#[derive(Debug, Clone)]
pub struct UpdateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
}

/// Listing filter. Soft-deleted tasks are excluded whatever the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    /// Interpret the `?status=` query value; anything unrecognized means no
    /// filter
    pub fn from_query(raw: Option<&str>) -> TaskFilter {
        match raw {
            Some("pending") => TaskFilter::Pending,
            Some("completed") => TaskFilter::Completed,
            _ => TaskFilter::All,
        }
    }

    /// The status this filter narrows to, if any
    pub fn status(self) -> Option<TaskStatus> {
        match self {
            TaskFilter::All => None,
            TaskFilter::Pending => Some(TaskStatus::Pending),
            TaskFilter::Completed => Some(TaskStatus::Completed),
        }
    }
}

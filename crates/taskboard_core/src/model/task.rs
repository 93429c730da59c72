//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its draft input and its enum attributes.
//! - Provide label conversions shared by persistence, filters and bindings.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused within a collection.
//! - Enum wire labels match the labels shown to users (`"Collaborative Task"`,
//!   `"Arts and Craft"`), so persisted JSON stays human readable.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
///
/// New ids are UUID v4 strings. Any other non-empty string found in
/// persisted data (older builds used millisecond timestamps) is accepted
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    Ongoing,
    Done,
    #[serde(rename = "Collaborative Task")]
    CollaborativeTask,
}

impl TaskStatus {
    /// All statuses in display order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::Ongoing,
        TaskStatus::Done,
        TaskStatus::CollaborativeTask,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Ongoing => "Ongoing",
            Self::Done => "Done",
            Self::CollaborativeTask => "Collaborative Task",
        }
    }

    /// Parses a display label; returns `None` for unknown input.
    pub fn parse_label(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == value.trim())
    }
}

/// Task category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskCategory {
    #[default]
    #[serde(rename = "Arts and Craft")]
    ArtsAndCraft,
    Nature,
    Family,
    Sport,
    Friends,
    Meditation,
}

impl TaskCategory {
    /// All categories in display order.
    pub const ALL: [TaskCategory; 6] = [
        TaskCategory::ArtsAndCraft,
        TaskCategory::Nature,
        TaskCategory::Family,
        TaskCategory::Sport,
        TaskCategory::Friends,
        TaskCategory::Meditation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ArtsAndCraft => "Arts and Craft",
            Self::Nature => "Nature",
            Self::Family => "Family",
            Self::Sport => "Sport",
            Self::Friends => "Friends",
            Self::Meditation => "Meditation",
        }
    }

    /// Parses a display label; returns `None` for unknown input.
    pub fn parse_label(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == value.trim())
    }
}

/// Task fields supplied by the caller before an id is assigned.
///
/// Field validation (required text, date format) happens in the form layer
/// before a draft reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// Calendar date string, stored verbatim.
    pub date: String,
    pub status: TaskStatus,
    pub category: TaskCategory,
    /// Data-URI image payload.
    pub image: Option<String>,
}

impl TaskDraft {
    /// Creates a draft with default status/category and no image.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Binds this draft to an identifier.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            status: self.status,
            category: self.category,
            image: self.image,
        }
    }
}

/// Canonical task record held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub date: String,
    pub status: TaskStatus,
    pub category: TaskCategory,
    #[serde(default)]
    pub image: Option<String>,
}

/// Status/category filter used by list views.
///
/// `None` on either axis matches every task ("All Task" / "All Categories").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let status_match = self.status.map_or(true, |status| task.status == status);
        let category_match = self
            .category
            .map_or(true, |category| task.category == category);
        status_match && category_match
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskCategory, TaskDraft, TaskFilter, TaskId, TaskStatus};

    #[test]
    fn labels_roundtrip_through_parse() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse_label(status.label()), Some(status));
        }
        for category in TaskCategory::ALL {
            assert_eq!(TaskCategory::parse_label(category.label()), Some(category));
        }
        assert_eq!(TaskStatus::parse_label("Archived"), None);
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }

    #[test]
    fn filter_wildcards_match_everything() {
        let task = TaskDraft::new("walk").into_task(TaskId::from("1"));
        assert!(TaskFilter::default().matches(&task));

        let done_only = TaskFilter {
            status: Some(TaskStatus::Done),
            category: None,
        };
        assert!(!done_only.matches(&task));

        let arts = TaskFilter {
            status: None,
            category: Some(TaskCategory::ArtsAndCraft),
        };
        assert!(arts.matches(&task));
    }
}

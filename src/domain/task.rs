use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a task (UUID v4, never reused)
pub type TaskId = String;

/// A to-do item owned by the task store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// ISO-8601 due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(default)]
    pub completed: bool,

    /// Creation time in epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
}

impl Task {
    /// Parse the due date as a calendar date, accepting both `YYYY-MM-DD` and
    /// full RFC 3339 timestamps
    pub fn due_day(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
    }
}

/// Fields supplied when creating a task; the store assigns id and timestamp
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_task(self) -> Task {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            completed: false,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Partial update merged onto the task with the matching id
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Apply the set fields to `task`
    pub(crate) fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = Some(due_date.clone());
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_json_shape() {
        let task = Task {
            id: "t1".to_string(),
            title: "Write report".to_string(),
            description: None,
            due_date: Some("2026-10-20".to_string()),
            completed: false,
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2026-10-20");
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_due_day_formats() {
        let mut task = NewTask::new("x").with_due_date("2026-10-20").into_task();
        assert_eq!(task.due_day(), NaiveDate::from_ymd_opt(2026, 10, 20));

        task.due_date = Some("2026-10-21T09:30:00Z".to_string());
        assert_eq!(task.due_day(), NaiveDate::from_ymd_opt(2026, 10, 21));

        task.due_date = Some("soon".to_string());
        assert_eq!(task.due_day(), None);
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut task = NewTask::new("old").with_description("keep").into_task();
        TaskPatch::new(task.id.clone()).title("new").apply(&mut task);
        assert_eq!(task.title, "new");
        assert_eq!(task.description.as_deref(), Some("keep"));
        assert!(!task.completed);
    }

    #[test]
    fn test_new_tasks_get_distinct_ids() {
        let a = NewTask::new("a").into_task();
        let b = NewTask::new("a").into_task();
        assert_ne!(a.id, b.id);
        assert!(a.created_at > 0);
    }
}

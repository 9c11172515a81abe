use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    error::FieldError,
    tasks::model::{due_date, NewTask, Task, TaskPatch, TaskPriority, TaskStatus},
};

/// Create/update request body. Enum and date fields arrive as strings so a
/// bad value becomes an itemized field error instead of a body-level reject.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

fn check_common(body: &TaskBody, errors: &mut Vec<FieldError>) -> TaskPatch {
    let mut patch = TaskPatch::default();

    if let Some(title) = &body.title {
        let title = title.trim();
        let len = title.chars().count();
        if len < 1 || len > 100 {
            errors.push(FieldError::new(
                "title",
                "Title is required and cannot exceed 100 characters",
            ));
        } else {
            patch.title = Some(title.to_string());
        }
    }

    if let Some(description) = &body.description {
        let description = description.trim();
        if description.chars().count() > 500 {
            errors.push(FieldError::new(
                "description",
                "Description cannot exceed 500 characters",
            ));
        } else {
            patch.description = Some(description.to_string());
        }
    }

    if let Some(status) = &body.status {
        match TaskStatus::parse(status) {
            Some(s) => patch.status = Some(s),
            None => errors.push(FieldError::new("status", "Invalid status value")),
        }
    }

    if let Some(priority) = &body.priority {
        match TaskPriority::parse(priority) {
            Some(p) => patch.priority = Some(p),
            None => errors.push(FieldError::new("priority", "Invalid priority value")),
        }
    }

    if let Some(raw) = &body.due_date {
        match due_date::parse(raw) {
            Some(d) => patch.due_date = Some(d),
            None => errors.push(FieldError::new("dueDate", "Invalid date format")),
        }
    }

    patch
}

/// Validate a create body: title mandatory, status/priority defaulted.
pub fn validate_create(body: &TaskBody) -> Result<NewTask, Vec<FieldError>> {
    let mut errors = Vec::new();
    if body.title.is_none() {
        errors.push(FieldError::new(
            "title",
            "Title is required and cannot exceed 100 characters",
        ));
    }
    let patch = check_common(body, &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewTask {
        // Checked non-empty above.
        title: patch.title.unwrap_or_default(),
        description: patch.description,
        status: patch.status.unwrap_or_default(),
        priority: patch.priority.unwrap_or_default(),
        due_date: patch.due_date,
    })
}

/// Validate an update body: every field optional, absent fields untouched.
pub fn validate_patch(body: &TaskBody) -> Result<TaskPatch, Vec<FieldError>> {
    let mut errors = Vec::new();
    let patch = check_common(body, &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(patch)
}

/// Wire form of a task. The owner is implicit: tasks only ever travel to the
/// user who owns them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(serialize_with = "due_date::serialize")]
    pub due_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskJson>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: TaskJson,
}

#[derive(Debug, Serialize)]
pub struct TaskMutatedResponse {
    pub message: &'static str,
    pub task: TaskJson,
}

#[derive(Debug, Serialize)]
pub struct TaskDeletedResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn body() -> TaskBody {
        TaskBody {
            title: None,
            description: None,
            status: None,
            priority: None,
            due_date: None,
        }
    }

    #[test]
    fn create_requires_a_title() {
        let errors = validate_create(&body()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn create_defaults_status_and_priority() {
        let mut b = body();
        b.title = Some("Buy milk".into());
        let task = validate_create(&b).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn create_keeps_every_supplied_field() {
        let mut b = body();
        b.title = Some("Ship release".into());
        b.description = Some("cut the branch first".into());
        b.status = Some("in-progress".into());
        b.priority = Some("high".into());
        b.due_date = Some("2026-09-01".into());
        let task = validate_create(&b).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, Some(date!(2026 - 09 - 01)));
    }

    #[test]
    fn title_bounds_and_bad_enums_are_itemized_together() {
        let mut b = body();
        b.title = Some("x".repeat(101));
        b.status = Some("done".into());
        b.priority = Some("urgent".into());
        b.due_date = Some("tomorrow".into());
        let errors = validate_create(&b).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "status", "priority", "dueDate"]);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut b = body();
        b.title = Some("   ".into());
        assert!(validate_create(&b).is_err());
    }

    #[test]
    fn description_cap_is_500() {
        let mut b = body();
        b.title = Some("t".into());
        b.description = Some("d".repeat(500));
        assert!(validate_create(&b).is_ok());
        b.description = Some("d".repeat(501));
        assert!(validate_create(&b).is_err());
    }

    #[test]
    fn patch_accepts_an_empty_body() {
        let patch = validate_patch(&body()).unwrap();
        assert!(patch.title.is_none());
        assert!(patch.status.is_none());
    }

    #[test]
    fn patch_with_only_status_touches_nothing_else() {
        let mut b = body();
        b.status = Some("completed".into());
        let patch = validate_patch(&b).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::Completed));
        assert!(patch.title.is_none());
        assert!(patch.description.is_none());
        assert!(patch.priority.is_none());
        assert!(patch.due_date.is_none());
    }

    #[test]
    fn task_json_serializes_due_date_at_day_granularity() {
        let task = TaskJson {
            id: Uuid::new_v4(),
            title: "Buy Milk".into(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            due_date: Some(date!(2026 - 01 - 05)),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"dueDate\":\"2026-01-05\""));
        assert!(json.contains("\"status\":\"pending\""));
        assert!(json.contains("createdAt"));
    }
}

use serde::Deserialize;
use uuid::Uuid;

use crate::tasks::model::{TaskPriority, TaskStatus};

/// Raw list-endpoint query string, exactly as the client sent it.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Fields the list endpoint may sort on. `sortBy` values are checked against
/// this set; anything else falls back to `CreatedAt` rather than reaching
/// the SQL layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    Title,
    Status,
    Priority,
}

impl SortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" | "created_at" => Some(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Some(SortField::UpdatedAt),
            "dueDate" | "due_date" => Some(SortField::DueDate),
            "title" => Some(SortField::Title),
            "status" => Some(SortField::Status),
            "priority" => Some(SortField::Priority),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// An owner-scoped task query. The only way to build one is
/// [`TaskQuery::from_params`], which takes the owner from the auth gateway;
/// client input can narrow the result set but can never widen it past the
/// owner clause.
#[derive(Debug)]
pub struct TaskQuery {
    owner: Uuid,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    search: Option<String>,
    sort: SortField,
    order: SortOrder,
}

impl TaskQuery {
    pub fn from_params(owner: Uuid, params: &TaskListParams) -> Self {
        // Filter values outside the closed enum sets are dropped, not
        // rejected: `?status=bogus` behaves like no status filter at all.
        let status = params.status.as_deref().and_then(TaskStatus::parse);
        let priority = params.priority.as_deref().and_then(TaskPriority::parse);

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let sort = params
            .sort_by
            .as_deref()
            .and_then(SortField::parse)
            .unwrap_or(SortField::CreatedAt);
        let order = match params.order.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        Self {
            owner,
            status,
            priority,
            search,
            sort,
            order,
        }
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    pub fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// The ORDER BY fragment. Rendered only from the closed field set above,
    /// never from client input. Tasks without a due date sort last in both
    /// directions.
    pub fn order_by_sql(&self) -> &'static str {
        match (self.sort, self.order) {
            (SortField::CreatedAt, SortOrder::Asc) => "created_at ASC",
            (SortField::CreatedAt, SortOrder::Desc) => "created_at DESC",
            (SortField::UpdatedAt, SortOrder::Asc) => "updated_at ASC",
            (SortField::UpdatedAt, SortOrder::Desc) => "updated_at DESC",
            (SortField::DueDate, SortOrder::Asc) => "due_date ASC NULLS LAST",
            (SortField::DueDate, SortOrder::Desc) => "due_date DESC NULLS LAST",
            (SortField::Title, SortOrder::Asc) => "title ASC",
            (SortField::Title, SortOrder::Desc) => "title DESC",
            (SortField::Status, SortOrder::Asc) => "status ASC",
            (SortField::Status, SortOrder::Desc) => "status DESC",
            (SortField::Priority, SortOrder::Asc) => "priority ASC",
            (SortField::Priority, SortOrder::Desc) => "priority DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TaskListParams {
        TaskListParams::default()
    }

    #[test]
    fn defaults_to_newest_first_with_no_filters() {
        let owner = Uuid::new_v4();
        let query = TaskQuery::from_params(owner, &params());
        assert_eq!(query.owner(), owner);
        assert_eq!(query.status(), None);
        assert_eq!(query.priority(), None);
        assert_eq!(query.search(), None);
        assert_eq!(query.order_by_sql(), "created_at DESC");
    }

    #[test]
    fn valid_filters_are_kept() {
        let mut p = params();
        p.status = Some("completed".into());
        p.priority = Some("high".into());
        let query = TaskQuery::from_params(Uuid::new_v4(), &p);
        assert_eq!(query.status(), Some(TaskStatus::Completed));
        assert_eq!(query.priority(), Some(TaskPriority::High));
    }

    #[test]
    fn invalid_filter_values_are_dropped() {
        let mut p = params();
        p.status = Some("bogus".into());
        p.priority = Some("urgent".into());
        let query = TaskQuery::from_params(Uuid::new_v4(), &p);
        assert_eq!(query.status(), None);
        assert_eq!(query.priority(), None);
    }

    #[test]
    fn search_is_trimmed_and_blank_search_is_dropped() {
        let mut p = params();
        p.search = Some("  milk  ".into());
        assert_eq!(
            TaskQuery::from_params(Uuid::new_v4(), &p).search(),
            Some("milk")
        );
        p.search = Some("   ".into());
        assert_eq!(TaskQuery::from_params(Uuid::new_v4(), &p).search(), None);
    }

    #[test]
    fn unknown_sort_field_falls_back_to_created_at() {
        let mut p = params();
        p.sort_by = Some("password_hash".into());
        p.order = Some("asc".into());
        let query = TaskQuery::from_params(Uuid::new_v4(), &p);
        assert_eq!(query.order_by_sql(), "created_at ASC");
    }

    #[test]
    fn due_date_sort_puts_missing_dates_last() {
        let mut p = params();
        p.sort_by = Some("dueDate".into());
        p.order = Some("asc".into());
        let query = TaskQuery::from_params(Uuid::new_v4(), &p);
        assert_eq!(query.order_by_sql(), "due_date ASC NULLS LAST");

        p.order = None;
        let query = TaskQuery::from_params(Uuid::new_v4(), &p);
        assert_eq!(query.order_by_sql(), "due_date DESC NULLS LAST");
    }

    #[test]
    fn snake_case_sort_spellings_are_accepted() {
        let mut p = params();
        p.sort_by = Some("due_date".into());
        let query = TaskQuery::from_params(Uuid::new_v4(), &p);
        assert_eq!(query.order_by_sql(), "due_date DESC NULLS LAST");
    }

    #[test]
    fn order_only_honors_asc() {
        let mut p = params();
        p.order = Some("ascending".into());
        let query = TaskQuery::from_params(Uuid::new_v4(), &p);
        assert_eq!(query.order_by_sql(), "created_at DESC");
    }
}

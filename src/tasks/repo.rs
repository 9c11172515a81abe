use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::StoreError,
    tasks::{
        model::{NewTask, Task, TaskPatch},
        query::TaskQuery,
    },
};

pub async fn create(db: &PgPool, owner: Uuid, task: &NewTask) -> Result<Task, StoreError> {
    sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (user_id, title, description, status, priority, due_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, title, description, status, priority, due_date, created_at, updated_at
        "#,
    )
    .bind(owner)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.due_date)
    .fetch_one(db)
    .await
    .map_err(StoreError::from_sqlx)
}

/// `None` both when the id does not exist and when it belongs to someone
/// else; callers cannot tell the two apart.
pub async fn find_by_id(db: &PgPool, id: Uuid, owner: Uuid) -> Result<Option<Task>, StoreError> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, status, priority, due_date, created_at, updated_at
        FROM tasks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(db)
    .await
    .map_err(StoreError::from_sqlx)
}

/// Overwrite only the supplied fields; `updated_at` bumps on every hit.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    owner: Uuid,
    patch: &TaskPatch,
) -> Result<Option<Task>, StoreError> {
    sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks
        SET title = COALESCE($3, title),
            description = COALESCE($4, description),
            status = COALESCE($5, status),
            priority = COALESCE($6, priority),
            due_date = COALESCE($7, due_date),
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, description, status, priority, due_date, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(patch.status)
    .bind(patch.priority)
    .bind(patch.due_date)
    .fetch_optional(db)
    .await
    .map_err(StoreError::from_sqlx)
}

pub async fn delete(db: &PgPool, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
    let deleted = sqlx::query_scalar::<_, Uuid>(
        r#"
        DELETE FROM tasks
        WHERE id = $1 AND user_id = $2
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(db)
    .await
    .map_err(StoreError::from_sqlx)?;
    Ok(deleted.is_some())
}

/// Run a composed query. Filters arrive as bound parameters; the ORDER BY
/// fragment comes from the composer's closed whitelist.
pub async fn list(db: &PgPool, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
    let sql = format!(
        r#"
        SELECT id, user_id, title, description, status, priority, due_date, created_at, updated_at
        FROM tasks
        WHERE user_id = $1
          AND ($2::task_status IS NULL OR status = $2)
          AND ($3::task_priority IS NULL OR priority = $3)
          AND ($4::text IS NULL
               OR title ILIKE '%' || $4 || '%'
               OR description ILIKE '%' || $4 || '%')
        ORDER BY {}
        "#,
        query.order_by_sql()
    );

    sqlx::query_as::<_, Task>(&sql)
        .bind(query.owner())
        .bind(query.status())
        .bind(query.priority())
        .bind(query.search())
        .fetch_all(db)
        .await
        .map_err(StoreError::from_sqlx)
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    state::AppState,
    tasks::{
        dto::{
            validate_create, validate_patch, TaskBody, TaskDeletedResponse, TaskJson,
            TaskListResponse, TaskMutatedResponse, TaskResponse,
        },
        query::{TaskListParams, TaskQuery},
        repo,
    },
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/:id", get(get_task))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/:id", put(update_task).delete(delete_task))
}

/// Path ids that do not parse as UUIDs cannot name any task, so they answer
/// 404 like any other miss instead of erroring.
fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found"))
}

#[instrument(skip(state, user))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<TaskListParams>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let query = TaskQuery::from_params(user.id, &params);
    let tasks = repo::list(&state.db, &query).await?;
    Ok(Json(TaskListResponse {
        count: tasks.len(),
        tasks: tasks.into_iter().map(TaskJson::from).collect(),
    }))
}

#[instrument(skip(state, user))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_task_id(&id)?;
    let task = repo::find_by_id(&state.db, id, user.id)
        .await?
        .ok_or(ApiError::NotFound("Task not found"))?;
    Ok(Json(TaskResponse { task: task.into() }))
}

#[instrument(skip(state, user, body))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<TaskBody>,
) -> Result<(StatusCode, Json<TaskMutatedResponse>), ApiError> {
    let new_task = validate_create(&body).map_err(ApiError::Validation)?;
    let task = repo::create(&state.db, user.id, &new_task).await?;

    info!(task_id = %task.id, user_id = %user.id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(TaskMutatedResponse {
            message: "Task created successfully",
            task: task.into(),
        }),
    ))
}

#[instrument(skip(state, user, body))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<TaskBody>,
) -> Result<Json<TaskMutatedResponse>, ApiError> {
    let id = parse_task_id(&id)?;
    let patch = validate_patch(&body).map_err(ApiError::Validation)?;

    let task = repo::update(&state.db, id, user.id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Task not found"))?;

    info!(task_id = %task.id, user_id = %user.id, "task updated");
    Ok(Json(TaskMutatedResponse {
        message: "Task updated successfully",
        task: task.into(),
    }))
}

#[instrument(skip(state, user))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TaskDeletedResponse>, ApiError> {
    let id = parse_task_id(&id)?;
    if !repo::delete(&state.db, id, user.id).await? {
        return Err(ApiError::NotFound("Task not found"));
    }

    info!(task_id = %id, user_id = %user.id, "task deleted");
    Ok(Json(TaskDeletedResponse {
        message: "Task deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn malformed_path_id_is_not_found() {
        let err = parse_task_id("definitely-not-a-uuid").unwrap_err();
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn well_formed_path_id_parses() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
    }
}

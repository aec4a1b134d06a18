//! 活动管理的 HTTP 处理器
//!
//! 修改类操作统一按三步执行：校验身份与角色、确认归属、执行写入。
//! 活动不存在与不属于调用者返回同一个 403。

use crate::{
    auth::{policy, RequestContext},
    error::AppError,
    middleware::AppState,
    models::{EventInput, EventRequest},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 列出活动（公开）
pub async fn list_events(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let events = state.events.list().await?;
    Ok(Json(events))
}

/// 获取活动（公开）
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    let event = state.events.find_by_id(id).await?.ok_or(AppError::NotFound)?;

    Ok(Json(event))
}

/// 创建活动（组织者）
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let identity = policy::require_organizer(&ctx)?;
    let Json(req) = body?;
    let input = EventInput::try_from(req)?;

    let id = state.events.create(identity.user_id, &input).await?;

    tracing::info!(event_id = id, organizer_id = identity.user_id, "Event created");

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// 更新活动（组织者且为所有者）
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let identity = policy::require_organizer(&ctx)?;
    let Path(id) = id?;

    let owner = state.events.find_organizer_id(id).await?;
    policy::ensure_owner(identity, owner)?;

    let Json(req) = body?;
    let input = EventInput::try_from(req)?;

    // 归属检查之后被并发删除同样按 403 处理
    let event = state
        .events
        .update(id, &input)
        .await?
        .ok_or(AppError::Forbidden)?;

    tracing::info!(event_id = id, organizer_id = identity.user_id, "Event updated");

    Ok(Json(event))
}

/// 删除活动及其全部预订（组织者且为所有者）
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let identity = policy::require_organizer(&ctx)?;
    let Path(id) = id?;

    let owner = state.events.find_organizer_id(id).await?;
    policy::ensure_owner(identity, owner)?;

    let removed = state.events.delete_with_reservations(id).await?;

    tracing::info!(
        event_id = id,
        organizer_id = identity.user_id,
        reservations_removed = removed,
        "Event deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

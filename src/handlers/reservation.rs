//! 预订的 HTTP 处理器
//!
//! 预订者始终取自调用者身份，请求体中不接受 user_id

use crate::{
    auth::{policy, RequestContext},
    error::AppError,
    middleware::AppState,
    models::CreateReservationRequest,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 列出调用者自己的预订
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let identity = policy::require_identity(&ctx)?;

    let reservations = state.reservations.list_by_user(identity.user_id).await?;

    Ok(Json(reservations))
}

/// 创建预订（任意角色）
///
/// 不检查活动容量；活动不存在时由存储的外键约束拒绝
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    body: Result<Json<CreateReservationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let identity = policy::require_identity(&ctx)?;
    let Json(req) = body?;

    let id = state
        .reservations
        .create(identity.user_id, req.event_id, req.tickets)
        .await?;

    tracing::info!(
        reservation_id = id,
        user_id = identity.user_id,
        event_id = req.event_id,
        tickets = req.tickets,
        "Reservation created"
    );

    Ok((StatusCode::CREATED, Json(json!({ "status": "created" }))))
}

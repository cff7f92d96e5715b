use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::NotificationType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::notification;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::notification::*;
use crate::models::shared::Pagination;
use crate::notify;
use crate::state::AppState;

/// Find a notification owned by the caller or return 404.
async fn find_own<C: ConnectionTrait>(
    db: &C,
    auth: &AuthUser,
    id: i32,
) -> Result<notification::Model, AppError> {
    notification::Entity::find_by_id(id)
        .filter(notification::Column::RecipientId.eq(auth.user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".into()))
}

/// List the caller's notifications.
#[utoipa::path(
    get,
    path = "/",
    tag = "Notifications",
    operation_id = "listNotifications",
    summary = "List notifications",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Notification list", body = NotificationListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_notifications(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut base = notification::Entity::find()
        .filter(notification::Column::RecipientId.eq(auth_user.user_id))
        .filter(notification::Column::Archived.eq(query.archived.unwrap_or(false)));

    if let Some(kind) = query.kind {
        base = base.filter(notification::Column::Kind.eq(kind));
    }
    if query.unread_only.unwrap_or(false) {
        base = base.filter(notification::Column::ReadAt.is_null());
    }

    let total = base.clone().count(&state.db).await?;

    let rows = base
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let total_pages = total.div_ceil(per_page);
    Ok(Json(NotificationListResponse {
        data: rows.into_iter().map(NotificationResponse::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// Unread counter for the bell badge.
#[utoipa::path(
    get,
    path = "/unread-count",
    tag = "Notifications",
    operation_id = "unreadCount",
    summary = "Count unread notifications",
    responses(
        (status = 200, description = "Counter", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn unread_count(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread = notification::Entity::find()
        .filter(notification::Column::RecipientId.eq(auth_user.user_id))
        .filter(notification::Column::ReadAt.is_null())
        .filter(notification::Column::Archived.eq(false))
        .count(&state.db)
        .await?;

    Ok(Json(UnreadCountResponse { unread }))
}

/// Get one notification.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Notifications",
    operation_id = "getNotification",
    summary = "Get a notification",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification", body = NotificationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(notification_id = %id))]
pub async fn get_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<NotificationResponse>, AppError> {
    let n = find_own(&state.db, &auth_user, id).await?;
    Ok(Json(n.into()))
}

/// Mark one notification read.
#[utoipa::path(
    post,
    path = "/{id}/read",
    tag = "Notifications",
    operation_id = "markRead",
    summary = "Mark a notification read",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Updated notification", body = NotificationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(notification_id = %id))]
pub async fn mark_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<NotificationResponse>, AppError> {
    let n = find_own(&state.db, &auth_user, id).await?;

    // Marking twice keeps the original read timestamp.
    if n.read_at.is_some() {
        return Ok(Json(n.into()));
    }

    let mut active: notification::ActiveModel = n.into();
    active.read_at = Set(Some(Utc::now()));
    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

/// Mark all unread notifications read.
#[utoipa::path(
    post,
    path = "/read-all",
    tag = "Notifications",
    operation_id = "markAllRead",
    summary = "Mark all notifications read",
    responses(
        (status = 200, description = "Rows updated", body = AffectedResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_all_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AffectedResponse>, AppError> {
    let result = notification::Entity::update_many()
        .col_expr(
            notification::Column::ReadAt,
            sea_orm::sea_query::Expr::value(Some(Utc::now())),
        )
        .filter(notification::Column::RecipientId.eq(auth_user.user_id))
        .filter(notification::Column::ReadAt.is_null())
        .exec(&state.db)
        .await?;

    Ok(Json(AffectedResponse {
        affected: result.rows_affected,
    }))
}

/// Archive a notification.
#[utoipa::path(
    post,
    path = "/{id}/archive",
    tag = "Notifications",
    operation_id = "archiveNotification",
    summary = "Archive a notification",
    description = "Archived rows drop out of the default list and the unread counter but remain retrievable.",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Updated notification", body = NotificationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(notification_id = %id))]
pub async fn archive_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<NotificationResponse>, AppError> {
    let n = find_own(&state.db, &auth_user, id).await?;

    let mut active: notification::ActiveModel = n.into();
    active.archived = Set(true);
    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

/// Delete one notification.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Notifications",
    operation_id = "deleteNotification",
    summary = "Delete a notification",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(notification_id = %id))]
pub async fn delete_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let n = find_own(&state.db, &auth_user, id).await?;
    notification::Entity::delete_by_id(n.id)
        .exec(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete all of the caller's notifications.
#[utoipa::path(
    delete,
    path = "/clear-all",
    tag = "Notifications",
    operation_id = "clearAllNotifications",
    summary = "Delete all notifications",
    responses(
        (status = 200, description = "Rows deleted", body = AffectedResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn clear_all(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AffectedResponse>, AppError> {
    let result = notification::Entity::delete_many()
        .filter(notification::Column::RecipientId.eq(auth_user.user_id))
        .exec(&state.db)
        .await?;

    Ok(Json(AffectedResponse {
        affected: result.rows_affected,
    }))
}

/// Admin broadcast to an explicit recipient list.
#[utoipa::path(
    post,
    path = "/announce",
    tag = "Notifications",
    operation_id = "announce",
    summary = "Broadcast an announcement",
    request_body = AnnounceRequest,
    responses(
        (status = 201, description = "Rows written", body = AffectedResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(recipients = payload.recipient_ids.len()))]
pub async fn announce(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AnnounceRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_announce(&payload)?;

    let txn = state.db.begin().await?;

    let mut recipients = payload.recipient_ids.clone();
    recipients.sort_unstable();
    recipients.dedup();

    let written = notify::dispatch(
        &txn,
        notify::Event {
            kind: NotificationType::Announcement,
            actor_id: Some(auth_user.user_id),
            ticket_id: None,
            activity_id: None,
            title: &payload.title,
            body: payload.body.as_deref(),
            metadata: serde_json::json!({}),
        },
        &recipients,
    )
    .await?;

    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(AffectedResponse {
            affected: written as u64,
        }),
    ))
}

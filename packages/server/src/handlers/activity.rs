use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::{ActivityType, NotificationType, Visibility};
use sea_orm::*;
use tracing::instrument;

use crate::entity::ticket::{Participant, ParticipantRole};
use crate::entity::{ticket, ticket_activity, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::ticket::{
    check_dealer_access, find_ticket, find_ticket_locked, merge_participants,
    participants_from_json, participants_to_json,
};
use crate::mentions::ResolvedMention;
use crate::models::activity::*;
use crate::models::shared::Pagination;
use crate::notify;
use crate::state::AppState;
use crate::utils::sla;

fn mentions_from_json(value: &serde_json::Value) -> Vec<ResolvedMention> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

async fn build_response<C: ConnectionTrait>(
    db: &C,
    a: ticket_activity::Model,
) -> Result<ActivityResponse, AppError> {
    let author_name = user::Entity::find_by_id(a.author_id)
        .one(db)
        .await?
        .map(|u| u.display_name)
        .unwrap_or_default();

    Ok(ActivityResponse {
        id: a.id,
        ticket_id: a.ticket_id,
        author_id: a.author_id,
        author_name,
        author_role: a.author_role,
        activity_type: a.activity_type,
        visibility: a.visibility,
        content: a.content,
        mentions: mentions_from_json(&a.mentions),
        detail: a.detail,
        edited_at: a.edited_at,
        created_at: a.created_at,
    })
}

/// Find an activity on the given ticket or return 404.
async fn find_activity<C: ConnectionTrait>(
    db: &C,
    ticket_id: i32,
    activity_id: i32,
) -> Result<ticket_activity::Model, AppError> {
    ticket_activity::Entity::find_by_id(activity_id)
        .filter(ticket_activity::Column::TicketId.eq(ticket_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".into()))
}

/// List a ticket's timeline.
#[utoipa::path(
    get,
    path = "/",
    tag = "Activities",
    operation_id = "listActivities",
    summary = "List timeline entries",
    description = "Returns the ticket's timeline in chronological order. Internal entries are filtered out for dealer accounts.",
    params(
        ("id" = i32, Path, description = "Ticket ID"),
        ActivityListQuery,
    ),
    responses(
        (status = 200, description = "Timeline", body = ActivityListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(ticket_id = %id))]
pub async fn list_activities(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<ActivityListResponse>, AppError> {
    let t = find_ticket(&state.db, id).await?;
    check_dealer_access(&auth_user, &t)?;

    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

    let mut base = ticket_activity::Entity::find()
        .filter(ticket_activity::Column::TicketId.eq(t.id));

    if auth_user.is_dealer {
        base = base.filter(ticket_activity::Column::Visibility.eq(Visibility::All));
    }
    if let Some(at) = query.activity_type {
        base = base.filter(ticket_activity::Column::ActivityType.eq(at));
    }

    let total = base.clone().count(&state.db).await?;

    let rows = base
        .order_by_asc(ticket_activity::Column::CreatedAt)
        .order_by_asc(ticket_activity::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        data.push(build_response(&state.db, row).await?);
    }

    let total_pages = total.div_ceil(per_page);
    Ok(Json(ActivityListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// Append a comment to a ticket's timeline.
#[utoipa::path(
    post,
    path = "/",
    tag = "Activities",
    operation_id = "createActivity",
    summary = "Append a comment",
    description = "Appends a comment, resolves `@` mentions, adds the author and mentioned users to the participant list, and notifies mentioned users and other participants. A staff comment stamps the ticket's first response.",
    params(("id" = i32, Path, description = "Ticket ID")),
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Created entry", body = ActivityResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(ticket_id = %id))]
pub async fn create_activity(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_activity(&payload)?;

    let visibility = payload.visibility.unwrap_or(Visibility::All);
    if auth_user.is_dealer && visibility == Visibility::Internal {
        return Err(AppError::Forbidden);
    }

    let txn = state.db.begin().await?;

    let t = find_ticket_locked(&txn, id).await?;
    check_dealer_access(&auth_user, &t)?;

    let mentioned = state.mentions.resolve(&txn, &payload.content).await?;
    let now = Utc::now();

    let entry = ticket_activity::ActiveModel {
        ticket_id: Set(t.id),
        author_id: Set(auth_user.user_id),
        author_role: Set(auth_user.actor_role()),
        activity_type: Set(ActivityType::Comment),
        visibility: Set(visibility),
        content: Set(Some(payload.content)),
        mentions: Set(serde_json::to_value(&mentioned).unwrap_or_default()),
        detail: Set(serde_json::Value::Object(Default::default())),
        edited_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // Audit record of who was tagged, staff-only. Never re-parsed.
    if !mentioned.is_empty() {
        ticket_activity::ActiveModel {
            ticket_id: Set(t.id),
            author_id: Set(auth_user.user_id),
            author_role: Set(auth_user.actor_role()),
            activity_type: Set(ActivityType::Mention),
            visibility: Set(Visibility::Internal),
            content: Set(None),
            mentions: Set(serde_json::Value::Array(vec![])),
            detail: Set(serde_json::json!({
                "comment_id": entry.id,
                "mentioned_users": mentioned,
            })),
            edited_at: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    // The author and everyone mentioned join the watch list.
    let previous = participants_from_json(&t.participants);
    let mut participants = previous.clone();
    merge_participants(
        &mut participants,
        std::iter::once(Participant {
            user_id: auth_user.user_id,
            role: ParticipantRole::Commenter,
            added_at: now,
            added_by: auth_user.user_id,
        })
        .chain(mentioned.iter().map(|m| Participant {
            user_id: m.user_id,
            role: ParticipantRole::Mentioned,
            added_at: now,
            added_by: auth_user.user_id,
        })),
    );

    let mut active: ticket::ActiveModel = t.clone().into();
    active.participants = Set(participants_to_json(&participants));
    if !auth_user.is_dealer && t.first_response_at.is_none() {
        active.first_response_at = Set(Some(now));
        active.first_response_minutes = Set(Some(sla::minutes_between(t.created_at, now)));
    }
    active.updated_at = Set(now);
    active.update(&txn).await?;

    let mention_ids: Vec<i32> = mentioned.iter().map(|p| p.user_id).collect();
    notify::dispatch(
        &txn,
        notify::Event {
            kind: NotificationType::Mention,
            actor_id: Some(auth_user.user_id),
            ticket_id: Some(t.id),
            activity_id: Some(entry.id),
            title: &format!(
                "{} mentioned you on {}",
                auth_user.display_name, t.ticket_number
            ),
            body: entry.content.as_deref(),
            metadata: serde_json::json!({ "ticket_number": t.ticket_number }),
        },
        &mention_ids,
    )
    .await?;

    // Existing participants get a plain new-comment ping; mention rows win
    // over these, and dealers never see internal comments.
    let comment_ids: Vec<i32> = previous
        .iter()
        .map(|p| p.user_id)
        .filter(|uid| !mention_ids.contains(uid))
        .collect();
    let recipients = if visibility == Visibility::Internal {
        let mut kept = Vec::new();
        for uid in comment_ids {
            let is_dealer = user::Entity::find_by_id(uid)
                .one(&txn)
                .await?
                .map(|u| u.is_dealer)
                .unwrap_or(true);
            if !is_dealer {
                kept.push(uid);
            }
        }
        kept
    } else {
        comment_ids
    };

    notify::dispatch(
        &txn,
        notify::Event {
            kind: NotificationType::NewComment,
            actor_id: Some(auth_user.user_id),
            ticket_id: Some(t.id),
            activity_id: Some(entry.id),
            title: &format!(
                "New comment on {} from {}",
                t.ticket_number, auth_user.display_name
            ),
            body: entry.content.as_deref(),
            metadata: serde_json::json!({ "ticket_number": t.ticket_number }),
        },
        &recipients,
    )
    .await?;

    txn.commit().await?;

    let response = build_response(&state.db, entry).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Edit a comment.
#[utoipa::path(
    patch,
    path = "/{activity_id}",
    tag = "Activities",
    operation_id = "updateActivity",
    summary = "Edit a comment",
    description = "Authors may edit their own comments. Server-generated entries are immutable. Newly mentioned users are notified.",
    params(
        ("id" = i32, Path, description = "Ticket ID"),
        ("activity_id" = i32, Path, description = "Activity ID"),
    ),
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Updated entry", body = ActivityResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Activity not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(ticket_id = %id, activity_id = %activity_id))]
pub async fn update_activity(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, activity_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateActivityRequest>,
) -> Result<Json<ActivityResponse>, AppError> {
    validate_update_activity(&payload)?;

    let txn = state.db.begin().await?;

    let t = find_ticket_locked(&txn, id).await?;
    check_dealer_access(&auth_user, &t)?;

    let entry = find_activity(&txn, t.id, activity_id).await?;
    if entry.activity_type != ActivityType::Comment {
        return Err(AppError::Validation(
            "Only comments can be edited".into(),
        ));
    }
    if entry.author_id != auth_user.user_id {
        return Err(AppError::Forbidden);
    }

    let old_mentions = mentions_from_json(&entry.mentions);
    let mentioned = state.mentions.resolve(&txn, &payload.content).await?;
    let now = Utc::now();

    let mut active: ticket_activity::ActiveModel = entry.clone().into();
    active.content = Set(Some(payload.content));
    active.mentions = Set(serde_json::to_value(&mentioned).unwrap_or_default());
    active.edited_at = Set(Some(now));
    let updated = active.update(&txn).await?;

    let mut participants = participants_from_json(&t.participants);
    merge_participants(
        &mut participants,
        mentioned.iter().map(|m| Participant {
            user_id: m.user_id,
            role: ParticipantRole::Mentioned,
            added_at: now,
            added_by: auth_user.user_id,
        }),
    );
    let mut ticket_active: ticket::ActiveModel = t.clone().into();
    ticket_active.participants = Set(participants_to_json(&participants));
    ticket_active.updated_at = Set(now);
    ticket_active.update(&txn).await?;

    let new_ids: Vec<i32> = mentioned
        .iter()
        .map(|p| p.user_id)
        .filter(|uid| !old_mentions.iter().any(|m| m.user_id == *uid))
        .collect();
    notify::dispatch(
        &txn,
        notify::Event {
            kind: NotificationType::Mention,
            actor_id: Some(auth_user.user_id),
            ticket_id: Some(t.id),
            activity_id: Some(updated.id),
            title: &format!(
                "{} mentioned you on {}",
                auth_user.display_name, t.ticket_number
            ),
            body: updated.content.as_deref(),
            metadata: serde_json::json!({ "ticket_number": t.ticket_number }),
        },
        &new_ids,
    )
    .await?;

    txn.commit().await?;

    Ok(Json(build_response(&state.db, updated).await?))
}

/// Delete a comment.
#[utoipa::path(
    delete,
    path = "/{activity_id}",
    tag = "Activities",
    operation_id = "deleteActivity",
    summary = "Delete a comment",
    description = "Authors may delete their own comments; admins may delete any comment. Server-generated entries are immutable.",
    params(
        ("id" = i32, Path, description = "Ticket ID"),
        ("activity_id" = i32, Path, description = "Activity ID"),
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Activity not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(ticket_id = %id, activity_id = %activity_id))]
pub async fn delete_activity(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, activity_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let t = find_ticket_locked(&txn, id).await?;
    check_dealer_access(&auth_user, &t)?;

    let entry = find_activity(&txn, t.id, activity_id).await?;
    if entry.activity_type != ActivityType::Comment {
        return Err(AppError::Validation(
            "Only comments can be deleted".into(),
        ));
    }
    if entry.author_id != auth_user.user_id && !auth_user.is_admin {
        return Err(AppError::Forbidden);
    }

    ticket_activity::Entity::delete_by_id(entry.id)
        .exec(&txn)
        .await?;

    let mut active: ticket::ActiveModel = t.into();
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

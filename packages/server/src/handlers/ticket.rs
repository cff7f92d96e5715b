use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use common::{
    ActivityType, NotificationType, Priority, TicketNode, TicketStatus, TicketType, Visibility,
};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::ticket::{Participant, ParticipantRole};
use crate::entity::{ticket, ticket_activity, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, escape_like};
use crate::models::ticket::*;
use crate::notify;
use crate::sequence::{self, Channel};
use crate::state::AppState;
use crate::utils::sla;

/// Find a ticket by ID or return 404.
pub async fn find_ticket<C: ConnectionTrait>(db: &C, id: i32) -> Result<ticket::Model, AppError> {
    ticket::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))
}

/// Find a ticket and lock its row for the rest of the transaction.
pub async fn find_ticket_locked<C: ConnectionTrait>(
    txn: &C,
    id: i32,
) -> Result<ticket::Model, AppError> {
    ticket::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))
}

/// Dealers only see tickets routed to their own dealer.
pub fn check_dealer_access(auth: &AuthUser, t: &ticket::Model) -> Result<(), AppError> {
    if auth.is_dealer && t.dealer_id != auth.dealer_id {
        // 404 rather than 403 to avoid leaking ticket existence.
        return Err(AppError::NotFound("Ticket not found".into()));
    }
    Ok(())
}

/// Parse the participants JSON column. Rows written before the current shape
/// decode to an empty list instead of failing the request.
pub fn participants_from_json(value: &serde_json::Value) -> Vec<Participant> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

pub fn participants_to_json(list: &[Participant]) -> serde_json::Value {
    serde_json::to_value(list).unwrap_or(serde_json::Value::Array(vec![]))
}

/// Add users to a participant list, deduplicated by user id.
pub fn merge_participants(list: &mut Vec<Participant>, extra: impl IntoIterator<Item = Participant>) {
    for p in extra {
        if !list.iter().any(|e| e.user_id == p.user_id) {
            list.push(p);
        }
    }
}

/// Append a server-generated timeline entry.
pub async fn log_activity<C: ConnectionTrait>(
    txn: &C,
    ticket_id: i32,
    author: &AuthUser,
    activity_type: ActivityType,
    detail: serde_json::Value,
) -> Result<ticket_activity::Model, AppError> {
    let entry = ticket_activity::ActiveModel {
        ticket_id: Set(ticket_id),
        author_id: Set(author.user_id),
        author_role: Set(author.actor_role()),
        activity_type: Set(activity_type),
        visibility: Set(Visibility::All),
        content: Set(None),
        mentions: Set(serde_json::Value::Array(vec![])),
        detail: Set(detail),
        edited_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(entry.insert(txn).await?)
}

/// Everything needed to insert a ticket row; shared by the unified create,
/// the convert operation, and the legacy dealer-repair intake.
pub struct NewTicket {
    pub ticket_type: TicketType,
    pub channel: Channel,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub account_id: Option<i32>,
    pub reporter_name: Option<String>,
    pub dealer_id: Option<i32>,
    pub parent_ticket_id: Option<i32>,
}

/// Allocate a number and insert the ticket at its type's initial node,
/// with the creator as first participant and a system timeline entry.
pub async fn insert_ticket<C: ConnectionTrait>(
    txn: &C,
    auth: &AuthUser,
    new: NewTicket,
) -> Result<ticket::Model, AppError> {
    let now = Utc::now();
    let number = sequence::next_number(txn, new.ticket_type, new.channel, now).await?;
    let node = TicketNode::initial(new.ticket_type);

    let participants = vec![Participant {
        user_id: auth.user_id,
        role: ParticipantRole::Creator,
        added_at: now,
        added_by: auth.user_id,
    }];

    let model = ticket::ActiveModel {
        ticket_number: Set(number),
        ticket_type: Set(new.ticket_type),
        current_node: Set(node),
        status: Set(node.summary_status()),
        priority: Set(new.priority),
        title: Set(new.title.trim().to_string()),
        description: Set(new.description),
        account_id: Set(new.account_id),
        reporter_name: Set(new.reporter_name),
        dealer_id: Set(new.dealer_id),
        parent_ticket_id: Set(new.parent_ticket_id),
        assigned_to: Set(None),
        created_by: Set(auth.user_id),
        participants: Set(participants_to_json(&participants)),
        first_response_at: Set(None),
        first_response_minutes: Set(None),
        closed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    log_activity(
        txn,
        model.id,
        auth,
        ActivityType::System,
        serde_json::json!({ "event": "created", "node": node }),
    )
    .await?;

    Ok(model)
}

/// Build the full response shape, resolving the assignee name.
pub async fn build_ticket_response<C: ConnectionTrait>(
    db: &C,
    t: ticket::Model,
) -> Result<TicketResponse, AppError> {
    let assignee_name = match t.assigned_to {
        Some(uid) => user::Entity::find_by_id(uid)
            .one(db)
            .await?
            .map(|u| u.display_name),
        None => None,
    };

    let now = Utc::now();
    let sla = sla::current(t.current_node, t.created_at, t.first_response_at, t.priority, now);

    Ok(TicketResponse {
        id: t.id,
        ticket_number: t.ticket_number,
        ticket_type: t.ticket_type,
        current_node: t.current_node,
        status: t.status,
        priority: t.priority,
        title: t.title,
        description: t.description,
        account_id: t.account_id,
        reporter_name: t.reporter_name,
        dealer_id: t.dealer_id,
        parent_ticket_id: t.parent_ticket_id,
        assigned_to: t.assigned_to,
        assignee_name,
        created_by: t.created_by,
        participants: participants_from_json(&t.participants),
        sla,
        first_response_at: t.first_response_at,
        first_response_minutes: t.first_response_minutes,
        closed_at: t.closed_at,
        created_at: t.created_at,
        updated_at: t.updated_at,
    })
}

fn list_item(t: ticket::Model, now: DateTime<Utc>) -> TicketListItem {
    let sla = sla::current(t.current_node, t.created_at, t.first_response_at, t.priority, now);
    TicketListItem {
        id: t.id,
        ticket_number: t.ticket_number,
        ticket_type: t.ticket_type,
        current_node: t.current_node,
        status: t.status,
        priority: t.priority,
        title: t.title,
        assigned_to: t.assigned_to,
        dealer_id: t.dealer_id,
        sla,
        created_at: t.created_at,
        updated_at: t.updated_at,
    }
}

/// Create a ticket.
#[utoipa::path(
    post,
    path = "/",
    tag = "Tickets",
    operation_id = "createTicket",
    summary = "Create a ticket",
    description = "Creates a ticket of the given type at its initial lifecycle node and allocates its human-readable number. Dealer accounts may only file tickets for their own dealer.",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(ticket_type = %payload.ticket_type))]
pub async fn create_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_ticket(&payload, auth_user.is_dealer, auth_user.dealer_id)?;

    let dealer_id = if auth_user.is_dealer {
        // Dealers cannot file on behalf of other dealers.
        auth_user.dealer_id
    } else {
        payload.dealer_id
    };

    let channel = if auth_user.is_dealer || dealer_id.is_some() {
        Channel::Dealer
    } else {
        Channel::Customer
    };

    if let Some(parent_id) = payload.parent_ticket_id {
        let parent = find_ticket(&state.db, parent_id).await?;
        check_dealer_access(&auth_user, &parent)?;
    }

    let txn = state.db.begin().await?;

    let model = insert_ticket(
        &txn,
        &auth_user,
        NewTicket {
            ticket_type: payload.ticket_type,
            channel,
            title: payload.title,
            description: payload.description,
            priority: payload.priority.unwrap_or(Priority::P2),
            account_id: payload.account_id,
            reporter_name: payload.reporter_name,
            dealer_id,
            parent_ticket_id: payload.parent_ticket_id,
        },
    )
    .await?;

    txn.commit().await?;

    let response = build_ticket_response(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List tickets.
#[utoipa::path(
    get,
    path = "/",
    tag = "Tickets",
    operation_id = "listTickets",
    summary = "List tickets",
    description = "Returns a paginated ticket list. Dealer accounts only see tickets routed to their dealer.",
    params(TicketListQuery),
    responses(
        (status = 200, description = "Ticket list", body = TicketListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_tickets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<TicketListResponse>, AppError> {
    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut base = ticket::Entity::find();

    if auth_user.is_dealer {
        base = base.filter(ticket::Column::DealerId.eq(auth_user.dealer_id));
    } else if let Some(did) = query.dealer_id {
        base = base.filter(ticket::Column::DealerId.eq(did));
    }

    if let Some(tt) = query.ticket_type {
        base = base.filter(ticket::Column::TicketType.eq(tt));
    }
    if let Some(status) = query.status {
        base = base.filter(ticket::Column::Status.eq(status));
    }
    if let Some(node) = query.node {
        base = base.filter(ticket::Column::CurrentNode.eq(node));
    }
    if let Some(priority) = query.priority {
        base = base.filter(ticket::Column::Priority.eq(priority));
    }
    if let Some(uid) = query.assigned_to {
        base = base.filter(ticket::Column::AssignedTo.eq(uid));
    }
    if let Some(aid) = query.account_id {
        base = base.filter(ticket::Column::AccountId.eq(aid));
    }
    if let Some(ref q) = query.q {
        let q = q.trim();
        if !q.is_empty() {
            base = base.filter(ticket::Column::Title.like(format!("%{}%", escape_like(q))));
        }
    }

    let total = base.clone().count(&state.db).await?;

    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let select = match query.sort_by.as_deref().unwrap_or("created_at") {
        "updated_at" => base.order_by(ticket::Column::UpdatedAt, sort_order),
        "priority" => base.order_by(ticket::Column::Priority, sort_order),
        _ => base.order_by(ticket::Column::CreatedAt, sort_order),
    };

    let rows = select
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let now = Utc::now();
    let data = rows.into_iter().map(|t| list_item(t, now)).collect();
    let total_pages = total.div_ceil(per_page);

    Ok(Json(TicketListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// Get a single ticket.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tickets",
    operation_id = "getTicket",
    summary = "Get ticket details",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket details", body = TicketResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(ticket_id = %id))]
pub async fn get_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TicketResponse>, AppError> {
    let t = find_ticket(&state.db, id).await?;
    check_dealer_access(&auth_user, &t)?;
    Ok(Json(build_ticket_response(&state.db, t).await?))
}

/// Update a ticket: lifecycle node, priority, assignee, title, description.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Tickets",
    operation_id = "updateTicket",
    summary = "Update a ticket",
    description = "Applies field updates and, when `node` is present, drives the per-type state machine. Illegal transitions are rejected with VALIDATION_ERROR and nothing is persisted.",
    params(("id" = i32, Path, description = "Ticket ID")),
    request_body = UpdateTicketRequest,
    responses(
        (status = 200, description = "Updated ticket", body = TicketResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(ticket_id = %id))]
pub async fn update_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTicketRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    validate_update_ticket(&payload)?;

    // Field edits other than the node transition are staff-only.
    if auth_user.is_dealer
        && (payload.priority.is_some()
            || payload.title.is_some()
            || payload.description.is_some()
            || payload.assigned_to.is_some())
    {
        return Err(AppError::Forbidden);
    }

    let txn = state.db.begin().await?;

    let t = find_ticket_locked(&txn, id).await?;
    check_dealer_access(&auth_user, &t)?;

    // Terminal tickets are frozen; no field on them may change.
    if t.current_node.is_terminal() {
        return Err(AppError::Validation(format!(
            "Ticket at {} can no longer be updated",
            t.current_node
        )));
    }

    let now = Utc::now();
    let mut active: ticket::ActiveModel = t.clone().into();

    if let Some(target) = payload.node {
        // The convert operation owns this terminal; it creates and links the
        // child ticket before moving the inquiry there.
        if target == TicketNode::Converted {
            return Err(AppError::Validation(
                "Inquiries reach converted only through conversion".into(),
            ));
        }
        if !t.current_node.can_transition(t.ticket_type, target) {
            return Err(AppError::Validation(format!(
                "Illegal transition {} -> {} for {} tickets",
                t.current_node, target, t.ticket_type
            )));
        }

        active.current_node = Set(target);
        active.status = Set(target.summary_status());
        if target.is_terminal() {
            active.closed_at = Set(Some(now));
        }

        log_activity(
            &txn,
            t.id,
            &auth_user,
            ActivityType::StatusChange,
            serde_json::json!({ "from": t.current_node, "to": target }),
        )
        .await?;

        if let Some(assignee) = t.assigned_to {
            notify::dispatch(
                &txn,
                notify::Event {
                    kind: NotificationType::StatusChange,
                    actor_id: Some(auth_user.user_id),
                    ticket_id: Some(t.id),
                    activity_id: None,
                    title: &format!("{} moved to {}", t.ticket_number, target),
                    body: None,
                    metadata: serde_json::json!({
                        "ticket_number": t.ticket_number,
                        "from": t.current_node,
                        "to": target,
                    }),
                },
                &[assignee],
            )
            .await?;
        }
    }

    if let Some(priority) = payload.priority
        && priority != t.priority
    {
        active.priority = Set(priority);
        log_activity(
            &txn,
            t.id,
            &auth_user,
            ActivityType::PriorityChange,
            serde_json::json!({ "from": t.priority, "to": priority }),
        )
        .await?;
    }

    if let Some(assigned) = payload.assigned_to
        && assigned != t.assigned_to
    {
        if let Some(uid) = assigned {
            let assignee = user::Entity::find_by_id(uid)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::Validation("Assignee does not exist".into()))?;

            let mut participants = participants_from_json(&t.participants);
            merge_participants(
                &mut participants,
                [Participant {
                    user_id: assignee.id,
                    role: ParticipantRole::Assignee,
                    added_at: now,
                    added_by: auth_user.user_id,
                }],
            );
            active.participants = Set(participants_to_json(&participants));

            notify::dispatch(
                &txn,
                notify::Event {
                    kind: NotificationType::Assignment,
                    actor_id: Some(auth_user.user_id),
                    ticket_id: Some(t.id),
                    activity_id: None,
                    title: &format!("{} assigned to you", t.ticket_number),
                    body: None,
                    metadata: serde_json::json!({ "ticket_number": t.ticket_number }),
                },
                &[uid],
            )
            .await?;
        }

        active.assigned_to = Set(assigned);
        log_activity(
            &txn,
            t.id,
            &auth_user,
            ActivityType::Assignment,
            serde_json::json!({ "from": t.assigned_to, "to": assigned }),
        )
        .await?;
    }

    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }

    // Any staff-authored action counts as the first response.
    if !auth_user.is_dealer && t.first_response_at.is_none() {
        active.first_response_at = Set(Some(now));
        active.first_response_minutes = Set(Some(sla::minutes_between(t.created_at, now)));
    }

    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(build_ticket_response(&state.db, updated).await?))
}

/// Escalate an inquiry into an RMA or SVC ticket.
#[utoipa::path(
    post,
    path = "/{id}/convert",
    tag = "Tickets",
    operation_id = "convertTicket",
    summary = "Convert an inquiry",
    description = "Creates a child RMA or SVC ticket carrying the inquiry's customer context, links the two, and moves the inquiry to its terminal `converted` node. All-or-nothing.",
    params(("id" = i32, Path, description = "Inquiry ticket ID")),
    request_body = ConvertTicketRequest,
    responses(
        (status = 201, description = "Child ticket", body = TicketResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(ticket_id = %id, target = %payload.target_type))]
pub async fn convert_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ConvertTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_staff()?;
    validate_convert_ticket(&payload)?;

    let txn = state.db.begin().await?;

    let parent = find_ticket_locked(&txn, id).await?;
    if parent.ticket_type != TicketType::Inquiry {
        return Err(AppError::Validation(
            "Only inquiry tickets can be converted".into(),
        ));
    }
    if !parent
        .current_node
        .can_transition(TicketType::Inquiry, TicketNode::Converted)
    {
        return Err(AppError::Validation(format!(
            "Inquiry at {} can no longer be converted",
            parent.current_node
        )));
    }

    let channel = if payload.dealer_id.is_some() {
        Channel::Dealer
    } else {
        Channel::Customer
    };

    let child = insert_ticket(
        &txn,
        &auth_user,
        NewTicket {
            ticket_type: payload.target_type,
            channel,
            title: parent.title.clone(),
            description: parent.description.clone(),
            priority: parent.priority,
            account_id: parent.account_id,
            reporter_name: parent.reporter_name.clone(),
            dealer_id: payload.dealer_id,
            parent_ticket_id: Some(parent.id),
        },
    )
    .await?;

    log_activity(
        &txn,
        parent.id,
        &auth_user,
        ActivityType::TicketLinked,
        serde_json::json!({
            "child_id": child.id,
            "child_number": child.ticket_number,
            "target_type": payload.target_type,
        }),
    )
    .await?;

    let now = Utc::now();
    let mut active: ticket::ActiveModel = parent.clone().into();
    active.current_node = Set(TicketNode::Converted);
    active.status = Set(TicketNode::Converted.summary_status());
    active.closed_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&txn).await?;

    log_activity(
        &txn,
        parent.id,
        &auth_user,
        ActivityType::StatusChange,
        serde_json::json!({ "from": parent.current_node, "to": TicketNode::Converted }),
    )
    .await?;

    if let Some(assignee) = parent.assigned_to {
        notify::dispatch(
            &txn,
            notify::Event {
                kind: NotificationType::StatusChange,
                actor_id: Some(auth_user.user_id),
                ticket_id: Some(parent.id),
                activity_id: None,
                title: &format!(
                    "{} was converted to {}",
                    parent.ticket_number, child.ticket_number
                ),
                body: None,
                metadata: serde_json::json!({
                    "ticket_number": parent.ticket_number,
                    "child_number": child.ticket_number,
                }),
            },
            &[assignee],
        )
        .await?;
    }

    txn.commit().await?;

    let response = build_ticket_response(&state.db, child).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Aggregate ticket counters.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Tickets",
    operation_id = "ticketStats",
    summary = "Ticket statistics",
    responses(
        (status = 200, description = "Counters", body = TicketStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn ticket_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<TicketStatsResponse>, AppError> {
    auth_user.require_staff()?;

    let mut stats = TicketStatsResponse::default();

    let by_status: Vec<(TicketStatus, i64)> = ticket::Entity::find()
        .select_only()
        .column(ticket::Column::Status)
        .column_as(ticket::Column::Id.count(), "count")
        .group_by(ticket::Column::Status)
        .into_tuple()
        .all(&state.db)
        .await?;
    for (status, count) in by_status {
        stats.total += count as u64;
        stats.by_status.bump(status, count as u64);
    }

    let by_priority: Vec<(Priority, i64)> = ticket::Entity::find()
        .select_only()
        .column(ticket::Column::Priority)
        .column_as(ticket::Column::Id.count(), "count")
        .group_by(ticket::Column::Priority)
        .into_tuple()
        .all(&state.db)
        .await?;
    for (priority, count) in by_priority {
        match priority {
            Priority::P0 => stats.p0 += count as u64,
            Priority::P1 => stats.p1 += count as u64,
            Priority::P2 => stats.p2 += count as u64,
        }
    }

    // SLA health needs per-ticket evaluation; only active tickets qualify.
    let active: Vec<(TicketNode, Priority, DateTime<Utc>, Option<DateTime<Utc>>)> =
        ticket::Entity::find()
            .filter(ticket::Column::Status.is_in([
                TicketStatus::Open,
                TicketStatus::InProgress,
                TicketStatus::Waiting,
            ]))
            .select_only()
            .column(ticket::Column::CurrentNode)
            .column(ticket::Column::Priority)
            .column(ticket::Column::CreatedAt)
            .column(ticket::Column::FirstResponseAt)
            .into_tuple()
            .all(&state.db)
            .await?;

    let now = Utc::now();
    stats.sla_breached = active
        .into_iter()
        .filter_map(|(node, priority, created, first)| {
            sla::current(node, created, first, priority, now)
        })
        .filter(|s| s.status == common::SlaStatus::Breached)
        .count() as u64;

    Ok(Json(stats))
}

/// Per-type status breakdown.
#[utoipa::path(
    get,
    path = "/summary",
    tag = "Tickets",
    operation_id = "ticketSummary",
    summary = "Per-type status summary",
    responses(
        (status = 200, description = "Summary", body = SummaryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn ticket_summary(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, AppError> {
    auth_user.require_staff()?;

    let rows: Vec<(TicketType, TicketStatus, i64)> = ticket::Entity::find()
        .select_only()
        .column(ticket::Column::TicketType)
        .column(ticket::Column::Status)
        .column_as(ticket::Column::Id.count(), "count")
        .group_by(ticket::Column::TicketType)
        .group_by(ticket::Column::Status)
        .into_tuple()
        .all(&state.db)
        .await?;

    let mut summary = SummaryResponse::default();
    for (tt, status, count) in rows {
        let bucket = match tt {
            TicketType::Inquiry => &mut summary.inquiry,
            TicketType::Rma => &mut summary.rma,
            TicketType::Svc => &mut summary.svc,
        };
        bucket.bump(status, count as u64);
    }

    Ok(Json(summary))
}

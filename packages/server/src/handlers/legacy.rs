use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::TicketType;
use common::legacy::nodes_for_legacy_status;
use sea_orm::*;
use tracing::instrument;

use crate::entity::ticket;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::ticket::{NewTicket, check_dealer_access, insert_ticket};
use crate::models::legacy::*;
use crate::models::shared::Pagination;
use crate::sequence::Channel;
use crate::state::AppState;

/// Build the filtered base query shared by all three legacy list endpoints.
///
/// Unknown status labels match nothing rather than erroring; old clients
/// send labels we no longer produce.
fn legacy_select(
    auth: &AuthUser,
    ticket_type: TicketType,
    query: &LegacyListQuery,
) -> Select<ticket::Entity> {
    let mut base = ticket::Entity::find().filter(ticket::Column::TicketType.eq(ticket_type));

    if auth.is_dealer {
        base = base.filter(ticket::Column::DealerId.eq(auth.dealer_id));
    } else if let Some(did) = query.dealer_id {
        base = base.filter(ticket::Column::DealerId.eq(did));
    }

    if let Some(cid) = query.customer_id {
        base = base.filter(ticket::Column::AccountId.eq(cid));
    }
    if let Some(ref label) = query.status {
        let nodes = nodes_for_legacy_status(ticket_type, label);
        base = base.filter(ticket::Column::CurrentNode.is_in(nodes));
    }

    base
}

async fn page_of(
    db: &DatabaseConnection,
    base: Select<ticket::Entity>,
    query: &LegacyListQuery,
) -> Result<(Vec<ticket::Model>, Pagination), AppError> {
    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let total = base.clone().count(db).await?;
    let rows = base
        .order_by_desc(ticket::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(db)
        .await?;

    Ok((
        rows,
        Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    ))
}

async fn find_typed(
    db: &DatabaseConnection,
    auth: &AuthUser,
    ticket_type: TicketType,
    id: i32,
) -> Result<ticket::Model, AppError> {
    let t = ticket::Entity::find_by_id(id)
        .filter(ticket::Column::TicketType.eq(ticket_type))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;
    check_dealer_access(auth, &t)?;
    Ok(t)
}

/// List inquiry tickets in the legacy vocabulary.
#[utoipa::path(
    get,
    path = "/inquiry-tickets",
    tag = "Legacy",
    operation_id = "listLegacyInquiries",
    summary = "List inquiries (legacy shape)",
    params(LegacyListQuery),
    responses(
        (status = 200, description = "Inquiry list", body = LegacyInquiryListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_inquiries(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LegacyListQuery>,
) -> Result<Json<LegacyInquiryListResponse>, AppError> {
    let base = legacy_select(&auth_user, TicketType::Inquiry, &query);
    let (rows, pagination) = page_of(&state.db, base, &query).await?;
    Ok(Json(LegacyInquiryListResponse {
        data: rows.into_iter().map(LegacyInquiry::from).collect(),
        pagination,
    }))
}

/// Get one inquiry ticket in the legacy vocabulary.
#[utoipa::path(
    get,
    path = "/inquiry-tickets/{id}",
    tag = "Legacy",
    operation_id = "getLegacyInquiry",
    summary = "Get an inquiry (legacy shape)",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Inquiry", body = LegacyInquiry),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(ticket_id = %id))]
pub async fn get_inquiry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LegacyInquiry>, AppError> {
    let t = find_typed(&state.db, &auth_user, TicketType::Inquiry, id).await?;
    Ok(Json(t.into()))
}

/// Create an inquiry through the legacy intake.
#[utoipa::path(
    post,
    path = "/inquiry-tickets",
    tag = "Legacy",
    operation_id = "createLegacyInquiry",
    summary = "Create an inquiry (legacy shape)",
    description = "Accepts the pre-unification request shape and files a unified inquiry ticket at its initial node.",
    request_body = CreateInquiryRequest,
    responses(
        (status = 201, description = "Inquiry", body = LegacyInquiry),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_inquiry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateInquiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_inquiry(&payload)?;

    let txn = state.db.begin().await?;

    let model = insert_ticket(
        &txn,
        &auth_user,
        NewTicket {
            ticket_type: TicketType::Inquiry,
            channel: Channel::Customer,
            title: payload.title,
            description: payload.description,
            priority: grade_to_priority(payload.priority.as_deref()),
            account_id: payload.customer_id,
            reporter_name: payload.customer_name,
            dealer_id: None,
            parent_ticket_id: None,
        },
    )
    .await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(LegacyInquiry::from(model))))
}

/// List RMA tickets in the legacy vocabulary.
#[utoipa::path(
    get,
    path = "/rma-tickets",
    tag = "Legacy",
    operation_id = "listLegacyRmas",
    summary = "List RMAs (legacy shape)",
    params(LegacyListQuery),
    responses(
        (status = 200, description = "RMA list", body = LegacyRmaListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_rmas(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LegacyListQuery>,
) -> Result<Json<LegacyRmaListResponse>, AppError> {
    let base = legacy_select(&auth_user, TicketType::Rma, &query);
    let (rows, pagination) = page_of(&state.db, base, &query).await?;
    Ok(Json(LegacyRmaListResponse {
        data: rows.into_iter().map(LegacyRma::from).collect(),
        pagination,
    }))
}

/// Get one RMA ticket in the legacy vocabulary.
#[utoipa::path(
    get,
    path = "/rma-tickets/{id}",
    tag = "Legacy",
    operation_id = "getLegacyRma",
    summary = "Get an RMA (legacy shape)",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "RMA", body = LegacyRma),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(ticket_id = %id))]
pub async fn get_rma(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LegacyRma>, AppError> {
    let t = find_typed(&state.db, &auth_user, TicketType::Rma, id).await?;
    Ok(Json(t.into()))
}

/// Create an RMA through the legacy intake.
#[utoipa::path(
    post,
    path = "/rma-tickets",
    tag = "Legacy",
    operation_id = "createLegacyRma",
    summary = "Create an RMA (legacy shape)",
    description = "Accepts the pre-unification request shape, translates the R-grade priority, and files a unified RMA ticket. A dealer_id selects the dealer channel code in the ticket number.",
    request_body = CreateRmaRequest,
    responses(
        (status = 201, description = "RMA", body = LegacyRma),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_rma(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRmaRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_rma(&payload)?;

    let dealer_id = if auth_user.is_dealer {
        auth_user.dealer_id
    } else {
        payload.dealer_id
    };
    let channel = if dealer_id.is_some() {
        Channel::Dealer
    } else {
        Channel::Customer
    };

    let txn = state.db.begin().await?;

    let model = insert_ticket(
        &txn,
        &auth_user,
        NewTicket {
            ticket_type: TicketType::Rma,
            channel,
            title: payload.title,
            description: payload.description,
            priority: grade_to_priority(payload.repair_priority.as_deref()),
            account_id: payload.customer_id,
            reporter_name: None,
            dealer_id,
            parent_ticket_id: payload.inquiry_ticket_id,
        },
    )
    .await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(LegacyRma::from(model))))
}

/// List dealer repairs in the legacy vocabulary.
#[utoipa::path(
    get,
    path = "/dealer-repairs",
    tag = "Legacy",
    operation_id = "listLegacyDealerRepairs",
    summary = "List dealer repairs (legacy shape)",
    params(LegacyListQuery),
    responses(
        (status = 200, description = "Dealer repair list", body = LegacyDealerRepairListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_dealer_repairs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LegacyListQuery>,
) -> Result<Json<LegacyDealerRepairListResponse>, AppError> {
    let base = legacy_select(&auth_user, TicketType::Svc, &query);
    let (rows, pagination) = page_of(&state.db, base, &query).await?;
    Ok(Json(LegacyDealerRepairListResponse {
        data: rows.into_iter().map(LegacyDealerRepair::from).collect(),
        pagination,
    }))
}

/// Get one dealer repair in the legacy vocabulary.
#[utoipa::path(
    get,
    path = "/dealer-repairs/{id}",
    tag = "Legacy",
    operation_id = "getLegacyDealerRepair",
    summary = "Get a dealer repair (legacy shape)",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Dealer repair", body = LegacyDealerRepair),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(ticket_id = %id))]
pub async fn get_dealer_repair(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LegacyDealerRepair>, AppError> {
    let t = find_typed(&state.db, &auth_user, TicketType::Svc, id).await?;
    Ok(Json(t.into()))
}

/// Create a dealer repair through the legacy intake.
#[utoipa::path(
    post,
    path = "/dealer-repairs",
    tag = "Legacy",
    operation_id = "createLegacyDealerRepair",
    summary = "Create a dealer repair (legacy shape)",
    description = "Accepts the pre-unification request shape, translates the R-grade priority, and files a unified SVC ticket.",
    request_body = CreateDealerRepairRequest,
    responses(
        (status = 201, description = "Dealer repair", body = LegacyDealerRepair),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_dealer_repair(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateDealerRepairRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_dealer_repair(&payload, auth_user.dealer_id)?;

    let dealer_id = if auth_user.is_dealer {
        auth_user.dealer_id
    } else {
        payload.dealer_id
    };

    let txn = state.db.begin().await?;

    let model = insert_ticket(
        &txn,
        &auth_user,
        NewTicket {
            ticket_type: TicketType::Svc,
            channel: Channel::Dealer,
            title: payload.title,
            description: payload.description,
            priority: grade_to_priority(payload.priority.as_deref()),
            account_id: payload.customer_id,
            reporter_name: payload.customer_name,
            dealer_id,
            parent_ticket_id: payload.inquiry_ticket_id,
        },
    )
    .await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(LegacyDealerRepair::from(model))))
}

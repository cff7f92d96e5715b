use chrono::{DateTime, Utc};
use common::{Priority, TicketNode, TicketStatus, TicketType};
use serde::{Deserialize, Serialize};

use crate::entity::ticket::Participant;
use crate::error::AppError;
use crate::models::shared::{Pagination, double_option, validate_body, validate_title};
use crate::utils::sla::SlaState;

/// Request body for creating a ticket.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTicketRequest {
    pub ticket_type: TicketType,
    /// Short summary (1-256 characters).
    #[schema(example = "Projector powers off under load")]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to P2 when omitted.
    pub priority: Option<Priority>,
    /// Customer account the ticket belongs to.
    pub account_id: Option<i32>,
    /// Free-text reporter name from intake forms.
    #[schema(example = "J. Mercer")]
    pub reporter_name: Option<String>,
    /// Dealer handling the ticket. Required for SVC tickets filed by staff;
    /// dealer callers default to their own dealer.
    pub dealer_id: Option<i32>,
    /// Source ticket when filing an escalation by hand.
    pub parent_ticket_id: Option<i32>,
}

pub fn validate_create_ticket(payload: &CreateTicketRequest, caller_is_dealer: bool, caller_dealer_id: Option<i32>) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if let Some(desc) = &payload.description {
        validate_body(desc, "Description")?;
    }
    if payload.ticket_type == TicketType::Svc
        && payload.dealer_id.is_none()
        && (!caller_is_dealer || caller_dealer_id.is_none())
    {
        return Err(AppError::Validation(
            "SVC tickets require a dealer_id".into(),
        ));
    }
    Ok(())
}

/// PATCH body for a ticket. All fields optional; `node` drives the state
/// machine and is validated against the per-type transition table.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateTicketRequest {
    /// Target lifecycle node.
    pub node: Option<TicketNode>,
    pub priority: Option<Priority>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// Assignee user id; explicit `null` unassigns.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub assigned_to: Option<Option<i32>>,
}

pub fn validate_update_ticket(payload: &UpdateTicketRequest) -> Result<(), AppError> {
    if payload.node.is_none()
        && payload.priority.is_none()
        && payload.title.is_none()
        && payload.description.is_none()
        && payload.assigned_to.is_none()
    {
        return Err(AppError::Validation("No fields to update".into()));
    }
    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(Some(desc)) = &payload.description {
        validate_body(desc, "Description")?;
    }
    Ok(())
}

/// Request body for escalating an inquiry into an RMA or SVC ticket.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ConvertTicketRequest {
    /// Must be `rma` or `svc`.
    pub target_type: TicketType,
    /// Dealer to hand the child ticket to. Required for SVC targets.
    pub dealer_id: Option<i32>,
}

pub fn validate_convert_ticket(payload: &ConvertTicketRequest) -> Result<(), AppError> {
    if payload.target_type == TicketType::Inquiry {
        return Err(AppError::Validation(
            "Tickets can only be converted to rma or svc".into(),
        ));
    }
    if payload.target_type == TicketType::Svc && payload.dealer_id.is_none() {
        return Err(AppError::Validation(
            "Converting to svc requires a dealer_id".into(),
        ));
    }
    Ok(())
}

/// Query parameters for listing tickets.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct TicketListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub ticket_type: Option<TicketType>,
    pub status: Option<TicketStatus>,
    pub node: Option<TicketNode>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<i32>,
    pub account_id: Option<i32>,
    pub dealer_id: Option<i32>,
    /// Substring match on title.
    pub q: Option<String>,
    /// `created_at` (default), `updated_at`, or `priority`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

/// Full ticket representation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TicketResponse {
    pub id: i32,
    #[schema(example = "K2508-0042")]
    pub ticket_number: String,
    pub ticket_type: TicketType,
    pub current_node: TicketNode,
    pub status: TicketStatus,
    pub priority: Priority,
    pub title: String,
    pub description: Option<String>,
    pub account_id: Option<i32>,
    pub reporter_name: Option<String>,
    pub dealer_id: Option<i32>,
    pub parent_ticket_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub assignee_name: Option<String>,
    pub created_by: i32,
    pub participants: Vec<Participant>,
    /// The SLA clock currently running, if any.
    pub sla: Option<SlaState>,
    pub first_response_at: Option<DateTime<Utc>>,
    /// Whole minutes from creation to first response, floored.
    pub first_response_minutes: Option<i32>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact ticket row for lists.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TicketListItem {
    pub id: i32,
    pub ticket_number: String,
    pub ticket_type: TicketType,
    pub current_node: TicketNode,
    pub status: TicketStatus,
    pub priority: Priority,
    pub title: String,
    pub assigned_to: Option<i32>,
    pub dealer_id: Option<i32>,
    pub sla: Option<SlaState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TicketListResponse {
    pub data: Vec<TicketListItem>,
    pub pagination: Pagination,
}

/// Counts per summary status.
#[derive(Serialize, Default, utoipa::ToSchema)]
pub struct StatusBreakdown {
    pub open: u64,
    pub in_progress: u64,
    pub waiting: u64,
    pub resolved: u64,
    pub closed: u64,
    pub cancelled: u64,
}

impl StatusBreakdown {
    pub fn bump(&mut self, status: TicketStatus, count: u64) {
        match status {
            TicketStatus::Open => self.open += count,
            TicketStatus::InProgress => self.in_progress += count,
            TicketStatus::Waiting => self.waiting += count,
            TicketStatus::Resolved => self.resolved += count,
            TicketStatus::Closed => self.closed += count,
            TicketStatus::Cancelled => self.cancelled += count,
        }
    }
}

/// Per-type status breakdown for dashboards.
#[derive(Serialize, Default, utoipa::ToSchema)]
pub struct SummaryResponse {
    pub inquiry: StatusBreakdown,
    pub rma: StatusBreakdown,
    pub svc: StatusBreakdown,
}

/// Aggregate counters for the stats endpoint.
#[derive(Serialize, Default, utoipa::ToSchema)]
pub struct TicketStatsResponse {
    pub total: u64,
    pub by_status: StatusBreakdown,
    pub p0: u64,
    pub p1: u64,
    pub p2: u64,
    /// Tickets with a breached SLA clock right now.
    pub sla_breached: u64,
}

use chrono::{DateTime, Utc};
use common::legacy::{priority_to_legacy, status_to_legacy};
use common::{Priority, TicketType};
use serde::{Deserialize, Serialize};

use crate::entity::ticket;
use crate::error::AppError;
use crate::models::shared::{Pagination, validate_title};

/// Query parameters shared by the legacy list endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LegacyListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Legacy status label, e.g. `AwaitingFeedback` or `MSReview`.
    pub status: Option<String>,
    pub customer_id: Option<i32>,
    pub dealer_id: Option<i32>,
}

/// Inquiry ticket in the pre-unification vocabulary.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LegacyInquiry {
    pub id: i32,
    #[schema(example = "K2508-0042")]
    pub ticket_number: String,
    pub title: String,
    pub description: Option<String>,
    /// Legacy status label, e.g. `AwaitingFeedback`.
    #[schema(example = "InProgress")]
    pub status: String,
    /// Legacy R-grade priority.
    #[schema(example = "R2")]
    pub priority: String,
    /// Was `account_id` before unification.
    pub customer_id: Option<i32>,
    /// Was `reporter_name` before unification.
    pub customer_name: Option<String>,
    /// Was `assigned_to` before unification.
    pub handler_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ticket::Model> for LegacyInquiry {
    fn from(t: ticket::Model) -> Self {
        let status = status_to_legacy(TicketType::Inquiry, t.current_node)
            .map(str::to_string)
            .unwrap_or_else(|| t.current_node.to_string());
        Self {
            id: t.id,
            ticket_number: t.ticket_number,
            title: t.title,
            description: t.description,
            status,
            priority: priority_to_legacy(t.priority).to_string(),
            customer_id: t.account_id,
            customer_name: t.reporter_name,
            handler_id: t.assigned_to,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// RMA ticket in the pre-unification vocabulary.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LegacyRma {
    pub id: i32,
    #[schema(example = "RMA-D-2508-0007")]
    pub ticket_number: String,
    pub title: String,
    #[schema(example = "Diagnosing")]
    pub status: String,
    /// Was `priority` before unification.
    #[schema(example = "R1")]
    pub repair_priority: String,
    /// Was `account_id` before unification.
    pub customer_id: Option<i32>,
    /// Was `parent_ticket_id` before unification.
    pub inquiry_ticket_id: Option<i32>,
    pub dealer_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ticket::Model> for LegacyRma {
    fn from(t: ticket::Model) -> Self {
        let status = status_to_legacy(TicketType::Rma, t.current_node)
            .map(str::to_string)
            .unwrap_or_else(|| t.current_node.to_string());
        Self {
            id: t.id,
            ticket_number: t.ticket_number,
            title: t.title,
            status,
            repair_priority: priority_to_legacy(t.priority).to_string(),
            customer_id: t.account_id,
            inquiry_ticket_id: t.parent_ticket_id,
            dealer_id: t.dealer_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Dealer repair (SVC) ticket in the pre-unification vocabulary.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LegacyDealerRepair {
    pub id: i32,
    #[schema(example = "SVC-D-2508-0003")]
    pub ticket_number: String,
    pub title: String,
    /// Coarse legacy status: `Pending`, `InProgress`, `Completed`, `Cancelled`.
    #[schema(example = "InProgress")]
    pub status: String,
    pub customer_id: Option<i32>,
    pub customer_name: Option<String>,
    pub inquiry_ticket_id: Option<i32>,
    pub dealer_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ticket::Model> for LegacyDealerRepair {
    fn from(t: ticket::Model) -> Self {
        let status = status_to_legacy(TicketType::Svc, t.current_node)
            .map(str::to_string)
            .unwrap_or_else(|| t.current_node.to_string());
        Self {
            id: t.id,
            ticket_number: t.ticket_number,
            title: t.title,
            status,
            customer_id: t.account_id,
            customer_name: t.reporter_name,
            inquiry_ticket_id: t.parent_ticket_id,
            dealer_id: t.dealer_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LegacyInquiryListResponse {
    pub data: Vec<LegacyInquiry>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LegacyRmaListResponse {
    pub data: Vec<LegacyRma>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LegacyDealerRepairListResponse {
    pub data: Vec<LegacyDealerRepair>,
    pub pagination: Pagination,
}

/// Create request accepted by the legacy inquiry intake.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateInquiryRequest {
    pub title: String,
    pub description: Option<String>,
    /// Legacy R-grade; unknown values degrade to the lowest priority.
    #[schema(example = "R3")]
    pub priority: Option<String>,
    /// Becomes `account_id` on the unified ticket.
    pub customer_id: Option<i32>,
    /// Becomes `reporter_name` on the unified ticket.
    pub customer_name: Option<String>,
}

pub fn validate_create_inquiry(payload: &CreateInquiryRequest) -> Result<(), AppError> {
    validate_title(&payload.title)
}

/// Create request accepted by the legacy RMA intake.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateRmaRequest {
    pub title: String,
    pub description: Option<String>,
    /// Legacy R-grade; unknown values degrade to the lowest priority.
    #[schema(example = "R2")]
    pub repair_priority: Option<String>,
    pub customer_id: Option<i32>,
    /// Becomes `parent_ticket_id` on the unified ticket.
    pub inquiry_ticket_id: Option<i32>,
    /// Present when the return goes through a dealer; selects the `D` channel
    /// code in the ticket number.
    pub dealer_id: Option<i32>,
}

pub fn validate_create_rma(payload: &CreateRmaRequest) -> Result<(), AppError> {
    validate_title(&payload.title)
}

/// Create request accepted by the legacy dealer-repair intake.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateDealerRepairRequest {
    pub title: String,
    pub description: Option<String>,
    /// Legacy R-grade; unknown values degrade to the lowest priority.
    #[schema(example = "R2")]
    pub priority: Option<String>,
    pub customer_id: Option<i32>,
    pub customer_name: Option<String>,
    pub inquiry_ticket_id: Option<i32>,
    /// Required for staff callers; dealer callers default to their own.
    pub dealer_id: Option<i32>,
}

pub fn validate_create_dealer_repair(
    payload: &CreateDealerRepairRequest,
    caller_dealer_id: Option<i32>,
) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if payload.dealer_id.or(caller_dealer_id).is_none() {
        return Err(AppError::Validation(
            "dealer_id is required".into(),
        ));
    }
    Ok(())
}

/// Translate an optional legacy priority grade.
pub fn grade_to_priority(grade: Option<&str>) -> Priority {
    grade
        .map(common::legacy::priority_from_legacy)
        .unwrap_or(Priority::P2)
}

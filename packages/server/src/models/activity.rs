use chrono::{DateTime, Utc};
use common::{ActivityType, ActorRole, Visibility};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::mentions::ResolvedMention;
use crate::models::shared::validate_body;

/// Request body for appending a comment to a ticket's timeline.
///
/// Only comments can be created through the API; status changes, assignments
/// and system notes are written by the server alongside the triggering
/// operation.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateActivityRequest {
    /// Comment text. May contain `@[Name](id)` and `@name` mention tokens.
    #[schema(example = "Unit received, starting diagnosis. cc @[Alice Chen](42)")]
    pub content: String,
    /// Defaults to `all`. Dealers may only write `all`.
    pub visibility: Option<Visibility>,
}

pub fn validate_create_activity(payload: &CreateActivityRequest) -> Result<(), AppError> {
    validate_body(&payload.content, "Comment")
}

/// PATCH body for editing a comment.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateActivityRequest {
    pub content: String,
}

pub fn validate_update_activity(payload: &UpdateActivityRequest) -> Result<(), AppError> {
    validate_body(&payload.content, "Comment")
}

/// Query parameters for listing a ticket's timeline.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ActivityListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub activity_type: Option<ActivityType>,
}

/// One timeline entry.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ActivityResponse {
    pub id: i32,
    pub ticket_id: i32,
    pub author_id: i32,
    pub author_name: String,
    pub author_role: ActorRole,
    pub activity_type: ActivityType,
    pub visibility: Visibility,
    pub content: Option<String>,
    pub mentions: Vec<ResolvedMention>,
    /// Structured payload for non-comment entries.
    #[schema(value_type = Object)]
    pub detail: serde_json::Value,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ActivityListResponse {
    pub data: Vec<ActivityResponse>,
    pub pagination: crate::models::shared::Pagination,
}

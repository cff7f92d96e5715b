use chrono::{DateTime, Utc};
use common::NotificationType;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::{Pagination, validate_title};

/// Query parameters for listing the caller's notifications.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct NotificationListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub kind: Option<NotificationType>,
    /// When true, only unread, unarchived rows.
    pub unread_only: Option<bool>,
    /// When true, only archived rows; default excludes them.
    pub archived: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub kind: NotificationType,
    pub actor_id: Option<i32>,
    pub ticket_id: Option<i32>,
    pub activity_id: Option<i32>,
    pub title: String,
    pub body: Option<String>,
    #[schema(example = "at-sign")]
    pub icon: String,
    #[schema(example = "/tickets/42")]
    pub action_url: Option<String>,
    /// Kind-specific payload, e.g. `{ticket_number}` for mentions.
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub read_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::notification::Model> for NotificationResponse {
    fn from(n: crate::entity::notification::Model) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            actor_id: n.actor_id,
            ticket_id: n.ticket_id,
            activity_id: n.activity_id,
            title: n.title,
            body: n.body,
            icon: n.icon,
            action_url: n.action_url,
            metadata: n.metadata,
            read_at: n.read_at,
            archived: n.archived,
            created_at: n.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<NotificationResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UnreadCountResponse {
    #[schema(example = 3)]
    pub unread: u64,
}

/// Count of rows touched by a bulk operation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AffectedResponse {
    pub affected: u64,
}

/// Admin broadcast request.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AnnounceRequest {
    /// Explicit recipient list.
    pub recipient_ids: Vec<i32>,
    #[schema(example = "Planned maintenance Saturday 02:00 UTC")]
    pub title: String,
    pub body: Option<String>,
}

pub fn validate_announce(payload: &AnnounceRequest) -> Result<(), AppError> {
    if payload.recipient_ids.is_empty() {
        return Err(AppError::Validation(
            "recipient_ids must not be empty".into(),
        ));
    }
    if payload.recipient_ids.len() > 1000 {
        return Err(AppError::Validation(
            "Too many recipients: max 1000".into(),
        ));
    }
    validate_title(&payload.title)
}

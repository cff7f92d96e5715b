use common::{Priority, TicketNode, TicketStatus, TicketType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a user got onto a ticket's watch list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Creator,
    Assignee,
    Mentioned,
    Commenter,
}

/// One watch-list entry, stored on the ticket as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Participant {
    pub user_id: i32,
    pub role: ParticipantRole,
    pub added_at: chrono::DateTime<chrono::Utc>,
    /// Who put them on the list; the user themselves for creators.
    pub added_by: i32,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Human-readable number, e.g. `K2508-0042` or `RMA-D-2508-1A2F`.
    #[sea_orm(unique)]
    pub ticket_number: String,
    pub ticket_type: TicketType,
    pub current_node: TicketNode,
    /// Derived from `current_node`; denormalized for list filtering.
    pub status: TicketStatus,
    pub priority: Priority,

    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Customer account, when the ticket is tied to one.
    pub account_id: Option<i32>,
    /// Free-text reporter name from intake forms.
    pub reporter_name: Option<String>,
    /// Dealer handling the ticket; set for dealer-channel RMA and all SVC.
    pub dealer_id: Option<i32>,

    /// Source ticket when this one was created by escalation.
    pub parent_ticket_id: Option<i32>,

    pub assigned_to: Option<i32>,
    #[sea_orm(belongs_to, from = "assigned_to", to = "id")]
    pub assignee: BelongsTo<Option<super::user::Entity>>,
    pub created_by: i32,

    /// Everyone on the ticket's watch list, stored as a JSON array of
    /// {user_id, role, added_at, added_by} objects. Append-only, deduplicated
    /// by user_id; grows via activity and mentions.
    #[sea_orm(column_type = "JsonBinary")]
    pub participants: serde_json::Value,

    #[sea_orm(has_many)]
    pub activities: HasMany<super::ticket_activity::Entity>,

    /// Stamped by the first staff-authored activity.
    pub first_response_at: Option<DateTimeUtc>,
    /// Whole minutes from creation to first response, floored.
    pub first_response_minutes: Option<i32>,
    pub closed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

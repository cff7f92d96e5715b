use common::{ActivityType, ActorRole, Visibility};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_activity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub ticket_id: i32,
    #[sea_orm(belongs_to, from = "ticket_id", to = "id")]
    pub ticket: HasOne<super::ticket::Entity>,

    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,
    /// Role snapshot taken at write time.
    pub author_role: ActorRole,

    pub activity_type: ActivityType,
    pub visibility: Visibility,

    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    /// Users mentioned in `content`, as a JSON array of
    /// {user_id, display_name} objects.
    #[sea_orm(column_type = "JsonBinary")]
    pub mentions: serde_json::Value,
    /// Structured payload for non-comment entries (old/new node, assignee,
    /// priority, linked ticket).
    #[sea_orm(column_type = "JsonBinary")]
    pub detail: serde_json::Value,

    pub edited_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

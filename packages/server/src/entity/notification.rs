use common::NotificationType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per recipient per event. A comment mentioning three people
/// produces three rows.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub recipient_id: i32,
    #[sea_orm(belongs_to, from = "recipient_id", to = "id")]
    pub recipient: HasOne<super::user::Entity>,

    /// Who triggered the event; NULL for system-generated rows.
    pub actor_id: Option<i32>,
    pub ticket_id: Option<i32>,
    pub activity_id: Option<i32>,

    pub kind: NotificationType,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub body: Option<String>,
    /// Client icon name, derived from `kind` at dispatch time.
    pub icon: String,
    /// In-app link target, e.g. `/tickets/42`.
    pub action_url: Option<String>,
    /// Kind-specific payload, e.g. `{ticket_number}` for mentions.
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: serde_json::Value,

    pub read_at: Option<DateTimeUtc>,
    pub archived: bool,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

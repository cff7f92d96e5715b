use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    /// Name shown in timelines and mention tokens.
    pub display_name: String,

    /// Dealer-side account. Dealers see a restricted view of every ticket.
    pub is_dealer: bool,
    /// NULL for staff accounts.
    pub dealer_id: Option<i32>,
    /// Staff department, e.g. "marketing", "production", "rd", "finance".
    pub department: Option<String>,
    pub is_admin: bool,

    #[sea_orm(has_many)]
    pub activities: HasMany<super::ticket_activity::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

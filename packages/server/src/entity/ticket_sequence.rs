use common::TicketType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monotonic counter row, one per (ticket type, YYMM bucket).
///
/// The row is read and updated under `SELECT ... FOR UPDATE`; it is the only
/// exclusively locked resource in the system.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_sequence")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ticket_type: TicketType,
    /// Two-digit year plus two-digit month, e.g. "2508".
    #[sea_orm(primary_key, auto_increment = false)]
    pub year_month: String,

    pub last_value: i32,
}

impl ActiveModelBehavior for ActiveModel {}

use chrono::{DateTime, Datelike, Utc};
use common::TicketType;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::ticket_sequence;
use crate::error::AppError;

/// Intake channel; affects RMA number formatting only, never the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Customer,
    Dealer,
}

impl Channel {
    fn code(&self) -> char {
        match self {
            Self::Customer => 'C',
            Self::Dealer => 'D',
        }
    }
}

/// Two-digit year plus two-digit month, e.g. "2508" for August 2025.
pub fn bucket(now: DateTime<Utc>) -> String {
    format!("{:02}{:02}", now.year() % 100, now.month())
}

/// Render the per-month sequence. Four decimal digits until the bucket
/// overflows 9999, then four uppercase hex digits.
fn render_seq(seq: i32) -> String {
    if seq <= 9999 {
        format!("{seq:04}")
    } else {
        format!("{seq:04X}")
    }
}

/// Format a full ticket number from its parts.
pub fn format_number(
    ticket_type: TicketType,
    channel: Channel,
    year_month: &str,
    seq: i32,
) -> String {
    let seq = render_seq(seq);
    match ticket_type {
        TicketType::Inquiry => format!("K{year_month}-{seq}"),
        TicketType::Rma => format!("RMA-{}-{year_month}-{seq}", channel.code()),
        TicketType::Svc => format!("SVC-D-{year_month}-{seq}"),
    }
}

/// Allocate the next ticket number for a type within the current month.
///
/// Must run inside the caller's transaction: the counter row is locked with
/// `SELECT ... FOR UPDATE` so concurrent creates serialize on it, and the
/// increment rolls back with the rest of the ticket creation.
#[instrument(skip(txn), fields(ticket_type = %ticket_type))]
pub async fn next_number<C: ConnectionTrait>(
    txn: &C,
    ticket_type: TicketType,
    channel: Channel,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let ym = bucket(now);

    let mut row = ticket_sequence::Entity::find_by_id((ticket_type, ym.clone()))
        .lock(LockType::Update)
        .one(txn)
        .await?;

    if row.is_none() {
        // First ticket of this bucket. A concurrent insert may win the race;
        // on_conflict-do_nothing makes that harmless and the re-select below
        // blocks until the winner commits.
        let result = ticket_sequence::Entity::insert(ticket_sequence::ActiveModel {
            ticket_type: Set(ticket_type),
            year_month: Set(ym.clone()),
            last_value: Set(0),
        })
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                ticket_sequence::Column::TicketType,
                ticket_sequence::Column::YearMonth,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(txn)
        .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        row = ticket_sequence::Entity::find_by_id((ticket_type, ym.clone()))
            .lock(LockType::Update)
            .one(txn)
            .await?;
    }

    let row = row.ok_or_else(|| AppError::Internal("Sequence row missing after insert".into()))?;
    let next = row.last_value + 1;

    let mut active: ticket_sequence::ActiveModel = row.into();
    active.last_value = Set(next);
    active.update(txn).await?;

    Ok(format_number(ticket_type, channel, &ym, next))
}

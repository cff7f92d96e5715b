use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::{notification, ticket, ticket_activity};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Dashboard and list queries:
    // SELECT ... FROM ticket WHERE ticket_type = ? AND status = ?
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_ticket_type_status")
            .table(ticket::Entity)
            .col(ticket::Column::TicketType)
            .col(ticket::Column::Status)
            .to_string(PostgresQueryBuilder),
        "idx_ticket_type_status",
    )
    .await;

    // Timeline reads are always scoped to one ticket, oldest first.
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_activity_ticket_created")
            .table(ticket_activity::Entity)
            .col(ticket_activity::Column::TicketId)
            .col(ticket_activity::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        "idx_activity_ticket_created",
    )
    .await;

    // Inbox listing: recipient's unarchived rows, newest first.
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_notification_recipient")
            .table(notification::Entity)
            .col(notification::Column::RecipientId)
            .col(notification::Column::Archived)
            .col(notification::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        "idx_notification_recipient",
    )
    .await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, stmt: String, name: &str) {
    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index {} exists", name);
        }
        Err(e) => {
            tracing::warn!("Failed to create index {}: {}", name, e);
        }
    }
}

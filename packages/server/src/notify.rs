use chrono::Utc;
use common::NotificationType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::notification;
use crate::error::AppError;

/// Event being dispatched; one notification row is written per recipient.
pub struct Event<'a> {
    pub kind: NotificationType,
    pub actor_id: Option<i32>,
    pub ticket_id: Option<i32>,
    pub activity_id: Option<i32>,
    pub title: &'a str,
    pub body: Option<&'a str>,
    /// Kind-specific payload, stored verbatim on every row.
    pub metadata: serde_json::Value,
}

/// Write one notification row per recipient, skipping the actor.
///
/// Actors never get notified about their own actions; duplicate recipient ids
/// are collapsed by the caller (mention resolution already dedups).
#[instrument(skip(txn, event, recipients), fields(kind = %event.kind, count = recipients.len()))]
pub async fn dispatch<C: ConnectionTrait>(
    txn: &C,
    event: Event<'_>,
    recipients: &[i32],
) -> Result<u32, AppError> {
    let now = Utc::now();
    let mut written = 0u32;

    for &recipient_id in recipients {
        if event.actor_id == Some(recipient_id) {
            continue;
        }

        notification::ActiveModel {
            recipient_id: Set(recipient_id),
            actor_id: Set(event.actor_id),
            ticket_id: Set(event.ticket_id),
            activity_id: Set(event.activity_id),
            kind: Set(event.kind),
            title: Set(event.title.to_string()),
            body: Set(event.body.map(str::to_string)),
            icon: Set(event.kind.icon().to_string()),
            action_url: Set(event.ticket_id.map(|id| format!("/tickets/{id}"))),
            metadata: Set(event.metadata.clone()),
            read_at: Set(None),
            archived: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        written += 1;
    }

    Ok(written)
}

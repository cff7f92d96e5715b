use chrono::{DateTime, Duration, Utc};
use common::{Priority, SlaKind, SlaStatus, TicketNode};
use serde::Serialize;

/// Evaluated SLA clock, embedded in ticket responses.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SlaState {
    pub kind: SlaKind,
    pub due_at: DateTime<Utc>,
    pub status: SlaStatus,
}

/// The SLA clock that applies while a ticket sits on the given node.
///
/// `waiting_customer` pauses all clocks; terminal nodes have none.
pub fn active_clock(node: TicketNode) -> Option<SlaKind> {
    use TicketNode::*;
    match node {
        Draft | Submitted => Some(SlaKind::FirstResponse),
        MsReview | GeReview => Some(SlaKind::Quote),
        InProgress | OpReceiving | OpDiagnosing | OpRepairing | OpQa | DlReceiving
        | DlRepairing | DlQa => Some(SlaKind::Solution),
        MsClosing | GeClosing => Some(SlaKind::Close),
        WaitingCustomer | Resolved | AutoClosed | Converted | Closed | Cancelled => None,
    }
}

/// Evaluate one clock against the wall clock.
///
/// All clocks run from ticket creation. A clock flips to `Warning` once less
/// than a quarter of its window remains.
pub fn evaluate(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    priority: Priority,
    kind: SlaKind,
) -> SlaState {
    let window = Duration::hours(priority.sla_hours(kind));
    let due_at = created_at + window;
    let remaining = due_at - now;

    let status = if remaining <= Duration::zero() {
        SlaStatus::Breached
    } else if remaining * 4 < window {
        SlaStatus::Warning
    } else {
        SlaStatus::Normal
    };

    SlaState {
        kind,
        due_at,
        status,
    }
}

/// Whole minutes between two instants, floored. Used for the ticket's
/// first-response bookkeeping.
pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
    (to - from).num_minutes().max(0) as i32
}

/// Evaluate the clock currently applicable to a ticket, if any.
///
/// The first-response clock stops once a response is stamped.
pub fn current(
    node: TicketNode,
    created_at: DateTime<Utc>,
    first_response_at: Option<DateTime<Utc>>,
    priority: Priority,
    now: DateTime<Utc>,
) -> Option<SlaState> {
    let kind = active_clock(node)?;
    if kind == SlaKind::FirstResponse && first_response_at.is_some() {
        return None;
    }
    Some(evaluate(created_at, now, priority, kind))
}

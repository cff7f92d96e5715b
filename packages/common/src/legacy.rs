//! Vocabulary translation for the pre-unification APIs.
//!
//! Older clients speak three dialects (inquiry, RMA, dealer-repair), each with
//! its own status labels and R1/R2/R3 priorities. The unified store keeps
//! canonical [`TicketNode`] and [`Priority`] values; these tables translate at
//! the API edge, in both directions. Unmapped labels pass through unchanged on
//! reads and are rejected by handlers on writes.

use crate::lifecycle::{TicketNode, TicketType};
use crate::priority::Priority;

/// Canonical priority to legacy `R`-grade.
pub fn priority_to_legacy(priority: Priority) -> &'static str {
    match priority {
        Priority::P0 => "R1",
        Priority::P1 => "R2",
        Priority::P2 => "R3",
    }
}

/// Legacy `R`-grade to canonical priority. Unknown grades fall back to P2,
/// matching how the old intake forms treated a missing grade.
pub fn priority_from_legacy(grade: &str) -> Priority {
    match grade {
        "R1" => Priority::P0,
        "R2" => Priority::P1,
        _ => Priority::P2,
    }
}

/// Canonical node to the status label the given legacy dialect expects.
///
/// `None` for nodes outside the type's flow; callers surface the raw node
/// name in that case.
pub fn status_to_legacy(ticket_type: TicketType, node: TicketNode) -> Option<&'static str> {
    use TicketNode::*;
    match ticket_type {
        TicketType::Inquiry => match node {
            Draft => Some("Pending"),
            InProgress => Some("InProgress"),
            WaitingCustomer => Some("AwaitingFeedback"),
            Resolved => Some("Resolved"),
            AutoClosed => Some("AutoClosed"),
            Converted => Some("Upgraded"),
            _ => None,
        },
        TicketType::Rma => match node {
            Submitted => Some("Pending"),
            MsReview => Some("MSReview"),
            OpReceiving => Some("Receiving"),
            OpDiagnosing => Some("Diagnosing"),
            OpRepairing => Some("Repairing"),
            OpQa => Some("QA"),
            MsClosing => Some("MSClosing"),
            Closed => Some("Closed"),
            Cancelled => Some("Cancelled"),
            _ => None,
        },
        // The dealer-repair API only ever exposed a coarse three-state view.
        TicketType::Svc => match node {
            Submitted | GeReview => Some("Pending"),
            DlReceiving | DlRepairing | DlQa | GeClosing => Some("InProgress"),
            Closed => Some("Completed"),
            Cancelled => Some("Cancelled"),
            _ => None,
        },
    }
}

/// Legacy status label to canonical node for filter parameters.
///
/// Coarse SVC labels resolve to a representative node; list filters match on
/// the label via [`status_to_legacy`] instead, so this is only used where a
/// single node is required.
pub fn status_from_legacy(ticket_type: TicketType, label: &str) -> Option<TicketNode> {
    use TicketNode::*;
    match ticket_type {
        TicketType::Inquiry => match label {
            "Pending" => Some(Draft),
            "InProgress" => Some(InProgress),
            "AwaitingFeedback" => Some(WaitingCustomer),
            "Resolved" => Some(Resolved),
            "AutoClosed" => Some(AutoClosed),
            "Upgraded" => Some(Converted),
            _ => None,
        },
        TicketType::Rma => match label {
            "Pending" => Some(Submitted),
            "MSReview" => Some(MsReview),
            "Receiving" => Some(OpReceiving),
            "Diagnosing" => Some(OpDiagnosing),
            "Repairing" => Some(OpRepairing),
            "QA" => Some(OpQa),
            "MSClosing" => Some(MsClosing),
            "Closed" => Some(Closed),
            "Cancelled" => Some(Cancelled),
            _ => None,
        },
        TicketType::Svc => match label {
            "Pending" => Some(Submitted),
            "InProgress" => Some(DlRepairing),
            "Completed" => Some(Closed),
            "Cancelled" => Some(Cancelled),
            _ => None,
        },
    }
}

/// All nodes a legacy status label covers, for list filtering.
pub fn nodes_for_legacy_status(ticket_type: TicketType, label: &str) -> Vec<TicketNode> {
    use TicketNode::*;
    if ticket_type == TicketType::Svc {
        return match label {
            "Pending" => vec![Submitted, GeReview],
            "InProgress" => vec![DlReceiving, DlRepairing, DlQa, GeClosing],
            "Completed" => vec![Closed],
            "Cancelled" => vec![Cancelled],
            _ => vec![],
        };
    }
    status_from_legacy(ticket_type, label)
        .map(|n| vec![n])
        .unwrap_or_default()
}

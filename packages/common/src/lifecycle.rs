#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of ticket, fixed at creation.
///
/// The type selects the lifecycle graph, the numbering scheme, and the legacy
/// API vocabulary a ticket is read through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    /// Initial customer question, may later be escalated.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "inquiry"))]
    Inquiry,
    /// Return-merchandise authorization / factory repair.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "rma"))]
    Rma,
    /// Dealer-performed repair.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "svc"))]
    Svc,
}

impl TicketType {
    pub const ALL: &'static [TicketType] = &[Self::Inquiry, Self::Rma, Self::Svc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inquiry => "inquiry",
            Self::Rma => "rma",
            Self::Svc => "svc",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid ticket type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTicketTypeError {
    invalid: String,
}

impl fmt::Display for ParseTicketTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid ticket type '{}'. Valid values: inquiry, rma, svc",
            self.invalid
        )
    }
}

impl std::error::Error for ParseTicketTypeError {}

impl FromStr for TicketType {
    type Err = ParseTicketTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inquiry" => Ok(Self::Inquiry),
            "rma" => Ok(Self::Rma),
            "svc" => Ok(Self::Svc),
            _ => Err(ParseTicketTypeError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Canonical lifecycle node of a ticket.
///
/// The node set is shared across all ticket types; which nodes are reachable
/// for a given ticket is decided by [`TicketNode::can_transition`]. Only the
/// state machine mutates a ticket's `current_node`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum TicketNode {
    // Inquiry flow
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "in_progress"))]
    InProgress,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "waiting_customer"))]
    WaitingCustomer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "resolved"))]
    Resolved,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "auto_closed"))]
    AutoClosed,
    /// Escalated into an RMA or SVC ticket; terminal for the inquiry.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "converted"))]
    Converted,

    // RMA flow (factory repair)
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "submitted"))]
    Submitted,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ms_review"))]
    MsReview,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "op_receiving"))]
    OpReceiving,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "op_diagnosing"))]
    OpDiagnosing,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "op_repairing"))]
    OpRepairing,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "op_qa"))]
    OpQa,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ms_closing"))]
    MsClosing,

    // SVC flow (dealer repair)
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ge_review"))]
    GeReview,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "dl_receiving"))]
    DlReceiving,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "dl_repairing"))]
    DlRepairing,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "dl_qa"))]
    DlQa,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ge_closing"))]
    GeClosing,

    // Shared terminals
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "closed"))]
    Closed,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "cancelled"))]
    Cancelled,
}

impl TicketNode {
    /// Node assigned on ticket creation for each type.
    pub fn initial(ticket_type: TicketType) -> Self {
        match ticket_type {
            TicketType::Inquiry => Self::Draft,
            TicketType::Rma | TicketType::Svc => Self::Submitted,
        }
    }

    /// Terminal nodes admit no further transitions for any type.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AutoClosed | Self::Converted | Self::Closed | Self::Cancelled
        )
    }

    /// Whether `self -> target` is a legal transition for the given type.
    ///
    /// RMA and SVC tickets may be cancelled from any non-terminal node.
    /// QA nodes may send a ticket back to repairing for rework.
    pub fn can_transition(&self, ticket_type: TicketType, target: TicketNode) -> bool {
        if self.is_terminal() || *self == target {
            return false;
        }
        match ticket_type {
            TicketType::Inquiry => match (self, target) {
                (Self::Draft, Self::InProgress) => true,
                (Self::InProgress, Self::WaitingCustomer | Self::Resolved) => true,
                (Self::WaitingCustomer, Self::InProgress | Self::Resolved | Self::AutoClosed) => {
                    true
                }
                // Reopen is allowed until the ticket auto-closes.
                (Self::Resolved, Self::InProgress | Self::AutoClosed) => true,
                (
                    Self::Draft | Self::InProgress | Self::WaitingCustomer | Self::Resolved,
                    Self::Converted,
                ) => true,
                _ => false,
            },
            TicketType::Rma => match (self, target) {
                (_, Self::Cancelled) => self.in_rma_flow(),
                (Self::Submitted, Self::MsReview) => true,
                (Self::MsReview, Self::OpReceiving) => true,
                (Self::OpReceiving, Self::OpDiagnosing) => true,
                (Self::OpDiagnosing, Self::OpRepairing) => true,
                (Self::OpRepairing, Self::OpQa) => true,
                (Self::OpQa, Self::MsClosing | Self::OpRepairing) => true,
                (Self::MsClosing, Self::Closed) => true,
                _ => false,
            },
            TicketType::Svc => match (self, target) {
                (_, Self::Cancelled) => self.in_svc_flow(),
                (Self::Submitted, Self::GeReview) => true,
                (Self::GeReview, Self::DlReceiving) => true,
                (Self::DlReceiving, Self::DlRepairing) => true,
                (Self::DlRepairing, Self::DlQa) => true,
                (Self::DlQa, Self::GeClosing | Self::DlRepairing) => true,
                (Self::GeClosing, Self::Closed) => true,
                _ => false,
            },
        }
    }

    fn in_rma_flow(&self) -> bool {
        matches!(
            self,
            Self::Submitted
                | Self::MsReview
                | Self::OpReceiving
                | Self::OpDiagnosing
                | Self::OpRepairing
                | Self::OpQa
                | Self::MsClosing
        )
    }

    fn in_svc_flow(&self) -> bool {
        matches!(
            self,
            Self::Submitted
                | Self::GeReview
                | Self::DlReceiving
                | Self::DlRepairing
                | Self::DlQa
                | Self::GeClosing
        )
    }

    /// Coarse summary status derived from the node, kept on the ticket row
    /// for cheap filtering.
    pub fn summary_status(&self) -> TicketStatus {
        match self {
            Self::Draft | Self::Submitted => TicketStatus::Open,
            Self::WaitingCustomer => TicketStatus::Waiting,
            Self::Resolved => TicketStatus::Resolved,
            Self::AutoClosed | Self::Converted | Self::Closed => TicketStatus::Closed,
            Self::Cancelled => TicketStatus::Cancelled,
            _ => TicketStatus::InProgress,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::WaitingCustomer => "waiting_customer",
            Self::Resolved => "resolved",
            Self::AutoClosed => "auto_closed",
            Self::Converted => "converted",
            Self::Submitted => "submitted",
            Self::MsReview => "ms_review",
            Self::OpReceiving => "op_receiving",
            Self::OpDiagnosing => "op_diagnosing",
            Self::OpRepairing => "op_repairing",
            Self::OpQa => "op_qa",
            Self::MsClosing => "ms_closing",
            Self::GeReview => "ge_review",
            Self::DlReceiving => "dl_receiving",
            Self::DlRepairing => "dl_repairing",
            Self::DlQa => "dl_qa",
            Self::GeClosing => "ge_closing",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TicketNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid node string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeError {
    invalid: String,
}

impl fmt::Display for ParseNodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid lifecycle node '{}'", self.invalid)
    }
}

impl std::error::Error for ParseNodeError {}

impl FromStr for TicketNode {
    type Err = ParseNodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "in_progress" => Ok(Self::InProgress),
            "waiting_customer" => Ok(Self::WaitingCustomer),
            "resolved" => Ok(Self::Resolved),
            "auto_closed" => Ok(Self::AutoClosed),
            "converted" => Ok(Self::Converted),
            "submitted" => Ok(Self::Submitted),
            "ms_review" => Ok(Self::MsReview),
            "op_receiving" => Ok(Self::OpReceiving),
            "op_diagnosing" => Ok(Self::OpDiagnosing),
            "op_repairing" => Ok(Self::OpRepairing),
            "op_qa" => Ok(Self::OpQa),
            "ms_closing" => Ok(Self::MsClosing),
            "ge_review" => Ok(Self::GeReview),
            "dl_receiving" => Ok(Self::DlReceiving),
            "dl_repairing" => Ok(Self::DlRepairing),
            "dl_qa" => Ok(Self::DlQa),
            "ge_closing" => Ok(Self::GeClosing),
            "closed" => Ok(Self::Closed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseNodeError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Coarse ticket status, derived from `current_node`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "open"))]
    Open,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "in_progress"))]
    InProgress,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "waiting"))]
    Waiting,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "resolved"))]
    Resolved,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "closed"))]
    Closed,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "cancelled"))]
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Waiting => "waiting",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

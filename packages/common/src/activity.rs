#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of timeline entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Free-text comment, the only user-editable kind.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "comment"))]
    Comment,
    /// Node transition, recorded by the state machine.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "status_change"))]
    StatusChange,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "assignment"))]
    Assignment,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "priority_change"))]
    PriorityChange,
    /// Ticket escalation / parent-child linking.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ticket_linked"))]
    TicketLinked,
    /// Internal audit record of who was tagged in a comment. Written by the
    /// server next to the comment; never parsed for mentions itself.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "mention"))]
    Mention,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "system"))]
    System,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::StatusChange => "status_change",
            Self::Assignment => "assignment",
            Self::PriorityChange => "priority_change",
            Self::TicketLinked => "ticket_linked",
            Self::Mention => "mention",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may read a timeline entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to everyone who can see the ticket, dealers included.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "all"))]
    All,
    /// Staff only; filtered out of dealer reads.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "internal"))]
    Internal,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid visibility string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVisibilityError {
    invalid: String,
}

impl fmt::Display for ParseVisibilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid visibility '{}'. Valid values: all, internal",
            self.invalid
        )
    }
}

impl std::error::Error for ParseVisibilityError {}

impl FromStr for Visibility {
    type Err = ParseVisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "internal" => Ok(Self::Internal),
            _ => Err(ParseVisibilityError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Functional role stamped on every activity row.
///
/// Derived from the author's account at write time so the timeline stays
/// accurate even if the author later changes department.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActorRole {
    /// Marketing & sales staff, the default for internal users.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "MS"))]
    Ms,
    /// Operations / production.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "OP"))]
    Op,
    /// Research & development.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RD"))]
    Rd,
    /// General affairs & finance.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "GE"))]
    Ge,
    /// Dealer-side account.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "DL"))]
    Dl,
}

impl ActorRole {
    /// Map an account's type and department onto a timeline role.
    pub fn from_account(is_dealer: bool, department: Option<&str>) -> Self {
        if is_dealer {
            return Self::Dl;
        }
        match department {
            Some("production") => Self::Op,
            Some("rd") => Self::Rd,
            Some("finance") => Self::Ge,
            _ => Self::Ms,
        }
    }

    pub fn is_dealer(&self) -> bool {
        matches!(self, Self::Dl)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ms => "MS",
            Self::Op => "OP",
            Self::Rd => "RD",
            Self::Ge => "GE",
            Self::Dl => "DL",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

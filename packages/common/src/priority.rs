#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket priority. P0 is the most urgent.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum Priority {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "P0"))]
    P0,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "P1"))]
    P1,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "P2"))]
    P2,
}

/// The SLA clocks tracked per ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlaKind {
    FirstResponse,
    Solution,
    Quote,
    Close,
}

impl Priority {
    pub const ALL: &'static [Priority] = &[Self::P0, Self::P1, Self::P2];

    /// Deadline in hours for each SLA clock at this priority.
    pub fn sla_hours(&self, kind: SlaKind) -> i64 {
        use SlaKind::*;
        match (self, kind) {
            (Self::P0, FirstResponse) => 2,
            (Self::P0, Solution) => 4,
            (Self::P0, Quote) => 24,
            (Self::P0, Close) => 36,
            (Self::P1, FirstResponse) => 8,
            (Self::P1, Solution) => 24,
            (Self::P1, Quote) => 48,
            (Self::P1, Close) => 72,
            (Self::P2, FirstResponse) => 24,
            (Self::P2, Solution) => 48,
            (Self::P2, Quote) => 120,
            (Self::P2, Close) => 168,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid priority string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError {
    invalid: String,
}

impl fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid priority '{}'. Valid values: P0, P1, P2",
            self.invalid
        )
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P0" => Ok(Self::P0),
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            _ => Err(ParsePriorityError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Health of a single SLA clock relative to its deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Normal,
    /// Less than a quarter of the window remains.
    Warning,
    Breached,
}

impl SlaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Breached => "breached",
        }
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event kind behind a notification row. One row is written per recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Recipient was @mentioned in a timeline comment.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "mention"))]
    Mention,
    /// Ticket was assigned to the recipient.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "assignment"))]
    Assignment,
    /// A ticket the recipient is involved in changed lifecycle node.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "status_change"))]
    StatusChange,
    /// New comment on a ticket the recipient participates in.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "new_comment"))]
    NewComment,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "sla_warning"))]
    SlaWarning,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "sla_breach"))]
    SlaBreach,
    /// Broadcast pushed by an administrator.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "announcement"))]
    Announcement,
}

impl NotificationType {
    pub const ALL: &'static [NotificationType] = &[
        Self::Mention,
        Self::Assignment,
        Self::StatusChange,
        Self::NewComment,
        Self::SlaWarning,
        Self::SlaBreach,
        Self::Announcement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mention => "mention",
            Self::Assignment => "assignment",
            Self::StatusChange => "status_change",
            Self::NewComment => "new_comment",
            Self::SlaWarning => "sla_warning",
            Self::SlaBreach => "sla_breach",
            Self::Announcement => "announcement",
        }
    }

    /// Icon name rendered next to the notification in clients.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Mention => "at-sign",
            Self::Assignment => "user-check",
            Self::StatusChange => "refresh",
            Self::NewComment => "message-circle",
            Self::SlaWarning => "clock",
            Self::SlaBreach => "alert-triangle",
            Self::Announcement => "megaphone",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

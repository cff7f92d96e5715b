pub mod activity;
pub mod legacy;
pub mod lifecycle;
pub mod notification;
pub mod priority;

pub use activity::{ActivityType, ActorRole, Visibility};
pub use lifecycle::{TicketNode, TicketStatus, TicketType};
pub use notification::NotificationType;
pub use priority::{Priority, SlaKind, SlaStatus};

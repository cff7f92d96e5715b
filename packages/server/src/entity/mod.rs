pub mod notification;
pub mod ticket;
pub mod ticket_activity;
pub mod ticket_sequence;
pub mod user;

pub mod activity;
pub mod auth;
pub mod legacy;
pub mod notification;
pub mod ticket;

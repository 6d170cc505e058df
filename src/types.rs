pub mod catalog;
pub mod notification;
pub mod push;

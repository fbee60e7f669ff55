pub mod chat;
pub mod selection;

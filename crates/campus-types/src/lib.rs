pub mod api;
pub mod conversation;
pub mod models;

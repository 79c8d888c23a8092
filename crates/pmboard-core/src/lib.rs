pub mod api;
pub mod board;
pub mod config;
pub mod confirm;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod history;
pub mod model;
pub mod roles;
pub mod session;

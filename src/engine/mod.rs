pub mod autoplay;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod session;

pub mod types;
pub mod database;
pub mod session;
pub mod config;
pub mod error;
pub mod stats;

// Donor Insights Library
// Re-export modules for use in main.rs

pub mod commands;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod metrics;
pub mod store;

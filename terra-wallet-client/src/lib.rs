// Export modules for the binary and the integration tests
pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod workflow;

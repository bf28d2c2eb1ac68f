pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod observability;
pub mod pipeline;

// Application use cases and ports, plus the adapters that implement them
pub mod app;
pub mod infra;

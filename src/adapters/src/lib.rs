mod adapters;
mod config;
mod memory;
mod observability;
mod postgres;
mod rest;
mod rows;

pub use adapters::ApplicationStore;
pub use config::{ConfigurationError, LoyaltyConfig, StoreSettings};
pub use memory::InMemoryLoyaltyStore;
pub use observability::{
    configure_instrumentation, log_observability, otlp_observability, shutdown_instrumentation,
};
pub use postgres::PostgresLoyaltyStore;
pub use rest::RestTableStore;

//! # SubShare Admin Service
//!
//! Backend for the SubShare admin console: manages subscription slots,
//! shared credentials, purchase transactions, referrals and bot UI copy
//! for a credential-sharing bot, across four independent service
//! partitions.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, types and traits
//! - **application**: Business logic and panel services
//! - **infrastructure**: External concerns (document store, relational database)
//! - **api**: REST API with Swagger documentation
//! - **auth**: JWT authentication, API tokens and access guards
//! - **notifications**: Event bus, WebSocket stream and push dispatch

pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notifications;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export document store registry
pub use infrastructure::docstore::{create_service_registry, ServiceRegistry};

// Re-export API router
pub use api::create_api_router;

// Re-export notifications
pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};

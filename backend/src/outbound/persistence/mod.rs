//! PostgreSQL persistence adapters built on Diesel and `diesel-async`.
//!
//! Repositories translate between row structs and domain types and nothing
//! more; row structs (`models`) and table definitions (`schema`) never leave
//! this module. Every Diesel or pool failure is mapped to the owning port's
//! error enum.
//!
//! ```ignore
//! use marketplace::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/marketplace")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_enquiry_repository;
mod diesel_error_mapping;
mod diesel_notification_repository;
mod diesel_product_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_enquiry_repository::DieselEnquiryRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, apply_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

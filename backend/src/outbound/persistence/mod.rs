//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the user, event and registration ports backed
//! by PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Capacity and uniqueness are enforced inside the
//!   registration transaction and by schema constraints.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never reach the domain.
//! - **Classified errors**: Diesel failures are sorted into connection,
//!   contention, constraint and query faults before they become port errors.
//!
//! # Example
//!
//! ```ignore
//! use eventhub::outbound::persistence::{DbPool, DieselRegistrationStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/eventhub")).await?;
//! let store = DieselRegistrationStore::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_event_repository;
mod diesel_registration_store;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_event_repository::DieselEventRepository;
pub use diesel_registration_store::DieselRegistrationStore;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

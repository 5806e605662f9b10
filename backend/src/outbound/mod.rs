//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process store for development and tests
//! - **credentials**: bcrypt password hashing
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. Capacity and uniqueness are enforced by the store's
//! atomic insert, not by adapter-side checks.

pub mod credentials;
pub mod memory;
pub mod persistence;

//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: a single in-process store enforcing the same constraints,
//!   used by tests and local tooling.
//! - **hashing**: Argon2id password hashing.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod hashing;
pub mod memory;
pub mod persistence;

//! Social graph backend: accounts, microposts, follow relationships and the
//! activity feed.
//!
//! The crate is organised hexagonally. [`domain`] holds the validated types,
//! the driving services and the ports they depend on; [`outbound`] provides
//! the PostgreSQL, in-memory and Argon2 adapters. [`seeding`] and [`config`]
//! support the `microblog` operator binary.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod seeding;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod micropost_repository;
mod password_hasher;
mod relationship_repository;
mod user_repository;

#[cfg(test)]
pub use micropost_repository::MockMicropostRepository;
pub use micropost_repository::{MicropostPersistenceError, MicropostRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use relationship_repository::MockRelationshipRepository;
pub use relationship_repository::{RelationshipPersistenceError, RelationshipRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};

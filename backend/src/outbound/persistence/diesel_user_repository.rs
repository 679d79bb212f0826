//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by a unique index on `lower(email)`; a
//! violation surfaces as [`UserPersistenceError::DuplicateEmail`]. Deleting a
//! user relies on `ON DELETE CASCADE` for posts and follow edges, with the
//! counts taken in the same transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{DeletedUser, EmailAddress, User, UserId};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, constraints, count_to_u64, map_pool_error_message,
};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{microposts, relationships, users};

diesel::define_sql_function!(fn lower(value: Text) -> Text);

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(map_pool_error_message(error))
}

/// Map Diesel errors, attributing a unique-email violation to `email`.
fn map_diesel_error(error: diesel::result::Error, email: &EmailAddress) -> UserPersistenceError {
    let failure = classify_diesel_error(error);
    if failure.violates(constraints::USERS_EMAIL_LOWER) {
        return UserPersistenceError::duplicate_email(email.to_string());
    }
    map_failure(failure)
}

fn map_failure(failure: DieselFailure) -> UserPersistenceError {
    match failure {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
        DieselFailure::Unique { .. }
        | DieselFailure::ForeignKey { .. }
        | DieselFailure::Check { .. } => UserPersistenceError::query("constraint violation"),
    }
}

fn map_read_error(error: diesel::result::Error) -> UserPersistenceError {
    map_failure(classify_diesel_error(error))
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = row.id;
    row.into_domain().map_err(|message| {
        UserPersistenceError::query(format!("invalid user row {id}: {message}"))
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&NewUserRow::from_user(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, user.email()))
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*user.id().as_uuid()))
            .set(&UserUpdate::from_user(user))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, user.email()))?;
        if updated == 0 {
            return Err(UserPersistenceError::not_found(user.id().to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email: &str = email.as_ref();
        let row: Option<UserRow> = users::table
            .filter(lower(users::email).eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<Option<DeletedUser>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();

        // Locking the user row blocks concurrent post and edge inserts, whose
        // foreign key checks need a share lock on it, so the counts hold.
        let removed = conn
            .transaction(|conn| {
                async move {
                    let locked: Option<uuid::Uuid> = users::table
                        .find(uuid)
                        .select(users::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if locked.is_none() {
                        return Ok(None);
                    }

                    let posts: i64 = microposts::table
                        .filter(microposts::author_id.eq(uuid))
                        .count()
                        .get_result(conn)
                        .await?;
                    let edges: i64 = relationships::table
                        .filter(
                            relationships::follower_id
                                .eq(uuid)
                                .or(relationships::followed_id.eq(uuid)),
                        )
                        .count()
                        .get_result(conn)
                        .await?;
                    diesel::delete(users::table.find(uuid))
                        .execute(conn)
                        .await?;

                    Ok::<_, diesel::result::Error>(Some((posts, edges)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_read_error)?;

        Ok(removed.map(|(posts, edges)| {
            debug!(user_id = %uuid, posts, edges, "user row deleted with cascade");
            DeletedUser {
                id: *id,
                microposts_removed: count_to_u64(posts),
                relationships_removed: count_to_u64(edges),
            }
        }))
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_read_error)?;
        Ok(count_to_u64(total))
    }
}

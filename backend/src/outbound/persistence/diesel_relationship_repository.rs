//! PostgreSQL-backed `RelationshipRepository` implementation.
//!
//! The `(follower_id, followed_id)` primary key makes inserts idempotent via
//! `ON CONFLICT DO NOTHING`; foreign keys and the self-follow CHECK are
//! reported by constraint name.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RelationshipPersistenceError, RelationshipRepository};
use crate::domain::relationship::fields;
use crate::domain::{Relationship, User, UserId};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, collect_rows, constraints, count_to_u64,
    map_pool_error_message,
};
use super::models::{NewRelationshipRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{relationships, users};

/// Diesel-backed implementation of the `RelationshipRepository` port.
#[derive(Clone)]
pub struct DieselRelationshipRepository {
    pool: DbPool,
}

impl DieselRelationshipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RelationshipPersistenceError {
    RelationshipPersistenceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RelationshipPersistenceError {
    let failure = classify_diesel_error(error);
    if failure.violates(constraints::RELATIONSHIPS_FOLLOWER_FK) {
        return RelationshipPersistenceError::unknown_user(fields::FOLLOWER_ID);
    }
    if failure.violates(constraints::RELATIONSHIPS_FOLLOWED_FK) {
        return RelationshipPersistenceError::unknown_user(fields::FOLLOWED_ID);
    }
    if failure.violates(constraints::RELATIONSHIPS_NO_SELF_FOLLOW) {
        return RelationshipPersistenceError::self_follow();
    }
    match failure {
        DieselFailure::Connection(message) => RelationshipPersistenceError::connection(message),
        DieselFailure::Query(message) => RelationshipPersistenceError::query(message),
        DieselFailure::Unique { .. }
        | DieselFailure::ForeignKey { .. }
        | DieselFailure::Check { .. } => {
            RelationshipPersistenceError::query("constraint violation")
        }
    }
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, RelationshipPersistenceError> {
    collect_rows(rows.into_iter().map(UserRow::into_domain), |message| {
        RelationshipPersistenceError::query(format!("invalid user row: {message}"))
    })
}

#[async_trait]
impl RelationshipRepository for DieselRelationshipRepository {
    async fn insert(
        &self,
        relationship: &Relationship,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRelationshipRow {
            follower_id: *relationship.follower_id().as_uuid(),
            followed_id: *relationship.followed_id().as_uuid(),
            created_at: relationship.created_at(),
        };
        let inserted = diesel::insert_into(relationships::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn delete(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            relationships::table.find((*follower.as_uuid(), *followed.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn exists(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            relationships::table.find((*follower.as_uuid(), *followed.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn followers(&self, user: &UserId) -> Result<Vec<User>, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .inner_join(relationships::table.on(relationships::follower_id.eq(users::id)))
            .filter(relationships::followed_id.eq(*user.as_uuid()))
            .order((users::name.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_users(rows)
    }

    async fn following(&self, user: &UserId) -> Result<Vec<User>, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .inner_join(relationships::table.on(relationships::followed_id.eq(users::id)))
            .filter(relationships::follower_id.eq(*user.as_uuid()))
            .order((users::name.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_users(rows)
    }

    async fn follower_count(&self, user: &UserId) -> Result<u64, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = relationships::table
            .filter(relationships::followed_id.eq(*user.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }

    async fn following_count(&self, user: &UserId) -> Result<u64, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = relationships::table
            .filter(relationships::follower_id.eq(*user.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }
}

//! PostgreSQL-backed `MicropostRepository` implementation, including the feed
//! query.
//!
//! Listings are keyset paginated on `(created_at, id)` descending so a page
//! boundary never repeats or skips a post, even when timestamps collide.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MicropostPersistenceError, MicropostRepository};
use crate::domain::{FeedPage, Micropost, MicropostId, UserId};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, collect_rows, constraints, count_to_u64,
    limit_to_i64, map_pool_error_message,
};
use super::models::{MicropostRow, NewMicropostRow};
use super::pool::{DbPool, PoolError};
use super::schema::{microposts, relationships};

/// Diesel-backed implementation of the `MicropostRepository` port.
#[derive(Clone)]
pub struct DieselMicropostRepository {
    pool: DbPool,
}

impl DieselMicropostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MicropostPersistenceError {
    MicropostPersistenceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> MicropostPersistenceError {
    map_failure(classify_diesel_error(error))
}

fn map_failure(failure: DieselFailure) -> MicropostPersistenceError {
    match failure {
        DieselFailure::Connection(message) => MicropostPersistenceError::connection(message),
        DieselFailure::Query(message) => MicropostPersistenceError::query(message),
        DieselFailure::Unique { .. }
        | DieselFailure::ForeignKey { .. }
        | DieselFailure::Check { .. } => MicropostPersistenceError::query("constraint violation"),
    }
}

fn map_insert_error(error: diesel::result::Error, post: &Micropost) -> MicropostPersistenceError {
    let failure = classify_diesel_error(error);
    if failure.violates(constraints::MICROPOSTS_AUTHOR_FK) {
        return MicropostPersistenceError::author_not_found(post.author_id().to_string());
    }
    map_failure(failure)
}

fn rows_to_posts(rows: Vec<MicropostRow>) -> Result<Vec<Micropost>, MicropostPersistenceError> {
    collect_rows(rows.into_iter().map(MicropostRow::into_domain), |message| {
        MicropostPersistenceError::query(format!("invalid micropost row: {message}"))
    })
}

/// Newest-first page of posts, starting strictly after the page cursor.
fn newest_first(page: &FeedPage) -> microposts::BoxedQuery<'static, Pg> {
    let mut query = microposts::table
        .order((microposts::created_at.desc(), microposts::id.desc()))
        .limit(limit_to_i64(page.limit()))
        .into_boxed();
    if let Some(cursor) = page.cursor() {
        let created_at = cursor.created_at();
        let id = *cursor.id().as_uuid();
        query = query.filter(
            microposts::created_at.lt(created_at).or(microposts::created_at
                .eq(created_at)
                .and(microposts::id.lt(id))),
        );
    }
    query
}

#[async_trait]
impl MicropostRepository for DieselMicropostRepository {
    async fn insert(&self, post: &Micropost) -> Result<(), MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(microposts::table)
            .values(&NewMicropostRow::from_post(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, post))
    }

    async fn find_by_id(
        &self,
        id: &MicropostId,
    ) -> Result<Option<Micropost>, MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MicropostRow> = microposts::table
            .find(*id.as_uuid())
            .select(MicropostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            row.into_domain().map_err(|message| {
                MicropostPersistenceError::query(format!("invalid micropost row: {message}"))
            })
        })
        .transpose()
    }

    async fn delete(&self, id: &MicropostId) -> Result<bool, MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(microposts::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_by_author(
        &self,
        author: &UserId,
        page: &FeedPage,
    ) -> Result<Vec<Micropost>, MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MicropostRow> = newest_first(page)
            .filter(microposts::author_id.eq(*author.as_uuid()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_posts(rows)
    }

    async fn feed(
        &self,
        user: &UserId,
        page: &FeedPage,
    ) -> Result<Vec<Micropost>, MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = *user.as_uuid();
        let followed = relationships::table
            .filter(relationships::follower_id.eq(user))
            .select(relationships::followed_id);
        let rows: Vec<MicropostRow> = newest_first(page)
            .filter(
                microposts::author_id
                    .eq(user)
                    .or(microposts::author_id.eq_any(followed)),
            )
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_posts(rows)
    }

    async fn count(&self) -> Result<u64, MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = microposts::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }

    async fn count_by_author(&self, author: &UserId) -> Result<u64, MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = microposts::table
            .filter(microposts::author_id.eq(*author.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }
}

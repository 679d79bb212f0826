//! Shared helpers for Diesel repository implementations.
//!
//! Diesel reports constraint violations with the constraint name when
//! PostgreSQL supplies one; repositories use [`classify_diesel_error`] to turn
//! those into their own typed errors without repeating the logging and
//! matching.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Constraint names declared in `backend/migrations`.
pub(crate) mod constraints {
    pub const USERS_EMAIL_LOWER: &str = "users_email_lower_key";
    pub const MICROPOSTS_AUTHOR_FK: &str = "microposts_author_id_fkey";
    pub const RELATIONSHIPS_FOLLOWER_FK: &str = "relationships_follower_id_fkey";
    pub const RELATIONSHIPS_FOLLOWED_FK: &str = "relationships_followed_id_fkey";
    pub const RELATIONSHIPS_NO_SELF_FOLLOW: &str = "relationships_no_self_follow";
}

/// A Diesel failure reduced to what repositories branch on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    Unique { constraint: Option<String> },
    ForeignKey { constraint: Option<String> },
    Check { constraint: Option<String> },
    Connection(&'static str),
    Query(&'static str),
}

impl DieselFailure {
    /// Whether this is a violation of `name`.
    pub(crate) fn violates(&self, name: &str) -> bool {
        match self {
            Self::Unique { constraint }
            | Self::ForeignKey { constraint }
            | Self::Check { constraint } => constraint.as_deref() == Some(name),
            Self::Connection(_) | Self::Query(_) => false,
        }
    }
}

/// Extract a readable message from a pool error.
pub(crate) fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Log and classify a Diesel error.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => DieselFailure::Unique { constraint },
                DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKey { constraint },
                DatabaseErrorKind::CheckViolation => DieselFailure::Check { constraint },
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection error")
                }
                _ => DieselFailure::Query("database error"),
            }
        }
        _ => DieselFailure::Query("database error"),
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Convert a Diesel `COUNT(*)` into the unsigned counts the ports expose.
pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Clamp a page size into Diesel's `LIMIT` type.
pub(crate) fn limit_to_i64(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[cfg(test)]
pub(crate) mod test_errors {
    //! Builders for Diesel database errors carrying a constraint name.

    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

    struct Info {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    pub(crate) fn database_error(
        kind: DatabaseErrorKind,
        constraint: Option<&'static str>,
    ) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info { constraint }))
    }
}

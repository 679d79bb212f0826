//! Shared mapping from port failures to domain errors.
//!
//! Connection failures become `service_unavailable`, query failures become
//! `internal`, and constraint violations become the same per-field validation
//! errors the services raise from their own pre-checks. A row that vanishes
//! between a service's read and its write is a `conflict`.

use super::micropost::{MicropostValidationError, fields as post_fields};
use super::ports::{
    MicropostPersistenceError, PasswordHashError, RelationshipPersistenceError,
    UserPersistenceError,
};
use super::relationship::{RelationshipValidationError, fields as edge_fields};
use super::user::{UserValidationError, fields as user_fields};
use super::{Error, ValidationErrors};

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail { .. } => Error::validation(&ValidationErrors::single(
            user_fields::EMAIL,
            UserValidationError::EmailTaken.to_string(),
        )),
        UserPersistenceError::NotFound { id } => {
            Error::conflict(format!("user {id} was removed during the update"))
        }
    }
}

pub(crate) fn map_micropost_persistence_error(error: MicropostPersistenceError) -> Error {
    match error {
        MicropostPersistenceError::Connection { message } => Error::service_unavailable(message),
        MicropostPersistenceError::Query { message } => Error::internal(message),
        MicropostPersistenceError::AuthorNotFound { .. } => {
            Error::validation(&ValidationErrors::single(
                post_fields::AUTHOR_ID,
                MicropostValidationError::MissingAuthor.to_string(),
            ))
        }
    }
}

pub(crate) fn map_relationship_persistence_error(error: RelationshipPersistenceError) -> Error {
    match error {
        RelationshipPersistenceError::Connection { message } => {
            Error::service_unavailable(message)
        }
        RelationshipPersistenceError::Query { message } => Error::internal(message),
        RelationshipPersistenceError::UnknownUser { field } => Error::validation(
            &ValidationErrors::single(field, RelationshipValidationError::UnknownUser.to_string()),
        ),
        RelationshipPersistenceError::SelfFollow => {
            Error::validation(&ValidationErrors::single(
                edge_fields::FOLLOWED_ID,
                RelationshipValidationError::SelfFollow.to_string(),
            ))
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hashing unavailable: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("boom"), ErrorCode::InternalError)]
    #[case(UserPersistenceError::not_found("42"), ErrorCode::Conflict)]
    #[case(UserPersistenceError::duplicate_email("a@b.co"), ErrorCode::InvalidRequest)]
    fn user_errors_map_to_codes(#[case] error: UserPersistenceError, #[case] code: ErrorCode) {
        assert_eq!(map_user_persistence_error(error).code(), code);
    }

    #[rstest]
    fn duplicate_email_reports_a_field_error() {
        let err = map_user_persistence_error(UserPersistenceError::duplicate_email("a@b.co"));
        assert_eq!(err.field_messages("email"), vec!["has already been taken"]);
    }

    #[rstest]
    fn missing_author_reports_a_field_error() {
        let err = map_micropost_persistence_error(MicropostPersistenceError::author_not_found("x"));
        assert_eq!(
            err.field_messages("author_id"),
            vec!["must reference an existing user"]
        );
    }

    #[rstest]
    #[case(RelationshipPersistenceError::unknown_user("follower_id"), "follower_id")]
    #[case(RelationshipPersistenceError::self_follow(), "followed_id")]
    fn relationship_constraints_report_field_errors(
        #[case] error: RelationshipPersistenceError,
        #[case] field: &str,
    ) {
        let err = map_relationship_persistence_error(error);
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.field_messages(field).len(), 1);
    }
}

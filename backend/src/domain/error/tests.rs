//! Tests for the domain error payload.

use super::*;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

#[fixture]
fn field_errors() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add("email", "is invalid");
    errors.add("email", "has already been taken");
    errors.add("name", "can't be blank");
    errors
}

#[rstest]
fn invalid_request_constructor_sets_code() {
    let err = Error::invalid_request("bad");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
#[case(Error::unauthorized("no"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("no"), ErrorCode::Forbidden)]
#[case(Error::not_found("no"), ErrorCode::NotFound)]
#[case(Error::conflict("no"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("no"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("no"), ErrorCode::InternalError)]
fn convenience_constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn validation_errors_are_grouped_by_field(field_errors: ValidationErrors) {
    let err = Error::validation(&field_errors);

    assert_eq!(
        err.details(),
        Some(&json!({
            "fieldErrors": {
                "email": ["is invalid", "has already been taken"],
                "name": ["can't be blank"],
            }
        }))
    );
    assert_eq!(err.field_messages("name"), vec!["can't be blank"]);
    assert!(err.field_messages("password").is_empty());
}

#[rstest]
fn serialises_codes_in_snake_case() {
    let err = Error::service_unavailable("down");
    let value = serde_json::to_value(&err).expect("error serialises");
    assert_eq!(value, json!({"code": "service_unavailable", "message": "down"}));
}

#[rstest]
fn deserialisation_rejects_blank_messages() {
    let payload = json!({"code": "not_found", "message": "  "});
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err());
}

#[derive(Debug, Clone)]
enum ConstructedError {
    Success,
    Failure(ErrorValidationError),
}

impl ConstructedError {
    fn from_result(result: Result<Error, ErrorValidationError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => Self::Failure(err),
        }
    }
}

#[given("a valid error payload")]
fn a_valid_error_payload() -> (ErrorCode, String) {
    (ErrorCode::InvalidRequest, "well formed".to_owned())
}

#[given("an error payload with a blank message")]
fn an_error_payload_with_a_blank_message() -> (ErrorCode, String) {
    (ErrorCode::NotFound, "   ".to_owned())
}

#[when("the error is constructed")]
fn the_error_is_constructed(payload: (ErrorCode, String)) -> ConstructedError {
    ConstructedError::from_result(Error::try_new(payload.0, payload.1))
}

#[then("the construction succeeds")]
fn the_construction_succeeds(result: ConstructedError) {
    assert!(matches!(result, ConstructedError::Success));
}

#[then("the construction fails with an empty message error")]
fn the_construction_fails(result: ConstructedError) {
    assert!(matches!(
        result,
        ConstructedError::Failure(ErrorValidationError::EmptyMessage)
    ));
}

#[rstest]
fn constructing_a_valid_error_succeeds() {
    let payload = a_valid_error_payload();
    let result = the_error_is_constructed(payload);
    the_construction_succeeds(result);
}

#[rstest]
fn constructing_a_blank_error_fails() {
    let payload = an_error_payload_with_a_blank_message();
    let result = the_error_is_constructed(payload);
    the_construction_fails(result);
}

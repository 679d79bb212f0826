//! User account services: sign-up, profile updates, authentication and
//! removal.
//!
//! Validation collects every failing field before anything is written. Email
//! uniqueness is checked here and again by the repository so a racing writer
//! still surfaces as the same `email` field error.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use zeroize::Zeroizing;

use super::password::PasswordValidationError;
use super::persistence_errors::{map_hash_error, map_user_persistence_error};
use super::ports::{PasswordHasher, UserRepository};
use super::timestamp::stored_now;
use super::user::{UserValidationError, fields, validate_profile};
use super::{
    DeletedUser, EmailAddress, Error, Password, User, UserId, UserName, ValidationErrors,
};

/// New account details.
#[derive(Clone)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub password_confirmation: Option<Zeroizing<String>>,
}

impl SignupRequest {
    /// Request without a confirmation field.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: Zeroizing::new(password.into()),
            password_confirmation: None,
        }
    }

    /// Attach a confirmation that must match the password.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: impl Into<String>) -> Self {
        self.password_confirmation = Some(Zeroizing::new(confirmation.into()));
        self
    }
}

/// Profile change for an existing account. The password is kept unless one
/// is supplied.
#[derive(Clone)]
pub struct UpdateUserRequest {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: Option<Zeroizing<String>>,
    pub password_confirmation: Option<Zeroizing<String>>,
}

impl UpdateUserRequest {
    /// Profile-only update.
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            password: None,
            password_confirmation: None,
        }
    }

    /// Also change the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Attach a confirmation for the new password.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: impl Into<String>) -> Self {
        self.password_confirmation = Some(Zeroizing::new(confirmation.into()));
        self
    }
}

/// Account service over a [`UserRepository`] and a [`PasswordHasher`].
#[derive(Clone)]
pub struct UserAccountsService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, H> UserAccountsService<U, H> {
    /// Create a new service.
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

fn record_password_error(errors: &mut ValidationErrors, error: PasswordValidationError) {
    let field = match error {
        PasswordValidationError::ConfirmationMismatch => fields::PASSWORD_CONFIRMATION,
        _ => fields::PASSWORD,
    };
    errors.add(field, error.to_string());
}

fn validate_password(
    errors: &mut ValidationErrors,
    password: &str,
    confirmation: Option<&Zeroizing<String>>,
) -> Option<Password> {
    let confirmation = confirmation.map(|value| value.as_str());
    match Password::with_confirmation(password, confirmation) {
        Ok(password) => Some(password),
        Err(error) => {
            record_password_error(errors, error);
            None
        }
    }
}

fn validated_profile(
    errors: &mut ValidationErrors,
    name: &str,
    email: &str,
) -> Option<(UserName, EmailAddress)> {
    match validate_profile(name, email) {
        Ok(profile) => Some(profile),
        Err(profile_errors) => {
            for (field, messages) in profile_errors.iter() {
                for message in messages {
                    errors.add(field, message.as_str());
                }
            }
            None
        }
    }
}

impl<U, H> UserAccountsService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn ensure_email_available(
        &self,
        errors: &mut ValidationErrors,
        email: &EmailAddress,
        owner: Option<UserId>,
    ) -> Result<(), Error> {
        let holder = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_persistence_error)?;
        if holder.is_some_and(|holder| Some(holder.id()) != owner) {
            errors.add(fields::EMAIL, UserValidationError::EmailTaken.to_string());
        }
        Ok(())
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// `invalid_request` with `fieldErrors` when any field fails validation or
    /// the email is already registered.
    pub async fn sign_up(&self, request: SignupRequest) -> Result<User, Error> {
        let mut errors = ValidationErrors::new();
        let profile = validated_profile(&mut errors, &request.name, &request.email);
        let password = validate_password(
            &mut errors,
            &request.password,
            request.password_confirmation.as_ref(),
        );
        if let Some((_, email)) = profile.as_ref() {
            self.ensure_email_available(&mut errors, email, None).await?;
        }

        let (Some((name, email)), Some(password)) = (profile, password) else {
            return Err(Error::validation(&errors));
        };
        errors.into_result().map_err(|errors| Error::validation(&errors))?;

        let digest = self.hasher.hash(&password).map_err(map_hash_error)?;
        let now = stored_now(self.clock.as_ref());
        let user = User::new(UserId::random(), name, email, now)
            .with_password_digest(digest);
        self.users
            .insert(&user)
            .await
            .map_err(map_user_persistence_error)?;

        info!(user_id = %user.id(), "user signed up");
        Ok(user)
    }

    /// Update name, email and optionally the password of an account.
    ///
    /// # Errors
    ///
    /// `not_found` for unknown ids; `invalid_request` for validation failures;
    /// `conflict` when the user is deleted between the read and the write.
    pub async fn update(&self, request: UpdateUserRequest) -> Result<User, Error> {
        let existing = self.require(&request.id).await?;

        let mut errors = ValidationErrors::new();
        let profile = validated_profile(&mut errors, &request.name, &request.email);
        let password = match request.password.as_ref() {
            Some(password) => validate_password(
                &mut errors,
                password,
                request.password_confirmation.as_ref(),
            )
            .map(Some),
            None => Some(None),
        };
        if let Some((_, email)) = profile.as_ref() {
            self.ensure_email_available(&mut errors, email, Some(existing.id()))
                .await?;
        }

        let (Some((name, email)), Some(password)) = (profile, password) else {
            return Err(Error::validation(&errors));
        };
        errors.into_result().map_err(|errors| Error::validation(&errors))?;

        let now = stored_now(self.clock.as_ref());
        let mut updated = existing.with_profile(name, email, now);
        if let Some(password) = password {
            let digest = self.hasher.hash(&password).map_err(map_hash_error)?;
            updated = updated.with_password_digest(digest);
        }
        self.users
            .update(&updated)
            .await
            .map_err(map_user_persistence_error)?;

        info!(user_id = %updated.id(), "user updated");
        Ok(updated)
    }

    /// Return the account matching `email` and `password`.
    ///
    /// Unknown or malformed emails, accounts without a digest and wrong
    /// passwords all yield `Ok(None)`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, Error> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        Ok(user
            .authenticated(self.hasher.as_ref(), password)
            .then_some(user))
    }

    /// Fetch an account by id.
    pub async fn find(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)
    }

    /// Fetch an account by email, compared case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let Ok(email) = EmailAddress::new(email) else {
            return Ok(None);
        };
        self.users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)
    }

    /// Remove an account with its posts and follow edges.
    ///
    /// # Errors
    ///
    /// `not_found` when the account does not exist.
    pub async fn destroy(&self, id: &UserId) -> Result<DeletedUser, Error> {
        let deleted = self
            .users
            .delete(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;

        info!(
            user_id = %id,
            microposts_removed = deleted.microposts_removed,
            relationships_removed = deleted.relationships_removed,
            "user destroyed"
        );
        Ok(deleted)
    }

    /// Number of registered accounts.
    pub async fn count(&self) -> Result<u64, Error> {
        self.users.count().await.map_err(map_user_persistence_error)
    }

    async fn require(&self, id: &UserId) -> Result<User, Error> {
        self.find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[cfg(test)]
#[path = "accounts_service_tests.rs"]
mod tests;

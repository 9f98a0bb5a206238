//! Authentication service.
//!
//! Registration creates the credential record and the profile document;
//! login accepts an email or a phone number plus a password. Password
//! hashing uses Argon2id.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use rand::Rng;

use pepsa_core::{Email, UserId, UserProfile};

use crate::db::{AuthIdentifier, ProfileStore, RepositoryError};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Length of generated user ids.
const UID_LENGTH: usize = 10;

const UID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Registration input, as collected by the register form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    /// Country dialling code, e.g. "+234".
    pub country_code: String,
    /// National number without the dialling code.
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn ProfileStore>,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Register a new customer.
    ///
    /// Writes the credential record and an empty-history profile document.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` / `PasswordMismatch` on password
    /// validation failures.
    /// Returns `AuthError::DuplicateEmail` / `DuplicatePhone` if either
    /// identifier is already registered.
    pub async fn register(&self, input: Registration) -> Result<AuthIdentifier, AuthError> {
        let email = Email::parse(&input.email)?;
        validate_password(&input.password)?;
        if input.password != input.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let phone = format!("{}{}", input.country_code, input.phone_number);

        // Distinct messages for the two duplicate cases
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }
        if self.store.find_by_phone(&phone).await?.is_some() {
            return Err(AuthError::DuplicatePhone);
        }

        let password_hash = hash_password(&input.password)?;
        let uid = UserId::new(generate_uid());
        let created_at = Utc::now();

        let auth = AuthIdentifier {
            uid: uid.clone(),
            email: email.clone(),
            phone: phone.clone(),
            password_hash,
            created_at,
        };
        let profile = UserProfile {
            uid,
            name: input.name,
            email,
            phone,
            address: None,
            landmark: None,
            house_number: None,
            orders: Vec::new(),
            created_at,
        };

        self.store.create(&auth, &profile).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
            other => AuthError::Repository(other),
        })?;

        Ok(auth)
    }

    /// Login with an email address or phone number plus password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the identifier is unknown
    /// or the password is wrong.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthIdentifier, AuthError> {
        let auth = if identifier.contains('@') {
            let email = Email::parse(identifier).map_err(|_| AuthError::InvalidCredentials)?;
            self.store.find_by_email(&email).await?
        } else {
            self.store.find_by_phone(identifier).await?
        };

        let auth = auth.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &auth.password_hash)?;

        Ok(auth)
    }

    /// Change a customer's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the current password is
    /// wrong, `AuthError::WeakPassword` if the new one fails validation.
    pub async fn change_password(
        &self,
        uid: &UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let auth = self.store.auth(uid).await?.ok_or(AuthError::UserNotFound)?;
        verify_password(current, &auth.password_hash)?;
        validate_password(new)?;

        let hash = hash_password(new)?;
        self.store.set_password_hash(uid, &hash).await?;
        Ok(())
    }
}

/// Generate a 10-character lowercase alphanumeric user id.
fn generate_uid() -> String {
    let mut rng = rand::rng();
    (0..UID_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..UID_ALPHABET.len());
            char::from(UID_ALPHABET[idx])
        })
        .collect()
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

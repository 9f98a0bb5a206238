//! Seed the database with development data.
//!
//! Creates customer accounts through the same registration path the
//! storefront uses, so the password hash and profile document match what
//! the running service would produce.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;

use pepsa_storefront::db::{self, PgProfileStore};
use pepsa_storefront::services::auth::{AuthService, Registration};

/// Create a customer account for local development.
///
/// # Arguments
///
/// * `email` - Customer email address
/// * `name` - Customer display name
/// * `phone` - Full phone number including the dialling code
/// * `password` - Plaintext password to hash and store
///
/// # Errors
///
/// Returns an error if environment variables are missing, the database is
/// unreachable, or registration fails (e.g. a duplicate email).
pub async fn customer(
    email: &str,
    name: &str,
    phone: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PEPSA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "PEPSA_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let auth = AuthService::new(Arc::new(PgProfileStore::new(pool)));

    let created = auth
        .register(Registration {
            name: name.to_owned(),
            email: email.to_owned(),
            country_code: String::new(),
            phone_number: phone.to_owned(),
            password: password.to_owned(),
            confirm_password: password.to_owned(),
        })
        .await?;

    info!(uid = created.uid.as_str(), "Customer account created");
    Ok(())
}

//! The user document store.
//!
//! Two records exist per customer: an auth identifier (credentials and
//! contact keys) and a profile document (everything else, order history
//! included). Registration writes them separately and nothing ties the two
//! writes together; a crash between them leaves a credential without a
//! document.
//!
//! First-party mutations go through targeted operations (`append_order`,
//! `apply_patch`, `set_order_status`) that the `PostgreSQL` implementation
//! performs in a single statement. The whole-document `put_profile` write
//! stays last-writer-wins and is only reached through the raw document API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use pepsa_core::{Email, Order, OrderId, OrderStatus, ProfilePatch, UserId, UserProfile};

use super::RepositoryError;

/// A customer's credential record.
#[derive(Debug, Clone)]
pub struct AuthIdentifier {
    pub uid: UserId,
    pub email: Email,
    pub phone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Async interface over the two-record user document store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Create a new customer: credential record plus profile document.
    ///
    /// The two writes are separate and non-atomic.
    async fn create(
        &self,
        auth: &AuthIdentifier,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError>;

    /// Fetch the credential record by uid.
    async fn auth(&self, uid: &UserId) -> Result<Option<AuthIdentifier>, RepositoryError>;

    /// Fetch the credential record by email.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<AuthIdentifier>, RepositoryError>;

    /// Fetch the credential record by phone number.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<AuthIdentifier>, RepositoryError>;

    /// Replace the stored password hash.
    async fn set_password_hash(&self, uid: &UserId, hash: &str) -> Result<(), RepositoryError>;

    /// Fetch the whole profile document.
    async fn profile(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Overwrite the whole profile document. Last writer wins.
    async fn put_profile(
        &self,
        uid: &UserId,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError>;

    /// Append an order to the document's order history.
    async fn append_order(&self, uid: &UserId, order: &Order) -> Result<(), RepositoryError>;

    /// Apply a partial contact/address update to the document.
    async fn apply_patch(
        &self,
        uid: &UserId,
        patch: &ProfilePatch,
    ) -> Result<(), RepositoryError>;

    /// Set the status of one order in the document's history.
    async fn set_order_status(
        &self,
        uid: &UserId,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError>;

    /// Delete both records for a customer.
    async fn delete(&self, uid: &UserId) -> Result<(), RepositoryError>;

    /// Verify the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// PostgreSQL implementation
// =============================================================================

/// `PostgreSQL`-backed document store. Profile documents live in a JSONB
/// column and targeted mutations are single statements.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw `auth_identifier` row, parsed into [`AuthIdentifier`].
#[derive(sqlx::FromRow)]
struct AuthRow {
    uid: String,
    email: String,
    phone: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl AuthRow {
    fn parse(self) -> Result<AuthIdentifier, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(AuthIdentifier {
            uid: UserId::new(self.uid),
            email,
            phone: self.phone,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

const SELECT_AUTH: &str =
    "SELECT uid, email, phone, password_hash, created_at FROM auth_identifier";

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn create(
        &self,
        auth: &AuthIdentifier,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_identifier (uid, email, phone, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(auth.uid.as_str())
        .bind(auth.email.as_str())
        .bind(&auth.phone)
        .bind(&auth.password_hash)
        .bind(auth.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email or phone already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        // Second, separate write. Not transactional with the first.
        sqlx::query(
            "INSERT INTO user_profile (uid, document, updated_at) VALUES ($1, $2, now())",
        )
        .bind(auth.uid.as_str())
        .bind(Json(profile))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn auth(&self, uid: &UserId) -> Result<Option<AuthIdentifier>, RepositoryError> {
        let row: Option<AuthRow> =
            sqlx::query_as(&format!("{SELECT_AUTH} WHERE uid = $1"))
                .bind(uid.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(AuthRow::parse).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AuthIdentifier>, RepositoryError> {
        let row: Option<AuthRow> =
            sqlx::query_as(&format!("{SELECT_AUTH} WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(AuthRow::parse).transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<AuthIdentifier>, RepositoryError> {
        let row: Option<AuthRow> =
            sqlx::query_as(&format!("{SELECT_AUTH} WHERE phone = $1"))
                .bind(phone)
                .fetch_optional(&self.pool)
                .await?;

        row.map(AuthRow::parse).transpose()
    }

    async fn set_password_hash(&self, uid: &UserId, hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE auth_identifier SET password_hash = $2 WHERE uid = $1")
            .bind(uid.as_str())
            .bind(hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn profile(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let document: Option<Json<UserProfile>> =
            sqlx::query_scalar("SELECT document FROM user_profile WHERE uid = $1")
                .bind(uid.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(document.map(|Json(profile)| profile))
    }

    async fn put_profile(
        &self,
        uid: &UserId,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_profile (uid, document, updated_at)
             VALUES ($1, $2, now())
             ON CONFLICT (uid) DO UPDATE SET document = EXCLUDED.document, updated_at = now()",
        )
        .bind(uid.as_str())
        .bind(Json(profile))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn append_order(&self, uid: &UserId, order: &Order) -> Result<(), RepositoryError> {
        // Single-statement append; concurrent appends both land.
        let result = sqlx::query(
            "UPDATE user_profile
             SET document = jsonb_set(
                     document,
                     '{orders}',
                     COALESCE(document->'orders', '[]'::jsonb) || jsonb_build_array($2::jsonb)
                 ),
                 updated_at = now()
             WHERE uid = $1",
        )
        .bind(uid.as_str())
        .bind(Json(order))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn apply_patch(
        &self,
        uid: &UserId,
        patch: &ProfilePatch,
    ) -> Result<(), RepositoryError> {
        if patch.is_empty() {
            return Ok(());
        }

        // The patch serializes only its present fields, so a shallow merge
        // touches exactly those keys.
        let result = sqlx::query(
            "UPDATE user_profile
             SET document = document || $2::jsonb, updated_at = now()
             WHERE uid = $1",
        )
        .bind(uid.as_str())
        .bind(Json(patch))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_order_status(
        &self,
        uid: &UserId,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE user_profile
             SET document = jsonb_set(
                     document,
                     '{orders}',
                     (SELECT COALESCE(jsonb_agg(
                          CASE WHEN (o->>'orderId')::bigint = $2
                               THEN jsonb_set(o, '{status}', to_jsonb($3::text))
                               ELSE o
                          END), '[]'::jsonb)
                      FROM jsonb_array_elements(document->'orders') AS o)
                 ),
                 updated_at = now()
             WHERE uid = $1
               AND document->'orders' @> jsonb_build_array(jsonb_build_object('orderId', $2))",
        )
        .bind(uid.as_str())
        .bind(order_id.as_i64())
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, uid: &UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM auth_identifier WHERE uid = $1")
            .bind(uid.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_profile WHERE uid = $1")
            .bind(uid.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// In-memory implementation
// =============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory document store for tests.
///
/// Counts every store operation so tests can assert that a code path made
/// no store calls at all.
#[derive(Default)]
pub struct MemoryProfileStore {
    auth: Mutex<HashMap<String, AuthIdentifier>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    operations: AtomicUsize,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations performed so far.
    #[must_use]
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn track(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }

    fn lock_auth(&self) -> std::sync::MutexGuard<'_, HashMap<String, AuthIdentifier>> {
        self.auth.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_profiles(&self) -> std::sync::MutexGuard<'_, HashMap<String, UserProfile>> {
        self.profiles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn create(
        &self,
        auth: &AuthIdentifier,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError> {
        self.track();
        {
            let mut records = self.lock_auth();
            let taken = records.values().any(|existing| {
                existing.email == auth.email || existing.phone == auth.phone
            }) || records.contains_key(auth.uid.as_str());
            if taken {
                return Err(RepositoryError::Conflict(
                    "email or phone already registered".to_owned(),
                ));
            }
            records.insert(auth.uid.as_str().to_owned(), auth.clone());
        }
        self.lock_profiles()
            .insert(auth.uid.as_str().to_owned(), profile.clone());
        Ok(())
    }

    async fn auth(&self, uid: &UserId) -> Result<Option<AuthIdentifier>, RepositoryError> {
        self.track();
        Ok(self.lock_auth().get(uid.as_str()).cloned())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AuthIdentifier>, RepositoryError> {
        self.track();
        Ok(self
            .lock_auth()
            .values()
            .find(|a| a.email == *email)
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<AuthIdentifier>, RepositoryError> {
        self.track();
        Ok(self.lock_auth().values().find(|a| a.phone == phone).cloned())
    }

    async fn set_password_hash(&self, uid: &UserId, hash: &str) -> Result<(), RepositoryError> {
        self.track();
        let mut records = self.lock_auth();
        let record = records.get_mut(uid.as_str()).ok_or(RepositoryError::NotFound)?;
        record.password_hash = hash.to_owned();
        Ok(())
    }

    async fn profile(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        self.track();
        Ok(self.lock_profiles().get(uid.as_str()).cloned())
    }

    async fn put_profile(
        &self,
        uid: &UserId,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError> {
        self.track();
        self.lock_profiles()
            .insert(uid.as_str().to_owned(), profile.clone());
        Ok(())
    }

    async fn append_order(&self, uid: &UserId, order: &Order) -> Result<(), RepositoryError> {
        self.track();
        let mut profiles = self.lock_profiles();
        let profile = profiles.get_mut(uid.as_str()).ok_or(RepositoryError::NotFound)?;
        profile.orders.push(order.clone());
        Ok(())
    }

    async fn apply_patch(
        &self,
        uid: &UserId,
        patch: &ProfilePatch,
    ) -> Result<(), RepositoryError> {
        self.track();
        let mut profiles = self.lock_profiles();
        let profile = profiles.get_mut(uid.as_str()).ok_or(RepositoryError::NotFound)?;
        patch.apply(profile);
        Ok(())
    }

    async fn set_order_status(
        &self,
        uid: &UserId,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        self.track();
        let mut profiles = self.lock_profiles();
        let profile = profiles.get_mut(uid.as_str()).ok_or(RepositoryError::NotFound)?;
        let order = profile
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = status;
        Ok(())
    }

    async fn delete(&self, uid: &UserId) -> Result<(), RepositoryError> {
        self.track();
        let removed = self.lock_auth().remove(uid.as_str());
        self.lock_profiles().remove(uid.as_str());
        if removed.is_none() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pepsa_core::{DeliveryMethod, Order, OrderStatus};

    fn auth(uid: &str, email: &str, phone: &str) -> AuthIdentifier {
        AuthIdentifier {
            uid: UserId::new(uid),
            email: Email::parse(email).expect("valid"),
            phone: phone.to_owned(),
            password_hash: "$argon2id$fake".to_owned(),
            created_at: Utc::now(),
        }
    }

    fn profile(uid: &str, email: &str, phone: &str) -> UserProfile {
        UserProfile {
            uid: UserId::new(uid),
            name: "Test Customer".to_owned(),
            email: Email::parse(email).expect("valid"),
            phone: phone.to_owned(),
            address: None,
            landmark: None,
            house_number: None,
            orders: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn order(id: i64) -> Order {
        Order::place(
            pepsa_core::OrderId::new(id),
            Utc::now(),
            OrderStatus::Invoice,
            DeliveryMethod::SelfPickup,
            &[],
        )
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = MemoryProfileStore::new();
        store
            .create(&auth("uid1", "a@b.com", "+2341"), &profile("uid1", "a@b.com", "+2341"))
            .await
            .expect("first create");

        let err = store
            .create(&auth("uid2", "a@b.com", "+2342"), &profile("uid2", "a@b.com", "+2342"))
            .await
            .expect_err("duplicate email");
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_append_order_and_set_status() {
        let store = MemoryProfileStore::new();
        let uid = UserId::new("uid1");
        store
            .create(&auth("uid1", "a@b.com", "+2341"), &profile("uid1", "a@b.com", "+2341"))
            .await
            .expect("create");

        store.append_order(&uid, &order(11_111_111)).await.expect("append");
        store
            .set_order_status(&uid, pepsa_core::OrderId::new(11_111_111), OrderStatus::Paid)
            .await
            .expect("status");

        let stored = store.profile(&uid).await.expect("fetch").expect("exists");
        assert_eq!(stored.orders.len(), 1);
        assert_eq!(stored.orders[0].status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_set_status_unknown_order() {
        let store = MemoryProfileStore::new();
        let uid = UserId::new("uid1");
        store
            .create(&auth("uid1", "a@b.com", "+2341"), &profile("uid1", "a@b.com", "+2341"))
            .await
            .expect("create");

        let err = store
            .set_order_status(&uid, pepsa_core::OrderId::new(999), OrderStatus::Paid)
            .await
            .expect_err("missing order");
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_removes_both_records() {
        let store = MemoryProfileStore::new();
        let uid = UserId::new("uid1");
        store
            .create(&auth("uid1", "a@b.com", "+2341"), &profile("uid1", "a@b.com", "+2341"))
            .await
            .expect("create");

        store.delete(&uid).await.expect("delete");
        assert!(store.auth(&uid).await.expect("auth").is_none());
        assert!(store.profile(&uid).await.expect("profile").is_none());
    }

    #[tokio::test]
    async fn test_operation_counter() {
        let store = MemoryProfileStore::new();
        assert_eq!(store.operations(), 0);
        let _ = store.profile(&UserId::new("nobody")).await;
        assert_eq!(store.operations(), 1);
    }
}

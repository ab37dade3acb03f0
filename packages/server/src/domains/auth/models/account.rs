use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// Account - one per verified phone number
///
/// Phone numbers are hashed for privacy.
/// We never store raw phone numbers in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub phone_hash: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub phone_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Account {
    /// Find account by phone hash
    pub async fn find_by_phone_hash(phone_hash: &str, pool: &PgPool) -> Result<Option<Self>> {
        let account =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE phone_hash = $1")
                .bind(phone_hash)
                .fetch_optional(pool)
                .await?;
        Ok(account)
    }

    /// Create the account for a verified phone, or mark an existing one verified
    pub async fn upsert_verified(phone_hash: &str, pool: &PgPool) -> Result<Self> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, phone_hash, phone_verified_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (phone_hash)
            DO UPDATE SET phone_verified_at = NOW(), updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(phone_hash)
        .fetch_one(pool)
        .await?;
        Ok(account)
    }

    /// Store the password hash for an account that has none yet
    ///
    /// Returns `None` when a password was already set, so a concurrent
    /// registration can never overwrite it.
    pub async fn set_password_hash_if_unset(
        id: Uuid,
        password_hash: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1 AND password_hash IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .fetch_optional(pool)
        .await?;
        Ok(account)
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Hash a phone number using SHA256
///
/// The hash is used as the lookup key in the accounts table and in logs.
pub fn hash_phone_number(phone_number: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(phone_number.as_bytes());
    format!("{:x}", hasher.finalize())
}

//! Registration providers: turn a verified phone + password into a session.
//!
//! A phone that already has a password can only sign in with that
//! password; a phone without one gets the submitted password.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use super::models::{hash_phone_number, Account};
use super::password::{hash_password, verify_password};
use super::JwtService;
use crate::domains::signup::PhoneIdentity;
use crate::kernel::{BaseRegistrationService, RegistrationOutcome, ServiceError};

enum PasswordDecision {
    /// No password yet; store this hash
    Set(String),
    Matches,
    Mismatch,
}

fn decide_password(existing_hash: Option<&str>, password: &str) -> Result<PasswordDecision> {
    match existing_hash {
        None => Ok(PasswordDecision::Set(hash_password(password)?)),
        Some(stored) if verify_password(password, stored)? => Ok(PasswordDecision::Matches),
        Some(_) => Ok(PasswordDecision::Mismatch),
    }
}

// =============================================================================
// Postgres-backed registration
// =============================================================================

pub struct PostgresRegistrationService {
    pool: PgPool,
    jwt_service: Arc<JwtService>,
}

impl PostgresRegistrationService {
    pub fn new(pool: PgPool, jwt_service: Arc<JwtService>) -> Self {
        Self { pool, jwt_service }
    }

    async fn register(&self, identity: &PhoneIdentity, password: &str) -> Result<RegistrationOutcome> {
        let phone_hash = hash_phone_number(&identity.e164());
        let account = Account::upsert_verified(&phone_hash, &self.pool).await?;

        let mut decision = decide_password(account.password_hash.as_deref(), password)?;
        let lost_race = match &decision {
            PasswordDecision::Set(new_hash) => {
                Account::set_password_hash_if_unset(account.id, new_hash, &self.pool)
                    .await?
                    .is_none()
            }
            _ => false,
        };
        if lost_race {
            // Another registration set the password first; check against it
            let current = Account::find_by_phone_hash(&phone_hash, &self.pool)
                .await?
                .context("Account removed during registration")?;
            decision = match current.password_hash.as_deref() {
                Some(stored) if verify_password(password, stored)? => PasswordDecision::Matches,
                _ => PasswordDecision::Mismatch,
            };
        }

        match decision {
            PasswordDecision::Set(_) => {
                info!(account_id = %account.id, "Password set for new account");
            }
            PasswordDecision::Matches => {
                info!(account_id = %account.id, "Existing account signed in");
            }
            PasswordDecision::Mismatch => {
                info!(account_id = %account.id, "Password does not match existing account");
                return Ok(RegistrationOutcome::declined());
            }
        }

        let token = self.jwt_service.create_token(account.id, phone_hash)?;
        Ok(RegistrationOutcome::established(token))
    }
}

#[async_trait]
impl BaseRegistrationService for PostgresRegistrationService {
    async fn complete_registration(
        &self,
        identity: &PhoneIdentity,
        password: &str,
    ) -> Result<RegistrationOutcome, ServiceError> {
        self.register(identity, password).await.map_err(|e| {
            error!("Registration failed: {:#}", e);
            ServiceError::Transport(e.to_string())
        })
    }
}

// =============================================================================
// In-memory registration (no DATABASE_URL configured)
// =============================================================================

#[derive(Debug, Clone)]
struct MemoryAccount {
    id: Uuid,
    password_hash: Option<String>,
}

/// Accounts held in process memory; lost on restart
pub struct InMemoryRegistrationService {
    accounts: Arc<RwLock<HashMap<String, MemoryAccount>>>,
    jwt_service: Arc<JwtService>,
}

impl InMemoryRegistrationService {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            jwt_service,
        }
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    async fn register(&self, identity: &PhoneIdentity, password: &str) -> Result<RegistrationOutcome> {
        let phone_hash = hash_phone_number(&identity.e164());
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .entry(phone_hash.clone())
            .or_insert_with(|| MemoryAccount {
                id: Uuid::now_v7(),
                password_hash: None,
            });

        match decide_password(account.password_hash.as_deref(), password)? {
            PasswordDecision::Set(new_hash) => account.password_hash = Some(new_hash),
            PasswordDecision::Matches => {}
            PasswordDecision::Mismatch => return Ok(RegistrationOutcome::declined()),
        }

        let token = self.jwt_service.create_token(account.id, phone_hash)?;
        Ok(RegistrationOutcome::established(token))
    }
}

#[async_trait]
impl BaseRegistrationService for InMemoryRegistrationService {
    async fn complete_registration(
        &self,
        identity: &PhoneIdentity,
        password: &str,
    ) -> Result<RegistrationOutcome, ServiceError> {
        self.register(identity, password).await.map_err(|e| {
            error!("Registration failed: {:#}", e);
            ServiceError::Transport(e.to_string())
        })
    }
}

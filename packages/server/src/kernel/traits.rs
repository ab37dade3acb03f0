// Capability traits for the external services the signup flow depends on.
//
// Concrete providers (Twilio, Postgres, the HTTP API itself) live behind
// these traits so the wizard and the routes can be driven by mocks in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domains::signup::PhoneIdentity;

/// Failure reported by (or while reaching) an external service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service answered and refused the request; message is user-presentable
    #[error("{0}")]
    Rejected(String),

    /// The service could not be reached or answered with garbage
    #[error("service unavailable: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeVerification {
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub session_established: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl RegistrationOutcome {
    pub fn established(token: impl Into<String>) -> Self {
        Self {
            session_established: true,
            session_token: Some(token.into()),
        }
    }

    pub fn declined() -> Self {
        Self {
            session_established: false,
            session_token: None,
        }
    }
}

// =============================================================================
// OTP Service Trait (Infrastructure - SMS/OTP)
// =============================================================================

#[async_trait]
pub trait BaseOtpService: Send + Sync {
    /// Send a one-time code to the identity's phone
    async fn send_verification_code(&self, identity: &PhoneIdentity) -> Result<(), ServiceError>;

    /// Check a code previously sent to the identity
    async fn verify_code(
        &self,
        identity: &PhoneIdentity,
        code: &str,
    ) -> Result<CodeVerification, ServiceError>;
}

// =============================================================================
// Registration Service Trait (Infrastructure - accounts/sessions)
// =============================================================================

#[async_trait]
pub trait BaseRegistrationService: Send + Sync {
    /// Create or complete the account for a verified phone and sign it in
    async fn complete_registration(
        &self,
        identity: &PhoneIdentity,
        password: &str,
    ) -> Result<RegistrationOutcome, ServiceError>;
}

#[async_trait]
impl<T: BaseOtpService + ?Sized> BaseOtpService for std::sync::Arc<T> {
    async fn send_verification_code(&self, identity: &PhoneIdentity) -> Result<(), ServiceError> {
        (**self).send_verification_code(identity).await
    }

    async fn verify_code(
        &self,
        identity: &PhoneIdentity,
        code: &str,
    ) -> Result<CodeVerification, ServiceError> {
        (**self).verify_code(identity, code).await
    }
}

#[async_trait]
impl<T: BaseRegistrationService + ?Sized> BaseRegistrationService for std::sync::Arc<T> {
    async fn complete_registration(
        &self,
        identity: &PhoneIdentity,
        password: &str,
    ) -> Result<RegistrationOutcome, ServiceError> {
        (**self).complete_registration(identity, password).await
    }
}

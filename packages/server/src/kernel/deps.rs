//! Server dependencies for dependency injection
//!
//! Concrete providers are wrapped in adapters implementing the kernel
//! traits, so routes only ever see `Arc<dyn Base*>`.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use twilio::{TwilioError, TwilioService};

use crate::config::OtpCheckPolicy;
use crate::domains::auth::{hash_phone_number, VerifiedPhoneStore};
use crate::domains::signup::PhoneIdentity;
use crate::kernel::{BaseOtpService, BaseRegistrationService, CodeVerification, ServiceError};

// =============================================================================
// TwilioService Adapter (implements BaseOtpService trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseOtpService trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

fn map_twilio_error(e: TwilioError) -> ServiceError {
    match e {
        TwilioError::Api { message, .. } => ServiceError::Rejected(message),
        TwilioError::Transport(message) | TwilioError::Decode(message) => {
            ServiceError::Transport(message)
        }
    }
}

#[async_trait]
impl BaseOtpService for TwilioAdapter {
    async fn send_verification_code(&self, identity: &PhoneIdentity) -> Result<(), ServiceError> {
        self.0
            .send_otp(&identity.e164())
            .await
            .map(|_| ())
            .map_err(|e| {
                error!(
                    phone_hash = %hash_phone_number(&identity.e164()),
                    "Failed to send OTP: {}", e
                );
                map_twilio_error(e)
            })
    }

    async fn verify_code(
        &self,
        identity: &PhoneIdentity,
        code: &str,
    ) -> Result<CodeVerification, ServiceError> {
        self.0
            .verify_otp(&identity.e164(), code)
            .await
            .map(|verified| CodeVerification { verified })
            .map_err(|e| {
                error!(
                    phone_hash = %hash_phone_number(&identity.e164()),
                    "OTP verification request failed: {}", e
                );
                map_twilio_error(e)
            })
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to route handlers (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    /// Present when DATABASE_URL is configured
    pub db_pool: Option<PgPool>,
    pub otp: Arc<dyn BaseOtpService>,
    pub registration: Arc<dyn BaseRegistrationService>,
    /// Phones that passed OTP verification and may complete registration
    pub verified_phones: VerifiedPhoneStore,
    pub otp_check_policy: OtpCheckPolicy,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: Option<PgPool>,
        otp: Arc<dyn BaseOtpService>,
        registration: Arc<dyn BaseRegistrationService>,
        verified_phones: VerifiedPhoneStore,
        otp_check_policy: OtpCheckPolicy,
    ) -> Self {
        Self {
            db_pool,
            otp,
            registration,
            verified_phones,
            otp_check_policy,
        }
    }
}

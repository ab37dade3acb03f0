// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps or a
// WizardController for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{
    BaseOtpService, BaseRegistrationService, CodeVerification, RegistrationOutcome, ServerDeps,
    ServiceError,
};
use crate::config::OtpCheckPolicy;
use crate::domains::auth::VerifiedPhoneStore;
use crate::domains::signup::PhoneIdentity;

// =============================================================================
// Mock OTP Service
// =============================================================================

pub struct MockOtpService {
    sent: Arc<Mutex<Vec<PhoneIdentity>>>,
    verify_calls: Arc<Mutex<Vec<(PhoneIdentity, String)>>>,
    accepted_code: Option<String>,
    send_error: Option<ServiceError>,
    verify_error: Option<ServiceError>,
}

impl MockOtpService {
    /// Accepts every code
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            verify_calls: Arc::new(Mutex::new(Vec::new())),
            accepted_code: None,
            send_error: None,
            verify_error: None,
        }
    }

    /// Only this code verifies; everything else is rejected
    pub fn with_accepted_code(mut self, code: &str) -> Self {
        self.accepted_code = Some(code.to_string());
        self
    }

    pub fn failing_send(mut self, error: ServiceError) -> Self {
        self.send_error = Some(error);
        self
    }

    pub fn failing_verify(mut self, error: ServiceError) -> Self {
        self.verify_error = Some(error);
        self
    }

    /// Identities a code was sent to, in order
    pub fn sent_to(&self) -> Vec<PhoneIdentity> {
        self.sent.lock().unwrap().clone()
    }

    /// (identity, code) pairs passed to verify, in order
    pub fn verify_calls(&self) -> Vec<(PhoneIdentity, String)> {
        self.verify_calls.lock().unwrap().clone()
    }
}

impl Default for MockOtpService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseOtpService for MockOtpService {
    async fn send_verification_code(&self, identity: &PhoneIdentity) -> Result<(), ServiceError> {
        if let Some(error) = &self.send_error {
            return Err(error.clone());
        }
        self.sent.lock().unwrap().push(identity.clone());
        Ok(())
    }

    async fn verify_code(
        &self,
        identity: &PhoneIdentity,
        code: &str,
    ) -> Result<CodeVerification, ServiceError> {
        self.verify_calls
            .lock()
            .unwrap()
            .push((identity.clone(), code.to_string()));

        if let Some(error) = &self.verify_error {
            return Err(error.clone());
        }
        let verified = match &self.accepted_code {
            Some(accepted) => accepted == code,
            None => true,
        };
        Ok(CodeVerification { verified })
    }
}

// =============================================================================
// Mock Registration Service
// =============================================================================

pub struct MockRegistrationService {
    calls: Arc<Mutex<Vec<(PhoneIdentity, String)>>>,
    outcome: Result<RegistrationOutcome, ServiceError>,
}

impl MockRegistrationService {
    /// Establishes a session for every call
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            outcome: Ok(RegistrationOutcome::established("mock-session-token")),
        }
    }

    pub fn declining(mut self) -> Self {
        self.outcome = Ok(RegistrationOutcome::declined());
        self
    }

    pub fn failing(mut self, error: ServiceError) -> Self {
        self.outcome = Err(error);
        self
    }

    /// (identity, password) pairs passed to the service, in order
    pub fn calls(&self) -> Vec<(PhoneIdentity, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockRegistrationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRegistrationService for MockRegistrationService {
    async fn complete_registration(
        &self,
        identity: &PhoneIdentity,
        password: &str,
    ) -> Result<RegistrationOutcome, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((identity.clone(), password.to_string()));
        self.outcome.clone()
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub otp: Arc<MockOtpService>,
    pub registration: Arc<MockRegistrationService>,
    pub verified_phones: VerifiedPhoneStore,
    pub otp_check_policy: OtpCheckPolicy,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            otp: Arc::new(MockOtpService::new()),
            registration: Arc::new(MockRegistrationService::new()),
            verified_phones: VerifiedPhoneStore::default(),
            otp_check_policy: OtpCheckPolicy::Provider,
        }
    }

    /// Set a mock OTP service
    pub fn mock_otp(mut self, otp: MockOtpService) -> Self {
        self.otp = Arc::new(otp);
        self
    }

    /// Set a mock registration service
    pub fn mock_registration(mut self, registration: MockRegistrationService) -> Self {
        self.registration = Arc::new(registration);
        self
    }

    pub fn otp_check_policy(mut self, policy: OtpCheckPolicy) -> Self {
        self.otp_check_policy = policy;
        self
    }

    /// Convert into ServerDeps for testing (no database)
    pub fn into_server_deps(self) -> ServerDeps {
        ServerDeps::new(
            None,
            self.otp,
            self.registration,
            self.verified_phones,
            self.otp_check_policy,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

//! Signup wizard controller.
//!
//! State machine over [`Step::VerifyPhone`] → [`Step::SetPassword`] →
//! [`Step::Success`]. Each intent validates locally first; services are
//! only called once validation passes, and their response is awaited
//! before the step changes.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::countdown::{lock_state, Countdown};
use super::errors::SignupError;
use super::messages::{Locale, Message};
use super::state::{PhoneIdentity, Step, WizardState, RESEND_COOLDOWN_SECS};
use super::validation::{
    validate_confirmation, validate_consent, validate_otp, validate_password,
    validate_phone_number, Field, RegionPolicies,
};
use super::views::StepView;
use crate::domains::preferences::PreferenceStore;
use crate::kernel::{BaseOtpService, BaseRegistrationService, RegistrationOutcome, ServiceError};

pub struct WizardController<O, R> {
    state: Arc<Mutex<WizardState>>,
    otp: O,
    registration: R,
    policies: RegionPolicies,
    preferences: PreferenceStore,
    countdown: Option<Countdown>,
    session: Option<RegistrationOutcome>,
}

impl<O, R> WizardController<O, R>
where
    O: BaseOtpService,
    R: BaseRegistrationService,
{
    pub fn new(otp: O, registration: R) -> Self {
        Self {
            state: Arc::new(Mutex::new(WizardState::default())),
            otp,
            registration,
            policies: RegionPolicies::default(),
            preferences: PreferenceStore::default(),
            countdown: None,
            session: None,
        }
    }

    pub fn with_policies(mut self, policies: RegionPolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_preferences(mut self, preferences: PreferenceStore) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_region(self, region_code: impl Into<String>) -> Self {
        self.lock().region_code = region_code.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        lock_state(&self.state)
    }

    fn locale(&self) -> Locale {
        self.preferences.locale()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> WizardState {
        self.lock().clone()
    }

    pub fn step(&self) -> Step {
        self.lock().step
    }

    /// Presentational view of the current state
    pub fn view(&self) -> StepView {
        StepView::render(&self.snapshot(), self.locale())
    }

    /// Outcome of the registration call once the wizard reached success
    pub fn session(&self) -> Option<&RegistrationOutcome> {
        self.session.as_ref()
    }

    // =========================================================================
    // Field edits
    // =========================================================================

    pub fn set_region_code(&mut self, region_code: impl Into<String>) {
        let mut state = self.lock();
        state.region_code = region_code.into();
        state.clear_error(Field::PhoneNumber);
    }

    pub fn set_phone_number(&mut self, phone_number: impl Into<String>) {
        let mut state = self.lock();
        state.phone_number = phone_number.into();
        state.clear_error(Field::PhoneNumber);
    }

    pub fn set_otp(&mut self, otp: impl Into<String>) {
        let mut state = self.lock();
        state.otp = otp.into();
        state.clear_error(Field::Otp);
    }

    pub fn set_consent(&mut self, consent: bool) {
        let mut state = self.lock();
        state.consent = consent;
        state.clear_error(Field::Consent);
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        let mut state = self.lock();
        state.password = password.into();
        state.clear_error(Field::Password);
    }

    pub fn set_confirm_password(&mut self, confirm_password: impl Into<String>) {
        let mut state = self.lock();
        state.confirm_password = confirm_password.into();
        state.clear_error(Field::ConfirmPassword);
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Request a code for the current phone identity.
    ///
    /// Has no effect while the resend countdown is running.
    pub async fn send_code(&mut self) -> Result<(), SignupError> {
        let locale = self.locale();
        let identity = {
            let mut state = self.lock();
            expect_step(&state, Step::VerifyPhone, "send_code")?;

            if state.countdown_active() {
                return Err(SignupError::CooldownActive {
                    remaining_seconds: state.countdown_seconds,
                });
            }

            let policy = self.policies.policy_for(&state.region_code);
            let result = validate_phone_number(&state.phone_number, &policy, locale);
            state.apply_validation(&[Field::PhoneNumber], &result);
            if !result.ok() {
                return Err(SignupError::Validation(result));
            }
            state.identity()
        };

        debug!("Sending verification code to {}", identity);
        match self.otp.send_verification_code(&identity).await {
            Ok(()) => {
                {
                    let mut state = self.lock();
                    state.pending_identity = Some(identity.clone());
                    state.code_sent = true;
                    state.banner = Some(Message::CodeSent.text(locale).to_string());
                }
                self.countdown = Some(Countdown::start(&self.state, RESEND_COOLDOWN_SECS));
                info!("Verification code sent to {}", identity);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to send verification code to {}: {}", identity, e);
                let message = service_message(&e, Message::SendFailed, locale);
                self.lock().set_error(Field::PhoneNumber, message);
                Err(e.into())
            }
        }
    }

    /// Verify the entered code and move on to password setup.
    pub async fn submit_verification(&mut self) -> Result<(), SignupError> {
        let locale = self.locale();
        let (identity, code) = {
            let mut state = self.lock();
            expect_step(&state, Step::VerifyPhone, "submit_verification")?;

            let result = validate_otp(&state.otp, locale).merge(validate_consent(state.consent, locale));
            state.apply_validation(&[Field::Otp, Field::Consent], &result);
            if !result.ok() {
                return Err(SignupError::Validation(result));
            }

            let identity = state.identity();
            match &state.pending_identity {
                None => {
                    state.set_error(Field::Otp, Message::CodeNotSent.text(locale));
                    return Err(SignupError::CodeNotSent);
                }
                Some(sent_to) if *sent_to != identity => {
                    debug!("Code was sent to {} but wizard now holds {}", sent_to, identity);
                    state.set_error(Field::Otp, Message::StaleCode.text(locale));
                    return Err(SignupError::StaleIdentity);
                }
                Some(_) => {}
            }
            (identity, state.otp.clone())
        };

        match self.otp.verify_code(&identity, &code).await {
            Ok(verification) if verification.verified => {
                let mut state = self.lock();
                state.is_verified = true;
                state.verified_identity = Some(identity.clone());
                state.step = Step::SetPassword;
                state.banner = Some(Message::VerificationSucceeded.text(locale).to_string());
                info!("Phone {} verified", identity);
                Ok(())
            }
            Ok(_) => {
                self.lock()
                    .set_error(Field::Otp, Message::CodeRejected.text(locale));
                Err(SignupError::CodeRejected)
            }
            Err(e) => {
                warn!("Code verification for {} failed: {}", identity, e);
                let message = service_message(&e, Message::CodeRejected, locale);
                self.lock().set_error(Field::Otp, message);
                Err(e.into())
            }
        }
    }

    /// Return to phone verification, discarding the password fields.
    pub fn back(&mut self) -> Result<(), SignupError> {
        let mut state = self.lock();
        expect_step(&state, Step::SetPassword, "back")?;

        state.clear_password_fields();
        state.is_verified = false;
        state.verified_identity = None;
        state.banner = None;
        state.step = Step::VerifyPhone;
        Ok(())
    }

    /// Set the password and complete registration for the verified phone.
    pub async fn submit_password(&mut self) -> Result<(), SignupError> {
        let locale = self.locale();
        let (identity, password) = {
            let mut state = self.lock();
            expect_step(&state, Step::SetPassword, "submit_password")?;

            let result = validate_password(&state.password, locale).merge(validate_confirmation(
                &state.password,
                &state.confirm_password,
                locale,
            ));
            state.apply_validation(&[Field::Password, Field::ConfirmPassword], &result);
            if !result.ok() {
                return Err(SignupError::Validation(result));
            }

            let identity = state
                .verified_identity
                .clone()
                .ok_or(SignupError::StaleIdentity)?;
            (identity, state.password.clone())
        };

        match self
            .registration
            .complete_registration(&identity, &password)
            .await
        {
            Ok(outcome) if outcome.session_established => {
                {
                    let mut state = self.lock();
                    state.step = Step::Success;
                    state.banner = Some(Message::RegistrationSucceeded.text(locale).to_string());
                }
                self.session = Some(outcome);
                info!("Registration completed for {}", identity);
                Ok(())
            }
            Ok(_) => {
                self.lock()
                    .set_error(Field::Password, Message::RegistrationFailed.text(locale));
                Err(SignupError::RegistrationDeclined)
            }
            Err(e) => {
                warn!("Registration for {} failed: {}", identity, e);
                let message = service_message(&e, Message::RegistrationFailed, locale);
                self.lock().set_error(Field::Password, message);
                Err(e.into())
            }
        }
    }

    /// Start a new signup from scratch.
    pub fn restart(&mut self) -> Result<(), SignupError> {
        expect_step(&self.lock(), Step::Success, "restart")?;

        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        self.session = None;
        self.lock().reset();
        Ok(())
    }

    /// Identity the next verify call would use
    pub fn current_identity(&self) -> PhoneIdentity {
        self.lock().identity()
    }
}

fn expect_step(state: &WizardState, expected: Step, intent: &'static str) -> Result<(), SignupError> {
    if state.step == expected {
        Ok(())
    } else {
        Err(SignupError::WrongStep {
            intent,
            step: state.step,
        })
    }
}

/// Field message for a failed service call
fn service_message(error: &ServiceError, fallback: Message, locale: Locale) -> String {
    match error {
        ServiceError::Rejected(message) if !message.trim().is_empty() => message.clone(),
        ServiceError::Rejected(_) => fallback.text(locale).to_string(),
        ServiceError::Transport(_) => Message::NetworkError.text(locale).to_string(),
    }
}

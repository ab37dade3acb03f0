use thiserror::Error;

use super::state::Step;
use super::validation::ValidationResult;
use crate::kernel::ServiceError;

/// Why a wizard intent did not advance the flow
#[derive(Error, Debug)]
pub enum SignupError {
    /// Local field validation failed; no service was called
    #[error("validation failed for {} field(s)", .0.field_errors.len())]
    Validation(ValidationResult),

    /// The phone number changed after the code was sent
    #[error("verification code was issued for a different phone number")]
    StaleIdentity,

    #[error("no verification code has been sent")]
    CodeNotSent,

    #[error("a new code can be requested in {remaining_seconds}s")]
    CooldownActive { remaining_seconds: u32 },

    #[error("{intent} is not available on step {step}")]
    WrongStep { intent: &'static str, step: Step },

    #[error("verification code rejected")]
    CodeRejected,

    #[error("registration was not completed")]
    RegistrationDeclined,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

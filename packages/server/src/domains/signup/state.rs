use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::{Field, ValidationResult};

/// Seconds before another code can be requested
pub const RESEND_COOLDOWN_SECS: u32 = 60;

pub const DEFAULT_REGION_CODE: &str = "+86";

/// Addressing key for OTP operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneIdentity {
    pub region_code: String,
    pub phone_number: String,
}

impl PhoneIdentity {
    pub fn new(region_code: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            region_code: region_code.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Identity known only by its full number, as received on the HTTP API.
    pub fn from_e164(full_number: impl Into<String>) -> Self {
        Self {
            region_code: String::new(),
            phone_number: full_number.into(),
        }
    }

    /// Region code and national number concatenated
    pub fn e164(&self) -> String {
        format!("{}{}", self.region_code, self.phone_number)
    }
}

impl fmt::Display for PhoneIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.region_code, self.phone_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    VerifyPhone,
    SetPassword,
    Success,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::VerifyPhone, Step::SetPassword, Step::Success];

    /// 1-based position shown in the step indicator
    pub fn number(self) -> u8 {
        match self {
            Step::VerifyPhone => 1,
            Step::SetPassword => 2,
            Step::Success => 3,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::VerifyPhone => write!(f, "verify-phone"),
            Step::SetPassword => write!(f, "set-password"),
            Step::Success => write!(f, "success"),
        }
    }
}

/// Everything the wizard knows between mount and teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub step: Step,
    pub region_code: String,
    pub phone_number: String,
    pub otp: String,
    pub consent: bool,
    pub password: String,
    pub confirm_password: String,
    pub is_verified: bool,
    pub countdown_seconds: u32,
    pub errors: BTreeMap<Field, String>,
    /// A code has been sent at least once since the last restart
    pub code_sent: bool,
    /// Identity used by the most recent successful send
    pub pending_identity: Option<PhoneIdentity>,
    /// Identity confirmed by the verify call, carried into password setup
    pub verified_identity: Option<PhoneIdentity>,
    /// Informational banner (code sent, registration complete)
    pub banner: Option<String>,
}

impl WizardState {
    pub fn new(region_code: impl Into<String>) -> Self {
        Self {
            step: Step::VerifyPhone,
            region_code: region_code.into(),
            phone_number: String::new(),
            otp: String::new(),
            consent: false,
            password: String::new(),
            confirm_password: String::new(),
            is_verified: false,
            countdown_seconds: 0,
            errors: BTreeMap::new(),
            code_sent: false,
            pending_identity: None,
            verified_identity: None,
            banner: None,
        }
    }

    pub fn identity(&self) -> PhoneIdentity {
        PhoneIdentity::new(self.region_code.clone(), self.phone_number.clone())
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown_seconds > 0
    }

    /// One countdown tick. Returns `true` while more ticks are needed.
    pub fn tick(&mut self) -> bool {
        self.countdown_seconds = self.countdown_seconds.saturating_sub(1);
        self.countdown_seconds > 0
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn set_error(&mut self, field: Field, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn clear_error(&mut self, field: Field) {
        self.errors.remove(&field);
    }

    /// Replace the errors of the validated fields with the result's errors
    pub fn apply_validation(&mut self, fields: &[Field], result: &ValidationResult) {
        for field in fields {
            self.errors.remove(field);
        }
        for (field, message) in &result.field_errors {
            self.errors.insert(*field, message.clone());
        }
    }

    pub fn clear_password_fields(&mut self) {
        self.password.clear();
        self.confirm_password.clear();
        self.errors.remove(&Field::Password);
        self.errors.remove(&Field::ConfirmPassword);
    }

    /// Back to a freshly mounted wizard, keeping the selected region
    pub fn reset(&mut self) {
        let region_code = std::mem::take(&mut self.region_code);
        *self = Self::new(region_code);
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_CODE)
    }
}

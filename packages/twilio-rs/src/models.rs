use serde::{Deserialize, Serialize};

/// Response body of `POST /v2/Services/{sid}/Verifications`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OTPResponse {
    pub sid: String,
    pub status: String,
    pub to: String,
    pub channel: String,
    #[serde(default)]
    pub valid: bool,
}

/// Response body of `POST /v2/Services/{sid}/VerificationCheck`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OTPVerifyResponse {
    pub status: String,
    #[serde(default)]
    pub valid: bool,
}

impl OTPVerifyResponse {
    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}

/// Error body returned by the Twilio REST API
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

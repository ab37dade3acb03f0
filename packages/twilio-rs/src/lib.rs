// https://www.twilio.com/docs/verify/api

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client, StatusCode};

use crate::models::{OTPResponse, OTPVerifyResponse, TwilioErrorBody};

const DEFAULT_BASE_URL: &str = "https://verify.twilio.com";

#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    /// Twilio answered with a non-success status
    #[error("Twilio returned an error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request to Twilio failed: {0}")]
    Transport(String),

    #[error("Error parsing Twilio response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    pub service_id: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    base_url: String,
    client: Client,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Point the client at a different host (local stubs, regional edges)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, resource: &str) -> String {
        format!(
            "{base}/v2/Services/{serv_id}/{resource}",
            base = self.base_url,
            serv_id = self.options.service_id,
        )
    }

    fn form_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers
    }

    /// Start an SMS verification for an E.164 phone number.
    pub async fn send_otp(&self, recipient: &str) -> Result<OTPResponse, TwilioError> {
        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("Channel", "sms");

        let response = self
            .client
            .post(self.url("Verifications"))
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(Self::form_headers())
            .form(&form_body)
            .send()
            .await
            .map_err(|e| TwilioError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        response
            .json::<OTPResponse>()
            .await
            .map_err(|e| TwilioError::Decode(e.to_string()))
    }

    /// Check a code against the pending verification.
    ///
    /// Returns `Ok(false)` when Twilio rejects the code or no pending
    /// verification exists (expired, already approved, never sent).
    pub async fn verify_otp(&self, recipient: &str, code: &str) -> Result<bool, TwilioError> {
        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("Code", code);

        let response = self
            .client
            .post(self.url("VerificationCheck"))
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(Self::form_headers())
            .form(&form_body)
            .send()
            .await
            .map_err(|e| TwilioError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let result = response
            .json::<OTPVerifyResponse>()
            .await
            .map_err(|e| TwilioError::Decode(e.to_string()))?;
        Ok(result.is_approved())
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> TwilioError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<TwilioErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or(body);
    TwilioError::Api {
        status: status.as_u16(),
        message,
    }
}

//! HTTP client for the signup API.
//!
//! Implements the wizard's OTP and registration capabilities on top of
//! `/api/phone-number/*`, so the terminal wizard runs the same flow as a
//! browser would.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use signup_core::domains::signup::PhoneIdentity;
use signup_core::kernel::{
    BaseOtpService, BaseRegistrationService, CodeVerification, RegistrationOutcome, ServiceError,
};
use tracing::debug;

/// Union of the response bodies the API returns
#[derive(Debug, Default, Deserialize)]
struct ApiBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    verified: Option<bool>,
    #[serde(default)]
    token: Option<String>,
}

pub struct HttpAuthClient {
    base_url: String,
    client: Client,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(StatusCode, ApiBody), ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or_default();
        Ok((status, body))
    }
}

/// Non-success answer from the API, surfaced with the server's message
fn rejected(status: StatusCode, body: ApiBody) -> ServiceError {
    ServiceError::Rejected(body.error.unwrap_or_else(|| status.to_string()))
}

#[async_trait]
impl BaseOtpService for HttpAuthClient {
    async fn send_verification_code(&self, identity: &PhoneIdentity) -> Result<(), ServiceError> {
        let (status, body) = self
            .post(
                "/api/phone-number/send-otp",
                json!({ "phoneNumber": identity.e164() }),
            )
            .await?;

        if status.is_success() {
            Ok(())
        } else {
            Err(rejected(status, body))
        }
    }

    async fn verify_code(
        &self,
        identity: &PhoneIdentity,
        code: &str,
    ) -> Result<CodeVerification, ServiceError> {
        let (status, body) = self
            .post(
                "/api/phone-number/verify-otp",
                json!({ "phoneNumber": identity.e164(), "otp": code }),
            )
            .await?;

        match status {
            s if s.is_success() => Ok(CodeVerification {
                verified: body.verified.unwrap_or(false),
            }),
            // Shape is validated locally, so a 400 here is a wrong code
            StatusCode::BAD_REQUEST => Ok(CodeVerification { verified: false }),
            s => Err(rejected(s, body)),
        }
    }
}

#[async_trait]
impl BaseRegistrationService for HttpAuthClient {
    async fn complete_registration(
        &self,
        identity: &PhoneIdentity,
        password: &str,
    ) -> Result<RegistrationOutcome, ServiceError> {
        let (status, body) = self
            .post(
                "/api/phone-number/register",
                json!({ "phoneNumber": identity.e164(), "password": password }),
            )
            .await?;

        if !status.is_success() {
            return Err(rejected(status, body));
        }
        match body.token {
            Some(token) => Ok(RegistrationOutcome::established(token)),
            None => Ok(RegistrationOutcome::declined()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn identity() -> PhoneIdentity {
        PhoneIdentity::new("+86", "13800000000")
    }

    #[tokio::test]
    async fn test_send_uses_full_number() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/phone-number/send-otp")
            .match_body(Matcher::Json(json!({ "phoneNumber": "+8613800000000" })))
            .with_status(200)
            .with_body(r#"{"message":"OTP sent successfully"}"#)
            .create_async()
            .await;

        let client = HttpAuthClient::new(format!("{}/", server.url()));
        client.send_verification_code(&identity()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_rejection_keeps_server_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/phone-number/send-otp")
            .with_status(400)
            .with_body(r#"{"error":"Invalid phone number format"}"#)
            .create_async()
            .await;

        let client = HttpAuthClient::new(server.url());
        let err = client.send_verification_code(&identity()).await.unwrap_err();
        assert_eq!(err, ServiceError::Rejected("Invalid phone number format".into()));
    }

    #[tokio::test]
    async fn test_verify_maps_status_to_outcome() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/phone-number/verify-otp")
            .match_body(Matcher::PartialJson(json!({ "otp": "123456" })))
            .with_status(200)
            .with_body(r#"{"success":true,"verified":true,"message":"验证码验证成功"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/phone-number/verify-otp")
            .match_body(Matcher::PartialJson(json!({ "otp": "000000" })))
            .with_status(400)
            .with_body(r#"{"error":"验证码错误，请重试"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/phone-number/verify-otp")
            .match_body(Matcher::PartialJson(json!({ "otp": "999999" })))
            .with_status(500)
            .with_body(r#"{"error":"验证失败，请重试"}"#)
            .create_async()
            .await;

        let client = HttpAuthClient::new(server.url());
        assert!(client.verify_code(&identity(), "123456").await.unwrap().verified);
        assert!(!client.verify_code(&identity(), "000000").await.unwrap().verified);
        assert_eq!(
            client.verify_code(&identity(), "999999").await.unwrap_err(),
            ServiceError::Rejected("验证失败，请重试".into())
        );
    }

    #[tokio::test]
    async fn test_register_returns_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/phone-number/register")
            .with_status(200)
            .with_body(r#"{"success":true,"token":"jwt-token"}"#)
            .create_async()
            .await;

        let client = HttpAuthClient::new(server.url());
        let outcome = client
            .complete_registration(&identity(), "abcdefg1!")
            .await
            .unwrap();
        assert_eq!(outcome, RegistrationOutcome::established("jwt-token"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let client = HttpAuthClient::new("http://127.0.0.1:9");
        let err = client.send_verification_code(&identity()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }
}

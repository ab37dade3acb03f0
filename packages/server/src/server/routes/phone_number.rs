//! Phone-number OTP and registration endpoints.
//!
//! Request bodies are parsed by hand so malformed JSON maps onto the
//! documented error bodies instead of axum's default rejections.

use axum::{body::Bytes, extract::Extension, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::config::OtpCheckPolicy;
use crate::domains::auth::hash_phone_number;
use crate::domains::preferences::Locale;
use crate::domains::signup::validation::{is_e164, is_otp_shape, meets_password_policy};
use crate::domains::signup::{Message, PhoneIdentity};
use crate::kernel::ServiceError;
use crate::server::app::AppState;

/// Error strings on this API are fixed to Simplified Chinese
const API_LOCALE: Locale = Locale::ZhCn;

pub type ApiResponse = (StatusCode, Json<Value>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (status, Json(json!({ "error": message.into() })))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendOtpRequest {
    #[serde(default)]
    phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpRequest {
    #[serde(default)]
    phone_number: Option<String>,
    /// Any JSON value; non-strings fail the shape check rather than parsing
    #[serde(default)]
    otp: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// `GET /api/phone-number/send-otp` - liveness probe
pub async fn send_otp_probe_handler() -> Json<Value> {
    Json(json!({ "message": "Healthy" }))
}

/// `POST /api/phone-number/send-otp`
pub async fn send_otp_handler(Extension(state): Extension<AppState>, body: Bytes) -> ApiResponse {
    let request: SendOtpRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let Some(phone_number) = non_empty(request.phone_number) else {
        return error_response(StatusCode::BAD_REQUEST, "Phone number is required");
    };

    if !is_e164(&phone_number) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid phone number format");
    }

    let identity = PhoneIdentity::from_e164(phone_number);
    match state.deps.otp.send_verification_code(&identity).await {
        Ok(()) => {
            info!(phone_hash = %hash_phone_number(&identity.e164()), "OTP sent");
            (
                StatusCode::OK,
                Json(json!({ "message": "OTP sent successfully" })),
            )
        }
        Err(ServiceError::Rejected(message)) => {
            warn!("OTP provider rejected send: {}", message);
            error_response(StatusCode::BAD_REQUEST, message)
        }
        Err(ServiceError::Transport(message)) => {
            error!("Error sending OTP: {}", message);
            error_response(StatusCode::BAD_REQUEST, message)
        }
    }
}

/// `POST /api/phone-number/verify-otp`
pub async fn verify_otp_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> ApiResponse {
    let request: VerifyOtpRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!("OTP verification error: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Message::VerificationFailed.text(API_LOCALE),
            );
        }
    };

    let otp = request
        .otp
        .filter(|v| !v.is_null() && v.as_str() != Some(""));
    let (Some(phone_number), Some(otp)) = (non_empty(request.phone_number), otp) else {
        return error_response(StatusCode::BAD_REQUEST, "Phone number and OTP are required");
    };

    let Some(otp) = otp.as_str().filter(|code| is_otp_shape(code)).map(str::to_string) else {
        return error_response(StatusCode::BAD_REQUEST, Message::InvalidOtp.text(API_LOCALE));
    };

    let phone_hash = hash_phone_number(&phone_number);
    debug!(%phone_hash, "Verifying OTP");

    let verified = match effective_policy(state.deps.otp_check_policy) {
        OtpCheckPolicy::PrefixOne => otp.starts_with('1'),
        OtpCheckPolicy::Provider => {
            let identity = PhoneIdentity::from_e164(phone_number.clone());
            match state.deps.otp.verify_code(&identity, &otp).await {
                Ok(verification) => verification.verified,
                Err(e) => {
                    error!(%phone_hash, "OTP verification error: {}", e);
                    return error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Message::VerificationFailed.text(API_LOCALE),
                    );
                }
            }
        }
    };

    if !verified {
        info!(%phone_hash, "OTP rejected");
        return error_response(StatusCode::BAD_REQUEST, Message::CodeRejected.text(API_LOCALE));
    }

    state.deps.verified_phones.mark_verified(&phone_number).await;
    info!(%phone_hash, "OTP verified");
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": Message::VerificationSucceeded.text(API_LOCALE),
            "verified": true,
        })),
    )
}

/// The prefix placeholder is a development aid; release builds always ask the provider.
fn effective_policy(configured: OtpCheckPolicy) -> OtpCheckPolicy {
    if configured == OtpCheckPolicy::PrefixOne && !cfg!(debug_assertions) {
        error!("OTP_CHECK_POLICY=prefix-one ignored in release build; using provider");
        return OtpCheckPolicy::Provider;
    }
    configured
}

/// `POST /api/phone-number/register` - set the password for a verified phone and sign in
pub async fn register_handler(Extension(state): Extension<AppState>, body: Bytes) -> ApiResponse {
    let request: RegisterRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let (Some(phone_number), Some(password)) =
        (non_empty(request.phone_number), non_empty(request.password))
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Phone number and password are required",
        );
    };

    if !meets_password_policy(&password) {
        return error_response(
            StatusCode::BAD_REQUEST,
            Message::PasswordPolicy.text(API_LOCALE),
        );
    }

    // A verification mark authorizes at most one registration
    let Some(verified_at) = state.deps.verified_phones.take(&phone_number).await else {
        return error_response(
            StatusCode::BAD_REQUEST,
            Message::PhoneNotVerified.text(API_LOCALE),
        );
    };

    let identity = PhoneIdentity::from_e164(phone_number.clone());
    let response = match state
        .deps
        .registration
        .complete_registration(&identity, &password)
        .await
    {
        Ok(outcome) if outcome.session_established => {
            return (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "token": outcome.session_token,
                })),
            );
        }
        Ok(_) => error_response(
            StatusCode::BAD_REQUEST,
            Message::RegistrationFailed.text(API_LOCALE),
        ),
        Err(e) => {
            error!("Registration error: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Message::RegistrationFailed.text(API_LOCALE),
            )
        }
    };

    // Not registered; the phone stays verified for another attempt
    state
        .deps
        .verified_phones
        .restore(&phone_number, verified_at)
        .await;
    response
}

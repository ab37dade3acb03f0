//! HTTP tests for the phone-number API, driven in-process with mock providers.

mod common;

use axum::http::{Method, StatusCode};
use common::{get_json, post_json, send, test_app};
use serde_json::json;
use signup_core::config::OtpCheckPolicy;
use signup_core::domains::signup::PhoneIdentity;
use signup_core::kernel::{
    MockOtpService, MockRegistrationService, ServiceError, TestDependencies,
};

const SEND_OTP: &str = "/api/phone-number/send-otp";
const VERIFY_OTP: &str = "/api/phone-number/verify-otp";
const REGISTER: &str = "/api/phone-number/register";

// ============================================================================
// send-otp
// ============================================================================

#[tokio::test]
async fn send_otp_probe_reports_healthy() {
    let app = test_app(TestDependencies::new());
    let (status, body) = get_json(&app, SEND_OTP).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Healthy" }));
}

#[tokio::test]
async fn send_otp_forwards_number_to_provider() {
    let deps = TestDependencies::new();
    let app = test_app(deps.clone());

    let (status, body) =
        post_json(&app, SEND_OTP, r#"{"phoneNumber":"+8613800000000"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "OTP sent successfully" }));
    assert_eq!(
        deps.otp.sent_to(),
        vec![PhoneIdentity::from_e164("+8613800000000")]
    );
}

#[tokio::test]
async fn send_otp_requires_phone_number() {
    let deps = TestDependencies::new();
    let app = test_app(deps.clone());

    for body in [r#"{}"#, r#"{"phoneNumber":""}"#] {
        let (status, response) = post_json(&app, SEND_OTP, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "Phone number is required" }));
    }
    assert!(deps.otp.sent_to().is_empty());
}

#[tokio::test]
async fn send_otp_rejects_malformed_numbers() {
    let deps = TestDependencies::new();
    let app = test_app(deps.clone());

    for number in ["+0123456", "13800abc000", "+1234567890123456"] {
        let (status, response) =
            post_json(&app, SEND_OTP, &json!({ "phoneNumber": number }).to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{number}");
        assert_eq!(response, json!({ "error": "Invalid phone number format" }));
    }
    assert!(deps.otp.sent_to().is_empty());
}

#[tokio::test]
async fn send_otp_unparsable_body_is_bad_request() {
    let app = test_app(TestDependencies::new());
    let (status, response) = post_json(&app, SEND_OTP, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!response["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn send_otp_surfaces_provider_rejection() {
    let deps = TestDependencies::new().mock_otp(
        MockOtpService::new().failing_send(ServiceError::Rejected("Max send attempts reached".into())),
    );
    let app = test_app(deps);

    let (status, response) =
        post_json(&app, SEND_OTP, r#"{"phoneNumber":"+8613800000000"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "Max send attempts reached" }));
}

#[tokio::test]
async fn send_otp_unreachable_provider_is_bad_request() {
    let deps = TestDependencies::new().mock_otp(
        MockOtpService::new().failing_send(ServiceError::Transport("connection reset".into())),
    );
    let app = test_app(deps);

    let (status, response) =
        post_json(&app, SEND_OTP, r#"{"phoneNumber":"+8613800000000"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "connection reset" }));
}

// ============================================================================
// verify-otp
// ============================================================================

#[tokio::test]
async fn verify_otp_requires_both_fields() {
    let app = test_app(TestDependencies::new());

    for body in [
        r#"{"phoneNumber":"+8613800000000"}"#,
        r#"{"otp":"123456"}"#,
        r#"{"phoneNumber":"","otp":"123456"}"#,
    ] {
        let (status, response) = post_json(&app, VERIFY_OTP, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "Phone number and OTP are required" }));
    }
}

#[tokio::test]
async fn verify_otp_requires_six_digits() {
    let deps = TestDependencies::new();
    let app = test_app(deps.clone());

    for otp in ["12345", "1234567", "12a456"] {
        let (status, response) = post_json(
            &app,
            VERIFY_OTP,
            &json!({ "phoneNumber": "+8613800000000", "otp": otp }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{otp}");
        assert_eq!(response, json!({ "error": "请输入6位数字验证码" }));
    }
    assert!(deps.otp.verify_calls().is_empty());
}

#[tokio::test]
async fn verify_otp_non_string_code_fails_shape_check() {
    let deps = TestDependencies::new();
    let app = test_app(deps.clone());

    for otp in [json!(123456), json!(true), json!(["123456"])] {
        let (status, response) = post_json(
            &app,
            VERIFY_OTP,
            &json!({ "phoneNumber": "+8613800000000", "otp": otp }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{otp}");
        assert_eq!(response, json!({ "error": "请输入6位数字验证码" }));
    }
    assert!(deps.otp.verify_calls().is_empty());
}

#[tokio::test]
async fn verify_otp_wrong_code_is_rejected() {
    let deps = TestDependencies::new().mock_otp(MockOtpService::new().with_accepted_code("123456"));
    let app = test_app(deps.clone());

    let (status, response) = post_json(
        &app,
        VERIFY_OTP,
        r#"{"phoneNumber":"13800000000","otp":"000000"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "验证码错误，请重试" }));
    assert!(!deps.verified_phones.is_verified("13800000000").await);
}

#[tokio::test]
async fn verify_otp_accepts_provider_approved_code() {
    let deps = TestDependencies::new().mock_otp(MockOtpService::new().with_accepted_code("123456"));
    let app = test_app(deps.clone());

    let (status, response) = post_json(
        &app,
        VERIFY_OTP,
        r#"{"phoneNumber":"+8613800000000","otp":"123456"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({ "success": true, "verified": true, "message": "验证码验证成功" })
    );
    assert_eq!(
        deps.otp.verify_calls(),
        vec![(PhoneIdentity::from_e164("+8613800000000"), "123456".to_string())]
    );
    assert!(deps.verified_phones.is_verified("+8613800000000").await);
}

#[tokio::test]
async fn verify_otp_provider_failure_is_internal_error() {
    let deps = TestDependencies::new().mock_otp(
        MockOtpService::new().failing_verify(ServiceError::Transport("timeout".into())),
    );
    let app = test_app(deps);

    let (status, response) = post_json(
        &app,
        VERIFY_OTP,
        r#"{"phoneNumber":"+8613800000000","otp":"123456"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, json!({ "error": "验证失败，请重试" }));
}

#[tokio::test]
async fn verify_otp_unparsable_body_is_internal_error() {
    let app = test_app(TestDependencies::new());
    let (status, response) = post_json(&app, VERIFY_OTP, "not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, json!({ "error": "验证失败，请重试" }));
}

#[cfg(debug_assertions)]
#[tokio::test]
async fn verify_otp_prefix_policy_skips_provider() {
    let deps = TestDependencies::new().otp_check_policy(OtpCheckPolicy::PrefixOne);
    let app = test_app(deps.clone());

    let (accepted, _) = post_json(
        &app,
        VERIFY_OTP,
        r#"{"phoneNumber":"+8613800000000","otp":"123456"}"#,
    )
    .await;
    let (rejected, response) = post_json(
        &app,
        VERIFY_OTP,
        r#"{"phoneNumber":"+8613900000000","otp":"000000"}"#,
    )
    .await;

    assert_eq!(accepted, StatusCode::OK);
    assert_eq!(rejected, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "验证码错误，请重试" }));
    assert!(deps.otp.verify_calls().is_empty());
}

// ============================================================================
// register
// ============================================================================

#[tokio::test]
async fn register_requires_verified_phone() {
    let deps = TestDependencies::new();
    let app = test_app(deps.clone());

    let (status, response) = post_json(
        &app,
        REGISTER,
        r#"{"phoneNumber":"+8613800000000","password":"abcdefg1!"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "请先验证手机号" }));
    assert!(deps.registration.calls().is_empty());
}

#[tokio::test]
async fn register_enforces_password_policy() {
    let deps = TestDependencies::new();
    deps.verified_phones.mark_verified("+8613800000000").await;
    let app = test_app(deps.clone());

    let (status, response) = post_json(
        &app,
        REGISTER,
        r#"{"phoneNumber":"+8613800000000","password":"abcdefg1"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "密码需为8-20位字母、数字和符号的组合" }));
    assert!(deps.registration.calls().is_empty());
}

#[tokio::test]
async fn register_after_verification_issues_token_once() {
    let deps = TestDependencies::new();
    let app = test_app(deps.clone());

    let (status, _) = post_json(
        &app,
        VERIFY_OTP,
        r#"{"phoneNumber":"+8613800000000","otp":"123456"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body = r#"{"phoneNumber":"+8613800000000","password":"abcdefg1!"}"#;
    let (status, response) = post_json(&app, REGISTER, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "success": true, "token": "mock-session-token" }));

    // The verification mark is spent
    let (status, response) = post_json(&app, REGISTER, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "请先验证手机号" }));
    assert_eq!(deps.registration.calls().len(), 1);
}

#[tokio::test]
async fn register_declined_keeps_verification() {
    let deps = TestDependencies::new().mock_registration(MockRegistrationService::new().declining());
    deps.verified_phones.mark_verified("+8613800000000").await;
    let app = test_app(deps.clone());

    let (status, response) = post_json(
        &app,
        REGISTER,
        r#"{"phoneNumber":"+8613800000000","password":"abcdefg1!"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "注册失败，请重试" }));
    assert!(deps.verified_phones.is_verified("+8613800000000").await);
}

#[tokio::test]
async fn register_failure_keeps_verification() {
    let deps = TestDependencies::new().mock_registration(
        MockRegistrationService::new().failing(ServiceError::Transport("db down".into())),
    );
    deps.verified_phones.mark_verified("+8613800000000").await;
    let app = test_app(deps.clone());

    let (status, response) = post_json(
        &app,
        REGISTER,
        r#"{"phoneNumber":"+8613800000000","password":"abcdefg1!"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, json!({ "error": "注册失败，请重试" }));
    assert!(deps.verified_phones.is_verified("+8613800000000").await);
}

#[tokio::test]
async fn concurrent_registrations_share_one_verification() {
    let deps = TestDependencies::new();
    deps.verified_phones.mark_verified("+8613800000000").await;
    let app = test_app(deps.clone());

    let (first, second) = tokio::join!(
        post_json(
            &app,
            REGISTER,
            r#"{"phoneNumber":"+8613800000000","password":"abcdefg1!"}"#,
        ),
        post_json(
            &app,
            REGISTER,
            r#"{"phoneNumber":"+8613800000000","password":"zyxwvut9?"}"#,
        ),
    );

    let statuses = [first.0, second.0];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert!(statuses.contains(&StatusCode::BAD_REQUEST));
    assert_eq!(deps.registration.calls().len(), 1);
    assert!(!deps.verified_phones.is_verified("+8613800000000").await);
}

#[tokio::test]
async fn register_requires_both_fields() {
    let app = test_app(TestDependencies::new());
    let (status, response) = post_json(&app, REGISTER, r#"{"phoneNumber":"+8613800000000"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": "Phone number and password are required" }));
}

// ============================================================================
// health, static pages, fallback
// ============================================================================

#[tokio::test]
async fn health_without_database_is_healthy() {
    let app = test_app(TestDependencies::new());
    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "disabled");
    assert_eq!(body["account_store"], "memory");
}

#[tokio::test]
async fn legal_pages_are_served() {
    let app = test_app(TestDependencies::new());

    let (status, html) = send(&app, Method::GET, "/terms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Nextrip 使用条款"));
    assert!(html.contains("legal@nextrip.com"));

    let (status, html) = send(&app, Method::GET, "/privacy", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Nextrip 隐私政策"));
}

#[tokio::test]
async fn unknown_path_shows_under_construction_page() {
    let app = test_app(TestDependencies::new());
    let (status, html) = send(&app, Method::GET, "/bookings", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("功能开发中"));
    assert!(html.contains("该功能正在紧张开发中，敬请期待"));
}

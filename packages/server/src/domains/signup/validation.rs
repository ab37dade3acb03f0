//! Validation rules for the signup wizard.
//!
//! Every rule is a pure function returning a [`ValidationResult`]. The
//! controller merges results and refuses to advance while any field error
//! remains.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::messages::{Locale, Message};

lazy_static! {
    // E.164-ish shape accepted by the HTTP API
    static ref E164_REGEX: Regex = Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap();
}

/// Symbols that satisfy the password policy's "one symbol" requirement
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 20;
pub const OTP_LEN: usize = 6;

/// Wizard input fields that can carry an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    PhoneNumber,
    Otp,
    Consent,
    Password,
    ConfirmPassword,
}

/// Outcome of one or more validation rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub field_errors: BTreeMap<Field, String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn invalid(field: Field, message: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field, message.into());
        Self { field_errors }
    }

    pub fn ok(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Combine two results. The first message recorded for a field wins.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        for (field, message) in other.field_errors {
            self.field_errors.entry(field).or_insert(message);
        }
        self
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }
}

/// Allowed length of the national part of a phone number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonePolicy {
    pub min_len: usize,
    pub max_len: usize,
}

impl PhonePolicy {
    pub const fn range(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    pub const fn exact(len: usize) -> Self {
        Self {
            min_len: len,
            max_len: len,
        }
    }

    pub fn accepts_len(&self, len: usize) -> bool {
        len >= self.min_len && len <= self.max_len
    }
}

impl Default for PhonePolicy {
    fn default() -> Self {
        Self::range(7, 15)
    }
}

/// Per-region phone policies with a fallback for unlisted regions
#[derive(Debug, Clone)]
pub struct RegionPolicies {
    policies: HashMap<String, PhonePolicy>,
    fallback: PhonePolicy,
}

impl RegionPolicies {
    pub fn new(fallback: PhonePolicy) -> Self {
        Self {
            policies: HashMap::new(),
            fallback,
        }
    }

    pub fn with_region(mut self, region_code: impl Into<String>, policy: PhonePolicy) -> Self {
        self.policies.insert(region_code.into(), policy);
        self
    }

    pub fn policy_for(&self, region_code: &str) -> PhonePolicy {
        self.policies
            .get(region_code)
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl Default for RegionPolicies {
    /// Mainland China numbers are exactly 11 digits; everything else 7-15.
    fn default() -> Self {
        Self::new(PhonePolicy::default()).with_region("+86", PhonePolicy::exact(11))
    }
}

pub fn validate_phone_number(
    phone_number: &str,
    policy: &PhonePolicy,
    locale: Locale,
) -> ValidationResult {
    let well_formed = !phone_number.is_empty()
        && phone_number.bytes().all(|b| b.is_ascii_digit())
        && policy.accepts_len(phone_number.len());

    if well_formed {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(Field::PhoneNumber, Message::InvalidPhone.text(locale))
    }
}

pub fn validate_otp(code: &str, locale: Locale) -> ValidationResult {
    if is_otp_shape(code) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(Field::Otp, Message::InvalidOtp.text(locale))
    }
}

pub fn validate_consent(consent: bool, locale: Locale) -> ValidationResult {
    if consent {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(Field::Consent, Message::ConsentRequired.text(locale))
    }
}

pub fn validate_password(password: &str, locale: Locale) -> ValidationResult {
    if meets_password_policy(password) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(Field::Password, Message::PasswordPolicy.text(locale))
    }
}

pub fn validate_confirmation(password: &str, confirm: &str, locale: Locale) -> ValidationResult {
    if password.as_bytes() == confirm.as_bytes() {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(
            Field::ConfirmPassword,
            Message::PasswordMismatch.text(locale),
        )
    }
}

/// Exactly six ASCII digits
pub fn is_otp_shape(code: &str) -> bool {
    code.len() == OTP_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

pub fn meets_password_policy(password: &str) -> bool {
    let len = password.chars().count();
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) && has_letter && has_digit && has_symbol
}

/// Shape check applied to raw `phoneNumber` values on the HTTP API
pub fn is_e164(phone_number: &str) -> bool {
    E164_REGEX.is_match(phone_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZH: Locale = Locale::ZhCn;

    #[test]
    fn test_phone_default_policy() {
        let policy = PhonePolicy::default();
        assert!(validate_phone_number("1234567", &policy, ZH).ok());
        assert!(validate_phone_number("123456789012345", &policy, ZH).ok());
        assert!(!validate_phone_number("123456", &policy, ZH).ok());
        assert!(!validate_phone_number("1234567890123456", &policy, ZH).ok());
        assert!(!validate_phone_number("", &policy, ZH).ok());
        assert!(!validate_phone_number("138-0000-0000", &policy, ZH).ok());
    }

    #[test]
    fn test_phone_region_policy() {
        let policies = RegionPolicies::default();
        let cn = policies.policy_for("+86");
        assert!(validate_phone_number("13800000000", &cn, ZH).ok());
        assert!(!validate_phone_number("1380000000", &cn, ZH).ok());

        let us = policies.policy_for("+1");
        assert!(validate_phone_number("2025550123", &us, ZH).ok());
    }

    #[test]
    fn test_otp_shape() {
        assert!(validate_otp("123456", ZH).ok());
        assert!(!validate_otp("12345", ZH).ok());
        assert!(!validate_otp("1234567", ZH).ok());
        assert!(!validate_otp("12a456", ZH).ok());
        // Non-ASCII digits are rejected
        assert!(!validate_otp("١٢٣٤٥٦", ZH).ok());
    }

    #[test]
    fn test_password_policy() {
        assert!(!meets_password_policy("abcdefg1"));
        assert!(meets_password_policy("abcdefg1!"));
        assert!(!meets_password_policy("abc1!"));
        assert!(!meets_password_policy("abcdefghijklmnopqrs1!"));
        assert!(meets_password_policy("abcdefghijklmnopqr1!"));
        assert!(!meets_password_policy("12345678!"));
        assert!(!meets_password_policy("abcdefgh!"));
        // Symbol must come from the defined set
        assert!(!meets_password_policy("abcdefg1_"));
    }

    #[test]
    fn test_confirmation_mismatch() {
        let result = validate_confirmation("Abcdef1!", "Abcdef1", ZH);
        assert_eq!(
            result.error(Field::ConfirmPassword),
            Some(Message::PasswordMismatch.text(ZH))
        );
        assert!(validate_confirmation("Abcdef1!", "Abcdef1!", ZH).ok());
    }

    #[test]
    fn test_merge_keeps_every_field() {
        let merged = validate_otp("12", ZH)
            .merge(validate_consent(false, ZH))
            .merge(validate_otp("x", Locale::En));
        assert_eq!(merged.field_errors.len(), 2);
        assert_eq!(merged.error(Field::Otp), Some(Message::InvalidOtp.text(ZH)));
    }

    #[test]
    fn test_e164() {
        assert!(is_e164("+8613800000000"));
        assert!(is_e164("13800000000"));
        assert!(!is_e164("+0123"));
        assert!(!is_e164("+1"));
        assert!(!is_e164("abc"));
        assert!(!is_e164("+1234567890123456"));
    }
}

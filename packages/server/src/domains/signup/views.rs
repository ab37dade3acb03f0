//! Step views: what each wizard step shows, derived from [`WizardState`].
//!
//! Views carry no validation or service logic. Front ends render them and
//! translate user input back into controller intents.

use serde::Serialize;

use super::messages::{resend_countdown, Locale, Message};
use super::state::{Step, WizardState};
use super::validation::{Field, OTP_LEN};

/// Selectable calling-code regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionOption {
    pub code: &'static str,
    pub name_zh: &'static str,
    pub name_en: &'static str,
}

impl RegionOption {
    pub fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::ZhCn => self.name_zh,
            Locale::En => self.name_en,
        }
    }
}

pub const REGION_OPTIONS: [RegionOption; 4] = [
    RegionOption {
        code: "+86",
        name_zh: "中国大陆",
        name_en: "Mainland China",
    },
    RegionOption {
        code: "+852",
        name_zh: "中国香港",
        name_en: "Hong Kong, China",
    },
    RegionOption {
        code: "+886",
        name_zh: "中国台湾",
        name_en: "Taiwan, China",
    },
    RegionOption {
        code: "+1",
        name_zh: "美国",
        name_en: "United States",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepIndicator {
    pub number: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub active: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyPhoneView {
    pub phone_label: &'static str,
    pub region_code: String,
    pub phone_number: String,
    pub phone_error: Option<String>,
    pub send_label: String,
    pub send_enabled: bool,
    /// Code entry and consent only appear once a code was sent
    pub show_code_entry: bool,
    pub otp_label: &'static str,
    pub otp: String,
    pub otp_error: Option<String>,
    pub consent_label: &'static str,
    pub consent: bool,
    pub consent_error: Option<String>,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetPasswordView {
    pub phone: String,
    pub password_label: &'static str,
    pub confirm_label: &'static str,
    pub password_error: Option<String>,
    pub confirm_error: Option<String>,
    /// Rough strength meter, 0-100
    pub strength_percent: u8,
    pub back_label: &'static str,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessView {
    pub title: &'static str,
    pub phone: String,
    pub restart_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum StepBody {
    VerifyPhone(VerifyPhoneView),
    SetPassword(SetPasswordView),
    Success(SuccessView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub steps: Vec<StepIndicator>,
    pub progress_percent: u8,
    pub banner: Option<String>,
    pub body: StepBody,
}

impl StepView {
    pub fn render(state: &WizardState, locale: Locale) -> Self {
        let steps = Step::ALL
            .iter()
            .map(|step| {
                let (title, description) = step_text(*step);
                StepIndicator {
                    number: step.number(),
                    title: title.text(locale),
                    description: description.text(locale),
                    active: *step == state.step,
                    completed: *step < state.step,
                }
            })
            .collect::<Vec<_>>();

        let progress_percent = (u32::from(state.step.number()) * 100 / Step::ALL.len() as u32) as u8;

        let body = match state.step {
            Step::VerifyPhone => StepBody::VerifyPhone(verify_phone(state, locale)),
            Step::SetPassword => StepBody::SetPassword(set_password(state, locale)),
            Step::Success => StepBody::Success(SuccessView {
                title: Message::RegistrationSucceeded.text(locale),
                phone: verified_phone(state),
                restart_label: Message::StartOver.text(locale),
            }),
        };

        Self {
            steps,
            progress_percent,
            banner: state.banner.clone(),
            body,
        }
    }
}

fn step_text(step: Step) -> (Message, Message) {
    match step {
        Step::VerifyPhone => (Message::StepVerifyTitle, Message::StepVerifyDescription),
        Step::SetPassword => (Message::StepPasswordTitle, Message::StepPasswordDescription),
        Step::Success => (Message::StepSuccessTitle, Message::StepSuccessDescription),
    }
}

fn error_of(state: &WizardState, field: Field) -> Option<String> {
    state.error(field).map(str::to_string)
}

fn verified_phone(state: &WizardState) -> String {
    state
        .verified_identity
        .as_ref()
        .map(|identity| identity.e164())
        .unwrap_or_else(|| state.identity().e164())
}

fn verify_phone(state: &WizardState, locale: Locale) -> VerifyPhoneView {
    let send_label = if state.countdown_active() {
        resend_countdown(state.countdown_seconds, locale)
    } else if state.code_sent {
        Message::ResendCode.text(locale).to_string()
    } else {
        Message::SendCode.text(locale).to_string()
    };

    VerifyPhoneView {
        phone_label: Message::PhoneLabel.text(locale),
        region_code: state.region_code.clone(),
        phone_number: state.phone_number.clone(),
        phone_error: error_of(state, Field::PhoneNumber),
        send_label,
        send_enabled: !state.phone_number.is_empty() && !state.countdown_active(),
        show_code_entry: state.code_sent,
        otp_label: Message::OtpLabel.text(locale),
        otp: state.otp.clone(),
        otp_error: error_of(state, Field::Otp),
        consent_label: Message::ConsentLabel.text(locale),
        consent: state.consent,
        consent_error: error_of(state, Field::Consent),
        submit_label: Message::NextSetPassword.text(locale),
        submit_enabled: state.code_sent && state.otp.len() == OTP_LEN && state.consent,
    }
}

fn set_password(state: &WizardState, locale: Locale) -> SetPasswordView {
    let strength = (state.password.chars().count() * 10).min(100) as u8;

    SetPasswordView {
        phone: verified_phone(state),
        password_label: Message::PasswordLabel.text(locale),
        confirm_label: Message::ConfirmPasswordLabel.text(locale),
        password_error: error_of(state, Field::Password),
        confirm_error: error_of(state, Field::ConfirmPassword),
        strength_percent: strength,
        back_label: Message::BackToVerify.text(locale),
        submit_label: Message::FinishSignup.text(locale),
        submit_enabled: !state.password.is_empty() && !state.confirm_password.is_empty(),
    }
}

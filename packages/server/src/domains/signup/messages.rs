//! User-facing strings for the signup flow.

pub use crate::domains::preferences::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    // Field errors
    InvalidPhone,
    InvalidOtp,
    ConsentRequired,
    PasswordPolicy,
    PasswordMismatch,
    SendFailed,
    NetworkError,
    CodeRejected,
    StaleCode,
    CodeNotSent,
    RegistrationFailed,
    PhoneNotVerified,

    // Banners
    CodeSent,
    VerificationSucceeded,
    VerificationFailed,
    RegistrationSucceeded,

    // Step indicator
    StepVerifyTitle,
    StepVerifyDescription,
    StepPasswordTitle,
    StepPasswordDescription,
    StepSuccessTitle,
    StepSuccessDescription,

    // Controls
    PhoneLabel,
    OtpLabel,
    PasswordLabel,
    ConfirmPasswordLabel,
    ConsentLabel,
    SendCode,
    ResendCode,
    NextSetPassword,
    BackToVerify,
    FinishSignup,
    StartOver,
}

impl Message {
    pub fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::ZhCn => self.zh_cn(),
            Locale::En => self.en(),
        }
    }

    fn zh_cn(self) -> &'static str {
        match self {
            Message::InvalidPhone => "请输入正确的手机号码",
            Message::InvalidOtp => "请输入6位数字验证码",
            Message::ConsentRequired => "请同意用户协议和隐私政策",
            Message::PasswordPolicy => "密码需为8-20位字母、数字和符号的组合",
            Message::PasswordMismatch => "两次输入的密码不一致",
            Message::SendFailed => "发送验证码失败",
            Message::NetworkError => "网络错误，请重试",
            Message::CodeRejected => "验证码错误，请重试",
            Message::StaleCode => "手机号已变更，请重新获取验证码",
            Message::CodeNotSent => "请先获取验证码",
            Message::RegistrationFailed => "注册失败，请重试",
            Message::PhoneNotVerified => "请先验证手机号",
            Message::CodeSent => "验证码已发送",
            Message::VerificationSucceeded => "验证码验证成功",
            Message::VerificationFailed => "验证失败，请重试",
            Message::RegistrationSucceeded => "注册成功",
            Message::StepVerifyTitle => "验证手机",
            Message::StepVerifyDescription => "输入手机号并验证",
            Message::StepPasswordTitle => "设置密码",
            Message::StepPasswordDescription => "为您的账户设置密码",
            Message::StepSuccessTitle => "注册成功",
            Message::StepSuccessDescription => "完成注册流程",
            Message::PhoneLabel => "手机号",
            Message::OtpLabel => "短信验证码",
            Message::PasswordLabel => "设置密码",
            Message::ConfirmPasswordLabel => "确认密码",
            Message::ConsentLabel => "同意《服务协议》和《隐私政策》",
            Message::SendCode => "发送验证码",
            Message::ResendCode => "重新发送验证码",
            Message::NextSetPassword => "下一步，设置密码",
            Message::BackToVerify => "返回手机验证",
            Message::FinishSignup => "完成注册",
            Message::StartOver => "重新注册",
        }
    }

    fn en(self) -> &'static str {
        match self {
            Message::InvalidPhone => "Please enter a valid phone number",
            Message::InvalidOtp => "Please enter the 6-digit code",
            Message::ConsentRequired => "Please accept the terms of service and privacy policy",
            Message::PasswordPolicy => {
                "Password must be 8-20 characters with a letter, a digit and a symbol"
            }
            Message::PasswordMismatch => "Passwords do not match",
            Message::SendFailed => "Failed to send verification code",
            Message::NetworkError => "Network error, please try again",
            Message::CodeRejected => "Incorrect code, please try again",
            Message::StaleCode => "Phone number changed, please request a new code",
            Message::CodeNotSent => "Please request a verification code first",
            Message::RegistrationFailed => "Registration failed, please try again",
            Message::PhoneNotVerified => "Please verify your phone number first",
            Message::CodeSent => "Verification code sent",
            Message::VerificationSucceeded => "Code verified",
            Message::VerificationFailed => "Verification failed, please try again",
            Message::RegistrationSucceeded => "Registration complete",
            Message::StepVerifyTitle => "Verify phone",
            Message::StepVerifyDescription => "Enter and verify your phone number",
            Message::StepPasswordTitle => "Set password",
            Message::StepPasswordDescription => "Choose a password for your account",
            Message::StepSuccessTitle => "Done",
            Message::StepSuccessDescription => "Signup complete",
            Message::PhoneLabel => "Phone number",
            Message::OtpLabel => "SMS code",
            Message::PasswordLabel => "Password",
            Message::ConfirmPasswordLabel => "Confirm password",
            Message::ConsentLabel => "I accept the Terms of Service and Privacy Policy",
            Message::SendCode => "Send code",
            Message::ResendCode => "Resend code",
            Message::NextSetPassword => "Next: set password",
            Message::BackToVerify => "Back to phone verification",
            Message::FinishSignup => "Finish signup",
            Message::StartOver => "Start over",
        }
    }
}

/// Label of the send button while the resend cooldown runs
pub fn resend_countdown(seconds: u32, locale: Locale) -> String {
    match locale {
        Locale::ZhCn => format!("重新发送 ({}s)", seconds),
        Locale::En => format!("Resend ({}s)", seconds),
    }
}

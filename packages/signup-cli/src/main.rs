//! Interactive phone signup in the terminal.
//!
//! Drives the signup wizard against a running signup API.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use signup_core::domains::preferences::{Locale, PreferenceStore, Theme, UiPreferences};
use signup_core::domains::signup::messages::resend_countdown;
use signup_core::domains::signup::state::DEFAULT_REGION_CODE;
use signup_core::domains::signup::views::{StepBody, REGION_OPTIONS};
use signup_core::domains::signup::{SignupError, WizardController};

mod client;
mod render;

use client::HttpAuthClient;
use render::{mask, print_view, Palette};

#[derive(Parser)]
#[command(name = "signup")]
#[command(about = "Create a Nextrip account with your phone number")]
#[command(version)]
struct Cli {
    /// Base URL of the signup API
    #[arg(long, env = "SIGNUP_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Calling code selected at start (e.g. +86, +852, +1)
    #[arg(long, default_value = DEFAULT_REGION_CODE)]
    region: String,

    /// Interface language (en, zh-CN)
    #[arg(long, env = "SIGNUP_LOCALE")]
    locale: Option<Locale>,

    /// Color theme (light, dark, system)
    #[arg(long, env = "SIGNUP_THEME")]
    theme: Option<Theme>,
}

type Wizard = WizardController<Arc<HttpAuthClient>, Arc<HttpAuthClient>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ChooseRegion,
    EnterPhone,
    SendCode,
    EnterCode,
    ToggleConsent,
    SubmitVerification,
    EnterPassword,
    EnterConfirmPassword,
    SubmitPassword,
    Back,
    Restart,
    ToggleLanguage,
    ToggleTheme,
    Quit,
}

impl Action {
    fn for_body(body: &StepBody) -> Vec<Action> {
        let mut actions = match body {
            StepBody::VerifyPhone(view) => {
                let mut actions = vec![Action::ChooseRegion, Action::EnterPhone, Action::SendCode];
                if view.show_code_entry {
                    actions.extend([
                        Action::EnterCode,
                        Action::ToggleConsent,
                        Action::SubmitVerification,
                    ]);
                }
                actions
            }
            StepBody::SetPassword(_) => vec![
                Action::EnterPassword,
                Action::EnterConfirmPassword,
                Action::SubmitPassword,
                Action::Back,
            ],
            StepBody::Success(_) => vec![Action::Restart],
        };
        actions.extend([Action::ToggleLanguage, Action::ToggleTheme, Action::Quit]);
        actions
    }

    fn label(self, body: &StepBody, wizard: &Wizard, locale: Locale) -> String {
        let zh = locale == Locale::ZhCn;
        let pick = |zh_text: &str, en_text: &str| (if zh { zh_text } else { en_text }).to_string();

        match (self, body) {
            (Action::ChooseRegion, StepBody::VerifyPhone(view)) => {
                format!("{} ({})", pick("选择地区", "Choose region"), view.region_code)
            }
            (Action::EnterPhone, StepBody::VerifyPhone(view)) => view.phone_label.to_string(),
            (Action::SendCode, StepBody::VerifyPhone(view)) if view.send_enabled => {
                view.send_label.clone()
            }
            (Action::SendCode, StepBody::VerifyPhone(view)) => {
                format!("{} {}", view.send_label, pick("(不可用)", "(unavailable)"))
            }
            (Action::EnterCode, StepBody::VerifyPhone(view)) => view.otp_label.to_string(),
            (Action::ToggleConsent, StepBody::VerifyPhone(view)) => {
                let check = if view.consent { "[x]" } else { "[ ]" };
                format!("{} {}", check, view.consent_label)
            }
            (Action::SubmitVerification, StepBody::VerifyPhone(view)) => {
                view.submit_label.to_string()
            }
            (Action::EnterPassword, StepBody::SetPassword(view)) => {
                format!("{} {}", view.password_label, mask(&wizard.snapshot().password))
            }
            (Action::EnterConfirmPassword, StepBody::SetPassword(view)) => {
                format!(
                    "{} {}",
                    view.confirm_label,
                    mask(&wizard.snapshot().confirm_password)
                )
            }
            (Action::SubmitPassword, StepBody::SetPassword(view)) => view.submit_label.to_string(),
            (Action::Back, StepBody::SetPassword(view)) => view.back_label.to_string(),
            (Action::Restart, StepBody::Success(view)) => view.restart_label.to_string(),
            (Action::ToggleLanguage, _) => format!(
                "{} ({})",
                pick("切换语言", "Switch language"),
                locale.toggled().display_name()
            ),
            (Action::ToggleTheme, _) => pick("切换主题", "Toggle theme"),
            (Action::Quit, _) => pick("退出", "Quit"),
            _ => String::new(),
        }
    }
}

/// Run a blocking prompt without stalling the runtime's countdown task
fn prompt<T>(f: impl FnOnce() -> dialoguer::Result<T>) -> Result<T> {
    Ok(tokio::task::block_in_place(f)?)
}

/// Errors that no field on screen explains
fn notice_for(error: &SignupError, locale: Locale) -> Option<String> {
    match error {
        SignupError::CooldownActive { remaining_seconds } => {
            Some(resend_countdown(*remaining_seconds, locale))
        }
        SignupError::WrongStep { .. } => Some(error.to_string()),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they do not interleave with prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    let preferences = PreferenceStore::new(UiPreferences {
        theme: cli.theme.unwrap_or_default(),
        locale: cli.locale.unwrap_or_default(),
    });

    let api = Arc::new(HttpAuthClient::new(&cli.api_url));
    let mut wizard: Wizard = WizardController::new(api.clone(), api)
        .with_preferences(preferences.clone())
        .with_region(cli.region);

    let term = Term::stdout();
    let theme = ColorfulTheme::default();
    let mut notice: Option<String> = None;

    loop {
        let locale = preferences.locale();
        let palette = Palette::new(preferences.theme());
        let view = wizard.view();

        print_view(&term, &view, palette, locale)?;
        if let Some(message) = notice.take() {
            println!("{}", palette.error(&message));
            println!();
        }

        let actions = Action::for_body(&view.body);
        let labels: Vec<String> = actions
            .iter()
            .map(|action| action.label(&view.body, &wizard, locale))
            .collect();

        let selection = prompt(|| {
            Select::with_theme(&theme)
                .items(&labels)
                .default(0)
                .interact_on_opt(&term)
        })?;
        let Some(selection) = selection else {
            break;
        };

        let outcome = match actions[selection] {
            Action::ChooseRegion => {
                let names: Vec<String> = REGION_OPTIONS
                    .iter()
                    .map(|region| format!("{} {}", region.code, region.name(locale)))
                    .collect();
                let region_code = wizard.snapshot().region_code;
                let current = REGION_OPTIONS
                    .iter()
                    .position(|region| region.code == region_code)
                    .unwrap_or(0);
                if let Some(index) = prompt(|| {
                    Select::with_theme(&theme)
                        .items(&names)
                        .default(current)
                        .interact_on_opt(&term)
                })? {
                    wizard.set_region_code(REGION_OPTIONS[index].code);
                }
                Ok(())
            }
            Action::EnterPhone => {
                let current = wizard.snapshot().phone_number;
                let label = match &view.body {
                    StepBody::VerifyPhone(v) => v.phone_label,
                    _ => "",
                };
                let phone: String = prompt(|| {
                    Input::with_theme(&theme)
                        .with_prompt(label)
                        .with_initial_text(current)
                        .allow_empty(true)
                        .interact_text_on(&term)
                })?;
                wizard.set_phone_number(phone.trim());
                Ok(())
            }
            Action::SendCode => wizard.send_code().await,
            Action::EnterCode => {
                let label = match &view.body {
                    StepBody::VerifyPhone(v) => v.otp_label,
                    _ => "",
                };
                let code: String = prompt(|| {
                    Input::with_theme(&theme)
                        .with_prompt(label)
                        .allow_empty(true)
                        .interact_text_on(&term)
                })?;
                wizard.set_otp(code.trim());
                Ok(())
            }
            Action::ToggleConsent => {
                let state = wizard.snapshot();
                let label = match &view.body {
                    StepBody::VerifyPhone(v) => v.consent_label,
                    _ => "",
                };
                let consent = prompt(|| {
                    Confirm::with_theme(&theme)
                        .with_prompt(label)
                        .default(!state.consent)
                        .interact_on(&term)
                })?;
                wizard.set_consent(consent);
                Ok(())
            }
            Action::SubmitVerification => wizard.submit_verification().await,
            Action::EnterPassword | Action::EnterConfirmPassword => {
                let (password_label, confirm_label) = match &view.body {
                    StepBody::SetPassword(v) => (v.password_label, v.confirm_label),
                    _ => ("", ""),
                };
                let is_confirm = actions[selection] == Action::EnterConfirmPassword;
                let label = if is_confirm { confirm_label } else { password_label };
                let secret = prompt(|| {
                    Password::with_theme(&theme)
                        .with_prompt(label)
                        .allow_empty_password(true)
                        .interact_on(&term)
                })?;
                if is_confirm {
                    wizard.set_confirm_password(secret);
                } else {
                    wizard.set_password(secret);
                }
                Ok(())
            }
            Action::SubmitPassword => wizard.submit_password().await,
            Action::Back => wizard.back(),
            Action::Restart => wizard.restart(),
            Action::ToggleLanguage => {
                preferences.toggle_locale();
                Ok(())
            }
            Action::ToggleTheme => {
                preferences.toggle_theme();
                Ok(())
            }
            Action::Quit => break,
        };

        if let Err(e) = outcome {
            tracing::debug!("Intent rejected: {}", e);
            notice = notice_for(&e, preferences.locale());
        }
    }

    if let Some(token) = wizard.session().and_then(|s| s.session_token.as_deref()) {
        tracing::debug!(token_len = token.len(), "Session established");
    }
    Ok(())
}

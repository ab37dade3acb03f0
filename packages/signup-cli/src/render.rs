//! Terminal rendering of wizard step views.

use colored::{ColoredString, Colorize};
use console::Term;
use signup_core::domains::preferences::{Locale, Theme};
use signup_core::domains::signup::views::{
    SetPasswordView, StepBody, StepView, SuccessView, VerifyPhoneView,
};

const BAR_WIDTH: usize = 30;

/// Colors for the active theme. `System` uses the terminal defaults.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    theme: Theme,
}

impl Palette {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn heading(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => text.bright_white().bold(),
            Theme::Light => text.black().bold(),
            Theme::System => text.bold(),
        }
    }

    pub fn accent(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => text.bright_cyan(),
            Theme::Light | Theme::System => text.blue(),
        }
    }

    pub fn muted(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => text.bright_black(),
            Theme::Light | Theme::System => text.dimmed(),
        }
    }

    pub fn success(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => text.bright_green().bold(),
            Theme::Light | Theme::System => text.green().bold(),
        }
    }

    pub fn error(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => text.bright_red(),
            Theme::Light | Theme::System => text.red(),
        }
    }
}

/// Progress bar like `[##########--------------------] 33%`
pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// Dots in place of the secret, so the screen never shows it
pub fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count())
}

pub fn print_view(term: &Term, view: &StepView, palette: Palette, locale: Locale) -> std::io::Result<()> {
    term.clear_screen()?;

    let brand = match locale {
        Locale::ZhCn => "Nextrip 注册",
        Locale::En => "Nextrip sign up",
    };
    println!("{}", palette.heading(brand));
    println!();

    for step in &view.steps {
        let marker = if step.completed {
            "✓".to_string()
        } else {
            step.number.to_string()
        };
        let line = format!("{} {}  {}", marker, step.title, step.description);
        if step.active {
            println!("  {}", palette.accent(&line).bold());
        } else {
            println!("  {}", palette.muted(&line));
        }
    }
    println!("  {}", palette.muted(&progress_bar(view.progress_percent)));
    println!();

    if let Some(banner) = &view.banner {
        println!("{}", palette.success(banner));
        println!();
    }

    match &view.body {
        StepBody::VerifyPhone(body) => print_verify_phone(body, palette),
        StepBody::SetPassword(body) => print_set_password(body, palette, locale),
        StepBody::Success(body) => print_success(body, palette),
    }
    println!();
    Ok(())
}

fn print_field_error(error: &Option<String>, palette: Palette) {
    if let Some(message) = error {
        println!("    {}", palette.error(message));
    }
}

fn print_verify_phone(view: &VerifyPhoneView, palette: Palette) {
    println!(
        "{}: {} {}",
        view.phone_label,
        palette.accent(&view.region_code),
        view.phone_number
    );
    print_field_error(&view.phone_error, palette);

    if view.show_code_entry {
        println!("{}: {}", view.otp_label, view.otp);
        print_field_error(&view.otp_error, palette);

        let check = if view.consent { "[x]" } else { "[ ]" };
        println!("{} {}", check, view.consent_label);
        print_field_error(&view.consent_error, palette);
    }
}

fn print_set_password(view: &SetPasswordView, palette: Palette, locale: Locale) {
    let phone_label = match locale {
        Locale::ZhCn => "已验证手机号",
        Locale::En => "Verified phone",
    };
    println!("{}: {}", phone_label, palette.accent(&view.phone));
    print_field_error(&view.password_error, palette);
    print_field_error(&view.confirm_error, palette);
    println!("  {}", palette.muted(&progress_bar(view.strength_percent)));
}

fn print_success(view: &SuccessView, palette: Palette) {
    println!("{}", palette.success(&format!("✓ {}", view.title)));
    println!("{}", palette.accent(&view.phone));
}

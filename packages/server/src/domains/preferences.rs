//! Process-wide UI preferences (theme and language).
//!
//! Preferences are initialized once from configuration and live for the
//! rest of the process. Nothing is written to disk.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// Dark switches to light; anything else switches to dark.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light | Theme::System => Theme::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub fn toggled(self) -> Self {
        match self {
            Locale::En => Locale::ZhCn,
            Locale::ZhCn => Locale::En,
        }
    }

    /// Name shown on the language switcher
    pub fn display_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::ZhCn => "中文",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Locale::En),
            "zh" | "zh-cn" | "cn" | "中文" => Ok(Locale::ZhCn),
            other => Err(format!("unknown locale: {}", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::ZhCn => write!(f, "zh-CN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiPreferences {
    pub theme: Theme,
    pub locale: Locale,
}

/// Shared handle to the current preferences
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    inner: Arc<RwLock<UiPreferences>>,
}

impl PreferenceStore {
    pub fn new(initial: UiPreferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn current(&self) -> UiPreferences {
        match self.inner.read() {
            Ok(prefs) => *prefs,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.current().theme
    }

    pub fn locale(&self) -> Locale {
        self.current().locale
    }

    pub fn set_locale(&self, locale: Locale) {
        self.update(|prefs| prefs.locale = locale);
    }

    pub fn toggle_theme(&self) -> Theme {
        self.update(|prefs| prefs.theme = prefs.theme.toggled()).theme
    }

    pub fn toggle_locale(&self) -> Locale {
        self.update(|prefs| prefs.locale = prefs.locale.toggled())
            .locale
    }

    fn update(&self, f: impl FnOnce(&mut UiPreferences)) -> UiPreferences {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
        *guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_toggle() {
        let store = PreferenceStore::default();
        assert_eq!(store.theme(), Theme::System);
        assert_eq!(store.toggle_theme(), Theme::Dark);
        assert_eq!(store.toggle_theme(), Theme::Light);
        assert_eq!(store.toggle_theme(), Theme::Dark);
    }

    #[test]
    fn test_locale_toggle_shared_between_clones() {
        let store = PreferenceStore::default();
        let other = store.clone();
        assert_eq!(store.locale(), Locale::ZhCn);
        assert_eq!(other.toggle_locale(), Locale::En);
        assert_eq!(store.locale(), Locale::En);
        assert_eq!(store.locale().display_name(), "English");
    }

    #[test]
    fn test_defaults_to_simplified_chinese() {
        assert_eq!(Locale::default(), Locale::ZhCn);
        assert_eq!(UiPreferences::default().locale, Locale::ZhCn);
    }

    #[test]
    fn test_parse() {
        assert_eq!("zh-CN".parse::<Locale>(), Ok(Locale::ZhCn));
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
    }
}

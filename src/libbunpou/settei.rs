use crate::libbunpou::db::Setting;
use crate::libbunpou::Result;
use clap::ValueEnum;
use colored::Color;
use log::{debug, warn};
use rusqlite::Connection;
use std::fmt;

pub const LANGUAGE_KEY: &str = "bunpou.language";
pub const THEME_KEY: &str = "bunpou.theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Language {
    #[default]
    Id,
    En,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    #[default]
    Twilight,
    Daylight,
    Sakura,
}

impl Language {
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Id => "id",
            Language::En => "en",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Id => "Bahasa Indonesia",
            Language::En => "English",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Language> {
        match tag {
            "id" => Some(Language::Id),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

impl Theme {
    pub fn tag(&self) -> &'static str {
        match self {
            Theme::Twilight => "twilight",
            Theme::Daylight => "daylight",
            Theme::Sakura => "sakura",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Theme::Twilight => "Calming dark theme.",
            Theme::Daylight => "Bright theme with soft blues.",
            Theme::Sakura => "Pastel pink study vibes.",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Theme> {
        match tag {
            "twilight" => Some(Theme::Twilight),
            "daylight" => Some(Theme::Daylight),
            "sakura" => Some(Theme::Sakura),
            _ => None,
        }
    }

    /// Terminal color used for headings and prompts.
    pub fn accent(&self) -> Color {
        match self {
            Theme::Twilight => Color::Cyan,
            Theme::Daylight => Color::BrightBlue,
            Theme::Sakura => Color::BrightMagenta,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The persisted study preferences, read once at startup and handed to the views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub language: Language,
    pub theme: Theme,
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Settings> {
        let language = match Setting::get(conn, LANGUAGE_KEY)? {
            None => Language::default(),
            Some(tag) => Language::from_tag(&tag).unwrap_or_else(|| {
                warn!("[Settings] Unknown language '{}', using default.", tag);
                Language::default()
            }),
        };
        let theme = match Setting::get(conn, THEME_KEY)? {
            None => Theme::default(),
            Some(tag) => Theme::from_tag(&tag).unwrap_or_else(|| {
                warn!("[Settings] Unknown theme '{}', using default.", tag);
                Theme::default()
            }),
        };
        debug!("[Settings] Loaded language={} theme={}", language, theme);
        Ok(Settings { language, theme })
    }

    pub fn set_language(&mut self, conn: &Connection, language: Language) -> Result<()> {
        Setting::set(conn, LANGUAGE_KEY, language.tag())?;
        self.language = language;
        Ok(())
    }

    pub fn set_theme(&mut self, conn: &Connection, theme: Theme) -> Result<()> {
        Setting::set(conn, THEME_KEY, theme.tag())?;
        self.theme = theme;
        Ok(())
    }
}

//! Theme preference persisted as a small JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Window background and foreground colors for a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub window: &'static str,
    pub text: &'static str,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse the name shown in the theme selector.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Self::Light => Palette {
                window: "#ffffff",
                text: "#000000",
            },
            Self::Dark => Palette {
                window: "#353535",
                text: "#ffffff",
            },
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "tema", default)]
    pub theme: Theme,
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read settings; any failure yields the defaults.
    pub fn load(&self) -> Settings {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", self.path.display());
                return Settings::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}. Using defaults.", self.path.display(), e);
                return Settings::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Malformed {}: {}. Using defaults.", self.path.display(), e);
                Settings::default()
            }
        }
    }

    /// Overwrite the file with pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the write fails.
    pub fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        settings.serialize(&mut serializer)?;

        std::fs::write(&self.path, buf)?;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_returns_light() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load(), Settings { theme: Theme::Light });
    }

    #[test]
    fn test_load_malformed_file_returns_light() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ \"tema\": ").unwrap();

        assert_eq!(SettingsStore::new(&path).load().theme, Theme::Light);
    }

    #[test]
    fn test_load_unknown_theme_returns_light() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"tema": "solarized"}"#).unwrap();

        assert_eq!(SettingsStore::new(&path).load().theme, Theme::Light);
    }

    #[test]
    fn test_load_directory_returns_light() {
        let dir = tempdir().unwrap();
        assert_eq!(SettingsStore::new(dir.path()).load().theme, Theme::Light);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        store.save(&Settings { theme: Theme::Dark }).unwrap();
        assert_eq!(store.load().theme, Theme::Dark);

        store.save(&Settings { theme: Theme::Light }).unwrap();
        assert_eq!(store.load().theme, Theme::Light);
    }

    #[test]
    fn test_save_format() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        store.save(&Settings { theme: Theme::Dark }).unwrap();

        let written = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(written, "{\n    \"tema\": \"dark\"\n}");
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nope").join("settings.json"));
        assert!(matches!(
            store.save(&Settings::default()),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn test_theme_parse_and_palette() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse(" light "), Some(Theme::Light));
        assert_eq!(Theme::parse("blue"), None);
        assert_eq!(Theme::Dark.palette().window, "#353535");
        assert_eq!(Theme::Light.palette().text, "#000000");
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}

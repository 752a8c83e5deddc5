//! Persisted light/dark preference.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ThemeError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ThemeFile {
    theme: Theme,
}

/// File-backed theme preference: read once at startup, written on every toggle.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Anything other than a stored `"dark"` reads as light.
    pub fn load(&self) -> Result<Theme, ThemeError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Theme::Light),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_slice::<ThemeFile>(&bytes) {
            Ok(file) => Ok(file.theme),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable theme file");
                Ok(Theme::Light)
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<(), ThemeError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec(&ThemeFile { theme })?;
        fs::write(&self.path, bytes)?;
        debug!(path = %self.path.display(), %theme, "theme saved");
        Ok(())
    }

    /// Flips the stored theme and returns the new value.
    pub fn toggle(&self) -> Result<Theme, ThemeError> {
        let next = self.load()?.toggled();
        self.save(next)?;
        Ok(next)
    }
}

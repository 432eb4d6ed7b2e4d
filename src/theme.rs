//! Persisted light/dark reading preference.
//!
//! Stored as `{"theme": "dark"}` in `theme.json` inside the state
//! directory. A missing or unreadable file means [`Theme::Light`].

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

const THEME_FILE: &str = "theme.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Preference {
    theme: Theme,
}

fn theme_path(state_dir: &Path) -> PathBuf {
    state_dir.join(THEME_FILE)
}

/// Read the saved theme.
#[instrument(level = "debug", skip_all, fields(state_dir = %state_dir.display()))]
pub async fn load(state_dir: &Path) -> Theme {
    let path = theme_path(state_dir);
    let text = match fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(_) => return Theme::default(),
    };
    match serde_json::from_str::<Preference>(&text) {
        Ok(pref) => pref.theme,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable theme file");
            Theme::default()
        }
    }
}

/// Persist `theme`, creating the state directory when needed.
#[instrument(level = "info", skip_all, fields(state_dir = %state_dir.display(), %theme))]
pub async fn save(state_dir: &Path, theme: Theme) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(state_dir).await?;
    let json = serde_json::to_string(&Preference { theme })?;
    fs::write(theme_path(state_dir), json).await?;
    info!("Saved theme preference");
    Ok(())
}

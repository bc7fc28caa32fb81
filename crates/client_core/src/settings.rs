use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "pwutil.toml";
pub const DEFAULT_API_ROOT: &str = "http://127.0.0.1:5000/api/v1";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_root: String,
    pub generator_debounce_ms: u64,
    pub analyzer_debounce_ms: u64,
    pub preferences_path: PathBuf,
    pub download_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.into(),
            generator_debounce_ms: 250,
            analyzer_debounce_ms: 500,
            preferences_path: dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pwutil")
                .join("preferences.json"),
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl ClientSettings {
    pub fn generator_quiet_period(&self) -> Duration {
        Duration::from_millis(self.generator_debounce_ms)
    }

    pub fn analyzer_quiet_period(&self) -> Duration {
        Duration::from_millis(self.analyzer_debounce_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_root)
            .with_context(|| format!("invalid api root '{}'", self.api_root))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api root '{}' must use http or https", self.api_root);
        }
        Ok(())
    }
}

pub fn load_settings() -> Result<ClientSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

/// File values first, then environment overrides. A missing file is fine.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<ClientSettings>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ClientSettings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };

    if let Some(v) = env("PWUTIL_API_ROOT") {
        settings.api_root = v;
    }
    if let Some(v) = env("APP__API_ROOT") {
        settings.api_root = v;
    }

    if let Some(v) = env("APP__GENERATOR_DEBOUNCE_MS") {
        settings.generator_debounce_ms = v
            .parse()
            .with_context(|| format!("APP__GENERATOR_DEBOUNCE_MS is not a number: '{v}'"))?;
    }
    if let Some(v) = env("APP__ANALYZER_DEBOUNCE_MS") {
        settings.analyzer_debounce_ms = v
            .parse()
            .with_context(|| format!("APP__ANALYZER_DEBOUNCE_MS is not a number: '{v}'"))?;
    }

    if let Some(v) = env("APP__PREFERENCES_PATH") {
        settings.preferences_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;

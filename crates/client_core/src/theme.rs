//! Light/dark preference and its persistence.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use anyhow::{Context, Result};
use shared::domain::ThemePreference;
use tracing::{info, warn};

use crate::notifications::{NotificationCenter, Severity};

pub const THEME_KEY: &str = "theme";
const THEME_NOTICE_DURATION: Duration = Duration::from_millis(2000);

/// Durable client-side key/value storage for preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept as a flat JSON object in a single file.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read preferences at '{}'", self.path.display())
                })
            }
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
            Ok(values) => Ok(values),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring corrupt preferences file");
                Ok(BTreeMap::new())
            }
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create preferences directory '{}'", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(&values)?;
        fs::write(&self.path, serialized).with_context(|| {
            format!("failed to write preferences at '{}'", self.path.display())
        })
    }
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.values().insert(key.to_string(), value.to_string());
        store
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Icon of the theme toggle: offers the opposite theme.
pub fn theme_indicator(theme: ThemePreference) -> &'static str {
    match theme {
        ThemePreference::Light => "🌙",
        ThemePreference::Dark => "☀️",
    }
}

pub struct ThemeManager {
    store: Arc<dyn PreferenceStore>,
    notifications: NotificationCenter,
    current: Mutex<ThemePreference>,
}

impl ThemeManager {
    pub fn new(store: Arc<dyn PreferenceStore>, notifications: NotificationCenter) -> Self {
        Self {
            store,
            notifications,
            current: Mutex::new(ThemePreference::default()),
        }
    }

    /// Applies the persisted preference without notifying.
    pub fn load_initial(&self) -> ThemePreference {
        let persisted = match self.store.get(THEME_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "failed to read theme preference");
                None
            }
        };
        let theme = ThemePreference::from_persisted(persisted.as_deref());
        *self.current_slot() = theme;
        info!(theme = theme.as_str(), "theme applied");
        theme
    }

    pub fn toggle(&self) -> ThemePreference {
        let theme = {
            let mut current = self.current_slot();
            *current = current.toggled();
            *current
        };
        if let Err(err) = self.store.set(THEME_KEY, theme.as_str()) {
            warn!(error = %err, "failed to persist theme preference");
        }
        let message = match theme {
            ThemePreference::Light => "Light theme activated ☀️",
            ThemePreference::Dark => "Dark theme activated 🌙",
        };
        self.notifications
            .notify_for(message, Severity::Success, THEME_NOTICE_DURATION);
        theme
    }

    pub fn current(&self) -> ThemePreference {
        *self.current_slot()
    }

    pub fn indicator(&self) -> &'static str {
        theme_indicator(self.current())
    }

    fn current_slot(&self) -> MutexGuard<'_, ThemePreference> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/theme_tests.rs"]
mod tests;

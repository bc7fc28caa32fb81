use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const PASSWORD_LENGTH_RANGE: RangeInclusive<u32> = 1..=128;
pub const BULK_COUNT_RANGE: RangeInclusive<u32> = 1..=50;
pub const DEFAULT_PASSWORD_LENGTH: u32 = 16;
pub const DEFAULT_BULK_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterSet {
    Uppercase,
    Lowercase,
    Numbers,
    Symbols,
}

impl CharacterSet {
    pub const ALL: [CharacterSet; 4] = [
        CharacterSet::Uppercase,
        CharacterSet::Lowercase,
        CharacterSet::Numbers,
        CharacterSet::Symbols,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CharacterSet::Uppercase => "Uppercase",
            CharacterSet::Lowercase => "Lowercase",
            CharacterSet::Numbers => "Numbers",
            CharacterSet::Symbols => "Symbols",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl GenerationOptions {
    pub fn none() -> Self {
        Self {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
        }
    }

    pub fn is_enabled(&self, set: CharacterSet) -> bool {
        match set {
            CharacterSet::Uppercase => self.uppercase,
            CharacterSet::Lowercase => self.lowercase,
            CharacterSet::Numbers => self.numbers,
            CharacterSet::Symbols => self.symbols,
        }
    }

    pub fn set(&mut self, set: CharacterSet, enabled: bool) {
        match set {
            CharacterSet::Uppercase => self.uppercase = enabled,
            CharacterSet::Lowercase => self.lowercase = enabled,
            CharacterSet::Numbers => self.numbers = enabled,
            CharacterSet::Symbols => self.symbols = enabled,
        }
    }

    pub fn any_selected(&self) -> bool {
        self.uppercase || self.lowercase || self.numbers || self.symbols
    }

    pub fn ensure_any_selected(&self) -> Result<(), ValidationError> {
        if self.any_selected() {
            Ok(())
        } else {
            Err(ValidationError::NoCharacterSet)
        }
    }
}

/// Current option/length selection of the generator, shared read-only with
/// the bulk workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSelection {
    pub options: GenerationOptions,
    pub length: u32,
}

impl Default for GenerationSelection {
    fn default() -> Self {
        Self {
            options: GenerationOptions::default(),
            length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

pub fn clamp_length(length: u32) -> u32 {
    length.clamp(*PASSWORD_LENGTH_RANGE.start(), *PASSWORD_LENGTH_RANGE.end())
}

pub fn validate_length(length: u32) -> Result<(), ValidationError> {
    if PASSWORD_LENGTH_RANGE.contains(&length) {
        Ok(())
    } else {
        Err(ValidationError::LengthOutOfRange { length })
    }
}

pub fn validate_bulk_count(count: u32) -> Result<(), ValidationError> {
    if BULK_COUNT_RANGE.contains(&count) {
        Ok(())
    } else {
        Err(ValidationError::BulkCountOutOfRange { count })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Unset or unrecognized values fall back to light.
    pub fn from_persisted(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("dark") => ThemePreference::Dark,
            _ => ThemePreference::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;

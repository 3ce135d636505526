//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub validation: ValidationSettings,
    pub reference: ReferenceSettings,
    pub storage: StorageSettings,
}

/// Coverage thresholds applied to every extracted sentence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationSettings {
    pub min_coverage: f64,
    pub warn_coverage: f64,
    pub max_coverage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSettings {
    pub max_characters: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub data_file: String,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn invalid(field: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_f64 {
        ($section:ident . $field:ident) => {
            if s.$section.$field.is_nan() || s.$section.$field <= 0.0 {
                return Err(invalid(
                    concat!(stringify!($section), ".", stringify!($field)),
                    "must be positive",
                ));
            }
        };
    }

    check_positive_f64!(validation.min_coverage);
    check_positive_f64!(validation.warn_coverage);
    check_positive_f64!(validation.max_coverage);

    let v = &s.validation;
    if v.min_coverage > v.warn_coverage {
        return Err(invalid(
            "validation.warn_coverage",
            "must not be lower than min_coverage",
        ));
    }
    if v.warn_coverage > 1.0 {
        return Err(invalid("validation.warn_coverage", "must not exceed 1.0"));
    }
    if v.max_coverage < 1.0 {
        return Err(invalid("validation.max_coverage", "must be at least 1.0"));
    }

    if s.reference.max_characters == 0 {
        return Err(invalid("reference.max_characters", "must be positive"));
    }
    if s.storage.data_file.trim().is_empty() {
        return Err(invalid("storage.data_file", "must not be empty"));
    }

    Ok(())
}

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
    pub index: IndexSettings,
    pub query: QuerySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    pub capacity_divisor: usize,
    pub index_extension: String,
}

impl IndexSettings {
    /// Number of index slots (excluding the header) reserved for a
    /// dictionary of `dict_len` bytes.
    pub fn capacity_for(&self, dict_len: usize) -> usize {
        dict_len / self.capacity_divisor.max(1) + 1
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySettings {
    pub max_results: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    if s.index.capacity_divisor == 0 {
        return Err(SettingsError::InvalidValue {
            field: "index.capacity_divisor".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    let ext = s.index.index_extension.as_str();
    if ext.is_empty() || ext.contains(['/', '\\', '.']) {
        return Err(SettingsError::InvalidValue {
            field: "index.index_extension".to_string(),
            reason: "must be a non-empty extension without separators or dots".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.index.capacity_divisor, 1);
        assert_eq!(s.index.index_extension, "jdx");
        assert_eq!(s.query.max_results, 0);
    }

    #[test]
    fn parse_valid_custom_toml() {
        let toml = r#"
[index]
capacity_divisor = 4
index_extension = "idx"

[query]
max_results = 50
"#;
        let s = parse_settings_toml(toml).unwrap();
        assert_eq!(s.index.capacity_divisor, 4);
        assert_eq!(s.index.index_extension, "idx");
        assert_eq!(s.query.max_results, 50);
    }

    #[test]
    fn capacity_for_rounds_down_plus_one() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.index.capacity_for(0), 1);
        assert_eq!(s.index.capacity_for(9), 10);

        let halved = IndexSettings {
            capacity_divisor: 2,
            index_extension: "jdx".to_string(),
        };
        assert_eq!(halved.capacity_for(9), 5);
        assert_eq!(halved.capacity_for(10), 6);
    }

    #[test]
    fn error_zero_divisor() {
        let toml = r#"
[index]
capacity_divisor = 0
index_extension = "jdx"

[query]
max_results = 0
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(err.to_string().contains("index.capacity_divisor"), "{err}");
    }

    #[test]
    fn error_bad_extension() {
        let toml = r#"
[index]
capacity_divisor = 2
index_extension = "../x"

[query]
max_results = 0
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(err.to_string().contains("index.index_extension"), "{err}");
    }

    #[test]
    fn error_missing_section() {
        let toml = r#"
[index]
capacity_divisor = 2
index_extension = "jdx"
"#;
        assert!(matches!(
            parse_settings_toml(toml),
            Err(SettingsError::Parse(_))
        ));
    }
}

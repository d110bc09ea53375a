//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `DispatchPlan`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let plan = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Sinks: {}", plan.sinks.len());
//! ```

mod parser;
mod validator;

pub use contracts::DispatchPlan;
pub use parser::ConfigFormat;

use contracts::DispatchError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<DispatchPlan, DispatchError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DispatchPlan, DispatchError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize DispatchPlan to TOML string
    pub fn to_toml(plan: &DispatchPlan) -> Result<String, DispatchError> {
        toml::to_string_pretty(plan)
            .map_err(|e| DispatchError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize DispatchPlan to JSON string
    pub fn to_json(plan: &DispatchPlan) -> Result<String, DispatchError> {
        serde_json::to_string_pretty(plan)
            .map_err(|e| DispatchError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, DispatchError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            DispatchError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            DispatchError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, DispatchError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DispatchPlan, DispatchError> {
        let plan = parser::parse(content, format)?;
        validator::validate(&plan)?;
        Ok(plan)
    }
}

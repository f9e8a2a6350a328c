use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::device::{ExtractionConfig, DEFAULT_MAX_LINES};
use crate::domain::error::{AppError, Result};

/// Settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "snextract.toml";

/// Prefix of environment overrides; nested keys are separated by `__`
/// (`SNEXTRACT_SERVER__PORT=8080`).
pub const ENV_PREFIX: &str = "SNEXTRACT_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Lines per output file when a request does not override it
    pub max_lines: usize,

    /// Upload extensions accepted by the HTTP surface (lowercase, no dot)
    pub accepted_extensions: Vec<String>,

    /// Largest decoded workbook accepted, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            accepted_extensions: vec!["xls".to_string(), "xlsx".to_string()],
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ExtractionSettings {
    /// Per-call extraction config, honouring a request-level line limit
    pub fn extraction_config(&self, max_lines: Option<usize>) -> ExtractionConfig {
        ExtractionConfig::new().with_max_lines(max_lines.unwrap_or(self.max_lines))
    }

    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(extension))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub extraction: ExtractionSettings,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            extraction: ExtractionSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then `snextract.toml`, then `SNEXTRACT_*` variables. A `.env`
    /// file in the working directory is loaded first when present.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let settings: Settings = Self::figment(path)
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;
        settings.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid configuration: {}", e))
        })?;
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".to_string());
        }
        if self.extraction.max_lines == 0 {
            return Err("extraction.max_lines must be > 0".to_string());
        }
        if self.extraction.accepted_extensions.is_empty() {
            return Err("extraction.accepted_extensions must not be empty".to_string());
        }
        if self.extraction.max_upload_bytes == 0 {
            return Err("extraction.max_upload_bytes must be > 0".to_string());
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let settings = Settings::load_from(Path::new("missing.toml")).unwrap();
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.extraction.max_lines, 1900);
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "snextract.toml",
                r#"
                    log_filter = "debug"

                    [server]
                    port = 8080

                    [extraction]
                    max_lines = 500
                "#,
            )?;
            jail.set_env("SNEXTRACT_SERVER__PORT", "9090");

            let settings = Settings::load_from(Path::new("snextract.toml")).unwrap();
            assert_eq!(settings.server.port, 9090);
            assert_eq!(settings.server.host, "127.0.0.1");
            assert_eq!(settings.extraction.max_lines, 500);
            assert_eq!(settings.log_filter, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_zero_max_lines_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("snextract.toml", "[extraction]\nmax_lines = 0\n")?;
            let err = Settings::load_from(Path::new("snextract.toml")).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
            Ok(())
        });
    }

    #[test]
    fn test_extension_and_override_helpers() {
        let extraction = ExtractionSettings::default();
        assert!(extraction.accepts_extension("XLSX"));
        assert!(!extraction.accepts_extension("csv"));
        assert_eq!(extraction.extraction_config(None).max_lines, 1900);
        assert_eq!(extraction.extraction_config(Some(2)).max_lines, 2);
    }
}

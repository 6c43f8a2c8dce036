//! Configuration management

use crate::error::{ErrorContext, RepogenError, RepogenResult};
use crate::logging::LoggingConfig;
use crate::types::{ReadmeConfig, RepogenConfig, RepositoryConfig, ServerConfig, ToolsConfig};

use std::path::{Path, PathBuf};
use tracing::info;

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            clone_base_dir: std::env::temp_dir().to_string_lossy().to_string(),
            clone_depth: 1,
            clone_timeout_secs: 300,
            clone_retries: 2,
            excluded_dirs: vec![".git".to_string()],
        }
    }
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            tree_max_depth: 2,
            entry_candidates: vec![
                "main.py".to_string(),
                "app.py".to_string(),
                "index.js".to_string(),
            ],
            contact_email: "email@example.com".to_string(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pipreqs_command: "pipreqs".to_string(),
            tool_timeout_secs: 120,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: Vec::new(),
            max_concurrent_analyses: 4,
            allow_local_sources: false,
        }
    }
}

impl Default for RepogenConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig::default(),
            readme: ReadmeConfig::default(),
            tools: ToolsConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RepogenConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepogenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RepogenError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: RepogenConfig = toml::from_str(&content).map_err(|e| RepogenError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RepogenResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| RepogenError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| RepogenError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Candidate locations searched when no explicit path is given
    pub fn default_locations() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|d| d.join("repogen").join("config.toml")),
            dirs::home_dir().map(|d| d.join(".repogen").join("config.toml")),
            Some(PathBuf::from("repogen.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Path `config --init` writes to
    pub fn user_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repogen")
            .join("config.toml")
    }

    /// Load from `path`, else the first existing default location, else defaults
    pub fn load(path: Option<&Path>) -> RepogenResult<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(crate::config_error!(
                    format!("Configuration file not found: {}", path.display()),
                    "config"
                ));
            }
            info!(path = %path.display(), "Loading configuration");
            return Self::from_file(path);
        }

        for candidate in Self::default_locations() {
            if candidate.exists() {
                info!(path = %candidate.display(), "Loading configuration");
                return Self::from_file(candidate);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Validate configuration
    pub fn validate(&self) -> RepogenResult<()> {
        let checks: [(bool, &str, &str); 5] = [
            (
                self.readme.tree_max_depth == 0,
                "readme.tree_max_depth must be greater than 0",
                "Set readme.tree_max_depth to a positive value",
            ),
            (
                self.repository.clone_timeout_secs == 0,
                "repository.clone_timeout_secs must be greater than 0",
                "Set repository.clone_timeout_secs to a positive value",
            ),
            (
                self.tools.tool_timeout_secs == 0,
                "tools.tool_timeout_secs must be greater than 0",
                "Set tools.tool_timeout_secs to a positive value",
            ),
            (
                self.server.max_concurrent_analyses == 0,
                "server.max_concurrent_analyses must be greater than 0",
                "Set server.max_concurrent_analyses to a positive value",
            ),
            (
                self.tools.pipreqs_command.trim().is_empty(),
                "tools.pipreqs_command must not be empty",
                "Set tools.pipreqs_command to the pipreqs executable",
            ),
        ];

        for (failed, message, suggestion) in checks {
            if failed {
                return Err(RepogenError::Config {
                    message: message.to_string(),
                    source: None,
                    context: ErrorContext::new("config")
                        .with_operation("validate")
                        .with_suggestion(suggestion),
                });
            }
        }

        Ok(())
    }
}

//! Configuration management for the CLI.

use crate::cli::PresetArg;
use crate::error::{CliError, Result};
use covenant_analyzer::{AnalyzerConfig, PipelineConfig};
use covenant_extractor::ExtractorConfig;
use covenant_oracle::{DEFAULT_ENDPOINT, DEFAULT_TEMPERATURE};
use covenant_verifier::VerifierConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// One file holds the CLI settings, the oracle connection and every
/// pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Oracle connection
    #[serde(default)]
    pub oracle: OracleSettings,

    /// Extraction and candidate selection
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Verification gates
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Oracle fan-out and voting
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Database used when `--db` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

/// Oracle connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Ollama endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".covenant").join("config.toml"))
    }

    /// Configuration for a preset.
    pub fn preset(preset: PresetArg) -> Self {
        let pipeline = match preset {
            PresetArg::Default => PipelineConfig::default(),
            PresetArg::Aggressive => PipelineConfig::aggressive(),
            PresetArg::Lenient => PipelineConfig::lenient(),
        };
        Self {
            extractor: pipeline.extractor,
            verifier: pipeline.verifier,
            analyzer: pipeline.analyzer,
            ..Self::default()
        }
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = Self::path()?;
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        Self::load_from(&path)
    }

    /// Load and validate configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Pipeline configuration from the stage sections.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            extractor: self.extractor.clone(),
            verifier: self.verifier.clone(),
            analyzer: self.analyzer.clone(),
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.oracle.model.trim().is_empty() {
            return Err(CliError::Config("oracle.model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            return Err(CliError::Config(format!(
                "oracle.temperature must be between 0.0 and 2.0, got {}",
                self.oracle.temperature
            )));
        }
        self.pipeline().validate().map_err(CliError::Config)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            database: None,
        }
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    "llama3.1".to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

//! Configuration management for Palette

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::context::{ContextSettings, PackingStrategy};
use crate::project::{
    ComponentLibrary, Framework, GenerationStrategy, ProjectConfiguration, StylingSystem,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub ai: AiConfig,
    pub context: ContextConfig,
    pub project: ProjectOverrides,
    #[serde(skip)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory generated files are written to, relative to the project
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key_env: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Total token budget for the system and user prompts
    pub max_tokens: usize,
    pub reserved_tokens: usize,
    pub max_component_examples: usize,
    pub packing: PackingStrategy,
    /// Use the configuration-aware optimizer
    pub configuration_aware: bool,
}

/// Values that take precedence over detection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_library: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: "components/generated".to_string(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            temperature: 0.3,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        let settings = ContextSettings::default();
        Self {
            max_tokens: settings.total_tokens,
            reserved_tokens: settings.reserved_tokens,
            max_component_examples: settings.max_component_examples,
            packing: settings.strategy,
            configuration_aware: true,
        }
    }
}

impl ContextConfig {
    pub fn settings(&self) -> ContextSettings {
        ContextSettings {
            total_tokens: self.max_tokens,
            reserved_tokens: self.reserved_tokens,
            max_component_examples: self.max_component_examples,
            strategy: self.packing,
        }
    }
}

impl ProjectOverrides {
    pub fn is_empty(&self) -> bool {
        self.framework.is_none() && self.styling.is_none() && self.component_library.is_none()
    }

    /// Replace detected values with configured ones
    pub fn apply(&self, mut configuration: ProjectConfiguration) -> ProjectConfiguration {
        if self.is_empty() {
            return configuration;
        }
        if let Some(framework) = self.framework.as_deref() {
            configuration.framework = Framework::from_name(framework);
        }
        if let Some(styling) = self.styling.as_deref() {
            configuration.styling_system = StylingSystem::from_name(styling);
        }
        if let Some(library) = self.component_library.as_deref() {
            configuration.component_library = ComponentLibrary::from_name(library);
        }
        configuration.generation_strategy =
            GenerationStrategy::for_styling(
                configuration.styling_system,
                configuration.component_library,
            );
        configuration.confidence_score = 1.0;
        configuration
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = directories::ProjectDirs::from("com", "palette", "palette")
        .context("Failed to determine config directory")?
        .config_dir()
        .to_path_buf();

    Ok(config_dir.join("config.toml"))
}

/// `--config` path or the platform default
pub fn resolve_path(custom_path: Option<&str>) -> Result<PathBuf> {
    match custom_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => config_path(),
    }
}

/// Load configuration from file or use defaults
pub fn load_config(custom_path: Option<&str>) -> Result<Config> {
    let path = resolve_path(custom_path)?;

    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

/// Write `config` to `path`, creating parent directories
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))?;
    Ok(())
}

/// Initialize configuration file with defaults
pub fn init_config(custom_path: Option<&str>) -> Result<()> {
    let path = resolve_path(custom_path)?;

    if path.exists() {
        println!("Configuration file already exists at {:?}", path);
        return Ok(());
    }

    save_config(&Config::default(), &path)?;
    println!("Configuration initialized at {:?}", path);
    Ok(())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", content);
    Ok(())
}

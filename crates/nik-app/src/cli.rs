//! CLI argument definitions for the `nik` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::{Path, PathBuf};

use nik_core::config::NikConfig;
use nik_core::error::NikError;
use nik_core::types::Personality;

/// N.I.K, a terminal chat buddy with a pluggable language model.
#[derive(Parser, Debug)]
#[command(name = "nik", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Data directory for memory, chat logs and the knowledge cache.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Starting personality (friendly, professional, casual, enthusiastic).
    #[arg(short = 'p', long = "personality")]
    pub personality: Option<String>,

    /// What the bot should call you. Overrides the remembered name.
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Use the built-in offline model instead of a model server.
    #[arg(long = "offline")]
    pub offline: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > NIK_CONFIG env var > ~/.nik/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("NIK_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Fold flag overrides into the loaded configuration.
    pub fn apply(&self, config: &mut NikConfig) -> Result<(), NikError> {
        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(ref key) = self.personality {
            config.chat.default_personality = key.parse::<Personality>()?;
        }
        if self.offline {
            config.model.backend = "offline".to_string();
        }
        Ok(())
    }
}

/// Where the starting configuration came from.
///
/// Loading happens before the tracing subscriber exists, so the outcome is
/// reported by the caller once logging is up.
#[derive(Debug)]
pub enum ConfigOrigin {
    Loaded,
    /// No file yet; defaults are in use and should be written out.
    Missing,
    /// The file exists but could not be read or parsed; defaults are in use.
    Invalid(NikError),
}

/// Load the configuration file, falling back to defaults.
pub fn load_config(path: &Path) -> (NikConfig, ConfigOrigin) {
    if !path.exists() {
        return (NikConfig::default(), ConfigOrigin::Missing);
    }
    match NikConfig::load(path) {
        Ok(config) => (config, ConfigOrigin::Loaded),
        Err(e) => (NikConfig::default(), ConfigOrigin::Invalid(e)),
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".nik").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".nik").join("config.toml");
    }
    PathBuf::from("config.toml")
}

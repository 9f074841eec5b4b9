mod basic;
mod optimizer;

pub use basic::BasicConfig;
pub use optimizer::{
    API_KEY_ENV, DEFAULT_CHAT_COMPLETIONS_URL, OptimizerConfig, OptimizerResolvedConfig,
};

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Local storage and logging (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Remote optimizer settings (see `optimizer` table in config.toml).
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file when it exists.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        let path = path.as_ref();
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if path.is_file() {
            figment.merge(Toml::file(path))
        } else {
            figment
        }
    }

    /// Loads configuration by merging defaults and `config.toml` if present.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path).extract().map_err(Box::new)
    }

    /// Optimizer settings with `OPENAI_API_KEY` applied as the credential fallback.
    pub fn optimizer(&self) -> OptimizerResolvedConfig {
        self.optimizer.resolve(std::env::var(API_KEY_ENV).ok())
    }
}

use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";
const ENV_PREFIX: &str = "ABTEST_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by merging defaults, `config/Config.toml`, and
    /// `ABTEST_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be parsed or fails validation.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration from a specific TOML file. A missing file is not
    /// an error; defaults and environment variables still apply.
    ///
    /// Nested keys use a double underscore, e.g. `ABTEST_ANALYSIS__ALPHA=0.05`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be parsed or fails validation.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.analysis.validate()?;
        Ok(config)
    }
}

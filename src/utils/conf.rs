use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{units::DEFAULT_DECIMALS, utils::logger::TracingMode};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Json,
}

impl From<LogFormat> for TracingMode {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Full => TracingMode::Full,
            LogFormat::Json => TracingMode::Json,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Conf {
    /// JSON-RPC endpoint of the wallet provider. No provider when unset.
    #[serde(default)]
    pub rpc_url: Option<String>,
    pub default_decimals: u8,
    /// Ask the token for its `decimals()` instead of assuming `default_decimals`.
    pub query_decimals: bool,
    pub log_format: LogFormat,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            rpc_url: None,
            default_decimals: DEFAULT_DECIMALS,
            query_decimals: true,
            log_format: LogFormat::Full,
        }
    }
}

impl Conf {
    pub fn new(config_file: String, rpc_url: Option<String>) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("default_decimals", DEFAULT_DECIMALS as i64)?
            .set_default("query_decimals", true)?
            .set_default("log_format", "full")?
            // Priority order: config file, then environment variables, then CLI
            .add_source(File::with_name(config_file.as_str()).required(false))
            .add_source(Environment::with_prefix("coinx"))
            .set_override_option("rpc_url", rpc_url)?
            .build()?;

        s.try_deserialize()
    }
}

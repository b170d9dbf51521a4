use std::path::Path;
use std::sync::Arc;

use clap::Args;
use codec_binary::BinaryCodec;
use pool_memory::MemoryPoolFactory;
use relval_api::{PoolFactory, VarlenPool};
use serde::Deserialize;

use super::error::CliError;

// ═══════════════════════════════════════════════════════════════
//  TOML config
// ═══════════════════════════════════════════════════════════════

/// relval.toml: `[pool]` and `[codec]` tables go to the plugins as JSON.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub pool: Option<toml::Value>,
    pub codec: Option<toml::Value>,
}

pub fn load_config(path: &str) -> Result<Config, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("cannot read config {path}: {e}")))?;
    parse_config(&text).map_err(|e| CliError::Config(format!("invalid config {path}: {e}")))
}

fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

fn plugin_json(section: Option<&toml::Value>) -> Result<String, CliError> {
    match section {
        None => Ok("{}".to_string()),
        Some(v) => serde_json::to_string(v)
            .map_err(|e| CliError::Config(format!("cannot convert plugin config: {e}"))),
    }
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Path to relval.toml
    #[arg(long, global = true, default_value = "relval.toml", env = "RELVAL_CONFIG")]
    pub config: String,
}

// ═══════════════════════════════════════════════════════════════
//  Effective settings
// ═══════════════════════════════════════════════════════════════

pub struct Effective {
    pub pool: Arc<dyn VarlenPool>,
    pub codec: BinaryCodec,
}

impl Effective {
    /// A missing config file means defaults; an unreadable or invalid one is an error.
    pub fn new(args: &GlobalArgs) -> Result<Self, CliError> {
        let cfg = if Path::new(&args.config).exists() {
            load_config(&args.config)?
        } else {
            tracing::debug!(path = %args.config, "no config file, using defaults");
            Config::default()
        };
        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &Config) -> Result<Self, CliError> {
        let pool = MemoryPoolFactory.create(&plugin_json(cfg.pool.as_ref())?)?;
        let codec = BinaryCodec::from_config_json(&plugin_json(cfg.codec.as_ref())?)?;
        Ok(Self { pool, codec })
    }
}

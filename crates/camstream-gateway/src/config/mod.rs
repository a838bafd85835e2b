//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use camstream_core::error::{CamstreamError, Result};

pub use schema::{FramesSection, GatewayConfig, GatewaySection, HandlerKind, OnOversize};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CAMSTREAM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "camstream.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| CamstreamError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| CamstreamError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from `$CAMSTREAM_CONFIG`, falling back to `camstream.yaml`.
pub fn load_from_env() -> Result<GatewayConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_from_file(&path)
}

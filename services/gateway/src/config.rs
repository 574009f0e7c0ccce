use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use types::ids::Identity;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_OWNER_NAME: &str = "Contract Owner";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Gateway settings, read from `SUPPLYCHAIN_*` environment variables
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Deployer of a fresh contract
    pub owner: Identity,
    pub owner_name: String,
    /// Snapshot file; persistence is off when unset
    pub state_path: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr =
            lookup("SUPPLYCHAIN_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::Invalid {
            key: "SUPPLYCHAIN_BIND_ADDR",
            value: raw_addr.clone(),
        })?;

        let jwt_secret = lookup("SUPPLYCHAIN_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SUPPLYCHAIN_JWT_SECRET"))?;

        let raw_owner =
            lookup("SUPPLYCHAIN_OWNER").ok_or(ConfigError::Missing("SUPPLYCHAIN_OWNER"))?;
        let owner: Identity = raw_owner.parse().map_err(|_| ConfigError::Invalid {
            key: "SUPPLYCHAIN_OWNER",
            value: raw_owner.clone(),
        })?;
        if owner.is_empty() {
            return Err(ConfigError::Invalid {
                key: "SUPPLYCHAIN_OWNER",
                value: raw_owner,
            });
        }

        Ok(Self {
            bind_addr,
            jwt_secret,
            owner,
            owner_name: lookup("SUPPLYCHAIN_OWNER_NAME")
                .unwrap_or_else(|| DEFAULT_OWNER_NAME.to_string()),
            state_path: lookup("SUPPLYCHAIN_STATE_PATH")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        })
    }
}

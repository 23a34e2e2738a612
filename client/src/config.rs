use anchor_lang::prelude::Pubkey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ClientError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HookConfig {
    pub program_id: String,
    pub token_program: String,
    pub decimals: u8,
    pub log_filter: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            program_id: whitelist_hook::ID.to_string(),
            token_program: anchor_spl::token_2022::ID.to_string(),
            decimals: 9,
            log_filter: "whitelist_hook_client=info".to_string(),
        }
    }
}

impl HookConfig {
    pub fn program_id(&self) -> Result<Pubkey, ClientError> {
        parse_pubkey(&self.program_id)
    }

    pub fn token_program(&self) -> Result<Pubkey, ClientError> {
        parse_pubkey(&self.token_program)
    }
}

fn parse_pubkey(value: &str) -> Result<Pubkey, ClientError> {
    Pubkey::from_str(value).map_err(|_| ClientError::InvalidPubkey(value.to_string()))
}

/// Loads a TOML config, falling back to defaults when `path` does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<HookConfig, ClientError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(HookConfig::default());
    }

    let contents =
        fs::read_to_string(path).map_err(|e| ClientError::ConfigNotFound(e.to_string()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<HookConfig, ClientError> {
    let config: HookConfig =
        toml::from_str(contents).map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
    if config.decimals > whitelist_hook::constants::MAX_DECIMALS {
        return Err(ClientError::InvalidConfig(format!(
            "decimals must be <= {}",
            whitelist_hook::constants::MAX_DECIMALS
        )));
    }
    config.program_id()?;
    config.token_program()?;
    Ok(config)
}

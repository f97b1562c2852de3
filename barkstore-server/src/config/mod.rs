//! Configuration loading.
//!
//! Handles loading configuration from the TOML file, CLI overrides and
//! environment variables, then resolves it into ready-to-use values
//! (parsed addresses, loaded catalog, loaded keypair).

pub mod file;

use crate::config::file::FileConfig;
use barkstore_core::catalog::Catalog;
use barkstore_core::payments::KeypairSender;
use solana_sdk::pubkey::Pubkey;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// CRM settings resolved from the file.
#[derive(Debug, Clone)]
pub struct CrmSettings {
    pub portal_id: String,
    pub contact_form_id: String,
    pub newsletter_form_id: String,
}

/// Fully resolved configuration.
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub catalog: Catalog,
    pub cart_file: PathBuf,
    pub rpc_url: Url,
    pub cluster: String,
    /// Operator wallet; `None` disables the crypto payment paths.
    pub wallet: Option<Arc<KeypairSender>>,
    pub store_wallet: Pubkey,
    pub usdc_mint: Pubkey,
    pub bark_mint: Pubkey,
    /// Card processor secret from the environment; `None` disables card
    /// checkout.
    pub stripe_secret: Option<String>,
    pub success_url: Url,
    pub cancel_url: Url,
    pub crm: CrmSettings,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and resolve the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (a missing file means all defaults)
    /// 2. Apply CLI overrides
    /// 3. Parse addresses and load the catalog and operator keypair
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = self.read_file()?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        let catalog = match &file_config.store.catalog {
            Some(path) => Catalog::from_json_file(path)
                .map_err(|e| ConfigError::Validation(format!("catalog: {e}")))?,
            None => Catalog::builtin(),
        };
        if catalog.is_empty() {
            return Err(ConfigError::Validation("catalog has no products".to_string()));
        }

        let wallet = match &file_config.solana.keypair_path {
            Some(path) => Some(Arc::new(KeypairSender::from_file(path).map_err(|e| {
                ConfigError::Validation(format!("keypair {}: {e}", path.display()))
            })?)),
            None => None,
        };

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            catalog,
            cart_file: file_config.store.cart_file,
            rpc_url: file_config.solana.rpc_url,
            cluster: file_config.solana.cluster,
            wallet,
            store_wallet: parse_pubkey("solana.store_wallet", &file_config.solana.store_wallet)?,
            usdc_mint: parse_pubkey("solana.usdc_mint", &file_config.solana.usdc_mint)?,
            bark_mint: parse_pubkey("solana.bark_mint", &file_config.solana.bark_mint)?,
            stripe_secret: get_stripe_secret(),
            success_url: file_config.stripe.success_url,
            cancel_url: file_config.stripe.cancel_url,
            crm: CrmSettings {
                portal_id: file_config.crm.portal_id,
                contact_form_id: file_config.crm.contact_form_id,
                newsletter_form_id: file_config.crm.newsletter_form_id,
            },
        })
    }

    fn read_file(&self) -> Result<FileConfig, ConfigError> {
        if !self.config_path.exists() {
            tracing::info!(
                path = %self.config_path.display(),
                "config file not found, running with defaults"
            );
            return Ok(toml::from_str("")?);
        }
        let content = std::fs::read_to_string(&self.config_path)?;
        Ok(toml::from_str(&content)?)
    }
}

fn parse_pubkey(key: &str, value: &str) -> Result<Pubkey, ConfigError> {
    Pubkey::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("{key} is not a valid pubkey: {e}")))
}

/// Card processor secret from the environment.
pub fn get_stripe_secret() -> Option<String> {
    std::env::var("STRIPE_SECRET_KEY").ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pubkey_rejects_garbage() {
        assert!(parse_pubkey("solana.store_wallet", "not-a-key").is_err());
        assert!(
            parse_pubkey(
                "solana.store_wallet",
                "BARKkeAwhTuFzcLHX4DjotRsmjXQ1MshGrZbn1CUQqMo"
            )
            .is_ok()
        );
    }
}

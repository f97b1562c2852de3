//! TOML file configuration structures.
//!
//! These structs directly map to the `barkstore.toml` file format. Every
//! section is optional; the defaults run a devnet storefront out of the
//! box.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub solana: SolanaConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub crm: CrmConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Storefront configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Optional catalog JSON file; the built-in catalog is used when
    /// unset.
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    /// File the cart is persisted to on every mutation.
    #[serde(default = "default_cart_file")]
    pub cart_file: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            cart_file: default_cart_file(),
        }
    }
}

fn default_cart_file() -> PathBuf {
    PathBuf::from("./shopping-cart.json")
}

/// Solana configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaConfig {
    /// RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: Url,

    /// Cluster name used in explorer links.
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// Operator keypair used to pay; crypto checkout fails with a
    /// wallet-not-connected error while this is unset.
    #[serde(default)]
    pub keypair_path: Option<PathBuf>,

    /// Store wallet receiving payments.
    #[serde(default = "default_store_wallet")]
    pub store_wallet: String,

    /// USDC mint address.
    #[serde(default = "default_usdc_mint")]
    pub usdc_mint: String,

    /// BARK mint address.
    #[serde(default = "default_bark_mint")]
    pub bark_mint: String,
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            cluster: default_cluster(),
            keypair_path: None,
            store_wallet: default_store_wallet(),
            usdc_mint: default_usdc_mint(),
            bark_mint: default_bark_mint(),
        }
    }
}

fn default_rpc_url() -> Url {
    "https://api.devnet.solana.com"
        .parse()
        .expect("valid default RPC url")
}

fn default_cluster() -> String {
    "devnet".to_string()
}

fn default_store_wallet() -> String {
    "BARKkeAwhTuFzcLHX4DjotRsmjXQ1MshGrZbn1CUQqMo".to_string()
}

fn default_usdc_mint() -> String {
    // Devnet USDC.
    "3YdPmr4VtvtDqZJJESEYbbHDVSL6wuoocKkgHfHK7Uxd".to_string()
}

fn default_bark_mint() -> String {
    "2NTvEssJ2i998V2cMGT4Fy3JhyFnAzHFonDo9dbAkVrg".to_string()
}

/// Card checkout configuration section.
///
/// The API secret is read from the `STRIPE_SECRET_KEY` environment
/// variable, never from the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    #[serde(default = "default_success_url")]
    pub success_url: Url,

    #[serde(default = "default_cancel_url")]
    pub cancel_url: Url,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
        }
    }
}

fn default_success_url() -> Url {
    "https://bark-ecommerce.vercel.app/payment-success"
        .parse()
        .expect("valid default success url")
}

fn default_cancel_url() -> Url {
    "https://bark-ecommerce.vercel.app/cancel"
        .parse()
        .expect("valid default cancel url")
}

/// CRM forms configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    #[serde(default = "default_portal_id")]
    pub portal_id: String,

    #[serde(default = "default_form_id")]
    pub contact_form_id: String,

    #[serde(default = "default_form_id")]
    pub newsletter_form_id: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            portal_id: default_portal_id(),
            contact_form_id: default_form_id(),
            newsletter_form_id: default_form_id(),
        }
    }
}

fn default_portal_id() -> String {
    "46694864".to_string()
}

fn default_form_id() -> String {
    "19ab94d9-652c-4c9b-81b6-4e2d28341567".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.solana.cluster, "devnet");
        assert!(config.solana.keypair_path.is_none());
        assert_eq!(config.store.cart_file, PathBuf::from("./shopping-cart.json"));
    }

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[store]
catalog = "./catalog.json"
cart_file = "/var/lib/barkstore/cart.json"

[solana]
rpc_url = "https://api.mainnet-beta.solana.com"
cluster = "mainnet-beta"
keypair_path = "/etc/barkstore/operator.json"
store_wallet = "BARKkeAwhTuFzcLHX4DjotRsmjXQ1MshGrZbn1CUQqMo"

[stripe]
success_url = "https://shop.example/payment-success"
cancel_url = "https://shop.example/cancel"

[crm]
portal_id = "12345"
contact_form_id = "form-a"
newsletter_form_id = "form-b"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.solana.cluster, "mainnet-beta");
        assert!(config.solana.keypair_path.is_some());
        assert_eq!(config.crm.newsletter_form_id, "form-b");
        // Unset keys inside a present section still default.
        assert_eq!(config.solana.usdc_mint, default_usdc_mint());
    }
}

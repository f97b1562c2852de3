//! Application state shared across all request handlers.

use barkstore_core::cart::CartStore;
use barkstore_core::catalog::Catalog;
use barkstore_core::crm::CrmClient;
use barkstore_core::payments::{
    CardDispatcher, NativeDispatcher, TokenDispatcher, TransactionSender,
};
use barkstore_core::pricing::{CoinGeckoSource, PriceOracle};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::LoadedConfig;

/// All payment dispatchers plus their destination addresses.
pub struct PaymentStack {
    pub native: NativeDispatcher,
    pub token: TokenDispatcher,
    /// `None` while no processor secret is configured.
    pub card: Option<CardDispatcher>,
    pub store_wallet: Pubkey,
    pub usdc_mint: Pubkey,
    pub bark_mint: Pubkey,
}

/// CRM client plus the form ids it relays to.
pub struct CrmForms {
    pub client: CrmClient,
    pub contact_form_id: String,
    pub newsletter_form_id: String,
}

/// Application state shared across all request handlers.
///
/// Cloneable and cheap to pass around (everything is behind Arc). The
/// cart is the only mutable piece and is serialized behind one RwLock.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub cart: Arc<RwLock<CartStore>>,
    pub oracle: Arc<PriceOracle<CoinGeckoSource>>,
    pub payments: Arc<PaymentStack>,
    pub crm: Arc<CrmForms>,
    pub cluster: Arc<str>,
}

impl AppState {
    /// Assemble the state from a resolved configuration.
    pub fn from_config(config: LoadedConfig) -> Self {
        let rpc = Arc::new(RpcClient::new(config.rpc_url.to_string()));
        let sender: Option<Arc<dyn TransactionSender>> = config
            .wallet
            .map(|keypair| keypair as Arc<dyn TransactionSender>);

        let card = config.stripe_secret.map(|secret| {
            CardDispatcher::new(secret, config.success_url.clone(), config.cancel_url.clone())
        });
        if card.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY not set, card checkout disabled");
        }
        if sender.is_none() {
            tracing::warn!("no operator keypair configured, crypto checkout disabled");
        }

        let payments = PaymentStack {
            native: NativeDispatcher::new(rpc.clone(), sender.clone()),
            token: TokenDispatcher::new(rpc, sender),
            card,
            store_wallet: config.store_wallet,
            usdc_mint: config.usdc_mint,
            bark_mint: config.bark_mint,
        };

        let crm = CrmForms {
            client: CrmClient::new(config.crm.portal_id),
            contact_form_id: config.crm.contact_form_id,
            newsletter_form_id: config.crm.newsletter_form_id,
        };

        Self {
            catalog: Arc::new(config.catalog),
            cart: Arc::new(RwLock::new(CartStore::open(config.cart_file))),
            oracle: Arc::new(PriceOracle::coingecko()),
            payments: Arc::new(payments),
            crm: Arc::new(crm),
            cluster: config.cluster.into(),
        }
    }
}

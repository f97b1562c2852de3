//! Transaction signing seam.
//!
//! Dispatchers build unsigned transactions; a [`TransactionSender`] owns
//! the key material, signs and submits. Production uses an operator
//! keypair; tests substitute stubs.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

use super::PaymentError;

/// Signs and submits transactions on behalf of the paying wallet.
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Public key of the paying wallet.
    fn pubkey(&self) -> Pubkey;

    /// Sign `transaction` against `recent_blockhash` and submit it,
    /// waiting for network confirmation.
    async fn sign_and_send(
        &self,
        rpc: &RpcClient,
        transaction: Transaction,
        recent_blockhash: Hash,
    ) -> Result<Signature, PaymentError>;
}

/// The keypair file could not be read or decoded.
#[derive(Debug, thiserror::Error)]
#[error("failed to load wallet keypair: {0}")]
pub struct WalletLoadError(String);

/// Signs with a locally held keypair and submits over RPC.
pub struct KeypairSender {
    keypair: Keypair,
}

impl KeypairSender {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Read the keypair from a JSON file in the standard CLI format.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, WalletLoadError> {
        let keypair = solana_sdk::signature::read_keypair_file(path.as_ref())
            .map_err(|e| WalletLoadError(e.to_string()))?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl TransactionSender for KeypairSender {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_and_send(
        &self,
        rpc: &RpcClient,
        mut transaction: Transaction,
        recent_blockhash: Hash,
    ) -> Result<Signature, PaymentError> {
        transaction
            .try_sign(&[&self.keypair], recent_blockhash)
            .map_err(|e| PaymentError::TransferSubmissionFailed(e.to_string()))?;
        rpc.send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| PaymentError::TransferSubmissionFailed(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A sender with a throwaway key that refuses to submit anything.
    /// Lets validation paths run without touching the network.
    pub struct StubSender {
        pubkey: Pubkey,
    }

    impl StubSender {
        pub fn new() -> Self {
            Self {
                pubkey: Pubkey::new_unique(),
            }
        }
    }

    #[async_trait]
    impl TransactionSender for StubSender {
        fn pubkey(&self) -> Pubkey {
            self.pubkey
        }

        async fn sign_and_send(
            &self,
            _rpc: &RpcClient,
            _transaction: Transaction,
            _recent_blockhash: Hash,
        ) -> Result<Signature, PaymentError> {
            Err(PaymentError::TransferSubmissionFailed(
                "stub sender does not submit".to_string(),
            ))
        }
    }
}

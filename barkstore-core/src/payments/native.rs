//! Native SOL transfer dispatcher.
//!
//! Validates the request, checks the sender's live balance, then builds a
//! single system-transfer instruction with the sender as fee payer, stamps
//! a fresh blockhash and submits through the [`TransactionSender`] seam,
//! waiting for confirmation.

use barkstore_sdk::objects::{Currency, TransferResult};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

use super::wallet::TransactionSender;
use super::PaymentError;
use crate::pricing::to_smallest_unit;

/// Request to transfer SOL to the store wallet.
#[derive(Debug, Clone)]
pub struct NativeTransferRequest {
    /// Amount in whole SOL.
    pub amount: Decimal,
    pub recipient: Pubkey,
}

/// Dispatches native SOL transfers.
pub struct NativeDispatcher {
    rpc: Arc<RpcClient>,
    sender: Option<Arc<dyn TransactionSender>>,
}

impl NativeDispatcher {
    /// `sender` is `None` when no wallet is connected; every dispatch then
    /// fails fast with [`PaymentError::WalletNotConnected`].
    pub fn new(rpc: Arc<RpcClient>, sender: Option<Arc<dyn TransactionSender>>) -> Self {
        Self { rpc, sender }
    }

    async fn execute(&self, request: &NativeTransferRequest) -> Result<Signature, PaymentError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or(PaymentError::WalletNotConnected)?;
        if request.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(request.amount));
        }

        let lamports = to_smallest_unit(Currency::Sol, request.amount)?;
        let from = sender.pubkey();

        // Live balance check before anything is built or submitted.
        let balance = self
            .rpc
            .get_balance(&from)
            .await
            .map_err(|e| PaymentError::AccountLookupFailed(e.to_string()))?;
        if balance < lamports {
            return Err(PaymentError::InsufficientBalance {
                balance,
                required: lamports,
            });
        }

        let instruction = system_instruction::transfer(&from, &request.recipient, lamports);
        let transaction = Transaction::new_with_payer(&[instruction], Some(&from));

        // Blockhashes expire quickly; fetch immediately before submission,
        // never from a cache.
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| PaymentError::TransferSubmissionFailed(e.to_string()))?;

        sender.sign_and_send(&self.rpc, transaction, blockhash).await
    }
}

impl Processor<NativeTransferRequest> for NativeDispatcher {
    type Output = TransferResult;
    type Error = Infallible;

    /// Runs the transfer and normalizes every failure into the result;
    /// the checkout flow must never crash on a payment error.
    async fn process(&self, request: NativeTransferRequest) -> Result<TransferResult, Infallible> {
        match self.execute(&request).await {
            Ok(signature) => {
                info!(%signature, amount = %request.amount, "SOL transfer confirmed");
                Ok(TransferResult::ok(signature.to_string()))
            }
            Err(e) => {
                error!(error = %e, amount = %request.amount, "SOL transfer failed");
                Ok(TransferResult::failed(e.to_string()))
            }
        }
    }
}

//! SPL token transfer dispatcher, shared by USDC and the BARK token.
//!
//! Both tokens follow the same two-step protocol:
//!
//! 1. Resolve the sender's and recipient's associated token accounts for
//!    the mint. If the recipient's account does not exist on-chain yet, a
//!    create-account instruction is prepended to the SAME transaction as
//!    the transfer — the pair succeeds or fails as one submission.
//! 2. Append a checked transfer for the amount converted to the token's
//!    smallest unit.
//!
//! An account lookup that fails for any reason other than "not found"
//! aborts the dispatch instead of being treated as a missing account.

use barkstore_sdk::objects::{Currency, TransferResult};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

use super::wallet::TransactionSender;
use super::PaymentError;
use crate::pricing::to_smallest_unit;

/// Request to transfer an SPL token to the store wallet.
#[derive(Debug, Clone)]
pub struct TokenTransferRequest {
    /// Amount in whole tokens.
    pub amount: Decimal,
    /// Token currency; carries the decimal places for the conversion.
    pub currency: Currency,
    /// Mint address of the token.
    pub mint: Pubkey,
    pub recipient: Pubkey,
}

/// Dispatches SPL token transfers for any configured mint.
pub struct TokenDispatcher {
    rpc: Arc<RpcClient>,
    sender: Option<Arc<dyn TransactionSender>>,
}

impl TokenDispatcher {
    /// `sender` is `None` when no wallet is connected; every dispatch then
    /// fails fast with [`PaymentError::WalletNotConnected`].
    pub fn new(rpc: Arc<RpcClient>, sender: Option<Arc<dyn TransactionSender>>) -> Self {
        Self { rpc, sender }
    }

    async fn execute(&self, request: &TokenTransferRequest) -> Result<Signature, PaymentError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or(PaymentError::WalletNotConnected)?;
        if request.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(request.amount));
        }

        let from = sender.pubkey();
        let recipient_ata = get_associated_token_address(&request.recipient, &request.mint);
        let recipient_exists = self.account_exists(&recipient_ata).await?;

        let instructions = transfer_instructions(&from, request, recipient_exists)?;
        let transaction = Transaction::new_with_payer(&instructions, Some(&from));

        // Blockhashes expire quickly; fetch immediately before submission,
        // never from a cache.
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| PaymentError::TransferSubmissionFailed(e.to_string()))?;

        sender.sign_and_send(&self.rpc, transaction, blockhash).await
    }

    /// `Ok(false)` strictly means "account not found"; every other lookup
    /// failure aborts the dispatch.
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, PaymentError> {
        let response = self
            .rpc
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map_err(|e| PaymentError::AccountLookupFailed(e.to_string()))?;
        Ok(response.value.is_some())
    }
}

/// Build the instruction sequence for one atomic submission.
fn transfer_instructions(
    from: &Pubkey,
    request: &TokenTransferRequest,
    recipient_account_exists: bool,
) -> Result<Vec<Instruction>, PaymentError> {
    let source = get_associated_token_address(from, &request.mint);
    let destination = get_associated_token_address(&request.recipient, &request.mint);

    let mut instructions = Vec::with_capacity(2);
    if !recipient_account_exists {
        instructions.push(create_associated_token_account(
            from,
            &request.recipient,
            &request.mint,
            &spl_token::id(),
        ));
    }

    let amount = to_smallest_unit(request.currency, request.amount)?;
    let decimals = request.currency.decimal_places() as u8;
    let transfer = spl_token::instruction::transfer_checked(
        &spl_token::id(),
        &source,
        &request.mint,
        &destination,
        from,
        &[],
        amount,
        decimals,
    )
    .map_err(|e| PaymentError::TransferSubmissionFailed(e.to_string()))?;
    instructions.push(transfer);

    Ok(instructions)
}

impl Processor<TokenTransferRequest> for TokenDispatcher {
    type Output = TransferResult;
    type Error = Infallible;

    /// Runs the transfer and normalizes every failure into the result;
    /// the checkout flow must never crash on a payment error.
    async fn process(&self, request: TokenTransferRequest) -> Result<TransferResult, Infallible> {
        match self.execute(&request).await {
            Ok(signature) => {
                info!(
                    %signature,
                    currency = %request.currency,
                    amount = %request.amount,
                    "token transfer confirmed"
                );
                Ok(TransferResult::ok(signature.to_string()))
            }
            Err(e) => {
                error!(
                    error = %e,
                    currency = %request.currency,
                    amount = %request.amount,
                    "token transfer failed"
                );
                Ok(TransferResult::failed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::wallet::test_support::StubSender;
    use rust_decimal_macros::dec;

    fn request(currency: Currency, amount: Decimal) -> TokenTransferRequest {
        TokenTransferRequest {
            amount,
            currency,
            mint: Pubkey::new_unique(),
            recipient: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_missing_recipient_account_adds_create_instruction() {
        let from = Pubkey::new_unique();
        let req = request(Currency::Usdc, dec!(12));

        let instructions = transfer_instructions(&from, &req, false).unwrap();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].program_id, spl_associated_token_account::id());
        assert_eq!(instructions[1].program_id, spl_token::id());
    }

    #[test]
    fn test_existing_recipient_account_transfers_only() {
        let from = Pubkey::new_unique();
        let req = request(Currency::Usdc, dec!(12));

        let instructions = transfer_instructions(&from, &req, true).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].program_id, spl_token::id());
    }

    #[test]
    fn test_create_and_transfer_share_one_transaction() {
        let from = Pubkey::new_unique();
        let req = request(Currency::Bark, dec!(5));

        let instructions = transfer_instructions(&from, &req, false).unwrap();
        let transaction = Transaction::new_with_payer(&instructions, Some(&from));
        assert_eq!(transaction.message.instructions.len(), 2);
        assert_eq!(transaction.message.account_keys.first(), Some(&from));
    }

    #[tokio::test]
    async fn test_no_wallet_fails_without_network() {
        let rpc = Arc::new(RpcClient::new("http://127.0.0.1:1".to_string()));
        let dispatcher = TokenDispatcher::new(rpc, None);

        let result = dispatcher
            .process(request(Currency::Usdc, dec!(1)))
            .await
            .unwrap_or_else(|never| match never {});
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not connected"));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let rpc = Arc::new(RpcClient::new("http://127.0.0.1:1".to_string()));
        let sender: Arc<dyn TransactionSender> = Arc::new(StubSender::new());
        let dispatcher = TokenDispatcher::new(rpc, Some(sender));

        let result = dispatcher
            .process(request(Currency::Bark, dec!(0)))
            .await
            .unwrap_or_else(|never| match never {});
        assert!(!result.success);
        assert!(result.error.unwrap().contains("invalid amount"));
    }
}

//! Solana Provider Module
//!
//! Thin abstraction over the non-blocking Solana `RpcClient` covering the
//! calls the client needs: anchors (latest blockhash), block height, account
//! reads, sending and signature status.
//!
//! RPC failures are classified into `SolanaProviderError` variants so callers
//! can tell transient conditions from permanent rejections.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use std::time::Duration;
use thiserror::Error;

use crate::models::SolanaTransactionStatus;

/// Matches error patterns ignoring case and spaces.
fn matches_error_pattern(error_msg: &str, pattern: &str) -> bool {
    let normalized_msg = error_msg.to_lowercase().replace(' ', "");
    let normalized_pattern = pattern.to_lowercase().replace(' ', "");
    normalized_msg.contains(&normalized_pattern)
}

/// Errors that can occur when interacting with the Solana provider.
///
/// Use `is_transient()` to determine if an error may succeed on a later attempt.
#[derive(Error, Debug)]
pub enum SolanaProviderError {
    /// Network/IO error (transient)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// RPC protocol error (transient - node lag, sync pending)
    #[error("RPC error: {0}")]
    RpcError(String),

    /// HTTP request error with status code
    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },

    /// Invalid address format (permanent)
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Network configuration error (permanent)
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),

    /// Insufficient funds for transaction (permanent)
    #[error("Insufficient funds for transaction: {0}")]
    InsufficientFunds(String),

    /// Blockhash not found or expired (rebuild against a fresh blockhash)
    #[error("Blockhash not found or expired: {0}")]
    BlockhashNotFound(String),

    /// Invalid transaction structure or execution (permanent)
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Transaction already processed (permanent - duplicate)
    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),

    /// No account exists at the address
    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),
}

impl SolanaProviderError {
    /// Determines if this error is transient (can retry) or permanent (should fail).
    ///
    /// **Transient:** `NetworkError`, `RpcError`, `BlockhashNotFound`, and
    /// `RequestError` with 5xx, 408, 425 or 429.
    ///
    /// **Permanent:** everything else.
    pub fn is_transient(&self) -> bool {
        match self {
            SolanaProviderError::NetworkError(_) => true,
            SolanaProviderError::RpcError(_) => true,
            SolanaProviderError::BlockhashNotFound(_) => true,
            SolanaProviderError::RequestError { status_code, .. } => {
                matches!(*status_code, 500..=599 | 408 | 425 | 429)
            }
            SolanaProviderError::InvalidAddress(_) => false,
            SolanaProviderError::NetworkConfiguration(_) => false,
            SolanaProviderError::InsufficientFunds(_) => false,
            SolanaProviderError::InvalidTransaction(_) => false,
            SolanaProviderError::AlreadyProcessed(_) => false,
            SolanaProviderError::AccountNotFound(_) => false,
        }
    }

    /// Classifies a Solana RPC client error into the appropriate error variant.
    pub fn from_rpc_error(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) => SolanaProviderError::NetworkError(error.to_string()),

            ClientErrorKind::Reqwest(reqwest_err) => {
                if let Some(status) = reqwest_err.status() {
                    SolanaProviderError::RequestError {
                        error: error.to_string(),
                        status_code: status.as_u16(),
                    }
                } else {
                    SolanaProviderError::NetworkError(error.to_string())
                }
            }

            ClientErrorKind::RpcError(rpc_err) => {
                let rpc_err_str = format!("{rpc_err}");
                Self::from_rpc_response_error(&rpc_err_str, &error)
            }

            ClientErrorKind::TransactionError(tx_error) => {
                Self::from_transaction_error(tx_error, &error)
            }

            ClientErrorKind::Custom(msg) => Self::from_rpc_response_error(msg, &error),

            _ => SolanaProviderError::RpcError(error.to_string()),
        }
    }

    /// Classifies JSON-RPC response errors by code, then by message.
    ///
    /// Transient: -32004, -32005, -32008 (blockhash not found), -32014, -32016.
    /// Permanent: -32002 (simulation failed), -32003, -32007, -32009, -32010,
    /// -32013, -32015, -32602.
    fn from_rpc_response_error(error_str: &str, full_error: &ClientError) -> Self {
        let message = full_error.to_string();

        if error_str.contains("-32002") {
            if matches_error_pattern(error_str, "blockhash not found") {
                SolanaProviderError::BlockhashNotFound(message)
            } else if matches_error_pattern(error_str, "insufficient funds") {
                SolanaProviderError::InsufficientFunds(message)
            } else {
                SolanaProviderError::InvalidTransaction(message)
            }
        } else if error_str.contains("-32008") {
            SolanaProviderError::BlockhashNotFound(message)
        } else if error_str.contains("-32009") {
            SolanaProviderError::AlreadyProcessed(message)
        } else if ["-32003", "-32013", "-32015", "-32602"]
            .iter()
            .any(|code| error_str.contains(code))
        {
            SolanaProviderError::InvalidTransaction(message)
        } else if ["-32007", "-32010"]
            .iter()
            .any(|code| error_str.contains(code))
        {
            SolanaProviderError::NetworkConfiguration(message)
        } else if ["-32004", "-32005", "-32014", "-32016"]
            .iter()
            .any(|code| error_str.contains(code))
        {
            SolanaProviderError::RpcError(message)
        } else if matches_error_pattern(error_str, "insufficient funds") {
            SolanaProviderError::InsufficientFunds(message)
        } else if matches_error_pattern(error_str, "blockhash not found") {
            SolanaProviderError::BlockhashNotFound(message)
        } else if matches_error_pattern(error_str, "already processed") {
            SolanaProviderError::AlreadyProcessed(message)
        } else {
            SolanaProviderError::RpcError(message)
        }
    }

    fn from_transaction_error(
        tx_error: &solana_sdk::transaction::TransactionError,
        full_error: &ClientError,
    ) -> Self {
        use solana_sdk::transaction::TransactionError as TxErr;

        let message = full_error.to_string();
        match tx_error {
            TxErr::InsufficientFundsForFee | TxErr::InsufficientFundsForRent { .. } => {
                SolanaProviderError::InsufficientFunds(message)
            }
            TxErr::BlockhashNotFound => SolanaProviderError::BlockhashNotFound(message),
            TxErr::AlreadyProcessed => SolanaProviderError::AlreadyProcessed(message),
            TxErr::SignatureFailure
            | TxErr::MissingSignatureForFee
            | TxErr::InvalidAccountForFee
            | TxErr::AccountNotFound
            | TxErr::InvalidAccountIndex
            | TxErr::ProgramAccountNotFound
            | TxErr::InstructionError(_, _)
            | TxErr::InvalidWritableAccount
            | TxErr::TooManyAccountLocks => SolanaProviderError::InvalidTransaction(message),
            TxErr::AccountInUse | TxErr::AccountLoadedTwice | TxErr::ClusterMaintenance => {
                SolanaProviderError::RpcError(message)
            }
            _ => SolanaProviderError::RpcError(message),
        }
    }
}

/// A trait that abstracts the Solana RPC operations used by the client.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SolanaProviderTrait: Send + Sync {
    /// Latest blockhash and the last block height at which it is still valid.
    async fn get_latest_blockhash_with_commitment(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError>;

    /// Current block height.
    async fn get_block_height(&self) -> Result<u64, SolanaProviderError>;

    /// Retrieves account data for the given address.
    async fn get_account_from_pubkey(&self, pubkey: &Pubkey)
        -> Result<Account, SolanaProviderError>;

    /// Sends a signed transaction without waiting for confirmation.
    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError>;

    /// Confirmation level of a signature, `None` while the cluster has not seen it.
    async fn get_transaction_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError>;
}

pub struct SolanaProvider {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl std::fmt::Debug for SolanaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaProvider")
            .field("url", &self.client.url())
            .field("commitment", &self.commitment)
            .finish()
    }
}

impl SolanaProvider {
    pub fn new(url: &str, timeout_seconds: u64) -> Result<Self, SolanaProviderError> {
        Self::new_with_commitment(url, timeout_seconds, CommitmentConfig::confirmed())
    }

    pub fn new_with_commitment(
        url: &str,
        timeout_seconds: u64,
        commitment: CommitmentConfig,
    ) -> Result<Self, SolanaProviderError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SolanaProviderError::NetworkConfiguration(format!(
                "Invalid RPC URL: {url}"
            )));
        }

        log::debug!(
            "Creating Solana provider for {} with timeout {}s",
            url,
            timeout_seconds
        );
        let client = RpcClient::new_with_timeout_and_commitment(
            url.to_string(),
            Duration::from_secs(timeout_seconds),
            commitment,
        );
        Ok(Self { client, commitment })
    }
}

#[async_trait]
impl SolanaProviderTrait for SolanaProvider {
    async fn get_latest_blockhash_with_commitment(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError> {
        self.client
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_block_height(&self) -> Result<u64, SolanaProviderError> {
        self.client
            .get_block_height_with_commitment(self.commitment)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_account_from_pubkey(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Account, SolanaProviderError> {
        self.client
            .get_account_with_commitment(pubkey, self.commitment)
            .await
            .map_err(SolanaProviderError::from_rpc_error)?
            .value
            .ok_or(SolanaProviderError::AccountNotFound(*pubkey))
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_transaction_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError> {
        let result = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(SolanaProviderError::from_rpc_error)?;

        let status = match result.value.into_iter().next().flatten() {
            Some(status) => status,
            None => return Ok(None),
        };

        let status = if let Some(err) = &status.err {
            SolanaTransactionStatus::Failed(err.to_string())
        } else if status.satisfies_commitment(CommitmentConfig::finalized()) {
            SolanaTransactionStatus::Finalized
        } else if status.satisfies_commitment(CommitmentConfig::confirmed()) {
            SolanaTransactionStatus::Confirmed
        } else {
            SolanaTransactionStatus::Processed
        };
        Ok(Some(status))
    }
}

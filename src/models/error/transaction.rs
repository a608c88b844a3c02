use solana_sdk::{pubkey::Pubkey, signature::Signature};
use thiserror::Error;

use crate::services::SolanaProviderError;

use super::{DerivationError, InstructionError, SignerError, StateError};

fn join_pubkeys(keys: &[Pubkey]) -> String {
    keys.iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Address derivation failed: {0}")]
    Derivation(#[from] DerivationError),

    #[error("Instruction encoding failed: {0}")]
    Instruction(#[from] InstructionError),

    #[error("Account state error: {0}")]
    State(#[from] StateError),

    #[error("Missing signatures for required signers: {}", join_pubkeys(.missing))]
    MissingSigners { missing: Vec<Pubkey> },

    #[error("Signer {signer} failed: {source}")]
    Signer {
        signer: Pubkey,
        #[source]
        source: SignerError,
    },

    #[error("Signature from {signer} does not verify against the transaction message")]
    InvalidSignature { signer: Pubkey },

    #[error("Serialized transaction is {size} bytes, exceeding the {max}-byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to serialize transaction: {0}")]
    Serialization(String),

    #[error(
        "Blockhash expired at block height {last_valid_block_height} (current {current_block_height}){}",
        .signature.map(|s| format!(" before transaction {s} finalized")).unwrap_or_default()
    )]
    AnchorExpired {
        last_valid_block_height: u64,
        current_block_height: u64,
        signature: Option<Signature>,
    },

    #[error("Transaction {signature} failed on-chain: {error}")]
    ExecutionFailed { signature: Signature, error: String },

    #[error("Underlying Solana provider error: {0}")]
    UnderlyingSolanaProvider(#[from] SolanaProviderError),
}

impl TransactionError {
    /// Whether the caller may rebuild the request against a fresh blockhash and try again.
    pub fn is_anchor_expiry(&self) -> bool {
        matches!(
            self,
            TransactionError::AnchorExpired { .. }
                | TransactionError::UnderlyingSolanaProvider(SolanaProviderError::BlockhashNotFound(_))
        )
    }
}

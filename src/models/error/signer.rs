use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use super::LedgerError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),

    #[error("Invalid key format: {0}")]
    KeyError(String),

    #[error("Signer {0} is address-only and cannot produce signatures")]
    AddressOnly(Pubkey),

    #[error("Ledger signing failed: {0}")]
    Ledger(#[from] LedgerError),
}

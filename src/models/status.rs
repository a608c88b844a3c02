use serde::Serialize;
use std::fmt;

/// Confirmation level reached by a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolanaTransactionStatus {
    Processed,
    Confirmed,
    Finalized,
    /// Rejected on-chain, with the cluster's error text.
    Failed(String),
}

impl SolanaTransactionStatus {
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            SolanaTransactionStatus::Finalized | SolanaTransactionStatus::Failed(_)
        )
    }
}

impl fmt::Display for SolanaTransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolanaTransactionStatus::Processed => f.write_str("processed"),
            SolanaTransactionStatus::Confirmed => f.write_str("confirmed"),
            SolanaTransactionStatus::Finalized => f.write_str("finalized"),
            SolanaTransactionStatus::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

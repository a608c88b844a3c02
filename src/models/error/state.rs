use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Failed to decode {kind} from account {address}: {reason}")]
    Decode {
        kind: &'static str,
        address: Pubkey,
        reason: String,
    },

    #[error("Account {address} is owned by {owner}, expected {expected}")]
    UnexpectedOwner {
        address: Pubkey,
        owner: Pubkey,
        expected: Pubkey,
    },

    #[error("No proposal at {address} among the first {searched} numerations")]
    ProposalNotFound { address: Pubkey, searched: u32 },
}

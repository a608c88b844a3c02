//! Well-known program and account addresses referenced by Ingl instructions.
use solana_sdk::{pubkey, pubkey::Pubkey};

/// Program id used when the config store does not override it.
pub const DEFAULT_INGL_PROGRAM_ID: Pubkey = pubkey!("HD8kYhgqmZCJ881vyBQ3fR6a62YL7cZBnYj1P7oLw8An");

pub const TEAM_ACCOUNT: Pubkey = pubkey!("Team111111111111111111111111111111111111111");
pub const STAKE_PROGRAM_ID: Pubkey = pubkey!("Stake11111111111111111111111111111111111111");
pub const STAKE_CONFIG_PROGRAM_ID: Pubkey = pubkey!("StakeConfig11111111111111111111111111111111");
pub const VOTE_PROGRAM_ID: Pubkey = pubkey!("Vote111111111111111111111111111111111111111");
pub const BPF_LOADER_UPGRADEABLE_ID: Pubkey =
    pubkey!("BPFLoaderUpgradeab1e11111111111111111111111");
pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey =
    pubkey!("ComputeBudget111111111111111111111111111111");

pub const SYSVAR_RENT_ID: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");
pub const SYSVAR_CLOCK_ID: Pubkey = pubkey!("SysvarC1ock11111111111111111111111111111111");
pub const SYSVAR_STAKE_HISTORY_ID: Pubkey =
    pubkey!("SysvarStakeHistory1111111111111111111111111");

// The SPL and Metaplex crates may pin a different `Pubkey` type than
// solana-sdk, so their ids are carried over through raw bytes.

pub fn system_program_id() -> Pubkey {
    Pubkey::new_from_array(solana_system_interface::program::ID.to_bytes())
}

pub fn token_program_id() -> Pubkey {
    Pubkey::new_from_array(spl_token::id().to_bytes())
}

pub fn associated_token_program_id() -> Pubkey {
    Pubkey::new_from_array(spl_associated_token_account::id().to_bytes())
}

pub fn metaplex_program_id() -> Pubkey {
    Pubkey::new_from_array(mpl_token_metadata::ID.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_foreign_program_ids() {
        assert_eq!(
            system_program_id(),
            Pubkey::from_str("11111111111111111111111111111111").unwrap()
        );
        assert_eq!(
            token_program_id(),
            Pubkey::from_str("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA").unwrap()
        );
        assert_eq!(
            associated_token_program_id(),
            Pubkey::from_str("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL").unwrap()
        );
        assert_eq!(
            metaplex_program_id(),
            Pubkey::from_str("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s").unwrap()
        );
    }
}

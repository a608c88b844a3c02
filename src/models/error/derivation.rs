use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("Seed {index} is {len} bytes, exceeding the {max}-byte limit")]
    SeedTooLong { index: usize, len: usize, max: usize },

    #[error("Too many seeds: {count} supplied, at most {max} allowed")]
    TooManySeeds { count: usize, max: usize },

    #[error("No valid bump found for seeds under program {program_id}")]
    Exhausted { program_id: Pubkey },
}

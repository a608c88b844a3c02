//! Constants for building and submitting Ingl transactions.
//!
//! Compute limits mirror what the on-chain program needs for its heaviest
//! instructions; the polling values control the confirmation loop.

use std::time::Duration;

/// Compute unit limit requested ahead of `InglInit`.
pub const INGL_INIT_COMPUTE_UNITS: u32 = 250_000;

/// Compute unit limit requested ahead of `MintNft`.
pub const MINT_NFT_COMPUTE_UNITS: u32 = 400_000;

/// Delay between signature status checks while waiting for finality (in milliseconds)
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 400;

/// How long a fetched blockhash is reused before a new one is requested (in seconds)
pub const DEFAULT_BLOCKHASH_CACHE_TTL_SECONDS: u64 = 30;

/// Maximum serialized transaction size accepted by the network.
pub const PACKET_DATA_SIZE: usize = 1232;

/// RPC request timeout (in seconds)
pub const DEFAULT_RPC_TIMEOUT_SECONDS: u64 = 30;

/// Upper bound when resolving a proposal address back to its numeration or
/// probing for the next free one.
pub const PROPOSAL_SEARCH_LIMIT: u32 = 1_000;

/// Log level the Ingl program uses for its own `msg!` output.
pub const DEFAULT_PROGRAM_LOG_LEVEL: u8 = 2;

pub fn get_confirmation_poll_interval() -> Duration {
    Duration::from_millis(DEFAULT_CONFIRMATION_POLL_INTERVAL_MS)
}

pub fn get_blockhash_cache_ttl() -> Duration {
    Duration::from_secs(DEFAULT_BLOCKHASH_CACHE_TTL_SECONDS)
}

//! Seed prefixes for addresses derived under the Ingl program.
//!
//! These byte strings are part of the on-chain program's contract: changing
//! any of them yields a different address.

pub const INGL_CONFIG_SEED: &[u8] = b"ingl_config";
pub const URIS_ACCOUNT_SEED: &[u8] = b"uris_account";
pub const GENERAL_ACCOUNT_SEED: &[u8] = b"general_account";
pub const INGL_NFT_COLLECTION_KEY: &[u8] = b"ingl_nft_collection";
pub const INGL_MINT_AUTHORITY_KEY: &[u8] = b"ingl_mint_authority";
pub const INGL_MINTING_POOL_KEY: &[u8] = b"minting_pool";
pub const COLLECTION_HOLDER_KEY: &[u8] = b"collection_holder";
pub const VOTE_ACCOUNT_KEY: &[u8] = b"vote_account";
pub const AUTHORIZED_WITHDRAWER_KEY: &[u8] = b"authorized_withdrawer";
pub const STAKE_ACCOUNT_KEY: &[u8] = b"stake_account";
pub const PD_POOL_ACCOUNT_KEY: &[u8] = b"pd_pool_account";
pub const NFT_ACCOUNT_CONST: &[u8] = b"nft_account";
pub const INGL_PROGRAM_AUTHORITY_KEY: &[u8] = b"ingl_program_authority";
pub const T_STAKE_ACCOUNT_KEY: &[u8] = b"t_stake_account_key";
pub const T_WITHDRAW_KEY: &[u8] = b"t_withdraw_key";

/// Padded to a full seed width so it cannot prefix-collide with other roles.
pub const VALIDATOR_ID_SEED: &[u8] = b"validator_ID___________________";

/// Validator selection proposals, followed by the numeration as u32 big endian.
pub const VALIDATOR_PROPOSAL_KEY: &[u8] = b"ingl_proposals";
/// Governance proposals, followed by the numeration as u32 big endian.
pub const INGL_PROPOSAL_KEY: &[u8] = b"ingl_proposal";
/// Program upgrade proposals, followed by the numeration as u32 big endian.
pub const UPGRADE_PROPOSAL_KEY: &[u8] = b"upgrade_proposal";

// Metaplex token metadata seeds
pub const METADATA_SEED: &[u8] = b"metadata";
pub const EDITION_SEED: &[u8] = b"edition";

/// Solana runtime limits on seeds passed to `create_program_address`.
pub const MAX_SEED_LEN: usize = 32;
pub const MAX_SEEDS: usize = 16;

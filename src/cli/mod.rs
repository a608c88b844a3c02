//! Command line surface of the `ingl` binary.

use clap::{ArgAction, Args, Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::{
    config::ConfigOverrides,
    constants::DEFAULT_PROGRAM_LOG_LEVEL,
    domain::{AddressRole, ProposalRef},
    models::{Class, SignerSource},
    utils::{parse_proposal, parse_pubkey, parse_signer_source, parse_vote},
};

mod context;
pub use context::*;

mod commands;
pub use commands::*;

#[derive(Parser, Debug)]
#[command(
    name = "ingl",
    version,
    about = "Command line client for the Ingl validator program"
)]
pub struct Cli {
    /// RPC URL or network name (devnet, testnet, mainnet)
    #[arg(long, short = 'u', global = true, visible_alias = "network")]
    pub url: Option<String>,

    /// Ingl program address
    #[arg(long, global = true)]
    pub program_id: Option<String>,

    /// Fee payer: keypair file, `Ledger://<account>` or address
    #[arg(long, short = 'k', global = true)]
    pub keypair: Option<String>,

    /// Client log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log level passed to the Ingl program with each instruction
    #[arg(long, global = true, default_value_t = DEFAULT_PROGRAM_LOG_LEVEL)]
    pub program_log_level: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            program_id: self.program_id.clone(),
            network: self.url.clone(),
            keypair_path: self.keypair.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read or update the stored CLI config
    #[command(subcommand)]
    Config(ConfigSubcommand),

    /// Print a derived program account address
    Address {
        /// Account role; all roles are printed when omitted
        #[arg(value_parser = AddressRole::from_str)]
        role: Option<AddressRole>,
    },

    /// Ledger device helpers
    #[command(subcommand)]
    Ledger(LedgerSubcommand),

    /// Initialize the Ingl program state
    Init,

    /// Mint a new Ingl NFT of the given class
    Mint {
        #[arg(value_parser = Class::from_str)]
        class: Class,
    },

    /// Allocate the NFT's stake to the pending delegation pool
    Allocate {
        /// NFT mint: address, keypair file or `Ledger://<account>`
        #[arg(value_parser = parse_signer_source)]
        mint: SignerSource,
    },

    /// Return the NFT's allocated stake
    Deallocate {
        /// NFT mint: address, keypair file or `Ledger://<account>`
        #[arg(value_parser = parse_signer_source)]
        mint: SignerSource,
    },

    /// Delegate the NFT to the current vote account
    Delegate {
        /// NFT mint: address, keypair file or `Ledger://<account>`
        #[arg(value_parser = parse_signer_source)]
        mint: SignerSource,
    },

    /// Undelegate the NFT from the vote account
    Undelegate {
        /// NFT mint: address, keypair file or `Ledger://<account>`
        #[arg(value_parser = parse_signer_source)]
        mint: SignerSource,
    },

    /// Register a validator identity as a candidate
    RegisterValidator {
        /// Validator identity signer: keypair file or `Ledger://<account>`
        #[arg(value_parser = parse_signer_source)]
        validator: SignerSource,
    },

    /// Open the next validator selection proposal
    CreateValidatorProposal,

    /// Vote for a validator candidate with one or more NFTs
    VoteValidator {
        /// Index of the candidate in the proposal
        validator_index: u32,
        #[arg(required = true, num_args = 1.., value_parser = parse_signer_source)]
        mints: Vec<SignerSource>,
        #[command(flatten)]
        proposal: ProposalArg,
    },

    /// Finalize a validator selection proposal
    FinalizeProposal {
        #[command(flatten)]
        proposal: ProposalArg,
    },

    /// Close a validator selection proposal
    CloseProposal {
        #[command(flatten)]
        proposal: ProposalArg,
    },

    /// Create the vote account for the selected validator
    CreateVoteAccount {
        /// Validator identity signer, defaults to the fee payer
        #[arg(long, value_parser = parse_signer_source)]
        validator_keypair: Option<SignerSource>,
        #[command(flatten)]
        proposal: ProposalArg,
    },

    /// Start rebalancing the vote account's stake
    InitRebalance(RebalanceArg),

    /// Finish rebalancing the vote account's stake
    FinalizeRebalance(RebalanceArg),

    /// Distribute the vote account's rewards
    ProcessRewards(ValidatorArg),

    /// Withdraw accumulated rewards for the given NFTs
    NftWithdraw {
        #[arg(required = true, num_args = 1.., value_parser = parse_signer_source)]
        mints: Vec<SignerSource>,
        #[command(flatten)]
        validator: ValidatorArg,
    },

    /// Write test fixtures for the given NFTs (test deployments only)
    InjectTestingData {
        #[arg(required = true, num_args = 1.., value_parser = parse_signer_source)]
        mints: Vec<SignerSource>,
    },

    /// Propose upgrading the program to a deployed buffer
    CreateUpgradeProposal {
        #[arg(value_parser = parse_pubkey)]
        buffer: Pubkey,
        /// Link to the source code of the buffer
        code_link: String,
    },

    /// Vote on a program upgrade proposal as a validator
    VoteUpgradeProposal {
        /// approve|a|yes|y or disapprove|d|no|n
        #[arg(action = ArgAction::Set, value_parser = parse_vote)]
        vote: bool,
        /// Upgrade proposal numeration or address
        #[arg(value_parser = parse_proposal)]
        proposal: ProposalRef,
        /// Validator selection proposal that created the voting validator's
        /// vote account, defaults to the latest
        #[arg(long, value_parser = parse_proposal)]
        validator_proposal: Option<ProposalRef>,
    },

    /// Finalize a program upgrade proposal, signed by the Ingl team key
    FinalizeUpgradeProposal {
        #[arg(value_parser = parse_proposal)]
        proposal: ProposalRef,
        /// Team signer: keypair file or `Ledger://<account>`
        #[arg(long, value_parser = parse_signer_source)]
        team_keypair: SignerSource,
    },

    /// Open a governance proposal
    #[command(subcommand)]
    CreateGovernance(GovernanceChange),

    /// Vote on a governance proposal with one or more NFTs
    VoteGovernance {
        #[arg(value_parser = parse_proposal)]
        proposal: ProposalRef,
        #[arg(action = ArgAction::Set, value_parser = parse_vote)]
        vote: bool,
        #[arg(required = true, num_args = 1.., value_parser = parse_signer_source)]
        mints: Vec<SignerSource>,
    },

    /// Finalize a governance proposal
    FinalizeGovernance {
        #[arg(value_parser = parse_proposal)]
        proposal: ProposalRef,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print one key, or every key when omitted
    Get { key: Option<String> },
    /// Store a value
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug)]
pub enum LedgerSubcommand {
    /// List the addresses of a connected Ledger
    List {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum GovernanceChange {
    /// Change a validator config field
    Config { field: String, value: String },
    /// Upgrade the program to a deployed buffer
    ProgramUpgrade {
        #[arg(value_parser = parse_pubkey)]
        buffer: Pubkey,
        code_link: String,
    },
    /// Switch the vote account's validator identity
    ValidatorId {
        #[arg(value_parser = parse_pubkey)]
        validator: Pubkey,
    },
    /// Change the vote account's commission
    Commission { commission: u8 },
}

/// Validator selection proposal, defaults to the latest one.
#[derive(Args, Debug, Clone)]
pub struct ProposalArg {
    /// Proposal numeration or address
    #[arg(long, value_parser = parse_proposal)]
    pub proposal: Option<ProposalRef>,
}

/// Validator identity, defaults to the one stored in the validator config.
#[derive(Args, Debug, Clone)]
pub struct ValidatorArg {
    #[arg(long, value_parser = parse_pubkey)]
    pub validator: Option<Pubkey>,
}

/// Validator that must sign, given as a signer or looked up like [`ValidatorArg`].
#[derive(Args, Debug, Clone)]
pub struct RebalanceArg {
    /// Validator identity signer: keypair file or `Ledger://<account>`.
    /// The fee payer signs as the validator when omitted.
    #[arg(long, value_parser = parse_signer_source, conflicts_with = "validator")]
    pub validator_keypair: Option<SignerSource>,
    #[command(flatten)]
    pub validator: ValidatorArg,
}

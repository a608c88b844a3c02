use solana_sdk::pubkey::Pubkey;
use std::{fmt, path::PathBuf};

use crate::constants::LEDGER_URI_PREFIX;

/// Where a signer's key lives, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerSource {
    /// `Ledger://<account>`: key held by a Ledger device at that account index.
    Ledger { account: u32 },
    /// Bare address, usable only where no signature is required.
    Pubkey(Pubkey),
    /// Keypair JSON file.
    Filepath(PathBuf),
}

impl fmt::Display for SignerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerSource::Ledger { account } => write!(f, "{LEDGER_URI_PREFIX}{account}"),
            SignerSource::Pubkey(pubkey) => write!(f, "{pubkey}"),
            SignerSource::Filepath(path) => write!(f, "{}", path.display()),
        }
    }
}

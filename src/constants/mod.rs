//! Constants shared across the crate.

mod ledger;
pub use ledger::*;

mod logging;
pub use logging::*;

mod network;
pub use network::*;

mod programs;
pub use programs::*;

mod seeds;
pub use seeds::*;

mod solana_transaction;
pub use solana_transaction::*;

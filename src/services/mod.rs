//! External collaborators: the RPC node and signing devices.

mod ledger;
pub use ledger::*;

mod provider;
pub use provider::*;

mod signer;
pub use signer::*;

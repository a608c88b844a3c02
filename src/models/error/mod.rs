mod derivation;
pub use derivation::*;

mod instruction;
pub use instruction::*;

mod ledger;
pub use ledger::*;

mod signer;
pub use signer::*;

mod state;
pub use state::*;

mod transaction;
pub use transaction::*;

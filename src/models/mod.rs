mod error;
pub use error::*;

mod instruction;
pub use instruction::*;

mod signer;
pub use signer::*;

mod state;
pub use state::*;

mod status;
pub use status::*;

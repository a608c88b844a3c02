mod accounts;
pub use accounts::*;

mod operations;
pub use operations::*;

mod pda;
pub use pda::*;

mod transaction;
pub use transaction::*;

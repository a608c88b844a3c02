use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger device not found")]
    DeviceNotFound,

    #[error("Ledger transport error: {0}")]
    Transport(String),

    #[error("Ledger protocol error: {0}")]
    Protocol(String),

    #[error("Operation rejected on the Ledger device")]
    UserRejected,

    #[error("Ledger returned status {status:#06x}: {message}")]
    Status { status: u16, message: &'static str },

    #[error("Message of {len} bytes exceeds the {max}-byte signing limit")]
    MessageTooLong { len: usize, max: usize },

    #[error("APDU payload of {len} bytes exceeds the {max}-byte frame limit")]
    PayloadTooLong { len: usize, max: usize },

    #[error("Sign header of {header_len} bytes leaves no room in a {max_chunk_size}-byte chunk")]
    HeaderTooLong {
        header_len: usize,
        max_chunk_size: usize,
    },

    #[error("Unexpected response length: expected {expected} bytes, got {actual}")]
    UnexpectedResponseLength { expected: usize, actual: usize },
}

impl LedgerError {
    /// Maps a non-success status word reported by the Solana app.
    pub fn from_status_word(status: u16) -> Self {
        #[allow(clippy::match_overlapping_arm)]
        match status {
            0x6985 => LedgerError::UserRejected,
            0x6700 => LedgerError::Status {
                status,
                message: "Solana app not open on Ledger device",
            },
            0x6802 => LedgerError::Status {
                status,
                message: "Invalid parameter",
            },
            0x6803 => LedgerError::Status {
                status,
                message: "Message longer than the app accepts",
            },
            0x6982 => LedgerError::Status {
                status,
                message: "Security status not satisfied",
            },
            0x6a80 => LedgerError::Status {
                status,
                message: "Invalid data",
            },
            0x6b00 => LedgerError::Status {
                status,
                message: "Incorrect parameters",
            },
            0x6d00 => LedgerError::Status {
                status,
                message: "Instruction not supported, is the Solana app running?",
            },
            0x6faa => LedgerError::Status {
                status,
                message: "Device needs to be unplugged",
            },
            0x6f00..=0x6fff => LedgerError::Status {
                status,
                message: "Internal device error",
            },
            _ => LedgerError::Status {
                status,
                message: "Unknown error",
            },
        }
    }
}

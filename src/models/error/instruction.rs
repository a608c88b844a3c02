use thiserror::Error;

/// Errors raised while encoding an instruction, before anything reaches the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstructionError {
    #[error("{variant}: {count} items exceed the {max} allowed by its count field")]
    TooManyItems {
        variant: &'static str,
        count: usize,
        max: usize,
    },

    #[error("{variant}: at least one item is required")]
    NoItems { variant: &'static str },

    #[error("Failed to encode {variant}: {reason}")]
    Encoding {
        variant: &'static str,
        reason: String,
    },
}

//! Public Solana cluster endpoints and config store defaults.

pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const TESTNET_RPC_URL: &str = "https://api.testnet.solana.com";
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

pub const DEFAULT_NETWORK: &str = "devnet";

pub const EXPLORER_TX_URL: &str = "https://explorer.solana.com/tx";

/// Config directory relative to the user's home.
pub const CONFIG_DIR: &str = ".config/solana/ingl";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_KEYPAIR_FILE_NAME: &str = "id.json";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "INGL_CONFIG_PATH";

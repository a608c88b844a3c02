//! Ledger Solana app protocol constants (legacy APDU command set).

pub const LEDGER_CLA: u8 = 0xe0;

pub const INS_GET_PUBKEY: u8 = 0x05;
pub const INS_SIGN_MESSAGE: u8 = 0x06;

pub const P1_NON_CONFIRM: u8 = 0x00;
pub const P1_CONFIRM: u8 = 0x01;

pub const P2_EXTEND: u8 = 0x01;
pub const P2_MORE: u8 = 0x02;

/// Largest APDU payload the device accepts in one exchange.
pub const MAX_CHUNK_SIZE: usize = 255;

/// Length of the APDU command header: CLA, INS, P1, P2, Lc.
pub const APDU_HEADER_LEN: usize = 5;

/// Largest message the Solana app will sign.
pub const MAX_MESSAGE_LEN: usize = u16::MAX as usize;

pub const HARDENED_BIT: u32 = 1 << 31;
pub const BIP44_PURPOSE: u32 = 44;
pub const SOLANA_COIN_TYPE: u32 = 501;

pub const SIGNATURE_LEN: usize = 64;
pub const PUBKEY_LEN: usize = 32;

/// Status word reported by the device on success.
pub const SW_OK: u16 = 0x9000;
pub const SW_USER_REJECTED: u16 = 0x6985;

/// Prefix accepted on the command line for device-backed signers.
pub const LEDGER_URI_PREFIX: &str = "Ledger://";

// HID transport framing
pub const LEDGER_VID: u16 = 0x2c97;
pub const HID_PACKET_SIZE: usize = 64;
pub const HID_CHANNEL: u16 = 0x0101;
pub const HID_TAG_APDU: u8 = 0x05;
pub const HID_READ_TIMEOUT_MS: i32 = 60_000;

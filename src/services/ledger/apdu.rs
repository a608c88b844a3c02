//! APDU construction for the Ledger Solana app.
//!
//! Command frame: CLA, INS, P1, P2, Lc followed by at most 255 payload bytes.
//! Responses end with a 2-byte big endian status word.

use crate::{
    constants::{
        BIP44_PURPOSE, HARDENED_BIT, LEDGER_CLA, MAX_CHUNK_SIZE, MAX_MESSAGE_LEN, P1_CONFIRM,
        P2_EXTEND, P2_MORE, SOLANA_COIN_TYPE, SW_OK,
    },
    models::LedgerError,
};

/// BIP-44 path `44'/501'/account'[/change']`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationPath {
    pub account: u32,
    pub change: Option<u32>,
}

impl DerivationPath {
    pub fn new(account: u32) -> Self {
        Self {
            account,
            change: None,
        }
    }

    pub fn with_change(account: u32, change: u32) -> Self {
        Self {
            account,
            change: Some(change),
        }
    }

    /// Component count byte followed by each hardened index as big endian u32.
    pub fn serialize(&self) -> Vec<u8> {
        let mut components = vec![BIP44_PURPOSE, SOLANA_COIN_TYPE, self.account];
        if let Some(change) = self.change {
            components.push(change);
        }

        let mut out = Vec::with_capacity(1 + components.len() * 4);
        out.push(components.len() as u8);
        for component in components {
            out.extend_from_slice(&(component | HARDENED_BIT).to_be_bytes());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCommand {
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub payload: Vec<u8>,
}

impl LedgerCommand {
    pub fn new(ins: u8, p1: u8, p2: u8, payload: Vec<u8>) -> Self {
        Self {
            ins,
            p1,
            p2,
            payload,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, LedgerError> {
        if self.payload.len() > MAX_CHUNK_SIZE {
            return Err(LedgerError::PayloadTooLong {
                len: self.payload.len(),
                max: MAX_CHUNK_SIZE,
            });
        }
        let mut apdu = Vec::with_capacity(5 + self.payload.len());
        apdu.extend_from_slice(&[
            LEDGER_CLA,
            self.ins,
            self.p1,
            self.p2,
            self.payload.len() as u8,
        ]);
        apdu.extend_from_slice(&self.payload);
        Ok(apdu)
    }
}

/// One signing frame before the command byte and APDU header are added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignChunk {
    pub p1: u8,
    pub p2: u8,
    pub payload: Vec<u8>,
}

/// Splits `message` into frames that each carry `header` followed by a slice
/// of the message, sized so no frame exceeds `max_chunk_size`.
pub fn chunk_message(
    header: &[u8],
    message: &[u8],
    max_chunk_size: usize,
) -> Result<Vec<SignChunk>, LedgerError> {
    if message.len() > MAX_MESSAGE_LEN {
        return Err(LedgerError::MessageTooLong {
            len: message.len(),
            max: MAX_MESSAGE_LEN,
        });
    }
    if header.len() >= max_chunk_size {
        return Err(LedgerError::HeaderTooLong {
            header_len: header.len(),
            max_chunk_size,
        });
    }

    let body_size = max_chunk_size - header.len();
    let pieces: Vec<&[u8]> = if message.is_empty() {
        vec![message]
    } else {
        message.chunks(body_size).collect()
    };

    let last = pieces.len() - 1;
    let chunks = pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            let p2 = if last == 0 {
                0
            } else if i < last {
                P2_MORE | P2_EXTEND
            } else {
                P2_EXTEND
            };
            let mut payload = Vec::with_capacity(header.len() + piece.len());
            payload.extend_from_slice(header);
            payload.extend_from_slice(piece);
            SignChunk {
                p1: P1_CONFIRM,
                p2,
                payload,
            }
        })
        .collect();
    Ok(chunks)
}

/// Strips and checks the trailing status word, returning the response data.
pub fn parse_response(response: &[u8]) -> Result<&[u8], LedgerError> {
    if response.len() < 2 {
        return Err(LedgerError::Protocol("No status word".to_string()));
    }
    let (data, status) = response.split_at(response.len() - 2);
    let status = u16::from_be_bytes([status[0], status[1]]);
    log::trace!("Read status {:#06x}", status);
    if status == SW_OK {
        Ok(data)
    } else {
        Err(LedgerError::from_status_word(status))
    }
}

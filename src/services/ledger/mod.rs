//! Ledger hardware wallet access.
//!
//! `LedgerService` owns the single device connection; every exchange holds the
//! transport lock so multi-frame signing sequences are never interleaved.

use log::{debug, info, trace};
use parking_lot::Mutex;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::{
    constants::{
        INS_GET_PUBKEY, INS_SIGN_MESSAGE, MAX_CHUNK_SIZE, P1_NON_CONFIRM, PUBKEY_LEN,
        SIGNATURE_LEN,
    },
    models::LedgerError,
};

mod apdu;
pub use apdu::*;

mod transport;
pub use transport::*;

pub struct LedgerService {
    transport: Mutex<Box<dyn LedgerTransport>>,
    max_chunk_size: usize,
}

impl std::fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerService")
            .field("max_chunk_size", &self.max_chunk_size)
            .finish()
    }
}

impl LedgerService {
    pub fn new(transport: Box<dyn LedgerTransport>) -> Self {
        Self::with_max_chunk_size(transport, MAX_CHUNK_SIZE)
    }

    pub fn with_max_chunk_size(transport: Box<dyn LedgerTransport>, max_chunk_size: usize) -> Self {
        Self {
            transport: Mutex::new(transport),
            max_chunk_size: max_chunk_size.min(MAX_CHUNK_SIZE),
        }
    }

    /// Connects to the first attached Ledger device.
    #[cfg(feature = "hidapi")]
    pub fn connect() -> Result<Self, LedgerError> {
        Ok(Self::new(Box::new(HidTransport::open()?)))
    }

    #[cfg(not(feature = "hidapi"))]
    pub fn connect() -> Result<Self, LedgerError> {
        Err(LedgerError::Transport(
            "built without the `hidapi` feature".to_string(),
        ))
    }

    fn send(transport: &dyn LedgerTransport, command: LedgerCommand) -> Result<Vec<u8>, LedgerError> {
        let apdu = command.serialize()?;
        trace!("Ledger APDU {}", hex::encode(&apdu));
        let response = transport.exchange(&apdu)?;
        trace!("Ledger response {}", hex::encode(&response));
        parse_response(&response).map(<[u8]>::to_vec)
    }

    /// Reads the address at `44'/501'/account'`.
    pub fn get_address(&self, path: &DerivationPath) -> Result<Pubkey, LedgerError> {
        let transport = self.transport.lock();
        let data = Self::send(
            transport.as_ref(),
            LedgerCommand::new(INS_GET_PUBKEY, P1_NON_CONFIRM, 0, path.serialize()),
        )?;
        let bytes: [u8; PUBKEY_LEN] =
            data.as_slice()
                .try_into()
                .map_err(|_| LedgerError::UnexpectedResponseLength {
                    expected: PUBKEY_LEN,
                    actual: data.len(),
                })?;
        Ok(Pubkey::new_from_array(bytes))
    }

    /// Signs `message` after on-device confirmation.
    pub fn sign_message(
        &self,
        path: &DerivationPath,
        message: &[u8],
    ) -> Result<Signature, LedgerError> {
        let mut header = vec![1u8];
        header.extend_from_slice(&path.serialize());
        let chunks = chunk_message(&header, message, self.max_chunk_size)?;
        debug!(
            "Signing {} byte message in {} chunk(s) with account {}",
            message.len(),
            chunks.len(),
            path.account
        );

        info!("Waiting for Ledger approval...");
        let transport = self.transport.lock();
        let mut response = Vec::new();
        for chunk in chunks {
            response = Self::send(
                transport.as_ref(),
                LedgerCommand::new(INS_SIGN_MESSAGE, chunk.p1, chunk.p2, chunk.payload),
            )?;
        }

        let bytes: [u8; SIGNATURE_LEN] =
            response
                .as_slice()
                .try_into()
                .map_err(|_| LedgerError::UnexpectedResponseLength {
                    expected: SIGNATURE_LEN,
                    actual: response.len(),
                })?;
        Ok(Signature::from(bytes))
    }

    /// Addresses for accounts `page * limit .. (page + 1) * limit`.
    pub fn list_addresses(&self, limit: u32, page: u32) -> Result<Vec<(u32, Pubkey)>, LedgerError> {
        let start = page.saturating_mul(limit);
        let end = start.saturating_add(limit);
        (start..end)
            .map(|account| Ok((account, self.get_address(&DerivationPath::new(account))?)))
            .collect()
    }
}

//! Byte transport to a Ledger device.
//!
//! HID framing (64-byte reports):
//!   * channel id (2 bytes big endian)
//!   * command tag (1 byte)
//!   * packet sequence (2 bytes big endian)
//!   * payload; the first packet starts with the total APDU length (2 bytes)

#[cfg(test)]
use mockall::automock;

use crate::{
    constants::{HID_CHANNEL, HID_PACKET_SIZE, HID_TAG_APDU},
    models::LedgerError,
};

const HID_HEADER_LEN: usize = 5;

/// Windows hidapi expects every written report to start with a zero report id.
#[cfg(windows)]
pub const HID_PREFIX_ZERO: usize = 1;
#[cfg(not(windows))]
pub const HID_PREFIX_ZERO: usize = 0;

/// Sends one APDU and returns the raw response including its status word.
#[cfg_attr(test, automock)]
pub trait LedgerTransport: Send {
    fn exchange(&self, apdu: &[u8]) -> Result<Vec<u8>, LedgerError>;
}

fn packet_header(sequence: u16) -> [u8; HID_HEADER_LEN] {
    let channel = HID_CHANNEL.to_be_bytes();
    let sequence = sequence.to_be_bytes();
    [channel[0], channel[1], HID_TAG_APDU, sequence[0], sequence[1]]
}

/// Splits an APDU into zero-padded HID reports.
pub fn wrap_apdu(apdu: &[u8]) -> Result<Vec<[u8; HID_PACKET_SIZE]>, LedgerError> {
    let apdu_len = u16::try_from(apdu.len())
        .map_err(|_| LedgerError::Protocol("APDU longer than 65535 bytes".to_string()))?;

    let mut framed = Vec::with_capacity(apdu.len() + 2);
    framed.extend_from_slice(&apdu_len.to_be_bytes());
    framed.extend_from_slice(apdu);

    let body_size = HID_PACKET_SIZE - HID_HEADER_LEN;
    framed
        .chunks(body_size)
        .enumerate()
        .map(|(sequence, body)| {
            let sequence = u16::try_from(sequence)
                .map_err(|_| LedgerError::Protocol("Maximum sequence number reached".to_string()))?;
            let mut packet = [0u8; HID_PACKET_SIZE];
            packet[..HID_HEADER_LEN].copy_from_slice(&packet_header(sequence));
            packet[HID_HEADER_LEN..HID_HEADER_LEN + body.len()].copy_from_slice(body);
            Ok(packet)
        })
        .collect()
}

/// Bytes handed to the HID write call for one packet, after `prefix` zero bytes.
pub fn hid_report(packet: &[u8; HID_PACKET_SIZE], prefix: usize) -> Vec<u8> {
    let mut report = vec![0u8; prefix + HID_PACKET_SIZE];
    report[prefix..].copy_from_slice(packet);
    report
}

/// Reassembles a response from HID reports, validating headers and sequence numbers.
///
/// `read_packet` fills the buffer and returns the number of bytes read.
pub fn unwrap_response<F>(mut read_packet: F) -> Result<Vec<u8>, LedgerError>
where
    F: FnMut(&mut [u8; HID_PACKET_SIZE]) -> Result<usize, LedgerError>,
{
    let mut message_size = 0;
    let mut message = Vec::new();

    for expected in 0..=u16::MAX {
        let mut packet = [0u8; HID_PACKET_SIZE];
        let read = read_packet(&mut packet)?;
        if read < HID_HEADER_LEN || packet[..3] != packet_header(0)[..3] {
            return Err(LedgerError::Protocol("Unexpected chunk header".to_string()));
        }
        let sequence = u16::from_be_bytes([packet[3], packet[4]]);
        if sequence != expected {
            return Err(LedgerError::Protocol(format!(
                "Unexpected sequence number {sequence}, expected {expected}"
            )));
        }

        let mut offset = HID_HEADER_LEN;
        if sequence == 0 {
            if read < HID_HEADER_LEN + 2 {
                return Err(LedgerError::Protocol("Unexpected chunk header".to_string()));
            }
            message_size = u16::from_be_bytes([packet[5], packet[6]]) as usize;
            offset += 2;
        }
        message.extend_from_slice(&packet[offset..read]);
        message.truncate(message_size);
        if message.len() == message_size {
            return Ok(message);
        }
    }
    Err(LedgerError::Protocol(
        "Maximum sequence number reached".to_string(),
    ))
}

#[cfg(feature = "hidapi")]
mod hid {
    use super::*;
    use crate::constants::{HID_READ_TIMEOUT_MS, LEDGER_VID};
    use log::trace;

    /// USB HID connection to the first Ledger device found.
    pub struct HidTransport {
        device: hidapi::HidDevice,
    }

    impl HidTransport {
        pub fn open() -> Result<Self, LedgerError> {
            let api = hidapi::HidApi::new().map_err(|e| LedgerError::Transport(e.to_string()))?;
            let info = api
                .device_list()
                .find(|info| info.vendor_id() == LEDGER_VID)
                .ok_or(LedgerError::DeviceNotFound)?;
            let device = info
                .open_device(&api)
                .map_err(|e| LedgerError::Transport(e.to_string()))?;
            Ok(Self { device })
        }
    }

    impl LedgerTransport for HidTransport {
        fn exchange(&self, apdu: &[u8]) -> Result<Vec<u8>, LedgerError> {
            for packet in wrap_apdu(apdu)? {
                trace!("Ledger write {:?}", &packet[..]);
                let report = hid_report(&packet, HID_PREFIX_ZERO);
                let written = self
                    .device
                    .write(&report)
                    .map_err(|e| LedgerError::Transport(e.to_string()))?;
                if written < report.len() {
                    return Err(LedgerError::Protocol("Write data size mismatch".to_string()));
                }
            }
            unwrap_response(|buf| {
                let read = self
                    .device
                    .read_timeout(buf, HID_READ_TIMEOUT_MS)
                    .map_err(|e| LedgerError::Transport(e.to_string()))?;
                trace!("Ledger read {:?}", &buf[..read]);
                if read == 0 {
                    return Err(LedgerError::Transport("Timed out waiting for device".to_string()));
                }
                Ok(read)
            })
        }
    }
}

#[cfg(feature = "hidapi")]
pub use hid::HidTransport;

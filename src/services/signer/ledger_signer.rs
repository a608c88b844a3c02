//! Signer backed by an account on a Ledger device.
use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::sync::Arc;

use super::SolanaSignTrait;
use crate::{
    models::SignerError,
    services::{DerivationPath, LedgerService},
};

#[derive(Debug, Clone)]
pub struct LedgerSigner {
    service: Arc<LedgerService>,
    path: DerivationPath,
    pubkey: Pubkey,
}

impl LedgerSigner {
    /// Reads the account's address from the device.
    pub fn new(service: Arc<LedgerService>, account: u32) -> Result<Self, SignerError> {
        let path = DerivationPath::new(account);
        let pubkey = service.get_address(&path)?;
        Ok(Self {
            service,
            path,
            pubkey,
        })
    }
}

#[async_trait]
impl SolanaSignTrait for LedgerSigner {
    async fn pubkey(&self) -> Result<Pubkey, SignerError> {
        Ok(self.pubkey)
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        let service = Arc::clone(&self.service);
        let path = self.path;
        let message = message.to_vec();
        // device I/O blocks until the user confirms
        let signature = tokio::task::spawn_blocking(move || service.sign_message(&path, &message))
            .await
            .map_err(|e| SignerError::SigningError(format!("Ledger task failed: {e}")))??;
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::LedgerError, services::MockLedgerTransport};

    fn ok(mut data: Vec<u8>) -> Vec<u8> {
        data.extend_from_slice(&[0x90, 0x00]);
        data
    }

    #[tokio::test]
    async fn test_pubkey_read_once_at_creation() {
        let address = Pubkey::new_unique();
        let mut transport = MockLedgerTransport::new();
        transport
            .expect_exchange()
            .times(1)
            .returning(move |_| Ok(ok(address.to_bytes().to_vec())));
        let signer = LedgerSigner::new(Arc::new(LedgerService::new(Box::new(transport))), 0).unwrap();
        assert_eq!(signer.pubkey().await.unwrap(), address);
        assert_eq!(signer.pubkey().await.unwrap(), address);
    }

    #[tokio::test]
    async fn test_rejection_wrapped_as_signer_error() {
        let mut transport = MockLedgerTransport::new();
        let mut calls = 0;
        transport.expect_exchange().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(ok(vec![1; 32]))
            } else {
                Ok(vec![0x69, 0x85])
            }
        });
        let signer = LedgerSigner::new(Arc::new(LedgerService::new(Box::new(transport))), 3).unwrap();
        let err = signer.sign(&[1, 2, 3]).await.unwrap_err();
        assert_eq!(err, SignerError::Ledger(LedgerError::UserRejected));
    }
}

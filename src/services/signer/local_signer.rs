//! Keypair file signer.
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signature},
    signer::Signer,
};
use std::path::Path;

use super::SolanaSignTrait;
use crate::models::SignerError;

pub struct LocalSigner {
    keypair: Keypair,
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish()
    }
}

impl LocalSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Loads a JSON keypair file as written by `solana-keygen`.
    pub fn from_file(path: &Path) -> Result<Self, SignerError> {
        let keypair = read_keypair_file(path).map_err(|e| {
            SignerError::KeyError(format!("Failed to read keypair {}: {e}", path.display()))
        })?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl SolanaSignTrait for LocalSigner {
    async fn pubkey(&self) -> Result<Pubkey, SignerError> {
        Ok(self.keypair.pubkey())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        Ok(self.keypair.sign_message(message))
    }
}

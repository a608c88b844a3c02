//! Transaction signers.
//!
//! # Architecture
//!
//! ```text
//! SolanaSigner
//!   ├── Local (keypair file)
//!   ├── Ledger (hardware wallet account)
//!   └── AddressOnly (public key without signing capability)
//! ```
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};
use std::sync::Arc;

mod local_signer;
pub use local_signer::*;

mod ledger_signer;
pub use ledger_signer::*;

use crate::{
    models::{SignerError, SignerSource},
    services::LedgerService,
};

#[async_trait]
#[cfg_attr(test, automock)]
/// Solana signing operations.
pub trait SolanaSignTrait: Sync + Send {
    /// Returns the public key of the signer
    async fn pubkey(&self) -> Result<Pubkey, SignerError>;

    /// Signs raw message bytes
    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

#[derive(Debug)]
pub enum SolanaSigner {
    Local(LocalSigner),
    Ledger(LedgerSigner),
    AddressOnly(Pubkey),
}

#[async_trait]
impl SolanaSignTrait for SolanaSigner {
    async fn pubkey(&self) -> Result<Pubkey, SignerError> {
        match self {
            Self::Local(signer) => signer.pubkey().await,
            Self::Ledger(signer) => signer.pubkey().await,
            Self::AddressOnly(pubkey) => Ok(*pubkey),
        }
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        match self {
            Self::Local(signer) => signer.sign(message).await,
            Self::Ledger(signer) => signer.sign(message).await,
            Self::AddressOnly(pubkey) => Err(SignerError::AddressOnly(*pubkey)),
        }
    }
}

impl SolanaSigner {
    pub fn can_sign(&self) -> bool {
        !matches!(self, Self::AddressOnly(_))
    }
}

/// Signs a Solana SDK transaction by finding the signer's position and adding the signature
///
/// The signer must be one of the first `num_required_signatures` account keys.
/// Existing signatures in other slots are kept.
pub async fn sign_sdk_transaction<T: SolanaSignTrait + ?Sized>(
    signer: &T,
    mut transaction: Transaction,
) -> Result<(Transaction, Signature), SignerError> {
    let signer_pubkey = signer.pubkey().await?;

    let signer_index = transaction
        .message
        .account_keys
        .iter()
        .position(|key| *key == signer_pubkey)
        .ok_or_else(|| {
            SignerError::SigningError(
                "Signer public key not found in transaction signers".to_string(),
            )
        })?;

    let num_required = transaction.message.header.num_required_signatures as usize;
    if signer_index >= num_required {
        return Err(SignerError::SigningError(format!(
            "Signer is not marked as a required signer in the transaction (position {} >= {})",
            signer_index, num_required
        )));
    }

    let signature = signer.sign(&transaction.message_data()).await?;

    transaction
        .signatures
        .resize(num_required, Signature::default());
    transaction.signatures[signer_index] = signature;

    Ok((transaction, signature))
}

pub struct SolanaSignerFactory;

impl SolanaSignerFactory {
    /// Builds a signer for `source`. Ledger sources need a connected service.
    pub fn create_solana_signer(
        source: &SignerSource,
        ledger: Option<&Arc<LedgerService>>,
    ) -> Result<SolanaSigner, SignerError> {
        let signer = match source {
            SignerSource::Filepath(path) => SolanaSigner::Local(LocalSigner::from_file(path)?),
            SignerSource::Pubkey(pubkey) => SolanaSigner::AddressOnly(*pubkey),
            SignerSource::Ledger { account } => {
                let service = ledger.ok_or_else(|| {
                    SignerError::KeyError(format!("No Ledger connection for {source}"))
                })?;
                SolanaSigner::Ledger(LedgerSigner::new(Arc::clone(service), *account)?)
            }
        };
        Ok(signer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        instruction::{AccountMeta, Instruction},
        message::Message,
        signature::{write_keypair_file, Keypair},
        signer::Signer,
    };
    use tempfile::tempdir;

    fn two_signer_transaction(payer: &Pubkey, other: &Pubkey) -> Transaction {
        let instruction = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1, 2, 3],
            vec![AccountMeta::new(*payer, true), AccountMeta::new(*other, true)],
        );
        let mut tx = Transaction::new_unsigned(Message::new(&[instruction], Some(payer)));
        tx.message.recent_blockhash = Hash::new_unique();
        tx
    }

    #[tokio::test]
    async fn test_sign_sdk_transaction_places_signature() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let tx = two_signer_transaction(&payer.pubkey(), &other.pubkey());

        let signer = SolanaSigner::Local(LocalSigner::new(other.insecure_clone()));
        let (signed, signature) = sign_sdk_transaction(&signer, tx).await.unwrap();

        assert_eq!(signed.signatures.len(), 2);
        assert_eq!(signed.signatures[0], Signature::default());
        assert_eq!(signed.signatures[1], signature);
        assert!(signature.verify(other.pubkey().as_ref(), &signed.message_data()));
    }

    #[tokio::test]
    async fn test_sign_sdk_transaction_rejects_unknown_signer() {
        let tx = two_signer_transaction(&Pubkey::new_unique(), &Pubkey::new_unique());
        let signer = SolanaSigner::Local(LocalSigner::new(Keypair::new()));
        let err = sign_sdk_transaction(&signer, tx).await.unwrap_err();
        assert!(matches!(err, SignerError::SigningError(_)));
    }

    #[tokio::test]
    async fn test_sign_sdk_transaction_with_mock() {
        let payer = Pubkey::new_unique();
        let tx = two_signer_transaction(&payer, &Pubkey::new_unique());
        let expected = Signature::from([9u8; 64]);

        let mut mock = MockSolanaSignTrait::new();
        mock.expect_pubkey()
            .returning(move || Box::pin(async move { Ok(payer) }));
        mock.expect_sign()
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(expected) }));

        let (signed, signature) = sign_sdk_transaction(&mock, tx).await.unwrap();
        assert_eq!(signature, expected);
        assert_eq!(signed.signatures[0], expected);
    }

    #[tokio::test]
    async fn test_address_only_cannot_sign() {
        let pubkey = Pubkey::new_unique();
        let signer = SolanaSigner::AddressOnly(pubkey);
        assert!(!signer.can_sign());
        assert_eq!(signer.pubkey().await.unwrap(), pubkey);
        assert_eq!(
            signer.sign(b"message").await.unwrap_err(),
            SignerError::AddressOnly(pubkey)
        );
    }

    #[tokio::test]
    async fn test_factory_builds_each_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("id.json");
        let keypair = Keypair::new();
        write_keypair_file(&keypair, &path).unwrap();

        let local =
            SolanaSignerFactory::create_solana_signer(&SignerSource::Filepath(path), None).unwrap();
        assert!(local.can_sign());
        assert_eq!(local.pubkey().await.unwrap(), keypair.pubkey());

        let pubkey = Pubkey::new_unique();
        let address_only =
            SolanaSignerFactory::create_solana_signer(&SignerSource::Pubkey(pubkey), None)
                .unwrap();
        assert!(!address_only.can_sign());

        let err = SolanaSignerFactory::create_solana_signer(
            &SignerSource::Ledger { account: 0 },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SignerError::KeyError(_)));
    }
}

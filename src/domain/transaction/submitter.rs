//! Signing, submission and finality tracking.
//!
//! Signed bytes are sent exactly once. When the anchor expires the caller has
//! to build and sign a new request; the submitter never re-signs or resends.

use log::{debug, info, warn};
use parking_lot::Mutex;
use solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use std::time::Duration;
use tokio::time::Instant;

use super::{explorer_url, Anchor, SignedRequest, SubmissionOutcome, UnsignedRequest};
use crate::{
    constants::{get_blockhash_cache_ttl, get_confirmation_poll_interval, PACKET_DATA_SIZE},
    models::{SolanaTransactionStatus, TransactionError},
    services::{
        sign_sdk_transaction, SolanaProviderError, SolanaProviderTrait, SolanaSignTrait,
        SolanaSigner,
    },
};

#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    /// How long a fetched anchor may be reused.
    pub anchor_ttl: Duration,
    pub poll_interval: Duration,
    /// Appended to explorer links, e.g. `?cluster=devnet`.
    pub explorer_suffix: String,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            anchor_ttl: get_blockhash_cache_ttl(),
            poll_interval: get_confirmation_poll_interval(),
            explorer_suffix: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedAnchor {
    anchor: Anchor,
    fetched_at: Instant,
    used: bool,
}

pub struct TransactionSubmitter<P: SolanaProviderTrait> {
    provider: P,
    config: SubmitterConfig,
    anchor: Mutex<Option<CachedAnchor>>,
}

impl<P: SolanaProviderTrait> TransactionSubmitter<P> {
    pub fn new(provider: P, config: SubmitterConfig) -> Self {
        Self {
            provider,
            config,
            anchor: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the cached anchor if it is fresh and unused, otherwise fetches
    /// the latest finalized blockhash.
    pub async fn anchor(&self) -> Result<Anchor, TransactionError> {
        let cached = *self.anchor.lock();
        if let Some(cached) = cached {
            if !cached.used && cached.fetched_at.elapsed() < self.config.anchor_ttl {
                debug!("Reusing cached blockhash {}", cached.anchor.blockhash);
                return Ok(cached.anchor);
            }
        }

        let (blockhash, last_valid_block_height) = self
            .provider
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await?;
        let anchor = Anchor {
            blockhash,
            last_valid_block_height,
        };
        debug!(
            "Fetched blockhash {} valid until block height {}",
            blockhash, last_valid_block_height
        );

        *self.anchor.lock() = Some(CachedAnchor {
            anchor,
            fetched_at: Instant::now(),
            used: false,
        });
        Ok(anchor)
    }

    fn invalidate_anchor(&self) {
        *self.anchor.lock() = None;
    }

    fn mark_anchor_used(&self, anchor: &Anchor) {
        if let Some(cached) = self.anchor.lock().as_mut() {
            if cached.anchor == *anchor {
                cached.used = true;
            }
        }
    }

    /// Anchors `request` and collects one signature per required signer.
    ///
    /// Fails with `MissingSigners` naming every required address that has no
    /// signing-capable signer; nothing is signed in that case.
    pub async fn sign_request(
        &self,
        request: &UnsignedRequest,
        signers: &[SolanaSigner],
    ) -> Result<SignedRequest, TransactionError> {
        let anchor = self.anchor().await?;
        let mut transaction = Transaction::new_unsigned(request.compile(&anchor.blockhash));

        let num_required = transaction.message.header.num_required_signatures as usize;
        let required: Vec<Pubkey> = transaction.message.account_keys[..num_required].to_vec();

        let mut available = Vec::with_capacity(signers.len());
        for signer in signers.iter().filter(|signer| signer.can_sign()) {
            match signer.pubkey().await {
                Ok(pubkey) => available.push((pubkey, signer)),
                Err(e) => warn!("Skipping signer without a readable address: {}", e),
            }
        }

        let missing: Vec<Pubkey> = required
            .iter()
            .filter(|key| !available.iter().any(|(pubkey, _)| pubkey == *key))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(TransactionError::MissingSigners { missing });
        }

        for key in &required {
            let signer = available
                .iter()
                .find(|(pubkey, _)| pubkey == key)
                .map(|(_, signer)| *signer)
                .ok_or_else(|| TransactionError::MissingSigners { missing: vec![*key] })?;
            debug!("Requesting signature from {}", key);
            let (signed, _) = sign_sdk_transaction(signer, transaction)
                .await
                .map_err(|source| TransactionError::Signer {
                    signer: *key,
                    source,
                })?;
            transaction = signed;
        }

        let message = transaction.message_data();
        for (key, signature) in required.iter().zip(&transaction.signatures) {
            if !signature.verify(key.as_ref(), &message) {
                return Err(TransactionError::InvalidSignature { signer: *key });
            }
        }

        let size = bincode::serialized_size(&transaction)
            .map_err(|e| TransactionError::Serialization(e.to_string()))? as usize;
        if size > PACKET_DATA_SIZE {
            return Err(TransactionError::TooLarge {
                size,
                max: PACKET_DATA_SIZE,
            });
        }

        Ok(SignedRequest {
            transaction,
            anchor,
        })
    }

    async fn ensure_anchor_valid(
        &self,
        anchor: &Anchor,
        signature: Option<Signature>,
    ) -> Result<(), TransactionError> {
        let current_block_height = self.provider.get_block_height().await?;
        if current_block_height > anchor.last_valid_block_height {
            self.invalidate_anchor();
            return Err(TransactionError::AnchorExpired {
                last_valid_block_height: anchor.last_valid_block_height,
                current_block_height,
                signature,
            });
        }
        Ok(())
    }

    /// Sends the signed bytes once and polls until the cluster finalizes them.
    pub async fn submit(
        &self,
        signed: &SignedRequest,
    ) -> Result<SubmissionOutcome, TransactionError> {
        self.ensure_anchor_valid(&signed.anchor, None).await?;

        let sent = self.provider.send_transaction(&signed.transaction).await;
        self.mark_anchor_used(&signed.anchor);
        let signature = match sent {
            Ok(signature) => signature,
            Err(err) => {
                if matches!(err, SolanaProviderError::BlockhashNotFound(_)) {
                    self.invalidate_anchor();
                }
                return Err(err.into());
            }
        };
        info!("Sent transaction {}", signature);

        self.wait_for_finality(&signature, &signed.anchor).await
    }

    /// Polls the signature status until it is final. The anchor can only
    /// expire a transaction the cluster has not reported yet.
    async fn wait_for_finality(
        &self,
        signature: &Signature,
        anchor: &Anchor,
    ) -> Result<SubmissionOutcome, TransactionError> {
        let mut landed = false;
        loop {
            match self.provider.get_transaction_status(signature).await {
                Ok(Some(SolanaTransactionStatus::Finalized)) => {
                    info!("Transaction {} finalized", signature);
                    return Ok(SubmissionOutcome {
                        signature: *signature,
                        status: SolanaTransactionStatus::Finalized,
                        explorer_url: explorer_url(signature, &self.config.explorer_suffix),
                    });
                }
                Ok(Some(SolanaTransactionStatus::Failed(error))) => {
                    return Err(TransactionError::ExecutionFailed {
                        signature: *signature,
                        error: format!(
                            "{} (see {})",
                            error,
                            explorer_url(signature, &self.config.explorer_suffix)
                        ),
                    });
                }
                Ok(Some(status)) => {
                    debug!("Transaction {} is {}", signature, status);
                    landed = true;
                }
                Ok(None) => debug!("Transaction {} not yet visible", signature),
                Err(e) if e.is_transient() => {
                    warn!("Error checking status of {}: {}", signature, e)
                }
                Err(e) => return Err(e.into()),
            }

            if !landed {
                match self.ensure_anchor_valid(anchor, Some(*signature)).await {
                    Err(TransactionError::UnderlyingSolanaProvider(e)) => {
                        warn!("Error fetching block height: {}", e)
                    }
                    other => other?,
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Signs `request` against the current anchor and submits it.
    pub async fn sign_and_submit(
        &self,
        request: &UnsignedRequest,
        signers: &[SolanaSigner],
    ) -> Result<SubmissionOutcome, TransactionError> {
        let signed = self.sign_request(request, signers).await?;
        self.submit(&signed).await
    }
}

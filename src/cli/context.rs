//! Per-invocation state shared by the command handlers.

use color_eyre::eyre::{eyre, Result};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    config::ResolvedConfig,
    constants::DEFAULT_RPC_TIMEOUT_SECONDS,
    domain::{
        IngleOperation, InglAddresses, InglStateReader, SubmissionOutcome, SubmitterConfig,
        TransactionSubmitter, UnsignedRequest,
    },
    models::{SignerSource, TransactionError},
    services::{
        LedgerService, SolanaProvider, SolanaProviderTrait, SolanaSigner, SolanaSignerFactory,
    },
    utils::parse_signer_source,
};

pub struct CliContext<P: SolanaProviderTrait> {
    pub config: ResolvedConfig,
    pub addresses: InglAddresses,
    pub program_log_level: u8,
    submitter: TransactionSubmitter<P>,
    ledger: Mutex<Option<Arc<LedgerService>>>,
}

impl CliContext<SolanaProvider> {
    /// Connects to the configured RPC endpoint.
    pub fn connect(config: ResolvedConfig, program_log_level: u8) -> Result<Self> {
        let provider = SolanaProvider::new(&config.rpc_url, DEFAULT_RPC_TIMEOUT_SECONDS)?;
        info!("Using RPC endpoint {}", config.rpc_url);
        Ok(Self::new(config, provider, program_log_level))
    }
}

impl<P: SolanaProviderTrait> CliContext<P> {
    pub fn new(config: ResolvedConfig, provider: P, program_log_level: u8) -> Self {
        let submitter = TransactionSubmitter::new(
            provider,
            SubmitterConfig {
                explorer_suffix: config.explorer_suffix.clone(),
                ..Default::default()
            },
        );
        Self {
            addresses: InglAddresses::new(config.program_id),
            config,
            program_log_level,
            submitter,
            ledger: Mutex::new(None),
        }
    }

    /// Uses `ledger` for every `Ledger://` signer instead of opening a device.
    pub fn with_ledger(self, ledger: Arc<LedgerService>) -> Self {
        *self.ledger.lock() = Some(ledger);
        self
    }

    pub fn reader(&self) -> InglStateReader<'_, P> {
        InglStateReader::new(self.submitter.provider(), &self.addresses)
    }

    /// Ledger connection, opened on first use.
    pub fn ledger(&self) -> Result<Arc<LedgerService>> {
        let mut ledger = self.ledger.lock();
        if let Some(service) = ledger.as_ref() {
            return Ok(Arc::clone(service));
        }
        debug!("Opening Ledger device");
        let service = Arc::new(LedgerService::connect()?);
        *ledger = Some(Arc::clone(&service));
        Ok(service)
    }

    pub fn signer(&self, source: &SignerSource) -> Result<SolanaSigner> {
        let ledger = match source {
            SignerSource::Ledger { .. } => Some(self.ledger()?),
            _ => None,
        };
        Ok(SolanaSignerFactory::create_solana_signer(
            source,
            ledger.as_ref(),
        )?)
    }

    /// Signer for the configured keypair, which also pays fees.
    pub fn payer(&self) -> Result<SolanaSigner> {
        let source = parse_signer_source(&self.config.keypair_path)
            .map_err(|e| eyre!("Invalid fee payer: {e}"))?;
        self.signer(&source)
    }

    /// Builds, signs and submits `operation`, then prints where to find it.
    /// An expired blockhash gets one rebuild.
    pub async fn execute(
        &self,
        operation: IngleOperation,
        signers: &[SolanaSigner],
    ) -> Result<SubmissionOutcome, TransactionError> {
        let instructions = operation.instructions(&self.addresses, self.program_log_level)?;
        let request = UnsignedRequest::new(instructions, operation.fee_payer());
        debug!("Submitting {:?}", operation);

        // An expired anchor means the transaction can no longer land, so
        // signing it again against a fresh blockhash cannot execute it twice.
        let outcome = match self.submitter.sign_and_submit(&request, signers).await {
            Err(err) if err.is_anchor_expiry() => {
                warn!("{}; rebuilding against a fresh blockhash", err);
                self.submitter.sign_and_submit(&request, signers).await?
            }
            other => other?,
        };
        println!("Signature: {}", outcome.signature);
        println!("Status: {}", outcome.status);
        println!("{}", outcome.explorer_url);
        Ok(outcome)
    }
}

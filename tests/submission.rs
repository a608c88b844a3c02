//! Drives CLI commands end to end against an in-memory cluster.

use async_trait::async_trait;
use ingl_cli::{
    cli::{CliContext, Command, ProposalArg, RebalanceArg, ValidatorArg},
    config::ResolvedConfig,
    constants::{COMPUTE_BUDGET_PROGRAM_ID, DEFAULT_INGL_PROGRAM_ID},
    domain::{InglAddresses, ProposalRef},
    models::{
        Class, GeneralData, RebalancingData, SignerSource, SolanaTransactionStatus,
        TransactionError,
    },
    services::{SolanaProviderError, SolanaProviderTrait},
};
use parking_lot::Mutex;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{write_keypair_file, Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use std::{collections::HashMap, sync::Arc};
use tempfile::TempDir;

const LAST_VALID_BLOCK_HEIGHT: u64 = 1_000;

#[derive(Default)]
struct ClusterState {
    accounts: HashMap<Pubkey, Account>,
    sent: Vec<Transaction>,
    status_polls: usize,
    block_height: u64,
    blockhash_fetches: usize,
    stale_anchors: usize,
}

/// Cluster that finalizes every transaction on the second status poll.
#[derive(Clone, Default)]
struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    fn with_general_data(proposal_numeration: u32) -> Self {
        let cluster = FakeCluster::default();
        let general = GeneralData {
            validation_phrase: 0,
            mint_numeration: 0,
            pending_delegation_total: 0,
            dealloced: 0,
            total_delegated: 0,
            last_withdraw_epoch: 0,
            last_total_staked: 0,
            is_t_stake_initialized: false,
            proposal_numeration,
            last_feeless_redemption_date: 0,
            last_validated_validator_id_proposal: 0,
            rebalancing_data: RebalancingData {
                pending_validator_rewards: 0,
                unclaimed_validator_rewards: 0,
                is_rebalancing_active: false,
            },
            vote_rewards: Vec::new(),
        };
        let mut data = borsh::to_vec(&general).unwrap();
        data.resize(data.len() + 256, 0);

        let address = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID)
            .general()
            .unwrap();
        cluster.state.lock().accounts.insert(
            address,
            Account {
                lamports: 10_000_000,
                data,
                owner: DEFAULT_INGL_PROGRAM_ID,
                executable: false,
                rent_epoch: 0,
            },
        );
        cluster
    }

    fn sent(&self) -> Vec<Transaction> {
        self.state.lock().sent.clone()
    }
}

#[async_trait]
impl SolanaProviderTrait for FakeCluster {
    async fn get_latest_blockhash_with_commitment(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError> {
        let mut state = self.state.lock();
        state.blockhash_fetches += 1;
        if state.stale_anchors > 0 {
            state.stale_anchors -= 1;
            return Ok((Hash::new_unique(), 0));
        }
        Ok((Hash::new_unique(), LAST_VALID_BLOCK_HEIGHT))
    }

    async fn get_block_height(&self) -> Result<u64, SolanaProviderError> {
        Ok(self.state.lock().block_height)
    }

    async fn get_account_from_pubkey(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Account, SolanaProviderError> {
        self.state
            .lock()
            .accounts
            .get(pubkey)
            .cloned()
            .ok_or(SolanaProviderError::AccountNotFound(*pubkey))
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError> {
        transaction
            .verify()
            .map_err(|e| SolanaProviderError::InvalidTransaction(e.to_string()))?;
        self.state.lock().sent.push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn get_transaction_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError> {
        let mut state = self.state.lock();
        state.status_polls += 1;
        if state.status_polls < 2 {
            Ok(Some(SolanaTransactionStatus::Confirmed))
        } else {
            Ok(Some(SolanaTransactionStatus::Finalized))
        }
    }
}

fn keypair_file(dir: &TempDir, name: &str) -> (Keypair, String) {
    let keypair = Keypair::new();
    let path = dir.path().join(name);
    write_keypair_file(&keypair, &path).unwrap();
    (keypair, path.to_string_lossy().into_owned())
}

fn payer_file(dir: &TempDir) -> (Keypair, String) {
    keypair_file(dir, "id.json")
}

fn context(cluster: &FakeCluster, keypair_path: String) -> CliContext<FakeCluster> {
    let config = ResolvedConfig {
        program_id: DEFAULT_INGL_PROGRAM_ID,
        rpc_url: "https://api.devnet.solana.com".to_string(),
        explorer_suffix: "?cluster=devnet".to_string(),
        keypair_path,
    };
    CliContext::new(config, cluster.clone(), 2)
}

#[tokio::test(start_paused = true)]
async fn test_create_validator_proposal_uses_next_numeration() {
    let dir = tempfile::tempdir().unwrap();
    let (payer, keypair_path) = payer_file(&dir);
    let cluster = FakeCluster::with_general_data(5);

    context(&cluster, keypair_path)
        .run(Command::CreateValidatorProposal)
        .await
        .unwrap();

    let sent = cluster.sent();
    assert_eq!(sent.len(), 1);
    let transaction = &sent[0];
    assert_eq!(transaction.message.account_keys[0], payer.pubkey());
    assert_eq!(transaction.message.instructions.len(), 1);

    let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
    let proposal = addresses.validator_proposal(5).unwrap();
    assert!(transaction.message.account_keys.contains(&proposal));
    assert_eq!(transaction.message.instructions[0].data, vec![12, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_mint_is_signed_by_payer_and_fresh_mint() {
    let dir = tempfile::tempdir().unwrap();
    let (payer, keypair_path) = payer_file(&dir);
    let cluster = FakeCluster::default();

    context(&cluster, keypair_path)
        .run(Command::Mint {
            class: Class::Sapphire,
        })
        .await
        .unwrap();

    let sent = cluster.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0].message;
    assert_eq!(message.header.num_required_signatures, 2);
    assert_eq!(message.account_keys[0], payer.pubkey());
    assert_eq!(sent[0].signatures.len(), 2);

    let budget = &message.instructions[0];
    assert_eq!(
        message.account_keys[budget.program_id_index as usize],
        COMPUTE_BUDGET_PROGRAM_ID
    );
    assert_eq!(message.instructions[1].data, vec![0, 2, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_address_only_payer_sends_nothing() {
    let cluster = FakeCluster::default();
    let payer = Pubkey::new_unique();

    let err = context(&cluster, payer.to_string())
        .run(Command::Init)
        .await
        .unwrap_err();

    match err.downcast_ref::<TransactionError>() {
        Some(TransactionError::MissingSigners { missing }) => assert_eq!(missing, &vec![payer]),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(cluster.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_vote_without_any_proposal_fails_before_signing() {
    let dir = tempfile::tempdir().unwrap();
    let (_, keypair_path) = payer_file(&dir);
    let cluster = FakeCluster::with_general_data(0);

    let result = context(&cluster, keypair_path)
        .run(Command::FinalizeProposal {
            proposal: ProposalArg { proposal: None },
        })
        .await;

    assert!(result.is_err());
    assert!(cluster.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_expired_anchor_is_never_sent() {
    let dir = tempfile::tempdir().unwrap();
    let (_, keypair_path) = payer_file(&dir);
    let cluster = FakeCluster::default();
    cluster.state.lock().block_height = LAST_VALID_BLOCK_HEIGHT + 1;

    let err = context(&cluster, keypair_path)
        .run(Command::Init)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TransactionError>(),
        Some(TransactionError::AnchorExpired {
            signature: None,
            ..
        })
    ));
    assert!(cluster.sent().is_empty());
    assert_eq!(cluster.state.lock().blockhash_fetches, 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_anchor_rebuilt_once() {
    let dir = tempfile::tempdir().unwrap();
    let (payer, keypair_path) = payer_file(&dir);
    let cluster = FakeCluster::default();
    {
        let mut state = cluster.state.lock();
        state.block_height = 1;
        state.stale_anchors = 1;
    }

    context(&cluster, keypair_path)
        .run(Command::Init)
        .await
        .unwrap();

    let sent = cluster.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.account_keys[0], payer.pubkey());
    assert_eq!(cluster.state.lock().blockhash_fetches, 2);
}

#[tokio::test(start_paused = true)]
async fn test_rebalance_signed_by_validator_keypair() {
    let dir = tempfile::tempdir().unwrap();
    let (payer, keypair_path) = payer_file(&dir);
    let (validator, validator_path) = keypair_file(&dir, "validator.json");
    let cluster = FakeCluster::default();

    context(&cluster, keypair_path)
        .run(Command::InitRebalance(RebalanceArg {
            validator_keypair: Some(SignerSource::Filepath(validator_path.into())),
            validator: ValidatorArg { validator: None },
        }))
        .await
        .unwrap();

    let sent = cluster.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0].message;
    assert_eq!(message.header.num_required_signatures, 2);
    assert_eq!(message.account_keys[0], payer.pubkey());
    assert_eq!(message.account_keys[1], validator.pubkey());
    assert_eq!(sent[0].signatures.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_mint_given_as_keypair_file() {
    let dir = tempfile::tempdir().unwrap();
    let (_, keypair_path) = payer_file(&dir);
    let (mint, mint_path) = keypair_file(&dir, "mint.json");
    let cluster = FakeCluster::default();

    context(&cluster, keypair_path)
        .run(Command::Delegate {
            mint: SignerSource::Filepath(mint_path.into()),
        })
        .await
        .unwrap();

    let sent = cluster.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.header.num_required_signatures, 1);
    assert!(sent[0].message.account_keys.contains(&mint.pubkey()));
    let nft_account = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID)
        .nft_account(&mint.pubkey())
        .unwrap();
    assert!(sent[0].message.account_keys.contains(&nft_account));
}

#[tokio::test(start_paused = true)]
async fn test_upgrade_finalize_rejects_non_team_signer() {
    let dir = tempfile::tempdir().unwrap();
    let (_, keypair_path) = payer_file(&dir);
    let (_, team_path) = keypair_file(&dir, "team.json");
    let cluster = FakeCluster::default();

    let err = context(&cluster, keypair_path)
        .run(Command::FinalizeUpgradeProposal {
            proposal: ProposalRef::Numeration(0),
            team_keypair: SignerSource::Filepath(team_path.into()),
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("team account"), "{err}");
    assert!(cluster.sent().is_empty());
}

//! Reads Ingl account state needed to parameterize instructions.

use log::debug;
use solana_sdk::pubkey::Pubkey;

use crate::{
    domain::InglAddresses,
    models::{
        AccountState, GeneralData, GovernanceData, ProgramUpgradeData, StateError,
        TransactionError, ValidatorConfig,
    },
    services::{SolanaProviderError, SolanaProviderTrait},
};

/// Proposal family, each with its own numbered address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalKind {
    ValidatorSelection,
    Governance,
    ProgramUpgrade,
}

impl ProposalKind {
    pub fn address(&self, addresses: &InglAddresses, numeration: u32) -> Result<Pubkey, TransactionError> {
        let address = match self {
            ProposalKind::ValidatorSelection => addresses.validator_proposal(numeration)?,
            ProposalKind::Governance => addresses.governance_proposal(numeration)?,
            ProposalKind::ProgramUpgrade => addresses.upgrade_proposal(numeration)?,
        };
        Ok(address)
    }
}

/// A proposal given either by numeration or by account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalRef {
    Numeration(u32),
    Address(Pubkey),
}

impl ProposalRef {
    /// Numeration of the referenced proposal. Addresses are matched against
    /// numerations `0..search_limit`.
    pub fn resolve(
        &self,
        addresses: &InglAddresses,
        kind: ProposalKind,
        search_limit: u32,
    ) -> Result<u32, TransactionError> {
        match self {
            ProposalRef::Numeration(numeration) => Ok(*numeration),
            ProposalRef::Address(address) => {
                for numeration in 0..search_limit {
                    if kind.address(addresses, numeration)? == *address {
                        return Ok(numeration);
                    }
                }
                Err(StateError::ProposalNotFound {
                    address: *address,
                    searched: search_limit,
                }
                .into())
            }
        }
    }
}

/// Decodes program-owned accounts through a provider.
pub struct InglStateReader<'a, P: SolanaProviderTrait> {
    provider: &'a P,
    addresses: &'a InglAddresses,
}

impl<'a, P: SolanaProviderTrait> InglStateReader<'a, P> {
    pub fn new(provider: &'a P, addresses: &'a InglAddresses) -> Self {
        Self {
            provider,
            addresses,
        }
    }

    /// Fetches `address` and decodes it as `T`, requiring Ingl program ownership.
    pub async fn read<T: AccountState>(&self, address: &Pubkey) -> Result<T, TransactionError> {
        let account = self.provider.get_account_from_pubkey(address).await?;
        let expected = *self.addresses.program_id();
        if account.owner != expected {
            return Err(StateError::UnexpectedOwner {
                address: *address,
                owner: account.owner,
                expected,
            }
            .into());
        }
        debug!("Decoding {} from {} ({} bytes)", T::KIND, address, account.data.len());
        Ok(T::decode_account(address, &account.data)?)
    }

    pub async fn general_data(&self) -> Result<GeneralData, TransactionError> {
        self.read(&self.addresses.general()?).await
    }

    pub async fn validator_config(&self) -> Result<ValidatorConfig, TransactionError> {
        self.read(&self.addresses.config()?).await
    }

    pub async fn upgrade_proposal(&self, numeration: u32) -> Result<ProgramUpgradeData, TransactionError> {
        self.read(&self.addresses.upgrade_proposal(numeration)?).await
    }

    pub async fn governance(&self, numeration: u32) -> Result<GovernanceData, TransactionError> {
        self.read(&self.addresses.governance_proposal(numeration)?).await
    }

    /// Numeration the next validator selection proposal will take.
    pub async fn next_proposal_numeration(&self) -> Result<u32, TransactionError> {
        Ok(self.general_data().await?.proposal_numeration)
    }

    /// Numeration of the latest validator selection proposal.
    pub async fn latest_proposal_numeration(&self) -> Result<u32, TransactionError> {
        let general = self.general_data().await?;
        general.latest_proposal_numeration().ok_or_else(|| {
            TransactionError::State(StateError::Decode {
                kind: GeneralData::KIND,
                address: self.addresses.general().unwrap_or_default(),
                reason: "no validator selection proposal has been created".to_string(),
            })
        })
    }

    /// First numeration in `0..search_limit` whose proposal account does not exist yet.
    ///
    /// Governance and upgrade proposals are not counted anywhere on-chain, so
    /// the slots are probed in order.
    pub async fn next_free_numeration(
        &self,
        kind: ProposalKind,
        search_limit: u32,
    ) -> Result<u32, TransactionError> {
        for numeration in 0..search_limit {
            let address = kind.address(self.addresses, numeration)?;
            match self.provider.get_account_from_pubkey(&address).await {
                Ok(_) => debug!("{:?} proposal {} exists at {}", kind, numeration, address),
                Err(SolanaProviderError::AccountNotFound(_)) => return Ok(numeration),
                Err(e) => return Err(e.into()),
            }
        }
        Err(StateError::ProposalNotFound {
            address: kind.address(self.addresses, search_limit)?,
            searched: search_limit,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::DEFAULT_INGL_PROGRAM_ID,
        models::{RebalancingData, VoteReward},
        services::MockSolanaProviderTrait,
    };
    use solana_sdk::account::Account;

    fn general(proposal_numeration: u32) -> GeneralData {
        GeneralData {
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
            vote_rewards: Vec::<VoteReward>::new(),
        }
    }

    fn account(owner: Pubkey, mut data: Vec<u8>) -> Account {
        data.resize(data.len() + 64, 0);
        Account {
            lamports: 1_000_000,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        }
    }

    #[tokio::test]
    async fn test_general_data_read_and_numeration() {
        let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
        let general_address = addresses.general().unwrap();
        let data = borsh::to_vec(&general(4)).unwrap();

        let mut provider = MockSolanaProviderTrait::new();
        provider
            .expect_get_account_from_pubkey()
            .withf(move |address| *address == general_address)
            .returning(move |_| {
                let account = account(DEFAULT_INGL_PROGRAM_ID, data.clone());
                Box::pin(async move { Ok(account) })
            });

        let reader = InglStateReader::new(&provider, &addresses);
        assert_eq!(reader.next_proposal_numeration().await.unwrap(), 4);
        assert_eq!(reader.latest_proposal_numeration().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_no_proposal_yet() {
        let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
        let data = borsh::to_vec(&general(0)).unwrap();
        let mut provider = MockSolanaProviderTrait::new();
        provider.expect_get_account_from_pubkey().returning(move |_| {
            let account = account(DEFAULT_INGL_PROGRAM_ID, data.clone());
            Box::pin(async move { Ok(account) })
        });

        let reader = InglStateReader::new(&provider, &addresses);
        assert!(matches!(
            reader.latest_proposal_numeration().await,
            Err(TransactionError::State(StateError::Decode { .. }))
        ));
    }

    #[tokio::test]
    async fn test_foreign_owner_rejected() {
        let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
        let data = borsh::to_vec(&general(1)).unwrap();
        let mut provider = MockSolanaProviderTrait::new();
        provider.expect_get_account_from_pubkey().returning(move |_| {
            let account = account(Pubkey::new_unique(), data.clone());
            Box::pin(async move { Ok(account) })
        });

        let reader = InglStateReader::new(&provider, &addresses);
        assert!(matches!(
            reader.general_data().await,
            Err(TransactionError::State(StateError::UnexpectedOwner { .. }))
        ));
    }

    #[tokio::test]
    async fn test_missing_account_surfaces_provider_error() {
        let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
        let mut provider = MockSolanaProviderTrait::new();
        provider.expect_get_account_from_pubkey().returning(|address| {
            let address = *address;
            Box::pin(async move { Err(SolanaProviderError::AccountNotFound(address)) })
        });

        let reader = InglStateReader::new(&provider, &addresses);
        assert!(matches!(
            reader.validator_config().await,
            Err(TransactionError::UnderlyingSolanaProvider(
                SolanaProviderError::AccountNotFound(_)
            ))
        ));
    }

    #[tokio::test]
    async fn test_next_free_numeration_probes_in_order() {
        let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
        let existing = [
            addresses.governance_proposal(0).unwrap(),
            addresses.governance_proposal(1).unwrap(),
        ];
        let mut provider = MockSolanaProviderTrait::new();
        provider
            .expect_get_account_from_pubkey()
            .times(3)
            .returning(move |address| {
                let address = *address;
                let found = existing.contains(&address);
                Box::pin(async move {
                    if found {
                        Ok(account(DEFAULT_INGL_PROGRAM_ID, Vec::new()))
                    } else {
                        Err(SolanaProviderError::AccountNotFound(address))
                    }
                })
            });

        let reader = InglStateReader::new(&provider, &addresses);
        assert_eq!(
            reader
                .next_free_numeration(ProposalKind::Governance, 10)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_next_free_numeration_stops_on_network_error() {
        let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
        let mut provider = MockSolanaProviderTrait::new();
        provider
            .expect_get_account_from_pubkey()
            .times(1)
            .returning(|_| {
                Box::pin(async { Err(SolanaProviderError::NetworkError("timeout".to_string())) })
            });

        let reader = InglStateReader::new(&provider, &addresses);
        assert!(matches!(
            reader
                .next_free_numeration(ProposalKind::ProgramUpgrade, 10)
                .await,
            Err(TransactionError::UnderlyingSolanaProvider(
                SolanaProviderError::NetworkError(_)
            ))
        ));
    }

    #[test]
    fn test_proposal_ref_resolution() {
        let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
        let address = addresses.upgrade_proposal(7).unwrap();

        assert_eq!(
            ProposalRef::Numeration(2)
                .resolve(&addresses, ProposalKind::ProgramUpgrade, 0)
                .unwrap(),
            2
        );
        assert_eq!(
            ProposalRef::Address(address)
                .resolve(&addresses, ProposalKind::ProgramUpgrade, 10)
                .unwrap(),
            7
        );
        assert!(matches!(
            ProposalRef::Address(address).resolve(&addresses, ProposalKind::Governance, 10),
            Err(TransactionError::State(StateError::ProposalNotFound { searched: 10, .. }))
        ));
    }
}

//! Account state written by the Ingl program.
//!
//! Accounts are allocated with headroom, so decoding reads the structure from
//! the front of the buffer and ignores whatever follows it.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;

use super::{GovernanceType, StateError};

/// Decodes a Borsh structure from raw account data.
pub trait AccountState: BorshDeserialize {
    const KIND: &'static str;

    fn decode_account(address: &Pubkey, data: &[u8]) -> Result<Self, StateError> {
        let mut buf = data;
        Self::deserialize(&mut buf).map_err(|e| StateError::Decode {
            kind: Self::KIND,
            address: *address,
            reason: e.to_string(),
        })
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub validation_phrase: u32,
    pub is_validator_id_switchable: bool,
    pub max_primary_stake: u64,
    pub nft_holders_share: u8,
    pub initial_redemption_fee: u8,
    pub unit_stake: u64,
    pub redemption_fee_duration: u32,
    pub proposal_quorum: u8,
    pub creator_royalties: u16,
    pub commission: u8,
    pub validator_id: [u8; 32],
    pub validator_name: String,
    pub twitter_handle: String,
    pub discord_invite: String,
    pub website: String,
}

impl ValidatorConfig {
    pub fn validator_id(&self) -> Pubkey {
        Pubkey::new_from_array(self.validator_id)
    }
}

impl AccountState for ValidatorConfig {
    const KIND: &'static str = "ValidatorConfig";
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoteReward {
    pub epoch_number: u64,
    pub total_reward: u64,
    pub total_stake: u32,
    pub nft_holders_reward: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RebalancingData {
    pub pending_validator_rewards: u64,
    pub unclaimed_validator_rewards: u64,
    pub is_rebalancing_active: bool,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct GeneralData {
    pub validation_phrase: u32,
    pub mint_numeration: u32,
    pub pending_delegation_total: u64,
    pub dealloced: u64,
    pub total_delegated: u32,
    pub last_withdraw_epoch: u64,
    pub last_total_staked: u64,
    pub is_t_stake_initialized: bool,
    pub proposal_numeration: u32,
    pub last_feeless_redemption_date: u32,
    pub last_validated_validator_id_proposal: u32,
    pub rebalancing_data: RebalancingData,
    pub vote_rewards: Vec<VoteReward>,
}

impl GeneralData {
    /// Numeration of the most recently created proposal, if any.
    pub fn latest_proposal_numeration(&self) -> Option<u32> {
        self.proposal_numeration.checked_sub(1)
    }
}

impl AccountState for GeneralData {
    const KIND: &'static str = "GeneralData";
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpgradeVote {
    pub vote: bool,
    pub validator_id: [u8; 32],
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgramUpgradeData {
    pub validation_phrase: u32,
    pub buffer_address: [u8; 32],
    pub code_link: String,
    pub is_still_ongoing: bool,
    pub votes: BTreeMap<[u8; 32], UpgradeVote>,
}

impl ProgramUpgradeData {
    pub fn buffer_address(&self) -> Pubkey {
        Pubkey::new_from_array(self.buffer_address)
    }
}

impl AccountState for ProgramUpgradeData {
    const KIND: &'static str = "ProgramUpgradeData";
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct GovernanceData {
    pub validation_phrase: u32,
    pub expiration_time: u32,
    pub is_still_ongoing: bool,
    pub date_finalized: Option<u32>,
    pub did_proposal_pass: Option<bool>,
    pub is_proposal_executed: bool,
    pub votes: BTreeMap<u32, bool>,
    pub governance_type: GovernanceType,
}

impl AccountState for GovernanceData {
    const KIND: &'static str = "GovernanceData";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigAccountType, GovernanceType};

    fn sample_general_data() -> GeneralData {
        GeneralData {
            validation_phrase: 0x2c0d_a41b,
            mint_numeration: 12,
            pending_delegation_total: 3_000_000_000,
            dealloced: 0,
            total_delegated: 4,
            last_withdraw_epoch: 512,
            last_total_staked: 9_000_000_000,
            is_t_stake_initialized: false,
            proposal_numeration: 3,
            last_feeless_redemption_date: 0,
            last_validated_validator_id_proposal: 2,
            rebalancing_data: RebalancingData {
                pending_validator_rewards: 10,
                unclaimed_validator_rewards: 20,
                is_rebalancing_active: true,
            },
            vote_rewards: vec![VoteReward {
                epoch_number: 511,
                total_reward: 1_000,
                total_stake: 4,
                nft_holders_reward: 800,
            }],
        }
    }

    #[test]
    fn test_general_data_ignores_trailing_account_space() {
        let general = sample_general_data();
        let mut data = borsh::to_vec(&general).unwrap();
        data.extend_from_slice(&[0u8; 128]);

        let decoded = GeneralData::decode_account(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(decoded, general);
        assert_eq!(decoded.latest_proposal_numeration(), Some(2));
    }

    #[test]
    fn test_latest_proposal_numeration_without_proposals() {
        let general = GeneralData {
            proposal_numeration: 0,
            ..sample_general_data()
        };
        assert_eq!(general.latest_proposal_numeration(), None);
    }

    #[test]
    fn test_truncated_account_reports_kind_and_address() {
        let address = Pubkey::new_unique();
        let data = borsh::to_vec(&sample_general_data()).unwrap();
        let err = GeneralData::decode_account(&address, &data[..10]).unwrap_err();
        match err {
            StateError::Decode {
                kind,
                address: failed,
                ..
            } => {
                assert_eq!(kind, "GeneralData");
                assert_eq!(failed, address);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validator_config_exposes_validator_id() {
        let validator = Pubkey::new_unique();
        let config = ValidatorConfig {
            validation_phrase: 1,
            is_validator_id_switchable: true,
            max_primary_stake: 1_000,
            nft_holders_share: 70,
            initial_redemption_fee: 10,
            unit_stake: 1_000_000_000,
            redemption_fee_duration: 86_400,
            proposal_quorum: 60,
            creator_royalties: 200,
            commission: 5,
            validator_id: validator.to_bytes(),
            validator_name: "ingl".to_string(),
            twitter_handle: String::new(),
            discord_invite: String::new(),
            website: "https://ingl.io".to_string(),
        };
        let data = borsh::to_vec(&config).unwrap();
        let decoded = ValidatorConfig::decode_account(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(decoded.validator_id(), validator);
        assert_eq!(decoded.website, "https://ingl.io");
    }

    #[test]
    fn test_program_upgrade_data_votes() {
        let validator = Pubkey::new_unique();
        let buffer = Pubkey::new_unique();
        let mut votes = BTreeMap::new();
        votes.insert(
            validator.to_bytes(),
            UpgradeVote {
                vote: true,
                validator_id: validator.to_bytes(),
            },
        );
        let upgrade = ProgramUpgradeData {
            validation_phrase: 7,
            buffer_address: buffer.to_bytes(),
            code_link: "https://github.com/ingl-dao".to_string(),
            is_still_ongoing: true,
            votes,
        };
        let data = borsh::to_vec(&upgrade).unwrap();
        let decoded = ProgramUpgradeData::decode_account(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(decoded.buffer_address(), buffer);
        assert_eq!(decoded.votes.len(), 1);
    }

    #[test]
    fn test_governance_data_round_trip() {
        let governance = GovernanceData {
            validation_phrase: 9,
            expiration_time: 1_700_000_000,
            is_still_ongoing: false,
            date_finalized: Some(1_700_000_100),
            did_proposal_pass: Some(true),
            is_proposal_executed: false,
            votes: BTreeMap::from([(1, true), (2, false)]),
            governance_type: GovernanceType::ConfigAccount(ConfigAccountType::Website(
                "https://ingl.io".to_string(),
            )),
        };
        let data = borsh::to_vec(&governance).unwrap();
        let decoded = GovernanceData::decode_account(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(decoded, governance);
    }
}

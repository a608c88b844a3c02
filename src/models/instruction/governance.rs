use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

/// Change proposed by a governance vote, encoded after the `CreateGovernance` tag.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceType {
    ConfigAccount(ConfigAccountType),
    ProgramUpgrade {
        buffer_account: [u8; 32],
        code_link: String,
    },
    VoteAccountGovernance(VoteAccountGovernance),
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAccountType {
    MaxPrimaryStake(u64),
    NftHolderShare(u8),
    InitialRedemptionFee(u8),
    RedemptionFeeDuration(u32),
    ValidatorName(String),
    TwitterHandle(String),
    DiscordInvite(String),
    Website(String),
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum VoteAccountGovernance {
    ValidatorId([u8; 32]),
    Commission(u8),
}

impl GovernanceType {
    pub fn program_upgrade(buffer_account: &Pubkey, code_link: impl Into<String>) -> Self {
        GovernanceType::ProgramUpgrade {
            buffer_account: buffer_account.to_bytes(),
            code_link: code_link.into(),
        }
    }

    pub fn validator_id(validator: &Pubkey) -> Self {
        GovernanceType::VoteAccountGovernance(VoteAccountGovernance::ValidatorId(
            validator.to_bytes(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstructionEnum;

    #[test]
    fn test_create_governance_nests_sub_enum_before_log_level() {
        let data = InstructionEnum::CreateGovernance {
            governance_type: GovernanceType::ConfigAccount(ConfigAccountType::NftHolderShare(60)),
            log_level: 2,
        }
        .encode()
        .unwrap();
        // tag, governance type, config field, value, log level
        assert_eq!(data, vec![25, 0, 1, 60, 2]);
    }

    #[test]
    fn test_program_upgrade_governance_layout() {
        let buffer = Pubkey::new_unique();
        let data = InstructionEnum::CreateGovernance {
            governance_type: GovernanceType::program_upgrade(&buffer, "ab"),
            log_level: 0,
        }
        .encode()
        .unwrap();
        assert_eq!(&data[..2], &[25, 1]);
        assert_eq!(&data[2..34], &buffer.to_bytes()[..]);
        assert_eq!(&data[34..], &[2, 0, 0, 0, b'a', b'b', 0]);
    }

    #[test]
    fn test_governance_round_trip() {
        let cases = vec![
            GovernanceType::ConfigAccount(ConfigAccountType::MaxPrimaryStake(u64::MAX)),
            GovernanceType::ConfigAccount(ConfigAccountType::RedemptionFeeDuration(86_400)),
            GovernanceType::ConfigAccount(ConfigAccountType::Website(String::new())),
            GovernanceType::validator_id(&Pubkey::new_unique()),
            GovernanceType::VoteAccountGovernance(VoteAccountGovernance::Commission(0)),
        ];
        for governance_type in cases {
            let instruction = InstructionEnum::CreateGovernance {
                governance_type,
                log_level: 1,
            };
            let decoded = InstructionEnum::decode(&instruction.encode().unwrap()).unwrap();
            assert_eq!(decoded, instruction);
        }
    }
}

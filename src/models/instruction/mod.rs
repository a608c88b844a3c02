//! Wire format of the Ingl program's instruction data.
//!
//! Instructions are Borsh encoded: a one-byte tag holding the variant's
//! declaration index, followed by the variant's fields in declared order.
//! New variants may only be appended; reordering shifts every later tag and
//! breaks compatibility with the deployed program.

use borsh::{BorshDeserialize, BorshSerialize};
use std::{fmt, str::FromStr};

use crate::models::InstructionError;

mod compute_budget;
pub use compute_budget::*;

mod governance;
pub use governance::*;

/// Rarity class requested when minting.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Ruby,
    Diamond,
    Sapphire,
    Emerald,
    Serendibite,
    Benitoite,
}

impl Class {
    pub const ALL: [Class; 6] = [
        Class::Ruby,
        Class::Diamond,
        Class::Sapphire,
        Class::Emerald,
        Class::Serendibite,
        Class::Benitoite,
    ];
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Class::Ruby => "Ruby",
            Class::Diamond => "Diamond",
            Class::Sapphire => "Sapphire",
            Class::Emerald => "Emerald",
            Class::Serendibite => "Serendibite",
            Class::Benitoite => "Benitoite",
        };
        f.write_str(name)
    }
}

impl FromStr for Class {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Class::ALL
            .into_iter()
            .find(|class| class.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid class '{s}', expected one of: {}",
                    Class::ALL.map(|c| c.to_string()).join(", ")
                )
            })
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum InstructionEnum {
    MintNft {
        class: Class,
        log_level: u8,
    },
    InglInit {
        log_level: u8,
    },
    Redeem {
        log_level: u8,
    },
    ImprintRarity {
        log_level: u8,
    },
    AllocateNFT {
        log_level: u8,
    },
    DeAllocateNFT {
        log_level: u8,
    },
    CreateVoteAccount {
        log_level: u8,
    },
    ChangeVoteAccountsValidatorIdentity {
        log_level: u8,
    },
    DelegateNFT {
        log_level: u8,
    },
    UnDelegateNFT {
        log_level: u8,
    },
    InitRarityImprint {
        log_level: u8,
    },
    RegisterValidatorId {
        log_level: u8,
    },
    CreateValidatorSelectionProposal {
        log_level: u8,
    },
    VoteValidatorProposal {
        num_nfts: u8,
        validator_index: u32,
        log_level: u8,
    },
    FinalizeProposal {
        log_level: u8,
    },
    ValidatorWithdraw {
        log_level: u8,
    },
    NFTWithdraw {
        cnt: u32,
        log_level: u8,
    },
    ProcessRewards {
        log_level: u8,
    },
    CloseProposal {
        log_level: u8,
    },
    InitRebalance {
        log_level: u8,
    },
    FinalizeRebalance {
        log_level: u8,
    },
    InjectTestingData {
        num_nfts: u32,
        log_level: u8,
    },
    CreateProgramUpgradeProposal {
        code_link: String,
        log_level: u8,
    },
    VoteProgramUpgradeProposal {
        numeration: u32,
        vote: bool,
        validator_proposal_numeration: u32,
        log_level: u8,
    },
    FinalizeProgramUpgradeProposal {
        proposal_numeration: u32,
        log_level: u8,
    },
    CreateGovernance {
        governance_type: GovernanceType,
        log_level: u8,
    },
    VoteGovernance {
        numeration: u32,
        vote: bool,
        cnt: u8,
        log_level: u8,
    },
    FinalizeGovernance {
        numeration: u32,
        log_level: u8,
    },
}

impl InstructionEnum {
    pub fn name(&self) -> &'static str {
        match self {
            InstructionEnum::MintNft { .. } => "MintNft",
            InstructionEnum::InglInit { .. } => "InglInit",
            InstructionEnum::Redeem { .. } => "Redeem",
            InstructionEnum::ImprintRarity { .. } => "ImprintRarity",
            InstructionEnum::AllocateNFT { .. } => "AllocateNFT",
            InstructionEnum::DeAllocateNFT { .. } => "DeAllocateNFT",
            InstructionEnum::CreateVoteAccount { .. } => "CreateVoteAccount",
            InstructionEnum::ChangeVoteAccountsValidatorIdentity { .. } => {
                "ChangeVoteAccountsValidatorIdentity"
            }
            InstructionEnum::DelegateNFT { .. } => "DelegateNFT",
            InstructionEnum::UnDelegateNFT { .. } => "UnDelegateNFT",
            InstructionEnum::InitRarityImprint { .. } => "InitRarityImprint",
            InstructionEnum::RegisterValidatorId { .. } => "RegisterValidatorId",
            InstructionEnum::CreateValidatorSelectionProposal { .. } => {
                "CreateValidatorSelectionProposal"
            }
            InstructionEnum::VoteValidatorProposal { .. } => "VoteValidatorProposal",
            InstructionEnum::FinalizeProposal { .. } => "FinalizeProposal",
            InstructionEnum::ValidatorWithdraw { .. } => "ValidatorWithdraw",
            InstructionEnum::NFTWithdraw { .. } => "NFTWithdraw",
            InstructionEnum::ProcessRewards { .. } => "ProcessRewards",
            InstructionEnum::CloseProposal { .. } => "CloseProposal",
            InstructionEnum::InitRebalance { .. } => "InitRebalance",
            InstructionEnum::FinalizeRebalance { .. } => "FinalizeRebalance",
            InstructionEnum::InjectTestingData { .. } => "InjectTestingData",
            InstructionEnum::CreateProgramUpgradeProposal { .. } => {
                "CreateProgramUpgradeProposal"
            }
            InstructionEnum::VoteProgramUpgradeProposal { .. } => "VoteProgramUpgradeProposal",
            InstructionEnum::FinalizeProgramUpgradeProposal { .. } => {
                "FinalizeProgramUpgradeProposal"
            }
            InstructionEnum::CreateGovernance { .. } => "CreateGovernance",
            InstructionEnum::VoteGovernance { .. } => "VoteGovernance",
            InstructionEnum::FinalizeGovernance { .. } => "FinalizeGovernance",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, InstructionError> {
        borsh::to_vec(self).map_err(|e| InstructionError::Encoding {
            variant: self.name(),
            reason: e.to_string(),
        })
    }

    pub fn decode(data: &[u8]) -> Result<Self, InstructionError> {
        Self::try_from_slice(data).map_err(|e| InstructionError::Encoding {
            variant: "InstructionEnum",
            reason: e.to_string(),
        })
    }
}

/// Converts an item count into the width of the field that carries it.
pub(crate) fn item_count<T: TryFrom<usize>>(
    variant: &'static str,
    count: usize,
    max: usize,
) -> Result<T, InstructionError> {
    if count == 0 {
        return Err(InstructionError::NoItems { variant });
    }
    T::try_from(count).map_err(|_| InstructionError::TooManyItems {
        variant,
        count,
        max,
    })
}

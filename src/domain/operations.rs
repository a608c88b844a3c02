//! Account tables for every operation the client can submit.
//!
//! The Ingl program reads its accounts positionally, so each table below is
//! written out by hand in the order the program expects, including the
//! program and sysvar entries it repeats for cross-program invocations. A
//! wrong position or flag is not detectable here; the network rejects the
//! transaction with a generic execution failure.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::{
    constants::{
        associated_token_program_id, metaplex_program_id, system_program_id, token_program_id,
        BPF_LOADER_UPGRADEABLE_ID, INGL_INIT_COMPUTE_UNITS, MINT_NFT_COMPUTE_UNITS,
        STAKE_CONFIG_PROGRAM_ID, STAKE_PROGRAM_ID, SYSVAR_CLOCK_ID, SYSVAR_RENT_ID,
        SYSVAR_STAKE_HISTORY_ID, TEAM_ACCOUNT, VOTE_PROGRAM_ID,
    },
    domain::{associated_token_address, master_edition_address, metadata_address, InglAddresses},
    models::{
        item_count, Class, ComputeBudgetInstruction, GovernanceType, InstructionEnum,
        TransactionError,
    },
};

fn signer(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, true)
}

fn writable(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, false)
}

fn readonly(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, false)
}

/// Appends (mint, owner's token account, nft data account) for every mint.
fn push_nft_triples(
    accounts: &mut Vec<AccountMeta>,
    addresses: &InglAddresses,
    owner: &Pubkey,
    mints: &[Pubkey],
) -> Result<(), TransactionError> {
    for mint in mints {
        accounts.push(readonly(*mint));
        accounts.push(readonly(associated_token_address(owner, mint)?));
        accounts.push(writable(addresses.nft_account(mint)?));
    }
    Ok(())
}

/// A client operation with all of its inputs resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngleOperation {
    InglInit {
        payer: Pubkey,
    },
    MintNft {
        payer: Pubkey,
        mint: Pubkey,
        class: Class,
    },
    AllocateNft {
        payer: Pubkey,
        mint: Pubkey,
    },
    DeallocateNft {
        payer: Pubkey,
        mint: Pubkey,
    },
    RegisterValidatorId {
        validator: Pubkey,
    },
    CreateValidatorSelectionProposal {
        payer: Pubkey,
        numeration: u32,
    },
    VoteValidatorProposal {
        payer: Pubkey,
        numeration: u32,
        mints: Vec<Pubkey>,
        validator_index: u32,
    },
    FinalizeProposal {
        payer: Pubkey,
        numeration: u32,
    },
    DelegateNft {
        payer: Pubkey,
        mint: Pubkey,
    },
    UndelegateNft {
        payer: Pubkey,
        mint: Pubkey,
    },
    CreateVoteAccount {
        validator: Pubkey,
        numeration: u32,
    },
    CloseProposal {
        payer: Pubkey,
        numeration: u32,
    },
    InitRebalance {
        payer: Pubkey,
        validator: Pubkey,
    },
    FinalizeRebalance {
        payer: Pubkey,
        validator: Pubkey,
    },
    ProcessRewards {
        payer: Pubkey,
        validator: Pubkey,
    },
    NftWithdraw {
        payer: Pubkey,
        validator: Pubkey,
        mints: Vec<Pubkey>,
    },
    InjectTestingData {
        payer: Pubkey,
        mints: Vec<Pubkey>,
    },
    CreateProgramUpgradeProposal {
        payer: Pubkey,
        buffer: Pubkey,
        numeration: u32,
        code_link: String,
    },
    VoteProgramUpgradeProposal {
        validator: Pubkey,
        numeration: u32,
        vote: bool,
        validator_proposal_numeration: u32,
    },
    /// Also signed by [`TEAM_ACCOUNT`], so the team key must be among the signers.
    FinalizeProgramUpgradeProposal {
        payer: Pubkey,
        numeration: u32,
        buffer: Pubkey,
    },
    CreateGovernance {
        payer: Pubkey,
        numeration: u32,
        governance_type: GovernanceType,
    },
    VoteGovernance {
        payer: Pubkey,
        numeration: u32,
        vote: bool,
        mints: Vec<Pubkey>,
    },
    FinalizeGovernance {
        payer: Pubkey,
        numeration: u32,
    },
}

impl IngleOperation {
    /// Account that pays the transaction fee and is listed first.
    pub fn fee_payer(&self) -> Pubkey {
        match self {
            IngleOperation::RegisterValidatorId { validator }
            | IngleOperation::CreateVoteAccount { validator, .. }
            | IngleOperation::VoteProgramUpgradeProposal { validator, .. } => *validator,
            IngleOperation::InglInit { payer }
            | IngleOperation::MintNft { payer, .. }
            | IngleOperation::AllocateNft { payer, .. }
            | IngleOperation::DeallocateNft { payer, .. }
            | IngleOperation::CreateValidatorSelectionProposal { payer, .. }
            | IngleOperation::VoteValidatorProposal { payer, .. }
            | IngleOperation::FinalizeProposal { payer, .. }
            | IngleOperation::DelegateNft { payer, .. }
            | IngleOperation::UndelegateNft { payer, .. }
            | IngleOperation::CloseProposal { payer, .. }
            | IngleOperation::InitRebalance { payer, .. }
            | IngleOperation::FinalizeRebalance { payer, .. }
            | IngleOperation::ProcessRewards { payer, .. }
            | IngleOperation::NftWithdraw { payer, .. }
            | IngleOperation::InjectTestingData { payer, .. }
            | IngleOperation::CreateProgramUpgradeProposal { payer, .. }
            | IngleOperation::FinalizeProgramUpgradeProposal { payer, .. }
            | IngleOperation::CreateGovernance { payer, .. }
            | IngleOperation::VoteGovernance { payer, .. }
            | IngleOperation::FinalizeGovernance { payer, .. } => *payer,
        }
    }

    fn compute_unit_limit(&self) -> Option<u32> {
        match self {
            IngleOperation::InglInit { .. } => Some(INGL_INIT_COMPUTE_UNITS),
            IngleOperation::MintNft { .. } => Some(MINT_NFT_COMPUTE_UNITS),
            _ => None,
        }
    }

    /// Instruction payload, with item counts checked against their field width.
    pub fn instruction_data(&self, log_level: u8) -> Result<InstructionEnum, TransactionError> {
        let instruction = match self {
            IngleOperation::InglInit { .. } => InstructionEnum::InglInit { log_level },
            IngleOperation::MintNft { class, .. } => InstructionEnum::MintNft {
                class: *class,
                log_level,
            },
            IngleOperation::AllocateNft { .. } => InstructionEnum::AllocateNFT { log_level },
            IngleOperation::DeallocateNft { .. } => InstructionEnum::DeAllocateNFT { log_level },
            IngleOperation::RegisterValidatorId { .. } => {
                InstructionEnum::RegisterValidatorId { log_level }
            }
            IngleOperation::CreateValidatorSelectionProposal { .. } => {
                InstructionEnum::CreateValidatorSelectionProposal { log_level }
            }
            IngleOperation::VoteValidatorProposal {
                mints,
                validator_index,
                ..
            } => InstructionEnum::VoteValidatorProposal {
                num_nfts: item_count("VoteValidatorProposal", mints.len(), u8::MAX as usize)?,
                validator_index: *validator_index,
                log_level,
            },
            IngleOperation::FinalizeProposal { .. } => {
                InstructionEnum::FinalizeProposal { log_level }
            }
            IngleOperation::DelegateNft { .. } => InstructionEnum::DelegateNFT { log_level },
            IngleOperation::UndelegateNft { .. } => InstructionEnum::UnDelegateNFT { log_level },
            IngleOperation::CreateVoteAccount { .. } => {
                InstructionEnum::CreateVoteAccount { log_level }
            }
            IngleOperation::CloseProposal { .. } => InstructionEnum::CloseProposal { log_level },
            IngleOperation::InitRebalance { .. } => InstructionEnum::InitRebalance { log_level },
            IngleOperation::FinalizeRebalance { .. } => {
                InstructionEnum::FinalizeRebalance { log_level }
            }
            IngleOperation::ProcessRewards { .. } => InstructionEnum::ProcessRewards { log_level },
            IngleOperation::NftWithdraw { mints, .. } => InstructionEnum::NFTWithdraw {
                cnt: item_count("NFTWithdraw", mints.len(), u32::MAX as usize)?,
                log_level,
            },
            IngleOperation::InjectTestingData { mints, .. } => {
                InstructionEnum::InjectTestingData {
                    num_nfts: item_count("InjectTestingData", mints.len(), u32::MAX as usize)?,
                    log_level,
                }
            }
            IngleOperation::CreateProgramUpgradeProposal { code_link, .. } => {
                InstructionEnum::CreateProgramUpgradeProposal {
                    code_link: code_link.clone(),
                    log_level,
                }
            }
            IngleOperation::VoteProgramUpgradeProposal {
                numeration,
                vote,
                validator_proposal_numeration,
                ..
            } => InstructionEnum::VoteProgramUpgradeProposal {
                numeration: *numeration,
                vote: *vote,
                validator_proposal_numeration: *validator_proposal_numeration,
                log_level,
            },
            IngleOperation::FinalizeProgramUpgradeProposal { numeration, .. } => {
                InstructionEnum::FinalizeProgramUpgradeProposal {
                    proposal_numeration: *numeration,
                    log_level,
                }
            }
            IngleOperation::CreateGovernance {
                governance_type, ..
            } => InstructionEnum::CreateGovernance {
                governance_type: governance_type.clone(),
                log_level,
            },
            IngleOperation::VoteGovernance {
                numeration,
                vote,
                mints,
                ..
            } => InstructionEnum::VoteGovernance {
                numeration: *numeration,
                vote: *vote,
                cnt: item_count("VoteGovernance", mints.len(), u8::MAX as usize)?,
                log_level,
            },
            IngleOperation::FinalizeGovernance { numeration, .. } => {
                InstructionEnum::FinalizeGovernance {
                    numeration: *numeration,
                    log_level,
                }
            }
        };
        Ok(instruction)
    }

    /// Ordered account references the Ingl program expects for this operation.
    pub fn accounts(&self, addresses: &InglAddresses) -> Result<Vec<AccountMeta>, TransactionError> {
        let system = system_program_id();
        let token = token_program_id();
        let associated_token = associated_token_program_id();
        let metaplex = metaplex_program_id();

        let accounts = match self {
            IngleOperation::InglInit { payer } => {
                let collection_holder = addresses.collection_holder()?;
                let collection_mint = addresses.collection_mint()?;
                vec![
                    signer(*payer),
                    writable(collection_holder),
                    writable(collection_mint),
                    readonly(addresses.mint_authority()?),
                    writable(associated_token_address(&collection_holder, &collection_mint)?),
                    writable(metadata_address(&collection_mint)?),
                    writable(addresses.general()?),
                    writable(master_edition_address(&collection_mint)?),
                    readonly(token),
                    readonly(SYSVAR_RENT_ID),
                    readonly(system),
                    readonly(system),
                    readonly(token),
                    readonly(associated_token),
                    readonly(associated_token),
                    readonly(token),
                    readonly(metaplex),
                    readonly(metaplex),
                    readonly(system),
                ]
            }
            IngleOperation::MintNft { payer, mint, .. } => {
                let collection_mint = addresses.collection_mint()?;
                vec![
                    signer(*payer),
                    signer(*mint),
                    writable(addresses.mint_authority()?),
                    writable(associated_token_address(payer, mint)?),
                    readonly(token),
                    readonly(SYSVAR_RENT_ID),
                    readonly(system),
                    writable(metadata_address(mint)?),
                    writable(addresses.minting_pool()?),
                    writable(addresses.general()?),
                    writable(addresses.nft_account(mint)?),
                    writable(master_edition_address(&collection_mint)?),
                    writable(master_edition_address(mint)?),
                    writable(collection_mint),
                    writable(metadata_address(&collection_mint)?),
                    readonly(system),
                    readonly(token),
                    readonly(system),
                    readonly(token),
                    readonly(associated_token),
                    readonly(token),
                    readonly(metaplex),
                    readonly(metaplex),
                    readonly(token),
                    readonly(metaplex),
                ]
            }
            IngleOperation::AllocateNft { payer, mint }
            | IngleOperation::DeallocateNft { payer, mint } => vec![
                signer(*payer),
                writable(*mint),
                writable(addresses.nft_account(mint)?),
                writable(associated_token_address(payer, mint)?),
                writable(addresses.general()?),
                writable(addresses.pd_pool()?),
                writable(addresses.minting_pool()?),
                readonly(system),
            ],
            IngleOperation::RegisterValidatorId { validator } => vec![
                signer(*validator),
                writable(addresses.general()?),
                writable(TEAM_ACCOUNT),
                writable(addresses.validator_id_registry(validator)?),
                readonly(system),
                readonly(system),
            ],
            IngleOperation::CreateValidatorSelectionProposal { payer, numeration } => vec![
                signer(*payer),
                writable(addresses.general()?),
                writable(addresses.validator_proposal(*numeration)?),
                readonly(system),
            ],
            IngleOperation::VoteValidatorProposal {
                payer,
                numeration,
                mints,
                ..
            } => {
                let mut accounts = vec![
                    signer(*payer),
                    writable(addresses.validator_proposal(*numeration)?),
                    writable(addresses.general()?),
                ];
                push_nft_triples(&mut accounts, addresses, payer, mints)?;
                accounts.push(readonly(system));
                accounts
            }
            IngleOperation::FinalizeProposal { payer, numeration } => vec![
                signer(*payer),
                writable(addresses.validator_proposal(*numeration)?),
                writable(addresses.general()?),
            ],
            IngleOperation::DelegateNft { payer, mint } => vec![
                signer(*payer),
                writable(addresses.vote_account()?),
                writable(addresses.config()?),
                writable(*mint),
                writable(addresses.nft_account(mint)?),
                writable(associated_token_address(payer, mint)?),
                writable(addresses.general()?),
                readonly(SYSVAR_CLOCK_ID),
                readonly(STAKE_CONFIG_PROGRAM_ID),
            ],
            IngleOperation::UndelegateNft { payer, mint } => {
                let vote_account = addresses.vote_account()?;
                vec![
                    signer(*payer),
                    writable(addresses.pd_pool()?),
                    writable(vote_account),
                    writable(addresses.config()?),
                    writable(*mint),
                    writable(addresses.nft_account(mint)?),
                    writable(associated_token_address(payer, mint)?),
                    writable(addresses.general()?),
                    readonly(system),
                    writable(addresses.authorized_withdrawer(&vote_account)?),
                    readonly(system),
                    readonly(STAKE_PROGRAM_ID),
                ]
            }
            IngleOperation::CreateVoteAccount {
                validator,
                numeration,
            } => {
                let vote_account = addresses.vote_account()?;
                vec![
                    signer(*validator),
                    writable(vote_account),
                    readonly(SYSVAR_RENT_ID),
                    readonly(SYSVAR_CLOCK_ID),
                    writable(addresses.general()?),
                    writable(addresses.validator_proposal(*numeration)?),
                    readonly(system),
                    readonly(token),
                    writable(addresses.config()?),
                    writable(addresses.stake_account(&vote_account)?),
                    writable(addresses.pd_pool()?),
                    readonly(SYSVAR_STAKE_HISTORY_ID),
                    readonly(STAKE_CONFIG_PROGRAM_ID),
                    readonly(system),
                    readonly(VOTE_PROGRAM_ID),
                    readonly(VOTE_PROGRAM_ID),
                    readonly(system),
                    readonly(STAKE_PROGRAM_ID),
                ]
            }
            IngleOperation::CloseProposal { payer, numeration } => vec![
                signer(*payer),
                writable(addresses.general()?),
                writable(addresses.config()?),
                readonly(addresses.validator_proposal(*numeration)?),
            ],
            IngleOperation::InitRebalance { payer, validator } => {
                let vote_account = addresses.vote_account()?;
                vec![
                    signer(*payer),
                    writable(vote_account),
                    signer(*validator),
                    writable(addresses.t_stake_account(&vote_account)?),
                    writable(addresses.pd_pool()?),
                    writable(addresses.general()?),
                    writable(addresses.config()?),
                    readonly(SYSVAR_CLOCK_ID),
                    readonly(SYSVAR_RENT_ID),
                    writable(addresses.stake_account(&vote_account)?),
                    writable(addresses.t_withdraw_account(&vote_account)?),
                    readonly(system),
                    readonly(STAKE_PROGRAM_ID),
                    readonly(system),
                    readonly(system),
                    readonly(STAKE_PROGRAM_ID),
                    readonly(STAKE_PROGRAM_ID),
                ]
            }
            IngleOperation::FinalizeRebalance { payer, validator } => {
                let vote_account = addresses.vote_account()?;
                vec![
                    signer(*payer),
                    writable(vote_account),
                    signer(*validator),
                    writable(addresses.t_stake_account(&vote_account)?),
                    writable(addresses.pd_pool()?),
                    writable(addresses.config()?),
                    readonly(SYSVAR_CLOCK_ID),
                    writable(addresses.stake_account(&vote_account)?),
                    writable(addresses.t_withdraw_account(&vote_account)?),
                    readonly(SYSVAR_STAKE_HISTORY_ID),
                    readonly(STAKE_PROGRAM_ID),
                    readonly(STAKE_PROGRAM_ID),
                    readonly(STAKE_PROGRAM_ID),
                ]
            }
            IngleOperation::ProcessRewards { payer, validator } => {
                let vote_account = addresses.vote_account()?;
                vec![
                    signer(*payer),
                    writable(*validator),
                    writable(vote_account),
                    writable(addresses.config()?),
                    writable(addresses.authorized_withdrawer(&vote_account)?),
                    writable(TEAM_ACCOUNT),
                    writable(addresses.general()?),
                    readonly(VOTE_PROGRAM_ID),
                    readonly(system),
                    readonly(system),
                    readonly(system),
                ]
            }
            IngleOperation::NftWithdraw {
                payer,
                validator,
                mints,
            } => {
                let vote_account = addresses.vote_account()?;
                let mut accounts = vec![
                    signer(*payer),
                    writable(vote_account),
                    writable(*validator),
                    writable(addresses.config()?),
                    writable(addresses.authorized_withdrawer(&vote_account)?),
                ];
                // Token account comes before its mint here, unlike the voting tables.
                for mint in mints {
                    accounts.push(readonly(associated_token_address(payer, mint)?));
                    accounts.push(readonly(*mint));
                    accounts.push(writable(addresses.nft_account(mint)?));
                }
                accounts.push(readonly(system));
                accounts
            }
            IngleOperation::InjectTestingData { payer, mints } => {
                let vote_account = addresses.vote_account()?;
                let mut accounts = vec![
                    signer(*payer),
                    writable(vote_account),
                    writable(addresses.config()?),
                    writable(addresses.authorized_withdrawer(&vote_account)?),
                ];
                for mint in mints {
                    accounts.push(readonly(*mint));
                    accounts.push(writable(addresses.nft_account(mint)?));
                }
                accounts.push(readonly(system));
                accounts
            }
            IngleOperation::CreateProgramUpgradeProposal {
                payer,
                buffer,
                numeration,
                ..
            } => vec![
                signer(*payer),
                writable(TEAM_ACCOUNT),
                writable(*buffer),
                writable(addresses.upgrade_proposal(*numeration)?),
                writable(addresses.general()?),
                readonly(system),
                readonly(system),
            ],
            IngleOperation::VoteProgramUpgradeProposal {
                validator,
                numeration,
                ..
            } => vec![
                writable(addresses.upgrade_proposal(*numeration)?),
                readonly(addresses.vote_account()?),
                signer(*validator),
                readonly(addresses.config()?),
            ],
            IngleOperation::FinalizeProgramUpgradeProposal {
                payer,
                numeration,
                buffer,
            } => vec![
                signer(*payer),
                writable(*addresses.program_id()),
                writable(*buffer),
                writable(addresses.program_authority()?),
                signer(TEAM_ACCOUNT),
                writable(addresses.program_data()?),
                readonly(SYSVAR_RENT_ID),
                readonly(SYSVAR_CLOCK_ID),
                writable(addresses.upgrade_proposal(*numeration)?),
                writable(addresses.general()?),
                writable(BPF_LOADER_UPGRADEABLE_ID),
            ],
            IngleOperation::CreateGovernance {
                payer, numeration, ..
            } => vec![
                signer(*payer),
                writable(addresses.general()?),
                readonly(addresses.config()?),
                writable(addresses.governance_proposal(*numeration)?),
                readonly(system),
            ],
            IngleOperation::VoteGovernance {
                payer,
                numeration,
                mints,
                ..
            } => {
                let mut accounts = vec![
                    signer(*payer),
                    writable(addresses.governance_proposal(*numeration)?),
                    readonly(addresses.general()?),
                ];
                push_nft_triples(&mut accounts, addresses, payer, mints)?;
                accounts.push(readonly(system));
                accounts
            }
            IngleOperation::FinalizeGovernance { payer, numeration } => vec![
                signer(*payer),
                writable(addresses.governance_proposal(*numeration)?),
                writable(addresses.general()?),
                writable(addresses.config()?),
            ],
        };
        Ok(accounts)
    }

    /// Builds the instructions for one transaction: an optional compute budget
    /// directive followed by the Ingl instruction.
    pub fn instructions(
        &self,
        addresses: &InglAddresses,
        log_level: u8,
    ) -> Result<Vec<Instruction>, TransactionError> {
        let data = self.instruction_data(log_level)?.encode()?;
        let accounts = self.accounts(addresses)?;

        let mut instructions = Vec::with_capacity(2);
        if let Some(units) = self.compute_unit_limit() {
            instructions.push(
                ComputeBudgetInstruction::SetComputeUnitLimit(units)
                    .into_instruction(&self.fee_payer())?,
            );
        }
        instructions.push(Instruction {
            program_id: *addresses.program_id(),
            accounts,
            data,
        });
        Ok(instructions)
    }
}

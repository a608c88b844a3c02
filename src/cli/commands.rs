//! Command handlers: resolve on-chain inputs, build the operation, submit it.

use color_eyre::eyre::{eyre, Result};
use log::info;
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use std::{path::Path, str::FromStr};

use super::{
    CliContext, Command, ConfigSubcommand, GovernanceChange, LedgerSubcommand, ProposalArg,
    RebalanceArg, ValidatorArg,
};
use crate::{
    config::{CliConfig, ConfigKey, ConfigOverrides},
    constants::{PROPOSAL_SEARCH_LIMIT, TEAM_ACCOUNT},
    domain::{AddressRole, IngleOperation, InglAddresses, ProposalKind, ProposalRef},
    models::{GovernanceType, SignerSource, VoteAccountGovernance},
    services::{LedgerService, LocalSigner, SolanaProviderTrait, SolanaSignTrait, SolanaSigner},
    utils::parse_config_change,
};

/// Handles commands that never touch the network.
pub fn run_config(command: &ConfigSubcommand, path: &Path) -> Result<()> {
    let mut config = CliConfig::load(path)?;
    match command {
        ConfigSubcommand::Get { key } => {
            let resolved = config.resolve(&ConfigOverrides::default())?;
            let keys = match key {
                Some(key) => vec![ConfigKey::from_str(key)?],
                None => ConfigKey::ALL.to_vec(),
            };
            for key in keys {
                let value = match (config.get(key), key) {
                    (Some(value), _) => value.to_string(),
                    (None, ConfigKey::ProgramId) => format!("{} (default)", resolved.program_id),
                    (None, ConfigKey::Network) => format!("{} (default)", resolved.rpc_url),
                    (None, ConfigKey::KeypairPath) => {
                        format!("{} (default)", resolved.keypair_path)
                    }
                };
                println!("{key}: {value}");
            }
        }
        ConfigSubcommand::Set { key, value } => {
            let key = ConfigKey::from_str(key)?;
            config.set(key, value)?;
            config.save(path)?;
            info!("Saved {} to {}", key, path.display());
            println!("{key}: {value}");
        }
    }
    Ok(())
}

pub fn run_ledger(command: &LedgerSubcommand) -> Result<()> {
    match command {
        LedgerSubcommand::List { limit, page } => {
            let ledger = LedgerService::connect()?;
            for (account, address) in ledger.list_addresses(*limit, *page)? {
                println!("Ledger://{account}  {address}");
            }
        }
    }
    Ok(())
}

pub fn run_address(program_id: &Pubkey, role: Option<AddressRole>) -> Result<()> {
    let addresses = InglAddresses::new(*program_id);
    let roles = match role {
        Some(role) => vec![role],
        None => AddressRole::ALL.to_vec(),
    };
    for role in roles {
        println!("{role}: {}", addresses.role(role)?);
    }
    Ok(())
}

async fn pubkey_of(signer: &SolanaSigner) -> Result<Pubkey> {
    Ok(signer.pubkey().await?)
}

impl<P: SolanaProviderTrait> CliContext<P> {
    async fn validator_proposal(&self, proposal: &ProposalArg) -> Result<u32> {
        match proposal.proposal {
            Some(proposal) => Ok(proposal.resolve(
                &self.addresses,
                ProposalKind::ValidatorSelection,
                PROPOSAL_SEARCH_LIMIT,
            )?),
            None => Ok(self.reader().latest_proposal_numeration().await?),
        }
    }

    async fn validator_identity(&self, validator: &ValidatorArg) -> Result<Pubkey> {
        match validator.validator {
            Some(validator) => Ok(validator),
            None => {
                let config = self.reader().validator_config().await?;
                Ok(Pubkey::new_from_array(config.validator_id))
            }
        }
    }

    /// Rebalancing validator. A `--validator-keypair` signer is added to
    /// `signers`; otherwise the fee payer has to be the validator.
    async fn rebalance_validator(
        &self,
        arg: &RebalanceArg,
        signers: &mut Vec<SolanaSigner>,
    ) -> Result<Pubkey> {
        match &arg.validator_keypair {
            Some(source) => {
                let signer = self.signer(source)?;
                let validator = pubkey_of(&signer).await?;
                signers.push(signer);
                Ok(validator)
            }
            None => self.validator_identity(&arg.validator).await,
        }
    }

    /// Address of an NFT mint given as an address, keypair file or Ledger account.
    async fn mint_address(&self, source: &SignerSource) -> Result<Pubkey> {
        match source {
            SignerSource::Pubkey(mint) => Ok(*mint),
            _ => pubkey_of(&self.signer(source)?).await,
        }
    }

    async fn mint_addresses(&self, sources: &[SignerSource]) -> Result<Vec<Pubkey>> {
        let mut mints = Vec::with_capacity(sources.len());
        for source in sources {
            mints.push(self.mint_address(source).await?);
        }
        Ok(mints)
    }

    fn resolve(&self, proposal: &ProposalRef, kind: ProposalKind) -> Result<u32> {
        Ok(proposal.resolve(&self.addresses, kind, PROPOSAL_SEARCH_LIMIT)?)
    }

    /// Runs a command that submits a transaction.
    pub async fn run(&self, command: Command) -> Result<()> {
        let payer_signer = self.payer()?;
        let payer = pubkey_of(&payer_signer).await?;
        let mut signers = vec![payer_signer];

        let operation = match command {
            Command::Init => IngleOperation::InglInit { payer },
            Command::Mint { class } => {
                let mint = Keypair::new();
                println!("Mint: {}", mint.pubkey());
                let operation = IngleOperation::MintNft {
                    payer,
                    mint: mint.pubkey(),
                    class,
                };
                signers.push(SolanaSigner::Local(LocalSigner::new(mint)));
                operation
            }
            Command::Allocate { mint } => IngleOperation::AllocateNft {
                payer,
                mint: self.mint_address(&mint).await?,
            },
            Command::Deallocate { mint } => IngleOperation::DeallocateNft {
                payer,
                mint: self.mint_address(&mint).await?,
            },
            Command::Delegate { mint } => IngleOperation::DelegateNft {
                payer,
                mint: self.mint_address(&mint).await?,
            },
            Command::Undelegate { mint } => IngleOperation::UndelegateNft {
                payer,
                mint: self.mint_address(&mint).await?,
            },
            Command::RegisterValidator { validator } => {
                let signer = self.signer(&validator)?;
                let validator = pubkey_of(&signer).await?;
                signers.push(signer);
                IngleOperation::RegisterValidatorId { validator }
            }
            Command::CreateValidatorProposal => IngleOperation::CreateValidatorSelectionProposal {
                payer,
                numeration: self.reader().next_proposal_numeration().await?,
            },
            Command::VoteValidator {
                validator_index,
                mints,
                proposal,
            } => IngleOperation::VoteValidatorProposal {
                payer,
                numeration: self.validator_proposal(&proposal).await?,
                mints: self.mint_addresses(&mints).await?,
                validator_index,
            },
            Command::FinalizeProposal { proposal } => IngleOperation::FinalizeProposal {
                payer,
                numeration: self.validator_proposal(&proposal).await?,
            },
            Command::CloseProposal { proposal } => IngleOperation::CloseProposal {
                payer,
                numeration: self.validator_proposal(&proposal).await?,
            },
            Command::CreateVoteAccount {
                validator_keypair,
                proposal,
            } => {
                let validator = match validator_keypair {
                    Some(source) => {
                        let signer = self.signer(&source)?;
                        let validator = pubkey_of(&signer).await?;
                        signers.push(signer);
                        validator
                    }
                    None => payer,
                };
                IngleOperation::CreateVoteAccount {
                    validator,
                    numeration: self.validator_proposal(&proposal).await?,
                }
            }
            Command::InitRebalance(arg) => IngleOperation::InitRebalance {
                payer,
                validator: self.rebalance_validator(&arg, &mut signers).await?,
            },
            Command::FinalizeRebalance(arg) => IngleOperation::FinalizeRebalance {
                payer,
                validator: self.rebalance_validator(&arg, &mut signers).await?,
            },
            Command::ProcessRewards(validator) => IngleOperation::ProcessRewards {
                payer,
                validator: self.validator_identity(&validator).await?,
            },
            Command::NftWithdraw { mints, validator } => IngleOperation::NftWithdraw {
                payer,
                validator: self.validator_identity(&validator).await?,
                mints: self.mint_addresses(&mints).await?,
            },
            Command::InjectTestingData { mints } => IngleOperation::InjectTestingData {
                payer,
                mints: self.mint_addresses(&mints).await?,
            },
            Command::CreateUpgradeProposal { buffer, code_link } => {
                let numeration = self
                    .reader()
                    .next_free_numeration(ProposalKind::ProgramUpgrade, PROPOSAL_SEARCH_LIMIT)
                    .await?;
                println!("Upgrade proposal: {numeration}");
                println!("Code link: {code_link}");
                IngleOperation::CreateProgramUpgradeProposal {
                    payer,
                    buffer,
                    numeration,
                    code_link,
                }
            }
            Command::VoteUpgradeProposal {
                vote,
                proposal,
                validator_proposal,
            } => {
                let validator_proposal_numeration = match validator_proposal {
                    Some(proposal) => self.resolve(&proposal, ProposalKind::ValidatorSelection)?,
                    None => self.reader().latest_proposal_numeration().await?,
                };
                IngleOperation::VoteProgramUpgradeProposal {
                    validator: payer,
                    numeration: self.resolve(&proposal, ProposalKind::ProgramUpgrade)?,
                    vote,
                    validator_proposal_numeration,
                }
            }
            Command::FinalizeUpgradeProposal {
                proposal,
                team_keypair,
            } => {
                let team = self.signer(&team_keypair)?;
                let team_key = pubkey_of(&team).await?;
                if team_key != TEAM_ACCOUNT {
                    return Err(eyre!(
                        "{team_keypair} is {team_key}, not the Ingl team account {TEAM_ACCOUNT}"
                    ));
                }
                signers.push(team);
                let numeration = self.resolve(&proposal, ProposalKind::ProgramUpgrade)?;
                let upgrade = self.reader().upgrade_proposal(numeration).await?;
                IngleOperation::FinalizeProgramUpgradeProposal {
                    payer,
                    numeration,
                    buffer: Pubkey::new_from_array(upgrade.buffer_address),
                }
            }
            Command::CreateGovernance(change) => {
                let governance_type = match change {
                    GovernanceChange::Config { field, value } => GovernanceType::ConfigAccount(
                        parse_config_change(&field, &value).map_err(|e| eyre!(e))?,
                    ),
                    GovernanceChange::ProgramUpgrade { buffer, code_link } => {
                        GovernanceType::program_upgrade(&buffer, code_link)
                    }
                    GovernanceChange::ValidatorId { validator } => {
                        GovernanceType::VoteAccountGovernance(VoteAccountGovernance::ValidatorId(
                            validator.to_bytes(),
                        ))
                    }
                    GovernanceChange::Commission { commission } => {
                        GovernanceType::VoteAccountGovernance(VoteAccountGovernance::Commission(
                            commission,
                        ))
                    }
                };
                let numeration = self
                    .reader()
                    .next_free_numeration(ProposalKind::Governance, PROPOSAL_SEARCH_LIMIT)
                    .await?;
                println!("Governance proposal: {numeration}");
                IngleOperation::CreateGovernance {
                    payer,
                    numeration,
                    governance_type,
                }
            }
            Command::VoteGovernance {
                proposal,
                vote,
                mints,
            } => IngleOperation::VoteGovernance {
                payer,
                numeration: self.resolve(&proposal, ProposalKind::Governance)?,
                vote,
                mints: self.mint_addresses(&mints).await?,
            },
            Command::FinalizeGovernance { proposal } => IngleOperation::FinalizeGovernance {
                payer,
                numeration: self.resolve(&proposal, ProposalKind::Governance)?,
            },
            Command::Config(_) | Command::Address { .. } | Command::Ledger(_) => {
                return Err(eyre!("command does not submit a transaction"));
            }
        };

        self.execute(operation, &signers).await?;
        Ok(())
    }
}

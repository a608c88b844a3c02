//! Program derived addresses used by Ingl instructions.
//!
//! Every address here is a pure function of its seeds and owning program, so
//! callers recompute them on demand instead of caching.

use solana_sdk::pubkey::Pubkey;
use std::{fmt, str::FromStr};

use crate::{
    constants::{
        associated_token_program_id, metaplex_program_id, token_program_id,
        AUTHORIZED_WITHDRAWER_KEY, BPF_LOADER_UPGRADEABLE_ID, COLLECTION_HOLDER_KEY, EDITION_SEED,
        GENERAL_ACCOUNT_SEED, INGL_CONFIG_SEED, INGL_MINTING_POOL_KEY, INGL_MINT_AUTHORITY_KEY,
        INGL_NFT_COLLECTION_KEY, INGL_PROGRAM_AUTHORITY_KEY, INGL_PROPOSAL_KEY, MAX_SEEDS,
        MAX_SEED_LEN, METADATA_SEED, NFT_ACCOUNT_CONST, PD_POOL_ACCOUNT_KEY, STAKE_ACCOUNT_KEY,
        T_STAKE_ACCOUNT_KEY, T_WITHDRAW_KEY, UPGRADE_PROPOSAL_KEY, URIS_ACCOUNT_SEED,
        VALIDATOR_ID_SEED, VALIDATOR_PROPOSAL_KEY, VOTE_ACCOUNT_KEY,
    },
    models::DerivationError,
};

/// Finds the first off-curve address for `seeds` under `program_id`, trying
/// bump seeds from 255 down to 0.
///
/// The bump occupies one seed slot, so at most `MAX_SEEDS - 1` seeds may be
/// supplied.
pub fn derive_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), DerivationError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(DerivationError::TooManySeeds {
            count: seeds.len(),
            max: MAX_SEEDS - 1,
        });
    }
    if let Some((index, seed)) = seeds
        .iter()
        .enumerate()
        .find(|(_, seed)| seed.len() > MAX_SEED_LEN)
    {
        return Err(DerivationError::SeedTooLong {
            index,
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut seeds_with_bump: Vec<&[u8]> = seeds.to_vec();
        seeds_with_bump.push(&bump_seed);
        if let Ok(address) = Pubkey::create_program_address(&seeds_with_bump, program_id) {
            return Ok((address, bump));
        }
    }

    Err(DerivationError::Exhausted {
        program_id: *program_id,
    })
}

fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, DerivationError> {
    derive_address(seeds, program_id).map(|(address, _)| address)
}

/// Associated token account holding `mint` for `owner`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey, DerivationError> {
    derive(
        &[
            owner.as_ref(),
            token_program_id().as_ref(),
            mint.as_ref(),
        ],
        &associated_token_program_id(),
    )
}

/// Metaplex metadata account of `mint`.
pub fn metadata_address(mint: &Pubkey) -> Result<Pubkey, DerivationError> {
    let metaplex = metaplex_program_id();
    derive(&[METADATA_SEED, metaplex.as_ref(), mint.as_ref()], &metaplex)
}

/// Metaplex master edition account of `mint`.
pub fn master_edition_address(mint: &Pubkey) -> Result<Pubkey, DerivationError> {
    let metaplex = metaplex_program_id();
    derive(
        &[METADATA_SEED, metaplex.as_ref(), mint.as_ref(), EDITION_SEED],
        &metaplex,
    )
}

/// Program data account of an upgradeable program.
pub fn program_data_address(program_id: &Pubkey) -> Result<Pubkey, DerivationError> {
    derive(&[program_id.as_ref()], &BPF_LOADER_UPGRADEABLE_ID)
}

/// Singleton accounts owned by the Ingl program, derived from a fixed seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressRole {
    Config,
    Uris,
    General,
    CollectionMint,
    MintAuthority,
    CollectionHolder,
    MintingPool,
    VoteAccount,
    PdPool,
    ProgramAuthority,
}

impl AddressRole {
    pub const ALL: [AddressRole; 10] = [
        AddressRole::Config,
        AddressRole::Uris,
        AddressRole::General,
        AddressRole::CollectionMint,
        AddressRole::MintAuthority,
        AddressRole::CollectionHolder,
        AddressRole::MintingPool,
        AddressRole::VoteAccount,
        AddressRole::PdPool,
        AddressRole::ProgramAuthority,
    ];

    pub fn seed(&self) -> &'static [u8] {
        match self {
            AddressRole::Config => INGL_CONFIG_SEED,
            AddressRole::Uris => URIS_ACCOUNT_SEED,
            AddressRole::General => GENERAL_ACCOUNT_SEED,
            AddressRole::CollectionMint => INGL_NFT_COLLECTION_KEY,
            AddressRole::MintAuthority => INGL_MINT_AUTHORITY_KEY,
            AddressRole::CollectionHolder => COLLECTION_HOLDER_KEY,
            AddressRole::MintingPool => INGL_MINTING_POOL_KEY,
            AddressRole::VoteAccount => VOTE_ACCOUNT_KEY,
            AddressRole::PdPool => PD_POOL_ACCOUNT_KEY,
            AddressRole::ProgramAuthority => INGL_PROGRAM_AUTHORITY_KEY,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AddressRole::Config => "config",
            AddressRole::Uris => "uris",
            AddressRole::General => "general",
            AddressRole::CollectionMint => "collection-mint",
            AddressRole::MintAuthority => "mint-authority",
            AddressRole::CollectionHolder => "collection-holder",
            AddressRole::MintingPool => "minting-pool",
            AddressRole::VoteAccount => "vote-account",
            AddressRole::PdPool => "pd-pool",
            AddressRole::ProgramAuthority => "program-authority",
        }
    }
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AddressRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('_', "-");
        AddressRole::ALL
            .into_iter()
            .find(|role| role.name() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown account role '{s}', expected one of: {}",
                    AddressRole::ALL.map(|r| r.name()).join(", ")
                )
            })
    }
}

/// Derives the addresses owned by one deployment of the Ingl program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InglAddresses {
    program_id: Pubkey,
}

impl InglAddresses {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn role(&self, role: AddressRole) -> Result<Pubkey, DerivationError> {
        derive(&[role.seed()], &self.program_id)
    }

    pub fn config(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::Config)
    }

    pub fn general(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::General)
    }

    pub fn collection_mint(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::CollectionMint)
    }

    pub fn mint_authority(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::MintAuthority)
    }

    pub fn collection_holder(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::CollectionHolder)
    }

    pub fn minting_pool(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::MintingPool)
    }

    pub fn vote_account(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::VoteAccount)
    }

    pub fn pd_pool(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::PdPool)
    }

    pub fn program_authority(&self) -> Result<Pubkey, DerivationError> {
        self.role(AddressRole::ProgramAuthority)
    }

    /// Per-mint data account tracking an NFT's allocation and delegation.
    pub fn nft_account(&self, mint: &Pubkey) -> Result<Pubkey, DerivationError> {
        derive(&[NFT_ACCOUNT_CONST, mint.as_ref()], &self.program_id)
    }

    pub fn validator_proposal(&self, numeration: u32) -> Result<Pubkey, DerivationError> {
        derive(
            &[VALIDATOR_PROPOSAL_KEY, &numeration.to_be_bytes()],
            &self.program_id,
        )
    }

    pub fn governance_proposal(&self, numeration: u32) -> Result<Pubkey, DerivationError> {
        derive(
            &[INGL_PROPOSAL_KEY, &numeration.to_be_bytes()],
            &self.program_id,
        )
    }

    pub fn upgrade_proposal(&self, numeration: u32) -> Result<Pubkey, DerivationError> {
        derive(
            &[UPGRADE_PROPOSAL_KEY, &numeration.to_be_bytes()],
            &self.program_id,
        )
    }

    pub fn authorized_withdrawer(&self, vote_account: &Pubkey) -> Result<Pubkey, DerivationError> {
        derive(
            &[AUTHORIZED_WITHDRAWER_KEY, vote_account.as_ref()],
            &self.program_id,
        )
    }

    pub fn stake_account(&self, vote_account: &Pubkey) -> Result<Pubkey, DerivationError> {
        derive(
            &[STAKE_ACCOUNT_KEY, vote_account.as_ref()],
            &self.program_id,
        )
    }

    pub fn t_stake_account(&self, vote_account: &Pubkey) -> Result<Pubkey, DerivationError> {
        derive(
            &[T_STAKE_ACCOUNT_KEY, vote_account.as_ref()],
            &self.program_id,
        )
    }

    pub fn t_withdraw_account(&self, vote_account: &Pubkey) -> Result<Pubkey, DerivationError> {
        derive(&[T_WITHDRAW_KEY, vote_account.as_ref()], &self.program_id)
    }

    /// Marker account recording that `validator` registered its identity.
    pub fn validator_id_registry(&self, validator: &Pubkey) -> Result<Pubkey, DerivationError> {
        derive(&[VALIDATOR_ID_SEED, validator.as_ref()], &self.program_id)
    }

    pub fn program_data(&self) -> Result<Pubkey, DerivationError> {
        program_data_address(&self.program_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_INGL_PROGRAM_ID;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_vote_account_derivation_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let first = derive_address(&[b"vote_account"], &program_id).unwrap();
        let second = derive_address(&[b"vote_account"], &program_id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_matches_sdk_program_address_search() {
        let program_id = DEFAULT_INGL_PROGRAM_ID;
        for role in AddressRole::ALL {
            let expected = Pubkey::find_program_address(&[role.seed()], &program_id);
            assert_eq!(derive_address(&[role.seed()], &program_id).unwrap(), expected);
        }
    }

    #[test]
    fn test_associated_token_address_matches_known_layout() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let expected = Pubkey::find_program_address(
            &[
                owner.as_ref(),
                token_program_id().as_ref(),
                mint.as_ref(),
            ],
            &associated_token_program_id(),
        )
        .0;
        assert_eq!(associated_token_address(&owner, &mint).unwrap(), expected);
    }

    #[test]
    fn test_rejects_seed_longer_than_limit() {
        let long_seed = [7u8; 33];
        let err = derive_address(&[b"ok", &long_seed], &Pubkey::new_unique()).unwrap_err();
        assert_eq!(
            err,
            DerivationError::SeedTooLong {
                index: 1,
                len: 33,
                max: 32
            }
        );
    }

    #[test]
    fn test_rejects_too_many_seeds() {
        let seeds: Vec<&[u8]> = vec![&b"s"[..]; 16];
        let err = derive_address(&seeds, &Pubkey::new_unique()).unwrap_err();
        assert_eq!(err, DerivationError::TooManySeeds { count: 16, max: 15 });
        let seeds: Vec<&[u8]> = vec![&b"s"[..]; 15];
        assert!(derive_address(&seeds, &Pubkey::new_unique()).is_ok());
    }

    #[test]
    fn test_named_roles_do_not_collide() {
        let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
        let vote = addresses.vote_account().unwrap();
        let mint = Pubkey::new_unique();
        let validator = Pubkey::new_unique();

        let mut derived: Vec<Pubkey> = AddressRole::ALL
            .iter()
            .map(|role| addresses.role(*role).unwrap())
            .collect();
        derived.extend([
            addresses.nft_account(&mint).unwrap(),
            addresses.validator_proposal(0).unwrap(),
            addresses.governance_proposal(0).unwrap(),
            addresses.upgrade_proposal(0).unwrap(),
            addresses.authorized_withdrawer(&vote).unwrap(),
            addresses.stake_account(&vote).unwrap(),
            addresses.t_stake_account(&vote).unwrap(),
            addresses.t_withdraw_account(&vote).unwrap(),
            addresses.validator_id_registry(&validator).unwrap(),
            addresses.program_data().unwrap(),
        ]);

        let unique: HashSet<_> = derived.iter().collect();
        assert_eq!(unique.len(), derived.len());
    }

    #[test]
    fn test_proposal_numeration_is_big_endian() {
        let addresses = InglAddresses::new(Pubkey::new_unique());
        let expected = Pubkey::find_program_address(
            &[INGL_PROPOSAL_KEY, &[0, 0, 1, 0]],
            addresses.program_id(),
        )
        .0;
        assert_eq!(addresses.governance_proposal(256).unwrap(), expected);
    }

    #[test]
    fn test_address_role_parsing() {
        assert_eq!(
            "vote_account".parse::<AddressRole>().unwrap(),
            AddressRole::VoteAccount
        );
        assert_eq!("General".parse::<AddressRole>().unwrap(), AddressRole::General);
        assert!("treasury".parse::<AddressRole>().is_err());
        for role in AddressRole::ALL {
            assert_eq!(role.to_string().parse::<AddressRole>().unwrap(), role);
        }
    }

    proptest! {
        #[test]
        fn prop_derivation_matches_sdk(
            seed in proptest::collection::vec(any::<u8>(), 0..=32),
            program in any::<[u8; 32]>(),
        ) {
            let program_id = Pubkey::new_from_array(program);
            let ours = derive_address(&[&seed[..]], &program_id).unwrap();
            let sdk = Pubkey::find_program_address(&[&seed[..]], &program_id);
            prop_assert_eq!(ours, sdk);
        }

        #[test]
        fn prop_distinct_numerations_give_distinct_proposals(a in any::<u32>(), b in any::<u32>()) {
            prop_assume!(a != b);
            let addresses = InglAddresses::new(DEFAULT_INGL_PROGRAM_ID);
            prop_assert_ne!(
                addresses.validator_proposal(a).unwrap(),
                addresses.validator_proposal(b).unwrap()
            );
        }
    }
}

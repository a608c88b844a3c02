//! Command line argument parsers.
//!
//! Each parser tries its accepted forms in a fixed order and returns a
//! `String` error so it can be used directly as a clap value parser.

use solana_sdk::pubkey::Pubkey;
use std::{path::PathBuf, str::FromStr};

use crate::{
    constants::LEDGER_URI_PREFIX,
    domain::ProposalRef,
    models::{ConfigAccountType, SignerSource},
};

pub fn parse_pubkey(input: &str) -> Result<Pubkey, String> {
    Pubkey::from_str(input).map_err(|e| format!("Invalid public key '{input}': {e}"))
}

/// Parses a signer: `Ledger://<account>`, then a bare address, then the path
/// of an existing keypair file.
pub fn parse_signer_source(input: &str) -> Result<SignerSource, String> {
    if let Some(account) = input.strip_prefix(LEDGER_URI_PREFIX) {
        let account = account
            .parse::<u32>()
            .map_err(|_| format!("Invalid Ledger account index in '{input}'"))?;
        return Ok(SignerSource::Ledger { account });
    }

    if let Ok(pubkey) = Pubkey::from_str(input) {
        return Ok(SignerSource::Pubkey(pubkey));
    }

    let path = PathBuf::from(input);
    if path.is_file() {
        return Ok(SignerSource::Filepath(path));
    }

    Err(format!(
        "'{input}' is not a Ledger URI ({LEDGER_URI_PREFIX}<account>), a public key or an existing keypair file"
    ))
}

/// `approve|a|yes|y` is a vote for, `disapprove|dissaprove|d|no|n` a vote against.
pub fn parse_vote(input: &str) -> Result<bool, String> {
    match input.to_lowercase().as_str() {
        "approve" | "a" | "yes" | "y" => Ok(true),
        "disapprove" | "dissaprove" | "d" | "no" | "n" => Ok(false),
        _ => Err(format!(
            "Invalid vote '{input}', expected [a]pprove, [d]isapprove, [y]es or [n]o"
        )),
    }
}

/// Parses a proposal given by numeration, falling back to its account address.
pub fn parse_proposal(input: &str) -> Result<ProposalRef, String> {
    if let Ok(numeration) = input.parse::<u32>() {
        return Ok(ProposalRef::Numeration(numeration));
    }
    Pubkey::from_str(input)
        .map(ProposalRef::Address)
        .map_err(|_| format!("Invalid proposal '{input}', expected a numeration or an address"))
}

/// Builds the config change proposed by a governance vote from a field name and value.
pub fn parse_config_change(field: &str, value: &str) -> Result<ConfigAccountType, String> {
    fn number<T: FromStr>(field: &str, value: &str) -> Result<T, String> {
        value
            .parse::<T>()
            .map_err(|_| format!("Invalid value '{value}' for {field}"))
    }

    let change = match field.to_lowercase().replace('-', "_").as_str() {
        "max_primary_stake" => ConfigAccountType::MaxPrimaryStake(number(field, value)?),
        "nft_holders_share" => ConfigAccountType::NftHolderShare(number(field, value)?),
        "initial_redemption_fee" => ConfigAccountType::InitialRedemptionFee(number(field, value)?),
        "redemption_fee_duration" => {
            ConfigAccountType::RedemptionFeeDuration(number(field, value)?)
        }
        "validator_name" => ConfigAccountType::ValidatorName(value.to_string()),
        "twitter_handle" => ConfigAccountType::TwitterHandle(value.to_string()),
        "discord_invite" => ConfigAccountType::DiscordInvite(value.to_string()),
        "website" => ConfigAccountType::Website(value.to_string()),
        _ => {
            return Err(format!(
                "Unknown config field '{field}', expected one of: max_primary_stake, nft_holders_share, \
                 initial_redemption_fee, redemption_fee_duration, validator_name, twitter_handle, \
                 discord_invite, website"
            ))
        }
    };
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::{write_keypair_file, Keypair};
    use tempfile::tempdir;

    #[test]
    fn test_parse_signer_source_ledger() {
        assert_eq!(
            parse_signer_source("Ledger://3").unwrap(),
            SignerSource::Ledger { account: 3 }
        );
        assert!(parse_signer_source("Ledger://").is_err());
        assert!(parse_signer_source("Ledger://-1").is_err());
    }

    #[test]
    fn test_parse_signer_source_pubkey_before_file() {
        let pubkey = Pubkey::new_unique();
        assert_eq!(
            parse_signer_source(&pubkey.to_string()).unwrap(),
            SignerSource::Pubkey(pubkey)
        );
    }

    #[test]
    fn test_parse_signer_source_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("id.json");
        write_keypair_file(&Keypair::new(), &path).unwrap();

        assert_eq!(
            parse_signer_source(path.to_str().unwrap()).unwrap(),
            SignerSource::Filepath(path.clone())
        );
        assert!(parse_signer_source(dir.path().join("missing.json").to_str().unwrap()).is_err());
    }

    #[test]
    fn test_parse_vote() {
        for input in ["approve", "A", "yes", "y"] {
            assert!(parse_vote(input).unwrap());
        }
        for input in ["disapprove", "dissaprove", "d", "NO", "n"] {
            assert!(!parse_vote(input).unwrap());
        }
        assert!(parse_vote("maybe").is_err());
    }

    #[test]
    fn test_parse_proposal() {
        assert_eq!(parse_proposal("12").unwrap(), ProposalRef::Numeration(12));
        let address = Pubkey::new_unique();
        assert_eq!(
            parse_proposal(&address.to_string()).unwrap(),
            ProposalRef::Address(address)
        );
        assert!(parse_proposal("not-a-proposal").is_err());
    }

    #[test]
    fn test_parse_config_change() {
        assert_eq!(
            parse_config_change("nft-holders-share", "60").unwrap(),
            ConfigAccountType::NftHolderShare(60)
        );
        assert_eq!(
            parse_config_change("website", "https://ingl.io").unwrap(),
            ConfigAccountType::Website("https://ingl.io".to_string())
        );
        assert!(parse_config_change("nft_holders_share", "300").is_err());
        assert!(parse_config_change("unknown", "1").is_err());
    }
}

//! Transaction lifecycle: unsigned request, anchored and signed request,
//! submission outcome.

use solana_sdk::{
    hash::Hash, instruction::Instruction, message::Message, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};

use crate::{constants::EXPLORER_TX_URL, models::SolanaTransactionStatus};

mod submitter;
pub use submitter::*;

/// Instructions for one transaction and the account paying for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedRequest {
    pub instructions: Vec<Instruction>,
    pub payer: Pubkey,
}

impl UnsignedRequest {
    pub fn new(instructions: Vec<Instruction>, payer: Pubkey) -> Self {
        Self {
            instructions,
            payer,
        }
    }

    pub(crate) fn compile(&self, blockhash: &Hash) -> Message {
        Message::new_with_blockhash(&self.instructions, Some(&self.payer), blockhash)
    }

    /// Accounts that must sign, payer first.
    pub fn required_signers(&self) -> Vec<Pubkey> {
        let message = self.compile(&Hash::default());
        let required = message.header.num_required_signatures as usize;
        message.account_keys.into_iter().take(required).collect()
    }
}

/// Recent blockhash scoping a transaction's validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Fully signed transaction and the anchor it was signed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub transaction: Transaction,
    pub anchor: Anchor,
}

impl SignedRequest {
    /// Fee payer signature, which identifies the transaction on-chain.
    pub fn signature(&self) -> Signature {
        self.transaction
            .signatures
            .first()
            .copied()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub signature: Signature,
    pub status: SolanaTransactionStatus,
    pub explorer_url: String,
}

/// Explorer link for a signature; `cluster_suffix` is e.g. `?cluster=devnet`.
pub fn explorer_url(signature: &Signature, cluster_suffix: &str) -> String {
    format!("{EXPLORER_TX_URL}/{signature}{cluster_suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;

    #[test]
    fn test_required_signers_payer_first() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let readonly = Pubkey::new_unique();
        let instruction = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[0],
            vec![
                AccountMeta::new_readonly(readonly, false),
                AccountMeta::new(mint, true),
            ],
        );
        let request = UnsignedRequest::new(vec![instruction], payer);
        assert_eq!(request.required_signers(), vec![payer, mint]);
    }

    #[test]
    fn test_explorer_url() {
        let signature = Signature::from([1u8; 64]);
        assert_eq!(
            explorer_url(&signature, "?cluster=devnet"),
            format!("https://explorer.solana.com/tx/{signature}?cluster=devnet")
        );
        assert!(!explorer_url(&signature, "").contains('?'));
    }
}

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::{constants::COMPUTE_BUDGET_PROGRAM_ID, models::InstructionError};

/// Directives understood by the compute budget program.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeBudgetInstruction {
    RequestUnitsDeprecated { units: u32, additional_fee: u32 },
    RequestHeapFrame(u32),
    SetComputeUnitLimit(u32),
    SetComputeUnitPrice(u64),
}

impl ComputeBudgetInstruction {
    /// Builds the directive with the payer attached as a read-only signer.
    pub fn into_instruction(self, payer: &Pubkey) -> Result<Instruction, InstructionError> {
        let data = borsh::to_vec(&self).map_err(|e| InstructionError::Encoding {
            variant: "ComputeBudgetInstruction",
            reason: e.to_string(),
        })?;
        Ok(Instruction {
            program_id: COMPUTE_BUDGET_PROGRAM_ID,
            accounts: vec![AccountMeta::new_readonly(*payer, true)],
            data,
        })
    }
}

//! Deterministic addresses for every account the hook owns.
//!
//! All hook state is reached through these functions; nothing is addressed by
//! a caller-chosen identifier.

use anchor_lang::prelude::*;

use crate::constants::{DECLARATION_SEED, ENTRY_SEED, REGISTRY_SEED};
use crate::error::WhitelistError;

/// Derives a program address, failing when no bump yields an off-curve point.
pub fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or_else(|| error!(WhitelistError::InvalidDerivation))
}

pub fn find_registry_address(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[REGISTRY_SEED], program_id)
}

pub fn find_entry_address(owner: &Pubkey, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[ENTRY_SEED, owner.as_ref()], program_id)
}

pub fn find_declaration_address(mint: &Pubkey, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[DECLARATION_SEED, mint.as_ref()], program_id)
}

//! Transfer-time authorization.
//!
//! Runs inside the token program's transfer. Every supplied account is
//! re-derived and compared before it is trusted, and either party lacking an
//! entry aborts the transfer.

use anchor_lang::prelude::*;

use crate::access::{self, AccountView};
use crate::error::WhitelistError;
use crate::pda;

#[derive(Clone, Copy, Debug)]
pub struct HookInvocation<'a> {
    pub mint: Pubkey,
    pub source_owner: Pubkey,
    pub destination_owner: Pubkey,
    pub declaration: AccountView<'a>,
    pub registry: AccountView<'a>,
    pub source_entry: AccountView<'a>,
    pub destination_entry: AccountView<'a>,
}

fn check_party(
    entry: &AccountView,
    owner: &Pubkey,
    program_id: &Pubkey,
    missing: WhitelistError,
) -> Result<()> {
    let (expected, _) = pda::find_entry_address(owner, program_id)?;
    require_keys_eq!(entry.key, expected, WhitelistError::InvalidDerivation);
    if !access::entry_approves(entry, owner, program_id) {
        return Err(missing.into());
    }
    Ok(())
}

/// Source and destination are checked independently, even for the same owner.
pub fn authorize_transfer(invocation: &HookInvocation, program_id: &Pubkey) -> Result<()> {
    access::load_declaration(&invocation.declaration, &invocation.mint, program_id)?;

    let registry = access::load_registry(&invocation.registry, program_id)?;
    require_keys_eq!(registry.mint, invocation.mint, WhitelistError::InvalidToken);

    check_party(
        &invocation.source_entry,
        &invocation.source_owner,
        program_id,
        WhitelistError::SourceNotWhitelisted,
    )?;
    check_party(
        &invocation.destination_entry,
        &invocation.destination_owner,
        program_id,
        WhitelistError::DestinationNotWhitelisted,
    )
}

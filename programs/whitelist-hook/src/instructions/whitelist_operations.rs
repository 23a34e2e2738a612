use anchor_lang::prelude::*;

use crate::access;
use crate::constants::ENTRY_SEED;
use crate::events::{WhitelistAdded, WhitelistRemoved};
use crate::state::{Registry, WhitelistEntry};
use crate::utils::{close_pda_account, create_pda_account, write_account};

#[derive(Accounts)]
pub struct AddToWhitelist<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    /// CHECK: re-derived and deserialized by the handler
    pub registry: UncheckedAccount<'info>,

    /// CHECK: must sit at the entry address derived from the owner
    #[account(mut)]
    pub whitelist_entry: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RemoveFromWhitelist<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    /// CHECK: re-derived and deserialized by the handler
    pub registry: UncheckedAccount<'info>,

    /// CHECK: must sit at the entry address derived from the owner
    #[account(mut)]
    pub whitelist_entry: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

fn authorize_admin(registry: &AccountInfo<'_>, admin: &Pubkey) -> Result<Registry> {
    let registry = access::with_view(registry, |view| access::load_registry(view, &crate::ID))?;
    registry.assert_admin(admin)?;
    Ok(registry)
}

pub fn add(ctx: Context<AddToWhitelist>, owner: Pubkey) -> Result<()> {
    let admin = ctx.accounts.admin.to_account_info();
    authorize_admin(&ctx.accounts.registry, admin.key)?;

    let entry_info = ctx.accounts.whitelist_entry.to_account_info();
    let bump = access::with_view(&entry_info, |view| {
        access::ensure_entry_vacant(view, &owner, &crate::ID)
    })?;

    create_pda_account(
        &admin,
        &entry_info,
        &ctx.accounts.system_program.to_account_info(),
        8 + WhitelistEntry::INIT_SPACE,
        &[&[ENTRY_SEED, owner.as_ref(), &[bump]]],
    )?;
    write_account(&entry_info, &WhitelistEntry { owner, bump })?;

    emit!(WhitelistAdded {
        registry: ctx.accounts.registry.key(),
        owner,
        entry: entry_info.key(),
    });
    msg!("Owner added to whitelist: {}", owner);
    Ok(())
}

pub fn remove(ctx: Context<RemoveFromWhitelist>, owner: Pubkey) -> Result<()> {
    let admin = ctx.accounts.admin.to_account_info();
    authorize_admin(&ctx.accounts.registry, admin.key)?;

    let entry_info = ctx.accounts.whitelist_entry.to_account_info();
    access::with_view(&entry_info, |view| {
        access::ensure_entry_present(view, &owner, &crate::ID)
    })?;
    close_pda_account(&entry_info, &admin)?;

    emit!(WhitelistRemoved {
        registry: ctx.accounts.registry.key(),
        owner,
        entry: entry_info.key(),
    });
    msg!("Owner removed from whitelist: {}", owner);
    Ok(())
}

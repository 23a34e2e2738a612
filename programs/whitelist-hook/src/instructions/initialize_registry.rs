use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_2022::Token2022,
    token_interface::{Mint, TokenAccount},
};

use crate::access;
use crate::constants::REGISTRY_SEED;
use crate::events::RegistryInitialized;
use crate::state::Registry;
use crate::utils::{create_pda_account, write_account};

#[derive(Accounts)]
pub struct InitializeRegistry<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    /// CHECK: derived and created by the handler
    #[account(mut)]
    pub registry: UncheckedAccount<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        init_if_needed,
        payer = admin,
        associated_token::mint = mint,
        associated_token::authority = admin,
        associated_token::token_program = token_program,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token2022>,
    pub system_program: Program<'info, System>,
}

pub fn initialize(ctx: Context<InitializeRegistry>) -> Result<()> {
    let mint_info = ctx.accounts.mint.to_account_info();
    access::ensure_hooked_mint(&mint_info.try_borrow_data()?, &crate::ID)?;

    let registry_info = ctx.accounts.registry.to_account_info();
    let bump = access::with_view(&registry_info, |view| {
        access::ensure_registry_vacant(view, &crate::ID)
    })?;

    create_pda_account(
        &ctx.accounts.admin.to_account_info(),
        &registry_info,
        &ctx.accounts.system_program.to_account_info(),
        8 + Registry::INIT_SPACE,
        &[&[REGISTRY_SEED, &[bump]]],
    )?;

    let registry = Registry {
        admin: ctx.accounts.admin.key(),
        mint: ctx.accounts.mint.key(),
        vault: ctx.accounts.vault.key(),
        bump,
    };
    write_account(&registry_info, &registry)?;

    emit!(RegistryInitialized {
        registry: registry_info.key(),
        admin: registry.admin,
        mint: registry.mint,
        vault: registry.vault,
    });
    Ok(())
}

use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;
use spl_tlv_account_resolution::state::ExtraAccountMetaList;
use spl_transfer_hook_interface::instruction::ExecuteInstruction;

use crate::access;
use crate::constants::DECLARATION_SEED;
use crate::declaration::{self, LAYOUT_VERSION};
use crate::events::DeclarationInitialized;
use crate::utils::create_pda_account;

#[derive(Accounts)]
pub struct InitializeExtraAccountMetaList<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: derived from the mint and created by the handler
    #[account(mut)]
    pub extra_account_meta_list: UncheckedAccount<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_list(ctx: Context<InitializeExtraAccountMetaList>) -> Result<()> {
    let mint = ctx.accounts.mint.key();
    let mint_info = ctx.accounts.mint.to_account_info();
    access::ensure_hooked_mint(&mint_info.try_borrow_data()?, &crate::ID)?;

    let list_info = ctx.accounts.extra_account_meta_list.to_account_info();
    let bump = access::with_view(&list_info, |view| {
        access::ensure_declaration_vacant(view, &mint, &crate::ID)
    })?;

    let metas = declaration::extra_account_metas(&crate::ID)?;
    msg!(
        "Initializing ExtraAccountMetaList with {} extra account(s)",
        metas.len()
    );

    create_pda_account(
        &ctx.accounts.payer.to_account_info(),
        &list_info,
        &ctx.accounts.system_program.to_account_info(),
        ExtraAccountMetaList::size_of(metas.len())?,
        &[&[DECLARATION_SEED, mint.as_ref(), &[bump]]],
    )?;
    ExtraAccountMetaList::init::<ExecuteInstruction>(
        &mut list_info.try_borrow_mut_data()?,
        &metas,
    )?;

    emit!(DeclarationInitialized {
        mint,
        declaration: list_info.key(),
        layout_version: LAYOUT_VERSION,
        stored_accounts: metas.len() as u8,
    });
    Ok(())
}

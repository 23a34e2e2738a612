use anchor_lang::prelude::*;
use anchor_spl::{
    token_2022::spl_token_2022::{
        extension::{
            transfer_hook::TransferHookAccount, BaseStateWithExtensions, PodStateWithExtensions,
        },
        pod::PodAccount,
    },
    token_interface::{Mint, TokenAccount},
};

use crate::access::AccountView;
use crate::error::WhitelistError;
use crate::validator::{self, HookInvocation};

#[derive(Accounts)]
pub struct TransferHook<'info> {
    #[account(token::mint = mint)]
    pub source_token: InterfaceAccount<'info, TokenAccount>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(token::mint = mint)]
    pub destination_token: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: transfer authority, may be the owner or a delegate
    pub owner: UncheckedAccount<'info>,

    /// CHECK: re-derived from the mint by the validator
    pub extra_account_meta_list: UncheckedAccount<'info>,

    /// CHECK: re-derived by the validator
    pub registry: UncheckedAccount<'info>,

    /// CHECK: re-derived from the source owner by the validator
    pub source_entry: UncheckedAccount<'info>,

    /// CHECK: re-derived from the destination owner by the validator
    pub destination_entry: UncheckedAccount<'info>,
}

fn check_is_transferring(source_token: &AccountInfo<'_>) -> Result<()> {
    let data = source_token.try_borrow_data()?;
    let account = PodStateWithExtensions::<PodAccount>::unpack(&data)?;
    let extension = account.get_extension::<TransferHookAccount>()?;

    require!(
        bool::from(extension.transferring),
        WhitelistError::NotTransferring
    );
    Ok(())
}

fn view<'a>(info: &AccountInfo<'_>, data: &'a [u8]) -> AccountView<'a> {
    AccountView::new(*info.key, *info.owner, data)
}

pub fn execute(ctx: Context<TransferHook>, amount: u64) -> Result<()> {
    let accounts = &ctx.accounts;
    check_is_transferring(&accounts.source_token.to_account_info())?;

    let declaration = accounts.extra_account_meta_list.try_borrow_data()?;
    let registry = accounts.registry.try_borrow_data()?;
    let source_entry = accounts.source_entry.try_borrow_data()?;
    let destination_entry = accounts.destination_entry.try_borrow_data()?;

    let invocation = HookInvocation {
        mint: accounts.mint.key(),
        source_owner: accounts.source_token.owner,
        destination_owner: accounts.destination_token.owner,
        declaration: view(&accounts.extra_account_meta_list, &declaration),
        registry: view(&accounts.registry, &registry),
        source_entry: view(&accounts.source_entry, &source_entry),
        destination_entry: view(&accounts.destination_entry, &destination_entry),
    };
    validator::authorize_transfer(&invocation, &crate::ID)?;

    msg!(
        "Transfer of {} allowed: {} -> {}",
        amount,
        invocation.source_owner,
        invocation.destination_owner
    );
    Ok(())
}

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program::invoke, system_instruction};
use anchor_spl::token_2022::{
    spl_token_2022::{
        extension::{transfer_hook::instruction as transfer_hook_ix, ExtensionType},
        instruction as token_instruction,
        state::Mint,
    },
    Token2022,
};

use crate::constants::MAX_DECIMALS;
use crate::error::WhitelistError;

#[derive(Accounts)]
pub struct CreateMint<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(mut)]
    pub mint: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token2022>,
}

/// Creates a Token-2022 mint whose transfer hook points at this program.
/// The payer becomes both the mint authority and the hook authority.
pub fn create(ctx: Context<CreateMint>, decimals: u8) -> Result<()> {
    require!(decimals <= MAX_DECIMALS, WhitelistError::InvalidDecimals);

    let payer = &ctx.accounts.payer;
    let mint = &ctx.accounts.mint;
    let token_program = ctx.accounts.token_program.key();

    let mint_len =
        ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::TransferHook])?;
    let lamports = Rent::get()?.minimum_balance(mint_len);

    invoke(
        &system_instruction::create_account(
            &payer.key(),
            &mint.key(),
            lamports,
            mint_len as u64,
            &token_program,
        ),
        &[
            payer.to_account_info(),
            mint.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    invoke(
        &transfer_hook_ix::initialize(
            &token_program,
            &mint.key(),
            Some(payer.key()),
            Some(crate::ID),
        )?,
        &[mint.to_account_info()],
    )?;

    invoke(
        &token_instruction::initialize_mint2(
            &token_program,
            &mint.key(),
            &payer.key(),
            None,
            decimals,
        )?,
        &[mint.to_account_info()],
    )?;

    msg!("Mint {} created with transfer hook {}", mint.key(), crate::ID);
    Ok(())
}

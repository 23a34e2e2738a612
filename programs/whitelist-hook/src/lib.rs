#![allow(unexpected_cfgs)]
#![allow(deprecated)]

use anchor_lang::prelude::*;

pub mod access;
pub mod constants;
pub mod declaration;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod pda;
pub mod state;
pub mod utils;
pub mod validator;

use instructions::*;

use spl_discriminator::SplDiscriminate;
use spl_transfer_hook_interface::instruction::ExecuteInstruction;

declare_id!("H7N63tnhQaS6VJb3bAoqGwycD55cNV5Nn8qpNG4EPESd");

#[program]
pub mod whitelist_hook {
    use super::*;

    /// Create a Token-2022 mint with the TransferHook extension pointing to this program.
    pub fn create_mint(ctx: Context<CreateMint>, decimals: u8) -> Result<()> {
        instructions::create_mint::create(ctx, decimals)
    }

    /// Create the registry with the caller as administrator, plus the
    /// administrator's vault for the mint.
    pub fn initialize_registry(ctx: Context<InitializeRegistry>) -> Result<()> {
        instructions::initialize_registry::initialize(ctx)
    }

    pub fn add_to_whitelist(ctx: Context<AddToWhitelist>, owner: Pubkey) -> Result<()> {
        instructions::whitelist_operations::add(ctx, owner)
    }

    /// Closes the owner's entry and refunds its rent to the administrator.
    pub fn remove_from_whitelist(ctx: Context<RemoveFromWhitelist>, owner: Pubkey) -> Result<()> {
        instructions::whitelist_operations::remove(ctx, owner)
    }

    pub fn is_whitelisted(ctx: Context<IsWhitelisted>, owner: Pubkey) -> Result<bool> {
        instructions::whitelist_query::query(ctx, owner)
    }

    /// Write the extra accounts every transfer of the mint must carry.
    pub fn initialize_extra_account_meta_list(
        ctx: Context<InitializeExtraAccountMetaList>,
    ) -> Result<()> {
        instructions::init_extra_account_meta::initialize_list(ctx)
    }

    /// Invoked by Token-2022 during transfers. Both the source and the
    /// destination owner must be whitelisted.
    #[instruction(discriminator = ExecuteInstruction::SPL_DISCRIMINATOR_SLICE)]
    pub fn transfer_hook(ctx: Context<TransferHook>, amount: u64) -> Result<()> {
        instructions::transfer_hook::execute(ctx, amount)
    }
}

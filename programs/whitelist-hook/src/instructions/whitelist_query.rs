use anchor_lang::prelude::*;

use crate::access;

#[derive(Accounts)]
pub struct IsWhitelisted<'info> {
    /// CHECK: may be vacant; only its address and contents are inspected
    pub whitelist_entry: UncheckedAccount<'info>,
}

pub fn query(ctx: Context<IsWhitelisted>, owner: Pubkey) -> Result<bool> {
    access::with_view(&ctx.accounts.whitelist_entry, |view| {
        access::is_whitelisted(view, &owner, &crate::ID)
    })
}

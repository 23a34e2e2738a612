use anchor_lang::prelude::*;

#[event]
pub struct RegistryInitialized {
    pub registry: Pubkey,
    pub admin: Pubkey,
    pub mint: Pubkey,
    pub vault: Pubkey,
}

#[event]
pub struct WhitelistAdded {
    pub registry: Pubkey,
    pub owner: Pubkey,
    pub entry: Pubkey,
}

#[event]
pub struct WhitelistRemoved {
    pub registry: Pubkey,
    pub owner: Pubkey,
    pub entry: Pubkey,
}

#[event]
pub struct DeclarationInitialized {
    pub mint: Pubkey,
    pub declaration: Pubkey,
    pub layout_version: u8,
    pub stored_accounts: u8,
}

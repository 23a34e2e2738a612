use anchor_lang::prelude::*;

/// Singleton holding the administrator allowed to edit the whitelist.
#[account]
#[derive(InitSpace, Debug)]
pub struct Registry {
    pub admin: Pubkey,
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub bump: u8,
}

impl Registry {
    pub fn assert_admin(&self, claimed: &Pubkey) -> Result<()> {
        require_keys_eq!(
            self.admin,
            *claimed,
            crate::error::WhitelistError::Unauthorized
        );
        Ok(())
    }
}

/// Existence of this record at the derived address is the approval itself.
#[account]
#[derive(InitSpace, Debug)]
pub struct WhitelistEntry {
    pub owner: Pubkey,
    pub bump: u8,
}

impl WhitelistEntry {
    pub fn is_for(&self, owner: &Pubkey) -> bool {
        self.owner == *owner
    }
}

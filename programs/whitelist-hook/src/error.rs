use anchor_lang::prelude::*;

#[error_code]
pub enum WhitelistError {
    #[msg("Not authorized: signer is not the registry administrator")]
    Unauthorized,
    #[msg("Account is already initialized")]
    AlreadyInitialized,
    #[msg("Whitelist registry is not initialized")]
    NotInitialized,
    #[msg("Owner is already whitelisted")]
    AlreadyWhitelisted,
    #[msg("Owner is not whitelisted")]
    NotWhitelisted,
    #[msg("Transfer blocked: source owner is not whitelisted")]
    SourceNotWhitelisted,
    #[msg("Transfer blocked: destination owner is not whitelisted")]
    DestinationNotWhitelisted,
    #[msg("Supplied address does not match the derived address")]
    InvalidDerivation,
    #[msg("Mint transfer hook does not point at this program")]
    InvalidToken,
    #[msg("Hook may only run in the middle of a token transfer")]
    NotTransferring,
    #[msg("Invalid decimals - must be <= 9")]
    InvalidDecimals,
    #[msg("Arithmetic overflow")]
    MathOverflow,
}

impl WhitelistError {
    /// Custom program error code as reported by the runtime.
    pub fn code(self) -> u32 {
        anchor_lang::error::ERROR_CODE_OFFSET + self as u32
    }
}

use anchor_lang::prelude::{ProgramError, Pubkey};
use thiserror::Error;

/// Failures of the in-memory ledger itself, as opposed to hook rejections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account already exists: {0}")]
    AccountExists(Pubkey),

    #[error("Mint not found: {0}")]
    UnknownMint(Pubkey),

    #[error("Token account not found: {0}")]
    UnknownTokenAccount(Pubkey),

    #[error("Account not found: {0}")]
    UnknownAccount(Pubkey),

    #[error("Token account {account} does not belong to mint {mint}")]
    MintMismatch { account: Pubkey, mint: Pubkey },

    #[error("Decimals mismatch: mint has {expected}, caller passed {actual}")]
    DecimalsMismatch { expected: u8, actual: u8 },

    #[error("Signer {0} is not the authority for this operation")]
    OwnerMismatch(Pubkey),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Insufficient lamports: required {required}, available {available}")]
    InsufficientLamports { required: u64, available: u64 },

    #[error("Transfer hook account not supplied: {0}")]
    MissingHookAccount(Pubkey),

    #[error("Transfer hook program mismatch: mint names {expected}, got {actual}")]
    HookProgramMismatch { expected: Pubkey, actual: Pubkey },

    #[error("Arithmetic overflow")]
    Overflow,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid configuration format: {0}")]
    InvalidConfig(String),

    #[error("Invalid Pubkey format: {0}")]
    InvalidPubkey(String),

    #[error("Program error: {0}")]
    Program(anchor_lang::error::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<anchor_lang::error::Error> for ClientError {
    fn from(e: anchor_lang::error::Error) -> Self {
        ClientError::Program(e)
    }
}

impl From<ProgramError> for ClientError {
    fn from(e: ProgramError) -> Self {
        ClientError::Program(e.into())
    }
}

impl ClientError {
    /// Custom error code carried by a program rejection, comparable with
    /// `WhitelistError::code()`.
    pub fn program_error_code(&self) -> Option<u32> {
        use anchor_lang::error::Error;

        match self {
            ClientError::Program(Error::AnchorError(e)) => Some(e.error_code_number),
            ClientError::Program(Error::ProgramError(e)) => match e.program_error {
                ProgramError::Custom(code) => Some(code),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whitelist_hook::error::WhitelistError;

    #[test]
    fn hook_rejection_exposes_its_code() {
        let err = ClientError::from(anchor_lang::error::Error::from(
            WhitelistError::SourceNotWhitelisted,
        ));
        assert_eq!(
            err.program_error_code(),
            Some(WhitelistError::SourceNotWhitelisted.code())
        );
    }

    #[test]
    fn custom_program_error_exposes_its_code() {
        let err = ClientError::from(ProgramError::Custom(7));
        assert_eq!(err.program_error_code(), Some(7));
    }

    #[test]
    fn ledger_errors_carry_no_program_code() {
        let err = ClientError::from(LedgerError::Overflow);
        assert_eq!(err.program_error_code(), None);
    }
}

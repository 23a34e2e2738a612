pub const REGISTRY_SEED: &[u8] = b"whitelist";
pub const ENTRY_SEED: &[u8] = b"whitelist";
pub const DECLARATION_SEED: &[u8] = b"extra-account-metas";

/// Account positions inside the Token-2022 `Execute` instruction.
pub const SOURCE_ACCOUNT_INDEX: u8 = 0;
pub const DESTINATION_ACCOUNT_INDEX: u8 = 2;

/// Byte offset of the owner field in an SPL token account.
pub const TOKEN_ACCOUNT_OWNER_OFFSET: u8 = 32;

pub const MAX_DECIMALS: u8 = 9;

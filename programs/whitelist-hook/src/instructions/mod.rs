pub mod create_mint;
pub mod init_extra_account_meta;
pub mod initialize_registry;
pub mod transfer_hook;
pub mod whitelist_operations;
pub mod whitelist_query;

pub use create_mint::*;
pub use init_extra_account_meta::*;
pub use initialize_registry::*;
pub use transfer_hook::*;
pub use whitelist_operations::*;
pub use whitelist_query::*;

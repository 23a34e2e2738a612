//! Host-side companion to the `whitelist-hook` program.
//!
//! Provides instruction builders for a real cluster and [`ledger::Ledger`],
//! an in-memory Token-2022 stand-in that runs the hook's rules inside each
//! transfer.

pub mod config;
pub mod error;
pub mod instructions;
pub mod ledger;
pub mod logging;

pub use config::{load_config, parse_config, HookConfig};
pub use error::{ClientError, LedgerError};
pub use ledger::{Ledger, TransferRequest};

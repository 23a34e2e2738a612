use crate::error::WhitelistError;
use anchor_lang::prelude::*;

pub fn safe_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(WhitelistError::MathOverflow.into())
}

/// Lamports still needed to bring `current` up to `required`.
pub fn top_up(current: u64, required: u64) -> u64 {
    required.saturating_sub(current)
}

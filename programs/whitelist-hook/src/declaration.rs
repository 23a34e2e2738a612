//! Fixed account shape every hooked transfer of a mint must carry.
//!
//! The token program appends five accounts after the core transfer accounts:
//! the declaration itself, the registry, one entry per transfer party and
//! finally this program. Only the middle three live in the declaration's TLV
//! data; the declaration and the program id are supplied by the token
//! program's own resolution.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::AccountMeta;
use spl_tlv_account_resolution::{
    account::ExtraAccountMeta, seeds::Seed, state::ExtraAccountMetaList,
};
use spl_transfer_hook_interface::instruction::{ExecuteInstruction, TransferHookInstruction};
use spl_type_length_value::state::TlvStateBorrowed;

use crate::constants::{
    DESTINATION_ACCOUNT_INDEX, ENTRY_SEED, SOURCE_ACCOUNT_INDEX, TOKEN_ACCOUNT_OWNER_OFFSET,
};
use crate::error::WhitelistError;
use crate::pda;

pub const LAYOUT_VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookAccount {
    Declaration,
    Registry,
    SourceOwnerEntry,
    DestinationOwnerEntry,
    HookProgram,
}

impl HookAccount {
    /// Whether the descriptor is written into the declaration account.
    pub fn is_stored(self) -> bool {
        matches!(
            self,
            HookAccount::Registry
                | HookAccount::SourceOwnerEntry
                | HookAccount::DestinationOwnerEntry
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookAccountDescriptor {
    pub account: HookAccount,
    pub is_signer: bool,
    pub is_writable: bool,
}

const fn read_only(account: HookAccount) -> HookAccountDescriptor {
    HookAccountDescriptor {
        account,
        is_signer: false,
        is_writable: false,
    }
}

pub const LAYOUT: [HookAccountDescriptor; 5] = [
    read_only(HookAccount::Declaration),
    read_only(HookAccount::Registry),
    read_only(HookAccount::SourceOwnerEntry),
    read_only(HookAccount::DestinationOwnerEntry),
    read_only(HookAccount::HookProgram),
];

pub fn stored_len() -> usize {
    LAYOUT.iter().filter(|d| d.account.is_stored()).count()
}

fn owner_entry_seeds(token_account_index: u8) -> Vec<Seed> {
    vec![
        Seed::Literal {
            bytes: ENTRY_SEED.to_vec(),
        },
        Seed::AccountData {
            account_index: token_account_index,
            data_index: TOKEN_ACCOUNT_OWNER_OFFSET,
            length: 32,
        },
    ]
}

/// TLV entries written into the declaration account, in layout order.
pub fn extra_account_metas(program_id: &Pubkey) -> Result<Vec<ExtraAccountMeta>> {
    let (registry, _) = pda::find_registry_address(program_id)?;
    let mut metas = Vec::with_capacity(stored_len());
    for descriptor in LAYOUT.iter().filter(|d| d.account.is_stored()) {
        let meta = match descriptor.account {
            HookAccount::Registry => ExtraAccountMeta::new_with_pubkey(
                &registry.to_bytes().into(),
                descriptor.is_signer,
                descriptor.is_writable,
            )?,
            HookAccount::SourceOwnerEntry => ExtraAccountMeta::new_with_seeds(
                &owner_entry_seeds(SOURCE_ACCOUNT_INDEX),
                descriptor.is_signer,
                descriptor.is_writable,
            )?,
            HookAccount::DestinationOwnerEntry => ExtraAccountMeta::new_with_seeds(
                &owner_entry_seeds(DESTINATION_ACCOUNT_INDEX),
                descriptor.is_signer,
                descriptor.is_writable,
            )?,
            HookAccount::Declaration | HookAccount::HookProgram => continue,
        };
        metas.push(meta);
    }
    Ok(metas)
}

/// Entries of a declaration account. Anything that is not a TLV list keyed
/// by the `Execute` discriminator counts as uninitialized.
pub fn stored_metas(data: &[u8]) -> Result<Vec<ExtraAccountMeta>> {
    let state =
        TlvStateBorrowed::unpack(data).map_err(|_| error!(WhitelistError::NotInitialized))?;
    let metas = ExtraAccountMetaList::unpack_with_tlv_state::<ExecuteInstruction>(&state)
        .map_err(|_| error!(WhitelistError::NotInitialized))?;
    Ok(metas.data().to_vec())
}

/// Resolves a stored declaration against the core accounts of an `Execute`
/// call, the way Token-2022 does before invoking the hook. `lookup` supplies
/// the data of accounts resolved along the way.
pub fn resolve_declared<'a>(
    data: &[u8],
    core_accounts: &[(Pubkey, Option<&'a [u8]>)],
    amount: u64,
    program_id: &Pubkey,
    lookup: impl Fn(&Pubkey) -> Option<&'a [u8]>,
) -> Result<Vec<Pubkey>> {
    let metas = stored_metas(data)?;
    let instruction_data = TransferHookInstruction::Execute { amount }.pack();

    let mut accounts = core_accounts.to_vec();
    let mut resolved = Vec::with_capacity(metas.len());
    for meta in &metas {
        let key = meta.resolve(&instruction_data, program_id, |index| {
            accounts.get(index).map(|(key, data)| (key, *data))
        })?
        .pubkey;
        accounts.push((key, lookup(&key)));
        resolved.push(key);
    }
    Ok(resolved)
}

#[derive(Clone, Copy, Debug)]
pub struct TransferParties {
    pub mint: Pubkey,
    pub source_owner: Pubkey,
    pub destination_owner: Pubkey,
}

/// Concrete accounts for one transfer, computed without touching chain state.
pub fn resolve(parties: &TransferParties, program_id: &Pubkey) -> Result<Vec<AccountMeta>> {
    LAYOUT
        .iter()
        .map(|descriptor| {
            let pubkey = match descriptor.account {
                HookAccount::Declaration => {
                    pda::find_declaration_address(&parties.mint, program_id)?.0
                }
                HookAccount::Registry => pda::find_registry_address(program_id)?.0,
                HookAccount::SourceOwnerEntry => {
                    pda::find_entry_address(&parties.source_owner, program_id)?.0
                }
                HookAccount::DestinationOwnerEntry => {
                    pda::find_entry_address(&parties.destination_owner, program_id)?.0
                }
                HookAccount::HookProgram => *program_id,
            };
            Ok(if descriptor.is_writable {
                AccountMeta::new(pubkey, descriptor.is_signer)
            } else {
                AccountMeta::new_readonly(pubkey, descriptor.is_signer)
            })
        })
        .collect()
}

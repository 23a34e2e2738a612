//! Access-control core shared by the instruction handlers and by off-chain
//! ledgers that replay the same rules.
//!
//! Every check works on an [`AccountView`], a borrowed snapshot of an
//! account's address, owning program and data, so the rules never depend on
//! how the account was loaded.

use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::{
    extension::{transfer_hook::TransferHook, BaseStateWithExtensions, StateWithExtensions},
    state::Mint,
};

use crate::declaration;
use crate::error::WhitelistError;
use crate::pda;
use crate::state::{Registry, WhitelistEntry};

#[derive(Clone, Copy, Debug)]
pub struct AccountView<'a> {
    pub key: Pubkey,
    pub owner: Pubkey,
    pub data: &'a [u8],
}

impl<'a> AccountView<'a> {
    pub fn new(key: Pubkey, owner: Pubkey, data: &'a [u8]) -> Self {
        Self { key, owner, data }
    }

    pub fn is_vacant(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_owned_by(&self, program_id: &Pubkey) -> bool {
        self.owner == *program_id
    }
}

/// Runs `f` against a view of `info`, holding the data borrow only for the call.
pub fn with_view<T>(
    info: &AccountInfo<'_>,
    f: impl FnOnce(&AccountView) -> Result<T>,
) -> Result<T> {
    let data = info.try_borrow_data()?;
    f(&AccountView::new(*info.key, *info.owner, &data))
}

pub fn load_registry(view: &AccountView, program_id: &Pubkey) -> Result<Registry> {
    let (expected, _) = pda::find_registry_address(program_id)?;
    require_keys_eq!(view.key, expected, WhitelistError::InvalidDerivation);
    require!(
        !view.is_vacant() && view.is_owned_by(program_id),
        WhitelistError::NotInitialized
    );
    Registry::try_deserialize(&mut &view.data[..])
        .map_err(|_| error!(WhitelistError::NotInitialized))
}

/// Returns the registry bump when the registry slot is still free.
pub fn ensure_registry_vacant(view: &AccountView, program_id: &Pubkey) -> Result<u8> {
    let (expected, bump) = pda::find_registry_address(program_id)?;
    require_keys_eq!(view.key, expected, WhitelistError::InvalidDerivation);
    require!(view.is_vacant(), WhitelistError::AlreadyInitialized);
    Ok(bump)
}

/// True iff `view` is the derived entry for `owner`, owned by the program,
/// and records exactly `owner`.
pub fn entry_approves(view: &AccountView, owner: &Pubkey, program_id: &Pubkey) -> bool {
    match pda::find_entry_address(owner, program_id) {
        Ok((expected, _)) if expected == view.key => {}
        _ => return false,
    }
    if view.is_vacant() || !view.is_owned_by(program_id) {
        return false;
    }
    WhitelistEntry::try_deserialize(&mut &view.data[..])
        .map(|entry| entry.is_for(owner))
        .unwrap_or(false)
}

/// Read-only whitelist query. A view at a non-derived address is a forgery.
pub fn is_whitelisted(view: &AccountView, owner: &Pubkey, program_id: &Pubkey) -> Result<bool> {
    let (expected, _) = pda::find_entry_address(owner, program_id)?;
    require_keys_eq!(view.key, expected, WhitelistError::InvalidDerivation);
    Ok(entry_approves(view, owner, program_id))
}

/// Returns the entry bump when `owner` has no entry yet.
pub fn ensure_entry_vacant(view: &AccountView, owner: &Pubkey, program_id: &Pubkey) -> Result<u8> {
    let (expected, bump) = pda::find_entry_address(owner, program_id)?;
    require_keys_eq!(view.key, expected, WhitelistError::InvalidDerivation);
    require!(view.is_vacant(), WhitelistError::AlreadyWhitelisted);
    Ok(bump)
}

pub fn ensure_entry_present(
    view: &AccountView,
    owner: &Pubkey,
    program_id: &Pubkey,
) -> Result<WhitelistEntry> {
    require!(
        is_whitelisted(view, owner, program_id)?,
        WhitelistError::NotWhitelisted
    );
    WhitelistEntry::try_deserialize(&mut &view.data[..])
}

/// Returns the declaration bump when `mint` has no declaration yet.
pub fn ensure_declaration_vacant(
    view: &AccountView,
    mint: &Pubkey,
    program_id: &Pubkey,
) -> Result<u8> {
    let (expected, bump) = pda::find_declaration_address(mint, program_id)?;
    require_keys_eq!(view.key, expected, WhitelistError::InvalidDerivation);
    require!(view.is_vacant(), WhitelistError::AlreadyInitialized);
    Ok(bump)
}

/// The derived declaration for `mint`, owned by the program and holding
/// exactly the entries this program writes.
pub fn load_declaration(view: &AccountView, mint: &Pubkey, program_id: &Pubkey) -> Result<()> {
    let (expected, _) = pda::find_declaration_address(mint, program_id)?;
    require_keys_eq!(view.key, expected, WhitelistError::InvalidDerivation);
    require!(
        !view.is_vacant() && view.is_owned_by(program_id),
        WhitelistError::NotInitialized
    );
    require!(
        declaration::stored_metas(view.data)? == declaration::extra_account_metas(program_id)?,
        WhitelistError::NotInitialized
    );
    Ok(())
}

/// Program named by the mint's TransferHook extension, if any.
pub fn hook_program_id(mint_data: &[u8]) -> Option<Pubkey> {
    let mint = StateWithExtensions::<Mint>::unpack(mint_data).ok()?;
    let extension = mint.get_extension::<TransferHook>().ok()?;
    Option::<Pubkey>::from(extension.program_id)
}

pub fn ensure_hooked_mint(mint_data: &[u8], program_id: &Pubkey) -> Result<()> {
    require!(
        hook_program_id(mint_data) == Some(*program_id),
        WhitelistError::InvalidToken
    );
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use anchor_lang::solana_program::{program_option::COption, program_pack::Pack};
    use anchor_spl::token_2022::spl_token_2022::{
        extension::{BaseStateWithExtensionsMut, ExtensionType, StateWithExtensionsMut},
        state::{Account, AccountState},
    };
    use spl_tlv_account_resolution::state::ExtraAccountMetaList;
    use spl_transfer_hook_interface::instruction::ExecuteInstruction;

    pub fn serialize<T: AccountSerialize>(value: &T) -> Vec<u8> {
        let mut data = Vec::new();
        value.try_serialize(&mut data).expect("serialize account");
        data
    }

    fn base_mint(authority: Pubkey) -> Mint {
        Mint {
            mint_authority: COption::Some(authority),
            supply: 0,
            decimals: 9,
            is_initialized: true,
            freeze_authority: COption::None,
        }
    }

    pub fn hooked_mint_data(hook_program: Pubkey) -> Vec<u8> {
        let len = ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::TransferHook])
            .expect("mint length");
        let mut data = vec![0u8; len];
        let mut state =
            StateWithExtensionsMut::<Mint>::unpack_uninitialized(&mut data).expect("unpack");
        let extension = state
            .init_extension::<TransferHook>(true)
            .expect("init extension");
        extension.program_id = Some(hook_program).try_into().expect("non-zero program id");
        state.base = base_mint(Pubkey::new_unique());
        state.pack_base();
        state.init_account_type().expect("account type");
        data
    }

    pub fn plain_mint_data() -> Vec<u8> {
        let mut data = vec![0u8; Mint::LEN];
        Mint::pack(base_mint(Pubkey::new_unique()), &mut data).expect("pack mint");
        data
    }

    pub fn token_account_data(mint: Pubkey, owner: Pubkey, amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; Account::LEN];
        let account = Account {
            mint,
            owner,
            amount,
            state: AccountState::Initialized,
            ..Account::default()
        };
        Account::pack(account, &mut data).expect("pack account");
        data
    }

    /// Declaration bytes as `initialize_extra_account_meta_list` writes them.
    pub fn declaration_data() -> Vec<u8> {
        let metas = declaration::extra_account_metas(&crate::ID).expect("metas");
        let size = ExtraAccountMetaList::size_of(metas.len()).expect("size");
        let mut data = vec![0u8; size];
        ExtraAccountMetaList::init::<ExecuteInstruction>(&mut data, &metas).expect("init");
        data
    }
}

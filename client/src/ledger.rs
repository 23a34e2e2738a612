//! In-memory Token-2022 stand-in.
//!
//! Models just enough of the token program to drive the hook: mints with an
//! optional transfer-hook extension, associated token accounts, `mint_to` and
//! `transfer_checked`. Hook state is stored as real account bytes and every
//! hook operation goes through the same `access`/`validator` code the
//! on-chain handlers run.
//!
//! Each public operation is atomic. The state is snapshotted before the
//! operation and restored if any step fails, so a rejected transfer leaves
//! no balance change behind even though the hook runs after the debit.

use std::collections::HashMap;

use anchor_lang::prelude::{AccountSerialize, ProgramError, Pubkey, Rent};
use anchor_lang::solana_program::{
    instruction::AccountMeta, program_option::COption, program_pack::Pack,
};
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::token_2022::spl_token_2022::{
    extension::{
        transfer_hook::TransferHook, BaseStateWithExtensionsMut, ExtensionType,
        StateWithExtensionsMut,
    },
    state::{Account, AccountState, Mint},
};
use spl_tlv_account_resolution::state::ExtraAccountMetaList;
use spl_transfer_hook_interface::instruction::ExecuteInstruction;
use tracing::{debug, info, warn};

use whitelist_hook::access::{self, AccountView};
use whitelist_hook::constants::MAX_DECIMALS;
use whitelist_hook::declaration::{self, HookAccount, TransferParties, LAYOUT};
use whitelist_hook::error::WhitelistError;
use whitelist_hook::pda;
use whitelist_hook::state::{Registry, WhitelistEntry};
use whitelist_hook::validator::{self, HookInvocation};

use crate::error::{ClientError, LedgerError};

type LedgerResult<T> = Result<T, ClientError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintRecord {
    pub authority: Pubkey,
    pub decimals: u8,
    pub supply: u64,
    pub transfer_hook_program: Option<Pubkey>,
}

impl MintRecord {
    fn extensions(&self) -> Vec<ExtensionType> {
        match self.transfer_hook_program {
            Some(_) => vec![ExtensionType::TransferHook],
            None => Vec::new(),
        }
    }

    pub fn space(&self) -> Result<usize, ProgramError> {
        ExtensionType::try_calculate_account_len::<Mint>(&self.extensions())
    }

    /// Token-2022 account bytes for this mint.
    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        let base = Mint {
            mint_authority: COption::Some(self.authority),
            supply: self.supply,
            decimals: self.decimals,
            is_initialized: true,
            freeze_authority: COption::None,
        };

        let Some(hook_program) = self.transfer_hook_program else {
            let mut data = vec![0u8; Mint::LEN];
            Mint::pack(base, &mut data)?;
            return Ok(data);
        };

        let mut data = vec![0u8; self.space()?];
        let mut state = StateWithExtensionsMut::<Mint>::unpack_uninitialized(&mut data)?;
        let extension = state.init_extension::<TransferHook>(true)?;
        extension.authority = Some(self.authority).try_into()?;
        extension.program_id = Some(hook_program).try_into()?;
        state.base = base;
        state.pack_base();
        state.init_account_type()?;
        Ok(data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenAccountRecord {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl TokenAccountRecord {
    /// Base Token-2022 account bytes. Seed rules read the owner from these.
    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        let account = Account {
            mint: self.mint,
            owner: self.owner,
            amount: self.amount,
            state: AccountState::Initialized,
            ..Account::default()
        };
        let mut data = vec![0u8; Account::LEN];
        Account::pack(account, &mut data)?;
        Ok(data)
    }
}

#[derive(Clone, Debug)]
struct StoredAccount {
    lamports: u64,
    owner: Pubkey,
    data: Vec<u8>,
}

/// Arguments of a Token-2022 `transfer_checked`, with the hook's extra
/// accounts appended in the order the caller resolved them.
#[derive(Clone, Debug)]
pub struct TransferRequest {
    pub source: Pubkey,
    pub mint: Pubkey,
    pub destination: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
    pub decimals: u8,
    pub extra_accounts: Vec<AccountMeta>,
}

#[derive(Clone, Debug, Default)]
struct LedgerState {
    wallets: HashMap<Pubkey, u64>,
    accounts: HashMap<Pubkey, StoredAccount>,
    mints: HashMap<Pubkey, MintRecord>,
    token_accounts: HashMap<Pubkey, TokenAccountRecord>,
}

impl LedgerState {
    fn view(&self, key: Pubkey) -> AccountView<'_> {
        match self.accounts.get(&key) {
            Some(account) => AccountView::new(key, account.owner, &account.data),
            None => AccountView::new(key, anchor_lang::system_program::ID, &[]),
        }
    }

    fn is_occupied(&self, key: &Pubkey) -> bool {
        self.accounts.contains_key(key)
            || self.mints.contains_key(key)
            || self.token_accounts.contains_key(key)
    }

    fn credit_lamports(&mut self, wallet: Pubkey, lamports: u64) -> LedgerResult<()> {
        let balance = self.wallets.entry(wallet).or_default();
        *balance = balance.checked_add(lamports).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn charge_rent(&mut self, payer: Pubkey, space: usize, rent: &Rent) -> LedgerResult<u64> {
        let required = rent.minimum_balance(space);
        let available = self.wallets.get(&payer).copied().unwrap_or_default();
        if available < required {
            return Err(LedgerError::InsufficientLamports {
                required,
                available,
            }
            .into());
        }
        self.wallets.insert(payer, available - required);
        Ok(required)
    }

    fn mint(&self, key: &Pubkey) -> LedgerResult<&MintRecord> {
        Ok(self.mints.get(key).ok_or(LedgerError::UnknownMint(*key))?)
    }

    fn token_account(&self, key: &Pubkey) -> LedgerResult<&TokenAccountRecord> {
        Ok(self
            .token_accounts
            .get(key)
            .ok_or(LedgerError::UnknownTokenAccount(*key))?)
    }

    fn token_account_mut(&mut self, key: &Pubkey) -> LedgerResult<&mut TokenAccountRecord> {
        Ok(self
            .token_accounts
            .get_mut(key)
            .ok_or(LedgerError::UnknownTokenAccount(*key))?)
    }

    fn open_token_account(
        &mut self,
        payer: Pubkey,
        address: Pubkey,
        owner: Pubkey,
        mint: Pubkey,
        rent: &Rent,
    ) -> LedgerResult<()> {
        if self.is_occupied(&address) {
            return Err(LedgerError::AccountExists(address).into());
        }
        let hooked = self.mint(&mint)?.transfer_hook_program.is_some();
        let extensions: &[ExtensionType] = if hooked {
            &[ExtensionType::TransferHookAccount]
        } else {
            &[]
        };
        let space = ExtensionType::try_calculate_account_len::<Account>(extensions)?;
        self.charge_rent(payer, space, rent)?;
        self.token_accounts.insert(
            address,
            TokenAccountRecord {
                mint,
                owner,
                amount: 0,
            },
        );
        Ok(())
    }

    fn create_program_account(
        &mut self,
        payer: Pubkey,
        address: Pubkey,
        program_id: Pubkey,
        data: Vec<u8>,
        rent: &Rent,
    ) -> LedgerResult<()> {
        if self.is_occupied(&address) {
            return Err(LedgerError::AccountExists(address).into());
        }
        let lamports = self.charge_rent(payer, data.len(), rent)?;
        self.accounts.insert(
            address,
            StoredAccount {
                lamports,
                owner: program_id,
                data,
            },
        );
        Ok(())
    }

    fn close_program_account(&mut self, address: &Pubkey, destination: Pubkey) -> LedgerResult<()> {
        let account = self
            .accounts
            .remove(address)
            .ok_or(LedgerError::UnknownAccount(*address))?;
        self.credit_lamports(destination, account.lamports)
    }

    fn load_registry(&self, registry: Pubkey, program_id: &Pubkey) -> LedgerResult<Registry> {
        Ok(access::load_registry(&self.view(registry), program_id)?)
    }

    /// Resolves the stored declaration against the transfer the way the
    /// token program does, then hands the resolved accounts to the hook.
    /// Extra accounts are matched by key, so their order does not matter.
    fn invoke_hook(
        &self,
        hook_program: Pubkey,
        program_id: Pubkey,
        request: &TransferRequest,
        parties: &TransferParties,
    ) -> LedgerResult<()> {
        if hook_program != program_id {
            return Err(LedgerError::HookProgramMismatch {
                expected: program_id,
                actual: hook_program,
            }
            .into());
        }
        let supplied = |key: Pubkey| -> LedgerResult<Pubkey> {
            if request.extra_accounts.iter().any(|meta| meta.pubkey == key) {
                Ok(key)
            } else {
                Err(LedgerError::MissingHookAccount(key).into())
            }
        };
        supplied(hook_program)?;
        let (declaration_key, _) = pda::find_declaration_address(&request.mint, &program_id)?;
        let declaration = self.view(supplied(declaration_key)?);

        let source = self.token_account(&request.source)?.pack()?;
        let mint = self.mint(&request.mint)?.pack()?;
        let destination = self.token_account(&request.destination)?.pack()?;
        let core_accounts = [
            (request.source, Some(source.as_slice())),
            (request.mint, Some(mint.as_slice())),
            (request.destination, Some(destination.as_slice())),
            (request.authority, None),
            (declaration_key, Some(declaration.data)),
        ];
        let resolved = declaration::resolve_declared(
            declaration.data,
            &core_accounts,
            request.amount,
            &hook_program,
            |key| self.accounts.get(key).map(|account| account.data.as_slice()),
        )?;

        let mut stored = Vec::with_capacity(resolved.len());
        let roles = LAYOUT.iter().filter(|d| d.account.is_stored());
        for (descriptor, key) in roles.zip(resolved) {
            stored.push((descriptor.account, supplied(key)?));
        }
        let slot = |account: HookAccount| {
            stored
                .iter()
                .find(|(role, _)| *role == account)
                .map(|(_, key)| *key)
                .unwrap_or_default()
        };

        let invocation = HookInvocation {
            mint: parties.mint,
            source_owner: parties.source_owner,
            destination_owner: parties.destination_owner,
            declaration,
            registry: self.view(slot(HookAccount::Registry)),
            source_entry: self.view(slot(HookAccount::SourceOwnerEntry)),
            destination_entry: self.view(slot(HookAccount::DestinationOwnerEntry)),
        };
        validator::authorize_transfer(&invocation, &program_id)?;
        debug!(
            source_owner = %parties.source_owner,
            destination_owner = %parties.destination_owner,
            "transfer hook approved"
        );
        Ok(())
    }
}

fn serialize<T: AccountSerialize>(value: &T) -> LedgerResult<Vec<u8>> {
    let mut data = Vec::new();
    value.try_serialize(&mut data)?;
    Ok(data)
}

pub fn associated_address(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(wallet, mint, &anchor_spl::token_2022::ID)
}

pub struct Ledger {
    program_id: Pubkey,
    rent: Rent,
    state: LedgerState,
}

impl Ledger {
    /// A ledger hosting the hook deployed at `program_id`.
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            rent: Rent::default(),
            state: LedgerState::default(),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn atomically<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut LedgerState) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let span = tracing::info_span!("ledger", op);
        let _guard = span.enter();

        let snapshot = self.state.clone();
        match f(&mut self.state) {
            Ok(value) => {
                info!("committed");
                Ok(value)
            }
            Err(e) => {
                self.state = snapshot;
                warn!(error = %e, "rolled back");
                Err(e)
            }
        }
    }

    pub fn airdrop(&mut self, wallet: Pubkey, lamports: u64) -> LedgerResult<()> {
        self.atomically("airdrop", |state| state.credit_lamports(wallet, lamports))
    }

    /// Lamports held by a wallet or by a hook-owned account.
    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.state
            .accounts
            .get(address)
            .map(|account| account.lamports)
            .or_else(|| self.state.wallets.get(address).copied())
            .unwrap_or_default()
    }

    /// Raw bytes of a hook-owned account.
    pub fn account_data(&self, address: &Pubkey) -> Option<&[u8]> {
        self.state
            .accounts
            .get(address)
            .map(|account| account.data.as_slice())
    }

    pub fn mint(&self, mint: &Pubkey) -> LedgerResult<MintRecord> {
        self.state.mint(mint).cloned()
    }

    pub fn token_account(&self, address: &Pubkey) -> LedgerResult<TokenAccountRecord> {
        self.state.token_account(address).cloned()
    }

    pub fn balance(&self, address: &Pubkey) -> LedgerResult<u64> {
        Ok(self.state.token_account(address)?.amount)
    }

    /// Creates a mint whose authority is `payer`, optionally wired to a
    /// transfer hook program.
    pub fn create_mint(
        &mut self,
        payer: Pubkey,
        mint: Pubkey,
        decimals: u8,
        transfer_hook_program: Option<Pubkey>,
    ) -> LedgerResult<()> {
        let rent = self.rent.clone();
        self.atomically("create_mint", |state| {
            if decimals > MAX_DECIMALS {
                return Err(anchor_lang::error::Error::from(WhitelistError::InvalidDecimals).into());
            }
            if state.is_occupied(&mint) {
                return Err(LedgerError::AccountExists(mint).into());
            }
            let record = MintRecord {
                authority: payer,
                decimals,
                supply: 0,
                transfer_hook_program,
            };
            state.charge_rent(payer, record.space()?, &rent)?;
            state.mints.insert(mint, record);
            Ok(())
        })
    }

    pub fn create_associated_account(
        &mut self,
        payer: Pubkey,
        wallet: Pubkey,
        mint: Pubkey,
    ) -> LedgerResult<Pubkey> {
        let rent = self.rent.clone();
        self.atomically("create_associated_account", |state| {
            let address = associated_address(&wallet, &mint);
            state.open_token_account(payer, address, wallet, mint, &rent)?;
            Ok(address)
        })
    }

    pub fn mint_to(
        &mut self,
        mint: Pubkey,
        destination: Pubkey,
        authority: Pubkey,
        amount: u64,
    ) -> LedgerResult<()> {
        self.atomically("mint_to", |state| {
            if state.mint(&mint)?.authority != authority {
                return Err(LedgerError::OwnerMismatch(authority).into());
            }
            let account = state.token_account_mut(&destination)?;
            if account.mint != mint {
                return Err(LedgerError::MintMismatch {
                    account: destination,
                    mint,
                }
                .into());
            }
            account.amount = account.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;

            let record = state
                .mints
                .get_mut(&mint)
                .ok_or(LedgerError::UnknownMint(mint))?;
            record.supply = record.supply.checked_add(amount).ok_or(LedgerError::Overflow)?;
            Ok(())
        })
    }

    /// Extra accounts a transfer between the two token accounts must carry,
    /// in declaration order.
    pub fn resolve_transfer_accounts(
        &self,
        source: &Pubkey,
        mint: &Pubkey,
        destination: &Pubkey,
    ) -> LedgerResult<Vec<AccountMeta>> {
        let parties = TransferParties {
            mint: *mint,
            source_owner: self.state.token_account(source)?.owner,
            destination_owner: self.state.token_account(destination)?.owner,
        };
        Ok(declaration::resolve(&parties, &self.program_id)?)
    }

    /// Moves tokens and, for hooked mints, runs the hook before committing.
    pub fn transfer_checked(&mut self, request: &TransferRequest) -> LedgerResult<()> {
        let program_id = self.program_id;
        self.atomically("transfer_checked", |state| {
            let mint = state.mint(&request.mint)?.clone();
            if mint.decimals != request.decimals {
                return Err(LedgerError::DecimalsMismatch {
                    expected: mint.decimals,
                    actual: request.decimals,
                }
                .into());
            }

            let source = state.token_account(&request.source)?.clone();
            let destination = state.token_account(&request.destination)?.clone();
            for (address, account) in [
                (request.source, &source),
                (request.destination, &destination),
            ] {
                if account.mint != request.mint {
                    return Err(LedgerError::MintMismatch {
                        account: address,
                        mint: request.mint,
                    }
                    .into());
                }
            }
            if source.owner != request.authority {
                return Err(LedgerError::OwnerMismatch(request.authority).into());
            }
            if source.amount < request.amount {
                return Err(LedgerError::InsufficientFunds {
                    required: request.amount,
                    available: source.amount,
                }
                .into());
            }

            let debited = state.token_account_mut(&request.source)?;
            debited.amount -= request.amount;
            let credited = state.token_account_mut(&request.destination)?;
            credited.amount = credited
                .amount
                .checked_add(request.amount)
                .ok_or(LedgerError::Overflow)?;

            if let Some(hook_program) = mint.transfer_hook_program {
                let parties = TransferParties {
                    mint: request.mint,
                    source_owner: source.owner,
                    destination_owner: destination.owner,
                };
                state.invoke_hook(hook_program, program_id, request, &parties)?;
            }
            Ok(())
        })
    }

    /// Creates the registry at `registry` and the administrator's vault.
    /// Returns the vault address.
    pub fn initialize_registry(
        &mut self,
        admin: Pubkey,
        registry: Pubkey,
        mint: Pubkey,
    ) -> LedgerResult<Pubkey> {
        let program_id = self.program_id;
        let rent = self.rent.clone();
        self.atomically("initialize_registry", |state| {
            let mint_data = state.mint(&mint)?.pack()?;
            access::ensure_hooked_mint(&mint_data, &program_id)?;
            let bump = access::ensure_registry_vacant(&state.view(registry), &program_id)?;

            let vault = associated_address(&admin, &mint);
            if !state.token_accounts.contains_key(&vault) {
                state.open_token_account(admin, vault, admin, mint, &rent)?;
            }

            let record = Registry {
                admin,
                mint,
                vault,
                bump,
            };
            state.create_program_account(admin, registry, program_id, serialize(&record)?, &rent)?;
            Ok(vault)
        })
    }

    pub fn registry(&self, registry: Pubkey) -> LedgerResult<Registry> {
        self.state.load_registry(registry, &self.program_id)
    }

    pub fn add_to_whitelist(
        &mut self,
        admin: Pubkey,
        registry: Pubkey,
        entry: Pubkey,
        owner: Pubkey,
    ) -> LedgerResult<()> {
        let program_id = self.program_id;
        let rent = self.rent.clone();
        self.atomically("add_to_whitelist", |state| {
            state.load_registry(registry, &program_id)?.assert_admin(&admin)?;
            let bump = access::ensure_entry_vacant(&state.view(entry), &owner, &program_id)?;
            let data = serialize(&WhitelistEntry { owner, bump })?;
            state.create_program_account(admin, entry, program_id, data, &rent)
        })
    }

    /// Closes the entry and refunds its rent to the administrator.
    pub fn remove_from_whitelist(
        &mut self,
        admin: Pubkey,
        registry: Pubkey,
        entry: Pubkey,
        owner: Pubkey,
    ) -> LedgerResult<()> {
        let program_id = self.program_id;
        self.atomically("remove_from_whitelist", |state| {
            state.load_registry(registry, &program_id)?.assert_admin(&admin)?;
            access::ensure_entry_present(&state.view(entry), &owner, &program_id)?;
            state.close_program_account(&entry, admin)
        })
    }

    pub fn is_whitelisted(&self, entry: Pubkey, owner: Pubkey) -> LedgerResult<bool> {
        Ok(access::is_whitelisted(
            &self.state.view(entry),
            &owner,
            &self.program_id,
        )?)
    }

    pub fn initialize_extra_account_meta_list(
        &mut self,
        payer: Pubkey,
        extra_account_meta_list: Pubkey,
        mint: Pubkey,
    ) -> LedgerResult<()> {
        let program_id = self.program_id;
        let rent = self.rent.clone();
        self.atomically("initialize_extra_account_meta_list", |state| {
            let mint_data = state.mint(&mint)?.pack()?;
            access::ensure_hooked_mint(&mint_data, &program_id)?;
            access::ensure_declaration_vacant(
                &state.view(extra_account_meta_list),
                &mint,
                &program_id,
            )?;

            let metas = declaration::extra_account_metas(&program_id)?;
            let mut data = vec![0u8; ExtraAccountMetaList::size_of(metas.len())?];
            ExtraAccountMetaList::init::<ExecuteInstruction>(&mut data, &metas)?;
            state.create_program_account(payer, extra_account_meta_list, program_id, data, &rent)
        })
    }
}

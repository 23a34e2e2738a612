use anchor_lang::prelude::Pubkey;
use anyhow::Result;
use pretty_assertions::assert_eq;

use whitelist_hook::error::WhitelistError;
use whitelist_hook::pda;
use whitelist_hook_client::{ClientError, Ledger, LedgerError, TransferRequest};

const DECIMALS: u8 = 9;
const ONE: u64 = 1_000_000_000;

struct Harness {
    ledger: Ledger,
    program_id: Pubkey,
    admin: Pubkey,
    mint: Pubkey,
    registry: Pubkey,
    vault: Pubkey,
}

impl Harness {
    /// Mint, vault and registry, with nobody whitelisted yet.
    fn bootstrap() -> Result<Self> {
        whitelist_hook_client::logging::init("whitelist_hook_client=debug");

        let program_id = whitelist_hook::ID;
        let mut ledger = Ledger::new(program_id);
        let admin = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        ledger.airdrop(admin, 10 * ONE)?;
        ledger.create_mint(admin, mint, DECIMALS, Some(program_id))?;

        let (registry, _) = pda::find_registry_address(&program_id)?;
        let vault = ledger.initialize_registry(admin, registry, mint)?;
        Ok(Self {
            ledger,
            program_id,
            admin,
            mint,
            registry,
            vault,
        })
    }

    fn entry(&self, owner: &Pubkey) -> Result<Pubkey> {
        Ok(pda::find_entry_address(owner, &self.program_id)?.0)
    }

    fn add(&mut self, owner: Pubkey) -> Result<(), ClientError> {
        let entry = pda::find_entry_address(&owner, &self.program_id)?.0;
        self.ledger
            .add_to_whitelist(self.admin, self.registry, entry, owner)
    }

    fn remove(&mut self, owner: Pubkey) -> Result<(), ClientError> {
        let entry = pda::find_entry_address(&owner, &self.program_id)?.0;
        self.ledger
            .remove_from_whitelist(self.admin, self.registry, entry, owner)
    }

    fn is_whitelisted(&self, owner: Pubkey) -> Result<bool> {
        Ok(self.ledger.is_whitelisted(self.entry(&owner)?, owner)?)
    }

    fn initialize_declaration(&mut self) -> Result<()> {
        let (list, _) = pda::find_declaration_address(&self.mint, &self.program_id)?;
        self.ledger
            .initialize_extra_account_meta_list(self.admin, list, self.mint)?;
        Ok(())
    }

    fn open_account(&mut self, owner: Pubkey) -> Result<Pubkey> {
        Ok(self
            .ledger
            .create_associated_account(self.admin, owner, self.mint)?)
    }

    fn transfer(
        &mut self,
        source: Pubkey,
        destination: Pubkey,
        authority: Pubkey,
        amount: u64,
    ) -> Result<(), ClientError> {
        let extra_accounts = self
            .ledger
            .resolve_transfer_accounts(&source, &self.mint, &destination)?;
        self.ledger.transfer_checked(&TransferRequest {
            source,
            mint: self.mint,
            destination,
            authority,
            amount,
            decimals: DECIMALS,
            extra_accounts,
        })
    }
}

fn rejected_with(result: Result<(), ClientError>, expected: WhitelistError) {
    let err = result.expect_err("operation should have been rejected");
    assert_eq!(err.program_error_code(), Some(expected.code()), "{err}");
}

#[test]
fn whitelist_gates_vault_transfers() -> Result<()> {
    let mut h = Harness::bootstrap()?;
    h.add(h.admin)?;
    h.ledger.mint_to(h.mint, h.vault, h.admin, 100 * ONE)?;
    h.initialize_declaration()?;

    let recipient = Pubkey::new_unique();
    let destination = h.open_account(recipient)?;

    rejected_with(
        h.transfer(h.vault, destination, h.admin, ONE),
        WhitelistError::DestinationNotWhitelisted,
    );
    assert_eq!(h.ledger.balance(&h.vault)?, 100 * ONE);
    assert_eq!(h.ledger.balance(&destination)?, 0);

    h.add(recipient)?;
    h.transfer(h.vault, destination, h.admin, ONE)?;
    assert_eq!(h.ledger.balance(&destination)?, ONE);
    assert_eq!(h.ledger.balance(&h.vault)?, 99 * ONE);

    h.remove(h.admin)?;
    rejected_with(
        h.transfer(h.vault, destination, h.admin, ONE),
        WhitelistError::SourceNotWhitelisted,
    );
    assert_eq!(h.ledger.balance(&destination)?, ONE);
    assert_eq!(h.ledger.balance(&h.vault)?, 99 * ONE);
    Ok(())
}

#[test]
fn membership_follows_add_and_remove() -> Result<()> {
    let mut h = Harness::bootstrap()?;
    let owner = Pubkey::new_unique();

    assert!(!h.is_whitelisted(owner)?);
    h.add(owner)?;
    assert!(h.is_whitelisted(owner)?);
    h.remove(owner)?;
    assert!(!h.is_whitelisted(owner)?);
    h.add(owner)?;
    assert!(h.is_whitelisted(owner)?);
    Ok(())
}

#[test]
fn entry_lifecycle_violations() -> Result<()> {
    let mut h = Harness::bootstrap()?;
    let owner = Pubkey::new_unique();

    rejected_with(h.remove(owner), WhitelistError::NotWhitelisted);
    h.add(owner)?;
    rejected_with(h.add(owner), WhitelistError::AlreadyWhitelisted);
    assert!(h.is_whitelisted(owner)?);

    h.remove(owner)?;
    rejected_with(h.remove(owner), WhitelistError::NotWhitelisted);
    assert!(!h.is_whitelisted(owner)?);
    Ok(())
}

#[test]
fn only_the_administrator_mutates_the_whitelist() -> Result<()> {
    let mut h = Harness::bootstrap()?;
    let intruder = Pubkey::new_unique();
    let owner = Pubkey::new_unique();
    h.ledger.airdrop(intruder, ONE)?;
    let entry = h.entry(&owner)?;

    rejected_with(
        h.ledger
            .add_to_whitelist(intruder, h.registry, entry, owner),
        WhitelistError::Unauthorized,
    );
    assert!(!h.is_whitelisted(owner)?);

    h.add(owner)?;
    rejected_with(
        h.ledger
            .remove_from_whitelist(intruder, h.registry, entry, owner),
        WhitelistError::Unauthorized,
    );
    assert!(h.is_whitelisted(owner)?);
    Ok(())
}

#[test]
fn whitelist_requires_an_initialized_registry() -> Result<()> {
    let program_id = whitelist_hook::ID;
    let mut ledger = Ledger::new(program_id);
    let admin = Pubkey::new_unique();
    let owner = Pubkey::new_unique();
    ledger.airdrop(admin, ONE)?;

    let (registry, _) = pda::find_registry_address(&program_id)?;
    let (entry, _) = pda::find_entry_address(&owner, &program_id)?;
    rejected_with(
        ledger.add_to_whitelist(admin, registry, entry, owner),
        WhitelistError::NotInitialized,
    );
    Ok(())
}

#[test]
fn entry_at_forged_address_is_rejected() -> Result<()> {
    let mut h = Harness::bootstrap()?;
    let owner = Pubkey::new_unique();
    let forged = h.entry(&Pubkey::new_unique())?;

    rejected_with(
        h.ledger
            .add_to_whitelist(h.admin, h.registry, forged, owner),
        WhitelistError::InvalidDerivation,
    );
    Ok(())
}

#[test]
fn transfers_need_the_declaration() -> Result<()> {
    let mut h = Harness::bootstrap()?;
    let recipient = Pubkey::new_unique();
    h.add(h.admin)?;
    h.add(recipient)?;
    h.ledger.mint_to(h.mint, h.vault, h.admin, 5 * ONE)?;
    let destination = h.open_account(recipient)?;

    rejected_with(
        h.transfer(h.vault, destination, h.admin, ONE),
        WhitelistError::NotInitialized,
    );
    assert_eq!(h.ledger.balance(&h.vault)?, 5 * ONE);

    h.initialize_declaration()?;
    h.transfer(h.vault, destination, h.admin, ONE)?;
    assert_eq!(h.ledger.balance(&destination)?, ONE);
    Ok(())
}

#[test]
fn substituted_entry_cannot_unlock_a_transfer() -> Result<()> {
    let mut h = Harness::bootstrap()?;
    let recipient = Pubkey::new_unique();
    h.add(h.admin)?;
    h.ledger.mint_to(h.mint, h.vault, h.admin, ONE)?;
    h.initialize_declaration()?;
    let destination = h.open_account(recipient)?;

    let mut extra_accounts = h
        .ledger
        .resolve_transfer_accounts(&h.vault, &h.mint, &destination)?;
    // Pass the admin's valid entry in place of the recipient's.
    let recipient_entry = h.entry(&recipient)?;
    assert_eq!(extra_accounts[3].pubkey, recipient_entry);
    extra_accounts[3] = extra_accounts[2].clone();

    let err = h
        .ledger
        .transfer_checked(&TransferRequest {
            source: h.vault,
            mint: h.mint,
            destination,
            authority: h.admin,
            amount: ONE,
            decimals: DECIMALS,
            extra_accounts,
        })
        .expect_err("substituted entry should be rejected");
    assert!(
        matches!(
            err,
            ClientError::Ledger(LedgerError::MissingHookAccount(key)) if key == recipient_entry
        ),
        "{err}"
    );
    assert_eq!(h.ledger.balance(&destination)?, 0);
    Ok(())
}

#[test]
fn self_transfer_checks_the_owner_on_both_sides() -> Result<()> {
    let mut h = Harness::bootstrap()?;
    h.ledger.mint_to(h.mint, h.vault, h.admin, ONE)?;
    h.initialize_declaration()?;

    rejected_with(
        h.transfer(h.vault, h.vault, h.admin, ONE),
        WhitelistError::SourceNotWhitelisted,
    );

    h.add(h.admin)?;
    h.transfer(h.vault, h.vault, h.admin, ONE)?;
    assert_eq!(h.ledger.balance(&h.vault)?, ONE);
    Ok(())
}

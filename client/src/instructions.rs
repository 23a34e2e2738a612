//! Instruction builders for the whitelist hook program.
//!
//! Account lists come from the program's generated `accounts` structs and
//! instruction data from its generated `instruction` structs, so builders
//! stay in step with the handlers.

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::{InstructionData, ToAccountMetas};
use anchor_spl::token_2022::spl_token_2022;

use whitelist_hook::declaration::{self, TransferParties};
use whitelist_hook::pda;

use crate::error::ClientError;
use crate::ledger::associated_address;

fn system_program() -> Pubkey {
    anchor_lang::system_program::ID
}

pub fn create_mint(
    program_id: &Pubkey,
    payer: &Pubkey,
    mint: &Pubkey,
    decimals: u8,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: whitelist_hook::accounts::CreateMint {
            payer: *payer,
            mint: *mint,
            system_program: system_program(),
            token_program: spl_token_2022::ID,
        }
        .to_account_metas(None),
        data: whitelist_hook::instruction::CreateMint { decimals }.data(),
    }
}

pub fn initialize_registry(
    program_id: &Pubkey,
    admin: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, ClientError> {
    let (registry, _) = pda::find_registry_address(program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: whitelist_hook::accounts::InitializeRegistry {
            admin: *admin,
            registry,
            mint: *mint,
            vault: associated_address(admin, mint),
            associated_token_program: anchor_spl::associated_token::ID,
            token_program: spl_token_2022::ID,
            system_program: system_program(),
        }
        .to_account_metas(None),
        data: whitelist_hook::instruction::InitializeRegistry {}.data(),
    })
}

pub fn add_to_whitelist(
    program_id: &Pubkey,
    admin: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction, ClientError> {
    let (registry, _) = pda::find_registry_address(program_id)?;
    let (whitelist_entry, _) = pda::find_entry_address(owner, program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: whitelist_hook::accounts::AddToWhitelist {
            admin: *admin,
            registry,
            whitelist_entry,
            system_program: system_program(),
        }
        .to_account_metas(None),
        data: whitelist_hook::instruction::AddToWhitelist { owner: *owner }.data(),
    })
}

pub fn remove_from_whitelist(
    program_id: &Pubkey,
    admin: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction, ClientError> {
    let (registry, _) = pda::find_registry_address(program_id)?;
    let (whitelist_entry, _) = pda::find_entry_address(owner, program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: whitelist_hook::accounts::RemoveFromWhitelist {
            admin: *admin,
            registry,
            whitelist_entry,
            system_program: system_program(),
        }
        .to_account_metas(None),
        data: whitelist_hook::instruction::RemoveFromWhitelist { owner: *owner }.data(),
    })
}

pub fn is_whitelisted(program_id: &Pubkey, owner: &Pubkey) -> Result<Instruction, ClientError> {
    let (whitelist_entry, _) = pda::find_entry_address(owner, program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: whitelist_hook::accounts::IsWhitelisted { whitelist_entry }
            .to_account_metas(None),
        data: whitelist_hook::instruction::IsWhitelisted { owner: *owner }.data(),
    })
}

pub fn initialize_extra_account_meta_list(
    program_id: &Pubkey,
    payer: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, ClientError> {
    let (extra_account_meta_list, _) = pda::find_declaration_address(mint, program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: whitelist_hook::accounts::InitializeExtraAccountMetaList {
            payer: *payer,
            extra_account_meta_list,
            mint: *mint,
            system_program: system_program(),
        }
        .to_account_metas(None),
        data: whitelist_hook::instruction::InitializeExtraAccountMetaList {}.data(),
    })
}

/// Token-2022 `transfer_checked` with the hook's extra accounts appended.
/// `parties` names the mint and the owners of both token accounts.
pub fn transfer_checked_with_hook(
    program_id: &Pubkey,
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    parties: &TransferParties,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ClientError> {
    let mut instruction = spl_token_2022::instruction::transfer_checked(
        &spl_token_2022::ID,
        source,
        &parties.mint,
        destination,
        authority,
        &[],
        amount,
        decimals,
    )?;
    instruction
        .accounts
        .extend(declaration::resolve(parties, program_id)?);
    Ok(instruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROGRAM: Pubkey = whitelist_hook::ID;

    #[test]
    fn add_targets_the_owner_entry() {
        let admin = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let ix = add_to_whitelist(&PROGRAM, &admin, &owner).unwrap();

        assert_eq!(ix.program_id, PROGRAM);
        assert_eq!(ix.accounts[0].pubkey, admin);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(
            ix.accounts[1].pubkey,
            pda::find_registry_address(&PROGRAM).unwrap().0
        );
        assert_eq!(
            ix.accounts[2].pubkey,
            pda::find_entry_address(&owner, &PROGRAM).unwrap().0
        );
        assert!(ix.accounts[2].is_writable);
        assert_eq!(&ix.data[8..], owner.as_ref());
    }

    #[test]
    fn add_and_remove_use_distinct_discriminators() {
        let admin = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let add = add_to_whitelist(&PROGRAM, &admin, &owner).unwrap();
        let remove = remove_from_whitelist(&PROGRAM, &admin, &owner).unwrap();
        assert_ne!(add.data[..8], remove.data[..8]);
        assert_eq!(add.accounts, remove.accounts);
    }

    #[test]
    fn registry_builder_includes_admin_vault() {
        let admin = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = initialize_registry(&PROGRAM, &admin, &mint).unwrap();
        let keys: Vec<Pubkey> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert!(keys.contains(&associated_address(&admin, &mint)));
        assert!(keys.contains(&spl_token_2022::ID));
    }

    #[test]
    fn hooked_transfer_appends_declared_accounts() {
        let parties = TransferParties {
            mint: Pubkey::new_unique(),
            source_owner: Pubkey::new_unique(),
            destination_owner: Pubkey::new_unique(),
        };
        let source = associated_address(&parties.source_owner, &parties.mint);
        let destination = associated_address(&parties.destination_owner, &parties.mint);
        let ix = transfer_checked_with_hook(
            &PROGRAM,
            &source,
            &destination,
            &parties.source_owner,
            &parties,
            1_000,
            9,
        )
        .unwrap();

        assert_eq!(ix.program_id, spl_token_2022::ID);
        assert_eq!(ix.accounts.len(), 4 + 5);
        assert_eq!(
            ix.accounts[4..].to_vec(),
            declaration::resolve(&parties, &PROGRAM).unwrap()
        );
    }
}

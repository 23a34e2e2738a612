use anchor_lang::prelude::*;
use anchor_lang::system_program::{
    allocate, assign, create_account, transfer, Allocate, Assign, CreateAccount, Transfer,
};

use crate::math::{safe_add, top_up};

/// Creates a program-owned account at a PDA. An address that was pre-funded
/// is topped up to rent exemption instead of failing `create_account`.
pub fn create_pda_account<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    space: usize,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let required = Rent::get()?.minimum_balance(space);
    let current = target.lamports();

    if current == 0 {
        return create_account(
            CpiContext::new_with_signer(
                system_program.clone(),
                CreateAccount {
                    from: payer.clone(),
                    to: target.clone(),
                },
                signer_seeds,
            ),
            required,
            space as u64,
            &crate::ID,
        );
    }

    let shortfall = top_up(current, required);
    if shortfall > 0 {
        transfer(
            CpiContext::new(
                system_program.clone(),
                Transfer {
                    from: payer.clone(),
                    to: target.clone(),
                },
            ),
            shortfall,
        )?;
    }
    allocate(
        CpiContext::new_with_signer(
            system_program.clone(),
            Allocate {
                account_to_allocate: target.clone(),
            },
            signer_seeds,
        ),
        space as u64,
    )?;
    assign(
        CpiContext::new_with_signer(
            system_program.clone(),
            Assign {
                account_to_assign: target.clone(),
            },
            signer_seeds,
        ),
        &crate::ID,
    )
}

/// Serializes `value` with its discriminator into the account's data.
pub fn write_account<T: AccountSerialize>(info: &AccountInfo<'_>, value: &T) -> Result<()> {
    let mut data = info.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data[..];
    value.try_serialize(&mut writer)
}

/// Drains a program-owned account into `destination` and hands it back to
/// the system program.
pub fn close_pda_account<'info>(
    target: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
) -> Result<()> {
    let refunded = safe_add(destination.lamports(), target.lamports())?;
    **destination.try_borrow_mut_lamports()? = refunded;
    **target.try_borrow_mut_lamports()? = 0;

    target.assign(&anchor_lang::system_program::ID);
    target.realloc(0, false)?;
    Ok(())
}

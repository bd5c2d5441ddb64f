// Raffle Program - Utility Functions
use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey, rent::Rent};

use crate::raffle_error::RaffleError;
use crate::raffle_state::RAFFLE_SEED;

/// Find the program derived address of the raffle
pub fn find_raffle_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RAFFLE_SEED], program_id)
}

/// Move lamports out of the program-owned raffle account.
///
/// The raffle must stay rent-exempt after the transfer.
pub fn transfer_from_raffle(
    raffle_info: &AccountInfo,
    to_info: &AccountInfo,
    amount: u64,
    rent: &Rent,
) -> ProgramResult {
    if !to_info.is_writable {
        return Err(RaffleError::PayoutFailed.into());
    }

    let remaining = raffle_info
        .lamports()
        .checked_sub(amount)
        .ok_or(RaffleError::PayoutFailed)?;
    if remaining < rent.minimum_balance(raffle_info.data_len()) {
        return Err(RaffleError::PayoutFailed.into());
    }
    let credited = to_info
        .lamports()
        .checked_add(amount)
        .ok_or(RaffleError::PayoutFailed)?;

    **raffle_info.try_borrow_mut_lamports()? = remaining;
    **to_info.try_borrow_mut_lamports()? = credited;
    Ok(())
}

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}

use solana_program::{program_error::ProgramError, decode_error::DecodeError, msg, program_error::PrintProgramError};
use thiserror::Error;

/// Errors that may be returned by the Raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Payment is below the entrance fee
    #[error("Not enough lamports sent to enter the raffle")]
    InsufficientPayment,

    /// Entries are closed while a winner is being calculated
    #[error("Raffle is not open")]
    RoundNotOpen,

    /// Upkeep conditions are not satisfied
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// Fulfillment does not match the pending request
    #[error("Unrecognized randomness request")]
    UnrecognizedRequest,

    /// Prize could not be transferred to the winner
    #[error("Prize transfer to the winner failed")]
    PayoutFailed,

    /// Player index lookup past the end of the list
    #[error("Player index out of range")]
    IndexOutOfRange,

    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// Raffle account is already owned by the program
    #[error("Raffle already initialized")]
    AlreadyInitialized,

    /// Configuration values rejected at initialization
    #[error("Invalid raffle configuration")]
    InvalidConfig,

    /// Account is not the raffle PDA of this program
    #[error("Invalid raffle account")]
    InvalidRaffleAccount,

    /// Player list has reached the account capacity
    #[error("Raffle is full")]
    RaffleFull,

    /// Only the configured coordinator may deliver randomness
    #[error("Only the coordinator can fulfill randomness requests")]
    OnlyCoordinatorCanFulfill,

    /// Fulfillment did not include a random word
    #[error("Fulfillment carried no random words")]
    MissingRandomWords,

    /// Pool or nonce arithmetic overflowed
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}

// Structured log records for off-chain indexers and the oracle network
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult,
    hash::hash,
    log::sol_log_data,
    pubkey::Pubkey,
};

/// A borsh-encoded record written to the program log with `sol_log_data`.
///
/// Each record is logged as two data fields: an 8-byte discriminator taken from
/// `sha256("event:<NAME>")`, followed by the serialized payload.
pub trait Event: BorshSerialize {
    const NAME: &'static str;

    fn discriminator() -> [u8; 8] {
        let digest = hash(format!("event:{}", Self::NAME).as_bytes());
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&digest.to_bytes()[..8]);
        discriminator
    }

    fn emit(&self) -> ProgramResult {
        let payload = self.try_to_vec()?;
        sol_log_data(&[&Self::discriminator(), &payload]);
        Ok(())
    }
}

/// A player bought an entry into the current round
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RaffleEnter {
    pub player: Pubkey,
    /// Lamports paid, including any amount above the entrance fee
    pub amount: u64,
}

/// The round closed and a randomness request was issued
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RequestedRaffleWinner {
    pub request_id: u64,
}

/// The pending request was fulfilled and the pool paid out
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WinnerPicked {
    pub winner: Pubkey,
    pub prize: u64,
}

/// Request record picked up by the oracle network
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RandomWordsRequested {
    pub key_hash: [u8; 32],
    pub request_id: u64,
    pub sender: Pubkey,
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
    pub nonce: u64,
}

impl Event for RaffleEnter {
    const NAME: &'static str = "RaffleEnter";
}

impl Event for RequestedRaffleWinner {
    const NAME: &'static str = "RequestedRaffleWinner";
}

impl Event for WinnerPicked {
    const NAME: &'static str = "WinnerPicked";
}

impl Event for RandomWordsRequested {
    const NAME: &'static str = "RandomWordsRequested";
}

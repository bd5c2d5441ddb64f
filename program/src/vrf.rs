// Randomness coordinator integration for the raffle program
use arrayref::array_ref;
use solana_program::{hash::hashv, msg, program_error::ProgramError, pubkey::Pubkey};

use crate::events::{Event, RandomWordsRequested};

/// Block confirmations the oracle waits before answering
pub const REQUEST_CONFIRMATIONS: u16 = 3;
/// Random words requested per round
pub const NUM_WORDS: u32 = 1;

/// Parameters of a single randomness request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomWordsRequest {
    /// Gas lane / proving key selecting the oracle price tier
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
    /// Consumer issuing the request (the raffle account)
    pub sender: Pubkey,
    /// Consumer-side request counter, unique per request
    pub nonce: u64,
}

/// External randomness oracle.
///
/// The raffle only hands over the request and keeps the returned id; the random
/// value arrives later through a separate fulfillment instruction, so
/// implementations must never block waiting for it.
pub trait RandomnessCoordinator {
    fn request_random_words(&mut self, request: &RandomWordsRequest) -> Result<u64, ProgramError>;
}

/// Coordinator client used on-chain: publishes the request to the program log,
/// where the oracle network picks it up and answers with `FulfillRandomWords`.
pub struct ProgramLogCoordinator;

impl RandomnessCoordinator for ProgramLogCoordinator {
    fn request_random_words(&mut self, request: &RandomWordsRequest) -> Result<u64, ProgramError> {
        let request_id = compute_request_id(
            &request.key_hash,
            &request.sender,
            request.subscription_id,
            request.nonce,
        );

        RandomWordsRequested {
            key_hash: request.key_hash,
            request_id,
            sender: request.sender,
            subscription_id: request.subscription_id,
            request_confirmations: request.request_confirmations,
            callback_gas_limit: request.callback_gas_limit,
            num_words: request.num_words,
            nonce: request.nonce,
        }
        .emit()?;

        msg!(
            "Random words requested: id={}, subscription={}, confirmations={}, gas limit={}, words={}",
            request_id,
            request.subscription_id,
            request.request_confirmations,
            request.callback_gas_limit,
            request.num_words
        );
        Ok(request_id)
    }
}

/// Derive a request id from the request's identifying fields.
///
/// First 8 bytes (little-endian) of `sha256(key_hash || sender || subscription_id || nonce)`.
pub fn compute_request_id(key_hash: &[u8; 32], sender: &Pubkey, subscription_id: u64, nonce: u64) -> u64 {
    let digest = hashv(&[
        &key_hash[..],
        sender.as_ref(),
        &subscription_id.to_le_bytes()[..],
        &nonce.to_le_bytes()[..],
    ])
    .to_bytes();
    u64::from_le_bytes(*array_ref![digest, 0, 8])
}

// Get a winner index from a random word
//
// The word is read as a 256-bit big-endian integer and reduced modulo the entry
// count without truncation.
pub fn get_random_winner_index(random_word: &[u8; 32], total_entries: u64) -> u64 {
    if total_entries == 0 {
        return 0;
    }

    let modulus = total_entries as u128;
    random_word
        .iter()
        .fold(0u128, |acc, byte| ((acc << 8) | *byte as u128) % modulus) as u64
}

/// Encode a u64 as a 256-bit big-endian random word
pub fn random_word_from_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
};

use crate::events::{RaffleEnter, RequestedRaffleWinner, WinnerPicked};
use crate::raffle_error::RaffleError;
use crate::vrf::{self, RandomWordsRequest, RandomnessCoordinator, NUM_WORDS, REQUEST_CONFIRMATIONS};

/// Seed of the raffle PDA
pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Upper bound on `max_players` so the account fits a single CPI allocation
pub const MAX_PLAYERS: u16 = 256;

/// Phase of the current round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Randomness requested, waiting for the coordinator
    Calculating,
}

/// Immutable raffle settings, fixed at initialization
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RaffleConfig {
    /// Minimum lamports per entry (0.01 SOL = 10,000,000 lamports)
    pub entrance_fee: u64,
    /// Seconds a round must run before upkeep is allowed
    pub interval: u64,
    /// Gas lane / proving key passed through to the coordinator
    pub key_hash: [u8; 32],
    /// Oracle subscription that pays for requests
    pub subscription_id: u64,
    /// Gas budget for the fulfillment callback
    pub callback_gas_limit: u32,
    /// Capacity of the player list
    pub max_players: u16,
    /// Oracle identity allowed to fulfil requests
    pub coordinator: Pubkey,
}

impl RaffleConfig {
    pub const LEN: usize = 8 + 8 + 32 + 8 + 4 + 2 + 32;

    pub fn validate(&self) -> ProgramResult {
        if self.max_players == 0 || self.max_players > MAX_PLAYERS {
            msg!("Max players must be between 1 and {}", MAX_PLAYERS);
            return Err(RaffleError::InvalidConfig.into());
        }
        if self.callback_gas_limit == 0 {
            msg!("Callback gas limit must be greater than zero");
            return Err(RaffleError::InvalidConfig.into());
        }
        Ok(())
    }
}

impl Default for RaffleConfig {
    fn default() -> Self {
        // Local network settings
        // Entrance fee: 0.01 SOL = 10,000,000 lamports
        // Interval: 30 seconds
        // Key hash: 0x474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c
        let key_hash = [
            71, 78, 52, 160, 119, 223, 88, 128, 125, 190, 156, 150, 211, 192, 9, 178, 59, 60, 109,
            12, 206, 67, 62, 89, 187, 245, 179, 79, 130, 59, 197, 108,
        ];

        Self {
            entrance_fee: 10_000_000,
            interval: 30,
            key_hash,
            subscription_id: 1,
            callback_gas_limit: 500_000,
            max_players: MAX_PLAYERS,
            coordinator: Pubkey::default(),
        }
    }
}

/// Result of the upkeep predicate together with the values it was computed from
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub upkeep_needed: bool,
    pub state: RaffleState,
    /// Seconds since the round started
    pub elapsed: i64,
    pub num_players: u64,
    pub pool_balance: u64,
}

/// Raffle account data
///
/// The round is recycled forever: `Open -> Calculating -> Open`, one winner per
/// cycle. Fields are private so every mutation goes through `enter`,
/// `perform_upkeep` or `fulfill_random_words`.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Raffle {
    is_initialized: bool,
    bump: u8,
    config: RaffleConfig,
    state: RaffleState,
    /// Entries in purchase order, one per paid entry
    players: Vec<Pubkey>,
    last_timestamp: UnixTimestamp,
    recent_winner: Option<Pubkey>,
    pending_request_id: Option<u64>,
    request_nonce: u64,
    /// Lamports collected from entries since the last payout
    pool_balance: u64,
}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Raffle {
    /// Serialized size excluding the player entries
    pub const BASE_LEN: usize = 1 + 1 + RaffleConfig::LEN + 1 + 4 + 8 + (1 + 32) + (1 + 8) + 8 + 8;

    /// Account size able to hold `max_players` entries
    pub fn space(max_players: u16) -> usize {
        Self::BASE_LEN + 32 * max_players as usize
    }

    /// Open the first round
    pub fn new(config: RaffleConfig, bump: u8, now: UnixTimestamp) -> Self {
        Self {
            is_initialized: true,
            bump,
            config,
            state: RaffleState::Open,
            players: Vec::new(),
            last_timestamp: now,
            recent_winner: None,
            pending_request_id: None,
            request_nonce: 0,
            pool_balance: 0,
        }
    }

    /// Deserialize from account data, ignoring unused trailing capacity
    pub fn load(data: &[u8]) -> Result<Self, ProgramError> {
        let raffle = Self::deserialize(&mut &data[..]).map_err(|_| ProgramError::InvalidAccountData)?;
        if !raffle.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(raffle)
    }

    pub fn save(&self, data: &mut [u8]) -> ProgramResult {
        self.serialize(&mut &mut data[..])?;
        Ok(())
    }

    /// Add a paid entry to the current round
    pub fn enter(&mut self, player: Pubkey, amount_paid: u64) -> Result<RaffleEnter, ProgramError> {
        if self.state != RaffleState::Open {
            msg!("Raffle is calculating a winner, entries are closed");
            return Err(RaffleError::RoundNotOpen.into());
        }
        if amount_paid < self.config.entrance_fee {
            msg!(
                "Entrance fee is {} lamports, received {}",
                self.config.entrance_fee,
                amount_paid
            );
            return Err(RaffleError::InsufficientPayment.into());
        }
        if self.players.len() >= self.config.max_players as usize {
            msg!("Raffle is full: {} players", self.players.len());
            return Err(RaffleError::RaffleFull.into());
        }

        let pool_balance = self
            .pool_balance
            .checked_add(amount_paid)
            .ok_or(RaffleError::ArithmeticOverflow)?;

        self.players.push(player);
        self.pool_balance = pool_balance;

        Ok(RaffleEnter {
            player,
            amount: amount_paid,
        })
    }

    /// Whether winner selection may start at `now`. Read-only.
    pub fn check_upkeep(&self, now: UnixTimestamp) -> UpkeepStatus {
        let elapsed = now.saturating_sub(self.last_timestamp);
        let is_open = self.state == RaffleState::Open;
        let time_passed = elapsed >= 0 && elapsed as u64 >= self.config.interval;
        let has_players = !self.players.is_empty();
        let has_balance = self.pool_balance > 0;

        UpkeepStatus {
            upkeep_needed: is_open && time_passed && has_players && has_balance,
            state: self.state,
            elapsed,
            num_players: self.players.len() as u64,
            pool_balance: self.pool_balance,
        }
    }

    /// Close the round and request randomness for it
    pub fn perform_upkeep<C: RandomnessCoordinator>(
        &mut self,
        raffle_key: &Pubkey,
        now: UnixTimestamp,
        coordinator: &mut C,
    ) -> Result<RequestedRaffleWinner, ProgramError> {
        let status = self.check_upkeep(now);
        if !status.upkeep_needed {
            msg!(
                "Upkeep not needed: balance={}, players={}, state={:?}",
                status.pool_balance,
                status.num_players,
                status.state
            );
            return Err(RaffleError::UpkeepNotNeeded.into());
        }

        let request = RandomWordsRequest {
            key_hash: self.config.key_hash,
            subscription_id: self.config.subscription_id,
            request_confirmations: REQUEST_CONFIRMATIONS,
            callback_gas_limit: self.config.callback_gas_limit,
            num_words: NUM_WORDS,
            sender: *raffle_key,
            nonce: self.request_nonce,
        };
        let request_id = coordinator.request_random_words(&request)?;
        let next_nonce = self
            .request_nonce
            .checked_add(1)
            .ok_or(RaffleError::ArithmeticOverflow)?;

        self.state = RaffleState::Calculating;
        self.pending_request_id = Some(request_id);
        self.request_nonce = next_nonce;

        Ok(RequestedRaffleWinner { request_id })
    }

    /// Settle the pending request: pick the winner, pay the pool, reopen.
    ///
    /// `payout` moves `prize` lamports to the winner. If it fails the round is
    /// left exactly as it was and `PayoutFailed` is returned.
    pub fn fulfill_random_words<F>(
        &mut self,
        request_id: u64,
        random_words: &[[u8; 32]],
        now: UnixTimestamp,
        payout: F,
    ) -> Result<WinnerPicked, ProgramError>
    where
        F: FnOnce(&Pubkey, u64) -> ProgramResult,
    {
        if self.pending_request_id != Some(request_id) {
            msg!("Unrecognized request id {}", request_id);
            return Err(RaffleError::UnrecognizedRequest.into());
        }
        let random_word = random_words
            .first()
            .ok_or(RaffleError::MissingRandomWords)?;

        let winner = self.winner_for(random_word)?;
        let prize = self.pool_balance;

        if let Err(err) = payout(&winner, prize) {
            msg!("Transfer of {} lamports to {} failed: {}", prize, winner, err);
            return Err(RaffleError::PayoutFailed.into());
        }

        self.recent_winner = Some(winner);
        self.players.clear();
        self.pool_balance = 0;
        self.state = RaffleState::Open;
        self.last_timestamp = now;
        self.pending_request_id = None;

        Ok(WinnerPicked { winner, prize })
    }

    /// Player selected by `random_word` from the current entries
    pub fn winner_for(&self, random_word: &[u8; 32]) -> Result<Pubkey, ProgramError> {
        let index = vrf::get_random_winner_index(random_word, self.number_of_players());
        self.player(index)
    }

    pub fn bump(&self) -> u8 {
        self.bump
    }

    pub fn config(&self) -> &RaffleConfig {
        &self.config
    }

    pub fn raffle_state(&self) -> RaffleState {
        self.state
    }

    pub fn entrance_fee(&self) -> u64 {
        self.config.entrance_fee
    }

    pub fn interval(&self) -> u64 {
        self.config.interval
    }

    pub fn coordinator(&self) -> &Pubkey {
        &self.config.coordinator
    }

    pub fn max_players(&self) -> u16 {
        self.config.max_players
    }

    pub fn recent_winner(&self) -> Option<Pubkey> {
        self.recent_winner
    }

    pub fn players(&self) -> &[Pubkey] {
        &self.players
    }

    pub fn player(&self, index: u64) -> Result<Pubkey, ProgramError> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.players.get(index))
            .copied()
            .ok_or_else(|| RaffleError::IndexOutOfRange.into())
    }

    pub fn number_of_players(&self) -> u64 {
        self.players.len() as u64
    }

    pub fn latest_timestamp(&self) -> UnixTimestamp {
        self.last_timestamp
    }

    pub fn pending_request_id(&self) -> Option<u64> {
        self.pending_request_id
    }

    pub fn request_nonce(&self) -> u64 {
        self.request_nonce
    }

    pub fn pool_balance(&self) -> u64 {
        self.pool_balance
    }

    pub fn request_confirmations(&self) -> u16 {
        REQUEST_CONFIRMATIONS
    }

    pub fn num_words(&self) -> u32 {
        NUM_WORDS
    }
}

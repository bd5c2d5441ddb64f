use arrayref::{array_ref, array_refs};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::raffle_error::RaffleError;
use crate::raffle_state::RaffleConfig;
use crate::utils::find_raffle_address;

/// Size of one random word delivered by the coordinator
pub const RANDOM_WORD_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Create the raffle account and open the first round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The payer funding the raffle account
    /// 1. `[writable]` The raffle account (PDA, seeds = ["raffle"])
    /// 2. `[]` The system program
    InitializeRaffle {
        /// Immutable raffle settings
        config: RaffleConfig,
    },

    /// Buy one entry into the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The player paying the entrance fee
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    EnterRaffle {
        /// Lamports to pay, at least the entrance fee
        amount: u64,
    },

    /// Evaluate the upkeep predicate without changing anything.
    /// The `UpkeepStatus` is written to the transaction return data.
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep {},

    /// Close the round and request randomness (anyone can trigger this)
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any user
    /// 1. `[writable]` The raffle account
    PerformUpkeep {},

    /// Deliver randomness for the pending request and pay the winner
    ///
    /// Accounts expected:
    /// 0. `[signer]` The coordinator configured at initialization
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The winning player
    FulfillRandomWords {
        /// Id returned when the request was issued
        request_id: u64,
        /// 256-bit big-endian random values
        random_words: Vec<[u8; RANDOM_WORD_LEN]>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input.split_first().ok_or(RaffleError::InvalidInstructionData)?;

        Ok(match tag {
            0 => {
                let (config, _) = Self::unpack_config(rest)?;
                Self::InitializeRaffle { config }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::EnterRaffle { amount }
            }
            2 => Self::CheckUpkeep {},
            3 => Self::PerformUpkeep {},
            4 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = rest
                    .split_first()
                    .ok_or(RaffleError::InvalidInstructionData)?;
                let mut random_words = Vec::with_capacity(*count as usize);
                for _ in 0..*count {
                    let (word, next) = Self::unpack_fixed_bytes::<RANDOM_WORD_LEN>(rest)?;
                    random_words.push(word);
                    rest = next;
                }
                Self::FulfillRandomWords {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(RaffleError::InvalidInstructionData.into()),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Self::InitializeRaffle { config } => {
                buf.push(0);
                buf.extend_from_slice(&config.entrance_fee.to_le_bytes());
                buf.extend_from_slice(&config.interval.to_le_bytes());
                buf.extend_from_slice(&config.key_hash);
                buf.extend_from_slice(&config.subscription_id.to_le_bytes());
                buf.extend_from_slice(&config.callback_gas_limit.to_le_bytes());
                buf.extend_from_slice(&config.max_players.to_le_bytes());
                buf.extend_from_slice(config.coordinator.as_ref());
            }
            Self::EnterRaffle { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep {} => buf.push(2),
            Self::PerformUpkeep {} => buf.push(3),
            Self::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                buf.push(4);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.push(random_words.len() as u8);
                for word in random_words {
                    buf.extend_from_slice(word);
                }
            }
        }
        buf
    }

    fn unpack_config(input: &[u8]) -> Result<(RaffleConfig, &[u8]), ProgramError> {
        if input.len() < RaffleConfig::LEN {
            return Err(RaffleError::InvalidInstructionData.into());
        }
        let (src, rest) = input.split_at(RaffleConfig::LEN);
        let src = array_ref![src, 0, RaffleConfig::LEN];
        let (
            entrance_fee,
            interval,
            key_hash,
            subscription_id,
            callback_gas_limit,
            max_players,
            coordinator,
        ) = array_refs![src, 8, 8, 32, 8, 4, 2, 32];

        let config = RaffleConfig {
            entrance_fee: u64::from_le_bytes(*entrance_fee),
            interval: u64::from_le_bytes(*interval),
            key_hash: *key_hash,
            subscription_id: u64::from_le_bytes(*subscription_id),
            callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
            max_players: u16::from_le_bytes(*max_players),
            coordinator: Pubkey::new_from_array(*coordinator),
        };
        Ok((config, rest))
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<8>(input)?;
        Ok((u64::from_le_bytes(bytes), rest))
    }

    fn unpack_fixed_bytes<const N: usize>(input: &[u8]) -> Result<([u8; N], &[u8]), ProgramError> {
        if input.len() < N {
            return Err(RaffleError::InvalidInstructionData.into());
        }
        let (bytes, rest) = input.split_at(N);
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok((out, rest))
    }
}

/// Create initialize_raffle instruction
pub fn initialize_raffle(
    program_id: &Pubkey,
    payer: &Pubkey,
    config: RaffleConfig,
) -> Result<Instruction, ProgramError> {
    let (raffle_account, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::InitializeRaffle { config }.pack();

    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(raffle_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create enter_raffle instruction
pub fn enter_raffle(
    program_id: &Pubkey,
    player: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let (raffle_account, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::EnterRaffle { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(raffle_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey) -> Result<Instruction, ProgramError> {
    let (raffle_account, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::CheckUpkeep {}.pack();

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(raffle_account, false)],
        data,
    })
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(program_id: &Pubkey, caller: &Pubkey) -> Result<Instruction, ProgramError> {
    let (raffle_account, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::PerformUpkeep {}.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(raffle_account, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    coordinator: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_words: Vec<[u8; RANDOM_WORD_LEN]>,
) -> Result<Instruction, ProgramError> {
    if random_words.len() > u8::MAX as usize {
        return Err(RaffleError::InvalidInstructionData.into());
    }
    let (raffle_account, _) = find_raffle_address(program_id);
    let data = RaffleInstruction::FulfillRandomWords {
        request_id,
        random_words,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*coordinator, true),
        AccountMeta::new(raffle_account, false),
        AccountMeta::new(*winner, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

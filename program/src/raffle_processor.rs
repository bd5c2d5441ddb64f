use borsh::BorshSerialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::events::Event;
use crate::raffle_error::RaffleError;
use crate::raffle_instruction::{RaffleInstruction, RANDOM_WORD_LEN};
use crate::raffle_state::{Raffle, RaffleConfig, RAFFLE_SEED};
use crate::utils::{find_raffle_address, lamports_to_sol, transfer_from_raffle};
use crate::vrf::ProgramLogCoordinator;

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeRaffle { config } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(accounts, config, program_id)
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep {} => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep {} => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(accounts, request_id, &random_words, program_id)
            }
        }
    }

    /// Process the InitializeRaffle instruction
    ///
    /// Creates the raffle PDA sized for `config.max_players` entries and opens
    /// the first round. Only called once per deployment.
    ///
    /// The first caller chooses the coordinator, so the deployer must send this
    /// in the same step as deploying the program.
    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        config: RaffleConfig,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        config.validate()?;

        let (expected_raffle_pubkey, bump_seed) = find_raffle_address(program_id);
        if *raffle_info.key != expected_raffle_pubkey {
            msg!("Invalid raffle account address");
            return Err(RaffleError::InvalidRaffleAccount.into());
        }

        if raffle_info.owner == program_id {
            msg!("Raffle account is already initialized");
            return Err(RaffleError::AlreadyInitialized.into());
        }

        let space = Raffle::space(config.max_players);
        let rent = Rent::get()?;
        let rent_lamports = rent.minimum_balance(space);
        let bump = [bump_seed];
        let signer_seeds: &[&[u8]] = &[RAFFLE_SEED, &bump];

        if raffle_info.lamports() == 0 {
            invoke_signed(
                &system_instruction::create_account(
                    payer_info.key,
                    raffle_info.key,
                    rent_lamports,
                    space as u64,
                    program_id,
                ),
                &[payer_info.clone(), raffle_info.clone(), system_program_info.clone()],
                &[signer_seeds],
            )?;
        } else {
            // Address was funded before initialization, create_account would fail
            let top_up = rent_lamports.saturating_sub(raffle_info.lamports());
            if top_up > 0 {
                invoke(
                    &system_instruction::transfer(payer_info.key, raffle_info.key, top_up),
                    &[payer_info.clone(), raffle_info.clone(), system_program_info.clone()],
                )?;
            }
            invoke_signed(
                &system_instruction::allocate(raffle_info.key, space as u64),
                &[raffle_info.clone(), system_program_info.clone()],
                &[signer_seeds],
            )?;
            invoke_signed(
                &system_instruction::assign(raffle_info.key, program_id),
                &[raffle_info.clone(), system_program_info.clone()],
                &[signer_seeds],
            )?;
        }

        let clock = Clock::get()?;
        let raffle = Raffle::new(config, bump_seed, clock.unix_timestamp);
        raffle.save(&mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: EntranceFee={} SOL, Interval={}s, MaxPlayers={}, Coordinator={}",
            lamports_to_sol(raffle.entrance_fee()),
            raffle.interval(),
            raffle.max_players(),
            raffle.coordinator()
        );
        Ok(())
    }

    fn process_enter_raffle(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;
        let entered = raffle.enter(*player_info.key, amount)?;

        invoke(
            &system_instruction::transfer(player_info.key, raffle_info.key, amount),
            &[
                player_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.save(&mut raffle_info.data.borrow_mut())?;
        entered.emit()?;

        msg!(
            "Player {} entered with {} lamports. Players: {}, Pool: {} lamports",
            player_info.key,
            amount,
            raffle.number_of_players(),
            raffle.pool_balance()
        );
        Ok(())
    }

    /// Process CheckUpkeep instruction - read-only
    ///
    /// The borsh-encoded `UpkeepStatus` is published as return data so a
    /// scheduler can simulate this instruction and act on the result.
    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let raffle = Self::load_raffle(raffle_info, program_id)?;
        let clock = Clock::get()?;
        let status = raffle.check_upkeep(clock.unix_timestamp);

        set_return_data(&status.try_to_vec()?);

        msg!(
            "Upkeep needed: {} (state={:?}, elapsed={}s, players={}, balance={})",
            status.upkeep_needed,
            status.state,
            status.elapsed,
            status.num_players,
            status.pool_balance
        );
        Ok(())
    }

    /// Process PerformUpkeep instruction - step 1 of winner selection
    /// Closes the round and requests randomness from the coordinator
    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        // Anyone can trigger upkeep, the predicate is the gate
        if !caller_info.is_signer {
            msg!("Initiator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;
        let clock = Clock::get()?;

        let requested = raffle.perform_upkeep(
            raffle_info.key,
            clock.unix_timestamp,
            &mut ProgramLogCoordinator,
        )?;

        raffle.save(&mut raffle_info.data.borrow_mut())?;
        requested.emit()?;

        msg!(
            "Raffle closed with {} players, randomness request {} pending",
            raffle.number_of_players(),
            requested.request_id
        );
        Ok(())
    }

    /// Process FulfillRandomWords instruction - step 2 of winner selection
    /// Uses the coordinator's random word to pick and pay the winner
    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[[u8; RANDOM_WORD_LEN]],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;

        if !coordinator_info.is_signer || coordinator_info.key != raffle.coordinator() {
            msg!("Fulfillment must be signed by coordinator {}", raffle.coordinator());
            return Err(RaffleError::OnlyCoordinatorCanFulfill.into());
        }

        let rent = Rent::get()?;
        let clock = Clock::get()?;

        let picked = raffle.fulfill_random_words(
            request_id,
            random_words,
            clock.unix_timestamp,
            |winner, prize| {
                if winner != winner_info.key {
                    msg!("Winner account {} is not the selected player {}", winner_info.key, winner);
                    return Err(RaffleError::PayoutFailed.into());
                }
                transfer_from_raffle(raffle_info, winner_info, prize, &rent)
            },
        )?;

        raffle.save(&mut raffle_info.data.borrow_mut())?;
        picked.emit()?;

        msg!(
            "Winner picked: {} receives {} SOL",
            picked.winner,
            lamports_to_sol(picked.prize)
        );
        Ok(())
    }

    fn load_raffle(raffle_info: &AccountInfo, program_id: &Pubkey) -> Result<Raffle, ProgramError> {
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by the program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let raffle = Raffle::load(&raffle_info.data.borrow())?;

        let expected = Pubkey::create_program_address(&[RAFFLE_SEED, &[raffle.bump()]], program_id)?;
        if *raffle_info.key != expected {
            msg!("Invalid raffle account address");
            return Err(RaffleError::InvalidRaffleAccount.into());
        }
        Ok(raffle)
    }
}

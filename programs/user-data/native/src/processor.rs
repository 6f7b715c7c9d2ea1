use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{rent::Rent, Sysvar},
};

use crate::{
    address::{user_data_address, USER_DATA_SEED},
    error::UserDataError,
    instruction::UserDataInstruction,
    state::Record,
    transition::{apply_into, SlotState},
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    Processor::process(program_id, accounts, instruction_data)
}

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        if program_id != &crate::ID {
            return Err(ProgramError::IncorrectProgramId);
        }

        let instruction = UserDataInstruction::unpack(instruction_data).map_err(|err| {
            msg!("Failed to decode instruction: {}", err);
            err
        })?;

        match &instruction {
            UserDataInstruction::Initialize { name, .. } => {
                msg!("Instruction: Initialize {{ name: {} }}", name)
            }
            UserDataInstruction::UpdateMessage { .. } => msg!("Instruction: UpdateMessage"),
        }

        let accounts_iter = &mut accounts.iter();
        let owner_info = next_account_info(accounts_iter)?;
        let user_data_info = next_account_info(accounts_iter)?;

        if !owner_info.is_signer {
            msg!("Error: owner did not sign");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if !user_data_info.is_writable {
            msg!("Error: user data account is not writable");
            return Err(ProgramError::InvalidArgument);
        }
        if !user_data_info.data_is_empty() && user_data_info.owner != program_id {
            msg!("Error: user data account is not owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        // an existing record answers `AlreadyInitialized` to anyone, so the
        // address is only checked for a slot that is still absent
        let absent = matches!(
            SlotState::classify(Some(&user_data_info.try_borrow_data()?[..])),
            Ok(SlotState::Absent)
        );
        if absent {
            if let UserDataInstruction::Initialize { .. } = instruction {
                let (expected, bump) = user_data_address(owner_info.key, program_id)?;
                if expected != *user_data_info.key {
                    msg!("Error: {} is not the owner's user data address", user_data_info.key);
                    return Err(UserDataError::Unauthorized.into());
                }

                if user_data_info.data_is_empty() {
                    let system_program = next_account_info(accounts_iter)?;
                    Self::create_slot(
                        program_id,
                        owner_info,
                        user_data_info,
                        system_program,
                        bump,
                    )?;
                }
            }
        }

        let mut data = user_data_info.try_borrow_mut_data()?;
        let written = apply_into(&mut data[..], &instruction, owner_info.key).map_err(|err| {
            msg!("Rejected: {}", err);
            err
        })?;

        msg!("User data written: {} bytes", written);
        Ok(())
    }

    /// Allocates the owner's PDA at full record capacity, funded by the owner.
    ///
    /// Anyone can send lamports to the PDA before it exists, and
    /// `create_account` refuses a funded address. A funded slot is topped up
    /// to rent exemption, then allocated and assigned in place.
    fn create_slot<'a>(
        program_id: &Pubkey,
        owner_info: &AccountInfo<'a>,
        user_data_info: &AccountInfo<'a>,
        system_program: &AccountInfo<'a>,
        bump: u8,
    ) -> ProgramResult {
        let required = Rent::get()?.minimum_balance(Record::CAPACITY);
        let seeds: &[&[u8]] = &[USER_DATA_SEED, owner_info.key.as_ref(), &[bump]];
        msg!("Creating user data account with {} bytes", Record::CAPACITY);

        let current = user_data_info.lamports();
        if current == 0 {
            return invoke_signed(
                &system_instruction::create_account(
                    owner_info.key,
                    user_data_info.key,
                    required,
                    Record::CAPACITY as u64,
                    program_id,
                ),
                &[
                    owner_info.clone(),
                    user_data_info.clone(),
                    system_program.clone(),
                ],
                &[seeds],
            );
        }

        msg!("User data account already holds {} lamports", current);
        let top_up = required.saturating_sub(current);
        if top_up > 0 {
            invoke(
                &system_instruction::transfer(owner_info.key, user_data_info.key, top_up),
                &[
                    owner_info.clone(),
                    user_data_info.clone(),
                    system_program.clone(),
                ],
            )?;
        }

        invoke_signed(
            &system_instruction::allocate(user_data_info.key, Record::CAPACITY as u64),
            &[user_data_info.clone(), system_program.clone()],
            &[seeds],
        )?;
        invoke_signed(
            &system_instruction::assign(user_data_info.key, program_id),
            &[user_data_info.clone(), system_program.clone()],
            &[seeds],
        )
    }
}

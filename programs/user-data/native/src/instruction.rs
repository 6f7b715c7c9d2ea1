use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{
    address::user_data_address,
    error::UserDataError,
    wire::{self, Reader},
};

/// Instructions understood by the user data program.
///
/// Wire format: one opcode byte followed by the variant's string fields in
/// declaration order, each as a u32 little-endian length and UTF-8 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserDataInstruction {
    /// Create the caller's record.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The record owner, pays for the account
    /// 1. `[writable]` The owner's user data PDA
    /// 2. `[]` The system program
    Initialize { name: String, message: String },

    /// Replace the message and bump the update counter.
    ///
    /// Accounts expected:
    /// 0. `[signer]` The record owner
    /// 1. `[writable]` The owner's user data PDA
    UpdateMessage { message: String },
}

impl UserDataInstruction {
    pub const INITIALIZE: u8 = 0;
    pub const UPDATE_MESSAGE: u8 = 1;

    pub fn opcode(&self) -> u8 {
        match self {
            Self::Initialize { .. } => Self::INITIALIZE,
            Self::UpdateMessage { .. } => Self::UPDATE_MESSAGE,
        }
    }

    /// Decodes instruction data. Only structure is checked here; length
    /// limits are enforced when the instruction is applied.
    pub fn unpack(data: &[u8]) -> Result<Self, UserDataError> {
        let mut reader = Reader::new(data);

        let instruction = match reader.read_u8()? {
            Self::INITIALIZE => {
                let name = reader.read_string()?;
                let message = reader.read_string()?;
                Self::Initialize { name, message }
            }
            Self::UPDATE_MESSAGE => Self::UpdateMessage {
                message: reader.read_string()?,
            },
            _ => return Err(UserDataError::UnknownInstruction),
        };

        if reader.offset() != data.len() {
            return Err(UserDataError::MalformedRecord);
        }

        Ok(instruction)
    }

    /// Fails with `ValueTooLong` only if a field length overflows its `u32`
    /// prefix; the 64/256 byte bounds are not checked here.
    pub fn pack(&self) -> Result<Vec<u8>, UserDataError> {
        let mut out = vec![self.opcode()];
        match self {
            Self::Initialize { name, message } => {
                wire::put_string(&mut out, name)?;
                wire::put_string(&mut out, message)?;
            }
            Self::UpdateMessage { message } => wire::put_string(&mut out, message)?,
        }
        Ok(out)
    }
}

/// Builds an `Initialize` instruction targeting `owner`'s record.
pub fn initialize(
    program_id: &Pubkey,
    owner: &Pubkey,
    name: String,
    message: String,
) -> Result<Instruction, UserDataError> {
    let (user_data, _) = user_data_address(owner, program_id)?;
    let data = UserDataInstruction::Initialize { name, message }.pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(user_data, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// Builds an `UpdateMessage` instruction targeting `owner`'s record.
pub fn update_message(
    program_id: &Pubkey,
    owner: &Pubkey,
    message: String,
) -> Result<Instruction, UserDataError> {
    let (user_data, _) = user_data_address(owner, program_id)?;
    let data = UserDataInstruction::UpdateMessage { message }.pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(user_data, false),
        ],
        data,
    })
}

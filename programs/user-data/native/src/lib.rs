use solana_program::declare_id;

declare_id!("CC2jDTjRWxqx2VqKQK6by67KvKomNgcd95c5H3dEEuur");

pub mod address;
pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod storage;
pub mod transition;
mod wire;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

pub use address::{derive_address, user_data_address, USER_DATA_SEED};
pub use error::UserDataError;
pub use instruction::UserDataInstruction;
pub use processor::{process_instruction, Processor};
pub use state::Record;
pub use storage::{execute, Authorizer, MemoryStorage, SignerSet, Storage};
pub use transition::{apply, apply_into, SlotState};

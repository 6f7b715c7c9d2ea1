//! Host-side collaborators of the state machine.
//!
//! On chain the runtime plays both roles: account data is the storage and
//! transaction signatures are the authorizer. These traits describe the same
//! contract for off-chain hosts, with in-memory implementations used for
//! simulation and tests.

use std::collections::{HashMap, HashSet};

use solana_program::pubkey::Pubkey;

use crate::{
    address::user_data_address,
    error::UserDataError,
    instruction::UserDataInstruction,
    state::Record,
    transition::{apply, SlotState},
};

/// Slot storage with an atomic compare-and-swap commit.
pub trait Storage {
    /// Current slot bytes, padding included, or `None` for an absent slot.
    fn read(&self, address: &Pubkey) -> Option<Vec<u8>>;

    /// Writes `new` over the front of the slot if it still equals
    /// `expected`, otherwise fails with `StorageConflict`.
    fn commit(
        &mut self,
        address: &Pubkey,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<(), UserDataError>;
}

/// Confirms that a caller controls the identity it claims.
pub trait Authorizer {
    fn authorize(&self, claimed: &Pubkey) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: HashMap<Pubkey, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, address: &Pubkey) -> Option<Vec<u8>> {
        self.slots.get(address).cloned()
    }

    fn commit(
        &mut self,
        address: &Pubkey,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<(), UserDataError> {
        if self.slots.get(address).map(Vec::as_slice) != expected {
            return Err(UserDataError::StorageConflict);
        }

        let slot = self
            .slots
            .entry(*address)
            .or_insert_with(|| vec![0; Record::CAPACITY]);
        if slot.len() < new.len() {
            slot.resize(new.len(), 0);
        }
        slot[..new.len()].copy_from_slice(new);

        Ok(())
    }
}

/// Identities that signed the current request.
#[derive(Debug, Default)]
pub struct SignerSet {
    signers: HashSet<Pubkey>,
}

impl SignerSet {
    pub fn new(signers: impl IntoIterator<Item = Pubkey>) -> Self {
        Self {
            signers: signers.into_iter().collect(),
        }
    }
}

impl Authorizer for SignerSet {
    fn authorize(&self, claimed: &Pubkey) -> bool {
        self.signers.contains(claimed)
    }
}

/// Runs one instruction against `storage` the way the program does on chain:
/// authorize, decode, check the address, apply, commit.
pub fn execute<S, A>(
    storage: &mut S,
    authorizer: &A,
    program_id: &Pubkey,
    caller: &Pubkey,
    address: &Pubkey,
    instruction_data: &[u8],
) -> Result<(), UserDataError>
where
    S: Storage + ?Sized,
    A: Authorizer + ?Sized,
{
    if !authorizer.authorize(caller) {
        return Err(UserDataError::Unauthorized);
    }

    let instruction = UserDataInstruction::unpack(instruction_data)?;

    let current = storage.read(address);
    let absent = matches!(
        SlotState::classify(current.as_deref()),
        Ok(SlotState::Absent)
    );
    if absent {
        if let UserDataInstruction::Initialize { .. } = instruction {
            let (expected, _) = user_data_address(caller, program_id)?;
            if expected != *address {
                return Err(UserDataError::Unauthorized);
            }
        }
    }

    let new = apply(current.as_deref(), &instruction, caller)?;
    storage.commit(address, current.as_deref(), &new)
}

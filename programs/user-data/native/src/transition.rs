use solana_program::pubkey::Pubkey;

use crate::{error::UserDataError, instruction::UserDataInstruction, state::Record};

/// What a slot currently holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing written yet: no account, no data, or a freshly allocated
    /// zero-filled slot.
    Absent,
    Initialized(Record),
}

impl SlotState {
    /// Classifies raw slot bytes. Non-zero bytes must decode to a record with
    /// its flag set and its lengths in bounds, otherwise the slot holds
    /// something other than a user data record.
    pub fn classify(current: Option<&[u8]>) -> Result<Self, UserDataError> {
        let data = match current {
            Some(data) if data.iter().any(|b| *b != 0) => data,
            _ => return Ok(Self::Absent),
        };

        let record = Record::decode(data).map_err(|_| UserDataError::DataTypeMismatch)?;
        if !record.initialized || !record.within_bounds() {
            return Err(UserDataError::DataTypeMismatch);
        }

        Ok(Self::Initialized(record))
    }
}

/// Applies `instruction` on behalf of `caller` to the slot contents and
/// returns the bytes to commit.
///
/// Nothing is written here: on error the caller commits nothing, so a record
/// is never left half-updated. For `Initialize` on an absent slot the caller
/// must already have checked that the slot is `caller`'s derived address.
pub fn apply(
    current: Option<&[u8]>,
    instruction: &UserDataInstruction,
    caller: &Pubkey,
) -> Result<Vec<u8>, UserDataError> {
    next_record(current, instruction, caller)?.encode()
}

/// Same as [`apply`], but writes the new record over the front of `slot`
/// with [`Record::encode_into`] and returns the encoded length. The slot is
/// untouched when the transition fails.
pub fn apply_into(
    slot: &mut [u8],
    instruction: &UserDataInstruction,
    caller: &Pubkey,
) -> Result<usize, UserDataError> {
    next_record(Some(&*slot), instruction, caller)?.encode_into(slot)
}

fn next_record(
    current: Option<&[u8]>,
    instruction: &UserDataInstruction,
    caller: &Pubkey,
) -> Result<Record, UserDataError> {
    match (SlotState::classify(current)?, instruction) {
        (SlotState::Absent, UserDataInstruction::Initialize { name, message }) => {
            Record::new(*caller, name.clone(), message.clone())
        }
        (SlotState::Absent, UserDataInstruction::UpdateMessage { .. }) => {
            Err(UserDataError::UninitializedAccount)
        }
        (SlotState::Initialized(_), UserDataInstruction::Initialize { .. }) => {
            Err(UserDataError::AlreadyInitialized)
        }
        (SlotState::Initialized(record), UserDataInstruction::UpdateMessage { message }) => {
            update_message(record, caller, message)
        }
    }
}

fn update_message(
    mut record: Record,
    caller: &Pubkey,
    message: &str,
) -> Result<Record, UserDataError> {
    if record.owner != *caller {
        return Err(UserDataError::Unauthorized);
    }
    if message.len() > Record::MAX_MESSAGE_LENGTH {
        return Err(UserDataError::ValueTooLong);
    }

    record.update_count = record
        .update_count
        .checked_add(1)
        .ok_or(UserDataError::CounterOverflow)?;
    record.message = message.to_owned();

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(name: &str, message: &str) -> UserDataInstruction {
        UserDataInstruction::Initialize {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    fn update(message: &str) -> UserDataInstruction {
        UserDataInstruction::UpdateMessage {
            message: message.to_string(),
        }
    }

    #[test]
    fn initialize_on_absent_creates_record() {
        let caller = Pubkey::new_unique();
        let bytes = apply(None, &init("John Doe", "Hello Solana!"), &caller).unwrap();

        assert_eq!(bytes.len(), 70);
        let record = Record::decode(&bytes).unwrap();
        assert_eq!(
            record,
            Record {
                initialized: true,
                owner: caller,
                name: "John Doe".to_string(),
                message: "Hello Solana!".to_string(),
                update_count: 0,
            }
        );
    }

    #[test]
    fn zeroed_slot_counts_as_absent() {
        let caller = Pubkey::new_unique();
        let slot = vec![0u8; Record::CAPACITY];

        assert!(apply(Some(&slot[..]), &init("a", "b"), &caller).is_ok());
        assert!(apply(Some(&[][..]), &init("a", "b"), &caller).is_ok());
        assert_eq!(
            apply(Some(&slot[..]), &update("b"), &caller),
            Err(UserDataError::UninitializedAccount)
        );
    }

    #[test]
    fn initialize_checks_lengths() {
        let caller = Pubkey::new_unique();
        assert_eq!(
            apply(None, &init(&"n".repeat(65), "m"), &caller),
            Err(UserDataError::ValueTooLong)
        );
        assert_eq!(
            apply(None, &init("n", &"m".repeat(257)), &caller),
            Err(UserDataError::ValueTooLong)
        );
        assert!(apply(None, &init(&"n".repeat(64), &"m".repeat(256)), &caller).is_ok());
    }

    #[test]
    fn update_on_absent_is_uninitialized() {
        assert_eq!(
            apply(None, &update("hi"), &Pubkey::new_unique()),
            Err(UserDataError::UninitializedAccount)
        );
    }

    #[test]
    fn second_initialize_is_rejected() {
        let caller = Pubkey::new_unique();
        let bytes = apply(None, &init("John Doe", "Hello Solana!"), &caller).unwrap();

        assert_eq!(
            apply(Some(&bytes[..]), &init("Mallory", "mine now"), &caller),
            Err(UserDataError::AlreadyInitialized)
        );
    }

    #[test]
    fn owner_update_replaces_message() {
        let caller = Pubkey::new_unique();
        let bytes = apply(None, &init("John Doe", "Hello Solana!"), &caller).unwrap();
        let bytes = apply(Some(&bytes[..]), &update("Hello Solana, again!"), &caller).unwrap();

        assert_eq!(bytes.len(), 77);
        assert_eq!(bytes.len(), Record::get_size("John Doe", "Hello Solana, again!"));
        let record = Record::decode(&bytes).unwrap();
        assert_eq!(record.name, "John Doe");
        assert_eq!(record.message, "Hello Solana, again!");
        assert_eq!(record.update_count, 1);
        assert_eq!(record.owner, caller);
    }

    #[test]
    fn counter_tracks_updates() {
        let caller = Pubkey::new_unique();
        let mut bytes = apply(None, &init("n", "m"), &caller).unwrap();
        for i in 0..10 {
            bytes = apply(Some(&bytes[..]), &update(&format!("message {i}")), &caller).unwrap();
        }
        assert_eq!(Record::decode(&bytes).unwrap().update_count, 10);
    }

    #[test]
    fn non_owner_update_is_unauthorized() {
        let owner = Pubkey::new_unique();
        let bytes = apply(None, &init("n", "m"), &owner).unwrap();

        // ownership is checked before the message length
        assert_eq!(
            apply(Some(&bytes[..]), &update(&"m".repeat(300)), &Pubkey::new_unique()),
            Err(UserDataError::Unauthorized)
        );
        assert_eq!(
            apply(Some(&bytes[..]), &update("hijack"), &Pubkey::new_unique()),
            Err(UserDataError::Unauthorized)
        );
    }

    #[test]
    fn long_update_is_rejected() {
        let owner = Pubkey::new_unique();
        let bytes = apply(None, &init("n", "m"), &owner).unwrap();
        assert_eq!(
            apply(Some(&bytes[..]), &update(&"m".repeat(257)), &owner),
            Err(UserDataError::ValueTooLong)
        );
    }

    #[test]
    fn update_works_inside_padded_slot() {
        let owner = Pubkey::new_unique();
        let mut slot = vec![0u8; Record::CAPACITY];
        let bytes = apply(Some(&slot[..]), &init("n", "a long first message"), &owner).unwrap();
        slot[..bytes.len()].copy_from_slice(&bytes);

        let bytes = apply(Some(&slot[..]), &update("short"), &owner).unwrap();
        slot[..bytes.len()].copy_from_slice(&bytes);

        let record = Record::decode(&slot).unwrap();
        assert_eq!(record.message, "short");
        assert_eq!(record.update_count, 1);
    }

    #[test]
    fn garbage_is_data_type_mismatch() {
        let caller = Pubkey::new_unique();
        let garbage = [0xffu8; 16];
        for instruction in [init("n", "m"), update("m")] {
            assert_eq!(
                apply(Some(&garbage[..]), &instruction, &caller),
                Err(UserDataError::DataTypeMismatch)
            );
        }
    }

    #[test]
    fn cleared_flag_is_data_type_mismatch() {
        let caller = Pubkey::new_unique();
        let mut bytes = apply(None, &init("n", "m"), &caller).unwrap();
        bytes[0] = 0;
        assert_eq!(
            apply(Some(&bytes[..]), &update("m"), &caller),
            Err(UserDataError::DataTypeMismatch)
        );
    }

    #[test]
    fn oversized_stored_name_is_data_type_mismatch() {
        let caller = Pubkey::new_unique();
        let record = Record {
            initialized: true,
            owner: caller,
            name: "n".repeat(65),
            message: String::new(),
            update_count: 0,
        };
        assert_eq!(
            apply(Some(&record.encode().unwrap()[..]), &update("m"), &caller),
            Err(UserDataError::DataTypeMismatch)
        );
    }

    #[test]
    fn counter_never_wraps() {
        let caller = Pubkey::new_unique();
        let mut record = Record::new(caller, "n".to_string(), "m".to_string()).unwrap();
        record.update_count = u64::MAX;
        assert_eq!(
            apply(Some(&record.encode().unwrap()[..]), &update("m"), &caller),
            Err(UserDataError::CounterOverflow)
        );
    }

    #[test]
    fn apply_into_rewrites_prefix_only() {
        let owner = Pubkey::new_unique();
        let mut slot = vec![0u8; Record::CAPACITY];
        let written = apply_into(&mut slot, &init("John Doe", "Hello Solana!"), &owner).unwrap();
        assert_eq!(written, 70);

        slot[Record::CAPACITY - 1] = 0xAB;
        let written = apply_into(&mut slot, &update("hi"), &owner).unwrap();
        assert_eq!(written, Record::get_size("John Doe", "hi"));
        assert_eq!(slot[Record::CAPACITY - 1], 0xAB);

        let record = Record::decode(&slot).unwrap();
        assert_eq!(record.message, "hi");
        assert_eq!(record.update_count, 1);
    }

    #[test]
    fn failed_apply_into_leaves_slot_alone() {
        let owner = Pubkey::new_unique();
        let mut slot = vec![0u8; Record::CAPACITY];
        apply_into(&mut slot, &init("n", "m"), &owner).unwrap();
        let before = slot.clone();

        assert_eq!(
            apply_into(&mut slot, &update("hijack"), &Pubkey::new_unique()),
            Err(UserDataError::Unauthorized)
        );
        assert_eq!(slot, before);
    }
}

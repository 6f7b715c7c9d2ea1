use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Every failure the user data program can report.
///
/// The discriminant order is part of the program's interface: on chain each
/// variant surfaces as `ProgramError::Custom(variant as u32)`, so new
/// variants go at the end.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum UserDataError {
    /// No bump seed in 0..=255 produced an off-curve address
    #[error("No bump seed yields a valid program address")]
    BumpExhausted,

    /// A seed is longer than the runtime accepts
    #[error("Seed exceeds the maximum seed length")]
    InvalidSeeds,

    #[error("Buffer is shorter than its declared layout")]
    MalformedRecord,

    #[error("Initialized flag is neither 0 nor 1")]
    InvalidFlag,

    #[error("String field is not valid UTF-8")]
    InvalidEncoding,

    #[error("Unknown instruction opcode")]
    UnknownInstruction,

    #[error("Name or message exceeds its maximum length")]
    ValueTooLong,

    /// The slot holds bytes that are not a valid record
    #[error("Account data is not a valid user data record")]
    DataTypeMismatch,

    #[error("Account already initialized")]
    AlreadyInitialized,

    #[error("Account not initialized")]
    UninitializedAccount,

    #[error("Caller is not the owner of this record")]
    Unauthorized,

    /// The slot changed between read and commit; the only retryable error
    #[error("Slot was modified concurrently")]
    StorageConflict,

    #[error("Slot is too small for the encoded record")]
    SlotTooSmall,

    #[error("Update counter overflow")]
    CounterOverflow,
}

impl From<UserDataError> for ProgramError {
    fn from(e: UserDataError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_codes_follow_declaration_order() {
        assert_eq!(
            ProgramError::from(UserDataError::BumpExhausted),
            ProgramError::Custom(0)
        );
        assert_eq!(
            ProgramError::from(UserDataError::DataTypeMismatch),
            ProgramError::Custom(7)
        );
        assert_eq!(
            ProgramError::from(UserDataError::CounterOverflow),
            ProgramError::Custom(13)
        );
    }
}

use solana_program::pubkey::Pubkey;

use crate::{
    error::UserDataError,
    wire::{self, Reader, LEN_PREFIX},
};

/// User data record stored at the owner's program derived address.
///
/// Layout (little-endian):
/// - Byte 0: initialized flag (0 or 1)
/// - Bytes 1-32: owner public key
/// - u32 name length, then the UTF-8 name
/// - u32 message length, then the UTF-8 message
/// - u64 update counter
///
/// Slots are allocated at [`Record::CAPACITY`]. Bytes past the encoded
/// length are padding: `decode` ignores them and `encode_into` never
/// touches them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub initialized: bool,
    pub owner: Pubkey,
    pub name: String,
    pub message: String,
    pub update_count: u64,
}

impl Record {
    pub const MAX_NAME_LENGTH: usize = 64;
    pub const MAX_MESSAGE_LENGTH: usize = 256;

    /// Flag, owner, both length prefixes and the counter.
    pub const FIXED_LEN: usize = 1 + 32 + LEN_PREFIX + LEN_PREFIX + 8;

    /// Size every slot is allocated with: the largest record that respects
    /// the length bounds (369 bytes).
    pub const CAPACITY: usize =
        Self::FIXED_LEN + Self::MAX_NAME_LENGTH + Self::MAX_MESSAGE_LENGTH;

    pub fn new(owner: Pubkey, name: String, message: String) -> Result<Self, UserDataError> {
        if name.len() > Self::MAX_NAME_LENGTH || message.len() > Self::MAX_MESSAGE_LENGTH {
            return Err(UserDataError::ValueTooLong);
        }

        Ok(Self {
            initialized: true,
            owner,
            name,
            message,
            update_count: 0,
        })
    }

    pub fn get_size(name: &str, message: &str) -> usize {
        Self::FIXED_LEN + name.len() + message.len()
    }

    pub fn encoded_len(&self) -> usize {
        Self::get_size(&self.name, &self.message)
    }

    /// True when name and message respect their bounds.
    pub fn within_bounds(&self) -> bool {
        self.name.len() <= Self::MAX_NAME_LENGTH && self.message.len() <= Self::MAX_MESSAGE_LENGTH
    }

    /// Fails with `ValueTooLong` only if a field length overflows its `u32`
    /// prefix.
    pub fn encode(&self) -> Result<Vec<u8>, UserDataError> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(u8::from(self.initialized));
        out.extend_from_slice(self.owner.as_ref());
        wire::put_string(&mut out, &self.name)?;
        wire::put_string(&mut out, &self.message)?;
        out.extend_from_slice(&self.update_count.to_le_bytes());
        Ok(out)
    }

    /// Writes the encoding over the front of `slot` and returns the number of
    /// bytes written. Whatever follows is left as it was.
    pub fn encode_into(&self, slot: &mut [u8]) -> Result<usize, UserDataError> {
        let encoded = self.encode()?;
        let prefix = slot
            .get_mut(..encoded.len())
            .ok_or(UserDataError::SlotTooSmall)?;
        prefix.copy_from_slice(&encoded);
        Ok(encoded.len())
    }

    pub fn decode(data: &[u8]) -> Result<Self, UserDataError> {
        let mut reader = Reader::new(data);

        let initialized = match reader.read_u8()? {
            0 => false,
            1 => true,
            _ => return Err(UserDataError::InvalidFlag),
        };
        let owner = Pubkey::new_from_array(reader.read_array()?);
        let name = reader.read_string()?;
        let message = reader.read_string()?;
        let update_count = reader.read_u64()?;

        Ok(Self {
            initialized,
            owner,
            name,
            message,
            update_count,
        })
    }
}

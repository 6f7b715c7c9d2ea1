//! Bounds-checked primitives shared by the record and instruction layouts.
//!
//! Integers are little-endian; strings are a `u32` byte length followed by
//! that many UTF-8 bytes.

use crate::error::UserDataError;

pub(crate) const LEN_PREFIX: usize = 4;

/// Sequential reader over a byte slice. Every read is checked against the
/// remaining input and fails with `MalformedRecord` instead of panicking.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes consumed so far.
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], UserDataError> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or(UserDataError::MalformedRecord)?;
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(UserDataError::MalformedRecord)?;
        self.offset = end;
        Ok(bytes)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, UserDataError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], UserDataError> {
        self.take(N)?
            .try_into()
            .map_err(|_| UserDataError::MalformedRecord)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, UserDataError> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64, UserDataError> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Length prefix, then payload, then UTF-8 validation, in that order.
    pub(crate) fn read_string(&mut self) -> Result<String, UserDataError> {
        let len = usize::try_from(self.read_u32()?).map_err(|_| UserDataError::MalformedRecord)?;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| UserDataError::InvalidEncoding)
    }
}

/// Length prefix for a field of `len` bytes; fails when `len` does not fit
/// in a `u32`.
pub(crate) fn len_prefix(len: usize) -> Result<[u8; LEN_PREFIX], UserDataError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| UserDataError::ValueTooLong)
}

/// Appends `value` with its length prefix.
pub(crate) fn put_string(out: &mut Vec<u8>, value: &str) -> Result<(), UserDataError> {
    out.extend_from_slice(&len_prefix(value.len())?);
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

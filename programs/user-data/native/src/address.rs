use solana_program::pubkey::{Pubkey, MAX_SEED_LEN};

use crate::error::UserDataError;

/// Domain seed of the user data record family.
pub const USER_DATA_SEED: &[u8] = b"user-data";

/// Derives the program address for `owner` under `domain_seed`.
///
/// Bumps are tried from 255 down to 0 with seeds
/// `[domain_seed, owner, [bump]]`; the first candidate that falls off the
/// ed25519 curve is returned together with its bump. This is the canonical
/// bump, the same one `Pubkey::find_program_address` reports.
pub fn derive_address(
    owner: &Pubkey,
    domain_seed: &[u8],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), UserDataError> {
    if domain_seed.len() > MAX_SEED_LEN {
        return Err(UserDataError::InvalidSeeds);
    }

    for bump in (0..=u8::MAX).rev() {
        let seeds: &[&[u8]] = &[domain_seed, owner.as_ref(), &[bump]];
        // on-curve candidates are rejected, move on to the next bump
        if let Ok(address) = Pubkey::create_program_address(seeds, program_id) {
            return Ok((address, bump));
        }
    }

    Err(UserDataError::BumpExhausted)
}

/// Address of `owner`'s user data record.
pub fn user_data_address(
    owner: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), UserDataError> {
    derive_address(owner, USER_DATA_SEED, program_id)
}

use anchor_lang::prelude::*;
use arrayref::array_ref;

use crate::error::LotteryError;

/// A single 32-byte random word, interpreted as a big-endian unsigned
/// 256-bit integer.
pub type RandomWord = [u8; 32];

/// Reduces a 256-bit big-endian word modulo `len`.
///
/// The word is consumed as four 64-bit limbs, most significant first. Each
/// step folds the running remainder into the next limb using 128-bit
/// arithmetic, so the result is the exact residue of the full 256-bit value
/// and not just of its low bytes.
pub fn winner_index(word: &RandomWord, len: u64) -> Result<u64> {
    require!(len > 0, LotteryError::NoPlayers);

    let limbs = [
        u64::from_be_bytes(*array_ref![word, 0, 8]),
        u64::from_be_bytes(*array_ref![word, 8, 8]),
        u64::from_be_bytes(*array_ref![word, 16, 8]),
        u64::from_be_bytes(*array_ref![word, 24, 8]),
    ];

    let modulus = len as u128;
    let remainder = limbs
        .iter()
        .fold(0u128, |acc, limb| ((acc << 64) | *limb as u128) % modulus);

    Ok(remainder as u64)
}

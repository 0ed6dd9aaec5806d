use anchor_lang::prelude::*;

// 8 discriminator, 32 pubkey, 1 bump
pub const TREASURY_ACCOUNT_SIZE: usize = 8 + 32 + 1;

/// Holds the pot. Only lamports above the rent-exempt minimum are paid out.
#[account]
pub struct Treasury {
    pub lottery: Pubkey,
    pub bump: u8,
}

impl Treasury {
    /// Pot available for payout given the account's total lamports.
    pub fn pot(lamports: u64, rent_exempt_minimum: u64) -> u64 {
        lamports.saturating_sub(rent_exempt_minimum)
    }
}

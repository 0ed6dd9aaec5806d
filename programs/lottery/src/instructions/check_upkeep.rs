use anchor_lang::prelude::*;

use crate::{
    constants::{LOTTERY_SEED, TREASURY_SEED},
    error::LotteryError,
    state::{Lottery, Treasury, TREASURY_ACCOUNT_SIZE},
};

/// Result of an upkeep check, returned to the caller as instruction return data.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub upkeep_needed: bool,
    /// Opaque payload for `perform_upkeep`; currently always empty.
    pub perform_data: Vec<u8>,
}

/// Reports whether `perform_upkeep` would succeed right now.
///
/// Upkeep is needed when all of the following hold:
/// 1. The lottery is `Open`
/// 2. At least `interval` seconds have passed since the last winner was picked
/// 3. There is at least one player
/// 4. The treasury holds a pot above its rent reserve
///
/// Read-only: no account is modified.
pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<UpkeepStatus> {
    let now = Clock::get()?.unix_timestamp;
    let balance = pot_balance(&ctx.accounts.treasury)?;

    Ok(UpkeepStatus {
        upkeep_needed: ctx.accounts.lottery.upkeep_needed(now, balance),
        perform_data: Vec::new(),
    })
}

/// Lamports held by the treasury above its rent-exempt minimum.
pub(crate) fn pot_balance(treasury: &Account<Treasury>) -> Result<u64> {
    let rent_lamports = Rent::get()?.minimum_balance(TREASURY_ACCOUNT_SIZE);
    Ok(Treasury::pot(
        treasury.to_account_info().lamports(),
        rent_lamports,
    ))
}

#[derive(Accounts)]
pub struct CheckUpkeep<'info> {
    #[account(
        seeds = [LOTTERY_SEED],
        bump = lottery.bump,
        has_one = treasury @ LotteryError::InvalidTreasury,
    )]
    pub lottery: Account<'info, Lottery>,

    #[account(
        seeds = [TREASURY_SEED, lottery.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,
}

use anchor_lang::prelude::*;

use crate::{
    constants::{LOTTERY_SEED, NUM_WORDS, REQUEST_CONFIRMATIONS, TREASURY_SEED},
    error::LotteryError,
    instructions::check_upkeep::pot_balance,
    state::{Lottery, Treasury},
};

/// Event emitted when a winner draw is requested. The coordinator watches for
/// this event and answers with `fulfill_random_words`.
#[event]
pub struct RequestedWinner {
    pub request_id: u64,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_compute_limit: u32,
    pub num_words: u32,
    pub requested_at: i64,
}

/// Closes the current round and requests randomness to pick its winner.
///
/// Anyone may call this; it only succeeds when `check_upkeep` would report
/// upkeep as needed. On success the lottery is `Calculating` and stays that
/// way until the coordinator fulfills the request.
///
/// # Errors
/// - `UpkeepNotNeeded` if any upkeep condition is not met
pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let balance = pot_balance(&ctx.accounts.treasury)?;

    let lottery = &mut ctx.accounts.lottery;
    let request_id = lottery.begin_calculating(now, balance)?;

    msg!(
        "Requested winner: request_id={} players={} pot={}",
        request_id,
        lottery.number_of_players(),
        balance
    );

    emit!(RequestedWinner {
        request_id,
        key_hash: lottery.key_hash,
        subscription_id: lottery.subscription_id,
        request_confirmations: REQUEST_CONFIRMATIONS,
        callback_compute_limit: lottery.callback_compute_limit,
        num_words: NUM_WORDS,
        requested_at: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    #[account(
        mut,
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

    pub caller: Signer<'info>,
}

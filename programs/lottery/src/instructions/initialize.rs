use anchor_lang::prelude::*;

use crate::{
    constants::{LOTTERY_SEED, TREASURY_SEED},
    error::LotteryError,
    state::{Lottery, LotteryState, Treasury, LOTTERY_ACCOUNT_SIZE, TREASURY_ACCOUNT_SIZE},
};

/// Deployment-time parameters for a lottery. All of them are immutable once set.
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializeParams {
    /// Minimum lamports a player must pay to enter
    pub entrance_fee: u64,
    /// Seconds that must pass between winner selections
    pub interval: i64,
    /// Key authorised to deliver randomness
    pub vrf_coordinator: Pubkey,
    /// Gas lane identifying the oracle's proving key
    pub key_hash: [u8; 32],
    /// Coordinator subscription that pays for requests
    pub subscription_id: u64,
    /// Compute budget the coordinator should give the fulfillment
    pub callback_compute_limit: u32,
}

/// Event emitted when the lottery is created
#[event]
pub struct LotteryInitialized {
    pub lottery: Pubkey,
    pub treasury: Pubkey,
    pub entrance_fee: u64,
    pub interval: i64,
    pub vrf_coordinator: Pubkey,
    pub created_at: i64,
}

/// Creates the lottery state account and its treasury.
///
/// The lottery starts `Open` with no players, and its latest timestamp is the
/// current cluster time, so the first draw can happen one interval later.
///
/// # Errors
/// - `InvalidInterval` if `interval` is not strictly positive
pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    require!(params.interval > 0, LotteryError::InvalidInterval);

    let now = Clock::get()?.unix_timestamp;

    let lottery = &mut ctx.accounts.lottery;
    lottery.authority = ctx.accounts.authority.key();
    lottery.vrf_coordinator = params.vrf_coordinator;
    lottery.treasury = ctx.accounts.treasury.key();
    lottery.key_hash = params.key_hash;
    lottery.subscription_id = params.subscription_id;
    lottery.callback_compute_limit = params.callback_compute_limit;
    lottery.entrance_fee = params.entrance_fee;
    lottery.interval = params.interval;
    lottery.last_timestamp = now;
    lottery.lottery_state = LotteryState::Open;
    lottery.recent_winner = None;
    lottery.request_counter = 0;
    lottery.pending_request = None;
    lottery.players = Vec::new();
    lottery.bump = ctx.bumps.lottery;

    ctx.accounts.treasury.lottery = lottery.key();
    ctx.accounts.treasury.bump = ctx.bumps.treasury;

    msg!(
        "Lottery initialized: fee={} interval={}s",
        params.entrance_fee,
        params.interval
    );

    emit!(LotteryInitialized {
        lottery: lottery.key(),
        treasury: ctx.accounts.treasury.key(),
        entrance_fee: params.entrance_fee,
        interval: params.interval,
        vrf_coordinator: params.vrf_coordinator,
        created_at: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = authority,
        space = LOTTERY_ACCOUNT_SIZE,
        seeds = [LOTTERY_SEED],
        bump
    )]
    pub lottery: Account<'info, Lottery>,

    #[account(
        init,
        payer = authority,
        space = TREASURY_ACCOUNT_SIZE,
        seeds = [TREASURY_SEED, lottery.key().as_ref()],
        bump
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

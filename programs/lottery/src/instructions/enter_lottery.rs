use anchor_lang::prelude::*;

use crate::{
    constants::{LOTTERY_SEED, TREASURY_SEED},
    error::LotteryError,
    state::{Lottery, Treasury},
};

/// Event emitted when a player enters the lottery
#[event]
pub struct EntryRecorded {
    /// The player's address
    pub player: Pubkey,
    /// Lamports paid for this entry
    pub amount: u64,
    /// Number of players after this entry
    pub player_count: u64,
}

/// Enters the signer into the current round by paying `amount` lamports
/// into the treasury.
///
/// # Security Considerations
/// 1. `amount` must cover the entrance fee; any excess stays in the pot
/// 2. The lottery must be `Open`
/// 3. The treasury must be the one recorded on the lottery
/// 4. State is updated before the transfer, and the treasury balance is
///    verified afterwards
///
/// # Errors
/// - `InsufficientPayment` if `amount` is below the entrance fee
/// - `NotOpen` while a winner is being calculated
/// - `LotteryFull` once the player list is at capacity
pub fn enter_lottery(ctx: Context<EnterLottery>, amount: u64) -> Result<()> {
    let player = ctx.accounts.player.key();

    ctx.accounts.lottery.record_entry(player, amount)?;

    let pre_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();

    anchor_lang::solana_program::program::invoke(
        &anchor_lang::solana_program::system_instruction::transfer(
            &player,
            &ctx.accounts.treasury.key(),
            amount,
        ),
        &[
            ctx.accounts.player.to_account_info(),
            ctx.accounts.treasury.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    let post_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();
    require!(
        post_transfer_balance
            == pre_transfer_balance
                .checked_add(amount)
                .ok_or(LotteryError::Overflow)?,
        LotteryError::TransferFailed
    );

    emit!(EntryRecorded {
        player,
        amount,
        player_count: ctx.accounts.lottery.number_of_players(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EnterLottery<'info> {
    #[account(
        mut,
        seeds = [LOTTERY_SEED],
        bump = lottery.bump,
        has_one = treasury @ LotteryError::InvalidTreasury,
    )]
    pub lottery: Account<'info, Lottery>,

    #[account(
        mut,
        seeds = [TREASURY_SEED, lottery.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}

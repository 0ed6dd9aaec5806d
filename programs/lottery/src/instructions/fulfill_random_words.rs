use anchor_lang::prelude::*;

use crate::{
    constants::{LOTTERY_SEED, TREASURY_SEED},
    error::LotteryError,
    instructions::check_upkeep::pot_balance,
    randomness::RandomWord,
    state::{Lottery, Treasury},
};

/// Event emitted when a winner has been paid
#[event]
pub struct WinnerPicked {
    pub winner: Pubkey,
    pub request_id: u64,
    /// Lamports transferred to the winner
    pub prize: u64,
    pub picked_at: i64,
}

/// Delivers randomness for the outstanding request, pays the winner and
/// reopens the lottery.
///
/// The winner is `players[random_words[0] mod players.len()]`, with the word
/// read as a big-endian 256-bit integer. The caller computes the same index
/// off-chain and passes that player's account as `winner`.
///
/// # Security Considerations
/// 1. Only the configured VRF coordinator may sign
/// 2. `request_id` must equal the outstanding request
/// 3. The `winner` account must be the selected player
/// 4. The whole pot above the treasury's rent reserve is paid out
///
/// # Errors
/// - `OnlyCoordinatorCanFulfill` if signed by any other key
/// - `UnknownRequestId` if no request with this id is outstanding
/// - `MissingRandomWords` if `random_words` is empty
/// - `WinnerAccountMismatch` if `winner` is not the selected player
pub fn fulfill_random_words(
    ctx: Context<FulfillRandomWords>,
    request_id: u64,
    random_words: Vec<RandomWord>,
) -> Result<()> {
    let winner = ctx
        .accounts
        .lottery
        .select_winner(request_id, &random_words)?;
    require_keys_eq!(
        ctx.accounts.winner.key(),
        winner,
        LotteryError::WinnerAccountMismatch
    );

    let prize = pot_balance(&ctx.accounts.treasury)?;
    let now = Clock::get()?.unix_timestamp;

    ctx.accounts.lottery.complete_round(winner, now)?;

    // Direct lamport moves work because the treasury is a PDA owned by this program.
    ctx.accounts.treasury.sub_lamports(prize)?;
    ctx.accounts.winner.add_lamports(prize)?;

    msg!("Winner picked: {} prize={}", winner, prize);

    emit!(WinnerPicked {
        winner,
        request_id,
        prize,
        picked_at: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct FulfillRandomWords<'info> {
    #[account(
        mut,
        seeds = [LOTTERY_SEED],
        bump = lottery.bump,
        has_one = treasury @ LotteryError::InvalidTreasury,
        has_one = vrf_coordinator @ LotteryError::OnlyCoordinatorCanFulfill,
    )]
    pub lottery: Account<'info, Lottery>,

    #[account(
        mut,
        seeds = [TREASURY_SEED, lottery.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    pub vrf_coordinator: Signer<'info>,

    #[account(mut)]
    pub winner: SystemAccount<'info>,
}

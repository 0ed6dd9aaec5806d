use anchor_lang::prelude::*;

use crate::{
    constants::MAX_PLAYERS,
    error::LotteryError,
    randomness::{winner_index, RandomWord},
};

// Space calculation:
// 8 (discriminator) +
// 32 (authority) +
// 32 (vrf_coordinator) +
// 32 (treasury) +
// 32 (key_hash) +
// 8 (subscription_id) +
// 4 (callback_compute_limit) +
// 8 (entrance_fee) +
// 8 (interval) +
// 8 (last_timestamp) +
// 1 (lottery_state) +
// 33 (recent_winner: Option<Pubkey>) +
// 8 (request_counter) +
// 9 (pending_request: Option<u64>) +
// 4 + 32 * MAX_PLAYERS (players) +
// 1 (bump)
pub const LOTTERY_ACCOUNT_SIZE: usize =
    8 + 32 + 32 + 32 + 32 + 8 + 4 + 8 + 8 + 8 + 1 + 33 + 8 + 9 + (4 + 32 * MAX_PLAYERS) + 1;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LotteryState {
    Open = 0,
    Calculating = 1,
}

#[account]
pub struct Lottery {
    pub authority: Pubkey,
    /// The only key allowed to deliver randomness for this lottery.
    pub vrf_coordinator: Pubkey,
    pub treasury: Pubkey,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub callback_compute_limit: u32,
    pub entrance_fee: u64,
    /// Minimum seconds between winner selections.
    pub interval: i64,
    pub last_timestamp: i64,
    pub lottery_state: LotteryState,
    pub recent_winner: Option<Pubkey>,
    pub request_counter: u64,
    pub pending_request: Option<u64>,
    pub players: Vec<Pubkey>,
    pub bump: u8,
}

impl Lottery {
    pub fn number_of_players(&self) -> u64 {
        self.players.len() as u64
    }

    pub fn player(&self, index: u64) -> Option<Pubkey> {
        self.players.get(usize::try_from(index).ok()?).copied()
    }

    /// Appends `player` to the current round.
    ///
    /// The payment is checked before the state, so an underpaying entry is
    /// reported as such even while a winner is being calculated.
    pub fn record_entry(&mut self, player: Pubkey, payment: u64) -> Result<()> {
        require!(
            payment >= self.entrance_fee,
            LotteryError::InsufficientPayment
        );
        require!(
            self.lottery_state == LotteryState::Open,
            LotteryError::NotOpen
        );
        require!(self.players.len() < MAX_PLAYERS, LotteryError::LotteryFull);

        self.players.push(player);
        Ok(())
    }

    /// Whether a winner draw may be requested at `now` given the current pot
    /// `balance` in lamports.
    pub fn upkeep_needed(&self, now: i64, balance: u64) -> bool {
        let is_open = self.lottery_state == LotteryState::Open;
        let time_passed = now.saturating_sub(self.last_timestamp) >= self.interval;
        let has_players = !self.players.is_empty();
        let has_balance = balance > 0;

        is_open && time_passed && has_players && has_balance
    }

    /// Moves the lottery into `Calculating` and issues a new request id.
    pub fn begin_calculating(&mut self, now: i64, balance: u64) -> Result<u64> {
        if !self.upkeep_needed(now, balance) {
            msg!(
                "Upkeep not needed: balance={} players={} state={:?}",
                balance,
                self.players.len(),
                self.lottery_state
            );
            return err!(LotteryError::UpkeepNotNeeded);
        }

        let request_id = self
            .request_counter
            .checked_add(1)
            .ok_or(LotteryError::Overflow)?;

        self.lottery_state = match self.lottery_state {
            LotteryState::Open => LotteryState::Calculating,
            LotteryState::Calculating => return err!(LotteryError::NotOpen),
        };
        self.request_counter = request_id;
        self.pending_request = Some(request_id);

        Ok(request_id)
    }

    /// Resolves which player wins the outstanding request. Does not mutate;
    /// pair with [`Lottery::complete_round`] once the payout has succeeded.
    pub fn select_winner(&self, request_id: u64, random_words: &[RandomWord]) -> Result<Pubkey> {
        require!(
            self.pending_request == Some(request_id),
            LotteryError::UnknownRequestId
        );
        let word = random_words
            .first()
            .ok_or(LotteryError::MissingRandomWords)?;

        let index = winner_index(word, self.number_of_players())?;
        self.player(index)
            .ok_or_else(|| error!(LotteryError::NoPlayers))
    }

    /// Records `winner`, clears the round and reopens the lottery.
    pub fn complete_round(&mut self, winner: Pubkey, now: i64) -> Result<()> {
        self.lottery_state = match self.lottery_state {
            LotteryState::Calculating => LotteryState::Open,
            LotteryState::Open => return err!(LotteryError::UnknownRequestId),
        };
        self.recent_winner = Some(winner);
        self.players.clear();
        self.pending_request = None;
        self.last_timestamp = now;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const START: i64 = 1_700_000_000;
    const DEFAULT_ENTRANCE_FEE: u64 = 10_000_000; // 0.01 SOL
    const DEFAULT_INTERVAL: i64 = 30;

    fn new_lottery() -> Lottery {
        Lottery {
            authority: Pubkey::new_unique(),
            vrf_coordinator: Pubkey::new_unique(),
            treasury: Pubkey::new_unique(),
            key_hash: [7u8; 32],
            subscription_id: 1,
            callback_compute_limit: 500_000,
            entrance_fee: DEFAULT_ENTRANCE_FEE,
            interval: DEFAULT_INTERVAL,
            last_timestamp: START,
            lottery_state: LotteryState::Open,
            recent_winner: None,
            request_counter: 0,
            pending_request: None,
            players: Vec::new(),
            bump: 255,
        }
    }

    fn code(err: Error) -> u32 {
        match err {
            Error::AnchorError(e) => e.error_code_number,
            Error::ProgramError(e) => panic!("unexpected program error: {e:?}"),
        }
    }

    fn word(value: u64) -> RandomWord {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        word
    }

    /// Enters `count` fresh players and returns them in entry order.
    fn enter_players(lottery: &mut Lottery, count: usize) -> Vec<Pubkey> {
        (0..count)
            .map(|_| {
                let player = Pubkey::new_unique();
                lottery.record_entry(player, DEFAULT_ENTRANCE_FEE).unwrap();
                player
            })
            .collect()
    }

    #[test]
    fn exact_fee_is_accepted_and_underpayment_rejected() {
        let mut lottery = new_lottery();
        let player = Pubkey::new_unique();

        lottery.record_entry(player, 10_000_000).unwrap();
        assert_eq!(lottery.number_of_players(), 1);
        assert_eq!(lottery.player(0), Some(player));

        let err = lottery
            .record_entry(Pubkey::new_unique(), 9_000_000)
            .unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::InsufficientPayment));
        assert_eq!(lottery.number_of_players(), 1);
    }

    #[test]
    fn any_underpayment_leaves_players_untouched() {
        let mut lottery = new_lottery();
        enter_players(&mut lottery, 2);
        let before = lottery.players.clone();

        for payment in [0, 1, DEFAULT_ENTRANCE_FEE / 2, DEFAULT_ENTRANCE_FEE - 1] {
            let err = lottery
                .record_entry(Pubkey::new_unique(), payment)
                .unwrap_err();
            assert_eq!(code(err), u32::from(LotteryError::InsufficientPayment));
        }
        assert_eq!(lottery.players, before);
    }

    #[test]
    fn overpayment_is_accepted() {
        let mut lottery = new_lottery();
        lottery
            .record_entry(Pubkey::new_unique(), DEFAULT_ENTRANCE_FEE * 3)
            .unwrap();
        assert_eq!(lottery.number_of_players(), 1);
    }

    #[test]
    fn entries_are_rejected_when_full() {
        let mut lottery = new_lottery();
        enter_players(&mut lottery, MAX_PLAYERS);

        let err = lottery
            .record_entry(Pubkey::new_unique(), DEFAULT_ENTRANCE_FEE)
            .unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::LotteryFull));
    }

    #[test]
    fn upkeep_not_needed_after_construction() {
        let lottery = new_lottery();
        assert!(!lottery.upkeep_needed(START + DEFAULT_INTERVAL + 1, 1));
    }

    #[test]
    fn upkeep_requires_every_condition() {
        let mut lottery = new_lottery();
        enter_players(&mut lottery, 1);
        let later = START + DEFAULT_INTERVAL;

        assert!(lottery.upkeep_needed(later, DEFAULT_ENTRANCE_FEE));
        assert!(!lottery.upkeep_needed(later - 1, DEFAULT_ENTRANCE_FEE));
        assert!(!lottery.upkeep_needed(later, 0));

        lottery.lottery_state = LotteryState::Calculating;
        assert!(!lottery.upkeep_needed(later, DEFAULT_ENTRANCE_FEE));
    }

    #[test]
    fn perform_upkeep_fails_when_not_needed() {
        let mut lottery = new_lottery();
        enter_players(&mut lottery, 1);

        let err = lottery
            .begin_calculating(START + 1, DEFAULT_ENTRANCE_FEE)
            .unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::UpkeepNotNeeded));
        assert_eq!(lottery.lottery_state, LotteryState::Open);
        assert_eq!(lottery.pending_request, None);
    }

    #[test]
    fn perform_upkeep_closes_entries_until_fulfilled() {
        let mut lottery = new_lottery();
        enter_players(&mut lottery, 2);

        let request_id = lottery
            .begin_calculating(START + DEFAULT_INTERVAL, 2 * DEFAULT_ENTRANCE_FEE)
            .unwrap();
        assert_eq!(request_id, 1);
        assert_eq!(lottery.lottery_state, LotteryState::Calculating);
        assert_eq!(lottery.pending_request, Some(1));

        let err = lottery
            .record_entry(Pubkey::new_unique(), DEFAULT_ENTRANCE_FEE)
            .unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::NotOpen));
        assert_eq!(lottery.number_of_players(), 2);

        let err = lottery
            .begin_calculating(START + DEFAULT_INTERVAL, 2 * DEFAULT_ENTRANCE_FEE)
            .unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::UpkeepNotNeeded));
    }

    #[test]
    fn unknown_request_id_is_always_rejected() {
        let mut lottery = new_lottery();
        enter_players(&mut lottery, 3);

        // Nothing outstanding yet
        for id in [0, 1, 2] {
            let err = lottery.select_winner(id, &[word(0)]).unwrap_err();
            assert_eq!(code(err), u32::from(LotteryError::UnknownRequestId));
        }

        let request_id = lottery
            .begin_calculating(START + DEFAULT_INTERVAL, DEFAULT_ENTRANCE_FEE)
            .unwrap();
        let err = lottery
            .select_winner(request_id + 1, &[word(0)])
            .unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::UnknownRequestId));
    }

    #[test]
    fn fulfillment_requires_a_random_word() {
        let mut lottery = new_lottery();
        enter_players(&mut lottery, 1);
        let request_id = lottery
            .begin_calculating(START + DEFAULT_INTERVAL, DEFAULT_ENTRANCE_FEE)
            .unwrap();

        let err = lottery.select_winner(request_id, &[]).unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::MissingRandomWords));
    }

    #[test]
    fn winner_is_picked_by_first_word_modulo_players() {
        let mut lottery = new_lottery();
        let players = enter_players(&mut lottery, 4);
        let request_id = lottery
            .begin_calculating(START + DEFAULT_INTERVAL, 4 * DEFAULT_ENTRANCE_FEE)
            .unwrap();

        let winner = lottery
            .select_winner(request_id, &[word(10), word(3)])
            .unwrap();
        assert_eq!(winner, players[2]);
    }

    #[test]
    fn full_round_resets_and_reopens() {
        let mut lottery = new_lottery();
        let players = enter_players(&mut lottery, 3);
        let fulfilled_at = START + DEFAULT_INTERVAL + 5;

        let request_id = lottery
            .begin_calculating(START + DEFAULT_INTERVAL, 3 * DEFAULT_ENTRANCE_FEE)
            .unwrap();
        let winner = lottery.select_winner(request_id, &[[0xAB; 32]]).unwrap();
        let previous_timestamp = lottery.last_timestamp;
        lottery.complete_round(winner, fulfilled_at).unwrap();

        assert!(players.contains(&winner));
        assert_eq!(lottery.recent_winner, Some(winner));
        assert_eq!(lottery.number_of_players(), 0);
        assert_eq!(lottery.lottery_state, LotteryState::Open);
        assert_eq!(lottery.pending_request, None);
        assert!(lottery.last_timestamp > previous_timestamp);

        // The spent request id cannot be replayed
        let err = lottery.select_winner(request_id, &[word(0)]).unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::UnknownRequestId));

        // A new round issues a fresh id
        enter_players(&mut lottery, 1);
        let next_id = lottery
            .begin_calculating(fulfilled_at + DEFAULT_INTERVAL, DEFAULT_ENTRANCE_FEE)
            .unwrap();
        assert_eq!(next_id, request_id + 1);
    }

    #[test]
    fn completing_without_a_draw_is_rejected() {
        let mut lottery = new_lottery();
        let err = lottery
            .complete_round(Pubkey::new_unique(), START + 1)
            .unwrap_err();
        assert_eq!(code(err), u32::from(LotteryError::UnknownRequestId));
        assert_eq!(lottery.recent_winner, None);
    }

    #[test]
    fn account_size_fits_a_full_lottery() {
        let mut lottery = new_lottery();
        enter_players(&mut lottery, MAX_PLAYERS);
        lottery
            .begin_calculating(START + DEFAULT_INTERVAL, DEFAULT_ENTRANCE_FEE)
            .unwrap();
        lottery.recent_winner = Some(Pubkey::new_unique());

        let mut data = Vec::new();
        lottery.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), LOTTERY_ACCOUNT_SIZE);
    }
}

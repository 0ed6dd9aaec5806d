pub const LOTTERY_SEED: &[u8] = b"lottery";
pub const TREASURY_SEED: &[u8] = b"treasury";

/// Upper bound on entrants per round; fixes the lottery account size.
pub const MAX_PLAYERS: usize = 100;

// Randomness request parameters forwarded to the coordinator
pub const NUM_WORDS: u32 = 1;
pub const REQUEST_CONFIRMATIONS: u16 = 3;

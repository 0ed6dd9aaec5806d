use anchor_lang::error_code;

#[error_code]
pub enum LotteryError {
    Overflow,
    #[msg("Not enough SOL sent to cover the entrance fee")]
    InsufficientPayment,
    #[msg("Lottery is not open")]
    NotOpen,
    #[msg("Lottery has reached its maximum number of players")]
    LotteryFull,
    #[msg("Upkeep is not needed")]
    UpkeepNotNeeded,
    #[msg("Request id does not match the outstanding randomness request")]
    UnknownRequestId,
    #[msg("Only the VRF coordinator can fulfill randomness requests")]
    OnlyCoordinatorCanFulfill,
    #[msg("At least one random word is required")]
    MissingRandomWords,
    #[msg("Winner account does not match the selected player")]
    WinnerAccountMismatch,
    #[msg("Lottery has no players")]
    NoPlayers,
    #[msg("Interval must be greater than zero")]
    InvalidInterval,
    InvalidTreasury,
    #[msg("Treasury transfer failed")]
    TransferFailed,
}

use cosmwasm_std::StdError;
use promo_common::command::CommandError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid lottery parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("lottery {lottery_id} is still open")]
    LotteryAlreadyActive { lottery_id: u64 },

    #[error("lottery {lottery_id} not found")]
    LotteryNotFound { lottery_id: u64 },

    #[error("deadline {handle} not reached yet (fires at {fire_at})")]
    DeadlineNotReached { handle: u64, fire_at: u64 },

    #[error("{0}")]
    InvalidCommand(#[from] CommandError),
}

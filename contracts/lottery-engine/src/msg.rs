use cosmwasm_schema::{cw_serde, QueryResponses};
use promo_common::types::{ParticipationResult, TierRestriction};

use crate::state::{DrawResult, EngineConfig, EngineState, Lottery, ScheduledDeadline};

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
    pub tier_registry: String,
    /// Defaults to `DEFAULT_MAX_CAPACITY`
    pub max_capacity: Option<u32>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Open a new lottery. Admin only; fails while another lottery is open.
    CreateLottery {
        prize: String,
        capacity: u32,
        winner_count: u32,
        tier_restriction: TierRestriction,
        /// Countdown such as `10s`, `5m`, `2h`, `1d`
        duration: Option<String>,
    },
    /// Join a lottery on behalf of a chat user. Operator only.
    /// Defaults to the active lottery.
    Participate {
        user_id: u64,
        lottery_id: Option<u64>,
    },
    /// Fire a due deadline callback. Anyone can call.
    FireDeadline { handle: u64 },
    /// Stop a lottery early and draw its winners. Admin only.
    CloseLottery { lottery_id: u64 },
    /// Update configuration. Admin only.
    UpdateConfig {
        add_operators: Vec<String>,
        remove_operators: Vec<String>,
        tier_registry: Option<String>,
        max_capacity: Option<u32>,
    },
}

/// Parameters for creating a lottery (avoids too_many_arguments).
pub struct CreateLotteryParams {
    pub prize: String,
    pub capacity: u32,
    pub winner_count: u32,
    pub tier_restriction: TierRestriction,
    pub duration: Option<String>,
}

/// Parameters for updating config (avoids too_many_arguments).
pub struct UpdateConfigParams {
    pub add_operators: Vec<String>,
    pub remove_operators: Vec<String>,
    pub tier_registry: Option<String>,
    pub max_capacity: Option<u32>,
}

#[cw_serde]
pub struct MigrateMsg {}

/// Query message for the tier registry contract.
#[cw_serde]
pub enum TierRegistryQueryMsg {
    Tier { user_id: u64 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(EngineConfig)]
    Config {},
    #[returns(EngineState)]
    EngineState {},
    #[returns(Lottery)]
    Lottery { lottery_id: u64 },
    #[returns(Option<Lottery>)]
    ActiveLottery {},
    #[returns(LotteryHistoryResponse)]
    LotteryHistory {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(ParticipantsResponse)]
    Participants {
        lottery_id: u64,
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(bool)]
    HasParticipated { lottery_id: u64, user_id: u64 },
    #[returns(Option<DrawResult>)]
    DrawResult { lottery_id: u64 },
    #[returns(bool)]
    IsWinner { lottery_id: u64, user_id: u64 },
    #[returns(UserWinsResponse)]
    UserWins {
        user_id: u64,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    /// Deadline callbacks whose time has come, for the keeper to fire.
    #[returns(Vec<ScheduledDeadline>)]
    DueDeadlines { limit: Option<u32> },
}

#[cw_serde]
pub struct LotteryHistoryResponse {
    pub lotteries: Vec<Lottery>,
}

#[cw_serde]
pub struct ParticipantEntry {
    pub seq: u32,
    pub user_id: u64,
}

#[cw_serde]
pub struct ParticipantsResponse {
    pub lottery_id: u64,
    pub participants: Vec<ParticipantEntry>,
}

#[cw_serde]
pub struct UserWinsResponse {
    pub user_id: u64,
    pub lottery_ids: Vec<u64>,
}

/// A lottery that has just closed, with everything needed to announce it.
#[cw_serde]
pub struct ClosedLottery {
    pub lottery: Lottery,
    pub result: DrawResult,
    /// All participants in admission order
    pub participants: Vec<u64>,
    /// Deadline callback cancelled by this close, if one was still pending
    pub cancelled_deadline: Option<u64>,
}

/// Result of `close_lottery`. `NoOp` means the lottery was already closed.
#[cw_serde]
pub enum CloseOutcome {
    Closed(ClosedLottery),
    NoOp,
}

impl CloseOutcome {
    pub fn into_closed(self) -> Option<ClosedLottery> {
        match self {
            CloseOutcome::Closed(closed) => Some(closed),
            CloseOutcome::NoOp => None,
        }
    }
}

/// `data` of a `Participate` response.
#[cw_serde]
pub struct ParticipationResponse {
    pub result: ParticipationResult,
    pub lottery_id: Option<u64>,
    pub participant_count: u32,
    /// Set when this call closed the lottery (capacity filled or deadline observed)
    pub closed: Option<ClosedLottery>,
}

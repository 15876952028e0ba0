use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp};
use cw_storage_plus::{Item, Map};
use promo_common::types::{AnnouncementVariant, CloseTrigger, LotteryStatus, TierRestriction};

pub const CONFIG: Item<EngineConfig> = Item::new("config");
pub const ENGINE_STATE: Item<EngineState> = Item::new("engine_state");
pub const LOTTERIES: Map<u64, Lottery> = Map::new("lotteries");

/// (lottery_id, user_id) -> participation. The key is the one-join-per-user guarantee.
pub const PARTICIPATIONS: Map<(u64, u64), Participation> = Map::new("participations");
/// (lottery_id, seq) -> user_id, in admission order
pub const PARTICIPANT_ORDER: Map<(u64, u32), u64> = Map::new("participant_order");

pub const DRAW_RESULTS: Map<u64, DrawResult> = Map::new("draw_results");
/// (lottery_id, user_id) -> rank in draw order
pub const WINNERS: Map<(u64, u64), u32> = Map::new("winners");
/// Per-user win tracking: (user_id, lottery_id)
pub const USER_WINS: Map<(u64, u64), ()> = Map::new("user_wins");

/// Pending deadline callbacks, keyed by handle.
pub const SCHEDULED_DEADLINES: Map<u64, ScheduledDeadline> = Map::new("deadlines");

pub const DEFAULT_MAX_CAPACITY: u32 = 10_000;

#[cw_serde]
pub struct EngineConfig {
    pub admin: Addr,
    /// Bot relayers that submit participations on behalf of chat users
    pub operators: Vec<Addr>,
    /// Contract answering `Tier { user_id }` queries
    pub tier_registry: Addr,
    /// Upper bound on a lottery's capacity (bounds the close-time draw)
    pub max_capacity: u32,
}

/// Singleton engine record. `active_lottery` is the only Open lottery, if any.
#[cw_serde]
pub struct EngineState {
    pub next_lottery_id: u64,
    pub active_lottery: Option<u64>,
    pub next_deadline_handle: u64,
    pub total_lotteries_closed: u64,
}

#[cw_serde]
pub struct Lottery {
    pub id: u64,
    pub prize: String,
    pub capacity: u32,
    pub winner_count: u32,
    pub tier_restriction: TierRestriction,
    pub status: LotteryStatus,
    pub created_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub deadline: Option<Timestamp>,
    /// Pending deadline callback; cleared once the lottery closes
    pub deadline_handle: Option<u64>,
    pub participant_count: u32,
    pub close_trigger: Option<CloseTrigger>,
}

impl Lottery {
    pub fn is_open(&self) -> bool {
        self.status == LotteryStatus::Open
    }
}

#[cw_serde]
pub struct Participation {
    pub user_id: u64,
    pub seq: u32,
    pub joined_at: Timestamp,
}

#[cw_serde]
pub struct DrawResult {
    pub lottery_id: u64,
    pub trigger: CloseTrigger,
    pub participant_count: u32,
    /// Winners in draw order
    pub winners: Vec<u64>,
    /// Hex-encoded seed the sampler was run with
    pub seed: String,
    pub announcement: AnnouncementVariant,
    pub drawn_at: Timestamp,
}

#[cw_serde]
pub struct ScheduledDeadline {
    pub handle: u64,
    pub lottery_id: u64,
    pub fire_at: Timestamp,
}

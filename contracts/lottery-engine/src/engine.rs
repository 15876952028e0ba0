//! Lottery lifecycle: creation, admission and the one-time close + draw.
//!
//! Everything here works on storage and the block environment only; caller
//! identity is checked by the `execute` layer before these functions run.
//! CosmWasm executes messages one at a time, so each call below is a single
//! serialized critical section, and a failed call leaves no partial writes.

use cosmwasm_std::{
    to_json_binary, Addr, DepsMut, Env, Order, QuerierWrapper, QueryRequest, StdResult, Storage,
    WasmQuery,
};
use promo_common::sampling::{derive_seed, sample_without_replacement, DrawRng};
use promo_common::types::{
    AnnouncementVariant, CloseTrigger, LotteryStatus, ParticipationResult, TierResponse,
    TierRestriction, UserTier,
};

use crate::error::ContractError;
use crate::msg::{ClosedLottery, CloseOutcome, ParticipationResponse, TierRegistryQueryMsg};
use crate::scheduler;
use crate::state::{
    DrawResult, Lottery, Participation, ScheduledDeadline, DRAW_RESULTS, ENGINE_STATE, LOTTERIES,
    PARTICIPANT_ORDER, PARTICIPATIONS, USER_WINS, WINNERS,
};

const DRAW_SEED_DOMAIN: &[u8] = b"promo-lottery-draw-v1";

/// Longest countdown accepted for a deadline (one year).
pub const MAX_DURATION_SECONDS: u64 = 365 * 24 * 60 * 60;

pub struct NewLottery {
    pub prize: String,
    pub capacity: u32,
    pub winner_count: u32,
    pub tier_restriction: TierRestriction,
    pub duration_seconds: Option<u64>,
}

pub fn validate_parameters(params: &NewLottery, max_capacity: u32) -> Result<(), ContractError> {
    let invalid = |reason: String| -> Result<(), ContractError> {
        Err(ContractError::InvalidParameters { reason })
    };

    if params.prize.trim().is_empty() {
        return invalid("prize must not be empty".to_string());
    }
    if params.capacity < 1 {
        return invalid("capacity must be at least 1".to_string());
    }
    if params.capacity > max_capacity {
        return invalid(format!(
            "capacity {} exceeds maximum {}",
            params.capacity, max_capacity
        ));
    }
    if params.winner_count < 1 {
        return invalid("winner count must be at least 1".to_string());
    }
    if params.winner_count > params.capacity {
        return invalid(format!(
            "winner count {} exceeds capacity {}",
            params.winner_count, params.capacity
        ));
    }
    if let Some(secs) = params.duration_seconds {
        if secs == 0 || secs > MAX_DURATION_SECONDS {
            return invalid(format!(
                "duration must be between 1 and {} seconds",
                MAX_DURATION_SECONDS
            ));
        }
    }
    Ok(())
}

/// Open a new lottery, scheduling its deadline callback if it has one.
///
/// Fails without touching storage if the parameters are invalid or another
/// lottery is still open.
pub fn create_lottery(
    storage: &mut dyn Storage,
    env: &Env,
    params: NewLottery,
    max_capacity: u32,
) -> Result<(Lottery, Option<ScheduledDeadline>), ContractError> {
    validate_parameters(&params, max_capacity)?;

    // Only one open lottery at a time
    let mut state = ENGINE_STATE.load(storage)?;
    if let Some(active) = state.active_lottery {
        return Err(ContractError::LotteryAlreadyActive { lottery_id: active });
    }

    let lottery_id = state.next_lottery_id;
    state.next_lottery_id += 1;

    let deadline = params
        .duration_seconds
        .map(|secs| env.block.time.plus_seconds(secs));
    let scheduled = match deadline {
        Some(fire_at) => Some(scheduler::schedule_once(
            storage, &mut state, lottery_id, fire_at,
        )?),
        None => None,
    };

    let lottery = Lottery {
        id: lottery_id,
        prize: params.prize,
        capacity: params.capacity,
        winner_count: params.winner_count,
        tier_restriction: params.tier_restriction,
        status: LotteryStatus::Open,
        created_at: env.block.time,
        closed_at: None,
        deadline,
        deadline_handle: scheduled.as_ref().map(|entry| entry.handle),
        participant_count: 0,
        close_trigger: None,
    };
    LOTTERIES.save(storage, lottery_id, &lottery)?;

    state.active_lottery = Some(lottery_id);
    ENGINE_STATE.save(storage, &state)?;

    Ok((lottery, scheduled))
}

/// Ask the tier registry for a user's tier. `None` means the user is unknown.
pub fn query_user_tier(
    querier: &QuerierWrapper,
    tier_registry: &Addr,
    user_id: u64,
) -> StdResult<Option<UserTier>> {
    let request = QueryRequest::Wasm(WasmQuery::Smart {
        contract_addr: tier_registry.to_string(),
        msg: to_json_binary(&TierRegistryQueryMsg::Tier { user_id })?,
    });
    let response: TierResponse = querier.query(&request)?;
    Ok(response.tier)
}

/// Admit `user_id` to a lottery (the active one when `lottery_id` is None).
///
/// Checks run in order: existence and status, tier gate, duplicate join,
/// deadline passage. A call that observes a passed deadline closes the
/// lottery and is not admitted. The admission that fills the last slot is
/// recorded first and then closes the lottery, so that user is part of the
/// draw.
///
/// Rejections are returned as results, not errors, so that a close made
/// while evaluating them is kept.
pub fn admit_participant(
    deps: DepsMut,
    env: &Env,
    tier_registry: &Addr,
    lottery_id: Option<u64>,
    user_id: u64,
) -> Result<ParticipationResponse, ContractError> {
    let state = ENGINE_STATE.load(deps.storage)?;

    // 1. Lottery must exist and be open
    let Some(lottery_id) = lottery_id.or(state.active_lottery) else {
        return Ok(rejected(ParticipationResult::LotteryNotFound, None, 0));
    };
    let Some(mut lottery) = LOTTERIES.may_load(deps.storage, lottery_id)? else {
        return Ok(rejected(
            ParticipationResult::LotteryNotFound,
            Some(lottery_id),
            0,
        ));
    };
    if !lottery.is_open() {
        return Ok(rejected(
            ParticipationResult::LotteryClosed,
            Some(lottery_id),
            lottery.participant_count,
        ));
    }

    // 2. Tier gate (unknown users never pass a restriction)
    if lottery.tier_restriction.is_restricted() {
        let tier = query_user_tier(&deps.querier, tier_registry, user_id)?;
        if !lottery.tier_restriction.admits(tier.as_ref()) {
            return Ok(rejected(
                ParticipationResult::TierNotEligible,
                Some(lottery_id),
                lottery.participant_count,
            ));
        }
    }

    // 3. Check for duplicate
    if PARTICIPATIONS.has(deps.storage, (lottery_id, user_id)) {
        return Ok(rejected(
            ParticipationResult::AlreadyParticipated,
            Some(lottery_id),
            lottery.participant_count,
        ));
    }

    // 4. Deadline passed: close now, this caller is not admitted
    if let Some(deadline) = lottery.deadline {
        if env.block.time >= deadline {
            let closed =
                close_lottery(deps.storage, env, lottery_id, CloseTrigger::Deadline)?.into_closed();
            return Ok(ParticipationResponse {
                result: ParticipationResult::LotteryClosed,
                lottery_id: Some(lottery_id),
                participant_count: lottery.participant_count,
                closed,
            });
        }
    }

    // 5. Record the participation
    let seq = lottery.participant_count;
    PARTICIPATIONS.save(
        deps.storage,
        (lottery_id, user_id),
        &Participation {
            user_id,
            seq,
            joined_at: env.block.time,
        },
    )?;
    PARTICIPANT_ORDER.save(deps.storage, (lottery_id, seq), &user_id)?;
    lottery.participant_count += 1;
    LOTTERIES.save(deps.storage, lottery_id, &lottery)?;

    // 6. Last slot filled
    let closed = if lottery.participant_count >= lottery.capacity {
        close_lottery(deps.storage, env, lottery_id, CloseTrigger::Capacity)?.into_closed()
    } else {
        None
    };

    Ok(ParticipationResponse {
        result: ParticipationResult::Admitted,
        lottery_id: Some(lottery_id),
        participant_count: lottery.participant_count,
        closed,
    })
}

fn rejected(
    result: ParticipationResult,
    lottery_id: Option<u64>,
    participant_count: u32,
) -> ParticipationResponse {
    ParticipationResponse {
        result,
        lottery_id,
        participant_count,
        closed: None,
    }
}

/// Close a lottery and draw its winners. Idempotent: a closed lottery yields `NoOp`.
///
/// The lottery is always re-read from storage. Winners are
/// `min(winner_count, participants)` users sampled uniformly without
/// replacement from the participants in admission order. Any pending
/// deadline callback is cancelled.
pub fn close_lottery(
    storage: &mut dyn Storage,
    env: &Env,
    lottery_id: u64,
    trigger: CloseTrigger,
) -> Result<CloseOutcome, ContractError> {
    let mut lottery = LOTTERIES
        .may_load(storage, lottery_id)?
        .ok_or(ContractError::LotteryNotFound { lottery_id })?;
    if !lottery.is_open() {
        return Ok(CloseOutcome::NoOp);
    }

    // Draw min(winner_count, participants) winners
    let participants = load_participants(storage, lottery_id)?;
    let seed = draw_seed(env, lottery_id, &participants);
    let mut rng = DrawRng::new(seed);
    let winners = sample_without_replacement(&participants, lottery.winner_count as usize, &mut rng);

    // Drop the pending deadline callback so it can't fire later
    let cancelled_deadline = match lottery.deadline_handle.take() {
        Some(handle) if scheduler::cancel(storage, handle) => Some(handle),
        _ => None,
    };

    lottery.status = LotteryStatus::Closed;
    lottery.closed_at = Some(env.block.time);
    lottery.close_trigger = Some(trigger.clone());
    LOTTERIES.save(storage, lottery_id, &lottery)?;

    // Per-user win tracking
    for (rank, winner) in winners.iter().enumerate() {
        WINNERS.save(storage, (lottery_id, *winner), &(rank as u32))?;
        USER_WINS.save(storage, (*winner, lottery_id), &())?;
    }

    let announcement = if participants.is_empty() {
        AnnouncementVariant::NoParticipants
    } else {
        AnnouncementVariant::Winners
    };
    let result = DrawResult {
        lottery_id,
        trigger,
        participant_count: lottery.participant_count,
        winners,
        seed: hex::encode(seed),
        announcement,
        drawn_at: env.block.time,
    };
    DRAW_RESULTS.save(storage, lottery_id, &result)?;

    // Free the engine for the next lottery
    let mut state = ENGINE_STATE.load(storage)?;
    if state.active_lottery == Some(lottery_id) {
        state.active_lottery = None;
    }
    state.total_lotteries_closed += 1;
    ENGINE_STATE.save(storage, &state)?;

    Ok(CloseOutcome::Closed(ClosedLottery {
        lottery,
        result,
        participants,
        cancelled_deadline,
    }))
}

/// Participant user ids in admission order.
pub fn load_participants(storage: &dyn Storage, lottery_id: u64) -> StdResult<Vec<u64>> {
    PARTICIPANT_ORDER
        .prefix(lottery_id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, user_id)| user_id))
        .collect()
}

/// `seed = sha256(domain, lottery id, chain id, height, time, tx index, participants)`
fn draw_seed(env: &Env, lottery_id: u64, participants: &[u64]) -> [u8; 32] {
    let tx_index = env.transaction.as_ref().map(|tx| tx.index).unwrap_or(0);
    let participant_bytes: Vec<u8> = participants
        .iter()
        .flat_map(|user_id| user_id.to_be_bytes())
        .collect();

    derive_seed(&[
        DRAW_SEED_DOMAIN,
        &lottery_id.to_be_bytes(),
        env.block.chain_id.as_bytes(),
        &env.block.height.to_be_bytes(),
        &env.block.time.nanos().to_be_bytes(),
        &tx_index.to_be_bytes(),
        &participant_bytes,
    ])
}

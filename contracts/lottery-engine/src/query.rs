use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdResult};
use cw_storage_plus::Bound;

use crate::msg::{
    LotteryHistoryResponse, ParticipantEntry, ParticipantsResponse, UserWinsResponse,
};
use crate::scheduler;
use crate::state::{
    CONFIG, DRAW_RESULTS, ENGINE_STATE, LOTTERIES, PARTICIPANT_ORDER, PARTICIPATIONS, USER_WINS,
    WINNERS,
};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_engine_state(deps: Deps) -> StdResult<Binary> {
    let state = ENGINE_STATE.load(deps.storage)?;
    to_json_binary(&state)
}

pub fn query_lottery(deps: Deps, lottery_id: u64) -> StdResult<Binary> {
    let lottery = LOTTERIES.load(deps.storage, lottery_id)?;
    to_json_binary(&lottery)
}

pub fn query_active_lottery(deps: Deps) -> StdResult<Binary> {
    let state = ENGINE_STATE.load(deps.storage)?;
    let lottery = match state.active_lottery {
        Some(id) => LOTTERIES.may_load(deps.storage, id)?,
        None => None,
    };
    to_json_binary(&lottery)
}

pub fn query_lottery_history(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let lotteries: Vec<_> = LOTTERIES
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, lottery)| lottery)
        .collect();

    to_json_binary(&LotteryHistoryResponse { lotteries })
}

pub fn query_participants(
    deps: Deps,
    lottery_id: u64,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let participants: Vec<ParticipantEntry> = PARTICIPANT_ORDER
        .prefix(lottery_id)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(seq, user_id)| ParticipantEntry { seq, user_id })
        .collect();

    to_json_binary(&ParticipantsResponse {
        lottery_id,
        participants,
    })
}

pub fn query_has_participated(deps: Deps, lottery_id: u64, user_id: u64) -> StdResult<Binary> {
    let joined = PARTICIPATIONS.has(deps.storage, (lottery_id, user_id));
    to_json_binary(&joined)
}

pub fn query_draw_result(deps: Deps, lottery_id: u64) -> StdResult<Binary> {
    let result = DRAW_RESULTS.may_load(deps.storage, lottery_id)?;
    to_json_binary(&result)
}

pub fn query_is_winner(deps: Deps, lottery_id: u64, user_id: u64) -> StdResult<Binary> {
    let won = WINNERS.has(deps.storage, (lottery_id, user_id));
    to_json_binary(&won)
}

pub fn query_user_wins(
    deps: Deps,
    user_id: u64,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let lottery_ids: Vec<u64> = USER_WINS
        .prefix(user_id)
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .collect();

    to_json_binary(&UserWinsResponse {
        user_id,
        lottery_ids,
    })
}

pub fn query_due_deadlines(deps: Deps, env: Env, limit: Option<u32>) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let due = scheduler::due(deps.storage, env.block.time, limit)?;
    to_json_binary(&due)
}

use cosmwasm_std::{to_json_binary, Binary, Deps, Order, StdResult};
use cw_storage_plus::Bound;
use promo_common::types::TierResponse;

use crate::msg::KnownUsersResponse;
use crate::state::{CONFIG, USERS, USER_COUNT};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_tier(deps: Deps, user_id: u64) -> StdResult<Binary> {
    let tier = USERS
        .may_load(deps.storage, user_id)?
        .map(|record| record.tier);
    to_json_binary(&TierResponse { user_id, tier })
}

pub fn query_user(deps: Deps, user_id: u64) -> StdResult<Binary> {
    let record = USERS.may_load(deps.storage, user_id)?;
    to_json_binary(&record)
}

pub fn query_known_users(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(100).min(500) as usize;
    let start = start_after.map(Bound::exclusive);

    let user_ids: Vec<u64> = USERS
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .collect::<StdResult<_>>()?;

    to_json_binary(&KnownUsersResponse { user_ids })
}

pub fn query_user_count(deps: Deps) -> StdResult<Binary> {
    let count = USER_COUNT.may_load(deps.storage)?.unwrap_or(0);
    to_json_binary(&count)
}

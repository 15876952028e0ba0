use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{
    CreateLotteryParams, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, UpdateConfigParams,
};
use crate::query;
use crate::state::{EngineConfig, EngineState, CONFIG, DEFAULT_MAX_CAPACITY, ENGINE_STATE};

const CONTRACT_NAME: &str = "crates.io:promo-lottery-engine";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let max_capacity = msg.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY);
    execute::validate_max_capacity(max_capacity)?;

    let mut operators = Vec::new();
    for op in &msg.operators {
        operators.push(deps.api.addr_validate(op)?);
    }

    let config = EngineConfig {
        admin: info.sender.clone(),
        operators,
        tier_registry: deps.api.addr_validate(&msg.tier_registry)?,
        max_capacity,
    };
    CONFIG.save(deps.storage, &config)?;

    let state = EngineState {
        next_lottery_id: 0,
        active_lottery: None,
        next_deadline_handle: 0,
        total_lotteries_closed: 0,
    };
    ENGINE_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "lottery-engine")
        .add_attribute("admin", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateLottery {
            prize,
            capacity,
            winner_count,
            tier_restriction,
            duration,
        } => execute::create_lottery(
            deps,
            env,
            info,
            CreateLotteryParams {
                prize,
                capacity,
                winner_count,
                tier_restriction,
                duration,
            },
        ),
        ExecuteMsg::Participate {
            user_id,
            lottery_id,
        } => execute::participate(deps, env, info, user_id, lottery_id),
        ExecuteMsg::FireDeadline { handle } => execute::fire_deadline(deps, env, info, handle),
        ExecuteMsg::CloseLottery { lottery_id } => {
            execute::close_lottery(deps, env, info, lottery_id)
        }
        ExecuteMsg::UpdateConfig {
            add_operators,
            remove_operators,
            tier_registry,
            max_capacity,
        } => execute::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                add_operators,
                remove_operators,
                tier_registry,
                max_capacity,
            },
        ),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::EngineState {} => query::query_engine_state(deps),
        QueryMsg::Lottery { lottery_id } => query::query_lottery(deps, lottery_id),
        QueryMsg::ActiveLottery {} => query::query_active_lottery(deps),
        QueryMsg::LotteryHistory { start_after, limit } => {
            query::query_lottery_history(deps, start_after, limit)
        }
        QueryMsg::Participants {
            lottery_id,
            start_after,
            limit,
        } => query::query_participants(deps, lottery_id, start_after, limit),
        QueryMsg::HasParticipated {
            lottery_id,
            user_id,
        } => query::query_has_participated(deps, lottery_id, user_id),
        QueryMsg::DrawResult { lottery_id } => query::query_draw_result(deps, lottery_id),
        QueryMsg::IsWinner {
            lottery_id,
            user_id,
        } => query::query_is_winner(deps, lottery_id, user_id),
        QueryMsg::UserWins {
            user_id,
            start_after,
            limit,
        } => query::query_user_wins(deps, user_id, start_after, limit),
        QueryMsg::DueDeadlines { limit } => query::query_due_deadlines(deps, env, limit),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}

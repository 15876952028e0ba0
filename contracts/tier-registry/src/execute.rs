use cosmwasm_std::{Addr, DepsMut, Env, Event, MessageInfo, Response, Storage};
use promo_common::types::UserTier;

use crate::error::ContractError;
use crate::state::{RegistryConfig, UserRecord, CONFIG, USERS, USER_COUNT};

fn ensure_operator(config: &RegistryConfig, sender: &Addr) -> Result<(), ContractError> {
    if *sender != config.admin && !config.operators.contains(sender) {
        return Err(ContractError::Unauthorized {
            reason: "only operators or admin can manage users".to_string(),
        });
    }
    Ok(())
}

/// Insert a Regular record for `user_id` if absent. Returns true when the user is new.
fn register_if_absent(
    storage: &mut dyn Storage,
    env: &Env,
    user_id: u64,
) -> Result<bool, ContractError> {
    if USERS.has(storage, user_id) {
        return Ok(false);
    }
    let record = UserRecord {
        tier: UserTier::Regular,
        registered_at: env.block.time,
        updated_at: env.block.time,
    };
    USERS.save(storage, user_id, &record)?;
    let count = USER_COUNT.may_load(storage)?.unwrap_or(0);
    USER_COUNT.save(storage, &(count + 1))?;
    Ok(true)
}

/// Register a chat user. Operators or admin only.
pub fn register_user(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    user_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info.sender)?;

    let created = register_if_absent(deps.storage, &env, user_id)?;

    let mut res = Response::new()
        .add_attribute("action", "register_user")
        .add_attribute("user_id", user_id.to_string())
        .add_attribute("created", created.to_string());
    if created {
        res = res.add_event(
            Event::new("promo_user_registered")
                .add_attribute("user_id", user_id.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        );
    }
    Ok(res)
}

/// Set a user's tier (`/addvip`, `/rmvip`). Operators or admin only.
pub fn set_tier(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    user_id: u64,
    tier: UserTier,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info.sender)?;

    // Unknown users are registered first
    register_if_absent(deps.storage, &env, user_id)?;

    let mut record = USERS.load(deps.storage, user_id)?;
    let previous = record.tier.clone();
    record.tier = tier.clone();
    record.updated_at = env.block.time;
    USERS.save(deps.storage, user_id, &record)?;

    Ok(Response::new()
        .add_attribute("action", "set_tier")
        .add_attribute("user_id", user_id.to_string())
        .add_attribute("tier", tier.to_string())
        .add_event(
            Event::new("promo_tier_set")
                .add_attribute("user_id", user_id.to_string())
                .add_attribute("previous_tier", previous.to_string())
                .add_attribute("tier", tier.to_string())
                .add_attribute("set_by", info.sender.to_string()),
        ))
}

/// Update the operator list. Admin only.
pub fn update_operators(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    // Authorization: only admin
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update operators".to_string(),
        });
    }

    for addr_str in &remove {
        let addr = deps.api.addr_validate(addr_str)?;
        config.operators.retain(|a| *a != addr);
    }

    for addr_str in &add {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.operators.contains(&addr) {
            config.operators.push(addr);
        }
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_operators")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}

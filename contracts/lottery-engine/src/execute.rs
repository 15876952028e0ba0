use cosmwasm_std::{to_json_binary, Addr, DepsMut, Env, Event, MessageInfo, Response};
use promo_common::command::parse_duration;
use promo_common::types::{CloseTrigger, TierRestriction};

use crate::engine::{self, NewLottery};
use crate::error::ContractError;
use crate::msg::{ClosedLottery, CloseOutcome, CreateLotteryParams, UpdateConfigParams};
use crate::scheduler;
use crate::state::{EngineConfig, CONFIG};

fn ensure_admin(config: &EngineConfig, sender: &Addr, action: &str) -> Result<(), ContractError> {
    if *sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: format!("only admin can {action}"),
        });
    }
    Ok(())
}

fn ensure_operator(config: &EngineConfig, sender: &Addr) -> Result<(), ContractError> {
    if *sender != config.admin && !config.operators.contains(sender) {
        return Err(ContractError::Unauthorized {
            reason: "only operators can submit participations".to_string(),
        });
    }
    Ok(())
}

pub fn validate_max_capacity(max_capacity: u32) -> Result<(), ContractError> {
    if max_capacity == 0 {
        return Err(ContractError::InvalidParameters {
            reason: "max capacity must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn restriction_label(restriction: &TierRestriction) -> String {
    match restriction {
        TierRestriction::Any => "any".to_string(),
        TierRestriction::Restricted { tier } => tier.to_string().to_lowercase(),
    }
}

/// Attach the `promo_lottery_closed` event (and the cancellation, if any).
fn with_close_events(res: Response, closed: &ClosedLottery) -> Response {
    let winners: Vec<String> = closed.result.winners.iter().map(|w| w.to_string()).collect();
    let res = res.add_event(
        Event::new("promo_lottery_closed")
            .add_attribute("lottery_id", closed.lottery.id.to_string())
            .add_attribute("prize", closed.lottery.prize.clone())
            .add_attribute("trigger", closed.result.trigger.as_str())
            .add_attribute(
                "participant_count",
                closed.result.participant_count.to_string(),
            )
            .add_attribute("winner_count", closed.result.winners.len().to_string())
            .add_attribute("winners", winners.join(","))
            .add_attribute("seed", closed.result.seed.clone())
            .add_attribute("announcement", closed.result.announcement.as_str())
            .add_attribute("timestamp", closed.result.drawn_at.seconds().to_string()),
    );

    match closed.cancelled_deadline {
        Some(handle) => res.add_event(
            Event::new("promo_deadline_cancelled")
                .add_attribute("handle", handle.to_string())
                .add_attribute("lottery_id", closed.lottery.id.to_string()),
        ),
        None => res,
    }
}

fn outcome_label(outcome: &CloseOutcome) -> &'static str {
    match outcome {
        CloseOutcome::Closed(_) => "closed",
        CloseOutcome::NoOp => "no_op",
    }
}

/// Create a lottery. Admin only.
/// The duration text is parsed here, before the engine sees anything.
pub fn create_lottery(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: CreateLotteryParams,
) -> Result<Response, ContractError> {
    let CreateLotteryParams {
        prize,
        capacity,
        winner_count,
        tier_restriction,
        duration,
    } = params;

    // Authorization: only admin
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "create lotteries")?;

    // Reject a bad duration before anything is written
    let duration_seconds = duration.as_deref().map(parse_duration).transpose()?;

    let (lottery, scheduled) = engine::create_lottery(
        deps.storage,
        &env,
        NewLottery {
            prize,
            capacity,
            winner_count,
            tier_restriction,
            duration_seconds,
        },
        config.max_capacity,
    )?;

    let deadline_str = lottery
        .deadline
        .map(|d| d.seconds().to_string())
        .unwrap_or_else(|| "none".to_string());

    let mut res = Response::new()
        .add_attribute("action", "create_lottery")
        .add_attribute("lottery_id", lottery.id.to_string())
        .add_event(
            Event::new("promo_lottery_created")
                .add_attribute("lottery_id", lottery.id.to_string())
                .add_attribute("prize", lottery.prize.clone())
                .add_attribute("capacity", lottery.capacity.to_string())
                .add_attribute("winner_count", lottery.winner_count.to_string())
                .add_attribute("tier_restriction", restriction_label(&lottery.tier_restriction))
                .add_attribute("deadline", deadline_str)
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        );

    if let Some(entry) = scheduled {
        res = res.add_event(
            Event::new("promo_deadline_scheduled")
                .add_attribute("handle", entry.handle.to_string())
                .add_attribute("lottery_id", entry.lottery_id.to_string())
                .add_attribute("fire_at", entry.fire_at.seconds().to_string()),
        );
    }

    Ok(res.set_data(to_json_binary(&lottery)?))
}

/// Submit a participation for a chat user. Operators only.
///
/// Every admission outcome is a successful response; the outcome is in
/// the `result` attribute and in `data` as a `ParticipationResponse`.
pub fn participate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    user_id: u64,
    lottery_id: Option<u64>,
) -> Result<Response, ContractError> {
    // Authorization: only operators
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info.sender)?;

    let outcome =
        engine::admit_participant(deps, &env, &config.tier_registry, lottery_id, user_id)?;

    let lottery_str = outcome
        .lottery_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());

    let mut res = Response::new()
        .add_attribute("action", "participate")
        .add_attribute("user_id", user_id.to_string())
        .add_attribute("result", outcome.result.as_str())
        .add_event(
            Event::new("promo_participation")
                .add_attribute("lottery_id", lottery_str)
                .add_attribute("user_id", user_id.to_string())
                .add_attribute("result", outcome.result.as_str())
                .add_attribute("participant_count", outcome.participant_count.to_string()),
        );

    if let Some(closed) = &outcome.closed {
        res = with_close_events(res, closed);
    }

    Ok(res.set_data(to_json_binary(&outcome)?))
}

/// Fire a deadline callback. Anyone can call once `fire_at` has passed.
/// A handle that already fired or was cancelled is a no-op.
pub fn fire_deadline(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    handle: u64,
) -> Result<Response, ContractError> {
    let Some(entry) = scheduler::pending(deps.storage, handle)? else {
        return Ok(Response::new()
            .add_attribute("action", "fire_deadline")
            .add_attribute("handle", handle.to_string())
            .add_attribute("result", outcome_label(&CloseOutcome::NoOp))
            .set_data(to_json_binary(&CloseOutcome::NoOp)?));
    };

    // Must be due
    if env.block.time < entry.fire_at {
        return Err(ContractError::DeadlineNotReached {
            handle,
            fire_at: entry.fire_at.seconds(),
        });
    }

    scheduler::cancel(deps.storage, handle);
    let outcome =
        engine::close_lottery(deps.storage, &env, entry.lottery_id, CloseTrigger::Deadline)?;

    let mut res = Response::new()
        .add_attribute("action", "fire_deadline")
        .add_attribute("handle", handle.to_string())
        .add_attribute("lottery_id", entry.lottery_id.to_string())
        .add_attribute("result", outcome_label(&outcome))
        .add_event(
            Event::new("promo_deadline_fired")
                .add_attribute("handle", handle.to_string())
                .add_attribute("lottery_id", entry.lottery_id.to_string())
                .add_attribute("fire_at", entry.fire_at.seconds().to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        );

    if let CloseOutcome::Closed(closed) = &outcome {
        res = with_close_events(res, closed);
    }

    Ok(res.set_data(to_json_binary(&outcome)?))
}

/// Stop a lottery early and draw its winners. Admin only.
pub fn close_lottery(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    lottery_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "close lotteries")?;

    let outcome = engine::close_lottery(deps.storage, &env, lottery_id, CloseTrigger::Admin)?;

    let mut res = Response::new()
        .add_attribute("action", "close_lottery")
        .add_attribute("lottery_id", lottery_id.to_string())
        .add_attribute("result", outcome_label(&outcome));

    if let CloseOutcome::Closed(closed) = &outcome {
        res = with_close_events(res, closed);
    }

    Ok(res.set_data(to_json_binary(&outcome)?))
}

/// Update configuration. Admin only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        add_operators,
        remove_operators,
        tier_registry,
        max_capacity,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender, "update config")?;

    for addr_str in &remove_operators {
        let addr = deps.api.addr_validate(addr_str)?;
        config.operators.retain(|a| *a != addr);
    }
    for addr_str in &add_operators {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.operators.contains(&addr) {
            config.operators.push(addr);
        }
    }
    if let Some(registry) = tier_registry {
        config.tier_registry = deps.api.addr_validate(&registry)?;
    }
    if let Some(max) = max_capacity {
        validate_max_capacity(max)?;
        config.max_capacity = max;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", "update_config"))
}

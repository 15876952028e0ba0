//! Integration tests for the promo lottery contracts.
//!
//! These tests exercise the contract entry points directly using
//! `cosmwasm_std::testing` mocks. The engine's tier lookups are answered by
//! a real tier-registry instance wired in through `MockQuerier::update_wasm`,
//! so the wire format between the two contracts is covered too.
//!
//! Run:
//! ```bash
//! cargo test -p promo-integration-tests
//! ```

use std::collections::BTreeMap;

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    from_json, ContractResult, Env, MemoryStorage, OwnedDeps, SystemError, SystemResult,
    WasmQuery,
};
use promo_common::announce::{
    announce, lottery_started_text, no_participants_text, result_text_for, Announcer,
    WinnerLabel,
};
use promo_common::command::parse_start_lottery;
use promo_common::types::{
    AnnouncementVariant, CloseTrigger, LotteryStatus, ParticipationResult, TierRestriction,
    UserTier,
};

use promo_lottery_engine::msg::{
    CloseOutcome, LotteryHistoryResponse, ParticipationResponse, UserWinsResponse,
};
use promo_lottery_engine::state::{Lottery, ScheduledDeadline};
use promo_tier_registry::msg::KnownUsersResponse;

type MockDeps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Helpers ───

fn env_after(seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.time = env.block.time.plus_seconds(seconds);
    env.block.height += seconds;
    env
}

/// Announcer that records every message and refuses delivery to `blocked` users.
#[derive(Default)]
struct RecordingAnnouncer {
    sent: BTreeMap<u64, Vec<String>>,
    blocked: Vec<u64>,
}

impl Announcer for RecordingAnnouncer {
    type Error = String;

    fn notify(&mut self, user_id: u64, text: &str) -> Result<(), Self::Error> {
        if self.blocked.contains(&user_id) {
            return Err(format!("bot was blocked by user {user_id}"));
        }
        self.sent.entry(user_id).or_default().push(text.to_string());
        Ok(())
    }
}

fn display_name(user_id: u64) -> WinnerLabel {
    WinnerLabel {
        user_id,
        full_name: format!("User {user_id}"),
        username: (user_id % 2 == 0).then(|| format!("user{user_id}")),
    }
}

// ─── Tier registry helpers ───

fn setup_registry(users: &[(u64, Option<UserTier>)]) -> MockDeps {
    let mut deps = mock_dependencies();
    let admin = deps.api.addr_make("admin");
    let operator = deps.api.addr_make("operator");
    promo_tier_registry::contract::instantiate(
        deps.as_mut(),
        mock_env(),
        message_info(&admin, &[]),
        promo_tier_registry::msg::InstantiateMsg {
            operators: vec![operator.to_string()],
        },
    )
    .unwrap();

    for (user_id, tier) in users {
        let msg = match tier {
            Some(tier) => promo_tier_registry::msg::ExecuteMsg::SetTier {
                user_id: *user_id,
                tier: tier.clone(),
            },
            None => promo_tier_registry::msg::ExecuteMsg::RegisterUser { user_id: *user_id },
        };
        promo_tier_registry::contract::execute(
            deps.as_mut(),
            mock_env(),
            message_info(&operator, &[]),
            msg,
        )
        .unwrap();
    }
    deps
}

fn roster(registry: &MockDeps) -> Vec<u64> {
    let res = promo_tier_registry::contract::query(
        registry.as_ref(),
        mock_env(),
        promo_tier_registry::msg::QueryMsg::KnownUsers {
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let page: KnownUsersResponse = from_json(res).unwrap();
    page.user_ids
}

// ─── Lottery engine helpers ───

/// Instantiate the engine and answer its smart queries from `registry`.
fn setup_engine(registry: MockDeps) -> MockDeps {
    let mut deps = mock_dependencies();
    let admin = deps.api.addr_make("admin");
    let operator = deps.api.addr_make("operator");
    let registry_addr = deps.api.addr_make("tier_registry");

    promo_lottery_engine::contract::instantiate(
        deps.as_mut(),
        mock_env(),
        message_info(&admin, &[]),
        promo_lottery_engine::msg::InstantiateMsg {
            operators: vec![operator.to_string()],
            tier_registry: registry_addr.to_string(),
            max_capacity: None,
        },
    )
    .unwrap();

    let expected_addr = registry_addr.to_string();
    deps.querier.update_wasm(move |query| match query {
        WasmQuery::Smart { contract_addr, msg } if *contract_addr == expected_addr => {
            let parsed: Result<promo_tier_registry::msg::QueryMsg, _> = from_json(msg);
            match parsed {
                Ok(registry_query) => {
                    match promo_tier_registry::contract::query(
                        registry.as_ref(),
                        mock_env(),
                        registry_query,
                    ) {
                        Ok(bin) => SystemResult::Ok(ContractResult::Ok(bin)),
                        Err(err) => SystemResult::Ok(ContractResult::Err(err.to_string())),
                    }
                }
                Err(_) => SystemResult::Err(SystemError::InvalidRequest {
                    error: "Unknown query".to_string(),
                    request: Default::default(),
                }),
            }
        }
        _ => SystemResult::Err(SystemError::InvalidRequest {
            error: "Only smart queries to the tier registry supported".to_string(),
            request: Default::default(),
        }),
    });

    deps
}

fn start_lottery(deps: &mut MockDeps, args: &[&str]) -> Lottery {
    let command = parse_start_lottery(args).unwrap();
    let admin = deps.api.addr_make("admin");
    let res = promo_lottery_engine::contract::execute(
        deps.as_mut(),
        mock_env(),
        message_info(&admin, &[]),
        promo_lottery_engine::msg::ExecuteMsg::CreateLottery {
            prize: command.prize,
            capacity: command.capacity,
            winner_count: command.winner_count,
            tier_restriction: command.tier_restriction,
            duration: command.duration,
        },
    )
    .unwrap();
    from_json(res.data.unwrap()).unwrap()
}

fn join(deps: &mut MockDeps, env: Env, user_id: u64) -> ParticipationResponse {
    let operator = deps.api.addr_make("operator");
    let res = promo_lottery_engine::contract::execute(
        deps.as_mut(),
        env,
        message_info(&operator, &[]),
        promo_lottery_engine::msg::ExecuteMsg::Participate {
            user_id,
            lottery_id: None,
        },
    )
    .unwrap();
    from_json(res.data.unwrap()).unwrap()
}

fn fire_due_deadlines(deps: &mut MockDeps, env: Env) -> Vec<CloseOutcome> {
    let res = promo_lottery_engine::contract::query(
        deps.as_ref(),
        env.clone(),
        promo_lottery_engine::msg::QueryMsg::DueDeadlines { limit: None },
    )
    .unwrap();
    let due: Vec<ScheduledDeadline> = from_json(res).unwrap();

    let keeper = deps.api.addr_make("keeper");
    due.into_iter()
        .map(|entry| {
            let res = promo_lottery_engine::contract::execute(
                deps.as_mut(),
                env.clone(),
                message_info(&keeper, &[]),
                promo_lottery_engine::msg::ExecuteMsg::FireDeadline {
                    handle: entry.handle,
                },
            )
            .unwrap();
            from_json(res.data.unwrap()).unwrap()
        })
        .collect()
}

// ─── Tests ───

#[test]
fn test_vip_lottery_checks_registry_tiers() {
    let registry = setup_registry(&[
        (1, Some(UserTier::Vip)),
        (2, Some(UserTier::Vip)),
        (3, Some(UserTier::Regular)),
        (4, None),
    ]);
    let mut engine = setup_engine(registry);

    let lottery = start_lottery(&mut engine, &["Headphones", "2", "1", "VIP"]);
    assert_eq!(
        lottery.tier_restriction,
        TierRestriction::Restricted {
            tier: UserTier::Vip
        }
    );

    // Explicit Regular, registered without a tier, and never seen
    for user_id in [3, 4, 99] {
        let res = join(&mut engine, mock_env(), user_id);
        assert_eq!(res.result, ParticipationResult::TierNotEligible, "user {user_id}");
    }

    assert_eq!(
        join(&mut engine, mock_env(), 1).result,
        ParticipationResult::Admitted
    );
    let filled = join(&mut engine, mock_env(), 2);
    assert_eq!(filled.result, ParticipationResult::Admitted);

    let closed = filled.closed.unwrap();
    assert_eq!(closed.participants, vec![1, 2]);
    assert_eq!(closed.result.winners.len(), 1);
    assert!([1, 2].contains(&closed.result.winners[0]));
    assert_eq!(closed.result.trigger, CloseTrigger::Capacity);
}

#[test]
fn test_full_lifecycle_with_announcements() {
    let registry = setup_registry(&[
        (1, None),
        (2, None),
        (3, Some(UserTier::Vip)),
        (4, None),
        (5, None),
        (6, None),
    ]);
    let users = roster(&registry);
    assert_eq!(users, vec![1, 2, 3, 4, 5, 6]);
    let mut engine = setup_engine(registry);

    let lottery = start_lottery(&mut engine, &["iPhone", "3", "2", "普通", "5m"]);
    assert_eq!(lottery.tier_restriction, TierRestriction::Any);
    assert_eq!(lottery.deadline, Some(mock_env().block.time.plus_seconds(300)));

    // Start announcement goes to the whole roster; one user has blocked the bot
    let mut announcer = RecordingAnnouncer {
        blocked: vec![4],
        ..Default::default()
    };
    let started = lottery_started_text(
        &lottery.prize,
        lottery.capacity,
        lottery.winner_count,
        &lottery.tier_restriction,
    );
    let report = announce(&mut announcer, users.clone(), |_| started.clone());
    assert_eq!(report.delivered, 5);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].user_id, 4);
    assert!(announcer.sent[&1][0].contains("Prize: iPhone"));

    assert_eq!(
        join(&mut engine, env_after(10), 2).result,
        ParticipationResult::Admitted
    );
    assert_eq!(
        join(&mut engine, env_after(20), 2).result,
        ParticipationResult::AlreadyParticipated
    );
    assert_eq!(
        join(&mut engine, env_after(30), 5).result,
        ParticipationResult::Admitted
    );
    let filled = join(&mut engine, env_after(40), 6);
    let closed = filled.closed.unwrap();
    assert_eq!(closed.participants, vec![2, 5, 6]);
    assert_eq!(closed.result.announcement, AnnouncementVariant::Winners);
    assert!(closed.cancelled_deadline.is_some());

    // Result announcement: winners are congratulated, the rest consoled
    let labels: Vec<WinnerLabel> = closed
        .result
        .winners
        .iter()
        .map(|w| display_name(*w))
        .collect();
    let report = announce(&mut announcer, users.clone(), |recipient| {
        result_text_for(
            &closed.lottery.prize,
            closed.result.participant_count,
            &labels,
            recipient,
        )
    });
    assert_eq!(report.delivered, 5);

    for user_id in users.iter().filter(|u| **u != 4) {
        let text = announcer.sent[user_id].last().unwrap();
        assert!(text.contains("Lottery finished"));
        let consoled = text.contains("better luck next time");
        assert_eq!(consoled, !closed.result.winners.contains(user_id));
    }

    // The deadline was cancelled by the capacity close; nothing is due later
    assert!(fire_due_deadlines(&mut engine, env_after(600)).is_empty());
    let res = promo_lottery_engine::contract::query(
        engine.as_ref(),
        mock_env(),
        promo_lottery_engine::msg::QueryMsg::Lottery { lottery_id: 0 },
    )
    .unwrap();
    let stored: Lottery = from_json(res).unwrap();
    assert_eq!(stored.status, LotteryStatus::Closed);
    assert_eq!(stored.close_trigger, Some(CloseTrigger::Capacity));
}

#[test]
fn test_deadline_without_participants_announces_no_result() {
    let registry = setup_registry(&[(1, None), (2, None)]);
    let users = roster(&registry);
    let mut engine = setup_engine(registry);

    start_lottery(&mut engine, &["Mug", "5", "1", "Regular", "10s"]);
    assert!(fire_due_deadlines(&mut engine, env_after(9)).is_empty());

    let outcomes = fire_due_deadlines(&mut engine, env_after(10));
    assert_eq!(outcomes.len(), 1);
    let closed = outcomes[0].clone().into_closed().unwrap();
    assert!(closed.result.winners.is_empty());
    assert_eq!(closed.result.announcement, AnnouncementVariant::NoParticipants);
    assert_eq!(closed.result.trigger, CloseTrigger::Deadline);

    let mut announcer = RecordingAnnouncer::default();
    let report = announce(&mut announcer, users, |recipient| {
        result_text_for(&closed.lottery.prize, 0, &[], recipient)
    });
    assert!(report.is_complete());
    assert_eq!(announcer.sent[&1], vec![no_participants_text("Mug")]);

    // A late join after the callback fired is rejected, not admitted
    assert_eq!(
        join(&mut engine, env_after(11), 1).result,
        ParticipationResult::LotteryNotFound
    );
}

#[test]
fn test_sequential_lotteries_track_history_and_wins() {
    let registry = setup_registry(&[(1, None), (2, None)]);
    let mut engine = setup_engine(registry);

    // Everyone wins the first lottery
    start_lottery(&mut engine, &["Sticker", "2", "2", "Regular"]);
    join(&mut engine, mock_env(), 1);
    let first = join(&mut engine, mock_env(), 2).closed.unwrap();
    let mut winners = first.result.winners.clone();
    winners.sort_unstable();
    assert_eq!(winners, vec![1, 2]);

    // Second lottery closes by its deadline with a single participant
    start_lottery(&mut engine, &["Hoodie", "10", "3", "Regular", "1h"]);
    join(&mut engine, env_after(60), 1);
    let late = join(&mut engine, env_after(3_600), 2);
    assert_eq!(late.result, ParticipationResult::LotteryClosed);
    assert_eq!(late.closed.unwrap().result.winners, vec![1]);

    let res = promo_lottery_engine::contract::query(
        engine.as_ref(),
        mock_env(),
        promo_lottery_engine::msg::QueryMsg::LotteryHistory {
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let history: LotteryHistoryResponse = from_json(res).unwrap();
    assert_eq!(history.lotteries.len(), 2);
    assert!(history
        .lotteries
        .iter()
        .all(|l| l.status == LotteryStatus::Closed));

    let res = promo_lottery_engine::contract::query(
        engine.as_ref(),
        mock_env(),
        promo_lottery_engine::msg::QueryMsg::UserWins {
            user_id: 1,
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let wins: UserWinsResponse = from_json(res).unwrap();
    assert_eq!(wins.lottery_ids, vec![0, 1]);

    // Stale deadline entry was cleared by the close
    assert!(fire_due_deadlines(&mut engine, env_after(7_200)).is_empty());
}

//! One-shot deadline callbacks.
//!
//! A contract cannot wake itself up, so a deadline is stored as a pending
//! entry that an off-chain keeper fires through `ExecuteMsg::FireDeadline`
//! once `fire_at` has passed. Entries carry only the lottery id; the engine
//! re-reads the lottery when the callback fires.

use cosmwasm_std::{Order, StdResult, Storage, Timestamp};

use crate::state::{EngineState, ScheduledDeadline, SCHEDULED_DEADLINES};

/// Register a callback for `lottery_id` at `fire_at` and return its entry.
/// The handle is taken from `state`, which the caller persists.
pub fn schedule_once(
    storage: &mut dyn Storage,
    state: &mut EngineState,
    lottery_id: u64,
    fire_at: Timestamp,
) -> StdResult<ScheduledDeadline> {
    let entry = ScheduledDeadline {
        handle: state.next_deadline_handle,
        lottery_id,
        fire_at,
    };
    state.next_deadline_handle += 1;
    SCHEDULED_DEADLINES.save(storage, entry.handle, &entry)?;
    Ok(entry)
}

/// Drop a pending callback. Returns false if it already fired or was cancelled.
pub fn cancel(storage: &mut dyn Storage, handle: u64) -> bool {
    if !SCHEDULED_DEADLINES.has(storage, handle) {
        return false;
    }
    SCHEDULED_DEADLINES.remove(storage, handle);
    true
}

pub fn pending(storage: &dyn Storage, handle: u64) -> StdResult<Option<ScheduledDeadline>> {
    SCHEDULED_DEADLINES.may_load(storage, handle)
}

/// Pending callbacks with `fire_at <= now`, oldest handle first.
pub fn due(storage: &dyn Storage, now: Timestamp, limit: usize) -> StdResult<Vec<ScheduledDeadline>> {
    let mut entries = Vec::new();
    for item in SCHEDULED_DEADLINES.range(storage, None, None, Order::Ascending) {
        if entries.len() >= limit {
            break;
        }
        let (_, entry) = item?;
        if entry.fire_at <= now {
            entries.push(entry);
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;

    fn empty_state() -> EngineState {
        EngineState {
            next_lottery_id: 0,
            active_lottery: None,
            next_deadline_handle: 0,
            total_lotteries_closed: 0,
        }
    }

    #[test]
    fn test_schedule_assigns_increasing_handles() {
        let mut storage = MockStorage::new();
        let mut state = empty_state();

        let a = schedule_once(&mut storage, &mut state, 1, Timestamp::from_seconds(100)).unwrap();
        let b = schedule_once(&mut storage, &mut state, 2, Timestamp::from_seconds(50)).unwrap();
        assert_eq!(a.handle, 0);
        assert_eq!(b.handle, 1);
        assert_eq!(state.next_deadline_handle, 2);
        assert_eq!(pending(&storage, 1).unwrap(), Some(b));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut storage = MockStorage::new();
        let mut state = empty_state();

        let entry = schedule_once(&mut storage, &mut state, 1, Timestamp::from_seconds(100)).unwrap();
        assert!(cancel(&mut storage, entry.handle));
        assert!(!cancel(&mut storage, entry.handle));
        assert_eq!(pending(&storage, entry.handle).unwrap(), None);
    }

    #[test]
    fn test_due_filters_by_time() {
        let mut storage = MockStorage::new();
        let mut state = empty_state();

        schedule_once(&mut storage, &mut state, 1, Timestamp::from_seconds(100)).unwrap();
        schedule_once(&mut storage, &mut state, 2, Timestamp::from_seconds(200)).unwrap();
        schedule_once(&mut storage, &mut state, 3, Timestamp::from_seconds(150)).unwrap();

        assert!(due(&storage, Timestamp::from_seconds(99), 10).unwrap().is_empty());

        let ready = due(&storage, Timestamp::from_seconds(150), 10).unwrap();
        let lotteries: Vec<u64> = ready.iter().map(|e| e.lottery_id).collect();
        assert_eq!(lotteries, vec![1, 3]);

        let capped = due(&storage, Timestamp::from_seconds(500), 2).unwrap();
        assert_eq!(capped.len(), 2);
    }
}

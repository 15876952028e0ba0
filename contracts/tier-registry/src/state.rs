use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp};
use cw_storage_plus::{Item, Map};
use promo_common::types::UserTier;

pub const CONFIG: Item<RegistryConfig> = Item::new("config");
/// Keyed by chat user id. Every user the bot has seen is present.
pub const USERS: Map<u64, UserRecord> = Map::new("users");
pub const USER_COUNT: Item<u64> = Item::new("user_count");

#[cw_serde]
pub struct RegistryConfig {
    pub admin: Addr,
    /// Bot relayers allowed to register users and change tiers
    pub operators: Vec<Addr>,
}

#[cw_serde]
pub struct UserRecord {
    pub tier: UserTier,
    pub registered_at: Timestamp,
    pub updated_at: Timestamp,
}

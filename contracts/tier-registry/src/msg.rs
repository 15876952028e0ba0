use cosmwasm_schema::{cw_serde, QueryResponses};
use promo_common::types::{TierResponse, UserTier};

use crate::state::{RegistryConfig, UserRecord};

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Record a chat user the bot has seen. Idempotent; new users start as Regular.
    RegisterUser { user_id: u64 },
    /// Set a user's tier, registering them if needed (operator or admin).
    SetTier { user_id: u64, tier: UserTier },
    /// Update operator list (admin only).
    UpdateOperators {
        add: Vec<String>,
        remove: Vec<String>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(RegistryConfig)]
    Config {},

    #[returns(TierResponse)]
    Tier { user_id: u64 },

    #[returns(Option<UserRecord>)]
    User { user_id: u64 },

    /// The roster of known users, for announcement fan-out.
    #[returns(KnownUsersResponse)]
    KnownUsers {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(u64)]
    UserCount {},
}

#[cw_serde]
pub struct KnownUsersResponse {
    pub user_ids: Vec<u64>,
}

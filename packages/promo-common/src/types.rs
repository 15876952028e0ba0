use std::fmt;

use cosmwasm_schema::cw_serde;

/// Membership tier of a chat user, as recorded by the tier registry.
#[cw_serde]
pub enum UserTier {
    Vip,
    Regular,
}

impl fmt::Display for UserTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserTier::Vip => write!(f, "VIP"),
            UserTier::Regular => write!(f, "Regular"),
        }
    }
}

/// Which users may join a lottery.
#[cw_serde]
pub enum TierRestriction {
    /// Every user may join, registered or not.
    Any,
    /// Only users whose registry tier equals `tier` may join.
    Restricted { tier: UserTier },
}

impl TierRestriction {
    /// `tier` is `None` when the registry has never seen the user.
    pub fn admits(&self, tier: Option<&UserTier>) -> bool {
        match self {
            TierRestriction::Any => true,
            TierRestriction::Restricted { tier: required } => tier == Some(required),
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, TierRestriction::Restricted { .. })
    }
}

/// The lifecycle status of a lottery. `Closed` is terminal.
#[cw_serde]
pub enum LotteryStatus {
    Open,
    Closed,
}

/// What caused a lottery to close.
#[cw_serde]
pub enum CloseTrigger {
    Capacity,
    Deadline,
    Admin,
}

impl CloseTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseTrigger::Capacity => "capacity",
            CloseTrigger::Deadline => "deadline",
            CloseTrigger::Admin => "admin",
        }
    }
}

/// Outcome of a single participation request.
#[cw_serde]
pub enum ParticipationResult {
    Admitted,
    AlreadyParticipated,
    LotteryNotFound,
    LotteryClosed,
    TierNotEligible,
}

impl ParticipationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationResult::Admitted => "admitted",
            ParticipationResult::AlreadyParticipated => "already_participated",
            ParticipationResult::LotteryNotFound => "lottery_not_found",
            ParticipationResult::LotteryClosed => "lottery_closed",
            ParticipationResult::TierNotEligible => "tier_not_eligible",
        }
    }
}

/// Which result announcement a closed lottery calls for.
#[cw_serde]
pub enum AnnouncementVariant {
    Winners,
    NoParticipants,
}

impl AnnouncementVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementVariant::Winners => "winners",
            AnnouncementVariant::NoParticipants => "no_participants",
        }
    }
}

/// Response of the tier registry's `Tier { user_id }` query.
/// `tier` is `None` for users the registry does not know.
#[cw_serde]
pub struct TierResponse {
    pub user_id: u64,
    pub tier: Option<UserTier>,
}

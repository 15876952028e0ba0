pub mod announce;
pub mod command;
pub mod sampling;
pub mod types;

pub use announce::{announce, Announcer, DeliveryFailure, DeliveryReport, WinnerLabel};
pub use command::{parse_duration, parse_start_lottery, CommandError, StartLotteryCommand};
pub use sampling::{derive_seed, sample_without_replacement, DrawRng};
pub use types::{
    AnnouncementVariant, CloseTrigger, LotteryStatus, ParticipationResult, TierResponse,
    TierRestriction, UserTier,
};

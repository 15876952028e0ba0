use thiserror::Error;

use crate::types::{TierRestriction, UserTier};

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

pub const START_LOTTERY_USAGE: &str =
    "/startlottery <prize> <capacity> <winners> <VIP|Regular> [duration, e.g. 10s, 5m, 2h, 1d]";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("missing arguments, usage: {usage}")]
    MissingArguments { usage: String },

    #[error("invalid number for {field}: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("invalid lottery type {value}: expected VIP or Regular")]
    InvalidTier { value: String },

    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: String },
}

/// A parsed `/startlottery` admin command.
#[derive(Debug, Clone, PartialEq)]
pub struct StartLotteryCommand {
    pub prize: String,
    pub capacity: u32,
    pub winner_count: u32,
    pub tier_restriction: TierRestriction,
    /// Validated duration text (`10s`, `5m`, ...), passed through unchanged.
    pub duration: Option<String>,
}

impl StartLotteryCommand {
    pub fn duration_seconds(&self) -> Result<Option<u64>, CommandError> {
        self.duration.as_deref().map(parse_duration).transpose()
    }
}

/// Parse a countdown such as `10s`, `5m`, `2h` or `1d` into seconds.
///
/// The amount must be a positive integer and the suffix one of `s`, `m`,
/// `h`, `d`.
pub fn parse_duration(input: &str) -> Result<u64, CommandError> {
    let invalid = |reason: &str| CommandError::InvalidDuration {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    let unit = chars.next_back().ok_or_else(|| invalid("empty duration"))?;
    let multiplier = match unit {
        's' => 1,
        'm' => SECONDS_PER_MINUTE,
        'h' => SECONDS_PER_HOUR,
        'd' => SECONDS_PER_DAY,
        _ => return Err(invalid("unit must be one of s, m, h, d")),
    };

    let amount_str = chars.as_str();
    if amount_str.is_empty() || !amount_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("amount must be a positive integer"));
    }
    let amount: u64 = amount_str
        .parse()
        .map_err(|_| invalid("amount is too large"))?;
    if amount == 0 {
        return Err(invalid("amount must be a positive integer"));
    }

    amount
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("amount is too large"))
}

/// Parse the arguments of `/startlottery` (everything after the command).
///
/// Only the shape of the arguments is checked here. Capacity and winner
/// bounds are enforced by the engine.
pub fn parse_start_lottery(args: &[&str]) -> Result<StartLotteryCommand, CommandError> {
    if args.len() < 4 {
        return Err(CommandError::MissingArguments {
            usage: START_LOTTERY_USAGE.to_string(),
        });
    }

    let prize = args[0].to_string();
    let capacity = parse_count("capacity", args[1])?;
    let winner_count = parse_count("winners", args[2])?;
    let tier_restriction = parse_lottery_type(args[3])?;

    let duration = match args.get(4) {
        Some(raw) => {
            parse_duration(raw)?;
            Some(raw.trim().to_string())
        }
        None => None,
    };

    Ok(StartLotteryCommand {
        prize,
        capacity,
        winner_count,
        tier_restriction,
        duration,
    })
}

fn parse_count(field: &str, value: &str) -> Result<u32, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// `VIP` lotteries are restricted to VIP users, `Regular` (or `普通`) ones are open to all.
fn parse_lottery_type(value: &str) -> Result<TierRestriction, CommandError> {
    match value {
        "VIP" | "vip" | "Vip" => Ok(TierRestriction::Restricted {
            tier: UserTier::Vip,
        }),
        "Regular" | "regular" | "普通" => Ok(TierRestriction::Any),
        _ => Err(CommandError::InvalidTier {
            value: value.to_string(),
        }),
    }
}

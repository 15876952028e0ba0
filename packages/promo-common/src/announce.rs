use std::fmt;

use crate::types::{ParticipationResult, TierRestriction};

/// Delivers a text message to a single chat user.
///
/// Delivery is best-effort: a failure for one recipient never aborts a batch.
pub trait Announcer {
    type Error: fmt::Display;

    fn notify(&mut self, user_id: u64, text: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub user_id: u64,
    pub reason: String,
}

/// Outcome of a fan-out. Failures are recorded per recipient and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: u32,
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Send `compose(user_id)` to every recipient.
pub fn announce<A, I, F>(announcer: &mut A, recipients: I, mut compose: F) -> DeliveryReport
where
    A: Announcer,
    I: IntoIterator<Item = u64>,
    F: FnMut(u64) -> String,
{
    let mut report = DeliveryReport::default();
    for user_id in recipients {
        let text = compose(user_id);
        match announcer.notify(user_id, &text) {
            Ok(()) => report.delivered += 1,
            Err(err) => report.failed.push(DeliveryFailure {
                user_id,
                reason: err.to_string(),
            }),
        }
    }
    report
}

/// How a winner is shown in the result announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerLabel {
    pub user_id: u64,
    pub full_name: String,
    pub username: Option<String>,
}

impl fmt::Display for WinnerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(username) => write!(f, "{} (http://t.me/{})", self.full_name, username),
            None => write!(f, "{} (User ID: {})", self.full_name, self.user_id),
        }
    }
}

pub fn lottery_started_text(
    prize: &str,
    capacity: u32,
    winner_count: u32,
    restriction: &TierRestriction,
) -> String {
    let eligibility = match restriction {
        TierRestriction::Any => {
            "This lottery is open to all users.\nTap [Lottery] to join.".to_string()
        }
        TierRestriction::Restricted { tier } => format!(
            "This is a {tier} lottery, only {tier} users may join.\n{tier} users, tap [Lottery] to join."
        ),
    };

    format!(
        "🎁 Lottery started\n🎁 Prize: {prize}\n\n💵 Participants: {capacity}\n💵 Winners: {winner_count}\n\n{eligibility}\n"
    )
}

/// Result announcement for a lottery that drew at least one winner.
/// Non-winners additionally get a consolation line.
pub fn lottery_result_text(
    prize: &str,
    participant_count: u32,
    winners: &[WinnerLabel],
    is_winner: bool,
) -> String {
    let winner_lines: Vec<String> = winners.iter().map(|w| w.to_string()).collect();
    let mut text = format!(
        "🎁 Lottery finished\n🎁 Prize: {prize}\n\n💵 Participants: {participant_count}\n💵 Winners: {}\n\n🎉 Winner list:\n{}\n\n🎉 Congratulations to the winners above, prizes are sent out within 24 hours\n",
        winners.len(),
        winner_lines.join("\n"),
    );
    if !is_winner {
        text.push_str("🎉 You did not win this time, better luck next time\n");
    }
    text
}

pub fn no_participants_text(prize: &str) -> String {
    format!("🎁 The lottery for {prize} has finished, but nobody took part.")
}

/// Pick the result text for one recipient of a closed lottery.
pub fn result_text_for(
    prize: &str,
    participant_count: u32,
    winners: &[WinnerLabel],
    recipient: u64,
) -> String {
    if winners.is_empty() {
        return no_participants_text(prize);
    }
    let is_winner = winners.iter().any(|w| w.user_id == recipient);
    lottery_result_text(prize, participant_count, winners, is_winner)
}

pub fn participation_reply_text(result: &ParticipationResult) -> &'static str {
    match result {
        ParticipationResult::Admitted => "You have joined the lottery!",
        ParticipationResult::AlreadyParticipated => "You have already joined this lottery.",
        ParticipationResult::LotteryNotFound => "There is no active lottery right now.",
        ParticipationResult::LotteryClosed => "Sorry, this lottery has already finished.",
        ParticipationResult::TierNotEligible => "This lottery is not open to your membership tier.",
    }
}

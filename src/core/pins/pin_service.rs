// Pin promotion - community-pinned messages are republished to a public
// channel once enough members react with the pin marker.
//
// The bot adds its own pin marker after promoting, and that marker is the
// durable "already sent" flag: a message that carries it is never promoted
// again, however many pins arrive later.

use crate::core::claims::{Claim, ClaimSet};
use std::future::Future;

pub const PIN_MARKER: &str = "📌";

/// A reaction event, reduced to what decides whether pins are counted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinReaction<'a> {
    /// Unicode marker, `None` for custom emoji.
    pub marker: Option<&'a str>,
    pub in_guild: bool,
    pub by_bot: bool,
}

impl PinReaction<'_> {
    /// Our own marker is the promotion flag, never a vote.
    pub fn triggers(&self) -> bool {
        self.marker == Some(PIN_MARKER) && self.in_guild && !self.by_bot
    }
}

/// Pin reaction state on a message, as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinTally {
    /// Raw reaction count, the bot's own reaction included.
    pub count: u64,
    /// Whether the bot itself has reacted with the marker.
    pub me: bool,
}

impl PinTally {
    /// Pins from members only.
    pub fn member_pins(&self) -> u64 {
        if self.me {
            self.count.saturating_sub(1)
        } else {
            self.count
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDecision {
    /// Bot marker already present: promoted earlier.
    AlreadyPromoted,
    BelowQuorum { pins: u64, minimum: u64 },
    Promote,
}

/// Outcome of [`PinService::begin`].
pub enum PinStep<'a, M> {
    /// Another handler holds this message.
    InFlight,
    /// The message no longer exists.
    Gone,
    Skip(PinDecision),
    /// Promote `message`. Keep `claim` alive until the bot marker is added.
    Promote {
        claim: Claim<'a>,
        message: M,
        tally: PinTally,
    },
}

#[derive(Default)]
pub struct PinService {
    promoting: ClaimSet,
}

impl PinService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&self, tally: PinTally, minimum: u64) -> PinDecision {
        if tally.me {
            return PinDecision::AlreadyPromoted;
        }

        let pins = tally.member_pins();
        if pins < minimum {
            PinDecision::BelowQuorum { pins, minimum }
        } else {
            PinDecision::Promote
        }
    }

    /// Claim `message_id`, then read its pins through `fetch`.
    ///
    /// The read happens under the claim, so a promotion finished by an earlier
    /// handler is always seen through its bot marker. `fetch` yields `None`
    /// when the message is gone.
    pub async fn begin<M, E, F, Fut>(
        &self,
        message_id: u64,
        minimum: u64,
        fetch: F,
    ) -> Result<PinStep<'_, M>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<(M, PinTally)>, E>>,
    {
        let claim = match self.promoting.claim(message_id) {
            Some(claim) => claim,
            None => return Ok(PinStep::InFlight),
        };

        let (message, tally) = match fetch().await? {
            Some(found) => found,
            None => return Ok(PinStep::Gone),
        };

        match self.evaluate(tally, minimum) {
            PinDecision::Promote => Ok(PinStep::Promote {
                claim,
                message,
                tally,
            }),
            decision => Ok(PinStep::Skip(decision)),
        }
    }
}

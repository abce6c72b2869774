// Suggestion domain models.
//
// A suggestion lives as a Discord message until an administrator renders a
// verdict; only accepted ones are persisted. Nothing here knows about Discord.

use chrono::{DateTime, Utc};

pub const ACCEPT_MARKER: &str = "✅";
pub const DECLINE_MARKER: &str = "❌";

/// Discord rejects thread names longer than this.
const MAX_THREAD_NAME_CHARS: usize = 100;

const PROCESSING_NOTE: &str =
    "_**Note**: Il faut parfois attendre plusieurs jours avant qu'elle soit effective_";

/// An administrator's decision, read from the marker they reacted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Declined,
}

impl Verdict {
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            ACCEPT_MARKER => Some(Verdict::Accepted),
            DECLINE_MARKER => Some(Verdict::Declined),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::Declined => write!(f, "declined"),
        }
    }
}

/// A reaction event, reduced to what decides whether it is a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictReaction<'a> {
    /// Unicode marker, `None` for custom emoji.
    pub marker: Option<&'a str>,
    pub in_suggestion_channel: bool,
    pub by_bot: bool,
    pub by_administrator: bool,
}

impl VerdictReaction<'_> {
    /// Only a human administrator's marker in the suggestion channel counts.
    /// Everyone else's markers are plain votes.
    pub fn verdict(&self) -> Option<Verdict> {
        let verdict = self.marker.and_then(Verdict::from_marker)?;
        if !self.in_suggestion_channel || self.by_bot || !self.by_administrator {
            return None;
        }
        Some(verdict)
    }
}

/// Member votes on a suggestion, without the bot's own acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteTally {
    pub accept: u64,
    pub decline: u64,
}

impl VoteTally {
    /// Build from raw reaction counts. A missing reaction counts as zero, and
    /// counts are floored at zero in case the bot's reaction was stripped.
    pub fn from_raw(raw_accept: Option<u64>, raw_decline: Option<u64>) -> Self {
        Self {
            accept: raw_accept.unwrap_or(0).saturating_sub(1),
            decline: raw_decline.unwrap_or(0).saturating_sub(1),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} vote(s), {}: {} vote(s)",
            ACCEPT_MARKER, self.accept, DECLINE_MARKER, self.decline
        )
    }
}

/// The live message a verdict is being rendered on.
#[derive(Debug, Clone)]
pub struct PendingSuggestion {
    pub message_id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub content: String,
}

/// Persisted form of an accepted suggestion. Append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRecord {
    pub author_id: u64,
    pub date: DateTime<Utc>,
    pub description: String,
}

/// Outcome handed back to the Discord layer for broadcasting.
#[derive(Debug, Clone)]
pub struct ClosedSuggestion {
    pub verdict: Verdict,
    pub votes: VoteTally,
    pub author_name: String,
    /// Quoted body, ready to be used as an embed description.
    pub transcript: String,
    /// Set when the suggestion was accepted and stored.
    pub record: Option<SuggestionRecord>,
}

/// Name of the discussion thread opened under a new suggestion.
pub fn thread_name(author_name: &str) -> String {
    format!("Suggestion de {}", author_name)
        .chars()
        .take(MAX_THREAD_NAME_CHARS)
        .collect()
}

/// Quote every line of `content` and append the vote summary.
pub fn build_transcript(content: &str, votes: &VoteTally, verdict: Verdict) -> String {
    let mut citation = content.split('\n').collect::<Vec<_>>().join("\n> ");
    citation.push_str("\n\n");
    citation.push_str(&votes.summary());

    if verdict.is_accepted() {
        citation.push('\n');
        citation.push_str(PROCESSING_NOTE);
    }

    format!("> {}", citation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_map_to_verdicts() {
        assert_eq!(Verdict::from_marker("✅"), Some(Verdict::Accepted));
        assert_eq!(Verdict::from_marker("❌"), Some(Verdict::Declined));
        assert_eq!(Verdict::from_marker("📌"), None);
        assert_eq!(Verdict::from_marker("👍"), None);
    }

    fn admin_reaction(marker: &str) -> VerdictReaction<'_> {
        VerdictReaction {
            marker: Some(marker),
            in_suggestion_channel: true,
            by_bot: false,
            by_administrator: true,
        }
    }

    #[test]
    fn administrator_marker_is_a_verdict() {
        assert_eq!(admin_reaction("✅").verdict(), Some(Verdict::Accepted));
        assert_eq!(admin_reaction("❌").verdict(), Some(Verdict::Declined));
    }

    #[test]
    fn member_marker_is_only_a_vote() {
        let reaction = VerdictReaction {
            by_administrator: false,
            ..admin_reaction("✅")
        };
        assert_eq!(reaction.verdict(), None);
    }

    #[test]
    fn bot_acknowledgment_is_not_a_verdict() {
        // The bot may hold Administrator itself
        let reaction = VerdictReaction {
            by_bot: true,
            ..admin_reaction("✅")
        };
        assert_eq!(reaction.verdict(), None);
    }

    #[test]
    fn markers_outside_the_suggestion_channel_are_ignored() {
        let reaction = VerdictReaction {
            in_suggestion_channel: false,
            ..admin_reaction("❌")
        };
        assert_eq!(reaction.verdict(), None);
    }

    #[test]
    fn other_emoji_are_ignored() {
        assert_eq!(admin_reaction("📌").verdict(), None);
        let custom = VerdictReaction {
            marker: None,
            ..admin_reaction("✅")
        };
        assert_eq!(custom.verdict(), None);
    }

    #[test]
    fn tally_excludes_bot_reaction() {
        let votes = VoteTally::from_raw(Some(4), Some(1));
        assert_eq!(votes, VoteTally { accept: 3, decline: 0 });
        assert_eq!(votes.summary(), "✅: 3 vote(s), ❌: 0 vote(s)");
    }

    #[test]
    fn tally_is_floored_at_zero() {
        assert_eq!(
            VoteTally::from_raw(Some(0), None),
            VoteTally { accept: 0, decline: 0 }
        );
    }

    #[test]
    fn thread_is_named_after_author() {
        assert_eq!(thread_name("U"), "Suggestion de U");
        assert_eq!(thread_name(&"x".repeat(200)).chars().count(), 100);
    }

    #[test]
    fn declined_transcript_quotes_each_line() {
        let votes = VoteTally { accept: 1, decline: 2 };
        let transcript = build_transcript("line one\nline two", &votes, Verdict::Declined);

        assert_eq!(
            transcript,
            "> line one\n> line two\n\n✅: 1 vote(s), ❌: 2 vote(s)"
        );
    }

    #[test]
    fn accepted_transcript_carries_processing_note() {
        let votes = VoteTally { accept: 3, decline: 0 };
        let transcript = build_transcript("Add a study-group channel", &votes, Verdict::Accepted);

        assert!(transcript.starts_with("> Add a study-group channel\n\n✅: 3 vote(s)"));
        assert!(transcript.ends_with(PROCESSING_NOTE));
    }
}

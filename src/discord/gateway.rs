// Small helpers over serenity types shared by the event handlers.

use poise::serenity_prelude as serenity;

/// True when the gateway reports that a message or channel no longer exists.
///
/// Those failures are always benign for us: the suggestion was deleted by
/// someone else, or a previous event already closed it.
pub fn is_not_found(err: &::serenity::Error) -> bool {
    match err {
        ::serenity::Error::Http(http) => http
            .status_code()
            .map(|status| status.as_u16() == 404)
            .unwrap_or(false),
        _ => false,
    }
}

/// The unicode marker behind a reaction, if it is not a custom emoji.
pub fn marker_of(reaction: &serenity::ReactionType) -> Option<&str> {
    match reaction {
        serenity::ReactionType::Unicode(marker) => Some(marker.as_str()),
        _ => None,
    }
}

pub fn unicode(marker: &str) -> serenity::ReactionType {
    serenity::ReactionType::Unicode(marker.to_string())
}

/// Tally of one marker on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerReaction {
    pub count: u64,
    /// The bot has reacted with this marker itself.
    pub me: bool,
}

pub fn marker_reaction(
    reactions: &[serenity::MessageReaction],
    marker: &str,
) -> Option<MarkerReaction> {
    find_marker(
        reactions
            .iter()
            .map(|r| (&r.reaction_type, r.count, r.me)),
        marker,
    )
}

fn find_marker<'a>(
    reactions: impl IntoIterator<Item = (&'a serenity::ReactionType, u64, bool)>,
    marker: &str,
) -> Option<MarkerReaction> {
    reactions
        .into_iter()
        .find(|(reaction_type, _, _)| marker_of(reaction_type) == Some(marker))
        .map(|(_, count, me)| MarkerReaction { count, me })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_markers_are_recognised() {
        assert_eq!(marker_of(&unicode("✅")), Some("✅"));
        assert_eq!(marker_of(&unicode("📌")), Some("📌"));
    }

    #[test]
    fn finds_the_matching_marker() {
        let accept = unicode("✅");
        let decline = unicode("❌");
        let pin = unicode("📌");
        let reactions = vec![(&accept, 4, true), (&decline, 1, true), (&pin, 2, false)];

        assert_eq!(
            find_marker(reactions.clone(), "✅"),
            Some(MarkerReaction { count: 4, me: true })
        );
        assert_eq!(
            find_marker(reactions.clone(), "📌"),
            Some(MarkerReaction { count: 2, me: false })
        );
        assert_eq!(find_marker(reactions, "👍"), None);
    }
}

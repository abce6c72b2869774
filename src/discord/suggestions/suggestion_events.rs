// Discord side of the suggestion workflow.
//
// New message in the suggestion channel -> markers + discussion thread.
// Administrator reacts with a marker -> verdict is broadcast, message deleted.

use crate::core::suggestions::{
    thread_name, CloseStep, ClosedSuggestion, PendingSuggestion, Verdict, VerdictReaction,
    VoteTally, ACCEPT_MARKER, DECLINE_MARKER,
};
use crate::discord::gateway::{is_not_found, marker_of, marker_reaction, unicode};
use crate::discord::Data;
use crate::infra::assets::ALERT_ICON;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context};

const ACCEPTED_COLOUR: u32 = 0x77B255;
const DECLINED_COLOUR: u32 = 0xDD2E44;
// Attachments are addressed by file name inside the same message.
const ALERT_THUMBNAIL: &str = "attachment://alert.png";

/// Acknowledge a freshly posted suggestion.
pub async fn handle_new_message(
    ctx: &Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<()> {
    if message.author.bot {
        return Ok(());
    }

    let guild_id = match message.guild_id {
        Some(id) => id.get(),
        None => return Ok(()),
    };

    if !data
        .guilds
        .config(guild_id)
        .is_suggestion_channel(message.channel_id.get())
    {
        return Ok(());
    }

    match acknowledge(ctx, message).await {
        Err(e) if is_not_found(&e) => {
            tracing::debug!(
                message_id = message.id.get(),
                "Suggestion deleted before it could be acknowledged"
            );
            Ok(())
        }
        other => Ok(other?),
    }
}

async fn acknowledge(ctx: &Context, message: &serenity::Message) -> ::serenity::Result<()> {
    message.react(&ctx.http, unicode(ACCEPT_MARKER)).await?;
    message.react(&ctx.http, unicode(DECLINE_MARKER)).await?;
    message
        .channel_id
        .create_thread_from_message(
            &ctx.http,
            message.id,
            serenity::CreateThread::new(thread_name(&message.author.name)),
        )
        .await?;
    Ok(())
}

/// Close a suggestion when an administrator reacts with a verdict marker.
pub async fn handle_reaction_add(
    ctx: &Context,
    data: &Data,
    reaction: &serenity::Reaction,
) -> Result<()> {
    let guild_id = match reaction.guild_id {
        Some(id) => id,
        None => return Ok(()),
    };

    let member = reaction.member.as_ref();
    let verdict = VerdictReaction {
        marker: marker_of(&reaction.emoji),
        in_suggestion_channel: data
            .guilds
            .config(guild_id.get())
            .is_suggestion_channel(reaction.channel_id.get()),
        by_bot: member.map(|m| m.user.bot).unwrap_or(false),
        by_administrator: member
            .map(|m| is_administrator(ctx, guild_id, m))
            .unwrap_or(false),
    }
    .verdict();
    let verdict = match verdict {
        Some(verdict) => verdict,
        None => return Ok(()),
    };

    let step = data
        .suggestions
        .begin_close(reaction.message_id.get(), move || async move {
            match reaction
                .channel_id
                .message(&ctx.http, reaction.message_id)
                .await
            {
                Ok(message) => Ok(Some(message)),
                Err(e) if is_not_found(&e) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await?;

    // `_claim` is held until the message is deleted.
    let (_claim, message) = match step {
        CloseStep::Ready { claim, message } => (claim, message),
        CloseStep::InFlight => {
            tracing::debug!(
                message_id = reaction.message_id.get(),
                "Verdict already in progress for this suggestion"
            );
            return Ok(());
        }
        CloseStep::Gone => {
            tracing::debug!(
                message_id = reaction.message_id.get(),
                "Suggestion already closed"
            );
            return Ok(());
        }
    };

    let votes = VoteTally::from_raw(
        marker_reaction(&message.reactions, ACCEPT_MARKER).map(|r| r.count),
        marker_reaction(&message.reactions, DECLINE_MARKER).map(|r| r.count),
    );
    let pending = PendingSuggestion {
        message_id: message.id.get(),
        author_id: message.author.id.get(),
        author_name: message.author.name.clone(),
        content: message.content.clone(),
    };

    let closed = data.suggestions.close(pending, verdict, votes).await?;
    announce_verdict(ctx, data, reaction.channel_id, &closed).await?;

    match message.delete(&ctx.http).await {
        Err(e) if is_not_found(&e) => Ok(()),
        other => Ok(other?),
    }
}

fn is_administrator(
    ctx: &Context,
    guild_id: serenity::GuildId,
    member: &serenity::Member,
) -> bool {
    ctx.cache
        .guild(guild_id)
        .map(|guild| guild.member_permissions(member).administrator())
        .unwrap_or(false)
}

/// Colour and title of a verdict announcement.
fn verdict_style(verdict: Verdict) -> (u32, &'static str) {
    match verdict {
        Verdict::Accepted => (ACCEPTED_COLOUR, "Suggestion acceptée"),
        Verdict::Declined => (DECLINED_COLOUR, "Suggestion refusée"),
    }
}

async fn announce_verdict(
    ctx: &Context,
    data: &Data,
    channel_id: serenity::ChannelId,
    closed: &ClosedSuggestion,
) -> Result<()> {
    let (colour, title) = verdict_style(closed.verdict);
    let icon = serenity::CreateAttachment::path(data.assets.path(ALERT_ICON)).await?;

    let embed = serenity::CreateEmbed::new()
        .color(colour)
        .title(title)
        .description(closed.transcript.clone())
        .thumbnail(ALERT_THUMBNAIL)
        .author(serenity::CreateEmbedAuthor::new(closed.author_name.clone()));

    channel_id
        .send_message(
            &ctx.http,
            serenity::CreateMessage::new().add_file(icon).embed(embed),
        )
        .await?;
    tracing::debug!(
        verdict = %closed.verdict,
        accept = closed.votes.accept,
        decline = closed.votes.decline,
        "Announced verdict"
    );

    if let Some(record) = &closed.record {
        tracing::info!(
            author_id = record.author_id,
            date = %record.date,
            "Stored accepted suggestion"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdicts_are_styled_green_and_red() {
        assert_eq!(
            verdict_style(Verdict::Accepted),
            (0x77B255, "Suggestion acceptée")
        );
        assert_eq!(
            verdict_style(Verdict::Declined),
            (0xDD2E44, "Suggestion refusée")
        );
    }
}

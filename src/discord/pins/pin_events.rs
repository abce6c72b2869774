// Pin promotion on the Discord side: count pin markers, republish the message
// to the website channel, then leave our own marker as the "sent" flag.

use crate::core::pins::{PinDecision, PinReaction, PinStep, PinTally, PIN_MARKER};
use crate::discord::gateway::{is_not_found, marker_of, marker_reaction, unicode};
use crate::discord::Data;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context};

const PROMOTION_COLOUR: u32 = 0x00FF00;
const PROMOTION_TITLE: &str = "Message épinglé";
const PROMOTION_BLURB: &str = "Un message a été retenu par la communauté, vous pouvez \
probablement l'ajouter dans la [FAQ](https://prepas-mp2i.fr/faq/).";

pub async fn handle_reaction_add(
    ctx: &Context,
    data: &Data,
    reaction: &serenity::Reaction,
) -> Result<()> {
    let trigger = PinReaction {
        marker: marker_of(&reaction.emoji),
        in_guild: reaction.guild_id.is_some(),
        by_bot: reaction
            .member
            .as_ref()
            .map(|m| m.user.bot)
            .unwrap_or(false),
    };
    let guild_id = match reaction.guild_id {
        Some(id) if trigger.triggers() => id.get(),
        _ => return Ok(()),
    };
    let config = data.guilds.config(guild_id);

    let website = match config.website_channel() {
        Some(channel_id) => serenity::ChannelId::new(channel_id),
        None => {
            tracing::debug!(guild_id, "No website channel configured, skipping promotion");
            return Ok(());
        }
    };

    let step = data
        .pins
        .begin(
            reaction.message_id.get(),
            config.minimum_pins(),
            move || async move {
                let message = match reaction
                    .channel_id
                    .message(&ctx.http, reaction.message_id)
                    .await
                {
                    Ok(message) => message,
                    Err(e) if is_not_found(&e) => return Ok(None),
                    Err(e) => return Err(e),
                };
                let tally = marker_reaction(&message.reactions, PIN_MARKER)
                    .map(|r| PinTally {
                        count: r.count,
                        me: r.me,
                    })
                    .unwrap_or_default();
                Ok(Some((message, tally)))
            },
        )
        .await?;

    // `_claim` is held until the bot marker is on the message.
    let (_claim, message, tally) = match step {
        PinStep::Promote {
            claim,
            message,
            tally,
        } => (claim, message, tally),
        PinStep::Skip(PinDecision::BelowQuorum { pins, minimum }) => {
            tracing::debug!(
                message_id = reaction.message_id.get(),
                pins,
                minimum,
                "Pin quorum not reached"
            );
            return Ok(());
        }
        PinStep::Skip(_) => {
            tracing::debug!(
                message_id = reaction.message_id.get(),
                "Message already promoted"
            );
            return Ok(());
        }
        PinStep::InFlight | PinStep::Gone => return Ok(()),
    };

    let bot_name = ctx.cache.current_user().name.clone();
    let embed = serenity::CreateEmbed::new()
        .color(PROMOTION_COLOUR)
        .title(PROMOTION_TITLE)
        .description(PROMOTION_BLURB)
        .timestamp(serenity::Timestamp::now())
        .field("Lien du message", message.link(), false)
        .author(
            serenity::CreateEmbedAuthor::new(message.author.name.clone())
                .icon_url(message.author.face()),
        )
        .footer(serenity::CreateEmbedFooter::new(bot_name));

    website
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;
    tracing::info!(
        guild_id,
        message_id = message.id.get(),
        pins = tally.member_pins(),
        "Promoted pinned message"
    );

    match message.react(&ctx.http, unicode(PIN_MARKER)).await {
        Err(e) if is_not_found(&e) => Ok(()),
        other => {
            other?;
            Ok(())
        }
    }
}

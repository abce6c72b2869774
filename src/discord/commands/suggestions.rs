use crate::discord::{Context, Error};
use crate::infra::assets::SUGGESTION_RULES;
use poise::serenity_prelude as serenity;

const RULES_COLOUR: u32 = 0xFF66FF;

/// Post how the suggestion channel works.
#[poise::command(
    slash_command,
    prefix_command,
    rename = "suggestionsrules",
    guild_only,
    owners_only
)]
pub async fn suggestions_rules(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let config = ctx.data().guilds.config(guild_id);
    if !config.is_suggestion_channel(ctx.channel_id().get()) {
        return Ok(());
    }

    let rules = ctx.data().assets.read_text(SUGGESTION_RULES).await?;
    // GuildRef must not live across an await.
    let icon = ctx.guild().and_then(|guild| guild.icon_url());
    let bot_name = ctx.cache().current_user().name.clone();

    let mut embed = serenity::CreateEmbed::new()
        .title("Fonctionnement des suggestions")
        .description(rules)
        .color(RULES_COLOUR)
        .timestamp(serenity::Timestamp::now())
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Généré par {}",
            bot_name
        )));
    if let Some(icon) = icon {
        embed = embed.thumbnail(icon);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

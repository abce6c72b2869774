use crate::core::guilds::{GuildContext, GuildError};
use crate::discord::guilds::cached_guild;
use crate::discord::{Context, Error};
use crate::infra::guilds::SqliteGuildStore;
use poise::serenity_prelude as serenity;

type CommunityContext<'s> = GuildContext<'s, serenity::Guild, SqliteGuildStore>;

/// Inspect and maintain this community's record.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    subcommands("info", "register", "rolesmessage", "member", "role", "emoji")
)]
pub async fn community(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

async fn load(ctx: Context<'_>) -> Result<CommunityContext<'_>, Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?;
    let guild = cached_guild(ctx.serenity_context(), guild_id).ok_or("Guild not found")?;
    Ok(ctx.data().guilds.context(guild).await?)
}

async fn reply(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

fn channel_mention(channel_id: Option<u64>) -> String {
    channel_id
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "Not set".to_string())
}

/// Show the stored record and the configured channels.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn info(ctx: Context<'_>) -> Result<(), Error> {
    let community = load(ctx).await?;
    let config = community.config();

    let (status, name) = match community.record() {
        Some(record) => ("Registered", record.name.clone()),
        None => ("Not registered", "-".to_string()),
    };
    let roles_message = community
        .roles_message_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "Not set".to_string());
    let log_channel = community
        .get_log_channel()
        .map(|channel| channel.id.get());

    let embed = serenity::CreateEmbed::default()
        .title("Community")
        .color(serenity::Color::BLURPLE)
        .field("Status", status, true)
        .field("Stored name", name, true)
        .field("Roles message", roles_message, true)
        .field(
            "Suggestion channel",
            channel_mention(config.suggestion_channel()),
            true,
        )
        .field(
            "Website channel",
            channel_mention(config.website_channel()),
            true,
        )
        .field("Log channel", channel_mention(log_channel), true)
        .field("Pin quorum", config.minimum_pins().to_string(), true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Guild ID: {}",
            community.handle().id.get()
        )))
        .timestamp(serenity::Timestamp::now());

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Store this community if it is not stored yet.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    let mut community = load(ctx).await?;
    if community.exists() {
        return reply(ctx, "This community is already registered.").await;
    }

    community.register().await?;
    reply(ctx, "✅ Community registered.").await
}

/// Set or clear the roles message.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn rolesmessage(
    ctx: Context<'_>,
    #[description = "Message id, leave empty to clear"] message_id: Option<String>,
) -> Result<(), Error> {
    let message_id = match message_id {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => return reply(ctx, format!("`{}` is not a message id.", raw)).await,
        },
        None => None,
    };

    let mut community = load(ctx).await?;
    match community.set_roles_message_id(message_id).await {
        Ok(()) => match message_id {
            Some(id) => reply(ctx, format!("✅ Roles message set to `{}`.", id)).await,
            None => reply(ctx, "✅ Roles message cleared.").await,
        },
        Err(GuildError::RecordNotFound(_)) => {
            reply(
                ctx,
                "This community is not registered. Use `/community register` first.",
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

/// Look up a member by user name.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn member(
    ctx: Context<'_>,
    #[description = "User name"] name: String,
) -> Result<(), Error> {
    let community = load(ctx).await?;
    match community.get_member_by_name(&name) {
        Some(member) => reply(ctx, format!("Found <@{}>.", member.user.id.get())).await,
        None => reply(ctx, format!("No member named `{}`.", name)).await,
    }
}

/// Resolve a configured role qualifier.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn role(
    ctx: Context<'_>,
    #[description = "Role qualifier from the configuration"] qualifier: String,
) -> Result<(), Error> {
    let community = load(ctx).await?;
    match community.get_role_by_qualifier(&qualifier) {
        Some(role) => {
            reply(
                ctx,
                format!("`{}` is {} (`{}`).", qualifier, role.name, role.id.get()),
            )
            .await
        }
        None => reply(ctx, format!("No role configured for `{}`.", qualifier)).await,
    }
}

/// Look up a custom emoji by name.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn emoji(
    ctx: Context<'_>,
    #[description = "Emoji name"] name: String,
) -> Result<(), Error> {
    let community = load(ctx).await?;
    match community.get_emoji_by_name(&name) {
        Some(emoji) => reply(ctx, format!("Found {}.", emoji)).await,
        None => reply(ctx, format!("No emoji named `{}`.", name)).await,
    }
}

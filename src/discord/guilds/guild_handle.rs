// Binds a cached serenity guild to the core GuildHandle trait, plus the
// registration that runs when the gateway hands us a guild.

use crate::core::guilds::{FieldValue, GuildHandle};
use crate::discord::Data;
use anyhow::Result;
use poise::serenity_prelude as serenity;

impl GuildHandle for serenity::Guild {
    type Member = serenity::Member;
    type Role = serenity::Role;
    type Emoji = serenity::Emoji;
    type Channel = serenity::GuildChannel;

    fn id(&self) -> u64 {
        self.id.get()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> Vec<&serenity::Member> {
        self.members.values().collect()
    }

    fn member_name(member: &serenity::Member) -> &str {
        &member.user.name
    }

    fn member_id(member: &serenity::Member) -> u64 {
        member.user.id.get()
    }

    fn role(&self, role_id: u64) -> Option<&serenity::Role> {
        if role_id == 0 {
            return None;
        }
        self.roles.get(&serenity::RoleId::new(role_id))
    }

    fn emojis(&self) -> Vec<&serenity::Emoji> {
        self.emojis.values().collect()
    }

    fn emoji_name(emoji: &serenity::Emoji) -> &str {
        &emoji.name
    }

    fn text_channel(&self, channel_id: u64) -> Option<&serenity::GuildChannel> {
        if channel_id == 0 {
            return None;
        }
        self.channels
            .get(&serenity::ChannelId::new(channel_id))
            .filter(|channel| channel.kind == serenity::ChannelType::Text)
    }
}

/// Owned snapshot of a cached guild, safe to hold across awaits.
pub fn cached_guild(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
) -> Option<serenity::Guild> {
    ctx.cache.guild(guild_id).map(|guild| (*guild).clone())
}

/// Register a community the first time the gateway announces it, and keep the
/// stored name in step with renames afterwards.
pub async fn handle_guild_create(data: &Data, guild: &serenity::Guild) -> Result<()> {
    let mut context = data.guilds.context(guild.clone()).await?;
    if let Some(record) = context.record() {
        if record.name != guild.name {
            context
                .update([("name", FieldValue::Text(guild.name.clone()))])
                .await?;
            tracing::info!(guild_id = guild.id.get(), name = %guild.name, "Renamed community");
        }
        return Ok(());
    }

    context.register().await?;
    tracing::info!(
        guild_id = guild.id.get(),
        name = %guild.name,
        "Registered new community"
    );
    Ok(())
}

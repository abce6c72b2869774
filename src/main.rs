// This is the entry point of the community bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (SQLite, config file, static assets)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::guilds::GuildDirectory;
use crate::core::pins::PinService;
use crate::core::suggestions::SuggestionService;
use crate::discord::guilds::handle_guild_create;
use crate::discord::pins::pin_events;
use crate::discord::suggestions::suggestion_events;
use crate::discord::{Data, Error};
use crate::infra::assets::StaticAssets;
use crate::infra::guilds::{load_guilds_config, SqliteGuildStore};
use crate::infra::suggestions::SqliteSuggestionStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = suggestion_events::handle_new_message(ctx, data, new_message).await {
                tracing::error!("Error acknowledging suggestion: {}", e);
            }
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            if let Err(e) = suggestion_events::handle_reaction_add(ctx, data, add_reaction).await {
                tracing::error!("Error handling suggestion verdict: {}", e);
            }
            if let Err(e) = pin_events::handle_reaction_add(ctx, data, add_reaction).await {
                tracing::error!("Error handling pin promotion: {}", e);
            }
        }
        serenity::FullEvent::GuildCreate { guild, .. } => {
            if let Err(e) = handle_guild_create(data, guild).await {
                tracing::error!("Error registering community {}: {}", guild.id, e);
            }
        }
        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );
    let config_path =
        std::env::var("GUILDS_CONFIG").unwrap_or_else(|_| "config/guilds.json".to_string());
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let prefix = std::env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string());

    // Keep runtime databases in a dedicated folder so the repo root stays tidy.
    std::fs::create_dir_all(&data_dir).expect("Failed to create data directory for SQLite files");
    let db_path = format!("{}/community.db", data_dir);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let guilds_config =
        load_guilds_config(&config_path).expect("Failed to load guild configuration");

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite://{}?mode=rwc", db_path))
        .await
        .expect("Failed to connect to community DB");

    let guild_store = SqliteGuildStore::new(pool.clone());
    guild_store
        .migrate()
        .await
        .expect("Failed to migrate guilds table");
    let suggestion_store = SqliteSuggestionStore::new(pool);
    suggestion_store
        .migrate()
        .await
        .expect("Failed to migrate suggestions table");

    let data = Data {
        guilds: Arc::new(GuildDirectory::new(guilds_config, guild_store)),
        suggestions: Arc::new(SuggestionService::new(suggestion_store)),
        pins: Arc::new(PinService::new()),
        assets: Arc::new(StaticAssets::new(&static_dir)),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read suggestion text
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_EMOJIS_AND_STICKERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::suggestions::suggestions_rules(),
                discord::commands::community::community(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered, bot is ready");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}

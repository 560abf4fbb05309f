//! # Main Entry Point
//!
//! Loads the configuration, sets up logging, loads the locale catalogs and
//! the persisted sessions, then hands control to the Discord gateway:
//! - Domain: configuration and error taxonomy
//! - Application: sessions, pagination
//! - Infrastructure: Square Cloud API client
//! - Interface: slash commands and views

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use poise::serenity_prelude as serenity;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::application::sessions::SessionStore;
use crate::domain::config::AppConfig;
use crate::interface::commands::Data;
use crate::strings::Translator;

#[derive(Debug, Parser)]
#[command(name = "squarebot", about = "Discord bot for managing Square Cloud applications")]
struct Args {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Enable debug logging for the bot's own modules.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load configuration
    let config = AppConfig::load(&args.config)?;

    let data_dir = Path::new(&config.system.data_dir).to_path_buf();
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).context("failed to create data directory")?;
    }

    // 2. Logging setup: stderr plus a session log file in the data dir.
    let file_appender = tracing_appender::rolling::never(&data_dir, "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let default_directives = if args.debug {
        "info,squarebot=debug,serenity=warn,poise=warn,hyper=warn"
    } else {
        "info,serenity=warn,poise=warn,hyper=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting bot...");

    // 3. Locales and persisted sessions
    let translator = Translator::load(Path::new(&config.system.locales_dir))?;
    let sessions = SessionStore::load(data_dir.join("sessions.json"));
    tracing::info!("Loaded {} stored sessions", sessions.len());

    // 4. Discord framework
    let token = config.services.discord.resolve_token()?;
    let guild_id = serenity::GuildId::new(config.services.discord.guild_id);

    let mut commands = interface::commands::all();
    interface::commands::localize(&mut commands, &translator);

    let options = poise::FrameworkOptions {
        commands,
        on_error: |error| Box::pin(interface::commands::on_error(error)),
        ..Default::default()
    };

    let data_config = config.clone();
    let framework = poise::Framework::builder()
        .options(options)
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("Connected as {} (ID: {})", ready.user.name, ready.user.id);

                // Sync the commands to the configured guild and cache their
                // mentions. The bot is designed to work on just one server.
                tracing::info!("Synchronizing commands in {guild_id}...");
                let create_commands =
                    poise::builtins::create_application_commands(&framework.options().commands);
                let registered = guild_id.set_commands(ctx, create_commands).await?;
                tracing::info!("{} commands synchronized in {guild_id}", registered.len());

                let mentions = registered
                    .iter()
                    .map(|command| {
                        (
                            command.name.clone(),
                            format!("</{}:{}>", command.name, command.id),
                        )
                    })
                    .collect();

                Ok(Data {
                    config: data_config,
                    translator,
                    sessions,
                    mentions,
                })
            })
        })
        .build();

    let activity = config
        .services
        .discord
        .activity
        .clone()
        .unwrap_or_else(|| "Manage your Square Cloud applications".to_string());

    // Slash commands arrive over the interaction event; no gateway intents
    // are needed.
    let mut client = serenity::ClientBuilder::new(&token, serenity::GatewayIntents::empty())
        .framework(framework)
        .activity(serenity::ActivityData::playing(activity))
        .await
        .context("failed to build Discord client")?;

    client.start().await.context("error while running the bot")?;

    Ok(())
}

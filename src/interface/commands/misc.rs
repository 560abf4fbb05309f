//! # Miscellaneous Commands
//!
//! `/ping`, `/help` and the public `/statistics` command. None of these
//! require an authenticated session.

use std::time::Instant;

use poise::serenity_prelude as serenity;

use crate::infrastructure::square;
use crate::interface::commands::{Context, Error, lang};
use crate::interface::embeds::default_embed;

/// Check the bot's latency.
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let t = lang(ctx);

    let latency = ctx.ping().await;

    let start = Instant::now();
    ctx.defer_ephemeral().await?;
    let response_time = start.elapsed();

    let embed = default_embed()
        .title(format!("🏓 {}", t.t("ping.pong")))
        .field(
            format!("📡 {}", t.t("ping.latency")),
            format!("{}ms", latency.as_millis()),
            false,
        )
        .field(
            format!("⚡ {}", t.t("ping.response_time")),
            format!("{}ms", response_time.as_millis()),
            false,
        )
        .thumbnail(ctx.serenity_context().cache.current_user().face());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Show the command list and how to get started.
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let t = lang(ctx);
    let data = ctx.data();

    let mut command_list = String::new();
    for (name, mention) in &data.mentions {
        command_list.push_str(&format!(
            "🔹 {mention}: {}\n",
            t.t(&format!("{name}.description"))
        ));
    }

    let embed = default_embed()
        .title(t.t("help.command_list"))
        .description(command_list)
        .thumbnail(ctx.serenity_context().cache.current_user().face());

    let author = ctx.author();
    let display_name = author
        .global_name
        .clone()
        .unwrap_or_else(|| author.name.clone());

    let content = t.tf(
        "help.response",
        &[
            &display_name,
            &"https://squarecloud.app/",
            &data.mention("login"),
        ],
    );

    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .embed(embed)
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Show Square Cloud service statistics. Works without a session; the
/// statistics route is public.
#[poise::command(slash_command, user_cooldown = 5)]
pub async fn statistics(ctx: Context<'_>) -> Result<(), Error> {
    let t = lang(ctx);

    let client = square::Client::new(None, ctx.data().config.square.base_url.clone());
    let stats = client.service_statistics().await?;

    let embed = default_embed()
        .title(t.t("statistics.title"))
        .description(format!(
            "**{}:** {}\n**{}:** {}\n**{}:** {}\n**{}:** {}ms\n",
            t.t("statistics.users"),
            stats.stats.users,
            t.t("statistics.apps"),
            stats.stats.apps,
            t.t("statistics.websites"),
            stats.stats.websites,
            t.t("statistics.ping"),
            stats.stats.ping,
        ))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

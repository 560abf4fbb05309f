//! # Self-Host Command
//!
//! `/host` packages the bot's own working directory into a zip and uploads
//! it to Square Cloud as a new application. The package still goes through
//! the regular upload validation, so a missing `squarecloud.config` is
//! caught before any network call.

use poise::serenity_prelude as serenity;
use serenity::{CreateInteractionResponse, CreateInteractionResponseMessage, EditInteractionResponse};

use crate::infrastructure::square::archive;
use crate::interface::commands::{Context, Error, lang, require_auth};
use crate::interface::embeds::{default_embed, loading_embed, success_embed};
use crate::interface::views::confirm_row;

const CONFIRM_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Upload this bot's own code to Square Cloud.
#[poise::command(slash_command, user_cooldown = 30)]
pub async fn host(ctx: Context<'_>) -> Result<(), Error> {
    let t = lang(ctx);
    let client = require_auth(ctx)?;
    let ctx_id = ctx.id();

    ctx.send(
        poise::CreateReply::default()
            .embed(default_embed().description(t.t("host.confirm")))
            .components(vec![confirm_row(
                &t,
                format!("{ctx_id}:host:confirm"),
                format!("{ctx_id}:host:cancel"),
            )])
            .ephemeral(true),
    )
    .await?;

    let Some(press) = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
        .author_id(ctx.author().id)
        .timeout(CONFIRM_TIMEOUT)
        .filter(move |press| press.data.custom_id.starts_with(&format!("{ctx_id}:host:")))
        .await
    else {
        tracing::debug!("Self-host prompt for interaction {ctx_id} expired");
        return Ok(());
    };

    if press.data.custom_id.ends_with(":cancel") {
        press
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(default_embed().description(t.t("host.cancelled")))
                        .components(Vec::new()),
                ),
            )
            .await?;
        return Ok(());
    }

    press
        .create_response(
            ctx.serenity_context(),
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(loading_embed(&t.t("host.packaging")))
                    .components(Vec::new()),
            ),
        )
        .await?;

    // Packaging walks the whole tree; keep it off the async runtime.
    let root = std::env::current_dir().map_err(anyhow::Error::from)?;
    let payload = tokio::task::spawn_blocking(move || archive::package_directory(&root))
        .await
        .map_err(anyhow::Error::from)??;

    archive::validate_upload(&payload)?;

    let uploaded = client.upload(&payload).await?;
    tracing::info!(
        "User {} self-hosted the bot as application {}",
        ctx.author().id,
        uploaded.id
    );

    press
        .edit_response(
            ctx.serenity_context(),
            EditInteractionResponse::new()
                .embed(success_embed(&t.tf("host.success", &[&uploaded.id])))
                .components(Vec::new()),
        )
        .await?;

    Ok(())
}

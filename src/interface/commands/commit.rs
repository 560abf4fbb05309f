//! # Commit Command
//!
//! Pushes a single file update to an already-deployed application, with an
//! optional restart. The target application comes from the same selector as
//! `/apps`; a user with exactly one application skips it.

use poise::serenity_prelude as serenity;
use serenity::EditInteractionResponse;

use crate::infrastructure::square::archive::File;
use crate::interface::commands::{Context, Error, lang, require_auth};
use crate::interface::embeds::{error_embed, success_embed};
use crate::interface::views::pick_application;

/// Push a file update to an existing application.
#[poise::command(slash_command, user_cooldown = 15)]
pub async fn commit(
    ctx: Context<'_>,
    #[description = "The file to commit."] file: serenity::Attachment,
    #[description = "Restart the application after the commit."] restart: Option<bool>,
) -> Result<(), Error> {
    let t = lang(ctx);
    let client = require_auth(ctx)?;
    let restart = restart.unwrap_or(false);

    ctx.defer_ephemeral().await?;

    let apps = client.get_all_apps().await?;
    if apps.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .embed(error_embed(&t.t("apps.no_apps")))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let Some(pick) = pick_application(ctx, &t, &apps).await? else {
        return Ok(());
    };

    let bytes = file.download().await?;
    let payload = File::new(file.filename.clone(), bytes);

    client.commit(&pick.app.id, &payload, restart).await?;
    tracing::info!(
        "User {} committed {} to application {}",
        ctx.author().id,
        payload.filename,
        pick.app.id
    );

    let embed = success_embed(&t.tf("commit.success", &[&payload.filename, &pick.app.name]));

    // When the selector was used, keep editing that message instead of
    // posting a new one.
    match &pick.press {
        Some(press) => {
            press
                .edit_response(
                    ctx.serenity_context(),
                    EditInteractionResponse::new()
                        .embed(embed)
                        .components(Vec::new()),
                )
                .await?;
        }
        None => {
            ctx.send(
                poise::CreateReply::default()
                    .embed(embed)
                    .ephemeral(true),
            )
            .await?;
        }
    }

    Ok(())
}

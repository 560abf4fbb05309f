//! # Upload Command
//!
//! `/up` takes a zip attachment, validates it locally (extension, archive
//! integrity, configuration file, mandatory keys) and only then forwards it
//! to the API.

use poise::serenity_prelude as serenity;

use crate::infrastructure::square::archive::{self, File};
use crate::interface::commands::{Context, Error, lang, require_auth};
use crate::interface::embeds::success_embed;

/// Upload a new application to Square Cloud.
#[poise::command(slash_command, user_cooldown = 15)]
pub async fn up(
    ctx: Context<'_>,
    #[description = "The zip archive of your application."] file: serenity::Attachment,
) -> Result<(), Error> {
    let t = lang(ctx);
    let client = require_auth(ctx)?;

    ctx.defer_ephemeral().await?;

    let bytes = file.download().await?;
    let payload = File::new(file.filename.clone(), bytes);

    // Local validation gate: a malformed archive never reaches the API.
    archive::validate_upload(&payload)?;

    let uploaded = client.upload(&payload).await?;
    tracing::info!(
        "User {} uploaded application {} ({})",
        ctx.author().id,
        uploaded.name,
        uploaded.id
    );

    ctx.send(
        poise::CreateReply::default()
            .embed(success_embed(&t.tf("up.success", &[&uploaded.id])))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

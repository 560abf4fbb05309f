//! # Login Command
//!
//! Collects the user's Square Cloud API key through a modal, validates it
//! against the API and stores the session. When the bot instance is not
//! self-hosted by its operator's own account, an explicit trust warning is
//! shown before the credential prompt.

use poise::serenity_prelude as serenity;
use serenity::{
    CreateActionRow, CreateInputText, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateModal, InputTextStyle,
};

use crate::infrastructure::square;
use crate::interface::commands::{Data, Error};
use crate::interface::embeds::{default_embed, error_embed, success_embed};
use crate::interface::views::confirm_row;

const MODAL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(600);
const CONFIRM_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Connect your Square Cloud account.
#[poise::command(slash_command, user_cooldown = 5)]
pub async fn login(ctx: poise::ApplicationContext<'_, Data, Error>) -> Result<(), Error> {
    let data = ctx.data;
    let t = data.translator.lang(&ctx.interaction.locale);
    let interaction_id = ctx.interaction.id;
    // The enum context carries the messaging helpers.
    let pctx = poise::Context::Application(ctx);

    let modal_id = format!("{interaction_id}:login");
    let modal = CreateModal::new(&modal_id, t.t("login.modal.title")).components(vec![
        CreateActionRow::InputText(
            CreateInputText::new(
                InputTextStyle::Short,
                t.t("login.modal.api_key_input.label"),
                "api_key",
            )
            .placeholder(t.t("login.modal.api_key_input.placeholder"))
            .min_length(10)
            .max_length(100)
            .required(true),
        ),
    ]);

    if data.config.services.discord.self_hosted {
        ctx.interaction
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::Modal(modal),
            )
            .await?;
    } else {
        // Trust gate: the key hands full account control to whoever runs
        // this instance, so make the user acknowledge that first.
        pctx.send(
            poise::CreateReply::default()
                .embed(default_embed().description(t.t("login.trust_warning")))
                .components(vec![confirm_row(
                    &t,
                    format!("{interaction_id}:trust:confirm"),
                    format!("{interaction_id}:trust:cancel"),
                )])
                .ephemeral(true),
        )
        .await?;

        let Some(press) =
            serenity::ComponentInteractionCollector::new(ctx.serenity_context())
                .author_id(ctx.interaction.user.id)
                .timeout(CONFIRM_TIMEOUT)
                .filter(move |press| {
                    press
                        .data
                        .custom_id
                        .starts_with(&format!("{interaction_id}:trust:"))
                })
                .await
        else {
            tracing::debug!("Login trust prompt for interaction {interaction_id} expired");
            return Ok(());
        };

        if press.data.custom_id.ends_with(":cancel") {
            press
                .create_response(
                    ctx.serenity_context(),
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .embed(default_embed().description(t.t("login.cancelled")))
                            .components(Vec::new()),
                    ),
                )
                .await?;
            return Ok(());
        }

        press
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::Modal(modal),
            )
            .await?;
    }

    let Some(submit) = serenity::ModalInteractionCollector::new(ctx.serenity_context())
        .timeout(MODAL_TIMEOUT)
        .filter(move |submit| submit.data.custom_id == format!("{interaction_id}:login"))
        .await
    else {
        tracing::debug!("Login modal for interaction {interaction_id} expired");
        return Ok(());
    };

    let api_key = modal_input(&submit, "api_key")
        .unwrap_or_default()
        .trim()
        .to_string();

    // Check the key against the API before storing anything.
    let client = square::Client::new(Some(api_key.clone()), data.config.square.base_url.clone());

    let response = match client.me().await {
        Ok(_) => {
            data.sessions.set(ctx.interaction.user.id.get(), api_key);
            CreateInteractionResponseMessage::new()
                .embed(success_embed(&t.t("login.success")))
                .ephemeral(true)
        }
        Err(err) if err.is_authentication_failure() => CreateInteractionResponseMessage::new()
            .embed(error_embed(&t.t("login.failure")))
            .ephemeral(true),
        Err(err) => return Err(err.into()),
    };

    submit
        .create_response(
            ctx.serenity_context(),
            CreateInteractionResponse::Message(response),
        )
        .await?;

    Ok(())
}

/// Extract a text input's value from a submitted modal.
fn modal_input(submit: &serenity::ModalInteraction, custom_id: &str) -> Option<String> {
    for row in &submit.data.components {
        for component in &row.components {
            if let serenity::ActionRowComponent::InputText(input) = component {
                if input.custom_id == custom_id {
                    return input.value.clone();
                }
            }
        }
    }
    None
}

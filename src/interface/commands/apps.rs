//! # Apps Command
//!
//! Paginated selector over the user's applications, followed by a management
//! panel with start/restart/stop, logs, backup and delete. Deleting goes
//! through an explicit confirm step; cancelling returns to the panel without
//! touching the API.

use poise::serenity_prelude as serenity;
use serenity::{
    ButtonStyle, CreateActionRow, CreateAttachment, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, EditInteractionResponse,
};

use crate::infrastructure::square::models::{Application, ApplicationStatus, NetworkUsage};
use crate::infrastructure::square::{Client, SquareError};
use crate::interface::commands::{Context, Error, lang, require_auth};
use crate::interface::embeds::{GREEN, RED, default_embed, error_embed, loading_embed, success_embed};
use crate::interface::views::{Selector, confirm_row};
use crate::strings::Lang;

/// How long the panel keeps reacting to presses.
const PANEL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(600);

/// Logs longer than this go out as a file instead of an embed.
const LOGS_EMBED_MAX_LINES: usize = 30;
const LOGS_EMBED_MAX_CHARS: usize = 2000;

/// Lines of logs shown inline on the panel.
const PANEL_LOGS_LINES: usize = 5;
const PANEL_LOGS_CHARS: usize = 512;

/// Manage your hosted applications.
#[poise::command(slash_command, user_cooldown = 5)]
pub async fn apps(ctx: Context<'_>) -> Result<(), Error> {
    let t = lang(ctx);
    let client = require_auth(ctx)?;

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

    let ctx_id = ctx.id();
    let single = apps.len() == 1;
    let mut selector = Selector::new(&apps, format!("{ctx_id}:apps"));

    enum State {
        Listing,
        Managing,
        ConfirmDelete,
    }

    let mut state;
    let mut panel: Option<Panel> = None;

    // With a single application the selector is skipped entirely.
    if single {
        let reply = ctx
            .send(
                poise::CreateReply::default()
                    .embed(loading_embed(&t.t("apps.loading")))
                    .ephemeral(true),
            )
            .await?;

        let fetched = Panel::fetch(&client, &apps[0].id).await?;
        reply
            .edit(
                ctx,
                poise::CreateReply::default()
                    .embed(fetched.embed(&t))
                    .components(fetched.components(&t, ctx_id, false)),
            )
            .await?;
        panel = Some(fetched);
        state = State::Managing;
    } else {
        ctx.send(
            poise::CreateReply::default()
                .embed(selector.embed(&t))
                .components(selector.components(&t))
                .ephemeral(true),
        )
        .await?;
        state = State::Listing;
    }

    while let Some(press) = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(PANEL_TIMEOUT)
        .filter(move |press| press.data.custom_id.starts_with(&format!("{ctx_id}:apps:")))
        .await
    {
        let action = press
            .data
            .custom_id
            .rsplit(':')
            .next()
            .unwrap_or_default()
            .to_string();

        match state {
            State::Listing => {
                if let Some(selected) = selector.handle(&press) {
                    press
                        .create_response(
                            ctx.serenity_context(),
                            CreateInteractionResponse::UpdateMessage(
                                CreateInteractionResponseMessage::new()
                                    .embed(loading_embed(&t.t("apps.loading")))
                                    .components(Vec::new()),
                            ),
                        )
                        .await?;

                    let fetched = Panel::fetch(&client, &selected.id).await?;
                    press
                        .edit_response(
                            ctx.serenity_context(),
                            EditInteractionResponse::new()
                                .embed(fetched.embed(&t))
                                .components(fetched.components(&t, ctx_id, true)),
                        )
                        .await?;
                    panel = Some(fetched);
                    state = State::Managing;
                } else {
                    press
                        .create_response(
                            ctx.serenity_context(),
                            CreateInteractionResponse::UpdateMessage(
                                CreateInteractionResponseMessage::new()
                                    .embed(selector.embed(&t))
                                    .components(selector.components(&t)),
                            ),
                        )
                        .await?;
                }
            }

            State::Managing => {
                let Some(current) = panel.as_ref() else {
                    continue;
                };
                let app_id = current.app.id.clone();

                match action.as_str() {
                    "start" | "restart" | "stop" => {
                        // Freeze the buttons while the action runs.
                        press
                            .create_response(
                                ctx.serenity_context(),
                                CreateInteractionResponse::UpdateMessage(
                                    CreateInteractionResponseMessage::new()
                                        .components(current.disabled_components(&t, ctx_id, !single)),
                                ),
                            )
                            .await?;

                        match action.as_str() {
                            "start" => client.start_app(&app_id).await?,
                            "restart" => client.restart_app(&app_id).await?,
                            _ => client.stop_app(&app_id).await?,
                        }

                        let fetched = Panel::fetch(&client, &app_id).await?;
                        press
                            .edit_response(
                                ctx.serenity_context(),
                                EditInteractionResponse::new()
                                    .embed(fetched.embed(&t))
                                    .components(fetched.components(&t, ctx_id, !single)),
                            )
                            .await?;
                        panel = Some(fetched);
                    }

                    "logs" => {
                        press
                            .create_response(
                                ctx.serenity_context(),
                                CreateInteractionResponse::Acknowledge,
                            )
                            .await?;

                        match client.get_app_logs(&app_id).await {
                            Ok(logs) => {
                                let followup = if logs.lines().count() > LOGS_EMBED_MAX_LINES
                                    || logs.len() > LOGS_EMBED_MAX_CHARS
                                {
                                    CreateInteractionResponseFollowup::new()
                                        .add_file(CreateAttachment::bytes(
                                            logs.into_bytes(),
                                            format!("logs-{}.txt", current.app.name),
                                        ))
                                        .ephemeral(true)
                                } else {
                                    CreateInteractionResponseFollowup::new()
                                        .embed(
                                            default_embed()
                                                .description(format!("```\n{logs}```")),
                                        )
                                        .ephemeral(true)
                                };
                                press
                                    .create_followup(ctx.serenity_context(), followup)
                                    .await?;
                            }
                            // The app produced no logs yet; just refresh.
                            Err(err) if err.is_not_found() => {}
                            Err(err) => return Err(err.into()),
                        }

                        let fetched = Panel::fetch(&client, &app_id).await?;
                        press
                            .edit_response(
                                ctx.serenity_context(),
                                EditInteractionResponse::new()
                                    .embed(fetched.embed(&t))
                                    .components(fetched.components(&t, ctx_id, !single)),
                            )
                            .await?;
                        panel = Some(fetched);
                    }

                    "backup" => {
                        press
                            .create_response(
                                ctx.serenity_context(),
                                CreateInteractionResponse::Acknowledge,
                            )
                            .await?;

                        let backup_url = client.get_backup_url(&app_id).await?;
                        press
                            .create_followup(
                                ctx.serenity_context(),
                                CreateInteractionResponseFollowup::new()
                                    .embed(default_embed().description(t.t("apps.backup.success")))
                                    .components(vec![CreateActionRow::Buttons(vec![
                                        CreateButton::new_link(backup_url)
                                            .label(t.t("apps.backup.download")),
                                    ])])
                                    .ephemeral(true),
                            )
                            .await?;
                    }

                    "delete" => {
                        press
                            .create_response(
                                ctx.serenity_context(),
                                CreateInteractionResponse::UpdateMessage(
                                    CreateInteractionResponseMessage::new()
                                        .embed(default_embed().colour(RED).description(
                                            t.tf("apps.delete.confirm", &[&current.app.name]),
                                        ))
                                        .components(vec![confirm_row(
                                            &t,
                                            format!("{ctx_id}:apps:confirm"),
                                            format!("{ctx_id}:apps:cancel"),
                                        )]),
                                ),
                            )
                            .await?;
                        state = State::ConfirmDelete;
                    }

                    "back" if !single => {
                        press
                            .create_response(
                                ctx.serenity_context(),
                                CreateInteractionResponse::UpdateMessage(
                                    CreateInteractionResponseMessage::new()
                                        .embed(selector.embed(&t))
                                        .components(selector.components(&t)),
                                ),
                            )
                            .await?;
                        panel = None;
                        state = State::Listing;
                    }

                    _ => {}
                }
            }

            State::ConfirmDelete => {
                let Some(current) = panel.as_ref() else {
                    continue;
                };

                match action.as_str() {
                    "confirm" => {
                        client.delete_app(&current.app.id).await?;
                        press
                            .create_response(
                                ctx.serenity_context(),
                                CreateInteractionResponse::UpdateMessage(
                                    CreateInteractionResponseMessage::new()
                                        .embed(success_embed(
                                            &t.tf("apps.delete.success", &[&current.app.name]),
                                        ))
                                        .components(Vec::new()),
                                ),
                            )
                            .await?;
                        return Ok(());
                    }
                    // Anything but an explicit confirm goes back to the
                    // panel without issuing the delete call.
                    _ => {
                        press
                            .create_response(
                                ctx.serenity_context(),
                                CreateInteractionResponse::UpdateMessage(
                                    CreateInteractionResponseMessage::new()
                                        .embed(current.embed(&t))
                                        .components(current.components(&t, ctx_id, !single)),
                                ),
                            )
                            .await?;
                        state = State::Managing;
                    }
                }
            }
        }
    }

    tracing::debug!("Application panel for interaction {ctx_id} expired");
    Ok(())
}

/// Everything the management panel shows for one application.
struct Panel {
    app: Application,
    status: ApplicationStatus,
    logs: Option<String>,
}

impl Panel {
    /// Fetch the application, its status and, when running, its logs. A
    /// 404 on the logs route only means nothing was logged yet.
    async fn fetch(client: &Client, id: &str) -> Result<Self, SquareError> {
        let app = client.get_app(id).await?;
        let status = client.get_app_status(id).await?;
        let logs = if status.running {
            match client.get_app_logs(id).await {
                Ok(logs) => Some(logs),
                Err(err) if err.is_not_found() => None,
                Err(err) => return Err(err),
            }
        } else {
            None
        };
        Ok(Self { app, status, logs })
    }

    fn embed(&self, t: &Lang<'_>) -> CreateEmbed {
        let status = &self.status;

        let mut embed = CreateEmbed::new()
            .title(self.app.name.clone())
            .colour(if status.running { GREEN } else { RED })
            .timestamp(serenity::Timestamp::now());

        if let Some(description) = &self.app.description {
            embed = embed.description(description.clone());
        }
        if let Some(domain) = &self.app.domain {
            embed = embed.url(format!("https://{domain}"));
        }
        if let Some(uptime) = status.uptime {
            embed = embed.field(
                t.t("apps.status.uptime"),
                format!("<t:{}:R>", uptime.timestamp()),
                true,
            );
        }

        embed = embed
            .field(t.t("apps.status.cpu"), status.cpu.clone(), true)
            .field(t.t("apps.status.ram"), status.ram.clone(), true)
            .field(t.t("apps.status.storage"), status.storage.clone(), true);

        // Keep the message short: skip figures that are meaningless while
        // the application is stopped.
        if status.running {
            embed = embed.field(
                t.t("apps.status.network_now"),
                NetworkUsage::parse(&status.network.now).to_string(),
                true,
            );
        }
        embed = embed.field(
            t.t("apps.status.network_total"),
            NetworkUsage::parse(&status.network.total).to_string(),
            true,
        );
        if status.requests > 0 {
            embed = embed.field(
                t.t("apps.status.requests"),
                status.requests.to_string(),
                true,
            );
        }

        if status.running {
            if let Some(logs) = self.logs.as_deref().filter(|l| !l.is_empty()) {
                embed = embed.field(
                    t.t("apps.last_logs"),
                    format!("```\n{}```", tail_logs(logs)),
                    false,
                );
            }
        }

        embed
    }

    fn components(&self, t: &Lang<'_>, ctx_id: u64, has_back: bool) -> Vec<CreateActionRow> {
        self.build_components(t, ctx_id, has_back, false)
    }

    fn disabled_components(
        &self,
        t: &Lang<'_>,
        ctx_id: u64,
        has_back: bool,
    ) -> Vec<CreateActionRow> {
        self.build_components(t, ctx_id, has_back, true)
    }

    fn build_components(
        &self,
        t: &Lang<'_>,
        ctx_id: u64,
        has_back: bool,
        all_disabled: bool,
    ) -> Vec<CreateActionRow> {
        let running = self.status.running;

        let mut rows = vec![
            CreateActionRow::Buttons(vec![
                CreateButton::new(format!("{ctx_id}:apps:start"))
                    .emoji('▶')
                    .style(ButtonStyle::Success)
                    .disabled(all_disabled || running),
                CreateButton::new(format!("{ctx_id}:apps:restart"))
                    .emoji('🔄')
                    .style(ButtonStyle::Primary)
                    .disabled(all_disabled || !running),
                CreateButton::new(format!("{ctx_id}:apps:stop"))
                    .emoji('⏹')
                    .style(ButtonStyle::Danger)
                    .disabled(all_disabled || !running),
            ]),
            CreateActionRow::Buttons(vec![
                CreateButton::new(format!("{ctx_id}:apps:logs"))
                    .emoji('📄')
                    .label(t.t("apps.buttons.logs"))
                    .style(ButtonStyle::Secondary)
                    .disabled(all_disabled || !running),
                CreateButton::new(format!("{ctx_id}:apps:backup"))
                    .emoji('☁')
                    .label(t.t("apps.buttons.backup"))
                    .style(ButtonStyle::Secondary)
                    .disabled(all_disabled),
                CreateButton::new(format!("{ctx_id}:apps:delete"))
                    .emoji('🗑')
                    .label(t.t("apps.buttons.delete"))
                    .style(ButtonStyle::Danger)
                    .disabled(all_disabled),
            ]),
        ];

        if has_back {
            rows.push(CreateActionRow::Buttons(vec![
                CreateButton::new(format!("{ctx_id}:apps:back"))
                    .emoji('◀')
                    .label(t.t("common.back"))
                    .style(ButtonStyle::Secondary)
                    .disabled(all_disabled),
            ]));
        }

        rows
    }
}

/// Last few log lines, bounded to what fits in an embed field.
fn tail_logs(logs: &str) -> String {
    let lines: Vec<&str> = logs.lines().collect();
    let tail = &lines[lines.len().saturating_sub(PANEL_LOGS_LINES)..];

    let mut out = String::new();
    for line in tail {
        if out.len() + line.len() + 1 > PANEL_LOGS_CHARS {
            break;
        }
        out.push_str(line);
        out.push('\n');
    }

    if out.is_empty() {
        // A single oversized line: hard-truncate it.
        if let Some(last) = tail.last() {
            out = last.chars().take(PANEL_LOGS_CHARS).collect();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_logs_keeps_last_lines() {
        let logs = "one\ntwo\nthree\nfour\nfive\nsix\nseven";
        let tail = tail_logs(logs);
        assert!(!tail.contains("one"));
        assert!(!tail.contains("two"));
        assert!(tail.contains("three"));
        assert!(tail.contains("seven"));
    }

    #[test]
    fn tail_logs_respects_char_budget() {
        let long_line = "x".repeat(400);
        let logs = format!("{long_line}\n{long_line}\nshort");
        let tail = tail_logs(&logs);
        assert!(tail.len() <= PANEL_LOGS_CHARS);
        assert!(tail.contains(&long_line));
    }

    #[test]
    fn tail_logs_truncates_single_oversized_line() {
        let logs = "y".repeat(2000);
        let tail = tail_logs(&logs);
        assert_eq!(tail.len(), PANEL_LOGS_CHARS);
    }
}

//! # Interaction Views
//!
//! Component-based UI pieces: the paginated application selector and the
//! confirm/cancel row used by destructive prompts. The stateful interaction
//! loops live with their commands; this module owns rendering and the page
//! state transitions.

use poise::serenity_prelude as serenity;
use serenity::{
    ButtonStyle, ComponentInteraction, ComponentInteractionDataKind, CreateActionRow,
    CreateButton, CreateEmbed, CreateEmbedFooter, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption,
};

use crate::application::pagination::{PAGE_SIZE, Pager};
use crate::infrastructure::square::models::PartialApplication;
use crate::interface::commands::{Context, Error};
use crate::interface::embeds::{default_embed, loading_embed};
use crate::strings::Lang;

/// How long a selector waits for input before going inert.
pub const SELECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Paginated application selector. When the list exceeds the select menu
/// limit, navigation buttons are added; with a single page they are omitted.
pub struct Selector<'a> {
    apps: &'a [PartialApplication],
    pub pager: Pager,
    prefix: String,
}

impl<'a> Selector<'a> {
    pub fn new(apps: &'a [PartialApplication], prefix: String) -> Self {
        Self {
            apps,
            pager: Pager::new(apps.len(), PAGE_SIZE, 1),
            prefix,
        }
    }

    fn id(&self, suffix: &str) -> String {
        format!("{}:{suffix}", self.prefix)
    }

    /// Applications on the current page.
    pub fn page_apps(&self) -> &'a [PartialApplication] {
        &self.apps[self.pager.bounds()]
    }

    pub fn embed(&self, t: &Lang<'_>) -> CreateEmbed {
        default_embed()
            .title(t.t("apps.select_app.title"))
            .description(t.t("apps.select_app.description"))
            .footer(CreateEmbedFooter::new(t.tf(
                "apps.select_app.footer",
                &[&self.pager.current(), &self.pager.total_pages()],
            )))
    }

    pub fn components(&self, t: &Lang<'_>) -> Vec<CreateActionRow> {
        let options = self
            .page_apps()
            .iter()
            .map(|app| {
                let mut option = CreateSelectMenuOption::new(app.name.clone(), app.id.clone())
                    .emoji(if app.is_website { '🌐' } else { '🖥' });
                if let Some(description) = &app.description {
                    option = option.description(description.clone());
                }
                option
            })
            .collect();

        let select = CreateSelectMenu::new(
            self.id("select"),
            CreateSelectMenuKind::String { options },
        )
        .placeholder(t.t("apps.select_app.menu.label"));

        let mut rows = vec![CreateActionRow::SelectMenu(select)];

        if !self.pager.has_single_page() {
            rows.push(CreateActionRow::Buttons(vec![
                CreateButton::new(self.id("prev"))
                    .emoji('⬅')
                    .style(ButtonStyle::Secondary)
                    .disabled(self.pager.is_first()),
                CreateButton::new(self.id("next"))
                    .emoji('➡')
                    .style(ButtonStyle::Secondary)
                    .disabled(self.pager.is_last()),
            ]));
        }

        rows
    }

    /// Apply a press belonging to this selector. Navigation presses mutate
    /// the page state and return `None`; a menu choice returns the chosen
    /// application.
    pub fn handle(&mut self, press: &ComponentInteraction) -> Option<PartialApplication> {
        let prefix = format!("{}:", self.prefix);
        match press.data.custom_id.strip_prefix(&prefix)? {
            "prev" => {
                self.pager.prev();
                None
            }
            "next" => {
                self.pager.next();
                None
            }
            "select" => {
                let ComponentInteractionDataKind::StringSelect { values } = &press.data.kind
                else {
                    return None;
                };
                let id = values.first()?;
                self.page_apps().iter().find(|app| &app.id == id).cloned()
            }
            _ => None,
        }
    }
}

/// Confirm/cancel button row for destructive prompts.
pub fn confirm_row(t: &Lang<'_>, confirm_id: String, cancel_id: String) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(confirm_id)
            .label(t.t("common.confirm"))
            .style(ButtonStyle::Success),
        CreateButton::new(cancel_id)
            .label(t.t("common.cancel"))
            .style(ButtonStyle::Danger),
    ])
}

/// Result of [`pick_application`]. `press` carries the interaction that made
/// the choice when a selector was shown, so the caller can keep editing the
/// same message.
pub struct Pick {
    pub app: PartialApplication,
    pub press: Option<ComponentInteraction>,
}

/// Let the user pick one of their applications. A single application is
/// returned straight away without rendering anything; otherwise a paginated
/// selector is shown. Returns `None` when the selector times out.
pub async fn pick_application(
    ctx: Context<'_>,
    t: &Lang<'_>,
    apps: &[PartialApplication],
) -> Result<Option<Pick>, Error> {
    if let [only] = apps {
        return Ok(Some(Pick {
            app: only.clone(),
            press: None,
        }));
    }

    let ctx_id = ctx.id();
    let mut selector = Selector::new(apps, format!("{ctx_id}:pick"));

    ctx.send(
        poise::CreateReply::default()
            .embed(selector.embed(t))
            .components(selector.components(t))
            .ephemeral(true),
    )
    .await?;

    while let Some(press) = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(SELECT_TIMEOUT)
        .filter(move |press| press.data.custom_id.starts_with(&format!("{ctx_id}:pick:")))
        .await
    {
        if let Some(app) = selector.handle(&press) {
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
            return Ok(Some(Pick {
                app,
                press: Some(press),
            }));
        }

        press
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(selector.embed(t))
                        .components(selector.components(t)),
                ),
            )
            .await?;
    }

    tracing::debug!("Application selector for interaction {ctx_id} expired");
    Ok(None)
}

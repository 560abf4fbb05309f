//! # Slash Commands
//!
//! Command list, shared context types, the authentication gate and the
//! global error handler. Individual handlers live in the submodules.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::application::sessions::SessionStore;
use crate::domain::config::AppConfig;
use crate::domain::errors::CommandError;
use crate::infrastructure::square;
use crate::infrastructure::square::ValidationError;
use crate::infrastructure::square::config_file::ConfigError;
use crate::interface::embeds::error_embed;
use crate::strings::{DEFAULT_LOCALE, Lang, Translator};

pub mod apps;
pub mod commit;
pub mod host;
pub mod login;
pub mod misc;
pub mod up;

/// Data shared with every command invocation.
pub struct Data {
    pub config: AppConfig,
    pub translator: Translator,
    pub sessions: SessionStore,
    /// Registered command mentions, keyed by command name. Filled after the
    /// guild sync so messages can link commands as `</name:id>`.
    pub mentions: BTreeMap<String, String>,
}

impl Data {
    /// Clickable mention for a registered command, or a plain `/name` if the
    /// command is somehow not registered.
    pub fn mention(&self, name: &str) -> String {
        self.mentions
            .get(name)
            .cloned()
            .unwrap_or_else(|| format!("/{name}"))
    }
}

pub type Error = CommandError;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Every command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        misc::ping(),
        misc::help(),
        misc::statistics(),
        login::login(),
        apps::apps(),
        up::up(),
        commit::commit(),
        host::host(),
    ]
}

/// Fill the per-command localization maps from the locale catalogs, so
/// Discord shows translated names and descriptions. Missing keys are left
/// untranslated.
pub fn localize(commands: &mut [poise::Command<Data, Error>], translator: &Translator) {
    for command in commands {
        for locale in translator.locales() {
            if locale == DEFAULT_LOCALE {
                continue;
            }
            if let Ok(name) = translator.translate(locale, &format!("{}.name", command.name), &[])
            {
                command
                    .name_localizations
                    .insert(locale.to_string(), name);
            }
            if let Ok(description) =
                translator.translate(locale, &format!("{}.description", command.name), &[])
            {
                command
                    .description_localizations
                    .insert(locale.to_string(), description);
            }
        }
    }
}

/// Translator handle for the invoking user's locale.
pub fn lang(ctx: Context<'_>) -> Lang<'_> {
    ctx.data()
        .translator
        .lang(ctx.locale().unwrap_or(DEFAULT_LOCALE))
}

/// Authentication gate. Returns an API client bound to the user's stored
/// key, or [`CommandError::Unauthenticated`] when there is no session.
///
/// This is the only place outside `/login` that touches the raw API key;
/// handlers only ever see the ready-made client. Whether a stored key is
/// still valid is left to the remote API to decide.
pub fn require_auth(ctx: Context<'_>) -> Result<square::Client, CommandError> {
    let data = ctx.data();
    match data.sessions.get(ctx.author().id.get()) {
        Some(api_key) => Ok(square::Client::new(
            Some(api_key),
            data.config.square.base_url.clone(),
        )),
        None => Err(CommandError::Unauthenticated),
    }
}

/// Global error handler. Maps every [`CommandError`] onto a localized
/// message; anything unexpected is logged server-side and reported with a
/// generic message. Never panics, so one failing interaction cannot take
/// down the rest.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let message = command_error_message(&error, ctx);
            send_error(ctx, &message).await;
        }
        poise::FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let t = lang(ctx);
            let remaining = format_duration(remaining_cooldown);
            send_error(ctx, &t.tf("errors.on_cooldown", &[&remaining])).await;
        }
        error => {
            if let Err(err) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {err}");
            }
        }
    }
}

fn command_error_message(error: &CommandError, ctx: Context<'_>) -> String {
    let t = lang(ctx);
    let data = ctx.data();

    match error {
        CommandError::Unauthenticated => {
            t.tf("errors.unauthenticated", &[&data.mention("login")])
        }
        CommandError::Validation(err) => validation_message(&t, err),
        CommandError::Square(err) if err.is_authentication_failure() => {
            // The stored key no longer works; drop it so the user is sent
            // back through /login instead of hitting the same wall again.
            data.sessions.clear(ctx.author().id.get());
            t.tf("errors.unauthenticated", &[&data.mention("login")])
        }
        CommandError::Square(err) => match err.code() {
            Some(code) => t.tf("errors.api_error", &[&code]),
            None => {
                tracing::error!(
                    "Square API request failed in command {:?}: {err}",
                    ctx.command().qualified_name
                );
                t.tf("errors.unexpected_error", &[&err])
            }
        },
        CommandError::Discord(_) | CommandError::Other(_) => {
            tracing::error!(
                "Error in command {:?}: {error:?}",
                ctx.command().qualified_name
            );
            t.tf("errors.unexpected_error", &[&error])
        }
    }
}

fn validation_message(t: &Lang<'_>, error: &ValidationError) -> String {
    match error {
        ValidationError::InvalidFormat => t.t("up.invalid_format"),
        ValidationError::MissingConfig => t.t("up.missing_config"),
        ValidationError::Config(ConfigError::MissingKey(key)) => t.tf("up.missing_key", &[key]),
        ValidationError::Config(ConfigError::InvalidMemory(value)) => {
            t.tf("up.invalid_memory", &[value])
        }
        ValidationError::Config(ConfigError::InvalidVersion(value)) => {
            t.tf("up.invalid_version", &[value])
        }
    }
}

/// Deliver an error message to the user. The interaction may already have
/// expired; in that case the failure is logged and swallowed.
async fn send_error(ctx: Context<'_>, message: &str) {
    let reply = poise::CreateReply::default()
        .embed(error_embed(message))
        .ephemeral(true);

    if let Err(err) = ctx.send(reply).await {
        tracing::warn!("Could not deliver error response: {err}");
    }
}

/// Render a duration as `1h 2m 3s`, dropping zero components.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs().max(1);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_drops_zero_components() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn format_duration_rounds_zero_up() {
        assert_eq!(format_duration(Duration::from_millis(200)), "1s");
    }
}

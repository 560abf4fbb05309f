//! # Embed Helpers
//!
//! Default embeds for bot messages. Every reply goes through one of these so
//! the bot keeps a consistent look.

use poise::serenity_prelude::{Colour, CreateEmbed};

/// Brand color for regular messages.
pub const DEFAULT_COLOR: Colour = Colour(0x2563EB);
/// Running / success.
pub const GREEN: Colour = Colour(0x57F287);
/// Stopped / error.
pub const RED: Colour = Colour(0xED4245);

/// Default embed for bot messages.
pub fn default_embed() -> CreateEmbed {
    CreateEmbed::new().colour(DEFAULT_COLOR)
}

/// Error messages default embed.
pub fn error_embed(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .colour(RED)
        .description(format!("❌ **|** {message}"))
}

/// Embed for a successful operation.
pub fn success_embed(message: &str) -> CreateEmbed {
    default_embed().description(format!("✅ **|** {message}"))
}

/// Embed shown while a slow operation is in flight.
pub fn loading_embed(message: &str) -> CreateEmbed {
    default_embed().description(format!("⌛ **|** {message}"))
}

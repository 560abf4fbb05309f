//! # Interface Layer
//!
//! Discord-facing code: slash command handlers, embed helpers and component
//! views.

pub mod commands;
pub mod embeds;
pub mod views;

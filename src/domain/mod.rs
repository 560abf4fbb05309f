//! # Domain Layer
//!
//! Configuration types and the command error taxonomy shared by the rest of
//! the bot.

pub mod config;
pub mod errors;

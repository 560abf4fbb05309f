//! # Strings Module
//!
//! Centralizes user-facing text. All messages live in per-locale YAML
//! catalogs loaded at startup; the [`translator::Translator`] resolves
//! dotted keys and substitutes positional parameters.

pub mod translator;

pub use translator::{DEFAULT_LOCALE, Lang, TranslateError, Translator};

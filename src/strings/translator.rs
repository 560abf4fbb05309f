//! # Localization Renderer
//!
//! Loads one YAML catalog per Discord locale from the locales directory and
//! renders messages by dotted key with positional `{0}`/`{1}` substitution.
//! Catalogs are read once at startup and never modified afterwards.

use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_yaml::Value;

/// Locale used when the requested one has no catalog.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Locales Discord accepts for command localization.
const DISCORD_LOCALES: &[&str] = &[
    "id", "da", "de", "en-GB", "en-US", "es-ES", "es-419", "fr", "hr", "it", "lt", "hu", "nl",
    "no", "pl", "pt-BR", "ro", "fi", "sv-SE", "vi", "tr", "cs", "el", "bg", "ru", "uk", "hi",
    "th", "zh-CN", "ja", "zh-TW", "ko",
];

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("'{locale}.{prefix}' has no key '{key}'")]
    MissingKey {
        locale: String,
        prefix: String,
        key: String,
    },
    #[error("'{0}' does not resolve to a string")]
    NotAString(String),
}

/// The bot's translator. One catalog per locale, keyed by locale name.
#[derive(Debug, Default)]
pub struct Translator {
    catalogs: HashMap<String, Value>,
}

impl Translator {
    /// Load every `<locale>.yaml` file from `path`.
    ///
    /// Locale names are validated against the set Discord accepts, so a
    /// mistyped file name fails fast instead of being silently ignored at
    /// command registration.
    pub fn load(path: &Path) -> Result<Self> {
        let mut catalogs = HashMap::new();

        for entry in fs::read_dir(path)
            .with_context(|| format!("failed to read locales directory {}", path.display()))?
        {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().into_owned();

            let Some(locale) = file_name
                .strip_suffix(".yaml")
                .or_else(|| file_name.strip_suffix(".yml"))
            else {
                continue;
            };

            if !DISCORD_LOCALES.contains(&locale) {
                bail!("'{locale}' is not a valid Discord locale");
            }

            let content = fs::read_to_string(entry.path())
                .with_context(|| format!("failed to read locale file {file_name}"))?;
            let catalog: Value = serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse locale file {file_name}"))?;

            catalogs.insert(locale.to_string(), catalog);
        }

        if !catalogs.contains_key(DEFAULT_LOCALE) {
            bail!("missing catalog for default locale {DEFAULT_LOCALE}");
        }

        tracing::info!("Loaded {} locale catalogs", catalogs.len());

        Ok(Self { catalogs })
    }

    /// Build a translator directly from parsed catalogs.
    #[cfg(test)]
    pub fn from_catalogs(catalogs: HashMap<String, Value>) -> Self {
        Self { catalogs }
    }

    /// Locales with a loaded catalog.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    /// Resolve `key` (dotted path) in `locale` and substitute `args` in
    /// template order. Unknown locales fall back to [`DEFAULT_LOCALE`].
    pub fn translate(
        &self,
        locale: &str,
        key: &str,
        args: &[&(dyn Display + Send + Sync)],
    ) -> Result<String, TranslateError> {
        let locale = if self.catalogs.contains_key(locale) {
            locale
        } else {
            DEFAULT_LOCALE
        };

        let mut node = &self.catalogs[locale];
        let mut walked: Vec<&str> = Vec::new();

        for part in key.split('.') {
            match node.get(part) {
                Some(next) => {
                    walked.push(part);
                    node = next;
                }
                None => {
                    return Err(TranslateError::MissingKey {
                        locale: locale.to_string(),
                        prefix: walked.join("."),
                        key: part.to_string(),
                    });
                }
            }
        }

        let template = node
            .as_str()
            .ok_or_else(|| TranslateError::NotAString(key.to_string()))?;

        Ok(substitute(template, args))
    }

    /// A handle bound to one locale, for per-interaction use.
    pub fn lang(&self, locale: &str) -> Lang<'_> {
        Lang {
            translator: self,
            locale: locale.to_string(),
        }
    }
}

/// Replace `{0}`, `{1}`, ... with the stringified arguments.
fn substitute(template: &str, args: &[&(dyn Display + Send + Sync)]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), &arg.to_string());
    }
    out
}

/// Translator handle for a single interaction's locale.
///
/// Lookup failures are logged and degrade to the key itself so a missing
/// translation never takes a command down.
pub struct Lang<'a> {
    translator: &'a Translator,
    locale: String,
}

impl Lang<'_> {
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Translate a key with no parameters.
    pub fn t(&self, key: &str) -> String {
        self.tf(key, &[])
    }

    /// Translate a key with positional parameters.
    pub fn tf(&self, key: &str, args: &[&(dyn Display + Send + Sync)]) -> String {
        match self.translator.translate(&self.locale, key, args) {
            Ok(s) => s,
            Err(err) => {
                tracing::error!("Unable to translate '{}.{key}': {err}", self.locale);
                key.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Translator {
        let pt: Value = serde_yaml::from_str(
            "squarecloud: Nuvem Quadrada\nhello: \"Olá, {0}\"\nkey-1:\n  key-2:\n    key-3: Valor\n",
        )
        .unwrap();
        let en: Value = serde_yaml::from_str(
            "squarecloud: Square Cloud\nhello: \"Hello, {0}\"\nkey-1:\n  key-2:\n    key-3: Value\n",
        )
        .unwrap();

        let mut catalogs = HashMap::new();
        catalogs.insert("pt-BR".to_string(), pt);
        catalogs.insert("en-US".to_string(), en);
        Translator::from_catalogs(catalogs)
    }

    #[test]
    fn translate_plain_and_nested() {
        let t = fixture();
        assert_eq!(
            t.translate("pt-BR", "squarecloud", &[]).unwrap(),
            "Nuvem Quadrada"
        );
        assert_eq!(
            t.translate("pt-BR", "key-1.key-2.key-3", &[]).unwrap(),
            "Valor"
        );
        assert_eq!(
            t.translate("en-US", "squarecloud", &[]).unwrap(),
            "Square Cloud"
        );
        assert_eq!(
            t.translate("en-US", "key-1.key-2.key-3", &[]).unwrap(),
            "Value"
        );
    }

    #[test]
    fn translate_formatted() {
        let t = fixture();
        assert_eq!(
            t.translate("pt-BR", "hello", &[&"Mundo"]).unwrap(),
            "Olá, Mundo"
        );
        assert_eq!(
            t.translate("en-US", "hello", &[&"World"]).unwrap(),
            "Hello, World"
        );
    }

    #[test]
    fn unknown_locale_falls_back_to_default() {
        let t = fixture();
        assert_eq!(
            t.translate("fr", "squarecloud", &[]).unwrap(),
            "Square Cloud"
        );
    }

    #[test]
    fn translate_failures() {
        let t = fixture();

        // Incomplete path resolves to a mapping, not a string.
        assert!(matches!(
            t.translate("pt-BR", "key-1.key-2", &[]),
            Err(TranslateError::NotAString(_))
        ));

        // Key does not exist.
        assert!(matches!(
            t.translate("pt-BR", "key-1.key-2.key-4", &[]),
            Err(TranslateError::MissingKey { .. })
        ));
    }

    #[test]
    fn lang_degrades_to_key_on_missing_translation() {
        let t = fixture();
        let lang = t.lang("en-US");
        assert_eq!(lang.t("nope.nothing"), "nope.nothing");
    }
}

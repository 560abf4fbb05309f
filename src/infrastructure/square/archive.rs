//! # Upload Archives
//!
//! In-memory files destined for upload or commit, validation of upload
//! archives, and packaging of the bot's own directory for self-hosting.
//!
//! Validation runs entirely before any network call: a payload that is not a
//! well-formed zip, lacks the configuration entry, or carries an incomplete
//! configuration is rejected with a specific reason instead of being
//! forwarded to the API.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use zip::ZipArchive;
use zip::write::{FileOptions, ZipWriter};

use super::config_file::{CONFIG_FILE_NAMES, ConfigError, ConfigFile};

/// Directories never included when packaging the bot's own tree.
const PACKAGE_SKIP: &[&str] = &[".git", "target", "data", "node_modules"];

/// A file that will be sent in an upload or commit.
#[derive(Debug, Clone)]
pub struct File {
    pub filename: String,
    pub bytes: Bytes,
}

impl File {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Whether the file name carries a `.zip` extension.
    pub fn has_zip_extension(&self) -> bool {
        Path::new(&self.filename)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    }
}

/// Why an upload payload was rejected before reaching the network.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Wrong extension, or the payload does not parse as a zip archive.
    #[error("file is not a zip archive")]
    InvalidFormat,

    /// The archive carries no `squarecloud.app` / `squarecloud.config`
    /// entry.
    #[error("archive has no configuration file")]
    MissingConfig,

    /// The configuration entry exists but is incomplete or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Validate an upload payload and return its parsed configuration.
pub fn validate_upload(file: &File) -> Result<ConfigFile, ValidationError> {
    if !file.has_zip_extension() {
        return Err(ValidationError::InvalidFormat);
    }

    let mut archive = ZipArchive::new(Cursor::new(file.bytes.as_ref()))
        .map_err(|_| ValidationError::InvalidFormat)?;

    let config_entry = archive
        .file_names()
        .find(|name| CONFIG_FILE_NAMES.contains(name))
        .map(str::to_string)
        .ok_or(ValidationError::MissingConfig)?;

    let mut raw = String::new();
    archive
        .by_name(&config_entry)
        .map_err(|_| ValidationError::MissingConfig)?
        .read_to_string(&mut raw)
        .map_err(|_| ValidationError::InvalidFormat)?;

    Ok(raw.parse()?)
}

/// Package a directory into an in-memory zip, for the self-host command.
///
/// Version control metadata, build output and the bot's own data directory
/// are left out. The result still goes through [`validate_upload`] before
/// any network call.
pub fn package_directory(root: &Path) -> Result<File> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    add_directory(&mut writer, root, "")?;

    let cursor = writer.finish().context("failed to finish zip archive")?;

    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "squarebot".to_string());

    Ok(File::new(format!("{name}.zip"), cursor.into_inner()))
}

fn add_directory(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    dir: &Path,
    prefix: &str,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if path.is_dir() {
            if PACKAGE_SKIP.contains(&name.as_str()) {
                continue;
            }
            add_directory(writer, &path, &format!("{prefix}{name}/"))?;
        } else {
            let data = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            writer.start_file(format!("{prefix}{name}"), FileOptions::default())?;
            writer.write_all(&data)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = "MAIN=index.js\nMEMORY=256\nVERSION=recommended\nDISPLAY_NAME=my-bot\n";

    fn zip_with(entries: &[(&str, &str)]) -> Bytes {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner().into()
    }

    #[test]
    fn non_zip_extension_is_rejected() {
        let file = File::new("app.tar.gz", zip_with(&[("squarecloud.config", VALID_CONFIG)]));
        assert!(matches!(
            validate_upload(&file),
            Err(ValidationError::InvalidFormat)
        ));
    }

    #[test]
    fn malformed_archive_is_rejected() {
        let file = File::new("app.zip", Bytes::from_static(b"this is not a zip"));
        assert!(matches!(
            validate_upload(&file),
            Err(ValidationError::InvalidFormat)
        ));
    }

    #[test]
    fn archive_without_config_is_rejected() {
        let file = File::new("app.zip", zip_with(&[("index.js", "console.log('hi')")]));
        assert!(matches!(
            validate_upload(&file),
            Err(ValidationError::MissingConfig)
        ));
    }

    #[test]
    fn config_missing_mandatory_key_names_it() {
        let file = File::new(
            "app.zip",
            zip_with(&[(
                "squarecloud.config",
                "MAIN=index.js\nMEMORY=256\nVERSION=recommended\n",
            )]),
        );
        match validate_upload(&file) {
            Err(ValidationError::Config(ConfigError::MissingKey(key))) => {
                assert_eq!(key, "DISPLAY_NAME");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn valid_archive_yields_parsed_config() {
        let file = File::new(
            "app.zip",
            zip_with(&[("index.js", "..."), ("squarecloud.config", VALID_CONFIG)]),
        );
        let config = validate_upload(&file).unwrap();
        assert_eq!(config.display_name, "my-bot");
        assert_eq!(config.memory, 256);
    }

    #[test]
    fn squarecloud_app_name_is_accepted_too() {
        let file = File::new("app.zip", zip_with(&[("squarecloud.app", VALID_CONFIG)]));
        assert!(validate_upload(&file).is_ok());
    }

    #[test]
    fn package_directory_skips_junk_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("squarecloud.config"), VALID_CONFIG).unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        std::fs::create_dir(dir.path().join("target")).unwrap();
        std::fs::write(dir.path().join("target").join("junk.o"), "junk").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("lib.rs"), "").unwrap();

        let file = package_directory(dir.path()).unwrap();
        assert!(file.has_zip_extension());

        let mut archive = ZipArchive::new(Cursor::new(file.bytes.as_ref())).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"squarecloud.config".to_string()));
        assert!(names.contains(&"src/lib.rs".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("target/")));
        assert!(archive.by_name("main.rs").is_ok());

        assert!(validate_upload(&file).is_ok());
    }

    #[test]
    fn package_directory_without_config_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();

        let file = package_directory(dir.path()).unwrap();
        assert!(matches!(
            validate_upload(&file),
            Err(ValidationError::MissingConfig)
        ));
    }
}

//! Contains the configuration of the assembler and the document store.
//!
//! The settings are read from a YAML document like this one:
//!
//! ```yaml
//! assembler:
//!     block_tags: [ "blockTag" ]
//!     verify_channels: true
//! store:
//!     name: "lectio"
//! ```
//!
//! All keys are optional and fall back to their defaults. The current [Settings] are kept in an
//! `ArcSwap` so that a new configuration can be loaded while documents are being built or
//! queried. Note that a handle obtained via [Config::current] is a snapshot and will not be
//! updated once a new configuration has been loaded. Therefore it shouldn't be kept around for
//! long.
//!
//! # Example
//!
//! ```
//! # use lectio::config::Config;
//! let config = Config::new("settings.yml");
//! config.load_from_string("
//! assembler:
//!     block_tags: [ 'blockTag', 'paraTag' ]
//! ").unwrap();
//!
//! let settings = config.current();
//! assert_eq!(settings.assembler.block_tags, vec!["blockTag", "paraTag"]);
//! assert_eq!(settings.assembler.verify_channels, true);
//! assert_eq!(settings.store.name, "lectio");
//! ```
use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwap;
use yaml_rust::{Yaml, YamlLoader};

/// Contains the first label component which marks a block boundary by default.
pub const DEFAULT_BLOCK_TAG: &str = "blockTag";

/// Contains the default name of a document store.
pub const DEFAULT_STORE_NAME: &str = "lectio";

/// Contains the settings used by the [BlockAssembler](crate::succinct::assembler::BlockAssembler).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AssemblerSettings {
    /// Lists the first label components of scopes which start and end a block.
    pub block_tags: Vec<String>,

    /// Determines if each encoded channel is re-scanned to verify its header.
    pub verify_channels: bool,
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        AssemblerSettings {
            block_tags: vec![DEFAULT_BLOCK_TAG.to_owned()],
            verify_channels: true,
        }
    }
}

/// Contains the settings used by the [DocumentStore](crate::store::DocumentStore).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StoreSettings {
    /// Contains the name of the store as shown in log messages.
    pub name: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: DEFAULT_STORE_NAME.to_owned(),
        }
    }
}

/// Represents a complete set of settings.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Settings {
    /// The settings of the block assembler.
    pub assembler: AssemblerSettings,

    /// The settings of the document store.
    pub store: StoreSettings,
}

impl Settings {
    /// Parses settings from the given YAML document.
    ///
    /// An empty document yields the default settings.
    pub fn parse(data: &str) -> anyhow::Result<Settings> {
        let docs = YamlLoader::load_from_str(data).context("Cannot parse settings")?;

        let mut settings = Settings::default();
        let root = match docs.first() {
            Some(Yaml::Hash(_)) => &docs[0],
            Some(Yaml::Null) | None => return Ok(settings),
            Some(_) => return Err(anyhow::anyhow!("The settings must be a YAML object.")),
        };

        let assembler = section(root, "assembler")?;
        match &assembler["block_tags"] {
            Yaml::BadValue => (),
            Yaml::Array(tags) => {
                settings.assembler.block_tags = tags
                    .iter()
                    .map(|tag| {
                        tag.as_str().map(|tag| tag.to_owned()).ok_or_else(|| {
                            anyhow::anyhow!("'assembler.block_tags' must only contain strings.")
                        })
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
            }
            Yaml::String(tag) => settings.assembler.block_tags = vec![tag.clone()],
            _ => {
                return Err(anyhow::anyhow!(
                    "'assembler.block_tags' must be a list of strings."
                ))
            }
        }
        if settings.assembler.block_tags.is_empty() {
            return Err(anyhow::anyhow!(
                "'assembler.block_tags' must contain at least one tag."
            ));
        }

        match &assembler["verify_channels"] {
            Yaml::BadValue => (),
            Yaml::Boolean(verify) => settings.assembler.verify_channels = *verify,
            _ => {
                return Err(anyhow::anyhow!(
                    "'assembler.verify_channels' must be a boolean."
                ))
            }
        }

        match &section(root, "store")?["name"] {
            Yaml::BadValue => (),
            Yaml::String(name) => settings.store.name = name.clone(),
            _ => return Err(anyhow::anyhow!("'store.name' must be a string.")),
        }

        Ok(settings)
    }
}

/// Returns the given section of the settings.
///
/// A missing or empty section is accepted, all its keys then fall back to their defaults.
fn section<'a>(root: &'a Yaml, name: &str) -> anyhow::Result<&'a Yaml> {
    match &root[name] {
        section @ (Yaml::Hash(_) | Yaml::Null | Yaml::BadValue) => Ok(section),
        _ => Err(anyhow::anyhow!("'{}' must be a YAML object.", name)),
    }
}

/// Provides access to the current settings.
pub struct Config {
    filename: String,
    settings: ArcSwap<Settings>,
}

impl Config {
    /// Creates a new config which reads the given file once [load](Config::load) is invoked.
    ///
    /// Until then, the default settings are active.
    pub fn new(file: &str) -> Self {
        Config {
            filename: file.to_owned(),
            settings: ArcSwap::new(Arc::new(Settings::default())),
        }
    }

    /// Creates a config which carries the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        Config {
            filename: String::new(),
            settings: ArcSwap::new(Arc::new(settings)),
        }
    }

    /// Obtains a snapshot of the currently active settings.
    pub fn current(&self) -> Arc<Settings> {
        self.settings.load_full()
    }

    /// Reads the underlying file and activates its settings.
    ///
    /// If the file cannot be read or parsed, an error is returned and the previous settings
    /// remain active.
    pub fn load(&self) -> anyhow::Result<()> {
        log::info!("Loading config file {}...", &self.filename);

        let data = std::fs::read_to_string(&self.filename)
            .with_context(|| format!("Cannot load config file {}", &self.filename))?;

        self.load_from_string(data.as_str())
    }

    /// Parses the given string and activates its settings.
    ///
    /// This is intended to be used in test environments where we cannot / do not want to load
    /// a config file from disk. If the data cannot be parsed, the previous settings remain active.
    pub fn load_from_string(&self, data: &str) -> anyhow::Result<()> {
        let settings = Settings::parse(data)
            .with_context(|| format!("Cannot parse config file {}", &self.filename))?;

        log::debug!("Activating settings: {:?}", settings);
        self.settings.store(Arc::new(settings));

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::with_settings(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, Settings, DEFAULT_BLOCK_TAG};

    #[test]
    fn missing_keys_use_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());

        let settings = Settings::parse("store:\n    name: 'bibles'").unwrap();
        assert_eq!(settings.store.name, "bibles");
        assert_eq!(settings.assembler.block_tags, vec![DEFAULT_BLOCK_TAG]);
        assert_eq!(settings.assembler.verify_channels, true);
    }

    #[test]
    fn all_keys_are_read() {
        let settings = Settings::parse(
            "
assembler:
    block_tags: paraTag
    verify_channels: false
store:
    name: test
",
        )
        .unwrap();

        assert_eq!(settings.assembler.block_tags, vec!["paraTag"]);
        assert_eq!(settings.assembler.verify_channels, false);
        assert_eq!(settings.store.name, "test");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Settings::parse("assembler:\n    verify_channels: 'yes please'").is_err());
        assert!(Settings::parse("assembler:\n    block_tags: []").is_err());
        assert!(Settings::parse("assembler:\n    block_tags: [ 1, 2 ]").is_err());
        assert!(Settings::parse("- a list").is_err());
    }

    #[test]
    fn scalar_sections_are_rejected() {
        assert!(Settings::parse("assembler: paraTag").is_err());
        assert!(Settings::parse("store: [ 'bibles' ]").is_err());
        assert_eq!(Settings::parse("assembler:\nstore:").unwrap(), Settings::default());
    }

    #[test]
    fn malformed_configs_keep_the_previous_settings() {
        let config = Config::new("test.yml");
        config.load_from_string("store:\n    name: first").unwrap();
        let snapshot = config.current();

        assert!(config.load_from_string("store: 'invalid").is_err());
        assert_eq!(config.current().store.name, "first");

        config.load_from_string("store:\n    name: second").unwrap();
        assert_eq!(config.current().store.name, "second");

        // A snapshot isn't affected by a reload...
        assert_eq!(snapshot.store.name, "first");
    }

    #[test]
    fn missing_files_are_reported() {
        let config = Config::new("/this/file/does/not/exist.yml");
        assert!(config.load().is_err());
        assert_eq!(config.current().store.name, "lectio");
    }
}

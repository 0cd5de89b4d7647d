use std::path::Path;
use std::path::PathBuf;

use dirs::home_dir;
use serde::Deserialize;

use crate::error::QuillErr;
use crate::error::Result;

/// Character that opens the insertion menu when typed.
pub const DEFAULT_TRIGGER: char = '@';

const DEFAULT_LABEL: &str = "Prompt";

const CONFIG_TOML_FILE: &str = "config.toml";

/// Settings for one hosted reference field, loaded from disk and merged
/// with overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Character that opens the category menu.
    pub trigger: char,

    /// Field label drawn above the input.
    pub label: String,

    /// Shown dimmed while the buffer is empty.
    pub placeholder: Option<String>,

    /// Help text drawn under the label.
    pub description: Option<String>,

    /// Marks the label as required. Display only.
    pub required: bool,

    /// JSON file with the entity catalog.
    pub catalog_path: Option<PathBuf>,

    /// Directory where config and logs live (`~/.quill` by default).
    pub quill_home: PathBuf,
}

/// Base config deserialized from `~/.quill/config.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigToml {
    pub trigger: Option<char>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,

    /// Relative paths are resolved against the quill home directory.
    pub catalog_path: Option<PathBuf>,
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub trigger: Option<char>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, optionally applying overrides (CLI flags). Values
    /// in `overrides` take precedence over `config.toml`, which takes
    /// precedence over built-in defaults.
    pub fn load_with_overrides(overrides: ConfigOverrides) -> Result<Self> {
        let quill_home = find_quill_home()?;
        let cfg = load_config_as_toml(&quill_home)?;
        Self::load_from_base_config_with_overrides(cfg, overrides, quill_home)
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        quill_home: PathBuf,
    ) -> Result<Self> {
        // Destructure ConfigOverrides fully to ensure all overrides are applied.
        let ConfigOverrides {
            trigger,
            label,
            placeholder,
            description,
            required,
            catalog_path,
        } = overrides;

        let trigger = trigger.or(cfg.trigger).unwrap_or(DEFAULT_TRIGGER);
        validate_trigger(trigger)?;

        let catalog_path = catalog_path.or_else(|| {
            cfg.catalog_path.map(|p| {
                if p.is_relative() {
                    quill_home.join(p)
                } else {
                    p
                }
            })
        });

        Ok(Self {
            trigger,
            label: label
                .or(cfg.label)
                .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            placeholder: placeholder.or(cfg.placeholder),
            description: description.or(cfg.description),
            required: required.or(cfg.required).unwrap_or(false),
            catalog_path,
            quill_home,
        })
    }

    /// Folder where log files are written. Does not verify that it exists.
    pub fn log_dir(&self) -> PathBuf {
        self.quill_home.join("log")
    }
}

fn validate_trigger(trigger: char) -> Result<()> {
    if trigger.is_whitespace() || trigger.is_control() || matches!(trigger, '{' | '}' | ':') {
        return Err(QuillErr::InvalidTrigger(trigger));
    }
    Ok(())
}

/// Read `config.toml` from `quill_home`. A missing file yields the defaults.
pub fn load_config_as_toml(quill_home: &Path) -> Result<ConfigToml> {
    let config_toml_path = quill_home.join(CONFIG_TOML_FILE);
    match std::fs::read_to_string(&config_toml_path) {
        Ok(contents) => toml::from_str::<ConfigToml>(&contents).map_err(|e| {
            tracing::error!("Failed to parse config.toml: {e}");
            QuillErr::ConfigParse(e)
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("config.toml not found, using defaults");
            Ok(ConfigToml::default())
        }
        Err(e) => {
            tracing::error!("Failed to read config.toml: {e}");
            Err(e.into())
        }
    }
}

/// Returns the path to the Quill configuration directory, which can be
/// specified by the `QUILL_HOME` environment variable. If not set, defaults
/// to `~/.quill`. Does not verify that the directory exists.
pub fn find_quill_home() -> Result<PathBuf> {
    if let Ok(val) = std::env::var("QUILL_HOME")
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }
    let mut p = home_dir().ok_or(QuillErr::NoHomeDir)?;
    p.push(".quill");
    Ok(p)
}

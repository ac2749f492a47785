use crate::defaults;
use crate::error::{IpaError, Result};
use crate::learning::LearningPolicy;
use crate::lexicon::Dialect;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub dialect: DialectConfig,
    pub learning: LearningConfig,
    pub synthesizer: SynthesizerConfig,
    pub paths: PathsConfig,
}

/// Target dialect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DialectConfig {
    pub tag: String,
}

/// Confidence model and reverse index tunables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LearningConfig {
    pub confidence_threshold: f64,
    pub min_repeats: u32,
    pub manual_correction_multiplier: f64,
    pub accept_all_multiplier: f64,
    pub promote_strong_interactions: bool,
    pub reverse_inclusion_threshold: f64,
}

/// External phoneme synthesizer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesizerConfig {
    pub enabled: bool,
    pub command: String,
    /// Voice name; derived from the dialect when unset.
    pub voice: Option<String>,
    pub timeout_ms: u64,
}

/// Data and resource locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: Option<PathBuf>,
    pub phoneme_map: Option<PathBuf>,
    pub fallback_table: Option<PathBuf>,
    pub cmu_dict: Option<PathBuf>,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            tag: defaults::DIALECT.to_string(),
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            min_repeats: defaults::MIN_REPEATS,
            manual_correction_multiplier: defaults::MANUAL_CORRECTION_MULTIPLIER,
            accept_all_multiplier: defaults::ACCEPT_ALL_MULTIPLIER,
            promote_strong_interactions: defaults::PROMOTE_STRONG_INTERACTIONS,
            reverse_inclusion_threshold: defaults::REVERSE_INCLUSION_THRESHOLD,
        }
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: defaults::SYNTHESIZER_COMMAND.to_string(),
            voice: None,
            timeout_ms: defaults::SYNTHESIZER_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ValueKind {
    Str,
    Bool,
    Int,
    Float,
}

/// Keys accepted by `config set`.
const SETTABLE_KEYS: &[(&str, ValueKind)] = &[
    ("dialect.tag", ValueKind::Str),
    ("learning.confidence_threshold", ValueKind::Float),
    ("learning.min_repeats", ValueKind::Int),
    ("learning.manual_correction_multiplier", ValueKind::Float),
    ("learning.accept_all_multiplier", ValueKind::Float),
    ("learning.promote_strong_interactions", ValueKind::Bool),
    ("learning.reverse_inclusion_threshold", ValueKind::Float),
    ("synthesizer.enabled", ValueKind::Bool),
    ("synthesizer.command", ValueKind::Str),
    ("synthesizer.voice", ValueKind::Str),
    ("synthesizer.timeout_ms", ValueKind::Int),
    ("paths.data_dir", ValueKind::Str),
    ("paths.phoneme_map", ValueKind::Str),
    ("paths.fallback_table", ValueKind::Str),
    ("paths.cmu_dict", ValueKind::Str),
];

const TEMPLATE: &str = r#"# hce-ipa configuration

[dialect]
# Target dialect: au, us, uk or any other tag
tag = "au"

[learning]
# Confidence needed (with min_repeats) before a choice becomes an override
confidence_threshold = 0.7
min_repeats = 2
# Boost for hand-typed corrections (1.5 - 2.0)
manual_correction_multiplier = 2.0
# Boost for whole-sentence acceptance (1.2 - 1.5)
accept_all_multiplier = 1.5
# Promote every correction and accept-all immediately
promote_strong_interactions = true
# Minimum ledger confidence for reverse lookup entries
reverse_inclusion_threshold = 0.6

[synthesizer]
enabled = true
command = "espeak-ng"
# voice = "en-au"
timeout_ms = 10000

[paths]
# data_dir = "~/.local/share/hce-ipa"
# phoneme_map = "/path/to/hce_phoneme_map.json"
# fallback_table = "/path/to/fallback.json"
# cmu_dict = "/path/to/cmudict.txt"
"#;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IpaError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                IpaError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(IpaError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - HCE_IPA_DIALECT → dialect.tag
    /// - HCE_IPA_DATA_DIR → paths.data_dir
    /// - HCE_IPA_SYNTHESIZER → synthesizer.command (`none` or `off` disables it)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(tag) = std::env::var("HCE_IPA_DIALECT")
            && !tag.is_empty()
        {
            self.dialect.tag = tag;
        }

        if let Ok(dir) = std::env::var("HCE_IPA_DATA_DIR")
            && !dir.is_empty()
        {
            self.paths.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(command) = std::env::var("HCE_IPA_SYNTHESIZER")
            && !command.is_empty()
        {
            match command.to_ascii_lowercase().as_str() {
                "none" | "off" => self.synthesizer.enabled = false,
                _ => {
                    self.synthesizer.enabled = true;
                    self.synthesizer.command = command;
                }
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/hce-ipa/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(defaults::APP_DIR)
            .join("config.toml")
    }

    /// Directory holding overrides, ledger and logs.
    pub fn data_dir(&self) -> PathBuf {
        self.paths.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(defaults::APP_DIR)
        })
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::from(self.dialect.tag.as_str())
    }

    pub fn learning_policy(&self) -> LearningPolicy {
        LearningPolicy {
            confidence_threshold: self.learning.confidence_threshold,
            min_repeats: self.learning.min_repeats,
            manual_correction_multiplier: self.learning.manual_correction_multiplier,
            accept_all_multiplier: self.learning.accept_all_multiplier,
            promote_strong_interactions: self.learning.promote_strong_interactions,
        }
    }

    pub fn synthesizer_timeout(&self) -> Duration {
        Duration::from_millis(self.synthesizer.timeout_ms)
    }

    /// Reject values outside their documented ranges.
    pub fn validate(&self) -> Result<()> {
        fn invalid(key: &str, message: String) -> Result<()> {
            Err(IpaError::ConfigInvalidValue {
                key: key.to_string(),
                message,
            })
        }

        let learning = &self.learning;
        if self.dialect.tag.trim().is_empty() {
            return invalid("dialect.tag", "must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&learning.confidence_threshold) {
            return invalid(
                "learning.confidence_threshold",
                format!("{} is not within 0.0 - 1.0", learning.confidence_threshold),
            );
        }
        if !(1.5..=2.0).contains(&learning.manual_correction_multiplier) {
            return invalid(
                "learning.manual_correction_multiplier",
                format!("{} is not within 1.5 - 2.0", learning.manual_correction_multiplier),
            );
        }
        if !(1.2..=1.5).contains(&learning.accept_all_multiplier) {
            return invalid(
                "learning.accept_all_multiplier",
                format!("{} is not within 1.2 - 1.5", learning.accept_all_multiplier),
            );
        }
        if !(0.0..=1.0).contains(&learning.reverse_inclusion_threshold) {
            return invalid(
                "learning.reverse_inclusion_threshold",
                format!("{} is not within 0.0 - 1.0", learning.reverse_inclusion_threshold),
            );
        }
        if self.synthesizer.timeout_ms == 0 {
            return invalid("synthesizer.timeout_ms", "must be positive".to_string());
        }
        if self.synthesizer.enabled && self.synthesizer.command.trim().is_empty() {
            return invalid(
                "synthesizer.command",
                "must not be empty while the synthesizer is enabled".to_string(),
            );
        }
        Ok(())
    }

    /// Read a value by dotted key, e.g. `learning.min_repeats`.
    pub fn get_value_by_path(&self, key: &str) -> Result<String> {
        let root = toml::Value::try_from(self).map_err(|e| IpaError::ConfigParse {
            message: e.to_string(),
        })?;
        let mut current = &root;
        for part in key.split('.') {
            current = current.get(part).ok_or_else(|| IpaError::ConfigInvalidValue {
                key: key.to_string(),
                message: "unknown or unset key".to_string(),
            })?;
        }
        Ok(match current {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Set a dotted key in the file at `path`, keeping the rest of the file.
    ///
    /// The result must still parse and validate before it is written.
    pub fn set_value_by_path(path: &Path, key: &str, value: &str) -> Result<()> {
        let kind = SETTABLE_KEYS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| IpaError::ConfigInvalidValue {
                key: key.to_string(),
                message: "unknown key".to_string(),
            })?;
        let parsed = parse_value(key, value, kind)?;

        let mut table = match fs::read_to_string(path) {
            Ok(contents) => contents
                .parse::<toml::Table>()
                .map_err(|e| IpaError::ConfigParse {
                    message: e.to_string(),
                })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
            Err(e) => return Err(e.into()),
        };

        let (section, field) = key.split_once('.').ok_or_else(|| IpaError::ConfigInvalidValue {
            key: key.to_string(),
            message: "expected section.field".to_string(),
        })?;
        let section_table = table
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        let toml::Value::Table(section_table) = section_table else {
            return Err(IpaError::ConfigInvalidValue {
                key: section.to_string(),
                message: "is not a table".to_string(),
            });
        };
        section_table.insert(field.to_string(), parsed);

        let serialized = toml::to_string_pretty(&table).map_err(|e| IpaError::ConfigParse {
            message: e.to_string(),
        })?;
        let config: Config = toml::from_str(&serialized)?;
        config.validate()?;
        crate::store::write_atomic(path, serialized.as_bytes())
    }

    /// Effective configuration as TOML.
    pub fn to_display_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| IpaError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Commented template with every option at its default.
    pub fn dump_template() -> &'static str {
        TEMPLATE
    }
}

fn parse_value(key: &str, value: &str, kind: ValueKind) -> Result<toml::Value> {
    let invalid = |expected: &str| IpaError::ConfigInvalidValue {
        key: key.to_string(),
        message: format!("expected {expected}, got '{value}'"),
    };
    Ok(match kind {
        ValueKind::Str => toml::Value::String(value.to_string()),
        ValueKind::Bool => toml::Value::Boolean(value.parse().map_err(|_| invalid("true or false"))?),
        ValueKind::Int => toml::Value::Integer(value.parse().map_err(|_| invalid("an integer"))?),
        ValueKind::Float => toml::Value::Float(value.parse().map_err(|_| invalid("a number"))?),
    })
}

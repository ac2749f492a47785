//! Default configuration constants for hce-ipa.
//!
//! Shared by the configuration types and the engine so that the values used
//! when a field is missing from `config.toml` match the built-in behavior.

/// Target dialect tag for transcriptions and learned overrides.
pub const DIALECT: &str = "au";

/// Confidence required before a repeated choice is promoted to the override table.
///
/// Observed deployments used values between 0.5 and 0.7.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Minimum number of times a choice must be recorded before confidence-based promotion.
pub const MIN_REPEATS: u32 = 2;

/// Confidence multiplier applied to manual corrections.
pub const MANUAL_CORRECTION_MULTIPLIER: f64 = 2.0;

/// Confidence multiplier applied to accept-all confirmations.
pub const ACCEPT_ALL_MULTIPLIER: f64 = 1.5;

/// Promote manual corrections and accept-all confirmations regardless of confidence.
pub const PROMOTE_STRONG_INTERACTIONS: bool = true;

/// Minimum ledger confidence for a learned choice to appear in reverse lookups.
pub const REVERSE_INCLUSION_THRESHOLD: f64 = 0.6;

/// Maximum number of reverse lookup candidates reported per IPA segment.
pub const REVERSE_RESULT_LIMIT: usize = 10;

/// External phonetic synthesizer executable.
pub const SYNTHESIZER_COMMAND: &str = "espeak-ng";

/// Upper bound on a single synthesizer invocation, in milliseconds.
pub const SYNTHESIZER_TIMEOUT_MS: u64 = 10_000;

/// Application directory name under the XDG config and data directories.
pub const APP_DIR: &str = "hce-ipa";

/// Override table file name inside the data directory.
pub const OVERRIDES_FILE: &str = "overrides.json";

/// Learning ledger file name inside the data directory.
pub const LEDGER_FILE: &str = "learning.jsonl";

/// Accepted-sentence log file name inside the data directory.
pub const SENTENCE_LOG_FILE: &str = "sentences.jsonl";

/// Custom pronunciation file name inside the data directory.
pub const CUSTOM_PRONUNCIATIONS_FILE: &str = "custom_pronunciations.json";

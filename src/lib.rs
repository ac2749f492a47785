//! hce-ipa - Australian English IPA transcription
//!
//! Resolves text into per-word IPA candidates, learns from the user's
//! selections and corrections, and looks words up by their IPA.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod assemble;
pub mod candidates;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod learning;
pub mod lexicon;
#[cfg(feature = "cli")]
pub mod output;
pub mod phoneme;
pub mod resolution;
pub mod reverse;
pub mod store;
pub mod synth;
pub mod text;

// Engine and its results
pub use assemble::assemble;
pub use engine::{AcceptSummary, Engine, SystemInfo};
pub use resolution::{CandidateSet, ResolutionResult};
pub use reverse::{ReverseCandidate, ReverseIndex, SegmentMatches};

// Sources
pub use candidates::CandidateGenerator;
pub use lexicon::{Dialect, FallbackTable, PronunciationSource, ReferenceDictionary};
pub use phoneme::PhonemeMap;
pub use synth::{CommandExecutor, EspeakSynthesizer, NoSynthesizer, SystemCommandExecutor, Synthesizer};

// Learning and persistence
pub use learning::{LearningPolicy, LearningStats, RecordOutcome};
pub use store::{InteractionType, OverrideStore, Storage};

// Error handling
pub use error::{IpaError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_has_short_hash_when_present() {
        let ver = version_string();
        match option_env!("GIT_HASH") {
            Some(hash) if !hash.is_empty() => {
                assert_eq!(ver.split('+').nth(1), Some(hash));
            }
            _ => assert_eq!(ver, env!("CARGO_PKG_VERSION")),
        }
    }
}

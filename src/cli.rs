//! Command-line interface for hce-ipa
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Australian English IPA transcription with learned overrides
#[derive(Parser, Debug)]
#[command(
    name = "hce-ipa",
    version,
    about = "Australian English IPA transcription with learned overrides"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory for overrides, ledger and logs
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Target dialect (au, us, uk, ...)
    #[arg(long, global = true, value_name = "TAG")]
    pub dialect: Option<String>,

    /// Do not call the external synthesizer
    #[arg(long, global = true)]
    pub no_synth: bool,

    /// Synthesizer timeout. Examples: 500ms, 10s
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_timeout_ms)]
    pub timeout: Option<u64>,
}

/// Parse a timeout into milliseconds.
///
/// Bare numbers are milliseconds; anything else goes through `humantime`.
fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(millis) = s.parse::<u64>() {
        return Ok(millis);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis().min(u128::from(u64::MAX)) as u64)
        .map_err(|e| e.to_string())
}

/// Parse `WORD=IPA`.
fn parse_correction(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((word, ipa)) if !word.trim().is_empty() && !ipa.trim().is_empty() => {
            Ok((word.trim().to_string(), ipa.trim().to_string()))
        }
        _ => Err(format!("expected WORD=IPA, got '{s}'")),
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show IPA candidates for every word of a text
    Resolve {
        /// Text to transcribe
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pick one of a word's candidates and learn from it
    Select {
        /// Word to select for
        word: String,

        /// Zero-based candidate index as shown by `resolve`
        index: usize,
    },

    /// Record a hand-typed pronunciation for a word
    Correct {
        word: String,
        ipa: String,
    },

    /// Accept a whole sentence and learn every word
    Accept {
        /// Sentence to accept
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Replace a word's pronunciation before accepting (repeatable)
        #[arg(long = "correct", value_name = "WORD=IPA", value_parser = parse_correction)]
        corrections: Vec<(String, String)>,
    },

    /// Write an override directly, skipping the confidence model
    Save {
        word: String,
        ipa: String,
    },

    /// Find words matching IPA (whitespace separates segments)
    Reverse {
        /// IPA to look up
        #[arg(required = true, num_args = 1..)]
        ipa: Vec<String>,

        /// Rank this dialect first
        #[arg(long, value_name = "TAG")]
        prefer: Option<String>,

        /// Maximum candidates per segment
        #[arg(long, short = 'n', value_name = "N", default_value_t = crate::defaults::REVERSE_RESULT_LIMIT)]
        limit: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Teach a pronunciation for reverse lookup
    Teach {
        word: String,
        ipa: String,

        /// Dialect of this pronunciation
        #[arg(long = "as", value_name = "TAG", default_value = crate::defaults::DIALECT)]
        as_dialect: String,
    },

    /// Show learning statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite overrides from the learning ledger
    RebuildOverrides,

    /// Delete all learned data
    Reset {
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Report synthesizer availability and loaded tables
    Check,

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value by key (e.g., learning.min_repeats)
    Get {
        /// Dotted key path (e.g., dialect.tag, synthesizer.timeout_ms)
        key: String,
    },
    /// Set a configuration value by key
    Set {
        /// Dotted key path (e.g., dialect.tag, synthesizer.timeout_ms)
        key: String,
        /// Value to set
        value: String,
    },
    /// List current configuration values
    List,
    /// Dump a commented configuration template
    Dump,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from(["hce-ipa", "resolve", "I", "can't", "dance"]).unwrap();
        match cli.command {
            Commands::Resolve { text, json } => {
                assert_eq!(text, vec!["I", "can't", "dance"]);
                assert!(!json);
            }
            other => panic!("Expected Resolve, got {:?}", other),
        }
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
        assert!(!cli.no_synth);
    }

    #[test]
    fn test_resolve_requires_text() {
        assert!(Cli::try_parse_from(["hce-ipa", "resolve"]).is_err());
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["hce-ipa", "-vv", "check"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hce-ipa",
            "stats",
            "--data-dir",
            "/tmp/hce",
            "--dialect",
            "uk",
            "--no-synth",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/hce")));
        assert_eq!(cli.dialect.as_deref(), Some("uk"));
        assert!(cli.no_synth);
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_timeout() {
        let cli = Cli::try_parse_from(["hce-ipa", "--timeout", "2s", "check"]).unwrap();
        assert_eq!(cli.timeout, Some(2000));
        let cli = Cli::try_parse_from(["hce-ipa", "--timeout", "750", "check"]).unwrap();
        assert_eq!(cli.timeout, Some(750));
        assert!(Cli::try_parse_from(["hce-ipa", "--timeout", "soon", "check"]).is_err());
    }

    #[test]
    fn test_parse_select() {
        let cli = Cli::try_parse_from(["hce-ipa", "select", "dance", "1"]).unwrap();
        match cli.command {
            Commands::Select { word, index } => {
                assert_eq!(word, "dance");
                assert_eq!(index, 1);
            }
            other => panic!("Expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_accept_with_corrections() {
        let cli = Cli::try_parse_from([
            "hce-ipa",
            "accept",
            "I can't dance",
            "--correct",
            "dance=dɑːns",
            "--correct",
            "can't=kɑːnt",
        ])
        .unwrap();
        match cli.command {
            Commands::Accept { text, corrections } => {
                assert_eq!(text, vec!["I can't dance"]);
                assert_eq!(
                    corrections,
                    vec![
                        ("dance".to_string(), "dɑːns".to_string()),
                        ("can't".to_string(), "kɑːnt".to_string()),
                    ]
                );
            }
            other => panic!("Expected Accept, got {:?}", other),
        }
    }

    #[test]
    fn test_accept_rejects_malformed_correction() {
        assert!(Cli::try_parse_from(["hce-ipa", "accept", "hi", "--correct", "dance"]).is_err());
        assert!(Cli::try_parse_from(["hce-ipa", "accept", "hi", "--correct", "=x"]).is_err());
    }

    #[test]
    fn test_parse_reverse_defaults() {
        let cli = Cli::try_parse_from(["hce-ipa", "reverse", "dæːns"]).unwrap();
        match cli.command {
            Commands::Reverse {
                ipa,
                prefer,
                limit,
                json,
            } => {
                assert_eq!(ipa, vec!["dæːns"]);
                assert!(prefer.is_none());
                assert_eq!(limit, 10);
                assert!(!json);
            }
            other => panic!("Expected Reverse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_teach_defaults_to_australian() {
        let cli = Cli::try_parse_from(["hce-ipa", "teach", "arvo", "ɑːvəʊ"]).unwrap();
        match cli.command {
            Commands::Teach {
                word,
                ipa,
                as_dialect,
            } => {
                assert_eq!(word, "arvo");
                assert_eq!(ipa, "ɑːvəʊ");
                assert_eq!(as_dialect, "au");
            }
            other => panic!("Expected Teach, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reset_yes() {
        let cli = Cli::try_parse_from(["hce-ipa", "reset", "-y"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { yes: true }));
    }

    #[test]
    fn test_parse_config_set() {
        let cli =
            Cli::try_parse_from(["hce-ipa", "config", "set", "learning.min_repeats", "3"]).unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigAction::Set { key, value },
            } => {
                assert_eq!(key, "learning.min_repeats");
                assert_eq!(value, "3");
            }
            other => panic!("Expected Config Set, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["hce-ipa", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_parse_rebuild_overrides() {
        let cli = Cli::try_parse_from(["hce-ipa", "rebuild-overrides"]).unwrap();
        assert!(matches!(cli.command, Commands::RebuildOverrides));
    }
}

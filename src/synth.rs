//! External phonetic synthesizer with testable command execution.
//!
//! The synthesizer is optional. Candidate generation probes for it once and
//! treats every failure (missing binary, timeout, non-zero exit, empty output)
//! as a soft miss that falls through to the curated tables.
//!
//! The `CommandExecutor` trait enables full testability without external dependencies.

use crate::error::{IpaError, Result};
use crate::lexicon::Dialect;
use crossbeam_channel::RecvTimeoutError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments, killing it after `timeout`.
    ///
    /// Returns the stdout of the command on success.
    fn execute(&self, command: &str, args: &[&str], timeout: Duration) -> Result<String>;

    /// Whether `command` resolves to an executable.
    fn is_available(&self, command: &str) -> bool;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], timeout: Duration) -> Result<String> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    IpaError::SynthesizerNotFound {
                        command: command.to_string(),
                    }
                } else {
                    IpaError::SynthesizerFailed {
                        message: format!("Failed to execute {}: {}", command, e),
                    }
                }
            })?;

        // Drain stdout on a separate thread so a chatty child cannot block on a
        // full pipe while we wait for the deadline.
        let stdout = child.stdout.take();
        let (tx, rx) = crossbeam_channel::bounded(1);
        std::thread::spawn(move || {
            let mut buf = String::new();
            let result = match stdout {
                Some(mut out) => out.read_to_string(&mut buf).map(|_| buf),
                None => Ok(buf),
            };
            // The receiver is gone if the deadline already passed.
            tx.send(result).ok();
        });

        match rx.recv_timeout(timeout) {
            Ok(output) => {
                let status = child.wait()?;
                if !status.success() {
                    return Err(IpaError::SynthesizerFailed {
                        message: format!("{} failed with status {}", command, status),
                    });
                }
                Ok(output?)
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Err(e) = child.kill() {
                    tracing::debug!(command, error = %e, "failed to kill timed out synthesizer");
                }
                child.wait().ok();
                Err(IpaError::SynthesizerTimeout {
                    command: command.to_string(),
                    millis: timeout.as_millis(),
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(IpaError::SynthesizerFailed {
                message: format!("{} output reader exited unexpectedly", command),
            }),
        }
    }

    fn is_available(&self, command: &str) -> bool {
        find_in_path(command).is_some()
    }
}

/// Locate an executable the way a shell would: paths with a separator are
/// checked directly, bare names are searched on `PATH`.
pub fn find_in_path(command: &str) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }
    let direct = Path::new(command);
    if direct.components().count() > 1 {
        return is_executable(direct).then(|| direct.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// A source of raw phoneme strings for words.
pub trait Synthesizer: Send + Sync {
    /// Result of the capability probe.
    fn is_available(&self) -> bool;

    /// Produce raw phoneme output for `text` in the given dialect.
    fn synthesize(&self, text: &str, dialect: &Dialect) -> Result<String>;

    /// Return the name of this synthesizer for logging.
    fn name(&self) -> &str;
}

/// Synthesizer used when no external tool is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSynthesizer;

impl Synthesizer for NoSynthesizer {
    fn is_available(&self) -> bool {
        false
    }

    fn synthesize(&self, _text: &str, _dialect: &Dialect) -> Result<String> {
        Err(IpaError::SynthesizerNotFound {
            command: "none".to_string(),
        })
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// espeak-ng backed synthesizer (`espeak-ng -q -v <voice> --ipa <text>`).
pub struct EspeakSynthesizer<E: CommandExecutor> {
    executor: E,
    command: String,
    voice: Option<String>,
    timeout: Duration,
    available: bool,
}

impl<E: CommandExecutor> EspeakSynthesizer<E> {
    /// Create a synthesizer and probe once for the executable.
    ///
    /// `voice` overrides the voice derived from the dialect.
    pub fn new(executor: E, command: &str, voice: Option<String>, timeout: Duration) -> Self {
        let available = executor.is_available(command);
        if !available {
            tracing::info!(command, "synthesizer not found, using curated tables only");
        }
        Self {
            executor,
            command: command.to_string(),
            voice,
            timeout,
            available,
        }
    }

    fn voice_for(&self, dialect: &Dialect) -> String {
        if let Some(voice) = &self.voice {
            return voice.clone();
        }
        match dialect {
            Dialect::Au => "en-au".to_string(),
            Dialect::Us => "en-us".to_string(),
            Dialect::Uk => "en-gb".to_string(),
            Dialect::Other(tag) => format!("en-{tag}"),
        }
    }
}

impl EspeakSynthesizer<SystemCommandExecutor> {
    /// Create an espeak-ng synthesizer with the system command executor.
    pub fn system(command: &str, voice: Option<String>, timeout: Duration) -> Self {
        Self::new(SystemCommandExecutor::new(), command, voice, timeout)
    }
}

impl<E: CommandExecutor> Synthesizer for EspeakSynthesizer<E> {
    fn is_available(&self) -> bool {
        self.available
    }

    fn synthesize(&self, text: &str, dialect: &Dialect) -> Result<String> {
        if !self.available {
            return Err(IpaError::SynthesizerNotFound {
                command: self.command.clone(),
            });
        }
        let voice = self.voice_for(dialect);
        self.executor.execute(
            &self.command,
            &["-q", "-v", &voice, "--ipa", text],
            self.timeout,
        )
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Strip synthesizer-internal delimiters from raw output.
///
/// Removes phoneme separators (`_`), whitespace, and language-switch markers
/// such as `(en)`.
pub fn normalize_output(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth > 0 => {}
            '_' => {}
            c if c.is_whitespace() => {}
            c => out.push(c),
        }
    }
    out
}

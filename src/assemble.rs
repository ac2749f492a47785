//! Joining per-token choices into one transcription.

use crate::resolution::ResolutionResult;

/// Join the final choice of every token with single spaces.
///
/// Word tokens use correction, else selection, else first option; non-word
/// tokens are emitted as written. Tokens with nothing to emit are skipped.
pub fn assemble(results: &[ResolutionResult]) -> String {
    results
        .iter()
        .filter_map(|result| {
            if result.token.is_word {
                result.final_choice()
            } else {
                Some(result.token.original.as_str())
            }
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

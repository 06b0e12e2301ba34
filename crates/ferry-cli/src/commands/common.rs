//! Shared helpers for command implementations

use std::fmt;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and connections close cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command already reported the failure.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Whole seconds as a short duration label
pub(crate) fn seconds_label(seconds: Option<u64>) -> String {
    match seconds {
        Some(s) => format!("{s}s"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_has_empty_display() {
        assert_eq!(ExitCode(3).to_string(), "");
    }

    #[test]
    fn test_seconds_label() {
        assert_eq!(seconds_label(Some(4)), "4s");
        assert_eq!(seconds_label(None), "-");
    }
}

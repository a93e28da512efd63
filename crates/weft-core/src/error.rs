//! Error types for weft-core.

use std::io;

/// Error type for weft-core operations.
///
/// Out-of-range buffer writes and measurement-cache misses are not errors;
/// they are silent no-ops and transparent recomputation respectively.
#[derive(Debug, thiserror::Error)]
pub enum WeftCoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Terminal operation failed.
    #[error("terminal error: {0}")]
    Terminal(String),

    /// Layout calculation failed.
    #[error("layout error: {0}")]
    Layout(String),

    /// Style or color error.
    #[error("style error: {0}")]
    Style(String),

    /// Rendering failed.
    #[error("render error: {0}")]
    Render(String),

    /// A theme switch named a theme that is not registered.
    /// The current theme is left unchanged.
    #[error("theme not found: {0}")]
    ThemeNotFound(String),

    /// An operation required a theme provider but none is installed.
    #[error("no theme provider installed")]
    ThemeNotInstalled,

    /// The input source could not be opened at startup. Fatal: the
    /// application loop refuses to enter the running state.
    #[error("input source failed to start: {0}")]
    InputStart(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for weft-core operations.
pub type Result<T> = std::result::Result<T, WeftCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WeftCoreError::Terminal("no tty".into());
        assert_eq!(err.to_string(), "terminal error: no tty");
    }

    #[test]
    fn theme_not_found_display() {
        let err = WeftCoreError::ThemeNotFound("solarized".into());
        assert_eq!(err.to_string(), "theme not found: solarized");
    }

    #[test]
    fn io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: WeftCoreError = io_err.into();
        assert!(matches!(err, WeftCoreError::Io(_)));
    }
}

//! Environment configuration recognized by the engine.

use std::env;
use std::path::PathBuf;

/// Which output encoder path the loop uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Diff-based minimal updates (the default).
    #[default]
    Diff,
    /// Unconditional full-frame rewrites.
    Direct,
}

/// Engine configuration, read once at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Full-frame vs. diff output.
    pub output_mode: OutputMode,
    /// Enable the frame/event recorder.
    pub debug: bool,
    /// Override the recorder path.
    pub debug_log: Option<PathBuf>,
    /// Log cursor-blink state transitions.
    pub cursor_debug: bool,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Recognized keys: `WEFT_OUTPUT_MODE` (`direct` or `diff`),
    /// `WEFT_DEBUG`, `WEFT_DEBUG_LOG`, `WEFT_CURSOR_DEBUG`.
    pub fn from_env() -> Self {
        Self {
            output_mode: match env::var("WEFT_OUTPUT_MODE").as_deref() {
                Ok("direct") => OutputMode::Direct,
                _ => OutputMode::Diff,
            },
            debug: env_flag("WEFT_DEBUG"),
            debug_log: env::var_os("WEFT_DEBUG_LOG").map(PathBuf::from),
            cursor_debug: env_flag("WEFT_CURSOR_DEBUG"),
        }
    }

    /// The recorder path: the override, or the default beside the
    /// process working directory.
    pub fn debug_log_path(&self) -> PathBuf {
        self.debug_log
            .clone()
            .unwrap_or_else(|| PathBuf::from("weft-debug.log"))
    }
}

fn env_flag(key: &str) -> bool {
    matches!(
        env::var(key).as_deref(),
        Ok("1") | Ok("true") | Ok("yes") | Ok("on")
    )
}

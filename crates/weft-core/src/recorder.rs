//! Frame and event debug recorder.
//!
//! When enabled via [`crate::config::Config::debug`], the loop appends
//! one line per routed event and per rendered frame to the debug log, so
//! a misbehaving session can be replayed offline. Recording failures are
//! logged and otherwise ignored; diagnostics must never take the UI
//! down.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::event::Event;

/// Appends frame/event records to a log file.
#[derive(Debug)]
pub struct Recorder {
    file: Option<File>,
    started: Instant,
    frames: u64,
}

impl Recorder {
    /// A disabled recorder that drops everything.
    pub fn disabled() -> Self {
        Self {
            file: None,
            started: Instant::now(),
            frames: 0,
        }
    }

    /// Open (append) the log at `path`. Failure to open disables the
    /// recorder with a warning.
    pub fn open(path: &Path) -> Self {
        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(err) => {
                tracing::warn!(?path, %err, "could not open debug log; recorder disabled");
                None
            }
        };
        Self {
            file,
            started: Instant::now(),
            frames: 0,
        }
    }

    /// Whether records are being written.
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Number of frames recorded so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Record a routed event.
    pub fn record_event(&mut self, event: &Event) {
        let elapsed = self.started.elapsed().as_millis();
        self.append(&format!("[{elapsed}ms] event {event:?}\n"));
    }

    /// Record an emitted frame: payload size and how many cells changed.
    pub fn record_frame(&mut self, payload_bytes: usize, changed_cells: usize) {
        self.frames += 1;
        let elapsed = self.started.elapsed().as_millis();
        let n = self.frames;
        self.append(&format!(
            "[{elapsed}ms] frame {n}: {payload_bytes} bytes, {changed_cells} cells changed\n"
        ));
    }

    fn append(&mut self, line: &str) {
        if let Some(file) = self.file.as_mut()
            && let Err(err) = file.write_all(line.as_bytes())
        {
            tracing::warn!(%err, "debug log write failed; recorder disabled");
            self.file = None;
        }
    }
}

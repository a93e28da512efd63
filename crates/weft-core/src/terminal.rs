//! Terminal output sink.
//!
//! The engine writes encoded frames as whole byte blobs and never
//! assumes the sink is line-buffered. [`CrosstermTerminal`] wraps real
//! stdout with raw-mode and alternate-screen handling; [`TestTerminal`]
//! captures bytes for assertions.

use std::io::{self, Write};

use crate::error::{Result, WeftCoreError};
use crate::geometry::Size;

/// A byte sink the engine renders into.
pub trait Terminal {
    /// Current terminal dimensions in cells.
    fn size(&self) -> Size;

    /// Write one encoded frame (or teardown sequence) as a whole blob.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flush buffered bytes to the device.
    fn flush(&mut self) -> Result<()>;

    /// Prepare the device for full-screen rendering (raw mode, alternate
    /// screen). A no-op for sinks that have no device.
    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Undo [`Terminal::setup`]; must be safe to call more than once.
    fn teardown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Real terminal on stdout, managed through crossterm.
pub struct CrosstermTerminal {
    out: io::Stdout,
    raw: bool,
}

impl CrosstermTerminal {
    /// Create a sink over stdout. Call [`Terminal::setup`] before the
    /// first frame.
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            raw: false,
        }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermTerminal {
    fn size(&self) -> Size {
        crossterm::terminal::size()
            .map(|(w, h)| Size::new(w, h))
            .unwrap_or(Size::new(80, 24))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn setup(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()
            .map_err(|e| WeftCoreError::Terminal(format!("enable raw mode: {e}")))?;
        crossterm::execute!(self.out, crossterm::terminal::EnterAlternateScreen)
            .map_err(|e| WeftCoreError::Terminal(format!("enter alternate screen: {e}")))?;
        self.raw = true;
        Ok(())
    }

    fn teardown(&mut self) -> Result<()> {
        if !self.raw {
            return Ok(());
        }
        self.raw = false;
        // Show the cursor and leave the alternate screen through the
        // engine's own repertoire, then drop raw mode.
        self.out.write_all(b"\x1b[?25h\x1b[?1049l")?;
        self.out.flush()?;
        crossterm::terminal::disable_raw_mode()
            .map_err(|e| WeftCoreError::Terminal(format!("disable raw mode: {e}")))?;
        Ok(())
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

/// In-memory sink for tests: fixed size, captured bytes.
#[derive(Clone, Debug)]
pub struct TestTerminal {
    size: Size,
    written: Vec<u8>,
    flushes: usize,
}

impl TestTerminal {
    /// A test sink of the given dimensions.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: Size::new(width, height),
            written: Vec::new(),
            flushes: 0,
        }
    }

    /// Everything written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.written
    }

    /// Everything written so far, as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }

    /// Number of flush calls observed.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Forget captured bytes.
    pub fn clear(&mut self) {
        self.written.clear();
    }
}

impl Terminal for TestTerminal {
    fn size(&self) -> Size {
        self.size
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

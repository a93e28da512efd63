//! Remote output optimizer.
//!
//! Latency-sensitive sinks (an engine driven over a network hop) do not
//! want one write per frame. This wrapper buffers encoded payload bytes
//! and releases them either when a minimum interval has elapsed or when
//! the pending byte count crosses a threshold. Optionally it reduces a
//! payload to the middle slice that differs from the previously released
//! payload; wire framing of that delta is the transport's concern.

use std::time::{Duration, Instant};

/// A payload released by [`RemoteOutput::take`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteFrame {
    /// The complete payload.
    Full(Vec<u8>),
    /// Only the middle that changed: the receiver keeps `prefix_len`
    /// bytes of the previous payload, appends `middle`, then the last
    /// `suffix_len` bytes of the previous payload.
    Delta {
        /// Bytes shared with the head of the previous payload.
        prefix_len: usize,
        /// Bytes shared with the tail of the previous payload.
        suffix_len: usize,
        /// The replacement middle.
        middle: Vec<u8>,
    },
}

impl RemoteFrame {
    /// Reconstruct the full payload given the previously applied one.
    pub fn apply(&self, previous: &[u8]) -> Vec<u8> {
        match self {
            Self::Full(bytes) => bytes.clone(),
            Self::Delta {
                prefix_len,
                suffix_len,
                middle,
            } => {
                let mut out = Vec::with_capacity(prefix_len + middle.len() + suffix_len);
                out.extend_from_slice(&previous[..*prefix_len]);
                out.extend_from_slice(middle);
                out.extend_from_slice(&previous[previous.len() - suffix_len..]);
                out
            }
        }
    }

    /// Size of the variable part of this frame.
    pub fn payload_len(&self) -> usize {
        match self {
            Self::Full(bytes) => bytes.len(),
            Self::Delta { middle, .. } => middle.len(),
        }
    }
}

/// Buffers encoded frames for a remote sink.
#[derive(Debug)]
pub struct RemoteOutput {
    min_interval: Duration,
    max_pending_bytes: usize,
    delta_enabled: bool,
    pending: Vec<u8>,
    last_release: Option<Instant>,
    last_payload: Vec<u8>,
}

impl RemoteOutput {
    /// Create a buffer that releases after `min_interval` or once more
    /// than `max_pending_bytes` are pending, whichever comes first.
    pub fn new(min_interval: Duration, max_pending_bytes: usize) -> Self {
        Self {
            min_interval,
            max_pending_bytes,
            delta_enabled: false,
            pending: Vec::new(),
            last_release: None,
            last_payload: Vec::new(),
        }
    }

    /// Enable prefix/suffix delta encoding against the previous payload.
    #[must_use]
    pub fn with_delta(mut self, enabled: bool) -> Self {
        self.delta_enabled = enabled;
        self
    }

    /// Append encoded bytes to the pending payload.
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Number of bytes waiting for release.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the pending payload should be released now.
    pub fn should_release(&self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        if self.pending.len() > self.max_pending_bytes {
            return true;
        }
        match self.last_release {
            None => true,
            Some(at) => at.elapsed() >= self.min_interval,
        }
    }

    /// Release the pending payload as a frame, applying delta encoding
    /// when enabled and smaller. Returns `None` when nothing is pending.
    pub fn take(&mut self) -> Option<RemoteFrame> {
        if self.pending.is_empty() {
            return None;
        }
        let payload = std::mem::take(&mut self.pending);
        self.last_release = Some(Instant::now());

        let frame = if self.delta_enabled {
            let frame = delta_frame(&self.last_payload, &payload);
            self.last_payload = payload;
            frame
        } else {
            self.last_payload = payload.clone();
            RemoteFrame::Full(payload)
        };
        Some(frame)
    }
}

/// Build the smaller of a full frame and a prefix/suffix delta frame.
fn delta_frame(previous: &[u8], payload: &[u8]) -> RemoteFrame {
    if previous.is_empty() {
        return RemoteFrame::Full(payload.to_vec());
    }

    let prefix_len = previous
        .iter()
        .zip(payload)
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = previous.len().min(payload.len()) - prefix_len;
    let suffix_len = previous
        .iter()
        .rev()
        .zip(payload.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let middle = payload[prefix_len..payload.len() - suffix_len].to_vec();
    if middle.len() < payload.len() {
        RemoteFrame::Delta {
            prefix_len,
            suffix_len,
            middle,
        }
    } else {
        RemoteFrame::Full(payload.to_vec())
    }
}

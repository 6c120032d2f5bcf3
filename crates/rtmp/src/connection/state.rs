//! The connection's state machine and per-media-kind timestamp bookkeeping.

/// Drives the handshake and command sequence described in the legacy RTMP
/// spec, section 7: `connect` → `createStream` → `publish`.
///
/// Transitions only ever move forward, except into [`Self::Error`], which is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// The worker has not started yet.
    NotConnected,
    /// Resolving the target host.
    Resolving,
    /// Connecting to a resolved address.
    Connecting,
    /// Exchanging C0/C1/S0/S1/S2/C2.
    Handshake,
    /// `connect` was sent; awaiting its `_result`/`_error`.
    StreamConnecting,
    /// `createStream` was sent; awaiting its `_result`/`_error`.
    StreamCreating,
    /// `publish` was sent; awaiting `onStatus`.
    StreamPublishing,
    /// Ready to accept `send_config`/`send_video`/`send_audio`.
    StreamReady,
    /// `done()` was called and `deleteStream` was sent; the socket is
    /// about to close.
    StreamDeleted,
    /// A fatal error occurred. Terminal; the worker has exited.
    Error,
}

impl ConnectionState {
    /// True once the connection has reached [`Self::StreamReady`] and has
    /// not yet moved past it.
    pub fn is_streaming(self) -> bool {
        matches!(self, Self::StreamReady)
    }

    /// True if the connection is in its terminal error state.
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Tracks the last timestamp each producer call sent, in milliseconds, so
/// the next call can compute a chunk timestamp delta.
///
/// Both fields start at zero, matching the zero timestamp the corresponding
/// config packet (§4.4) establishes as each chunk stream's baseline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampTrack {
    pub video_ms: u64,
    pub audio_ms: u64,
}

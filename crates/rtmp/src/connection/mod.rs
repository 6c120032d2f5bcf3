//! The public RTMP client connection.
//!
//! [`Connection::init`] parses the target URL, allocates the send ring, and
//! spawns a single dedicated I/O worker ([`worker::run`]) that owns the
//! socket, the receive-side reassembler, and the connection state for the
//! rest of the connection's life. Producer threads only ever touch
//! [`Shared::producer`], and only briefly.

mod producer;
mod state;
mod worker;

use std::sync::{Arc, Mutex};

use rtmp_ring_buffer::RingBuffer;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

pub use self::producer::{AudioConfig, VideoConfig};
use self::producer::ProducerState;
pub use self::state::ConnectionState;
use crate::error::RtmpError;
use crate::url::RtmpUrl;

/// State shared between producer threads and the I/O worker, behind one
/// exclusive lock plus a notifier that wakes the worker when there's
/// something new to send.
pub(crate) struct Shared {
    pub(crate) producer: Mutex<ProducerState>,
    pub(crate) data_ready: Notify,
}

/// A non-blocking RTMP publishing connection.
///
/// Screen/audio capture and encoding happen entirely outside this type:
/// callers hand it already-encoded, already-timestamped frames and the
/// codec configuration blobs their encoder produced. This type's only job
/// is getting those bytes onto the wire as a conformant RTMP publish
/// session.
pub struct Connection {
    shared: Arc<Shared>,
    stop: CancellationToken,
}

impl Connection {
    /// Parses `url`, allocates a `send_capacity`-byte send ring, and spawns
    /// the I/O worker.
    ///
    /// Returns as soon as the worker has been spawned, not once it has
    /// connected: resolving, connecting, the handshake and the
    /// `connect`/`createStream`/`publish` sequence all happen in the
    /// background. Poll [`Self::is_streaming`]/[`Self::is_error`] to observe
    /// progress.
    pub fn init(url: &str, key: &str, send_capacity: usize) -> Result<Self, RtmpError> {
        let url = RtmpUrl::parse(url)?;
        let ring = RingBuffer::new(send_capacity)?;

        let shared = Arc::new(Shared {
            producer: Mutex::new(ProducerState::new(ring)),
            data_ready: Notify::new(),
        });
        let stop = CancellationToken::new();

        tokio::spawn(worker::run(shared.clone(), url, key.to_string(), stop.clone()));

        Ok(Self { shared, stop })
    }

    /// True once `connect`/`createStream`/`publish` all succeeded and
    /// `send_config`/`send_video`/`send_audio` will accept data.
    pub fn is_streaming(&self) -> bool {
        self.shared.producer.lock().unwrap().state.is_streaming()
    }

    /// True if the connection has failed. Terminal: per this client's
    /// non-goals, it never retries or reconnects on its own.
    pub fn is_error(&self) -> bool {
        self.shared.producer.lock().unwrap().state.is_error()
    }

    /// Announces the stream's codec configuration. Callers should call this
    /// exactly once, after the connection reaches `StreamReady` and before
    /// the first `send_video`/`send_audio`.
    ///
    /// Returns `false` (not an error) if the connection isn't ready yet or
    /// the send ring had no room for all of it.
    pub fn send_config(&self, video: Option<&VideoConfig>, audio: Option<&AudioConfig>) -> bool {
        let sent = self.shared.producer.lock().unwrap().send_config(video, audio);
        if sent {
            self.shared.data_ready.notify_one();
        }
        sent
    }

    /// Stages one already-encoded video frame. `decode_t`/`present_t` are
    /// raw timestamps in `time_base` units.
    ///
    /// Returns `false` (backpressure, not an error) if the connection isn't
    /// ready yet or the send ring is full.
    pub fn send_video(&self, decode_t: i64, present_t: i64, time_base: u32, bytes: &[u8], is_keyframe: bool) -> bool {
        let sent = self
            .shared
            .producer
            .lock()
            .unwrap()
            .send_video(decode_t, present_t, time_base, bytes, is_keyframe);
        if sent {
            self.shared.data_ready.notify_one();
        }
        sent
    }

    /// Stages one already-encoded audio frame. `t` is a raw timestamp in
    /// `time_base` units.
    ///
    /// Returns `false` (backpressure, not an error) if the connection isn't
    /// ready yet or the send ring is full.
    pub fn send_audio(&self, t: i64, time_base: u32, bytes: &[u8]) -> bool {
        let sent = self.shared.producer.lock().unwrap().send_audio(t, time_base, bytes);
        if sent {
            self.shared.data_ready.notify_one();
        }
        sent
    }

    /// Signals the worker to stop. The worker makes a best-effort attempt
    /// at `deleteStream` before closing the socket (see `DESIGN.md`), then
    /// exits; this call does not wait for that to happen.
    pub fn done(&self) {
        self.stop.cancel();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // The worker task is detached (we never kept its `JoinHandle`), so
        // it keeps running after `self` is gone and finishes its graceful
        // shutdown even if the caller never called `done()` explicitly.
        self.stop.cancel();
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn init_rejects_bad_url_before_spawning_anything() {
        let err = Connection::init("https://example.com/live", "key", 4096).unwrap_err();
        assert!(matches!(err, RtmpError::BadUrl(_)));
    }
}

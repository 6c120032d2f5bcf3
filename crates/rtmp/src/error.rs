//! The general RTMP client error type.

use crate::chunk::{ChunkDecodeError, ChunkEncodeError};
use crate::command_messages::CommandError;
use crate::handshake::HandshakeError;
use crate::messages::MessageError;
use crate::protocol_control_messages::ProtocolControlMessageError;

/// Errors that can terminate a [`Connection`](crate::connection::Connection).
///
/// Every variant here corresponds to one of the error kinds a client must
/// distinguish: bad input before any I/O happens, failures while reaching
/// the server, and failures the peer itself reports. All of them move the
/// connection to the terminal `Error` state; none of them are raised from
/// the producer API (`send_video`/`send_audio`/`send_config` only ever
/// return `bool`, see [`crate::connection::Connection`]).
#[derive(Debug, thiserror::Error)]
pub enum RtmpError {
    /// The stream URL could not be parsed, or used a scheme other than `rtmp`.
    #[error("bad url: {0}")]
    BadUrl(String),
    /// Name resolution for the target host failed.
    #[error("resolve failed: {0}")]
    Resolve(#[source] std::io::Error),
    /// None of the resolved addresses could be connected to.
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),
    /// A transport-level I/O error: reset, EOF, or any other socket failure.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    /// The peer rejected `connect`/`createStream`, or replied to `publish`
    /// with something other than a successful `onStatus`.
    #[error("protocol rejected: {0}")]
    ProtocolReject(String),
    /// Chunk reassembly failed: bad continuation, unknown csid, oversized
    /// message, or another violation of the peer's side of the wire format.
    #[error("protocol violation: {0}")]
    ChunkDecode(#[from] ChunkDecodeError),
    /// Framing an outgoing message failed: oversized payload or a
    /// timestamp/delta that doesn't fit without an extended timestamp.
    #[error("chunk encode error: {0}")]
    ChunkEncode(#[from] ChunkEncodeError),
    /// AMF0 command encode/decode failure.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
    /// A reassembled message could not be read as a known protocol control
    /// message or command.
    #[error("message error: {0}")]
    Message(#[from] MessageError),
    /// Writing a protocol control message failed.
    #[error("protocol control message error: {0}")]
    ProtocolControlMessage(#[from] ProtocolControlMessageError),
    /// The handshake's S0 named an unsupported RTMP version.
    #[error("handshake failed: {0}")]
    Handshake(#[from] HandshakeError),
    /// The send ring buffer could not be allocated.
    #[error("send ring buffer allocation failed: {0}")]
    RingBufferAlloc(#[from] rtmp_ring_buffer::RingBufferError),
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        let err = RtmpError::BadUrl("not rtmp".to_string());
        assert_eq!(err.to_string(), "bad url: not rtmp");
    }
}

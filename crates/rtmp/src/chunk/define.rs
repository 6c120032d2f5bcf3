//! Wire-level chunk types shared by the encoder and decoder.

use bytes::Bytes;

use crate::messages::MessageTypeID;

/// Chunk stream id reserved for protocol control messages (`SetChunkSize`,
/// `Acknowledgement`, `WindowAcknowledgementSize`, `SetPeerBandwidth`).
pub const CONTROL_CHUNK_STREAM_ID: u32 = 2;
/// Chunk stream id used for AMF0 commands and `@setDataFrame`/`onMetaData`.
pub const COMMAND_CHUNK_STREAM_ID: u32 = 3;
/// Chunk stream id used for audio frames.
pub const AUDIO_CHUNK_STREAM_ID: u32 = 4;
/// Chunk stream id used for video frames.
pub const VIDEO_CHUNK_STREAM_ID: u32 = 5;

/// Outgoing chunk payload size before the handshake completes and
/// `SetChunkSize` is negotiated.
pub const INIT_CHUNK_SIZE: usize = 128;
/// Outgoing chunk payload size this client negotiates once connected.
pub const OUT_CHUNK_SIZE: usize = 65536;
/// Outgoing window acknowledgement size this client advertises.
pub const OUT_WINDOW_ACK_SIZE: u32 = 1 << 30;

/// Highest chunk-stream-id this client tracks state for, one past the
/// largest valid id. Mirrors the fixed-size `LastChunk[64]` table of the
/// wire format this client was modeled on.
pub const MAX_CHUNK_STREAMS: u32 = 64;

/// Largest message body this client will build or accept. RTMP message
/// lengths are three bytes wide on the wire.
pub const MAX_MESSAGE_LENGTH: u32 = 0x00FF_FFFF;

/// Marker value of a 24-bit timestamp/delta field indicating that the real
/// value follows as a 4-byte extended timestamp.
pub const EXTENDED_TIMESTAMP_MARKER: u32 = 0x00FF_FFFF;

/// Chunk basic-header format, selecting how much of the message header is
/// present versus inherited from the chunk stream's previous chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    /// Full 11-byte message header.
    Type0 = 0,
    /// 7-byte header: timestamp delta, message length, type id. Message
    /// stream id is inherited.
    Type1 = 1,
    /// 3-byte header: timestamp delta only. Length, type id and stream id
    /// are inherited.
    Type2 = 2,
    /// No message header at all; every field is inherited.
    Type3 = 3,
}

/// The basic header of a chunk: its format and chunk-stream-id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBasicHeader {
    /// The chunk format.
    pub chunk_type: ChunkType,
    /// The chunk-stream-id.
    pub chunk_stream_id: u32,
}

/// The (possibly inherited) message header of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMessageHeader {
    /// Absolute timestamp of the message, in milliseconds.
    pub timestamp: u32,
    /// Length of the complete message body, in bytes.
    pub msg_length: u32,
    /// Message type id.
    pub msg_type_id: MessageTypeID,
    /// Message stream id.
    pub msg_stream_id: u32,
}

impl ChunkMessageHeader {
    /// Returns true if this timestamp must be carried in the extended
    /// timestamp field rather than the 24-bit header field.
    pub fn is_extended_timestamp(&self) -> bool {
        self.timestamp >= EXTENDED_TIMESTAMP_MARKER
    }
}

/// A fully reassembled (or, for writing, not-yet-split) RTMP message framed
/// as one logical chunk.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// The basic header this chunk was read with, or will be written with.
    pub basic_header: ChunkBasicHeader,
    /// The message header.
    pub message_header: ChunkMessageHeader,
    /// The complete message payload.
    pub payload: Bytes,
}

impl Chunk {
    /// Builds a new chunk, always with a fmt=0 basic header; encoding may
    /// downgrade this to fmt=1/fmt=3 as appropriate.
    pub fn new(chunk_stream_id: u32, timestamp: u32, msg_type_id: MessageTypeID, msg_stream_id: u32, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();

        Self {
            basic_header: ChunkBasicHeader {
                chunk_type: ChunkType::Type0,
                chunk_stream_id,
            },
            message_header: ChunkMessageHeader {
                timestamp,
                msg_length: payload.len() as u32,
                msg_type_id,
                msg_stream_id,
            },
            payload,
        }
    }
}

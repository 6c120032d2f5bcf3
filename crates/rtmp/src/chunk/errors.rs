use std::io;

/// Errors raised while reassembling chunks back into messages.
#[derive(Debug, thiserror::Error)]
pub enum ChunkDecodeError {
    /// Reading from the underlying buffer failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The basic header named a chunk-stream-id outside the range this
    /// client tracks state for.
    #[error("invalid chunk stream id: {0} (must be < {1})")]
    InvalidChunkStreamId(u32, u32),
    /// The message header named a type id this client does not recognize.
    #[error("invalid message type id: {0}")]
    InvalidMessageTypeID(u8),
    /// A fmt=1/2/3 chunk arrived for a chunk-stream-id this client has no
    /// prior chunk on record for, so there is nothing to inherit from.
    #[error("missing previous chunk header for chunk stream {0}")]
    MissingPreviousChunkHeader(u32),
    /// A fmt=0/1/2 chunk arrived for a chunk-stream-id whose previous
    /// message has not finished reassembling yet. The peer should have
    /// continued it with fmt=3 instead of starting a new header.
    #[error("chunk stream {0} started a new chunk header while a previous message was still in progress")]
    UnexpectedHeaderMidMessage(u32),
    /// The message header declared a body larger than this client accepts.
    #[error("message length {0} exceeds the maximum of {1}")]
    MessageTooLarge(u32, u32),
    /// The previous chunk on this stream used an extended timestamp whose
    /// value this client declines to reinterpret on an implicit fmt=3
    /// "new message reusing the last header" chunk.
    #[error("timestamp overflow on chunk stream {0}")]
    TimestampOverflow(u32),
}

/// Errors raised while splitting a message into chunks.
#[derive(Debug, thiserror::Error)]
pub enum ChunkEncodeError {
    /// Writing to the underlying buffer failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The message body is too large to frame: RTMP message lengths are
    /// 24 bits wide.
    #[error("message length {0} exceeds the maximum of {1}")]
    MessageTooLarge(usize, usize),
    /// A timestamp or timestamp delta does not fit in 24 bits. This encoder
    /// never emits the extended-timestamp form; callers are responsible for
    /// keeping deltas under 2^24.
    #[error("timestamp {0} exceeds the maximum of {1} this encoder will frame without an extended timestamp")]
    TimestampTooLarge(u32, u32),
}

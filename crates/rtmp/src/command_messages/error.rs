//! Errors raised while encoding or decoding AMF0 commands.

/// Errors specific to the AMF0 command channel, as opposed to chunk framing
/// or transport errors.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Decoding the AMF0 command payload failed.
    #[error("amf0 decode: {0}")]
    Amf0Decode(#[from] amf0::Amf0Error),
    /// Encoding a command to send failed.
    #[error("chunk encode: {0}")]
    ChunkEncode(#[from] crate::chunk::ChunkEncodeError),
    /// A `_result`/`_error`/`onStatus` reply was missing a field this
    /// client requires to make sense of it.
    #[error("malformed {0} reply: {1}")]
    MalformedReply(&'static str, &'static str),
    /// The server named a `publish` type this client does not recognize.
    #[error("invalid publishing type: {0}")]
    InvalidPublishingType(String),
}

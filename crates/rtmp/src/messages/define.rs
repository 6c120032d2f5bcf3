//! The one-byte message type id carried in every chunk's message header.

/// Identifies the kind of message a chunk's payload holds.
///
/// Defined by the legacy RTMP specification, section 5.4 (protocol control
/// messages) and section 7 (command and data messages).
#[derive(Debug, PartialEq, Eq, Clone, Copy, num_derive::FromPrimitive)]
#[repr(u8)]
pub enum MessageTypeID {
    /// Set Chunk Size (5.4.1)
    SetChunkSize = 1,
    /// Abort Message (5.4.2)
    Abort = 2,
    /// Acknowledgement (5.4.3)
    Acknowledgement = 3,
    /// User Control Message (6.2)
    UserControlEvent = 4,
    /// Window Acknowledgement Size (5.4.4)
    WindowAcknowledgementSize = 5,
    /// Set Peer Bandwidth (5.4.5)
    SetPeerBandwidth = 6,
    /// Audio frame data.
    Audio = 8,
    /// Video frame data.
    Video = 9,
    /// AMF3-encoded metadata.
    DataAMF3 = 15,
    /// AMF3-encoded shared object.
    SharedObjAMF3 = 16,
    /// AMF3-encoded command.
    CommandAMF3 = 17,
    /// AMF0-encoded metadata.
    DataAMF0 = 18,
    /// AMF0-encoded shared object.
    SharedObjAMF0 = 19,
    /// AMF0-encoded command.
    CommandAMF0 = 20,
    /// Aggregate message.
    Aggregate = 22,
}

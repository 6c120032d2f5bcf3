//! Message types carried inside chunks, once reassembled.

use bytes::Bytes;

use crate::command_messages::RawCommand;
use crate::protocol_control_messages::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageWindowAcknowledgementSize,
};

pub mod define;
pub mod errors;
pub mod reader;

pub use define::MessageTypeID;
pub use errors::MessageError;

/// A reassembled RTMP message, dispatched by [`MessageTypeID`].
///
/// Defined by:
/// - Legacy RTMP spec, 5.4 (protocol control messages) and 7 (commands)
#[derive(Debug)]
pub enum MessageData {
    /// Set Chunk Size message.
    SetChunkSize(ProtocolControlMessageSetChunkSize),
    /// Acknowledgement message.
    Acknowledgement(ProtocolControlMessageAcknowledgement),
    /// Window Acknowledgement Size message.
    WindowAcknowledgementSize(ProtocolControlMessageWindowAcknowledgementSize),
    /// Set Peer Bandwidth message.
    SetPeerBandwidth(ProtocolControlMessageSetPeerBandwidth),
    /// An AMF0 command, decoded only as far as its name and argument list.
    Command(RawCommand),
    /// Any message type this client doesn't act on: aggregates, user
    /// control events, abort, or a message type it doesn't recognize.
    Other {
        /// The message type id, if it was recognized.
        msg_type_id: Option<MessageTypeID>,
        /// The raw message payload.
        data: Bytes,
    },
}

//! Protocol control messages as defined in 5.4.

pub mod define;
pub mod errors;
pub mod reader;
pub mod writer;

pub use define::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageSetPeerBandwidthLimitType, ProtocolControlMessageWindowAcknowledgementSize,
};
pub use errors::ProtocolControlMessageError;

//! Reading [`MessageData`] out of a reassembled [`Chunk`].

use super::{MessageData, MessageTypeID};
use crate::chunk::Chunk;
use crate::command_messages::RawCommand;
use crate::protocol_control_messages::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageWindowAcknowledgementSize,
};

impl MessageData {
    /// Reads [`MessageData`] from the given chunk.
    pub fn read(chunk: &Chunk) -> Result<Self, super::MessageError> {
        match chunk.message_header.msg_type_id {
            MessageTypeID::SetChunkSize => {
                let data = ProtocolControlMessageSetChunkSize::read(&chunk.payload)?;
                Ok(Self::SetChunkSize(data))
            }
            MessageTypeID::Acknowledgement => {
                let data = ProtocolControlMessageAcknowledgement::read(&chunk.payload)?;
                Ok(Self::Acknowledgement(data))
            }
            MessageTypeID::WindowAcknowledgementSize => {
                let data = ProtocolControlMessageWindowAcknowledgementSize::read(&chunk.payload)?;
                Ok(Self::WindowAcknowledgementSize(data))
            }
            MessageTypeID::SetPeerBandwidth => {
                let data = ProtocolControlMessageSetPeerBandwidth::read(&chunk.payload)?;
                Ok(Self::SetPeerBandwidth(data))
            }
            MessageTypeID::CommandAMF0 => {
                let command = RawCommand::read(&chunk.payload)?;
                Ok(Self::Command(command))
            }
            other => Ok(Self::Other {
                msg_type_id: Some(other),
                data: chunk.payload.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use amf0::Amf0Encoder;
    use bytes::Bytes;

    use super::*;

    #[test]
    fn reads_set_chunk_size() {
        let chunk = Chunk::new(2, 0, MessageTypeID::SetChunkSize, 0, Bytes::from_static(&[0x00, 0xFF, 0xFF, 0xFF]));
        let message = MessageData::read(&chunk).unwrap();
        match message {
            MessageData::SetChunkSize(ProtocolControlMessageSetChunkSize { chunk_size }) => {
                assert_eq!(chunk_size, 0x00FF_FFFF);
            }
            _ => panic!("wrong message type"),
        }
    }

    #[test]
    fn reads_command() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_string(&mut buf, "_result").unwrap();
        Amf0Encoder::encode_number(&mut buf, 1.0).unwrap();
        Amf0Encoder::encode_null(&mut buf).unwrap();

        let chunk = Chunk::new(3, 0, MessageTypeID::CommandAMF0, 0, Bytes::from(buf));
        let message = MessageData::read(&chunk).unwrap();
        match message {
            MessageData::Command(command) => {
                assert_eq!(command.command_name, "_result");
                assert_eq!(command.transaction_id, 1.0);
            }
            _ => panic!("wrong message type"),
        }
    }

    #[test]
    fn reads_unknown_as_other() {
        let chunk = Chunk::new(3, 0, MessageTypeID::Aggregate, 0, Bytes::from_static(&[0x01]));
        let message = MessageData::read(&chunk).unwrap();
        assert!(matches!(message, MessageData::Other {
            msg_type_id: Some(MessageTypeID::Aggregate),
            ..
        }));
    }
}

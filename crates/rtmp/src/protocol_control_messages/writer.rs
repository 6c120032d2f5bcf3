//! Writing protocol control messages.

use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;

use super::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageWindowAcknowledgementSize,
};
use crate::chunk::{Chunk, ChunkEncoder, CONTROL_CHUNK_STREAM_ID};
use crate::messages::MessageTypeID;
use crate::protocol_control_messages::ProtocolControlMessageError;

impl ProtocolControlMessageSetChunkSize {
    /// Writes the [`ProtocolControlMessageSetChunkSize`] to the given writer.
    pub fn write(&self, io: &mut impl io::Write, encoder: &ChunkEncoder) -> Result<(), ProtocolControlMessageError> {
        // The first bit must be 0.
        let chunk_size = self.chunk_size & 0x7FFF_FFFF;

        encoder.write_chunk(
            io,
            Chunk::new(
                CONTROL_CHUNK_STREAM_ID,
                0,
                MessageTypeID::SetChunkSize,
                0,
                Bytes::from(chunk_size.to_be_bytes().to_vec()),
            ),
        )?;

        Ok(())
    }
}

impl ProtocolControlMessageAcknowledgement {
    /// Writes the [`ProtocolControlMessageAcknowledgement`] to the given writer.
    pub fn write(&self, io: &mut impl io::Write, encoder: &ChunkEncoder) -> Result<(), ProtocolControlMessageError> {
        encoder.write_chunk(
            io,
            Chunk::new(
                CONTROL_CHUNK_STREAM_ID,
                0,
                MessageTypeID::Acknowledgement,
                0,
                Bytes::from(self.sequence_number.to_be_bytes().to_vec()),
            ),
        )?;

        Ok(())
    }
}

impl ProtocolControlMessageWindowAcknowledgementSize {
    /// Writes the [`ProtocolControlMessageWindowAcknowledgementSize`] to the given writer.
    pub fn write(&self, io: &mut impl io::Write, encoder: &ChunkEncoder) -> Result<(), ProtocolControlMessageError> {
        encoder.write_chunk(
            io,
            Chunk::new(
                CONTROL_CHUNK_STREAM_ID,
                0,
                MessageTypeID::WindowAcknowledgementSize,
                0,
                Bytes::from(self.acknowledgement_window_size.to_be_bytes().to_vec()),
            ),
        )?;

        Ok(())
    }
}

impl ProtocolControlMessageSetPeerBandwidth {
    /// Writes the [`ProtocolControlMessageSetPeerBandwidth`] to the given writer.
    pub fn write(&self, io: &mut impl io::Write, encoder: &ChunkEncoder) -> Result<(), ProtocolControlMessageError> {
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(self.acknowledgement_window_size)
            .expect("writing to a Vec never fails");
        data.write_u8(self.limit_type as u8).expect("writing to a Vec never fails");

        encoder.write_chunk(
            io,
            Chunk::new(CONTROL_CHUNK_STREAM_ID, 0, MessageTypeID::SetPeerBandwidth, 0, Bytes::from(data)),
        )?;

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::chunk::{ChunkDecoder, ChunkReadOutcome};
    use crate::protocol_control_messages::ProtocolControlMessageSetPeerBandwidthLimitType;

    fn decode_one(buf: &[u8]) -> Chunk {
        let mut decoder = ChunkDecoder::default();
        match decoder.read_chunk(buf).unwrap() {
            ChunkReadOutcome::Message { chunk, .. } => chunk,
            other => panic!("expected a complete message, got {other:?}"),
        }
    }

    #[test]
    fn write_set_chunk_size() {
        let encoder = ChunkEncoder::default();
        let mut buf = Vec::new();

        ProtocolControlMessageSetChunkSize { chunk_size: 1 }.write(&mut buf, &encoder).unwrap();

        let chunk = decode_one(&buf);
        assert_eq!(chunk.basic_header.chunk_stream_id, 0x02);
        assert_eq!(chunk.message_header.msg_type_id, MessageTypeID::SetChunkSize);
        assert_eq!(chunk.message_header.msg_stream_id, 0);
        assert_eq!(&chunk.payload[..], &[0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn write_acknowledgement() {
        let encoder = ChunkEncoder::default();
        let mut buf = Vec::new();

        ProtocolControlMessageAcknowledgement { sequence_number: 1 }
            .write(&mut buf, &encoder)
            .unwrap();

        let chunk = decode_one(&buf);
        assert_eq!(chunk.message_header.msg_type_id, MessageTypeID::Acknowledgement);
        assert_eq!(&chunk.payload[..], &[0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn write_window_acknowledgement_size() {
        let encoder = ChunkEncoder::default();
        let mut buf = Vec::new();

        ProtocolControlMessageWindowAcknowledgementSize {
            acknowledgement_window_size: 1,
        }
        .write(&mut buf, &encoder)
        .unwrap();

        let chunk = decode_one(&buf);
        assert_eq!(chunk.message_header.msg_type_id, MessageTypeID::WindowAcknowledgementSize);
        assert_eq!(&chunk.payload[..], &[0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn write_set_peer_bandwidth() {
        let encoder = ChunkEncoder::default();
        let mut buf = Vec::new();

        ProtocolControlMessageSetPeerBandwidth {
            acknowledgement_window_size: 1,
            limit_type: ProtocolControlMessageSetPeerBandwidthLimitType::Dynamic,
        }
        .write(&mut buf, &encoder)
        .unwrap();

        let chunk = decode_one(&buf);
        assert_eq!(chunk.message_header.msg_type_id, MessageTypeID::SetPeerBandwidth);
        assert_eq!(&chunk.payload[..], &[0x00, 0x00, 0x00, 0x01, 0x02]);
    }
}

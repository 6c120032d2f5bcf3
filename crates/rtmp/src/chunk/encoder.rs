use std::io;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use super::define::{Chunk, ChunkMessageHeader, ChunkType, INIT_CHUNK_SIZE};
use super::errors::ChunkEncodeError;
use crate::messages::MessageTypeID;

/// Splits outgoing messages into chunks of a negotiated size.
///
/// A fresh message is always framed with a fmt=0 basic header
/// ([`write_chunk`](Self::write_chunk)); once a chunk stream has an
/// established timestamp, later messages on the same stream can instead be
/// framed as a timestamp delta with [`write_delta_chunk`](Self::write_delta_chunk),
/// which uses a fmt=1 header. Either way, payload bytes beyond the first
/// `chunk_size` are continued with fmt=3 chunks carrying no header of their
/// own.
pub struct ChunkEncoder {
    chunk_size: usize,
}

impl Default for ChunkEncoder {
    fn default() -> Self {
        Self {
            chunk_size: INIT_CHUNK_SIZE,
        }
    }
}

impl ChunkEncoder {
    /// Set the chunk size.
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size;
    }

    /// Internal function to write the basic header.
    #[inline]
    fn write_basic_header(writer: &mut impl io::Write, fmt: ChunkType, csid: u32) -> Result<(), ChunkEncodeError> {
        let fmt = fmt as u8;

        if csid >= 64 + 255 {
            writer.write_u8((fmt << 6) | 1)?;
            let csid = csid - 64;

            let div = csid / 256;
            let rem = csid % 256;

            writer.write_u8(rem as u8)?;
            writer.write_u8(div as u8)?;
        } else if csid >= 64 {
            writer.write_u8(fmt << 6)?;
            writer.write_u8((csid - 64) as u8)?;
        } else {
            writer.write_u8((fmt << 6) | csid as u8)?;
        }

        Ok(())
    }

    /// Internal function to write the full (fmt=0) message header.
    ///
    /// This encoder never emits the extended-timestamp form: a timestamp
    /// that does not fit in 24 bits is rejected outright rather than
    /// clamped, since clamping would silently corrupt the value the peer
    /// reconstructs.
    #[inline]
    fn write_message_header(writer: &mut impl io::Write, message_header: &ChunkMessageHeader) -> Result<(), ChunkEncodeError> {
        if message_header.timestamp >= 0xFFFFFF {
            return Err(ChunkEncodeError::TimestampTooLarge(message_header.timestamp, 0xFFFFFF - 1));
        }

        writer.write_u24::<BigEndian>(message_header.timestamp)?;
        writer.write_u24::<BigEndian>(message_header.msg_length)?;
        writer.write_u8(message_header.msg_type_id as u8)?;
        writer.write_u32::<LittleEndian>(message_header.msg_stream_id)?;

        Ok(())
    }

    /// Internal function to write the fmt=1 delta message header.
    #[inline]
    fn write_delta_message_header(
        writer: &mut impl io::Write,
        delta: u32,
        msg_length: u32,
        msg_type_id: MessageTypeID,
    ) -> Result<(), ChunkEncodeError> {
        if delta >= 0xFFFFFF {
            return Err(ChunkEncodeError::TimestampTooLarge(delta, 0xFFFFFF - 1));
        }

        writer.write_u24::<BigEndian>(delta)?;
        writer.write_u24::<BigEndian>(msg_length)?;
        writer.write_u8(msg_type_id as u8)?;

        Ok(())
    }

    /// Writes a chunk with a fmt=0 basic header, splitting its payload into
    /// fmt=3 continuation chunks as needed.
    pub fn write_chunk(&self, writer: &mut impl io::Write, mut chunk_info: Chunk) -> Result<(), ChunkEncodeError> {
        Self::write_basic_header(writer, ChunkType::Type0, chunk_info.basic_header.chunk_stream_id)?;

        Self::write_message_header(writer, &chunk_info.message_header)?;

        while !chunk_info.payload.is_empty() {
            let cur_payload_size = chunk_info.payload.len().min(self.chunk_size);

            let payload_bytes = chunk_info.payload.split_to(cur_payload_size);
            writer.write_all(&payload_bytes[..])?;

            if !chunk_info.payload.is_empty() {
                Self::write_basic_header(writer, ChunkType::Type3, chunk_info.basic_header.chunk_stream_id)?;
            }
        }

        Ok(())
    }

    /// Writes a message as a timestamp delta against the chunk stream's
    /// previously established timestamp, using a fmt=1 basic header. The
    /// message stream id is not written; the peer inherits it from the
    /// stream's last fmt=0/1/2 chunk, which must already have been sent.
    pub fn write_delta_chunk(
        &self,
        writer: &mut impl io::Write,
        csid: u32,
        delta: u32,
        msg_type_id: MessageTypeID,
        mut payload: bytes::Bytes,
    ) -> Result<(), ChunkEncodeError> {
        let msg_length: u32 = payload
            .len()
            .try_into()
            .map_err(|_| ChunkEncodeError::MessageTooLarge(payload.len(), 0x00FF_FFFF))?;

        Self::write_basic_header(writer, ChunkType::Type1, csid)?;
        Self::write_delta_message_header(writer, delta, msg_length, msg_type_id)?;

        while !payload.is_empty() {
            let cur_payload_size = payload.len().min(self.chunk_size);
            let payload_bytes = payload.split_to(cur_payload_size);
            writer.write_all(&payload_bytes[..])?;

            if !payload.is_empty() {
                Self::write_basic_header(writer, ChunkType::Type3, csid)?;
            }
        }

        Ok(())
    }
}

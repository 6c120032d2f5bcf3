use std::collections::HashMap;

use bytes::{Bytes, BytesMut};
use num_traits::FromPrimitive;

use super::define::{Chunk, ChunkBasicHeader, ChunkMessageHeader, ChunkType, EXTENDED_TIMESTAMP_MARKER, INIT_CHUNK_SIZE, MAX_CHUNK_STREAMS, MAX_MESSAGE_LENGTH};
use super::errors::ChunkDecodeError;
use crate::messages::MessageTypeID;

/// What reading one wire-level chunk off a byte buffer accomplished.
#[derive(Debug)]
pub enum ChunkReadOutcome {
    /// `buf` did not contain a complete chunk (basic header, message header
    /// and payload segment). No bytes were consumed and no state changed;
    /// the caller should wait for more bytes and retry with the same data.
    NeedMore,
    /// A chunk was read and appended to its chunk stream's in-progress
    /// message, which is not yet complete. `consumed` bytes of `buf` were
    /// used and should be dropped by the caller.
    Progress {
        /// Number of bytes of `buf` this chunk occupied.
        consumed: usize,
    },
    /// A chunk was read that completed a message. `consumed` bytes of `buf`
    /// were used and should be dropped by the caller.
    Message {
        /// The fully reassembled message.
        chunk: Chunk,
        /// Number of bytes of `buf` this chunk occupied.
        consumed: usize,
    },
}

/// State a chunk decoder keeps per chunk-stream-id: the most recently seen
/// header, for fmt=1/2/3 inheritance, and any message still being
/// reassembled.
#[derive(Debug, Default)]
struct ChunkStreamState {
    last_timestamp: u32,
    last_delta: u32,
    last_msg_length: u32,
    last_msg_type_id: Option<MessageTypeID>,
    last_msg_stream_id: u32,
    last_extended: bool,
    partial: Option<PartialMessage>,
}

#[derive(Debug)]
struct PartialMessage {
    header: ChunkMessageHeader,
    buf: BytesMut,
    extended: bool,
}

/// Reassembles chunks read off the wire back into complete messages.
///
/// Chunk streams are tracked independently by chunk-stream-id, so a
/// fmt=3 continuation is only ever matched against that same stream's own
/// in-progress message: two chunk streams can each have a message
/// in flight at once, and their chunks can freely interleave on the wire.
pub struct ChunkDecoder {
    chunk_size: usize,
    streams: HashMap<u32, ChunkStreamState>,
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self {
            chunk_size: INIT_CHUNK_SIZE,
            streams: HashMap::new(),
        }
    }
}

/// A cursor over a borrowed byte slice that reports insufficient data as
/// `None` rather than consuming partial reads.
struct Peek<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Peek<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn u8(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn u24_be(&mut self) -> Option<u32> {
        let s = self.take(3)?;
        Some(((s[0] as u32) << 16) | ((s[1] as u32) << 8) | s[2] as u32)
    }

    fn u32_be(&mut self) -> Option<u32> {
        let s = self.take(4)?;
        Some(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }

    fn u32_le(&mut self) -> Option<u32> {
        let s = self.take(4)?;
        Some(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(s)
    }
}

impl ChunkDecoder {
    /// Updates the payload size this decoder expects incoming chunks to be
    /// split at, in response to a peer `SetChunkSize`.
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size;
    }

    /// Attempts to read one wire chunk from the front of `buf`.
    ///
    /// Returns [`ChunkReadOutcome::NeedMore`] without touching any decoder
    /// state if `buf` does not yet hold a complete chunk; the caller must
    /// not advance its read cursor in that case.
    pub fn read_chunk(&mut self, buf: &[u8]) -> Result<ChunkReadOutcome, ChunkDecodeError> {
        let mut p = Peek::new(buf);

        let Some(first) = p.u8() else {
            return Ok(ChunkReadOutcome::NeedMore);
        };

        let fmt = first >> 6;
        let csid = match first & 0x3F {
            0 => {
                let Some(b) = p.u8() else {
                    return Ok(ChunkReadOutcome::NeedMore);
                };
                64 + b as u32
            }
            1 => {
                let Some(lo) = p.u8() else {
                    return Ok(ChunkReadOutcome::NeedMore);
                };
                let Some(hi) = p.u8() else {
                    return Ok(ChunkReadOutcome::NeedMore);
                };
                64 + lo as u32 + hi as u32 * 256
            }
            csid => csid as u32,
        };

        if csid >= MAX_CHUNK_STREAMS {
            return Err(ChunkDecodeError::InvalidChunkStreamId(csid, MAX_CHUNK_STREAMS));
        }

        let chunk_type = match fmt {
            0 => ChunkType::Type0,
            1 => ChunkType::Type1,
            2 => ChunkType::Type2,
            _ => ChunkType::Type3,
        };

        let state = self.streams.entry(csid).or_default();

        let (header, extended, is_continuation) = match chunk_type {
            ChunkType::Type0 => {
                if state.partial.is_some() {
                    return Err(ChunkDecodeError::UnexpectedHeaderMidMessage(csid));
                }

                let (Some(mut ts), Some(msg_length), Some(type_byte), Some(msg_stream_id)) = (p.u24_be(), p.u24_be(), p.u8(), p.u32_le()) else {
                    return Ok(ChunkReadOutcome::NeedMore);
                };

                let extended = ts == EXTENDED_TIMESTAMP_MARKER;
                if extended {
                    let Some(real_ts) = p.u32_be() else {
                        return Ok(ChunkReadOutcome::NeedMore);
                    };
                    ts = real_ts;
                }

                let msg_type_id =
                    MessageTypeID::from_u8(type_byte).ok_or(ChunkDecodeError::InvalidMessageTypeID(type_byte))?;

                (
                    ChunkMessageHeader {
                        timestamp: ts,
                        msg_length,
                        msg_type_id,
                        msg_stream_id,
                    },
                    extended,
                    false,
                )
            }
            ChunkType::Type1 => {
                if state.partial.is_some() {
                    return Err(ChunkDecodeError::UnexpectedHeaderMidMessage(csid));
                }
                if state.last_msg_type_id.is_none() {
                    return Err(ChunkDecodeError::MissingPreviousChunkHeader(csid));
                }

                let (Some(mut delta), Some(msg_length), Some(type_byte)) = (p.u24_be(), p.u24_be(), p.u8()) else {
                    return Ok(ChunkReadOutcome::NeedMore);
                };

                let extended = delta == EXTENDED_TIMESTAMP_MARKER;
                if extended {
                    let Some(real_delta) = p.u32_be() else {
                        return Ok(ChunkReadOutcome::NeedMore);
                    };
                    delta = real_delta;
                }

                let msg_type_id =
                    MessageTypeID::from_u8(type_byte).ok_or(ChunkDecodeError::InvalidMessageTypeID(type_byte))?;

                (
                    ChunkMessageHeader {
                        timestamp: state.last_timestamp.wrapping_add(delta),
                        msg_length,
                        msg_type_id,
                        msg_stream_id: state.last_msg_stream_id,
                    },
                    extended,
                    false,
                )
            }
            ChunkType::Type2 => {
                if state.partial.is_some() {
                    return Err(ChunkDecodeError::UnexpectedHeaderMidMessage(csid));
                }
                let Some(msg_type_id) = state.last_msg_type_id else {
                    return Err(ChunkDecodeError::MissingPreviousChunkHeader(csid));
                };

                let Some(mut delta) = p.u24_be() else {
                    return Ok(ChunkReadOutcome::NeedMore);
                };

                let extended = delta == EXTENDED_TIMESTAMP_MARKER;
                if extended {
                    let Some(real_delta) = p.u32_be() else {
                        return Ok(ChunkReadOutcome::NeedMore);
                    };
                    delta = real_delta;
                }

                (
                    ChunkMessageHeader {
                        timestamp: state.last_timestamp.wrapping_add(delta),
                        msg_length: state.last_msg_length,
                        msg_type_id,
                        msg_stream_id: state.last_msg_stream_id,
                    },
                    extended,
                    false,
                )
            }
            ChunkType::Type3 => {
                if let Some(partial) = &state.partial {
                    if partial.extended {
                        let Some(real_ts) = p.u32_be() else {
                            return Ok(ChunkReadOutcome::NeedMore);
                        };
                        let _ = real_ts;
                    }
                    (partial.header.clone(), partial.extended, true)
                } else {
                    let Some(msg_type_id) = state.last_msg_type_id else {
                        return Err(ChunkDecodeError::MissingPreviousChunkHeader(csid));
                    };
                    if state.last_extended {
                        return Err(ChunkDecodeError::TimestampOverflow(csid));
                    }

                    (
                        ChunkMessageHeader {
                            timestamp: state.last_timestamp.wrapping_add(state.last_delta),
                            msg_length: state.last_msg_length,
                            msg_type_id,
                            msg_stream_id: state.last_msg_stream_id,
                        },
                        false,
                        false,
                    )
                }
            }
        };

        if header.msg_length > MAX_MESSAGE_LENGTH {
            return Err(ChunkDecodeError::MessageTooLarge(header.msg_length, MAX_MESSAGE_LENGTH));
        }

        let already_have = if is_continuation {
            state.partial.as_ref().map(|p| p.buf.len()).unwrap_or(0)
        } else {
            0
        };
        let remaining_for_message = header.msg_length as usize - already_have;
        let this_chunk_payload = remaining_for_message.min(self.chunk_size);

        let Some(payload) = p.take(this_chunk_payload) else {
            return Ok(ChunkReadOutcome::NeedMore);
        };

        let consumed = p.pos;

        let delta = header.timestamp.wrapping_sub(state.last_timestamp);
        state.last_timestamp = header.timestamp;
        state.last_delta = delta;
        state.last_msg_length = header.msg_length;
        state.last_msg_type_id = Some(header.msg_type_id);
        state.last_msg_stream_id = header.msg_stream_id;
        state.last_extended = extended;

        let mut buf = match state.partial.take() {
            Some(partial) => partial.buf,
            None => BytesMut::with_capacity(header.msg_length as usize),
        };
        buf.extend_from_slice(payload);

        if buf.len() == header.msg_length as usize {
            let chunk = Chunk {
                basic_header: ChunkBasicHeader {
                    chunk_type,
                    chunk_stream_id: csid,
                },
                message_header: header,
                payload: Bytes::from(buf),
            };
            Ok(ChunkReadOutcome::Message { chunk, consumed })
        } else {
            state.partial = Some(PartialMessage { header, buf, extended });
            Ok(ChunkReadOutcome::Progress { consumed })
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::chunk::encoder::ChunkEncoder;

    #[test]
    fn decodes_single_chunk_message() {
        let chunk = Chunk::new(3, 0, MessageTypeID::CommandAMF0, 0, Bytes::from_static(b"hello"));
        let encoder = ChunkEncoder::default();
        let mut wire = Vec::new();
        encoder.write_chunk(&mut wire, chunk).unwrap();

        let mut decoder = ChunkDecoder::default();
        let outcome = decoder.read_chunk(&wire).unwrap();
        match outcome {
            ChunkReadOutcome::Message { chunk, consumed } => {
                assert_eq!(consumed, wire.len());
                assert_eq!(&chunk.payload[..], b"hello");
                assert_eq!(chunk.message_header.msg_type_id, MessageTypeID::CommandAMF0);
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn reports_need_more_without_consuming() {
        let chunk = Chunk::new(3, 0, MessageTypeID::CommandAMF0, 0, Bytes::from_static(b"hello world"));
        let encoder = ChunkEncoder::default();
        let mut wire = Vec::new();
        encoder.write_chunk(&mut wire, chunk).unwrap();

        let mut decoder = ChunkDecoder::default();
        let outcome = decoder.read_chunk(&wire[..wire.len() - 1]).unwrap();
        assert!(matches!(outcome, ChunkReadOutcome::NeedMore));
    }

    #[test]
    fn interleaves_partial_messages_across_chunk_streams() {
        let mut decoder = ChunkDecoder::default();
        decoder.set_chunk_size(4);

        let encoder = ChunkEncoder::default();

        // Two independent messages on different chunk streams, each split
        // across several chunks.
        let a = Chunk::new(4, 0, MessageTypeID::Audio, 1, Bytes::from_static(b"AAAAAAAAAAAA"));
        let b = Chunk::new(5, 0, MessageTypeID::Video, 1, Bytes::from_static(b"BBBBBBBBBBBB"));

        let mut wire_a = Vec::new();
        encoder.write_chunk(&mut wire_a, a).unwrap();
        let mut wire_b = Vec::new();
        encoder.write_chunk(&mut wire_b, b).unwrap();

        // Interleave: first chunk of A, first chunk of B, remaining chunks
        // of A, remaining chunks of B. A non-interleaving-aware reassembler
        // would reject the fmt=3 continuation of A because the most recent
        // header belonged to B.
        let a_chunk_len = 1 + 11 + 4; // basic header + fmt0 header + 4 payload bytes
        let b_chunk_len = 1 + 11 + 4;

        let mut interleaved = Vec::new();
        interleaved.extend_from_slice(&wire_a[..a_chunk_len]);
        interleaved.extend_from_slice(&wire_b[..b_chunk_len]);
        interleaved.extend_from_slice(&wire_a[a_chunk_len..]);
        interleaved.extend_from_slice(&wire_b[b_chunk_len..]);

        let mut pos = 0;
        let mut messages = Vec::new();
        while pos < interleaved.len() {
            match decoder.read_chunk(&interleaved[pos..]).unwrap() {
                ChunkReadOutcome::NeedMore => panic!("unexpected need-more with all bytes present"),
                ChunkReadOutcome::Progress { consumed } => pos += consumed,
                ChunkReadOutcome::Message { chunk, consumed } => {
                    pos += consumed;
                    messages.push(chunk);
                }
            }
        }

        assert_eq!(messages.len(), 2);
        let payloads: Vec<_> = messages.iter().map(|c| c.payload.clone()).collect();
        assert!(payloads.contains(&Bytes::from_static(b"AAAAAAAAAAAA")));
        assert!(payloads.contains(&Bytes::from_static(b"BBBBBBBBBBBB")));
    }

    #[test]
    fn rejects_continuation_with_no_prior_header() {
        let mut decoder = ChunkDecoder::default();
        // fmt=3, csid=7, no payload: 0xC7.
        let wire = [0xC7u8];
        let err = decoder.read_chunk(&wire).unwrap_err();
        assert!(matches!(err, ChunkDecodeError::MissingPreviousChunkHeader(7)));
    }

    #[test]
    fn rejects_new_header_mid_message() {
        let mut decoder = ChunkDecoder::default();
        decoder.set_chunk_size(2);

        let chunk = Chunk::new(3, 0, MessageTypeID::CommandAMF0, 0, Bytes::from_static(b"hello"));
        let encoder = ChunkEncoder::default();
        let mut wire = Vec::new();
        encoder.write_chunk(&mut wire, chunk).unwrap();

        // First wire-chunk only (basic header + message header + 2 payload bytes).
        let first_len = 1 + 11 + 2;
        let outcome = decoder.read_chunk(&wire[..first_len]).unwrap();
        assert!(matches!(outcome, ChunkReadOutcome::Progress { .. }));

        // A fresh fmt=0 header on the same stream before the message finished.
        let wire2 = {
            let c2 = Chunk::new(3, 5, MessageTypeID::CommandAMF0, 0, Bytes::from_static(b"x"));
            let mut w = Vec::new();
            encoder.write_chunk(&mut w, c2).unwrap();
            w
        };
        let err = decoder.read_chunk(&wire2).unwrap_err();
        assert!(matches!(err, ChunkDecodeError::UnexpectedHeaderMidMessage(3)));
    }
}

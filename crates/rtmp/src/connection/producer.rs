//! The producer-visible half of a connection: the send ring, the chunk
//! encoder, and the per-media-kind timestamp tracks. Everything in
//! [`ProducerState`] is guarded by one exclusive lock, shared between
//! producer threads and the I/O worker (see [`crate::connection::Connection`]).

use std::io;

use amf0::Amf0Value;
use bytes::{BufMut, Bytes, BytesMut};
use rtmp_ring_buffer::RingBuffer;

use super::state::{ConnectionState, TimestampTrack};
use crate::chunk::{ChunkEncoder, Chunk, AUDIO_CHUNK_STREAM_ID, VIDEO_CHUNK_STREAM_ID, COMMAND_CHUNK_STREAM_ID};
use crate::command_messages::netstream::encode_set_data_frame;
use crate::messages::MessageTypeID;

/// Codec tag this client announces in `onMetaData.encoder`, matching the
/// `flashVer` this client sends with `connect`.
const METADATA_ENCODER: &str = "rtmp-client";

/// Codec configuration the media pipeline hands the core exactly once,
/// right after `StreamReady`, to announce the stream before any frames.
#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub bitrate_kbps: u32,
    /// The opaque `AVCDecoderConfigurationRecord` blob, forwarded verbatim.
    pub avc_decoder_configuration_record: Bytes,
}

/// Symmetric to [`VideoConfig`], for the audio track.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub sample_rate: u32,
    /// 1 (mono) or 2 (stereo).
    pub channels: u8,
    pub bitrate_kbps: u32,
    /// The opaque `AudioSpecificConfig` blob, forwarded verbatim.
    pub audio_specific_config: Bytes,
}

/// A bounded [`io::Write`] over a borrowed slice that reports how many
/// bytes it actually accepted. Used to stage an encoded chunk into the
/// ring's writable window without ever writing past it: if the chunk
/// doesn't fit, `std`'s `write_all` sees a short write and fails, and the
/// caller discards the partial write by never calling `end_write`.
struct RingWriteCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> RingWriteCursor<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }
}

impl io::Write for RingWriteCursor<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let remaining = self.buf.len() - self.pos;
        let n = remaining.min(data.len());
        self.buf[self.pos..self.pos + n].copy_from_slice(&data[..n]);
        self.pos += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Encodes one chunk and stages it into `ring`'s writable window. Returns
/// `false`, leaving the ring untouched, if the chunk doesn't fit or the
/// timestamp/delta is too large to frame without an extended timestamp.
fn stage(ring: &mut RingBuffer, encoder: &ChunkEncoder, fmt0: bool, csid: u32, ts_or_delta: u32, msg_type_id: MessageTypeID, msg_stream_id: u32, payload: Bytes) -> bool {
    let result = {
        let mut cursor = RingWriteCursor::new(ring.begin_write());
        let result = if fmt0 {
            encoder.write_chunk(&mut cursor, Chunk::new(csid, ts_or_delta, msg_type_id, msg_stream_id, payload))
        } else {
            encoder.write_delta_chunk(&mut cursor, csid, ts_or_delta, msg_type_id, payload)
        };
        result.map(|()| cursor.pos)
    };

    match result {
        Ok(written) => {
            ring.end_write(written).expect("cursor never writes past the ring's free space");
            true
        }
        Err(_) => false,
    }
}

/// Everything shared between producer threads and the I/O worker: the send
/// ring, the chunk encoder, the negotiated stream id, the timestamp tracks,
/// and the connection state (so the producer API can reject calls outside
/// `StreamReady` without a second lock).
pub(crate) struct ProducerState {
    pub ring: RingBuffer,
    pub encoder: ChunkEncoder,
    pub stream_id: u32,
    pub state: ConnectionState,
    pub tracks: TimestampTrack,
}

impl ProducerState {
    pub fn new(ring: RingBuffer) -> Self {
        Self {
            ring,
            encoder: ChunkEncoder::default(),
            stream_id: 0,
            state: ConnectionState::NotConnected,
            tracks: TimestampTrack::default(),
        }
    }

    /// Stages `@setDataFrame`/`onMetaData`, the video config packet, and
    /// the audio config packet, in that order. Each config packet is
    /// emitted as an absolute (fmt=0) chunk with timestamp zero, becoming
    /// the baseline later `send_video`/`send_audio` deltas are computed
    /// against.
    pub fn send_config(&mut self, video: Option<&VideoConfig>, audio: Option<&AudioConfig>) -> bool {
        if !self.state.is_streaming() {
            return false;
        }

        let mut metadata = vec![
            ("duration".to_string(), Amf0Value::Number(0.0)),
            ("filesize".to_string(), Amf0Value::Number(0.0)),
            ("encoder".to_string(), Amf0Value::String(METADATA_ENCODER.to_string())),
        ];
        if let Some(v) = video {
            metadata.push(("videocodecid".to_string(), Amf0Value::Number(7.0)));
            metadata.push(("videodatarate".to_string(), Amf0Value::Number(v.bitrate_kbps as f64)));
            metadata.push(("framerate".to_string(), Amf0Value::Number(v.frame_rate)));
            metadata.push(("width".to_string(), Amf0Value::Number(v.width as f64)));
            metadata.push(("height".to_string(), Amf0Value::Number(v.height as f64)));
        }
        if let Some(a) = audio {
            metadata.push(("audiocodecid".to_string(), Amf0Value::Number(10.0)));
            metadata.push(("audiodatarate".to_string(), Amf0Value::Number(a.bitrate_kbps as f64)));
            metadata.push(("audiosamplerate".to_string(), Amf0Value::Number(a.sample_rate as f64)));
            metadata.push(("audiosamplesize".to_string(), Amf0Value::Number(16.0)));
            metadata.push(("audiochannels".to_string(), Amf0Value::Number(a.channels as f64)));
            metadata.push(("stereo".to_string(), Amf0Value::Boolean(a.channels == 2)));
        }

        let mut metadata_payload = Vec::new();
        if encode_set_data_frame(&mut metadata_payload, &metadata).is_err() {
            return false;
        }
        let mut ok = stage(
            &mut self.ring,
            &self.encoder,
            true,
            COMMAND_CHUNK_STREAM_ID,
            0,
            MessageTypeID::DataAMF0,
            self.stream_id,
            Bytes::from(metadata_payload),
        );

        if let Some(v) = video {
            let mut payload = BytesMut::with_capacity(5 + v.avc_decoder_configuration_record.len());
            payload.put_u8((1 << 4) | 7);
            payload.put_u8(0x00);
            payload.put_bytes(0, 3);
            payload.extend_from_slice(&v.avc_decoder_configuration_record);
            ok &= stage(
                &mut self.ring,
                &self.encoder,
                true,
                VIDEO_CHUNK_STREAM_ID,
                0,
                MessageTypeID::Video,
                self.stream_id,
                payload.freeze(),
            );
        }

        if let Some(a) = audio {
            let mut payload = BytesMut::with_capacity(2 + a.audio_specific_config.len());
            payload.put_u8((10 << 4) | (3 << 2) | (1 << 1) | 1);
            payload.put_u8(0x00);
            payload.extend_from_slice(&a.audio_specific_config);
            ok &= stage(
                &mut self.ring,
                &self.encoder,
                true,
                AUDIO_CHUNK_STREAM_ID,
                0,
                MessageTypeID::Audio,
                self.stream_id,
                payload.freeze(),
            );
        }

        ok
    }

    /// Stages one video frame. `decode_t`/`present_t` are raw timestamps in
    /// `time_base` units; both are converted to milliseconds. The chunk
    /// timestamp delta is computed against the decode timestamp, but the
    /// track recorded for the *next* call is the presentation timestamp —
    /// this mirrors how composition offset and decode order interact in the
    /// FLV/AVC framing this packet uses.
    pub fn send_video(&mut self, decode_t: i64, present_t: i64, time_base: u32, bytes: &[u8], is_keyframe: bool) -> bool {
        if !self.state.is_streaming() {
            return false;
        }

        let decode_ms = to_millis(decode_t, time_base);
        let present_ms = to_millis(present_t, time_base);
        let delta = decode_ms.saturating_sub(self.tracks.video_ms) as u32;
        let composition_offset = (present_ms as i64 - decode_ms as i64) as i32;

        let mut payload = BytesMut::with_capacity(5 + bytes.len());
        payload.put_u8(((if is_keyframe { 1u8 } else { 2u8 }) << 4) | 7);
        payload.put_u8(0x01);
        payload.put_u8(((composition_offset >> 16) & 0xFF) as u8);
        payload.put_u8(((composition_offset >> 8) & 0xFF) as u8);
        payload.put_u8((composition_offset & 0xFF) as u8);
        payload.extend_from_slice(bytes);

        let staged = stage(
            &mut self.ring,
            &self.encoder,
            false,
            VIDEO_CHUNK_STREAM_ID,
            delta,
            MessageTypeID::Video,
            self.stream_id,
            payload.freeze(),
        );
        if staged {
            self.tracks.video_ms = present_ms;
        }
        staged
    }

    /// Stages one audio frame. `t` is a raw timestamp in `time_base` units.
    pub fn send_audio(&mut self, t: i64, time_base: u32, bytes: &[u8]) -> bool {
        if !self.state.is_streaming() {
            return false;
        }

        let t_ms = to_millis(t, time_base);
        let delta = t_ms.saturating_sub(self.tracks.audio_ms) as u32;

        let mut payload = BytesMut::with_capacity(2 + bytes.len());
        payload.put_u8((10 << 4) | (3 << 2) | (1 << 1) | 1);
        payload.put_u8(0x01);
        payload.extend_from_slice(bytes);

        let staged = stage(
            &mut self.ring,
            &self.encoder,
            false,
            AUDIO_CHUNK_STREAM_ID,
            delta,
            MessageTypeID::Audio,
            self.stream_id,
            payload.freeze(),
        );
        if staged {
            self.tracks.audio_ms = t_ms;
        }
        staged
    }
}

fn to_millis(t: i64, time_base: u32) -> u64 {
    (t as i128 * 1000 / time_base as i128).max(0) as u64
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use crate::chunk::{ChunkDecoder, ChunkReadOutcome};

    use super::*;

    fn ready(capacity: usize) -> ProducerState {
        let mut producer = ProducerState::new(RingBuffer::new(capacity).unwrap());
        producer.state = ConnectionState::StreamReady;
        producer.stream_id = 1;
        producer
    }

    fn drain_all(ring: &mut RingBuffer) -> Vec<Chunk> {
        let mut decoder = ChunkDecoder::default();
        let mut wire = ring.begin_read().to_vec();
        ring.end_read(wire.len()).unwrap();

        let mut pos = 0;
        let mut messages = Vec::new();
        while pos < wire.len() {
            match decoder.read_chunk(&wire[pos..]).unwrap() {
                ChunkReadOutcome::NeedMore => break,
                ChunkReadOutcome::Progress { consumed } => pos += consumed,
                ChunkReadOutcome::Message { chunk, consumed } => {
                    pos += consumed;
                    messages.push(chunk);
                }
            }
        }
        let _ = wire.drain(..pos);
        messages
    }

    #[test]
    fn rejects_sends_outside_stream_ready() {
        let mut producer = ProducerState::new(RingBuffer::new(4096).unwrap());
        assert!(!producer.send_video(0, 0, 1000, b"x", true));
        assert!(!producer.send_audio(0, 1000, b"x"));
        assert!(!producer.send_config(None, None));
    }

    #[test]
    fn send_video_stages_a_keyframe_chunk_and_advances_the_track() {
        let mut producer = ready(64 * 1024);
        assert!(producer.send_video(100, 100, 1000, b"nalu", true));
        assert_eq!(producer.tracks.video_ms, 100);

        let messages = drain_all(&mut producer.ring);
        assert_eq!(messages.len(), 1);
        let payload = &messages[0].payload;
        assert_eq!(payload[0], (1 << 4) | 7);
        assert_eq!(payload[1], 0x01);
        assert_eq!(&payload[5..], b"nalu");
    }

    #[test]
    fn send_video_delta_monotonicity() {
        let mut producer = ready(64 * 1024);
        assert!(producer.send_video(100, 100, 1000, b"a", true));
        assert!(producer.send_video(133, 133, 1000, b"b", false));

        let messages = drain_all(&mut producer.ring);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message_header.timestamp, 100);
        assert_eq!(messages[1].message_header.timestamp, 133);
    }

    #[test]
    fn backpressure_drop_leaves_track_unchanged_after_first_success() {
        let mut producer = ready(64 * 1024);
        let frame = vec![0u8; 40 * 1024];

        assert!(producer.send_video(0, 0, 1000, &frame, true));
        assert_eq!(producer.tracks.video_ms, 0);

        assert!(!producer.send_video(10, 10, 1000, &frame, true));
        assert!(!producer.send_video(20, 20, 1000, &frame, true));
        assert_eq!(producer.tracks.video_ms, 0);
    }

    #[test]
    fn send_config_stages_metadata_video_and_audio_packets() {
        let mut producer = ready(64 * 1024);
        let video = VideoConfig {
            width: 1920,
            height: 1080,
            frame_rate: 60.0,
            bitrate_kbps: 6000,
            avc_decoder_configuration_record: Bytes::from_static(b"avcc"),
        };
        let audio = AudioConfig {
            sample_rate: 48000,
            channels: 2,
            bitrate_kbps: 128,
            audio_specific_config: Bytes::from_static(b"asc"),
        };

        assert!(producer.send_config(Some(&video), Some(&audio)));

        let messages = drain_all(&mut producer.ring);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].message_header.msg_type_id, MessageTypeID::DataAMF0);
        assert_eq!(messages[1].message_header.msg_type_id, MessageTypeID::Video);
        assert_eq!(&messages[1].payload[5..], b"avcc");
        assert_eq!(messages[2].message_header.msg_type_id, MessageTypeID::Audio);
        assert_eq!(&messages[2].payload[2..], b"asc");
    }
}

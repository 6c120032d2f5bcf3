mod decoder;
mod define;
mod encoder;
mod errors;

pub use self::decoder::{ChunkDecoder, ChunkReadOutcome};
pub use self::define::{
    AUDIO_CHUNK_STREAM_ID, COMMAND_CHUNK_STREAM_ID, CONTROL_CHUNK_STREAM_ID, Chunk, ChunkBasicHeader, ChunkMessageHeader, ChunkType,
    INIT_CHUNK_SIZE, MAX_MESSAGE_LENGTH, OUT_CHUNK_SIZE, OUT_WINDOW_ACK_SIZE, VIDEO_CHUNK_STREAM_ID,
};
pub use self::encoder::ChunkEncoder;
pub use self::errors::{ChunkDecodeError, ChunkEncodeError};

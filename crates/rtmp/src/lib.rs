//! A pure Rust, non-blocking RTMP publishing client.
//!
//! This crate is the wire-protocol core of a live streaming pipeline: it
//! owns the RTMP handshake, chunk framing, AMF0 command exchange and
//! publish-session state machine. Screen/audio capture and H.264/AAC
//! encoding are someone else's problem; callers hand [`Connection`]
//! already-encoded frames and codec configuration blobs, and it gets them
//! onto the wire as a conformant `publish` session.
//!
//! See [`Connection::init`] for the entry point.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

pub mod chunk;
pub mod command_messages;
mod connection;
mod error;
pub mod handshake;
pub mod messages;
pub mod protocol_control_messages;
mod url;

pub use connection::{AudioConfig, Connection, ConnectionState, VideoConfig};
pub use error::RtmpError;
pub use url::RtmpUrl;

//! Wire constants for the RTMP handshake.
//!
//! Legacy RTMP spec, 5.2.

/// The only RTMP version this client speaks.
pub const RTMP_VERSION: u8 = 3;

/// Size in bytes of C1/S1/C2/S2, not including the one-byte C0/S0.
pub const RTMP_HANDSHAKE_SIZE: usize = 1536;

/// Size of the time+zero (or time+version) header at the front of C1/S1.
pub const TIME_VERSION_LENGTH: usize = 8;

//! The client side of the RTMP handshake (legacy spec, 5.2): C0/C1 out,
//! S0/S1/S2 in, C2 out.

mod client;
mod define;
mod errors;

pub use self::client::{ClientHandshake, HandshakeStep};
pub use self::define::RTMP_HANDSHAKE_SIZE;
pub use self::errors::HandshakeError;

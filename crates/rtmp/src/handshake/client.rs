//! Drives the client side of the plain (non-digest) RTMP handshake.
//!
//! This client always sends an all-zero C1: a timestamp of zero, the
//! required zero field, and 1528 zero bytes in place of "random" data.
//! Nothing about the handshake depends on C1's content being unpredictable,
//! and a fixed payload keeps the wire trace this client produces
//! deterministic.

use bytes::{BufMut, Bytes, BytesMut};

use super::define::{RTMP_HANDSHAKE_SIZE, RTMP_VERSION, TIME_VERSION_LENGTH};
use super::errors::HandshakeError;

/// The outcome of feeding more received bytes to [`ClientHandshake::try_complete`].
#[derive(Debug)]
pub enum HandshakeStep {
    /// Fewer than `1 + 2 * 1536` bytes (S0+S1+S2) are buffered yet; no
    /// bytes were consumed.
    NeedMore,
    /// S0, S1 and S2 were read successfully.
    Complete {
        /// C2 to send next: this client echoes S1 back verbatim, which is
        /// what a peer that skips verifying C2 (as this client does for
        /// the server's C2) expects in return.
        c2: Bytes,
        /// Number of bytes of the input this consumed.
        consumed: usize,
    },
}

/// Client-side handshake driver. Stateless beyond having been constructed;
/// [`Self::c0_c1`] and [`Self::try_complete`] can be called in either order
/// relative to each other as long as C0/C1 is written before S0/S1/S2 is
/// expected to arrive.
#[derive(Debug, Default)]
pub struct ClientHandshake {
    _private: (),
}

impl ClientHandshake {
    /// Creates a new handshake driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds C0+C1: version byte `0x03`, a zero timestamp, the required
    /// zero field, and 1528 zero bytes.
    pub fn c0_c1(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(1 + RTMP_HANDSHAKE_SIZE);
        buf.put_u8(RTMP_VERSION);
        buf.put_bytes(0, TIME_VERSION_LENGTH);
        buf.put_bytes(0, RTMP_HANDSHAKE_SIZE - TIME_VERSION_LENGTH);
        buf.freeze()
    }

    /// Attempts to read S0+S1+S2 from the front of `buf`.
    ///
    /// Returns [`HandshakeStep::NeedMore`] without interpreting anything if
    /// `buf` is not yet long enough; the caller should retry with the same
    /// data once more bytes have arrived.
    pub fn try_complete(&mut self, buf: &[u8]) -> Result<HandshakeStep, HandshakeError> {
        let needed = 1 + RTMP_HANDSHAKE_SIZE * 2;
        if buf.len() < needed {
            return Ok(HandshakeStep::NeedMore);
        }

        let version = buf[0];
        if version != RTMP_VERSION {
            return Err(HandshakeError::UnsupportedVersion(version));
        }

        // S1 occupies the 1536 bytes right after S0; S2 follows it and is
        // not otherwise inspected.
        let s1 = Bytes::copy_from_slice(&buf[1..1 + RTMP_HANDSHAKE_SIZE]);

        Ok(HandshakeStep::Complete { c2: s1, consumed: needed })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn c0_c1_is_all_zero_after_the_version_byte() {
        let handshake = ClientHandshake::new();
        let bytes = handshake.c0_c1();

        assert_eq!(bytes.len(), 1 + RTMP_HANDSHAKE_SIZE);
        assert_eq!(bytes[0], RTMP_VERSION);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn need_more_until_s0_s1_s2_are_all_present() {
        let mut handshake = ClientHandshake::new();
        let short = vec![0u8; 1 + RTMP_HANDSHAKE_SIZE * 2 - 1];
        assert!(matches!(handshake.try_complete(&short).unwrap(), HandshakeStep::NeedMore));
    }

    #[test]
    fn zero_s0_s1_s2_echoes_an_all_zero_c2() {
        let mut handshake = ClientHandshake::new();
        let wire = vec![0u8; 1 + RTMP_HANDSHAKE_SIZE * 2];

        match handshake.try_complete(&wire).unwrap() {
            HandshakeStep::Complete { c2, consumed } => {
                assert_eq!(consumed, wire.len());
                assert_eq!(c2.len(), RTMP_HANDSHAKE_SIZE);
                assert!(c2.iter().all(|&b| b == 0));
            }
            HandshakeStep::NeedMore => panic!("expected completion"),
        }
    }

    #[test]
    fn echoes_the_servers_actual_s1_payload() {
        let mut handshake = ClientHandshake::new();
        let mut wire = vec![RTMP_VERSION];
        let s1: Vec<u8> = (0..RTMP_HANDSHAKE_SIZE).map(|i| (i % 251) as u8).collect();
        wire.extend_from_slice(&s1);
        wire.extend_from_slice(&vec![0u8; RTMP_HANDSHAKE_SIZE]); // S2, ignored

        match handshake.try_complete(&wire).unwrap() {
            HandshakeStep::Complete { c2, .. } => assert_eq!(&c2[..], s1.as_slice()),
            HandshakeStep::NeedMore => panic!("expected completion"),
        }
    }

    #[test]
    fn rejects_unsupported_server_version() {
        let mut handshake = ClientHandshake::new();
        let mut wire = vec![9u8];
        wire.extend_from_slice(&vec![0u8; RTMP_HANDSHAKE_SIZE * 2]);

        let err = handshake.try_complete(&wire).unwrap_err();
        assert!(matches!(err, HandshakeError::UnsupportedVersion(9)));
    }
}

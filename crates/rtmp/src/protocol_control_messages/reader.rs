//! Reading protocol control messages.

use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;

use super::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageSetPeerBandwidthLimitType, ProtocolControlMessageWindowAcknowledgementSize,
};

impl ProtocolControlMessageSetChunkSize {
    /// Reads a [`ProtocolControlMessageSetChunkSize`] from the given data.
    pub fn read(data: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(data);
        let chunk_size = cursor.read_u32::<BigEndian>()?;

        Ok(Self { chunk_size })
    }
}

impl ProtocolControlMessageAcknowledgement {
    /// Reads a [`ProtocolControlMessageAcknowledgement`] from the given data.
    pub fn read(data: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(data);
        let sequence_number = cursor.read_u32::<BigEndian>()?;

        Ok(Self { sequence_number })
    }
}

impl ProtocolControlMessageWindowAcknowledgementSize {
    /// Reads a [`ProtocolControlMessageWindowAcknowledgementSize`] from the given data.
    pub fn read(data: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(data);
        let acknowledgement_window_size = cursor.read_u32::<BigEndian>()?;

        Ok(Self {
            acknowledgement_window_size,
        })
    }
}

impl ProtocolControlMessageSetPeerBandwidth {
    /// Reads a [`ProtocolControlMessageSetPeerBandwidth`] from the given data.
    pub fn read(data: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(data);
        let acknowledgement_window_size = cursor.read_u32::<BigEndian>()?;
        let limit_type_byte = cursor.read_u8()?;
        let limit_type = ProtocolControlMessageSetPeerBandwidthLimitType::from_u8(limit_type_byte)
            .unwrap_or(ProtocolControlMessageSetPeerBandwidthLimitType::Dynamic);

        Ok(Self {
            acknowledgement_window_size,
            limit_type,
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn read_set_chunk_size() {
        let data = vec![0x00, 0x00, 0x00, 0x01];
        let chunk_size = ProtocolControlMessageSetChunkSize::read(&data).unwrap();
        assert_eq!(chunk_size.chunk_size, 1);
    }

    #[test]
    fn read_acknowledgement() {
        let data = vec![0x00, 0x00, 0x00, 0x01];
        let ack = ProtocolControlMessageAcknowledgement::read(&data).unwrap();
        assert_eq!(ack.sequence_number, 1);
    }

    #[test]
    fn read_window_acknowledgement_size() {
        let data = vec![0x00, 0x00, 0x00, 0x01];
        let window_acknowledgement_size = ProtocolControlMessageWindowAcknowledgementSize::read(&data).unwrap();
        assert_eq!(window_acknowledgement_size.acknowledgement_window_size, 1);
    }

    #[test]
    fn read_set_peer_bandwidth() {
        let data = vec![0x00, 0x00, 0x00, 0x01, 0x02];
        let bandwidth = ProtocolControlMessageSetPeerBandwidth::read(&data).unwrap();
        assert_eq!(bandwidth.acknowledgement_window_size, 1);
        assert_eq!(bandwidth.limit_type, ProtocolControlMessageSetPeerBandwidthLimitType::Dynamic);
    }
}

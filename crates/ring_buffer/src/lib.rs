//! A fixed-capacity, power-of-two-sized byte ring buffer.
//!
//! On platforms that support reserving a placeholder address range (all
//! Unix targets this crate builds for), the ring's backing pages are mapped
//! twice, back to back, so [`RingBuffer::begin_read`] and
//! [`RingBuffer::begin_write`] always return one contiguous slice, even
//! when the logical window straddles the wrap point. Elsewhere, the same
//! contract is met by linearizing a wrapped window into a scratch buffer.
#![deny(unreachable_pub)]

mod error;

#[cfg(unix)]
mod mapped;

#[cfg(not(unix))]
mod linear;

#[cfg(unix)]
pub use mapped::RingBuffer;
#[cfg(not(unix))]
pub use linear::RingBuffer;

pub use error::RingBufferError;

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_rounded_to_a_power_of_two() {
        let ring = RingBuffer::new(70_000).unwrap();
        assert!(ring.capacity().is_power_of_two());
        assert!(ring.capacity() >= 70_000);
    }

    #[test]
    fn used_and_free_partition_capacity() {
        let mut ring = RingBuffer::new(64).unwrap();
        let cap = ring.capacity();

        ring.begin_write()[..10].copy_from_slice(&[1u8; 10]);
        ring.end_write(10).unwrap();
        assert_eq!(ring.used(), 10);
        assert_eq!(ring.free(), cap - 10);
        assert_eq!(ring.used() + ring.free(), cap);

        ring.end_read(4).unwrap();
        assert_eq!(ring.used(), 6);
        assert_eq!(ring.free(), cap - 6);
    }

    #[test]
    fn round_trip_preserves_bytes_across_many_wraps() {
        let mut ring = RingBuffer::new(64).unwrap();
        let cap = ring.capacity();

        for round in 0..20u8 {
            let payload: Vec<u8> = (0..17).map(|i| round.wrapping_add(i)).collect();
            assert!(ring.free() >= payload.len());

            ring.begin_write()[..payload.len()].copy_from_slice(&payload);
            ring.end_write(payload.len()).unwrap();

            let read = ring.begin_read();
            assert_eq!(&read[..payload.len()], payload.as_slice());
            ring.end_read(payload.len()).unwrap();

            assert_eq!(ring.used(), 0);
            assert_eq!(ring.free(), cap);
        }
    }

    #[test]
    fn write_of_full_capacity_is_contiguous_at_any_offset() {
        let cap = RingBuffer::new(32).unwrap().capacity();

        // A fresh ring per starting offset: push `shift` bytes through and
        // drop them, so the next write begins exactly `shift` bytes into
        // the mapping, then confirm a full-capacity write/read is still
        // one contiguous slice straddling the wrap point.
        for shift in 0..cap {
            let mut ring = RingBuffer::new(cap).unwrap();
            if shift > 0 {
                ring.begin_write()[..shift].fill(0);
                ring.end_write(shift).unwrap();
                ring.end_read(shift).unwrap();
            }

            let payload: Vec<u8> = (0..cap as u8).collect();
            assert_eq!(ring.free(), cap);
            ring.begin_write()[..cap].copy_from_slice(&payload);
            ring.end_write(cap).unwrap();

            let read = ring.begin_read();
            assert_eq!(read.len(), cap);
            assert_eq!(read, payload.as_slice());
            ring.end_read(cap).unwrap();
        }
    }

    #[test]
    fn end_read_beyond_used_is_rejected() {
        let mut ring = RingBuffer::new(64).unwrap();
        ring.begin_write()[..4].copy_from_slice(&[1, 2, 3, 4]);
        ring.end_write(4).unwrap();

        let err = ring.end_read(5).unwrap_err();
        assert!(matches!(
            err,
            RingBufferError::InsufficientData {
                requested: 5,
                available: 4
            }
        ));
    }

    #[test]
    fn end_write_beyond_free_is_rejected() {
        let mut ring = RingBuffer::new(64).unwrap();
        let cap = ring.capacity();

        ring.begin_write();
        let err = ring.end_write(cap + 1).unwrap_err();
        assert!(matches!(err, RingBufferError::InsufficientSpace { .. }));
    }
}

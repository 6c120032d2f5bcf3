//! Fallback [`RingBuffer`] for hosts without virtual-memory placeholder
//! reservation. Behaves identically to the double-mapped implementation,
//! but a window that would wrap is linearized into a scratch buffer rather
//! than being contiguous in the backing storage itself.

use crate::error::RingBufferError;

fn round_capacity(requested: usize) -> usize {
    requested.max(1).next_power_of_two()
}

/// A fixed-capacity byte ring buffer. See the crate-level docs for the
/// contract; this implementation satisfies it with a copy on wrap instead
/// of a double mapping.
pub struct RingBuffer {
    buf: Vec<u8>,
    capacity: usize,
    read_cursor: u64,
    write_cursor: u64,
    read_scratch: Vec<u8>,
    write_scratch: Vec<u8>,
}

impl RingBuffer {
    /// Creates a ring buffer able to hold at least `requested_capacity`
    /// bytes.
    pub fn new(requested_capacity: usize) -> Result<Self, RingBufferError> {
        let capacity = round_capacity(requested_capacity);
        Ok(Self {
            buf: vec![0u8; capacity],
            capacity,
            read_cursor: 0,
            write_cursor: 0,
            read_scratch: Vec::new(),
            write_scratch: Vec::new(),
        })
    }

    /// The ring's total capacity in bytes, after rounding.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently queued and not yet read.
    pub fn used(&self) -> usize {
        (self.write_cursor - self.read_cursor) as usize
    }

    /// Bytes free for writing without overtaking unread data.
    pub fn free(&self) -> usize {
        self.capacity - self.used()
    }

    fn offset(&self, cursor: u64) -> usize {
        (cursor as usize) & (self.capacity - 1)
    }

    /// Returns a contiguous slice of the queued, unread bytes. Its length is
    /// exactly [`used`](Self::used).
    pub fn begin_read(&mut self) -> &[u8] {
        let offset = self.offset(self.read_cursor);
        let len = self.used();

        if offset + len <= self.capacity {
            &self.buf[offset..offset + len]
        } else {
            let tail = self.capacity - offset;
            self.read_scratch.clear();
            self.read_scratch.extend_from_slice(&self.buf[offset..]);
            self.read_scratch.extend_from_slice(&self.buf[..len - tail]);
            &self.read_scratch
        }
    }

    /// Commits `n` bytes of the slice returned by
    /// [`begin_read`](Self::begin_read) as consumed, advancing the read
    /// cursor. `n` must not exceed [`used`](Self::used).
    pub fn end_read(&mut self, n: usize) -> Result<(), RingBufferError> {
        let used = self.used();
        if n > used {
            return Err(RingBufferError::InsufficientData {
                requested: n,
                available: used,
            });
        }
        self.read_cursor += n as u64;
        Ok(())
    }

    /// Returns a contiguous, writable scratch slice sized to the buffer's
    /// free space. Bytes written here are only committed into the ring by
    /// [`end_write`](Self::end_write).
    pub fn begin_write(&mut self) -> &mut [u8] {
        let free = self.free();
        self.write_scratch.clear();
        self.write_scratch.resize(free, 0);
        &mut self.write_scratch
    }

    /// Copies the first `n` bytes written into
    /// [`begin_write`](Self::begin_write)'s scratch slice into the ring,
    /// wrapping as needed, and advances the write cursor. `n` must not
    /// exceed [`free`](Self::free).
    pub fn end_write(&mut self, n: usize) -> Result<(), RingBufferError> {
        let free = self.free();
        if n > free {
            return Err(RingBufferError::InsufficientSpace {
                requested: n,
                available: free,
            });
        }

        let offset = self.offset(self.write_cursor);
        let tail = self.capacity - offset;
        if n <= tail {
            self.buf[offset..offset + n].copy_from_slice(&self.write_scratch[..n]);
        } else {
            self.buf[offset..].copy_from_slice(&self.write_scratch[..tail]);
            self.buf[..n - tail].copy_from_slice(&self.write_scratch[tail..n]);
        }

        self.write_cursor += n as u64;
        Ok(())
    }
}

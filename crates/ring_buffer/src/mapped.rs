//! Double-mapped implementation of [`RingBuffer`], backed by a single
//! anonymous file mapped twice into adjacent virtual address ranges.
//!
//! The trick: reserve `2 * capacity` bytes of address space, then map the
//! same file-backed region into both the first and second half of that
//! reservation. A window starting anywhere in the first half and extending
//! past its end reads on into the second half's mapping of the same
//! physical pages, so it is always one contiguous slice, never a
//! scatter/gather pair.

use std::io;
use std::os::unix::io::AsRawFd;
use std::ptr::NonNull;

use crate::error::RingBufferError;

fn page_size() -> usize {
    // SAFETY: sysconf(_SC_PAGESIZE) has no preconditions and does not fail
    // on any host this crate targets.
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

fn round_capacity(requested: usize) -> usize {
    let page = page_size();
    let rounded_to_page = requested.max(1).div_ceil(page) * page;
    rounded_to_page.next_power_of_two()
}

/// Owns the double mapping's address reservation; unmaps it on drop.
struct Mapping {
    base: NonNull<u8>,
    half: usize,
}

// SAFETY: `base` points at plain memory-mapped bytes, not at any
// thread-affine OS resource; the ring's cursor bookkeeping is what
// serializes access to it, not this type.
unsafe impl Send for Mapping {}
unsafe impl Sync for Mapping {}

impl Mapping {
    fn new(half: usize) -> Result<Self, RingBufferError> {
        // SAFETY: all of the following mmap/munmap/ftruncate calls are
        // passed arguments constructed just above from known-valid values
        // (a just-reserved address, a just-created file descriptor, and
        // `half`/`half * 2` byte lengths matching the allocations made).
        unsafe {
            let reservation = libc::mmap(
                std::ptr::null_mut(),
                half * 2,
                libc::PROT_NONE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            );
            if reservation == libc::MAP_FAILED {
                return Err(RingBufferError::Alloc(io::Error::last_os_error()));
            }

            let file = match tempfile::tempfile() {
                Ok(file) => file,
                Err(err) => {
                    libc::munmap(reservation, half * 2);
                    return Err(RingBufferError::Alloc(err));
                }
            };
            if libc::ftruncate(file.as_raw_fd(), half as libc::off_t) != 0 {
                let err = io::Error::last_os_error();
                libc::munmap(reservation, half * 2);
                return Err(RingBufferError::Alloc(err));
            }

            let first = libc::mmap(
                reservation,
                half,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED | libc::MAP_FIXED,
                file.as_raw_fd(),
                0,
            );
            if first == libc::MAP_FAILED || first != reservation {
                let err = io::Error::last_os_error();
                libc::munmap(reservation, half * 2);
                return Err(RingBufferError::Alloc(err));
            }

            let second_addr = reservation.byte_add(half);
            let second = libc::mmap(
                second_addr,
                half,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED | libc::MAP_FIXED,
                file.as_raw_fd(),
                0,
            );
            if second == libc::MAP_FAILED || second != second_addr {
                let err = io::Error::last_os_error();
                libc::munmap(reservation, half * 2);
                return Err(RingBufferError::Alloc(err));
            }

            // The two mappings keep the pages alive; the descriptor itself
            // is no longer needed once both views exist.
            drop(file);

            Ok(Self {
                base: NonNull::new(reservation.cast()).expect("mmap returned null on success"),
                half,
            })
        }
    }

    fn bytes(&self) -> &[u8] {
        // SAFETY: `base` maps `half * 2` readable/writable bytes for as
        // long as this `Mapping` is alive.
        unsafe { std::slice::from_raw_parts(self.base.as_ptr(), self.half * 2) }
    }

    #[allow(clippy::mut_from_ref)]
    fn bytes_mut(&self) -> &mut [u8] {
        // SAFETY: same mapping as `bytes`; `RingBuffer` never hands out a
        // read slice and a write slice over the same bytes at once, since
        // `begin_write` requires `&mut self`.
        unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr(), self.half * 2) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: `base` and `half * 2` describe exactly the reservation
        // made in `new`.
        unsafe {
            libc::munmap(self.base.as_ptr().cast(), self.half * 2);
        }
    }
}

/// A fixed-capacity byte ring buffer whose backing pages are mapped twice,
/// back to back, so any window of up to [`capacity`](Self::capacity) bytes
/// is addressable as one contiguous slice regardless of where it wraps.
///
/// Capacity is rounded up to the host's page size and then to the next
/// power of two; `begin_read`/`begin_write` use `cursor & (capacity - 1)`
/// to compute the offset into the mapping.
pub struct RingBuffer {
    mapping: Mapping,
    capacity: usize,
    read_cursor: u64,
    write_cursor: u64,
}

impl RingBuffer {
    /// Creates a ring buffer able to hold at least `requested_capacity`
    /// bytes.
    pub fn new(requested_capacity: usize) -> Result<Self, RingBufferError> {
        let capacity = round_capacity(requested_capacity);
        let mapping = Mapping::new(capacity)?;
        Ok(Self {
            mapping,
            capacity,
            read_cursor: 0,
            write_cursor: 0,
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
        &self.mapping.bytes()[offset..offset + len]
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

    /// Returns a contiguous, writable slice over the buffer's free space.
    /// Its length is exactly [`free`](Self::free).
    pub fn begin_write(&mut self) -> &mut [u8] {
        let offset = self.offset(self.write_cursor);
        let len = self.free();
        &mut self.mapping.bytes_mut()[offset..offset + len]
    }

    /// Commits `n` bytes written into the slice returned by
    /// [`begin_write`](Self::begin_write), advancing the write cursor. `n`
    /// must not exceed [`free`](Self::free).
    pub fn end_write(&mut self, n: usize) -> Result<(), RingBufferError> {
        let free = self.free();
        if n > free {
            return Err(RingBufferError::InsufficientSpace {
                requested: n,
                available: free,
            });
        }
        self.write_cursor += n as u64;
        Ok(())
    }
}

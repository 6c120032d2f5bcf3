//! Errors raised by [`crate::RingBuffer`].

/// Errors raised while constructing or operating a [`crate::RingBuffer`].
#[derive(Debug, thiserror::Error)]
pub enum RingBufferError {
    /// Reading more bytes than [`used`](crate::RingBuffer::used) reports
    /// were queued.
    #[error("read of {requested} bytes exceeds {available} buffered bytes")]
    InsufficientData {
        /// Bytes the caller tried to commit as read.
        requested: usize,
        /// Bytes actually available, per [`crate::RingBuffer::used`].
        available: usize,
    },
    /// Writing more bytes than [`free`](crate::RingBuffer::free) reports are
    /// available.
    #[error("write of {requested} bytes exceeds {available} free bytes")]
    InsufficientSpace {
        /// Bytes the caller tried to commit as written.
        requested: usize,
        /// Bytes actually free, per [`crate::RingBuffer::free`].
        available: usize,
    },
    /// The backing memory for the ring could not be allocated or mapped.
    #[error("failed to allocate ring buffer backing memory: {0}")]
    Alloc(#[source] std::io::Error),
}

//! Error types for ring buffer operations.

use std::fmt;
use thiserror::Error;

/// Errors that can occur in buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The buffer has been closed (and, for takes, fully drained).
    #[error("buffer is closed")]
    Closed,

    /// The operation could not complete without waiting.
    #[error("operation would block")]
    WouldBlock,

    /// The requested capacity cannot hold any element.
    #[error("invalid capacity: {capacity} (must be at least 1)")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },
}

impl BufferError {
    /// Returns `true` if the caller may retry the operation later.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::WouldBlock)
    }

    /// Returns `true` if this error means the buffer is permanently done.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A failed put, handing the rejected item back to the caller.
///
/// The item is never dropped by the buffer on failure.
pub struct PutError<T> {
    item: T,
    kind: BufferError,
}

impl<T> PutError<T> {
    #[inline]
    pub(crate) fn closed(item: T) -> Self {
        Self {
            item,
            kind: BufferError::Closed,
        }
    }

    #[inline]
    pub(crate) fn would_block(item: T) -> Self {
        Self {
            item,
            kind: BufferError::WouldBlock,
        }
    }

    /// Returns why the put failed.
    #[inline]
    pub fn kind(&self) -> BufferError {
        self.kind
    }

    /// Returns `true` if the buffer was closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.kind == BufferError::Closed
    }

    /// Returns `true` if the buffer was full.
    #[inline]
    pub fn is_would_block(&self) -> bool {
        self.kind == BufferError::WouldBlock
    }

    /// Recovers the item that was not enqueued.
    #[inline]
    pub fn into_inner(self) -> T {
        self.item
    }
}

// Manual impls so `T` need not be `Debug`.
impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "put failed: {}", self.kind)
    }
}

impl<T> std::error::Error for PutError<T> {}

impl<T> From<PutError<T>> for BufferError {
    fn from(err: PutError<T>) -> Self {
        err.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(BufferError::WouldBlock.is_recoverable());
        assert!(!BufferError::WouldBlock.is_terminal());
        assert!(BufferError::Closed.is_terminal());
        assert!(!BufferError::Closed.is_recoverable());
        assert!(!BufferError::InvalidCapacity { capacity: 0 }.is_recoverable());
    }

    #[test]
    fn test_put_error_returns_item() {
        struct NotDebug(u32);

        let err = PutError::closed(NotDebug(7));
        assert!(err.is_closed());
        assert_eq!(format!("{err}"), "put failed: buffer is closed");
        assert!(format!("{err:?}").contains("Closed"));
        assert_eq!(err.into_inner().0, 7);

        let err: BufferError = PutError::would_block(1u8).into();
        assert_eq!(err, BufferError::WouldBlock);
    }

    #[test]
    fn test_invalid_capacity_message() {
        let err = BufferError::InvalidCapacity { capacity: 0 };
        assert_eq!(err.to_string(), "invalid capacity: 0 (must be at least 1)");
    }
}

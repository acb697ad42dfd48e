//! Property-based tests: random operation sequences checked against a
//! `VecDeque` model of a bounded FIFO with a close flag.
//!
//! Only non-blocking operations are used, so every step's outcome is fully
//! determined by the model.

#![cfg(not(feature = "loom"))]

use proptest::prelude::*;
use ringbound_rs::{BoundedRingBuffer, BufferError};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Put(u32),
    Take,
    Close,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // Close is rare so most sequences exercise wrap-around first
    prop_oneof![
        10 => any::<u32>().prop_map(Op::Put),
        10 => Just(Op::Take),
        1 => Just(Op::Close),
    ]
}

/// Reference model: the behaviour a bounded FIFO with drain-before-close must have.
struct Model {
    items: VecDeque<u32>,
    capacity: usize,
    closed: bool,
}

impl Model {
    fn put(&mut self, item: u32) -> Result<(), BufferError> {
        if self.closed {
            Err(BufferError::Closed)
        } else if self.items.len() == self.capacity {
            Err(BufferError::WouldBlock)
        } else {
            self.items.push_back(item);
            Ok(())
        }
    }

    fn take(&mut self) -> Result<u32, BufferError> {
        match self.items.pop_front() {
            Some(item) => Ok(item),
            None if self.closed => Err(BufferError::Closed),
            None => Err(BufferError::WouldBlock),
        }
    }
}

// =============================================================================
// Model equivalence
// =============================================================================

proptest! {
    /// Every operation returns what the model returns, and occupancy agrees.
    #[test]
    fn prop_matches_model(
        capacity in 1usize..8,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let buffer = BoundedRingBuffer::new(capacity);
        let mut model = Model { items: VecDeque::new(), capacity, closed: false };

        for op in ops {
            match op {
                Op::Put(item) => {
                    let actual = buffer.try_put(item).map_err(|e| {
                        // A rejected item is always handed back intact
                        let kind = e.kind();
                        assert_eq!(e.into_inner(), item);
                        kind
                    });
                    prop_assert_eq!(actual, model.put(item));
                }
                Op::Take => prop_assert_eq!(buffer.try_take(), model.take()),
                Op::Close => {
                    buffer.close();
                    model.closed = true;
                }
            }

            prop_assert_eq!(buffer.len(), model.items.len());
            prop_assert!(buffer.len() <= capacity);
            prop_assert_eq!(buffer.is_empty(), model.items.is_empty());
            prop_assert_eq!(buffer.is_full(), model.items.len() == capacity);
            prop_assert_eq!(buffer.is_closed(), model.closed);
        }
    }
}

// =============================================================================
// FIFO order
// =============================================================================

proptest! {
    /// Items come out in exactly the order they went in, across any number
    /// of wrap-arounds.
    #[test]
    fn prop_fifo_across_wraps(
        capacity in 1usize..6,
        items in prop::collection::vec(any::<u64>(), 0..100),
        chunk in 1usize..6,
    ) {
        let buffer = BoundedRingBuffer::new(capacity);
        let mut out = Vec::with_capacity(items.len());

        // Interleave bursts of puts with full drains
        for burst in items.chunks(chunk.min(capacity)) {
            for &item in burst {
                buffer.try_put(item).unwrap();
            }
            out.extend(buffer.try_iter());
        }

        prop_assert_eq!(out, items);
    }
}

// =============================================================================
// Close semantics
// =============================================================================

proptest! {
    /// After close, exactly the queued items are delivered, then `Closed` forever.
    #[test]
    fn prop_close_drains_exactly_queued(
        capacity in 1usize..16,
        queued in 0usize..16,
        extra_closes in 0usize..3,
    ) {
        let queued = queued.min(capacity);
        let buffer = BoundedRingBuffer::new(capacity);
        for i in 0..queued {
            buffer.put(i).unwrap();
        }

        buffer.close();
        for _ in 0..extra_closes {
            buffer.close();
        }

        prop_assert!(buffer.put(usize::MAX).unwrap_err().is_closed());
        for i in 0..queued {
            prop_assert_eq!(buffer.take(), Ok(i));
        }
        prop_assert_eq!(buffer.take(), Err(BufferError::Closed));
        prop_assert_eq!(buffer.try_take(), Err(BufferError::Closed));
    }
}

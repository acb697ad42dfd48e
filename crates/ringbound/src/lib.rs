//! RingBound - Bounded Blocking Ring Buffer
//!
//! A fixed-capacity FIFO ring buffer shared between any number of producer
//! and consumer threads. Producers block while it is full, consumers block
//! while it is empty, and nobody busy-waits: one mutex guards the ring and
//! two condition variables carry the "space freed" / "item published"
//! signals.
//!
//! # Key Features
//!
//! - Backpressure in both directions with bounded memory
//! - Full capacity utilisation (an occupancy counter, no wasted slot)
//! - Drain-before-close shutdown: `close()` wakes every waiter, queued items
//!   are still delivered, then consumers see `Closed`
//! - Non-blocking (`try_*`) and deadline-bounded (`*_timeout`) variants
//! - `Channel` handles that close automatically when the last producer drops
//!
//! # Example
//!
//! ```
//! use ringbound_rs::{BoundedRingBuffer, BufferError};
//!
//! let buffer = BoundedRingBuffer::new(4);
//!
//! buffer.put(1).unwrap();
//! buffer.put(2).unwrap();
//! buffer.close();
//!
//! // Queued items survive close
//! assert_eq!(buffer.take(), Ok(1));
//! assert_eq!(buffer.take(), Ok(2));
//! assert_eq!(buffer.take(), Err(BufferError::Closed));
//!
//! // Puts are refused and the item is handed back
//! let err = buffer.put(3).unwrap_err();
//! assert!(err.is_closed());
//! assert_eq!(err.into_inner(), 3);
//! ```

mod buffer;
mod channel;
mod config;
mod error;
mod invariants;
mod metrics;
mod sync;
mod trace;

pub use buffer::{BoundedRingBuffer, Iter, TryIter};
pub use channel::{Channel, Consumer, IntoIter, Producer};
pub use config::{Config, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use error::{BufferError, PutError};
pub use metrics::{Metrics, MetricsSnapshot};
pub use trace::init_tracing;

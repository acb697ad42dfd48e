//! Lock primitives used by the buffer.
//!
//! Under the `loom` feature these resolve to loom's model-checked versions so
//! the real `BoundedRingBuffer` can be explored by `loom::model`.

#[cfg(feature = "loom")]
pub(crate) use loom::sync::{Condvar, Mutex, MutexGuard};

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::{Condvar, Mutex, MutexGuard};

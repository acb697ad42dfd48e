use crate::invariants::{
    debug_assert_bounded_count, debug_assert_closed_monotonic, debug_assert_ring_consistent,
    debug_assert_slot_live, debug_assert_slot_vacant,
};
use crate::sync::{Condvar, Mutex, MutexGuard};
use crate::trace::{debug, trace};
use crate::{BufferError, Config, Metrics, MetricsSnapshot, PutError};
use std::iter::FusedIterator;
use std::sync::PoisonError;
use std::time::{Duration, Instant};

// =============================================================================
// SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Classic monitor: one mutex guards every field of `State`, two condition
// variables carry the "space freed" and "item published" signals.
//
// ## Occupancy
//
// `count` is the single source of truth for full/empty. `head == tail` holds
// both when empty and when full, so the indices alone are never consulted to
// decide either. All `capacity` slots are usable.
//
// ## Waiting
//
// Every wait sits in a loop that re-checks its predicate after reacquiring
// the lock. This covers spurious wakeups and callers that barge in and claim
// the slot between the notify and the wakeup.
//
// ## Signalling
//
// - successful put  -> `not_empty.notify_one()`
// - successful take -> `not_full.notify_one()`
// - first close     -> `notify_all()` on both, every waiter must see it
//
// Notifications are issued after the guard is dropped, and items leave the
// critical section before being handed to the caller, so element code never
// runs under the lock.
//
// ## Poisoning
//
// Nothing under the lock can panic halfway through an update (debug
// assertions run before or after one), so a poisoned lock still guards a
// consistent `State` and is recovered with `PoisonError::into_inner`.
//
// =============================================================================

/// State guarded by the buffer lock.
struct State<T> {
    /// Fixed storage; exactly `count` slots starting at `head` are `Some`.
    slots: Box<[Option<T>]>,
    /// Next slot to read.
    head: usize,
    /// Next slot to write.
    tail: usize,
    /// Occupied slots.
    count: usize,
    closed: bool,
}

impl<T> State<T> {
    fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
            closed: false,
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Store at `tail`. Caller guarantees `!is_full()`.
    fn push_slot(&mut self, item: T) {
        let capacity = self.capacity();
        let idx = self.tail;

        debug_assert_slot_vacant!(self.slots[idx], idx);
        self.slots[idx] = Some(item);
        self.tail = (idx + 1) % capacity;
        self.count += 1;

        debug_assert_bounded_count!(self.count, capacity);
        debug_assert_ring_consistent!(self.head, self.tail, self.count, capacity);
    }

    /// Remove the element at `head`, or `None` if empty.
    fn pop_slot(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }

        let capacity = self.capacity();
        let idx = self.head;

        let item = self.slots[idx].take();
        debug_assert_slot_live!(item, idx);
        self.head = (idx + 1) % capacity;
        self.count -= 1;

        debug_assert_ring_consistent!(self.head, self.tail, self.count, capacity);
        item
    }
}

/// How long a put/take may wait for its predicate.
#[derive(Debug, Clone, Copy)]
enum Wait {
    Never,
    Forever,
    Until(Instant),
}

impl Wait {
    fn after(timeout: Duration) -> Self {
        // A deadline too far out to represent is no deadline at all.
        Instant::now()
            .checked_add(timeout)
            .map_or(Self::Forever, Self::Until)
    }
}

/// Bounded, blocking, multi-producer multi-consumer ring buffer.
///
/// Producers block in [`put`](Self::put) while the buffer is full, consumers
/// block in [`take`](Self::take) while it is empty. [`close`](Self::close)
/// wakes everyone: puts then fail with [`BufferError::Closed`], takes keep
/// draining queued items and fail only once the buffer is empty.
///
/// Items are delivered in the order they were enqueued. When several
/// producers are blocked, which of them gets a freed slot first is
/// unspecified.
///
/// # Example
///
/// ```
/// use ringbound_rs::{BoundedRingBuffer, BufferError};
/// use std::sync::Arc;
/// use std::thread;
///
/// let buffer = Arc::new(BoundedRingBuffer::new(4));
///
/// let producer = {
///     let buffer = Arc::clone(&buffer);
///     thread::spawn(move || {
///         for i in 0..100u32 {
///             buffer.put(i).unwrap();
///         }
///         buffer.close();
///     })
/// };
///
/// let mut received = Vec::new();
/// loop {
///     match buffer.take() {
///         Ok(item) => received.push(item),
///         Err(BufferError::Closed) => break,
///         Err(e) => panic!("unexpected: {e}"),
///     }
/// }
///
/// producer.join().unwrap();
/// assert_eq!(received, (0..100).collect::<Vec<_>>());
/// ```
pub struct BoundedRingBuffer<T> {
    state: Mutex<State<T>>,
    /// Signalled when a slot frees up (or on close).
    not_full: Condvar,
    /// Signalled when an item is published (or on close).
    not_empty: Condvar,
    metrics: Metrics,
    config: Config,
}

impl<T> BoundedRingBuffer<T> {
    /// Creates a buffer with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) to get an
    /// error instead.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(buffer) => buffer,
            Err(e) => panic!("BoundedRingBuffer::new: {e}"),
        }
    }

    /// Creates a buffer with `capacity` slots, rejecting a capacity of 0.
    pub fn try_new(capacity: usize) -> Result<Self, BufferError> {
        Self::with_config(Config::default().with_capacity(capacity))
    }

    /// Creates a buffer from a full configuration.
    pub fn with_config(config: Config) -> Result<Self, BufferError> {
        config.validate()?;

        debug!(
            capacity = config.capacity,
            metrics = config.enable_metrics,
            "ring buffer created"
        );

        Ok(Self {
            state: Mutex::new(State::new(config.capacity)),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            metrics: Metrics::new(),
            config,
        })
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Returns the number of queued items.
    ///
    /// Advisory only: under concurrent access the value is stale as soon as
    /// it is returned. Never use it to predict whether `put`/`take` will
    /// block; call [`try_put`](Self::try_put) / [`try_take`](Self::try_take)
    /// instead.
    pub fn len(&self) -> usize {
        self.lock().count
    }

    /// Returns true if no items are queued. Advisory, see [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.lock().count == 0
    }

    /// Returns true if every slot is occupied. Advisory, see [`len`](Self::len).
    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    /// Returns true once [`close`](Self::close) has been called.
    ///
    /// Unlike the occupancy snapshots this one cannot go stale in the
    /// `true` direction.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Enqueue `item`, blocking while the buffer is full.
    ///
    /// Fails with [`BufferError::Closed`] if the buffer is closed before or
    /// while waiting; the item comes back inside the error.
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        self.put_inner(item, Wait::Forever)
    }

    /// Enqueue `item` only if a slot is free right now.
    ///
    /// Fails with [`BufferError::WouldBlock`] when full and
    /// [`BufferError::Closed`] when closed.
    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        self.put_inner(item, Wait::Never)
    }

    /// Like [`put`](Self::put), but gives up with
    /// [`BufferError::WouldBlock`] after `timeout`.
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        self.put_inner(item, Wait::after(timeout))
    }

    /// Like [`put`](Self::put), but gives up with
    /// [`BufferError::WouldBlock`] at `deadline`.
    pub fn put_deadline(&self, item: T, deadline: Instant) -> Result<(), PutError<T>> {
        self.put_inner(item, Wait::Until(deadline))
    }

    fn put_inner(&self, item: T, wait: Wait) -> Result<(), PutError<T>> {
        let mut state = self.lock();
        let mut waited = false;

        loop {
            if state.closed {
                drop(state);
                if self.config.enable_metrics {
                    self.metrics.add_rejected_closed();
                }
                return Err(PutError::closed(item));
            }

            if !state.is_full() {
                state.push_slot(item);
                drop(state);
                self.not_empty.notify_one();
                if self.config.enable_metrics {
                    self.metrics.add_put();
                }
                return Ok(());
            }

            let timeout = match wait {
                Wait::Never => return Err(PutError::would_block(item)),
                Wait::Forever => None,
                Wait::Until(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(remaining) if !remaining.is_zero() => Some(remaining),
                    _ => {
                        drop(state);
                        trace!("put timed out: buffer full");
                        if self.config.enable_metrics {
                            self.metrics.add_timeout();
                        }
                        return Err(PutError::would_block(item));
                    }
                },
            };

            if !waited {
                waited = true;
                trace!(capacity = self.config.capacity, "put blocked: buffer full");
                if self.config.enable_metrics {
                    self.metrics.add_put_wait();
                }
            }

            state = Self::wait(&self.not_full, state, timeout);
        }
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Dequeue the oldest item, blocking while the buffer is empty.
    ///
    /// After [`close`](Self::close), queued items are still returned; this
    /// fails with [`BufferError::Closed`] only once the buffer is closed
    /// and empty.
    pub fn take(&self) -> Result<T, BufferError> {
        self.take_inner(Wait::Forever)
    }

    /// Dequeue the oldest item only if one is queued right now.
    ///
    /// Fails with [`BufferError::WouldBlock`] when empty and open,
    /// [`BufferError::Closed`] when empty and closed.
    pub fn try_take(&self) -> Result<T, BufferError> {
        self.take_inner(Wait::Never)
    }

    /// Like [`take`](Self::take), but gives up with
    /// [`BufferError::WouldBlock`] after `timeout`.
    pub fn take_timeout(&self, timeout: Duration) -> Result<T, BufferError> {
        self.take_inner(Wait::after(timeout))
    }

    /// Like [`take`](Self::take), but gives up with
    /// [`BufferError::WouldBlock`] at `deadline`.
    pub fn take_deadline(&self, deadline: Instant) -> Result<T, BufferError> {
        self.take_inner(Wait::Until(deadline))
    }

    fn take_inner(&self, wait: Wait) -> Result<T, BufferError> {
        let mut state = self.lock();
        let mut waited = false;

        loop {
            if let Some(item) = state.pop_slot() {
                drop(state);
                self.not_full.notify_one();
                if self.config.enable_metrics {
                    self.metrics.add_taken();
                }
                return Ok(item);
            }

            if state.closed {
                return Err(BufferError::Closed);
            }

            let timeout = match wait {
                Wait::Never => return Err(BufferError::WouldBlock),
                Wait::Forever => None,
                Wait::Until(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(remaining) if !remaining.is_zero() => Some(remaining),
                    _ => {
                        drop(state);
                        trace!("take timed out: buffer empty");
                        if self.config.enable_metrics {
                            self.metrics.add_timeout();
                        }
                        return Err(BufferError::WouldBlock);
                    }
                },
            };

            if !waited {
                waited = true;
                trace!("take blocked: buffer empty");
                if self.config.enable_metrics {
                    self.metrics.add_take_wait();
                }
            }

            state = Self::wait(&self.not_empty, state, timeout);
        }
    }

    /// Blocking iterator over items; ends when the buffer is closed and drained.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { buffer: self }
    }

    /// Non-blocking iterator; ends at the first `WouldBlock` or `Closed`.
    pub fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { buffer: self }
    }

    // ---------------------------------------------------------------------
    // LIFECYCLE
    // ---------------------------------------------------------------------

    /// Close the buffer and wake every blocked producer and consumer.
    ///
    /// Idempotent: only the first call has an effect. Queued items are kept
    /// and remain available to [`take`](Self::take).
    pub fn close(&self) {
        let mut state = self.lock();
        let was_closed = std::mem::replace(&mut state.closed, true);
        debug_assert_closed_monotonic!(was_closed, state.closed);
        if was_closed {
            return;
        }

        debug!(queued = state.count, "ring buffer closed");
        drop(state);

        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }

    // ---------------------------------------------------------------------
    // LOCKING
    // ---------------------------------------------------------------------

    #[inline]
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the lock, wait for a signal (or `timeout`), reacquire.
    fn wait<'a>(
        condvar: &Condvar,
        guard: MutexGuard<'a, State<T>>,
        timeout: Option<Duration>,
    ) -> MutexGuard<'a, State<T>> {
        match timeout {
            None => condvar.wait(guard).unwrap_or_else(PoisonError::into_inner),
            Some(timeout) => {
                let (guard, _) = condvar
                    .wait_timeout(guard, timeout)
                    .unwrap_or_else(PoisonError::into_inner);
                guard
            }
        }
    }
}

impl<T> std::fmt::Debug for BoundedRingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("BoundedRingBuffer")
            .field("capacity", &state.capacity())
            .field("len", &state.count)
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}

impl<'a, T> IntoIterator for &'a BoundedRingBuffer<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Blocking iterator returned by [`BoundedRingBuffer::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    buffer: &'a BoundedRingBuffer<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.buffer.take().ok()
    }
}

// Once `take` reports Closed it keeps doing so.
impl<T> FusedIterator for Iter<'_, T> {}

/// Non-blocking iterator returned by [`BoundedRingBuffer::try_iter`].
#[derive(Debug)]
pub struct TryIter<'a, T> {
    buffer: &'a BoundedRingBuffer<T>,
}

impl<T> Iterator for TryIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.buffer.try_take().ok()
    }
}

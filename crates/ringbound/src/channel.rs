use crate::sync::Mutex;
use crate::trace::debug;
use crate::{BoundedRingBuffer, BufferError, Config, Iter, MetricsSnapshot, PutError, TryIter};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

/// Producer bookkeeping, guarded separately from the buffer.
///
/// Lock order is always registry then buffer.
#[derive(Debug, Default)]
struct Registry {
    /// Producers currently alive.
    live: usize,
    /// Producers ever registered; source of producer ids.
    registered: usize,
}

struct ChannelInner<T> {
    buffer: BoundedRingBuffer<T>,
    registry: Mutex<Registry>,
}

impl<T> ChannelInner<T> {
    fn registry(&self) -> crate::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A shared [`BoundedRingBuffer`] with registered producers.
///
/// Each producer thread registers a [`Producer`]; dropping the last one
/// closes the buffer, so consumers see [`BufferError::Closed`] once every
/// producer is done and the queue is drained. If no producer ever
/// registers, the buffer stays open until [`close`](Self::close) is called.
///
/// # Example
///
/// ```
/// use ringbound_rs::{Channel, Config};
/// use std::thread;
///
/// let channel = Channel::<u64>::new(Config::default().with_capacity(16)).unwrap();
/// let consumer = channel.consumer();
///
/// // Register everyone up front: an early finisher must not close the
/// // channel before the others exist.
/// let producers: Vec<_> = (0..4).map(|_| channel.register().unwrap()).collect();
///
/// let handles: Vec<_> = producers
///     .into_iter()
///     .map(|producer| {
///         let id = producer.id() as u64;
///         thread::spawn(move || {
///             for i in 0..100 {
///                 producer.put(id * 1000 + i).unwrap();
///             }
///             // producer dropped here; the last drop closes the channel
///         })
///     })
///     .collect();
///
/// let total: usize = consumer.iter().count();
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert_eq!(total, 400);
/// ```
pub struct Channel<T> {
    inner: Arc<ChannelInner<T>>,
}

impl<T> Channel<T> {
    /// Creates a new channel with the given configuration.
    pub fn new(config: Config) -> Result<Self, BufferError> {
        Ok(Self {
            inner: Arc::new(ChannelInner {
                buffer: BoundedRingBuffer::with_config(config)?,
                registry: Mutex::new(Registry::default()),
            }),
        })
    }

    /// Register a new producer. Fails with [`BufferError::Closed`] once the
    /// channel is closed.
    pub fn register(&self) -> Result<Producer<T>, BufferError> {
        let mut registry = self.inner.registry();

        // Checked under the registry lock, so it cannot race the last
        // producer's drop-close.
        if self.inner.buffer.is_closed() {
            return Err(BufferError::Closed);
        }

        let id = registry.registered;
        registry.registered += 1;
        registry.live += 1;
        debug!(producer_id = id, live = registry.live, "producer registered");

        Ok(Producer {
            channel: Arc::clone(&self.inner),
            id,
        })
    }

    /// Returns a consumer handle. Any number may exist.
    pub fn consumer(&self) -> Consumer<T> {
        Consumer {
            channel: Arc::clone(&self.inner),
        }
    }

    /// Close the channel, waking every blocked producer and consumer.
    pub fn close(&self) {
        self.inner.buffer.close();
    }

    /// Returns true if the channel is closed.
    pub fn is_closed(&self) -> bool {
        self.inner.buffer.is_closed()
    }

    /// Returns the number of live producers.
    pub fn producer_count(&self) -> usize {
        self.inner.registry().live
    }

    /// Returns the buffer capacity.
    pub fn capacity(&self) -> usize {
        self.inner.buffer.capacity()
    }

    /// Returns the number of queued items. Advisory only.
    pub fn len(&self) -> usize {
        self.inner.buffer.len()
    }

    /// Returns true if nothing is queued. Advisory only.
    pub fn is_empty(&self) -> bool {
        self.inner.buffer.is_empty()
    }

    /// Get a metrics snapshot if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.buffer.metrics()
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Producer handle for sending to the channel.
///
/// Dropping the last live producer closes the channel.
pub struct Producer<T> {
    channel: Arc<ChannelInner<T>>,
    id: usize,
}

impl<T> Producer<T> {
    /// Get the producer's ID (registration order).
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Enqueue an item, blocking while the buffer is full.
    #[inline]
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        self.channel.buffer.put(item)
    }

    /// Enqueue an item only if a slot is free right now.
    #[inline]
    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        self.channel.buffer.try_put(item)
    }

    /// Enqueue an item, waiting at most `timeout` for a free slot.
    #[inline]
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        self.channel.buffer.put_timeout(item, timeout)
    }

    /// Returns true if the channel is closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.channel.buffer.is_closed()
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        let mut registry = self.channel.registry();
        registry.live -= 1;

        if registry.live == 0 {
            debug!(producer_id = self.id, "last producer dropped, closing channel");
            self.channel.buffer.close();
        }
    }
}

// Note: Producer intentionally does NOT implement Clone.
// Each producer is counted at registration; call `Channel::register` again
// for another thread instead.

/// Consumer handle for receiving from the channel.
pub struct Consumer<T> {
    channel: Arc<ChannelInner<T>>,
}

impl<T> Consumer<T> {
    /// Dequeue the oldest item, blocking while the buffer is empty.
    ///
    /// Fails with [`BufferError::Closed`] once the channel is closed and drained.
    #[inline]
    pub fn take(&self) -> Result<T, BufferError> {
        self.channel.buffer.take()
    }

    /// Dequeue the oldest item only if one is queued right now.
    #[inline]
    pub fn try_take(&self) -> Result<T, BufferError> {
        self.channel.buffer.try_take()
    }

    /// Dequeue the oldest item, waiting at most `timeout`.
    #[inline]
    pub fn take_timeout(&self, timeout: Duration) -> Result<T, BufferError> {
        self.channel.buffer.take_timeout(timeout)
    }

    /// Blocking iterator; ends when the channel is closed and drained.
    pub fn iter(&self) -> Iter<'_, T> {
        self.channel.buffer.iter()
    }

    /// Non-blocking iterator over what is queued right now.
    pub fn try_iter(&self) -> TryIter<'_, T> {
        self.channel.buffer.try_iter()
    }

    /// Returns true if the channel is closed. Items may still be queued.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.channel.buffer.is_closed()
    }
}

impl<T> Clone for Consumer<T> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<'a, T> IntoIterator for &'a Consumer<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for Consumer<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { consumer: self }
    }
}

/// Owning blocking iterator over a [`Consumer`].
pub struct IntoIter<T> {
    consumer: Consumer<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.consumer.take().ok()
    }
}

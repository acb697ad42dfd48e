//! Loom-based concurrency tests for ringbound-rs.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! With the `loom` feature the buffer's `Mutex`/`Condvar` are loom's, so these
//! tests explore every interleaving of the real put/take/close paths,
//! including lost-wakeup and spurious-wakeup schedules.

#![cfg(feature = "loom")]

use loom::sync::Arc;
use loom::thread;
use ringbound_rs::{BoundedRingBuffer, BufferError};

/// Producer outpaces a capacity-1 buffer: the second put must wait for the take.
#[test]
fn loom_handoff_preserves_order() {
    loom::model(|| {
        let buffer = Arc::new(BoundedRingBuffer::new(1));
        let producer_buf = Arc::clone(&buffer);

        let producer = thread::spawn(move || {
            producer_buf.put(1).unwrap();
            producer_buf.put(2).unwrap();
        });

        assert_eq!(buffer.take(), Ok(1));
        assert_eq!(buffer.take(), Ok(2));

        producer.join().unwrap();
        assert!(buffer.is_empty());
    });
}

/// A consumer blocked on an empty buffer must be released by close.
#[test]
fn loom_close_wakes_blocked_consumer() {
    loom::model(|| {
        let buffer = Arc::new(BoundedRingBuffer::<u32>::new(2));
        let consumer_buf = Arc::clone(&buffer);

        let consumer = thread::spawn(move || consumer_buf.take());

        buffer.close();

        assert_eq!(consumer.join().unwrap(), Err(BufferError::Closed));
    });
}

/// A producer blocked on a full buffer must be released by close and get its item back.
#[test]
fn loom_close_wakes_blocked_producer() {
    loom::model(|| {
        let buffer = Arc::new(BoundedRingBuffer::new(1));
        buffer.put(1).unwrap();
        let producer_buf = Arc::clone(&buffer);

        let producer = thread::spawn(move || producer_buf.put(2).map_err(|e| e.into_inner()));

        buffer.close();

        assert_eq!(producer.join().unwrap(), Err(2));
        assert_eq!(buffer.take(), Ok(1));
        assert_eq!(buffer.take(), Err(BufferError::Closed));
    });
}

/// Items put before close are delivered even when close races the consumer.
#[test]
fn loom_close_drains_first() {
    loom::model(|| {
        let buffer = Arc::new(BoundedRingBuffer::new(2));
        let producer_buf = Arc::clone(&buffer);

        let producer = thread::spawn(move || {
            producer_buf.put(7).unwrap();
            producer_buf.close();
        });

        assert_eq!(buffer.take(), Ok(7));
        assert_eq!(buffer.take(), Err(BufferError::Closed));

        producer.join().unwrap();
    });
}

/// Two producers contending for one slot: nothing lost, nothing duplicated.
#[test]
fn loom_two_producers_one_slot() {
    loom::model(|| {
        let buffer = Arc::new(BoundedRingBuffer::new(1));

        let handles: Vec<_> = [10, 20]
            .into_iter()
            .map(|item| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || buffer.put(item).unwrap())
            })
            .collect();

        let mut received = vec![buffer.take().unwrap(), buffer.take().unwrap()];

        for h in handles {
            h.join().unwrap();
        }

        received.sort_unstable();
        assert_eq!(received, vec![10, 20]);
        assert_eq!(buffer.try_take(), Err(BufferError::WouldBlock));
    });
}

/// Two consumers and one item: exactly one of them gets it once close lands.
#[test]
fn loom_two_consumers_one_item() {
    loom::model(|| {
        let buffer = Arc::new(BoundedRingBuffer::new(1));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || buffer.take().ok())
            })
            .collect();

        buffer.put(5).unwrap();
        buffer.close();

        let got: Vec<_> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(got, vec![5]);
    });
}

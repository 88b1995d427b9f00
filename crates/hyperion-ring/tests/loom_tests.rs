//! Loom-based concurrency tests for the write_head/read_head protocol.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores thread interleavings rather than relying on
//! chance scheduling to surface a missing acquire/release pair. The model
//! below mirrors `RingBuffer`'s actual head arithmetic but keeps capacity
//! tiny and the payload to one `u64` per slot so loom's state space stays
//! tractable.

#![cfg(feature = "loom")]

use loom::sync::atomic::{AtomicU64, Ordering};
use loom::sync::Arc;
use loom::thread;
use std::cell::UnsafeCell;

/// Single-slot-reserved SPSC ring: at most `capacity - 1` entries are ever
/// live, matching `RingBuffer::free_space`'s full-vs-empty distinction.
struct LoomRing {
    write_head: AtomicU64,
    read_head: AtomicU64,
    data: UnsafeCell<[u64; 4]>,
    capacity: u64,
}

unsafe impl Send for LoomRing {}
unsafe impl Sync for LoomRing {}

impl LoomRing {
    fn new() -> Self {
        Self {
            write_head: AtomicU64::new(0),
            read_head: AtomicU64::new(0),
            data: UnsafeCell::new([0; 4]),
            capacity: 4,
        }
    }

    fn free_space(&self) -> u64 {
        let write_head = self.write_head.load(Ordering::Relaxed);
        let read_head = self.read_head.load(Ordering::Acquire);
        let used = (write_head + self.capacity - read_head) % self.capacity;
        self.capacity - 1 - used
    }

    /// Producer: writes `value` into the next slot if one is free.
    fn push(&self, value: u64) -> bool {
        let write_head = self.write_head.load(Ordering::Relaxed);
        if self.free_space() == 0 {
            return false;
        }
        let idx = (write_head % self.capacity) as usize;
        // SAFETY: free_space() > 0 guarantees this slot isn't visible to the
        // consumer yet.
        unsafe {
            (*self.data.get())[idx] = value;
        }
        self.write_head.store(write_head + 1, Ordering::Release);
        true
    }

    /// Consumer: reads the oldest unread slot, if any.
    fn pop(&self) -> Option<u64> {
        let write_head = self.write_head.load(Ordering::Acquire);
        let read_head = self.read_head.load(Ordering::Relaxed);
        if read_head == write_head {
            return None;
        }
        let idx = (read_head % self.capacity) as usize;
        // SAFETY: the acquire load above synchronizes-with the producer's
        // release store, making this slot's write visible.
        let value = unsafe { (*self.data.get())[idx] };
        self.read_head.store(read_head + 1, Ordering::Release);
        Some(value)
    }
}

/// Values pushed in order are popped in the same order.
#[test]
fn loom_spsc_preserves_order() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        let ring2 = Arc::clone(&ring);

        let producer = thread::spawn(move || {
            ring2.push(42);
            ring2.push(43);
        });

        let consumer = thread::spawn(move || {
            let mut received = Vec::new();
            for _ in 0..10 {
                if let Some(v) = ring.pop() {
                    received.push(v);
                }
                if received.len() == 2 {
                    break;
                }
                loom::thread::yield_now();
            }
            received
        });

        producer.join().unwrap();
        let received = consumer.join().unwrap();

        if received.len() >= 2 {
            assert_eq!(received[0], 42);
            assert_eq!(received[1], 43);
        }
    });
}

/// A ring at `capacity - 1` usable entries rejects one more write until the
/// consumer frees a slot, matching `RingBuffer::write_command`'s contract.
#[test]
fn loom_full_ring_rejects_until_consumer_frees_a_slot() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        let ring2 = Arc::clone(&ring);

        assert!(ring.push(1));
        assert!(ring.push(2));
        assert!(ring.push(3));
        assert!(!ring.push(4)); // capacity 4, only 3 usable

        let consumer = thread::spawn(move || ring2.pop());
        let value = consumer.join().unwrap();
        assert_eq!(value, Some(1));

        assert!(ring.push(4));
    });
}

/// Never more values are observed by the consumer than the producer
/// actually committed.
#[test]
fn loom_received_count_never_exceeds_sent_count() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        let producer_ring = Arc::clone(&ring);
        let consumer_ring = Arc::clone(&ring);

        let sent = Arc::new(AtomicU64::new(0));
        let received = Arc::new(AtomicU64::new(0));
        let sent_producer = Arc::clone(&sent);
        let received_consumer = Arc::clone(&received);

        let producer = thread::spawn(move || {
            if producer_ring.push(100) {
                sent_producer.fetch_add(1, Ordering::SeqCst);
            }
            if producer_ring.push(200) {
                sent_producer.fetch_add(1, Ordering::SeqCst);
            }
        });

        let consumer = thread::spawn(move || {
            for _ in 0..4 {
                if consumer_ring.pop().is_some() {
                    received_consumer.fetch_add(1, Ordering::SeqCst);
                }
                loom::thread::yield_now();
            }
        });

        producer.join().unwrap();
        consumer.join().unwrap();

        let sent_count = sent.load(Ordering::SeqCst);
        let received_count = received.load(Ordering::SeqCst);
        assert!(
            received_count <= sent_count,
            "received {received_count} but only sent {sent_count}"
        );
    });
}

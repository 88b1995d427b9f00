use crate::queue::BackpressureQueue;
use hyperion_codec::Command;
use std::cell::RefCell;

/// Polymorphism over mutations: anything that can accept a decoded
/// [`Command`] and report its remaining capacity. The direct
/// implementation wraps an `hyperion_codec::Encoder`; tests substitute a
/// mock that records calls or injects forced failures.
pub trait CommandProducer {
    /// Attempts to write `command` immediately. Mirrors `RingBuffer::write_command`:
    /// `false` means "no space right now", not an error.
    fn write(&self, command: Command) -> bool;

    /// Bytes available for an immediate write right now.
    fn free_space(&self) -> usize;
}

impl CommandProducer for hyperion_codec::Encoder {
    fn write(&self, command: Command) -> bool {
        hyperion_codec::Encoder::write(self, command)
    }

    fn free_space(&self) -> usize {
        hyperion_codec::Encoder::free_space(self)
    }
}

/// Wraps a [`CommandProducer`] with the overflow queue: every mutation is
/// attempted directly first, and only parked when the producer
/// momentarily refuses it. Before trying a fresh write, any already-parked
/// backlog is drained first so ordering relative to earlier overflow is
/// preserved.
pub struct BackpressuredProducer<P: CommandProducer> {
    producer: P,
    queue: RefCell<BackpressureQueue>,
}

impl<P: CommandProducer> BackpressuredProducer<P> {
    #[must_use]
    pub fn new(producer: P) -> Self {
        Self { producer, queue: RefCell::new(BackpressureQueue::new()) }
    }

    /// Drains whatever backlog can currently be written, then submits
    /// `command`: directly if the queue is now empty and the producer
    /// accepts it, otherwise parked behind the remaining backlog.
    pub fn submit(&self, command: Command) {
        let mut queue = self.queue.borrow_mut();
        queue.drain_to(&self.producer);

        if queue.is_empty() {
            if self.producer.write(command) {
                return;
            }
        }
        queue.enqueue(command);
    }

    /// Attempts to flush the entire parked backlog. Commands still parked
    /// after this call are reported by [`Self::pending_count`].
    pub fn flush(&self) {
        self.queue.borrow_mut().drain_to(&self.producer);
    }

    /// Total number of commands currently parked (critical + coalescing).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        let queue = self.queue.borrow();
        queue.critical_count() + queue.overwrite_count()
    }

    /// Bytes available in the underlying producer right now.
    #[must_use]
    pub fn free_space(&self) -> usize {
        self.producer.free_space()
    }
}

/// A `BackpressuredProducer` never refuses a command (overflow is parked,
/// not dropped), so it is itself a valid [`CommandProducer`], letting
/// `hyperion-sim`'s handles hold one polymorphically alongside any other
/// implementation.
impl<P: CommandProducer> CommandProducer for BackpressuredProducer<P> {
    fn write(&self, command: Command) -> bool {
        self.submit(command);
        true
    }

    fn free_space(&self) -> usize {
        BackpressuredProducer::free_space(self)
    }
}

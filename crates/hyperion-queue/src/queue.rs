use crate::invariants::debug_assert_critical_drained_first;
use crate::metrics::Metrics;
use crate::producer::CommandProducer;
use hyperion_codec::{Command, CommandType};
use std::collections::{HashMap, VecDeque};

/// Overflow parking for commands the ring briefly can't accept.
///
/// Two containers: an ordered sequence of critical entries (`SpawnEntity` /
/// `DespawnEntity`, order- and loss-sensitive) and a map keyed by
/// `(entityId, type)` holding at most one coalescing entry per key.
#[derive(Debug, Default)]
pub struct BackpressureQueue {
    critical: VecDeque<Command>,
    coalescing: HashMap<(u32, CommandType), Command>,
    metrics: Metrics,
}

impl BackpressureQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `command`. Critical commands append to the ordered sequence;
    /// everything else replaces any existing entry with the same
    /// `(entityId, type)` key.
    pub fn enqueue(&mut self, command: Command) {
        if command.command_type().is_critical() {
            self.critical.push_back(command);
            self.metrics.record_critical_enqueued();
        } else {
            self.coalescing.insert(command.coalesce_key(), command);
            self.metrics.record_coalescing_enqueued();
        }
    }

    /// Enqueue/drain traffic counters for this queue.
    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Attempts to write every critical entry, in order, then (only if none
    /// remain) every coalescing entry, stopping at the first `false` the
    /// producer returns.
    ///
    /// Iteration order over the coalescing map is not meaningful: entries
    /// are idempotent within a frame, so any order produces the same
    /// externally observable result.
    pub fn drain_to<P: CommandProducer + ?Sized>(&mut self, producer: &P) {
        while let Some(&front) = self.critical.front() {
            if producer.write(front) {
                self.critical.pop_front();
                self.metrics.record_drained();
            } else {
                self.metrics.record_drain_rejected();
                return;
            }
        }

        debug_assert_critical_drained_first!(self.critical.len());

        let keys: Vec<(u32, CommandType)> = self.coalescing.keys().copied().collect();
        for key in keys {
            let Some(&command) = self.coalescing.get(&key) else {
                continue;
            };
            if producer.write(command) {
                self.coalescing.remove(&key);
                self.metrics.record_drained();
            } else {
                self.metrics.record_drain_rejected();
                return;
            }
        }
    }

    /// Empties both containers without writing anything.
    pub fn clear(&mut self) {
        self.critical.clear();
        self.coalescing.clear();
    }

    #[must_use]
    pub fn critical_count(&self) -> usize {
        self.critical.len()
    }

    #[must_use]
    pub fn overwrite_count(&self) -> usize {
        self.coalescing.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.critical.is_empty() && self.coalescing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// A producer mock that writes into a `Vec` and can be told to reject
    /// every call.
    struct MockProducer {
        accept: bool,
        written: RefCell<Vec<Command>>,
    }

    impl MockProducer {
        fn accepting() -> Self {
            Self { accept: true, written: RefCell::new(Vec::new()) }
        }

        fn rejecting() -> Self {
            Self { accept: false, written: RefCell::new(Vec::new()) }
        }
    }

    impl CommandProducer for MockProducer {
        fn write(&self, command: Command) -> bool {
            if self.accept {
                self.written.borrow_mut().push(command);
            }
            self.accept
        }

        fn free_space(&self) -> usize {
            usize::MAX
        }
    }

    /// Critical entries are attempted before coalescing entries regardless
    /// of enqueue order.
    #[test]
    fn critical_entries_drain_before_coalescing_entries() {
        let mut queue = BackpressureQueue::new();
        queue.enqueue(Command::SetPosition { entity_id: 1, x: 0.0, y: 0.0, z: 0.0 });
        queue.enqueue(Command::SpawnEntity { entity_id: 2 });

        let producer = MockProducer::accepting();
        queue.drain_to(&producer);

        let written = producer.written.into_inner();
        assert_eq!(written[0], Command::SpawnEntity { entity_id: 2 });
        assert_eq!(written[1], Command::SetPosition { entity_id: 1, x: 0.0, y: 0.0, z: 0.0 });
        assert!(queue.is_empty());
    }

    /// Two coalescing writes for the same key collapse to one delivery of
    /// the later value.
    #[test]
    fn coalescing_writes_for_same_key_collapse_to_latest_value() {
        let mut queue = BackpressureQueue::new();
        queue.enqueue(Command::SetPosition { entity_id: 7, x: 1.0, y: 2.0, z: 3.0 });
        queue.enqueue(Command::SetPosition { entity_id: 7, x: 4.0, y: 5.0, z: 6.0 });
        assert_eq!(queue.overwrite_count(), 1);

        let producer = MockProducer::accepting();
        queue.drain_to(&producer);

        let written = producer.written.into_inner();
        assert_eq!(written, vec![Command::SetPosition { entity_id: 7, x: 4.0, y: 5.0, z: 6.0 }]);
        assert!(queue.is_empty());
    }

    /// Drain stops at the first rejected write; one write attempt occurs
    /// and both counts reflect the still-parked entries.
    #[test]
    fn drain_stops_at_first_rejected_write() {
        let mut queue = BackpressureQueue::new();
        queue.enqueue(Command::SpawnEntity { entity_id: 1 });
        queue.enqueue(Command::SetPosition { entity_id: 2, x: 0.0, y: 0.0, z: 0.0 });

        let producer = MockProducer::rejecting();
        queue.drain_to(&producer);

        assert!(producer.written.into_inner().is_empty());
        assert_eq!(queue.critical_count(), 1);
        assert_eq!(queue.overwrite_count(), 1);
    }

    #[test]
    fn metrics_track_enqueue_and_drain_outcomes() {
        let mut queue = BackpressureQueue::new();
        queue.enqueue(Command::SpawnEntity { entity_id: 1 });
        queue.enqueue(Command::SetPosition { entity_id: 2, x: 0.0, y: 0.0, z: 0.0 });

        let rejecting = MockProducer::rejecting();
        queue.drain_to(&rejecting);
        assert_eq!(queue.metrics().drain_rejections(), 1);

        let accepting = MockProducer::accepting();
        queue.drain_to(&accepting);

        let snapshot = queue.metrics().snapshot();
        assert_eq!(snapshot.critical_enqueued, 1);
        assert_eq!(snapshot.coalescing_enqueued, 1);
        assert_eq!(snapshot.drained, 2);
        assert_eq!(snapshot.drain_rejections, 1);
    }

    #[test]
    fn clear_empties_both_containers() {
        let mut queue = BackpressureQueue::new();
        queue.enqueue(Command::SpawnEntity { entity_id: 1 });
        queue.enqueue(Command::SetPosition { entity_id: 2, x: 0.0, y: 0.0, z: 0.0 });
        queue.clear();
        assert!(queue.is_empty());
    }
}

//! Property-based tests for the ring's universal invariants.

use hyperion_ring::RingBuffer;
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = (u8, u32, Vec<u8>)> {
    (any::<u8>(), any::<u32>(), prop::collection::vec(any::<u8>(), 0..16))
}

proptest! {
    /// Invariant 1: a fresh ring of capacity `c` (multiple of 4) reports
    /// `free_space() == c - 1`.
    #[test]
    fn fresh_ring_free_space(bits in 2u32..14) {
        let capacity = (1usize << bits) * 4;
        let ring = RingBuffer::new(capacity).unwrap();
        prop_assert_eq!(ring.free_space(), capacity - 1);
    }

    /// Invariant 2: concatenating the bytes of every `write_command` call
    /// that returned `true` equals the bytes `extract_unread` returns, in
    /// order (byte-exact, no torn or reordered records).
    #[test]
    fn writes_round_trip_byte_exact(records in prop::collection::vec(arb_record(), 0..64)) {
        let ring = RingBuffer::new(65_536).unwrap();
        let mut expected = Vec::new();

        for (command_type, entity_id, payload) in &records {
            if ring.write_command(*command_type, *entity_id, payload) {
                expected.push(*command_type);
                expected.extend_from_slice(&entity_id.to_le_bytes());
                expected.extend_from_slice(payload);
            }
        }

        prop_assert_eq!(ring.extract_unread(), expected);
    }

    /// Invariant 3: after `extract_unread`, `read_head == write_head`, and a
    /// subsequent extract returns zero bytes until a new write occurs.
    #[test]
    fn extract_is_idempotent_when_empty(records in prop::collection::vec(arb_record(), 0..32)) {
        let ring = RingBuffer::new(4096).unwrap();
        for (command_type, entity_id, payload) in &records {
            let _ = ring.write_command(*command_type, *entity_id, payload);
        }
        let _ = ring.extract_unread();

        prop_assert_eq!(ring.header().read_head_acquire(), ring.header().write_head_acquire());
        prop_assert!(ring.extract_unread().is_empty());
    }

    /// Invariant 4 (wrap correctness): driving write_head/read_head close to
    /// the capacity boundary before writing still round-trips identically,
    /// whether or not the record's bytes straddle the wrap point.
    #[test]
    fn wrap_boundary_round_trips(
        start_offset in 0u32..32,
        records in prop::collection::vec(arb_record(), 1..16),
    ) {
        let capacity = 32usize;
        let ring = RingBuffer::new(capacity).unwrap();
        // Prime the ring near the wrap boundary: writeHead == readHead == start_offset.
        ring.header().store_write_head_release(start_offset);
        ring.header().store_read_head_release(start_offset);

        let mut expected = Vec::new();
        for (command_type, entity_id, payload) in &records {
            // Keep payloads short enough that at least one record can fit
            // in a capacity-31-usable-byte ring.
            let payload = &payload[..payload.len().min(8)];
            if ring.write_command(*command_type, *entity_id, payload) {
                expected.push(*command_type);
                expected.extend_from_slice(&entity_id.to_le_bytes());
                expected.extend_from_slice(payload);
            }
        }

        prop_assert_eq!(ring.extract_unread(), expected);
    }
}

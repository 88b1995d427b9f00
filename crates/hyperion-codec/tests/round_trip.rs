use hyperion_codec::{decode_all, Command, Encoder};
use hyperion_ring::RingBuffer;
use std::sync::Arc;

#[test]
fn typed_calls_round_trip_through_the_ring() {
    let ring = Arc::new(RingBuffer::new(4096).unwrap());
    let encoder = Encoder::new(Arc::clone(&ring));

    assert!(encoder.spawn_entity(1));
    assert!(encoder.set_position(1, 10.0, 20.0, 30.0));
    assert!(encoder.set_texture_layer(1, 0x8000_0042));
    assert!(encoder.set_parent(1, hyperion_codec::NO_PARENT));
    assert!(encoder.despawn_entity(1));

    let commands = decode_all(&ring.extract_unread()).unwrap();
    assert_eq!(
        commands,
        vec![
            Command::SpawnEntity { entity_id: 1 },
            Command::SetPosition { entity_id: 1, x: 10.0, y: 20.0, z: 30.0 },
            Command::SetTextureLayer { entity_id: 1, packed: 0x8000_0042 },
            Command::SetParent { entity_id: 1, parent_id: hyperion_codec::NO_PARENT },
            Command::DespawnEntity { entity_id: 1 },
        ]
    );
}

#[test]
fn write_command_returning_false_on_full_ring_does_not_corrupt_stream() {
    // Ring large enough for exactly one SpawnEntity record (5 bytes, with
    // capacity-1 == 5 usable bytes means capacity 8 leaves 2 bytes over).
    let ring = Arc::new(RingBuffer::new(8).unwrap());
    let encoder = Encoder::new(Arc::clone(&ring));

    assert!(encoder.spawn_entity(1));
    assert!(!encoder.spawn_entity(2)); // ring full, rejected

    let commands = decode_all(&ring.extract_unread()).unwrap();
    assert_eq!(commands, vec![Command::SpawnEntity { entity_id: 1 }]);
}

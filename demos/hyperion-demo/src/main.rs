//! Spawns a handful of entities, moves one with the fluent handle API, and
//! drives a few ticks of a single-thread-mode bridge, printing the
//! published snapshot after each one.

use hyperion_queue::CommandProducer;
use hyperion_sim::{Bridge, EngineConfig, NullRenderConsumer, PreferredMode};

fn main() {
    let config = EngineConfig::new()
        .with_preferred_mode(PreferredMode::SingleThread)
        .with_command_buffer_size(16_384);
    let mut bridge = Bridge::new(config);
    let producer = bridge.command_producer();

    for entity_id in 0..3u32 {
        producer.write(hyperion_codec::Command::SpawnEntity { entity_id });
    }
    producer.write(hyperion_codec::Command::SetPosition { entity_id: 1, x: 1.0, y: 2.0, z: 3.0 });

    let mut render = NullRenderConsumer::new();
    for frame in 0..3 {
        bridge.tick(1.0 / 60.0, &mut render);
        let (snapshot, dirty) = bridge.latest_render_state().expect("tick publishes a snapshot");
        println!(
            "frame {frame}: tick_count={} entities={} dirty={}",
            snapshot.tick_count,
            snapshot.entity_count(),
            dirty.dirty_count()
        );
    }

    bridge.destroy();
    println!("frames rendered: {}", render.frames_consumed());
}

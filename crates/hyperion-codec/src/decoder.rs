use crate::command::{Command, CommandType};
use crate::error::DecodeError;

/// Walks a contiguous byte stream (as returned by
/// [`hyperion_ring::RingBuffer::extract_unread`]) one record at a time.
///
/// The extractor's contract guarantees records are never fragmented across
/// extracts, so any truncation or unknown type byte here indicates stream
/// corruption; both are fatal, not recoverable mid-stream.
pub struct Decoder<'a> {
    bytes: &'a [u8],
    cursor: usize,
    failed: bool,
}

impl<'a> Decoder<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            cursor: 0,
            failed: false,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.cursor + len > self.bytes.len() {
            return Err(DecodeError::Truncated {
                offset: self.cursor,
                needed: self.cursor + len - self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    fn decode_one(&mut self) -> Result<Command, DecodeError> {
        let code = self.take(1)?[0];
        let command_type =
            CommandType::from_code(code).ok_or(DecodeError::UnknownType { code })?;
        let entity_id = u32::from_le_bytes(self.take(4)?.try_into().unwrap());
        let payload = self.take(command_type.payload_size())?;
        Ok(build_command(command_type, entity_id, payload))
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<Command, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.bytes.len() {
            return None;
        }
        let result = self.decode_one();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Decodes every record in `bytes`, stopping at the first error.
///
/// # Errors
///
/// Returns the first [`DecodeError`] encountered; every record before it is
/// discarded, matching the "fatal to the simulation" propagation policy (a
/// corrupt stream or unknown opcode halts decoding entirely).
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Command>, DecodeError> {
    Decoder::new(bytes).collect()
}

fn build_command(command_type: CommandType, entity_id: u32, payload: &[u8]) -> Command {
    let f32_at = |i: usize| f32::from_le_bytes(payload[i * 4..i * 4 + 4].try_into().unwrap());
    let u32_at = |i: usize| u32::from_le_bytes(payload[i * 4..i * 4 + 4].try_into().unwrap());

    match command_type {
        CommandType::Noop | CommandType::Reserved => Command::Noop,
        CommandType::SpawnEntity => Command::SpawnEntity { entity_id },
        CommandType::DespawnEntity => Command::DespawnEntity { entity_id },
        CommandType::SetPosition => Command::SetPosition {
            entity_id,
            x: f32_at(0),
            y: f32_at(1),
            z: f32_at(2),
        },
        CommandType::SetRotation => Command::SetRotation {
            entity_id,
            x: f32_at(0),
            y: f32_at(1),
            z: f32_at(2),
            w: f32_at(3),
        },
        CommandType::SetScale => Command::SetScale {
            entity_id,
            x: f32_at(0),
            y: f32_at(1),
            z: f32_at(2),
        },
        CommandType::SetVelocity => Command::SetVelocity {
            entity_id,
            x: f32_at(0),
            y: f32_at(1),
            z: f32_at(2),
        },
        CommandType::SetTextureLayer => Command::SetTextureLayer {
            entity_id,
            packed: u32_at(0),
        },
        CommandType::SetMeshHandle => Command::SetMeshHandle {
            entity_id,
            handle: u32_at(0),
        },
        CommandType::SetRenderPrimitive => Command::SetRenderPrimitive {
            entity_id,
            primitive_kind: u32_at(0),
        },
        CommandType::SetParent => Command::SetParent {
            entity_id,
            parent_id: u32_at(0),
        },
        CommandType::SetPrimParams0 => Command::SetPrimParams0 {
            entity_id,
            p0: f32_at(0),
            p1: f32_at(1),
            p2: f32_at(2),
            p3: f32_at(3),
        },
        CommandType::SetPrimParams1 => Command::SetPrimParams1 {
            entity_id,
            p4: f32_at(0),
            p5: f32_at(1),
            p6: f32_at(2),
            p7: f32_at(3),
        },
        CommandType::SetListenerPosition => Command::SetListenerPosition {
            entity_id,
            x: f32_at(0),
            y: f32_at(1),
            z: f32_at(2),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NO_PARENT;

    #[test]
    fn decodes_spawn_position_despawn_stream() {
        let bytes: Vec<u8> = vec![
            0x01, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x3F,
            0x00, 0x00, 0x20, 0x40, 0x00, 0x00, 0x60, 0x40, 0x02, 0x00, 0x00, 0x00, 0x00,
        ];
        let commands = decode_all(&bytes).unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], Command::SpawnEntity { entity_id: 0 });
        assert_eq!(
            commands[1],
            Command::SetPosition { entity_id: 0, x: 1.5, y: 2.5, z: 3.5 }
        );
        assert_eq!(commands[2], Command::DespawnEntity { entity_id: 0 });
    }

    #[test]
    fn unknown_type_byte_is_fatal() {
        let bytes = vec![0xFFu8, 0, 0, 0, 0];
        assert_eq!(
            decode_all(&bytes),
            Err(DecodeError::UnknownType { code: 0xFF })
        );
    }

    #[test]
    fn truncated_payload_is_fatal() {
        // SetPosition needs 12 payload bytes, only 4 are present.
        let bytes = vec![0x03, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            decode_all(&bytes),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn set_parent_none_sentinel_round_trips() {
        let mut bytes = vec![10u8];
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(&NO_PARENT.to_le_bytes());
        let commands = decode_all(&bytes).unwrap();
        assert_eq!(
            commands[0],
            Command::SetParent { entity_id: 5, parent_id: NO_PARENT }
        );
    }
}

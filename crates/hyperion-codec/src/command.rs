/// Entity id sentinel meaning "no parent".
pub const NO_PARENT: u32 = 0xFFFF_FFFF;

/// The fifteen wire-level command types. `Reserved` covers the type-code
/// range left open for future extensions; it decodes successfully (zero
/// payload) but is never produced by [`crate::Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandType {
    Noop = 0,
    SpawnEntity = 1,
    DespawnEntity = 2,
    SetPosition = 3,
    SetRotation = 4,
    SetScale = 5,
    SetVelocity = 6,
    SetTextureLayer = 7,
    SetMeshHandle = 8,
    SetRenderPrimitive = 9,
    SetParent = 10,
    SetPrimParams0 = 11,
    SetPrimParams1 = 12,
    SetListenerPosition = 13,
    Reserved = 14,
}

impl CommandType {
    /// Looks up a command type from its wire code. `None` for any code the
    /// schema does not recognize (an unknown type byte is fatal to the
    /// caller, not to this lookup).
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Noop,
            1 => Self::SpawnEntity,
            2 => Self::DespawnEntity,
            3 => Self::SetPosition,
            4 => Self::SetRotation,
            5 => Self::SetScale,
            6 => Self::SetVelocity,
            7 => Self::SetTextureLayer,
            8 => Self::SetMeshHandle,
            9 => Self::SetRenderPrimitive,
            10 => Self::SetParent,
            11 => Self::SetPrimParams0,
            12 => Self::SetPrimParams1,
            13 => Self::SetListenerPosition,
            14 => Self::Reserved,
            _ => return None,
        })
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Payload size in bytes, strictly determined by type.
    #[must_use]
    pub fn payload_size(self) -> usize {
        match self {
            Self::Noop | Self::SpawnEntity | Self::DespawnEntity => 0,
            Self::SetPosition | Self::SetScale | Self::SetVelocity | Self::SetListenerPosition => {
                12
            }
            Self::SetRotation | Self::SetPrimParams0 | Self::SetPrimParams1 => 16,
            Self::SetTextureLayer
            | Self::SetMeshHandle
            | Self::SetRenderPrimitive
            | Self::SetParent => 4,
            Self::Reserved => 0,
        }
    }

    /// Whether this type is critical (must preserve order, must never be
    /// dropped) or coalescing (replaceable by a later same-key command).
    #[must_use]
    pub fn is_critical(self) -> bool {
        matches!(self, Self::SpawnEntity | Self::DespawnEntity)
    }
}

/// A decoded, typed mutation: the in-memory counterpart of one wire record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Noop,
    SpawnEntity { entity_id: u32 },
    DespawnEntity { entity_id: u32 },
    SetPosition { entity_id: u32, x: f32, y: f32, z: f32 },
    SetRotation { entity_id: u32, x: f32, y: f32, z: f32, w: f32 },
    SetScale { entity_id: u32, x: f32, y: f32, z: f32 },
    SetVelocity { entity_id: u32, x: f32, y: f32, z: f32 },
    SetTextureLayer { entity_id: u32, packed: u32 },
    SetMeshHandle { entity_id: u32, handle: u32 },
    SetRenderPrimitive { entity_id: u32, primitive_kind: u32 },
    SetParent { entity_id: u32, parent_id: u32 },
    SetPrimParams0 { entity_id: u32, p0: f32, p1: f32, p2: f32, p3: f32 },
    SetPrimParams1 { entity_id: u32, p4: f32, p5: f32, p6: f32, p7: f32 },
    SetListenerPosition { entity_id: u32, x: f32, y: f32, z: f32 },
}

impl Command {
    #[must_use]
    pub fn command_type(&self) -> CommandType {
        match self {
            Self::Noop => CommandType::Noop,
            Self::SpawnEntity { .. } => CommandType::SpawnEntity,
            Self::DespawnEntity { .. } => CommandType::DespawnEntity,
            Self::SetPosition { .. } => CommandType::SetPosition,
            Self::SetRotation { .. } => CommandType::SetRotation,
            Self::SetScale { .. } => CommandType::SetScale,
            Self::SetVelocity { .. } => CommandType::SetVelocity,
            Self::SetTextureLayer { .. } => CommandType::SetTextureLayer,
            Self::SetMeshHandle { .. } => CommandType::SetMeshHandle,
            Self::SetRenderPrimitive { .. } => CommandType::SetRenderPrimitive,
            Self::SetParent { .. } => CommandType::SetParent,
            Self::SetPrimParams0 { .. } => CommandType::SetPrimParams0,
            Self::SetPrimParams1 { .. } => CommandType::SetPrimParams1,
            Self::SetListenerPosition { .. } => CommandType::SetListenerPosition,
        }
    }

    /// The entity id carried on the wire. For `SetListenerPosition` this
    /// field exists in the record but is semantically ignored; it is still
    /// surfaced here since it round-trips through the codec.
    #[must_use]
    pub fn entity_id(&self) -> u32 {
        match *self {
            Self::Noop => 0,
            Self::SpawnEntity { entity_id }
            | Self::DespawnEntity { entity_id }
            | Self::SetPosition { entity_id, .. }
            | Self::SetRotation { entity_id, .. }
            | Self::SetScale { entity_id, .. }
            | Self::SetVelocity { entity_id, .. }
            | Self::SetTextureLayer { entity_id, .. }
            | Self::SetMeshHandle { entity_id, .. }
            | Self::SetRenderPrimitive { entity_id, .. }
            | Self::SetParent { entity_id, .. }
            | Self::SetPrimParams0 { entity_id, .. }
            | Self::SetPrimParams1 { entity_id, .. }
            | Self::SetListenerPosition { entity_id, .. } => entity_id,
        }
    }

    /// The `(entityId, type)` coalescing key. Two commands with the same
    /// key collapse to whichever was enqueued later.
    #[must_use]
    pub fn coalesce_key(&self) -> (u32, CommandType) {
        (self.entity_id(), self.command_type())
    }
}

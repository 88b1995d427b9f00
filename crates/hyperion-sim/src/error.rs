use thiserror::Error;

/// Errors surfaced by the engine, bridge, and handle layer.
///
/// Command-path overflow is recovered locally by the backpressure queue and
/// never reaches this enum; only handle/engine misuse, decode failures, and
/// supervisor events do.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HyperionError {
    /// A mutator was invoked on a handle that has already been destroyed.
    #[error("handle for entity {entity_id} has already been destroyed")]
    HandleDestroyed { entity_id: u32 },

    /// `spawn()` was attempted while `entityCount == maxEntities`.
    #[error("entity limit of {max_entities} reached")]
    EntityLimitReached { max_entities: u32 },

    /// Any call made on an engine after `destroy()`.
    #[error("engine has been destroyed")]
    EngineDestroyed,

    /// The command stream could not be decoded; fatal to the simulation.
    #[error("command stream decode failed: {0}")]
    DecodeFailed(#[from] hyperion_codec::DecodeError),
}

impl HyperionError {
    /// Whether a caller can reasonably retry or continue after this error.
    ///
    /// `EntityLimitReached` is recoverable (destroy entities, then retry);
    /// everything else indicates a programmer error or corrupted stream.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EntityLimitReached { .. })
    }

    /// Whether this error indicates the engine can no longer make progress.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EngineDestroyed | Self::DecodeFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_limit_reached_is_recoverable_and_not_terminal() {
        let err = HyperionError::EntityLimitReached { max_entities: 8 };
        assert!(err.is_recoverable());
        assert!(!err.is_terminal());
    }

    #[test]
    fn engine_destroyed_is_terminal_and_not_recoverable() {
        let err = HyperionError::EngineDestroyed;
        assert!(err.is_terminal());
        assert!(!err.is_recoverable());
    }
}

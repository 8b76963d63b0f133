//! Error type for authoring-time operations.
//!
//! The per-tick path never returns these; missing references at runtime
//! idle the affected scheduler and are reported through `log`.

use crate::ids::{AnimationId, GroupId, LayerId, PlaylistId, StateId};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BehaviorError {
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("State not found: {0}")]
    StateNotFound(StateId),

    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("Animation not found: {0}")]
    AnimationNotFound(AnimationId),

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// A State owns at most one Playlist per Layer.
    #[error("State {state} already has a playlist for layer {layer}")]
    DuplicatePlaylist { state: StateId, layer: LayerId },

    #[error("Animation {animation} belongs to layer {actual}, playlist drives layer {expected}")]
    LayerMismatch {
        animation: AnimationId,
        expected: LayerId,
        actual: LayerId,
    },

    #[error("Transition {from} -> {to} crosses groups")]
    CrossGroupTransition { from: StateId, to: StateId },

    #[error("State {state} does not belong to group {group}")]
    StateNotInGroup { group: GroupId, state: StateId },

    #[error("Invalid weight {0}: weights must be finite and non-negative")]
    InvalidWeight(f32),

    #[error("Invalid duration {0}: durations must be finite and non-negative")]
    InvalidDuration(f32),

    #[error("Stored library parse error: {reason}")]
    Parse { reason: String },
}

impl From<serde_json::Error> for BehaviorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

pub(crate) fn check_weight(w: f32) -> Result<f32, BehaviorError> {
    if w.is_finite() && w >= 0.0 {
        Ok(w)
    } else {
        Err(BehaviorError::InvalidWeight(w))
    }
}

pub(crate) fn check_duration(d: f32) -> Result<f32, BehaviorError> {
    if d.is_finite() && d >= 0.0 {
        Ok(d)
    } else {
        Err(BehaviorError::InvalidDuration(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        let e = BehaviorError::StateNotFound(StateId(7));
        assert_eq!(e.to_string(), "State not found: StateId#7");
    }

    #[test]
    fn weight_and_duration_guards() {
        assert!(check_weight(0.0).is_ok());
        assert_eq!(check_weight(-1.0), Err(BehaviorError::InvalidWeight(-1.0)));
        assert!(check_duration(f32::INFINITY).is_err());
    }

    #[test]
    fn json_errors_convert() {
        let err: BehaviorError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, BehaviorError::Parse { .. }));
    }
}

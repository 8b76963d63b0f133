//! Output contracts from the core engine.
//!
//! Channel values are written straight to the host rig; Outputs carry only
//! the discrete notifications meant for the host's cross-entity messaging.

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, StateId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Notification {
    StateEntered {
        group: GroupId,
        state: StateId,
        name: String,
    },
    StateExited {
        group: GroupId,
        state: StateId,
        name: String,
    },
}

impl Notification {
    pub fn state(&self) -> StateId {
        match self {
            Notification::StateEntered { state, .. } | Notification::StateExited { state, .. } => {
                *state
            }
        }
    }
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl Outputs {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            notifications: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    #[inline]
    pub fn push(&mut self, n: Notification) {
        self.notifications.push(n);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Move everything out of `other` onto the end of this buffer.
    pub fn append(&mut self, other: &mut Outputs) {
        self.notifications.append(&mut other.notifications);
    }
}

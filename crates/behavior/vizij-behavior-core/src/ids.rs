//! Identifiers and a simple allocator for authoring entities.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

id_type!(GroupId);
id_type!(StateId);
id_type!(LayerId);
id_type!(AnimationId);
id_type!(KeyframeId);
id_type!(PlaylistId);
id_type!(EntryId);
id_type!(
    /// Scalar (morph) channels are addressed by id rather than by name.
    ScalarChannelId
);

/// Monotonic allocator shared by every entity kind.
/// A single counter keeps ids unique across kinds, which makes logs unambiguous.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn bump(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_group(&mut self) -> GroupId {
        GroupId(self.bump())
    }

    #[inline]
    pub fn alloc_state(&mut self) -> StateId {
        StateId(self.bump())
    }

    #[inline]
    pub fn alloc_layer(&mut self) -> LayerId {
        LayerId(self.bump())
    }

    #[inline]
    pub fn alloc_animation(&mut self) -> AnimationId {
        AnimationId(self.bump())
    }

    #[inline]
    pub fn alloc_keyframe(&mut self) -> KeyframeId {
        KeyframeId(self.bump())
    }

    #[inline]
    pub fn alloc_playlist(&mut self) -> PlaylistId {
        PlaylistId(self.bump())
    }

    #[inline]
    pub fn alloc_entry(&mut self) -> EntryId {
        EntryId(self.bump())
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//! Handle types for arena-backed collections
//!
//! The runtime scene graph stores nodes in a slot map and hands out
//! generational keys instead of references, so a camera can name the node
//! it is attached to without owning or borrowing it.

pub use slotmap::{SlotMap, SecondaryMap};

slotmap::new_key_type! {
    /// Stable handle to a node in a [`crate::scene::SceneGraph`]
    pub struct NodeId;

    /// Handle returned when registering a transform listener
    pub struct ListenerId;
}

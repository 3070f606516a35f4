use bevy::reflect::prelude::*;
use serde::{Deserialize, Serialize};

/// An event fired by a clip generator when its local time crosses `local_time`.
#[derive(Reflect, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
pub struct ClipTrigger {
    pub local_time: f32,
    pub event_id: i32,
    pub relative_to_end_of_clip: bool,
    pub acyclic: bool,
    /// Whether the trigger was converted from an annotation embedded in the animation file,
    /// as opposed to being authored on the behavior graph.
    pub is_annotation: bool,
}

impl ClipTrigger {
    pub fn new(local_time: f32, event_id: i32) -> Self {
        Self {
            local_time,
            event_id,
            ..Default::default()
        }
    }

    pub fn annotation(local_time: f32, event_id: i32) -> Self {
        Self {
            is_annotation: true,
            ..Self::new(local_time, event_id)
        }
    }
}

/// A list of triggers. The engine shares these between clip generators by reference count,
/// so they are never edited in place: filtering produces a new array.
#[derive(Reflect, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
pub struct ClipTriggerArray {
    pub triggers: Vec<ClipTrigger>,
}

impl ClipTriggerArray {
    pub fn new(triggers: Vec<ClipTrigger>) -> Self {
        Self { triggers }
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// A fresh array holding only the triggers that came from annotations.
    pub fn annotations_only(&self) -> Self {
        Self {
            triggers: self
                .triggers
                .iter()
                .filter(|trigger| trigger.is_annotation)
                .cloned()
                .collect(),
        }
    }
}

use bevy::{reflect::prelude::*, transform::prelude::*};
use serde::{Deserialize, Serialize};

/// Sampled output of an animation at an instant: one [`Transform`] per transform track and
/// one value per float track. Track indices line up with the tracks of the animation the
/// pose was sampled from.
#[derive(Reflect, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
pub struct Pose {
    pub transforms: Vec<Transform>,
    pub floats: Vec<f32>,
    pub timestamp: f32,
}

impl Pose {
    pub fn new(transforms: Vec<Transform>, floats: Vec<f32>, timestamp: f32) -> Self {
        Self {
            transforms,
            floats,
            timestamp,
        }
    }

    pub fn num_transform_tracks(&self) -> usize {
        self.transforms.len()
    }

    pub fn num_float_tracks(&self) -> usize {
        self.floats.len()
    }
}

/// What a generator hands back to the engine after generating. The pose track is optional,
/// an output without one is left untouched by anything that post-processes poses.
#[derive(Reflect, Clone, Debug, Default, PartialEq)]
#[reflect(Default)]
pub struct GeneratorOutput {
    pub pose: Option<Pose>,
}

impl GeneratorOutput {
    pub fn with_pose(pose: Pose) -> Self {
        Self { pose: Some(pose) }
    }

    pub fn has_pose(&self) -> bool {
        self.pose.is_some()
    }
}

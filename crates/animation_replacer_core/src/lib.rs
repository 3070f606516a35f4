//! # Animation Replacer Core
//!
//! Engine-side data model shared by the animation replacer: the clip generator nodes the
//! host engine drives, the animations they bind to, poses and their interpolation, the
//! character and animation library the clip generators live in, and the replacer's
//! settings.
//!
//! Nothing in this crate decides *whether* an animation is replaced; that lives in the
//! `animation_replacer` crate. This crate only describes the objects that decision is made
//! about, in a form that can be driven without a live engine loop.

pub mod animation_clip;
pub mod character;
pub mod clip_generator;
pub mod errors;
pub mod id;
pub mod interpolation;
pub mod pose;
pub mod settings;
pub mod trigger;

pub mod prelude {
    pub use crate::animation_clip::{AnimationBinding, AnimationClip, AnimationControl, Keyframes};
    pub use crate::character::{AnimationLibrary, Character, SceneNode, WorldObject};
    pub use crate::clip_generator::{ClipFlags, ClipGenerator, ClipUpdate, PlaybackMode};
    pub use crate::errors::ReplacerError;
    pub use crate::id::{
        BehaviorGraphId, BindingIndex, CharacterId, ClipGeneratorId, ConditionId, ReplacementId,
        SubModId, WorldObjectId,
    };
    pub use crate::interpolation::{easing::ease_in_out, linear::InterpolateLinear};
    pub use crate::pose::{GeneratorOutput, Pose};
    pub use crate::settings::{AnimationLogMode, AnimationLogSettings, ReplacerSettings};
    pub use crate::trigger::{ClipTrigger, ClipTriggerArray};
}

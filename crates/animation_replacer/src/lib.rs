//! # Animation Replacer
//!
//! Swaps the animation a playing clip generator is bound to for a configured replacement,
//! and cross-fades between the two.
//!
//! The host engine owns its clip generators. For every clip generator it activates it
//! creates an [`ActiveClip`](active_clip::ActiveClip), then drives it through the clip's
//! lifecycle:
//!
//! - [`activate`](active_clip::ActiveClip::activate) when the clip starts: the
//!   [`ReplacementProvider`](provider::ReplacementProvider) is asked for candidates and the
//!   first one whose conditions hold is bound.
//! - [`pre_update`](active_clip::ActiveClip::pre_update) every update: interruptible
//!   animations re-evaluate their conditions, and any queued swap is applied.
//! - [`pre_generate`](active_clip::ActiveClip::pre_generate) and
//!   [`on_generate`](active_clip::ActiveClip::on_generate) around pose generation, which
//!   blend the previous animation's pose into the output while a cross-fade lasts.
//! - [`on_echo`](active_clip::ActiveClip::on_echo) and
//!   [`on_loop`](active_clip::ActiveClip::on_loop) when the clip starts over, which may
//!   queue a swap to another replacement or another variant.
//! - [`destroy`](active_clip::ActiveClip::destroy) when the clip is deactivated, which puts
//!   the clip generator back the way it was.
//!
//! Time is never read from global state: every callback receives a
//! [`HookContext`](active_clip::HookContext) carrying the current game time, usually taken
//! from the [`FrameClock`](time::FrameClock) resource that [`AnimationReplacerPlugin`]
//! keeps running.
//!
//! [`AnimationReplacerPlugin`]: plugin::AnimationReplacerPlugin

pub mod active_clip;
pub mod animation_log;
pub mod blend;
pub mod conditions;
pub mod decision;
pub mod destroyed_callbacks;
pub mod plugin;
pub mod provider;
pub mod random_cache;
pub mod replacement;
pub mod replacements;
pub mod resources;
pub mod submod;
pub mod time;

pub use animation_replacer_core;

pub mod prelude {
    pub use crate::active_clip::{ActiveClip, HookContext, OriginalClipState, QueuedReplacement};
    pub use crate::animation_log::{
        AnimationLog, AnimationLogEntry, AnimationLogEvent, AnimationLogSink, NoAnimationLog,
    };
    pub use crate::blend::BlendController;
    pub use crate::conditions::{
        Condition, ConditionContext, ConditionSet, ConstCondition, FnCondition, RandomComponent,
        RandomCondition,
    };
    pub use crate::decision::{ReplaceDecision, should_replace};
    pub use crate::plugin::AnimationReplacerPlugin;
    pub use crate::provider::{ReplacementCatalog, ReplacementProvider};
    pub use crate::random_cache::RandomResultCache;
    pub use crate::replacement::{ReplacementAnimation, ReplacementFlags, Variant};
    pub use crate::replacements::AnimationReplacements;
    pub use crate::resources::ReplacerResources;
    pub use crate::submod::{SubMod, SubModRegistry};
    pub use crate::time::{FrameClock, GameTime};
    pub use animation_replacer_core::prelude::*;
}

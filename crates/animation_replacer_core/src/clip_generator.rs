use std::sync::Arc;

use bevy::reflect::prelude::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    animation_clip::{AnimationBinding, AnimationClip, AnimationControl},
    character::Character,
    id::{BindingIndex, ClipGeneratorId},
    pose::{GeneratorOutput, Pose},
    trigger::ClipTriggerArray,
};

#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[reflect(Default)]
pub enum PlaybackMode {
    #[default]
    SinglePlay,
    Looping,
    UserControlled,
    PingPong,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ClipFlags: u8 {
        const CONTINUE_MOTION_AT_END = 0x1;
        const SYNC_HALF_CYCLE_IN_PING_PONG_MODE = 0x2;
        const MIRROR = 0x4;
        const FORCE_DENSE_POSE = 0x8;
        const DONT_CONVERT_ANNOTATIONS_TO_TRIGGERS = 0x10;
        const IGNORE_MOTION = 0x20;
    }
}

/// What happened to a clip generator's local time during an update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipUpdate {
    /// The clip wrapped around (looping) or bounced (ping-pong).
    pub looped: bool,
    /// A single-play clip reached its end.
    pub finished: bool,
}

/// A clip generator node as the host engine sees it: one playing instance of an animation
/// clip inside a behavior graph.
///
/// The engine owns these. Anything that reacts to a clip generator borrows it for the
/// duration of a single callback.
#[derive(Clone, Debug, Default)]
pub struct ClipGenerator {
    pub id: ClipGeneratorId,
    pub name: String,
    pub animation_binding_index: BindingIndex,
    pub mode: PlaybackMode,
    pub flags: ClipFlags,
    pub playback_speed: f32,
    pub local_time: f32,
    /// Triggers as authored. Reference counted and possibly shared with other generators.
    pub original_triggers: Option<Arc<ClipTriggerArray>>,
    /// Triggers of the current activation.
    pub triggers: Option<Arc<ClipTriggerArray>>,
    pub animation_control: Option<Arc<AnimationControl>>,
    /// Part of a synchronized (paired) animation.
    pub synchronized: bool,
    ping_pong_backwards: bool,
    active: bool,
}

impl ClipGenerator {
    pub fn new(id: impl Into<ClipGeneratorId>, index: BindingIndex) -> Self {
        Self {
            id: id.into(),
            animation_binding_index: index,
            playback_speed: 1.,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: PlaybackMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_flags(mut self, flags: ClipFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_triggers(mut self, triggers: ClipTriggerArray) -> Self {
        self.original_triggers = Some(Arc::new(triggers));
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Binds the animation at the current binding index and starts playback from the start.
    pub fn activate(&mut self, character: &Character) {
        let index = self.animation_binding_index;
        self.animation_control = Some(Arc::new(AnimationControl::new(AnimationBinding {
            index,
            animation: character.library.clip(index).cloned(),
        })));
        self.triggers = self.original_triggers.clone();
        self.local_time = 0.;
        self.ping_pong_backwards = false;
        self.active = true;
    }

    /// Releases the playback handle and the activation's triggers.
    pub fn deactivate(&mut self) {
        self.animation_control = None;
        self.triggers = None;
        self.active = false;
    }

    /// Hands the playback handle over to the caller, so deactivation does not release it.
    pub fn detach_animation_control(&mut self) -> Option<Arc<AnimationControl>> {
        self.animation_control.take()
    }

    pub fn animation(&self) -> Option<&Arc<AnimationClip>> {
        self.animation_control
            .as_ref()
            .and_then(|control| control.animation())
    }

    pub fn duration(&self) -> f32 {
        self.animation().map(|clip| clip.duration).unwrap_or(0.)
    }

    /// Advances local time by `delta` scaled by the playback speed.
    pub fn update(&mut self, delta: f32) -> ClipUpdate {
        let duration = self.duration();
        let mut result = ClipUpdate::default();
        if duration <= 0. {
            return result;
        }

        let step = delta * self.playback_speed;
        match self.mode {
            PlaybackMode::SinglePlay => {
                self.local_time = (self.local_time + step).clamp(0., duration);
                result.finished = self.local_time >= duration;
            }
            PlaybackMode::Looping => {
                let time = self.local_time + step;
                result.looped = !(0. ..duration).contains(&time);
                self.local_time = time.rem_euclid(duration);
            }
            PlaybackMode::PingPong => {
                let mut time = if self.ping_pong_backwards {
                    self.local_time - step
                } else {
                    self.local_time + step
                };
                if time >= duration {
                    time = duration - (time - duration).min(duration);
                    self.ping_pong_backwards = true;
                    result.looped = true;
                } else if time <= 0. {
                    time = (-time).min(duration);
                    self.ping_pong_backwards = false;
                    result.looped = true;
                }
                self.local_time = time;
            }
            PlaybackMode::UserControlled => {}
        }

        result
    }

    /// Samples the bound animation at the current local time. Without a bound animation there
    /// is no pose track.
    pub fn generate(&self) -> GeneratorOutput {
        GeneratorOutput {
            pose: self.animation().map(|clip| clip.sample(self.local_time)),
        }
    }

    pub fn sample_pose(&self) -> Option<Pose> {
        self.generate().pose
    }
}

#[cfg(test)]
mod tests {
    use bevy::transform::components::Transform;

    use super::*;
    use crate::{animation_clip::Keyframes, character::AnimationLibrary, id::CharacterId};

    fn character_with_clip(duration: f32) -> Character {
        let clip = AnimationClip::new("run", duration).with_transform_track(Keyframes::new(vec![
            (0., Transform::from_xyz(0., 0., 0.)),
            (duration, Transform::from_xyz(duration, 0., 0.)),
        ]));
        let mut library = AnimationLibrary::new();
        library
            .add_animation("run.hkx", Some(Arc::new(clip)), 10)
            .unwrap();
        Character::new(CharacterId(1), Arc::new(library))
    }

    #[test]
    fn activation_binds_and_deactivation_releases() {
        let character = character_with_clip(1.);
        let mut clip =
            ClipGenerator::new(ClipGeneratorId(3), 0).with_triggers(ClipTriggerArray::new(vec![Default::default()]));

        clip.activate(&character);
        assert!(clip.is_active());
        assert_eq!(clip.duration(), 1.);
        assert!(Arc::ptr_eq(
            clip.triggers.as_ref().unwrap(),
            clip.original_triggers.as_ref().unwrap()
        ));

        clip.deactivate();
        assert!(!clip.is_active());
        assert!(clip.animation_control.is_none());
        assert!(clip.triggers.is_none());
        assert!(clip.original_triggers.is_some());
    }

    #[test]
    fn detached_control_survives_deactivation() {
        let character = character_with_clip(1.);
        let mut clip = ClipGenerator::new(ClipGeneratorId(3), 0);
        clip.activate(&character);

        let control = clip.detach_animation_control().unwrap();
        clip.deactivate();
        assert!(control.animation().is_some());
    }

    #[test]
    fn looping_wraps_and_reports() {
        let character = character_with_clip(1.);
        let mut clip = ClipGenerator::new(ClipGeneratorId(3), 0).with_mode(PlaybackMode::Looping);
        clip.activate(&character);

        assert!(!clip.update(0.5).looped);
        let update = clip.update(0.75);
        assert!(update.looped);
        assert!((clip.local_time - 0.25).abs() < 1e-6);
    }

    #[test]
    fn single_play_clamps_at_end() {
        let character = character_with_clip(1.);
        let mut clip = ClipGenerator::new(ClipGeneratorId(3), 0);
        clip.activate(&character);

        assert!(clip.update(2.).finished);
        assert_eq!(clip.local_time, 1.);
    }

    #[test]
    fn ping_pong_bounces() {
        let character = character_with_clip(1.);
        let mut clip = ClipGenerator::new(ClipGeneratorId(3), 0).with_mode(PlaybackMode::PingPong);
        clip.activate(&character);

        assert!(clip.update(1.25).looped);
        assert!((clip.local_time - 0.75).abs() < 1e-6);
        clip.update(0.25);
        assert!((clip.local_time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn generate_samples_local_time() {
        let character = character_with_clip(2.);
        let mut clip = ClipGenerator::new(ClipGeneratorId(3), 0);
        assert!(!clip.generate().has_pose());

        clip.activate(&character);
        clip.update(0.5);
        let pose = clip.sample_pose().unwrap();
        assert_eq!(pose.transforms, vec![Transform::from_xyz(0.5, 0., 0.)]);
    }
}

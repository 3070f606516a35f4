use animation_replacer_core::{
    clip_generator::ClipGenerator,
    interpolation::{easing::ease_in_out, linear::blend_poses},
    pose::GeneratorOutput,
};

/// Cross-fades from the animation a clip generator was playing before a swap to whatever it
/// plays after.
///
/// While blending, a shadow copy of the pre-swap generator keeps playing on its own and its
/// pose is mixed into the live output.
#[derive(Debug, Default)]
pub struct BlendController {
    shadow: Option<ClipGenerator>,
    duration: f32,
    elapsed: f32,
    last_game_time: f32,
}

impl BlendController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots `live` into the shadow and takes over its animation control, so that
    /// deactivating `live` does not release the animation the shadow keeps sampling.
    ///
    /// The shadow stays active and carries on from the live local time instead of restarting.
    pub fn start(&mut self, live: &mut ClipGenerator, blend_time: f32, game_time: f32) {
        let mut shadow = live.clone();
        shadow.animation_control = live.detach_animation_control();

        self.shadow = Some(shadow);
        self.duration = blend_time;
        self.elapsed = 0.;
        self.last_game_time = game_time;
    }

    pub fn stop(&mut self) {
        self.shadow = None;
        self.duration = 0.;
    }

    pub fn shadow(&self) -> Option<&ClipGenerator> {
        self.shadow.as_ref()
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_blending(&self) -> bool {
        self.shadow.is_some() && self.elapsed < self.duration
    }

    /// Eased progress of the blend, `0` being all shadow and `1` all live output.
    pub fn blend_factor(&self) -> f32 {
        if self.duration <= 0. {
            return 1.;
        }
        ease_in_out(0., 1., self.elapsed / self.duration, 2.).clamp(0., 1.)
    }

    /// Moves the blend forward to `game_time`. The shadow keeps playing while the blend lasts.
    pub fn advance(&mut self, game_time: f32) {
        let delta = (game_time - self.last_game_time).max(0.);
        self.elapsed += delta;
        self.last_game_time = game_time;

        if self.elapsed < self.duration
            && let Some(shadow) = self.shadow.as_mut()
        {
            shadow.update(delta);
        }
    }

    /// Mixes the shadow pose into `output`. Once the blend has run its course the shadow is
    /// released and `output` is left untouched; returns whether anything was blended.
    pub fn apply(&mut self, output: &mut GeneratorOutput) -> bool {
        if self.elapsed >= self.duration {
            self.stop();
            return false;
        }

        let Some(shadow) = self.shadow.as_ref() else {
            return false;
        };
        let Some(pose) = output.pose.as_mut() else {
            return false;
        };
        let Some(animation) = shadow.animation() else {
            return false;
        };

        let sampled = animation.sample_partial_tracks(
            shadow.local_time,
            animation.num_transform_tracks(),
            animation.num_float_tracks(),
        );
        let count = pose
            .num_transform_tracks()
            .min(animation.num_transform_tracks());
        blend_poses(
            count,
            &sampled.transforms,
            &mut pose.transforms,
            self.blend_factor(),
        );

        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use animation_replacer_core::{
        animation_clip::{AnimationClip, Keyframes},
        character::{AnimationLibrary, Character},
        id::{CharacterId, ClipGeneratorId},
        pose::Pose,
    };
    use bevy::transform::components::Transform;

    use super::*;

    fn character() -> Character {
        let still = |x: f32| {
            AnimationClip::new(format!("still_{x}"), 1.)
                .with_transform_track(Keyframes::constant(Transform::from_xyz(x, 0., 0.)))
        };
        let mut library = AnimationLibrary::new();
        library
            .add_animation("from.hkx", Some(Arc::new(still(0.))), 10)
            .unwrap();
        library
            .add_animation("to.hkx", Some(Arc::new(still(10.))), 10)
            .unwrap();
        Character::new(CharacterId(1), Arc::new(library))
    }

    fn live_output() -> GeneratorOutput {
        GeneratorOutput::with_pose(Pose::new(vec![Transform::from_xyz(10., 0., 0.)], vec![], 0.))
    }

    fn x(output: &GeneratorOutput) -> f32 {
        output.pose.as_ref().unwrap().transforms[0].translation.x
    }

    #[test]
    fn start_takes_over_the_animation_control() {
        let character = character();
        let mut live = ClipGenerator::new(ClipGeneratorId(1), 0);
        live.activate(&character);

        let mut blend = BlendController::new();
        blend.start(&mut live, 0.5, 2.);
        assert!(live.animation_control.is_none());
        assert!(blend.shadow().unwrap().animation().is_some());
        assert!(blend.is_blending());
    }

    #[test]
    fn blend_moves_from_shadow_to_live_and_terminates() {
        let character = character();
        let mut live = ClipGenerator::new(ClipGeneratorId(1), 0);
        live.activate(&character);

        let mut blend = BlendController::new();
        blend.start(&mut live, 1., 0.);

        let mut output = live_output();
        assert!(blend.apply(&mut output));
        assert_eq!(x(&output), 0.);

        blend.advance(0.5);
        let mut output = live_output();
        assert!(blend.apply(&mut output));
        assert!((x(&output) - 5.).abs() < 1e-4);

        blend.advance(1.0);
        let mut output = live_output();
        assert!(!blend.apply(&mut output));
        assert_eq!(x(&output), 10.);
        assert!(blend.shadow().is_none());

        blend.advance(1.5);
        assert!(!blend.apply(&mut live_output()));
    }

    #[test]
    fn shadow_keeps_playing_from_the_live_local_time() {
        let ramp = AnimationClip::new("ramp", 1.).with_transform_track(Keyframes::new(vec![
            (0., Transform::from_xyz(0., 0., 0.)),
            (1., Transform::from_xyz(100., 0., 0.)),
        ]));
        let mut library = AnimationLibrary::new();
        library
            .add_animation("ramp.hkx", Some(Arc::new(ramp)), 10)
            .unwrap();
        let character = Character::new(CharacterId(1), Arc::new(library));
        let mut live = ClipGenerator::new(ClipGeneratorId(1), 0);
        live.activate(&character);
        live.update(0.2);

        let mut blend = BlendController::new();
        blend.start(&mut live, 1., 1.);
        assert!((blend.shadow().unwrap().local_time - 0.2).abs() < 1e-5);

        blend.advance(1.3);
        assert!((blend.shadow().unwrap().local_time - 0.5).abs() < 1e-5);

        let f = blend.blend_factor();
        let mut output = live_output();
        assert!(blend.apply(&mut output));
        let expected = 50. + (10. - 50.) * f;
        assert!((x(&output) - expected).abs() < 1e-3, "{} != {expected}", x(&output));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut blend = BlendController::new();
        blend.stop();
        blend.stop();
        assert!(!blend.is_blending());
        assert_eq!(blend.duration(), 0.);
    }

    #[test]
    fn time_going_backwards_does_not_rewind_the_blend() {
        let character = character();
        let mut live = ClipGenerator::new(ClipGeneratorId(1), 0);
        live.activate(&character);

        let mut blend = BlendController::new();
        blend.start(&mut live, 1., 5.);
        blend.advance(5.5);
        blend.advance(4.);
        assert_eq!(blend.elapsed(), 0.5);
    }

    #[test]
    fn outputs_without_a_pose_are_left_alone() {
        let character = character();
        let mut live = ClipGenerator::new(ClipGeneratorId(1), 0);
        live.activate(&character);

        let mut blend = BlendController::new();
        blend.start(&mut live, 1., 0.);
        let mut output = GeneratorOutput::default();
        assert!(!blend.apply(&mut output));
        assert!(blend.is_blending());
    }
}

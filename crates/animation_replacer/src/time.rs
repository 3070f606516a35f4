use bevy::{prelude::*, reflect::std_traits::ReflectDefault};

/// Something that knows the current game time, in seconds.
pub trait GameTime {
    fn game_time(&self) -> f32;
}

impl GameTime for f32 {
    fn game_time(&self) -> f32 {
        *self
    }
}

/// Monotonic game time, advanced once per frame. Blends measure their progress against this
/// rather than against per-callback deltas, so several callbacks touching the same blend in
/// one frame do not make it drift.
#[derive(Resource, Reflect, Clone, Copy, Debug, Default, PartialEq)]
#[reflect(Resource, Default)]
pub struct FrameClock {
    game_time: f32,
}

impl FrameClock {
    pub fn new(game_time: f32) -> Self {
        Self { game_time }
    }

    /// Negative deltas are ignored.
    pub fn advance(&mut self, delta: f32) {
        self.game_time += delta.max(0.);
    }
}

impl GameTime for FrameClock {
    fn game_time(&self) -> f32 {
        self.game_time
    }
}

pub fn advance_frame_clock(time: Res<Time>, mut clock: ResMut<FrameClock>) {
    clock.advance(time.delta_secs());
}

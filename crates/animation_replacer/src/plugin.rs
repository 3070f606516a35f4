use animation_replacer_core::{
    pose::Pose,
    settings::{AnimationLogMode, AnimationLogSettings, ReplacerSettings},
};
use bevy::prelude::*;

use crate::time::{FrameClock, advance_frame_clock};

/// Keeps the [`FrameClock`] running and makes the replacer settings available to the app.
#[derive(Default)]
pub struct AnimationReplacerPlugin {
    pub settings: ReplacerSettings,
}

impl Plugin for AnimationReplacerPlugin {
    fn build(&self, app: &mut App) {
        self.register_types(app);
        app //
            .init_resource::<FrameClock>()
            .insert_resource(self.settings.clone())
            .add_systems(PreUpdate, advance_frame_clock);
    }
}

impl AnimationReplacerPlugin {
    fn register_types(&self, app: &mut App) {
        app //
            .register_type::<FrameClock>()
            .register_type::<ReplacerSettings>()
            .register_type::<AnimationLogSettings>()
            .register_type::<AnimationLogMode>()
            .register_type::<Pose>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_inserts_clock_and_settings() {
        let mut settings = ReplacerSettings::default();
        settings.blend_time_on_loop = 0.75;

        let mut app = App::new();
        app.add_plugins(AnimationReplacerPlugin { settings });

        assert!(app.world().contains_resource::<FrameClock>());
        assert_eq!(
            app.world().resource::<ReplacerSettings>().blend_time_on_loop,
            0.75
        );
    }
}

use std::path::Path;

use bevy::{
    log::{info, warn},
    prelude::Resource,
    reflect::prelude::*,
};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

use crate::errors::ReplacerResult;

/// Decides which clip events make it into the animation log.
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[reflect(Default)]
pub enum AnimationLogMode {
    /// Only clips that are currently playing a replacement.
    #[default]
    ReplacementOnly,
    /// Clips that have any replacement candidates, replaced or not.
    PotentialReplacement,
    All,
}

#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct AnimationLogSettings {
    pub enabled: bool,
    pub max_entries: usize,
    pub activate_mode: AnimationLogMode,
    pub echo_mode: AnimationLogMode,
    pub loop_mode: AnimationLogMode,
    /// Mirror every log entry to the text log.
    pub write_to_text_log: bool,
}

impl Default for AnimationLogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 10,
            activate_mode: AnimationLogMode::ReplacementOnly,
            echo_mode: AnimationLogMode::ReplacementOnly,
            loop_mode: AnimationLogMode::ReplacementOnly,
            write_to_text_log: false,
        }
    }
}

#[derive(Resource, Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct ReplacerSettings {
    /// Blend time used when an interruptible animation switches replacement mid-play.
    pub blend_time_on_interrupt: f32,
    /// Blend time used when a looping animation switches replacement on loop.
    pub blend_time_on_loop: f32,
    pub animation_limit: u16,
    pub increase_animation_limit: bool,
    /// Keep random condition results across loops for animations without any replacement
    /// configuration.
    pub legacy_keep_random_results_by_default: bool,
    pub animation_log: AnimationLogSettings,
}

impl Default for ReplacerSettings {
    fn default() -> Self {
        Self {
            blend_time_on_interrupt: 0.3,
            blend_time_on_loop: 0.3,
            animation_limit: Self::MAX_ANIMATION_LIMIT_DEFAULT,
            increase_animation_limit: false,
            legacy_keep_random_results_by_default: false,
            animation_log: AnimationLogSettings::default(),
        }
    }
}

impl ReplacerSettings {
    pub const MAX_ANIMATION_LIMIT_DEFAULT: u16 = 0x7FFF;
    pub const MAX_ANIMATION_LIMIT_INCREASED: u16 = 0xFFFF;

    pub fn from_ron_str(source: &str) -> ReplacerResult<Self> {
        let mut settings: Self = ron::from_str(source)?;
        settings.clamp_animation_limit();
        Ok(settings)
    }

    pub fn to_ron_string(&self) -> ReplacerResult<String> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    pub fn max_animation_limit(&self) -> u16 {
        if self.increase_animation_limit {
            Self::MAX_ANIMATION_LIMIT_INCREASED
        } else {
            Self::MAX_ANIMATION_LIMIT_DEFAULT
        }
    }

    pub fn clamp_animation_limit(&mut self) {
        let max = self.max_animation_limit();
        if self.animation_limit > max {
            warn!(
                "Animation limit {} exceeds the maximum of {max}, clamping",
                self.animation_limit
            );
            self.animation_limit = max;
        }
    }

    /// Reads settings from `path`. A missing file is created with default values.
    pub fn read_or_create(path: impl AsRef<Path>) -> ReplacerResult<Self> {
        let path = path.as_ref();
        info!("Reading settings from {:?}", path);

        if path.exists() {
            let source = std::fs::read_to_string(path)?;
            let settings = Self::from_ron_str(&source)?;
            info!("...success");
            Ok(settings)
        } else {
            info!("...settings not found, creating a new file");
            let settings = Self::default();
            settings.write(path)?;
            Ok(settings)
        }
    }

    pub fn write(&self, path: impl AsRef<Path>) -> ReplacerResult<()> {
        let path = path.as_ref();
        info!("Writing settings to {:?}", path);
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}

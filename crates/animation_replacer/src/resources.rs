use std::{fmt, sync::Arc};

use animation_replacer_core::settings::ReplacerSettings;

use crate::{
    animation_log::{AnimationLog, AnimationLogSink},
    provider::ReplacementProvider,
    submod::SubModRegistry,
};

/// Everything an [`ActiveClip`](crate::active_clip::ActiveClip) consults while making its
/// decisions. Shared by every active clip of a session.
pub struct ReplacerResources {
    pub settings: ReplacerSettings,
    pub provider: Arc<dyn ReplacementProvider>,
    pub animation_log: Arc<dyn AnimationLogSink>,
    pub submods: SubModRegistry,
}

impl ReplacerResources {
    /// Uses an [`AnimationLog`] configured from `settings`.
    pub fn new(settings: ReplacerSettings, provider: impl ReplacementProvider + 'static) -> Self {
        let animation_log = Arc::new(AnimationLog::new(settings.animation_log.clone()));
        Self {
            settings,
            provider: Arc::new(provider),
            animation_log,
            submods: SubModRegistry::default(),
        }
    }

    pub fn with_animation_log(mut self, animation_log: Arc<dyn AnimationLogSink>) -> Self {
        self.animation_log = animation_log;
        self
    }

    pub fn with_submods(mut self, submods: SubModRegistry) -> Self {
        self.submods = submods;
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for ReplacerResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplacerResources")
            .field("settings", &self.settings)
            .field("submods", &self.submods)
            .finish_non_exhaustive()
    }
}

use std::{
    collections::VecDeque,
    fmt,
    sync::{PoisonError, RwLock},
};

use animation_replacer_core::{
    character::Character,
    id::BindingIndex,
    settings::{AnimationLogMode, AnimationLogSettings},
};
use bevy::log::info;

use crate::active_clip::ActiveClip;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationLogEvent {
    Activate,
    ActivateReplace,
    ActivateSynchronized,
    Echo,
    EchoReplace,
    Loop,
    LoopReplace,
    Interrupt,
}

impl AnimationLogEvent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Activate => "Activated",
            Self::ActivateReplace => "Activated (replaced)",
            Self::ActivateSynchronized => "Activated (synchronized)",
            Self::Echo => "Echoed",
            Self::EchoReplace => "Echoed (replaced)",
            Self::Loop => "Looped",
            Self::LoopReplace => "Looped (replaced)",
            Self::Interrupt => "Interrupted",
        }
    }

    /// Which configured mode filters this event.
    pub fn mode(&self, settings: &AnimationLogSettings) -> AnimationLogMode {
        match self {
            Self::Activate | Self::ActivateReplace | Self::ActivateSynchronized | Self::Interrupt => {
                settings.activate_mode
            }
            Self::Echo | Self::EchoReplace => settings.echo_mode,
            Self::Loop | Self::LoopReplace => settings.loop_mode,
        }
    }
}

impl fmt::Display for AnimationLogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationLogEntry {
    pub event: AnimationLogEvent,
    pub character_name: String,
    pub clip_name: String,
    pub original_index: BindingIndex,
    pub original_animation: String,
    pub current_index: BindingIndex,
    pub current_animation: String,
    pub replacement_name: Option<String>,
}

impl AnimationLogEntry {
    pub fn new(event: AnimationLogEvent, active_clip: &ActiveClip, character: &Character) -> Self {
        let library = &character.library;
        Self {
            event,
            character_name: character.name.clone(),
            clip_name: active_clip.clip_name().to_owned(),
            original_index: active_clip.original_index(),
            original_animation: library
                .animation_name(active_clip.original_index())
                .to_owned(),
            current_index: active_clip.current_index(),
            current_animation: library.animation_name(active_clip.current_index()).to_owned(),
            replacement_name: active_clip
                .current_replacement()
                .map(|replacement| replacement.name.clone()),
        }
    }
}

impl fmt::Display for AnimationLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - clip \"{}\": {}",
            self.event, self.character_name, self.clip_name, self.original_animation
        )?;
        if let Some(replacement) = &self.replacement_name {
            write!(f, " -> {} ({})", self.current_animation, replacement)?;
        }
        Ok(())
    }
}

/// Receives clip events worth logging. Logging is best effort and must never get in the
/// way of a swap.
pub trait AnimationLogSink: Send + Sync {
    fn should_log_animations(&self) -> bool;

    fn should_log_animations_for_active_clip(
        &self,
        active_clip: &ActiveClip,
        event: AnimationLogEvent,
    ) -> bool;

    fn log_animation(
        &self,
        event: AnimationLogEvent,
        active_clip: &ActiveClip,
        character: &Character,
    );
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAnimationLog;

impl AnimationLogSink for NoAnimationLog {
    fn should_log_animations(&self) -> bool {
        false
    }

    fn should_log_animations_for_active_clip(&self, _: &ActiveClip, _: AnimationLogEvent) -> bool {
        false
    }

    fn log_animation(&self, _: AnimationLogEvent, _: &ActiveClip, _: &Character) {}
}

/// The most recent clip events, oldest first. Readable from any thread, e.g. by a UI.
#[derive(Debug, Default)]
pub struct AnimationLog {
    settings: AnimationLogSettings,
    entries: RwLock<VecDeque<AnimationLogEntry>>,
}

impl AnimationLog {
    pub fn new(settings: AnimationLogSettings) -> Self {
        let capacity = settings.max_entries.min(64);
        Self {
            settings,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn settings(&self) -> &AnimationLogSettings {
        &self.settings
    }

    pub fn entries(&self) -> Vec<AnimationLogEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn push(&self, entry: AnimationLogEntry) {
        if self.settings.write_to_text_log {
            info!("{entry}");
        }

        let max_entries = self.settings.max_entries;
        if max_entries == 0 {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

impl AnimationLogSink for AnimationLog {
    fn should_log_animations(&self) -> bool {
        self.settings.enabled
    }

    fn should_log_animations_for_active_clip(
        &self,
        active_clip: &ActiveClip,
        event: AnimationLogEvent,
    ) -> bool {
        match event.mode(&self.settings) {
            AnimationLogMode::ReplacementOnly => active_clip.has_replacement_animation(),
            AnimationLogMode::PotentialReplacement => active_clip.has_replacements(),
            AnimationLogMode::All => true,
        }
    }

    fn log_animation(
        &self,
        event: AnimationLogEvent,
        active_clip: &ActiveClip,
        character: &Character,
    ) {
        self.push(AnimationLogEntry::new(event, active_clip, character));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(clip_name: &str) -> AnimationLogEntry {
        AnimationLogEntry {
            event: AnimationLogEvent::Loop,
            character_name: "Lydia".into(),
            clip_name: clip_name.into(),
            original_index: 1,
            original_animation: "walk.hkx".into(),
            current_index: 1,
            current_animation: "walk.hkx".into(),
            replacement_name: None,
        }
    }

    #[test]
    fn log_keeps_only_the_newest_entries() {
        let log = AnimationLog::new(AnimationLogSettings {
            enabled: true,
            max_entries: 2,
            ..Default::default()
        });
        log.push(entry("a"));
        log.push(entry("b"));
        log.push(entry("c"));

        let names: Vec<_> = log.entries().into_iter().map(|e| e.clip_name).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn zero_capacity_log_stays_empty() {
        let log = AnimationLog::new(AnimationLogSettings {
            max_entries: 0,
            ..Default::default()
        });
        log.push(entry("a"));
        assert!(log.is_empty());
    }

    #[test]
    fn events_map_to_their_modes() {
        let settings = AnimationLogSettings {
            activate_mode: AnimationLogMode::All,
            echo_mode: AnimationLogMode::PotentialReplacement,
            loop_mode: AnimationLogMode::ReplacementOnly,
            ..Default::default()
        };
        assert_eq!(AnimationLogEvent::Interrupt.mode(&settings), AnimationLogMode::All);
        assert_eq!(
            AnimationLogEvent::EchoReplace.mode(&settings),
            AnimationLogMode::PotentialReplacement
        );
        assert_eq!(
            AnimationLogEvent::LoopReplace.mode(&settings),
            AnimationLogMode::ReplacementOnly
        );
    }

    #[test]
    fn entry_display_mentions_replacement() {
        let mut entry = entry("Attack");
        assert_eq!(entry.to_string(), "Looped - Lydia - clip \"Attack\": walk.hkx");
        entry.replacement_name = Some("Sneaky walk".into());
        entry.current_animation = "sneak.hkx".into();
        assert_eq!(
            entry.to_string(),
            "Looped - Lydia - clip \"Attack\": walk.hkx -> sneak.hkx (Sneaky walk)"
        );
    }
}

use std::sync::Arc;

use animation_replacer_core::{
    character::Character,
    clip_generator::ClipGenerator,
    id::{BindingIndex, CharacterId},
};
use bevy::platform::collections::HashMap;

use crate::{
    active_clip::ActiveClip, replacement::ReplacementAnimation,
    replacements::AnimationReplacements,
};

/// Maps original animations to their replacement candidates. Called on the animation update
/// path, so every method must be cheap enough to run every frame.
pub trait ReplacementProvider: Send + Sync {
    fn get_replacements(
        &self,
        character: &Character,
        original_index: BindingIndex,
    ) -> Option<Arc<AnimationReplacements>>;

    /// Evaluates the candidates for `original_index` against whatever owns `character`.
    fn get_replacement_animation(
        &self,
        character: &Character,
        clip_generator: &ClipGenerator,
        original_index: BindingIndex,
        active_clip: &ActiveClip,
    ) -> Option<Arc<ReplacementAnimation>> {
        self.get_replacements(character, original_index)?
            .evaluate_conditions_and_get_replacement_animation(
                character.resolve_world_object(),
                clip_generator,
                active_clip,
            )
    }

    fn is_original_animation_interruptible(
        &self,
        character: &Character,
        original_index: BindingIndex,
    ) -> bool {
        self.get_replacements(character, original_index)
            .is_some_and(|replacements| replacements.original_interruptible)
    }

    fn should_original_animation_replace_on_echo(
        &self,
        character: &Character,
        original_index: BindingIndex,
    ) -> bool {
        self.get_replacements(character, original_index)
            .is_some_and(|replacements| replacements.original_replace_on_echo)
    }

    /// `default` applies to animations without any replacement configuration.
    fn should_original_animation_keep_random_results_on_loop(
        &self,
        character: &Character,
        original_index: BindingIndex,
        default: bool,
    ) -> bool {
        self.get_replacements(character, original_index)
            .map_or(default, |replacements| {
                replacements.original_keep_random_results_on_loop
            })
    }
}

/// In-memory [`ReplacementProvider`], keyed by character and original binding index.
#[derive(Debug, Default)]
pub struct ReplacementCatalog {
    entries: HashMap<(CharacterId, BindingIndex), Arc<AnimationReplacements>>,
}

impl ReplacementCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, character: CharacterId, replacements: AnimationReplacements) {
        self.entries.insert(
            (character, replacements.original_index),
            Arc::new(replacements),
        );
    }

    pub fn with(mut self, character: CharacterId, replacements: AnimationReplacements) -> Self {
        self.insert(character, replacements);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReplacementProvider for ReplacementCatalog {
    fn get_replacements(
        &self,
        character: &Character,
        original_index: BindingIndex,
    ) -> Option<Arc<AnimationReplacements>> {
        self.entries.get(&(character.id, original_index)).cloned()
    }
}

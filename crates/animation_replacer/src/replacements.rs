use std::sync::Arc;

use animation_replacer_core::{
    character::WorldObject, clip_generator::ClipGenerator, id::BindingIndex,
};

use crate::{
    active_clip::ActiveClip,
    conditions::{ConditionContext, ConditionSet},
    replacement::ReplacementAnimation,
};

/// A replacement animation together with the conditions that select it.
#[derive(Clone, Debug)]
pub struct ReplacementCandidate {
    pub priority: i32,
    pub conditions: ConditionSet,
    pub animation: Arc<ReplacementAnimation>,
}

/// Every candidate configured for one original animation, highest priority first.
#[derive(Clone, Debug, Default)]
pub struct AnimationReplacements {
    pub original_index: BindingIndex,
    candidates: Vec<ReplacementCandidate>,
    /// Behavior of the original animation itself, while no replacement is playing.
    pub original_interruptible: bool,
    pub original_replace_on_echo: bool,
    pub original_keep_random_results_on_loop: bool,
}

impl AnimationReplacements {
    pub fn new(original_index: BindingIndex) -> Self {
        Self {
            original_index,
            ..Default::default()
        }
    }

    /// Adds a candidate. Among equal priorities the one added first wins.
    pub fn add(
        &mut self,
        priority: i32,
        conditions: ConditionSet,
        animation: Arc<ReplacementAnimation>,
    ) {
        let position = self
            .candidates
            .partition_point(|candidate| candidate.priority >= priority);
        self.candidates.insert(
            position,
            ReplacementCandidate {
                priority,
                conditions,
                animation,
            },
        );
    }

    pub fn with(
        mut self,
        priority: i32,
        conditions: ConditionSet,
        animation: Arc<ReplacementAnimation>,
    ) -> Self {
        self.add(priority, conditions, animation);
        self
    }

    pub fn candidates(&self) -> &[ReplacementCandidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The highest-priority candidate whose conditions hold, if any.
    pub fn evaluate_conditions_and_get_replacement_animation(
        &self,
        refr: Option<&WorldObject>,
        clip_generator: &ClipGenerator,
        active_clip: &ActiveClip,
    ) -> Option<Arc<ReplacementAnimation>> {
        let ctx = ConditionContext {
            refr,
            clip_generator,
            active_clip,
        };
        self.candidates
            .iter()
            .find(|candidate| candidate.conditions.evaluate(&ctx))
            .map(|candidate| candidate.animation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_are_kept_in_priority_order() {
        let low = ReplacementAnimation::new("low", 1).into_shared();
        let high = ReplacementAnimation::new("high", 2).into_shared();
        let also_high = ReplacementAnimation::new("also_high", 3).into_shared();

        let replacements = AnimationReplacements::new(0)
            .with(0, ConditionSet::new(), low)
            .with(10, ConditionSet::new(), high)
            .with(10, ConditionSet::new(), also_high);

        let names: Vec<_> = replacements
            .candidates()
            .iter()
            .map(|candidate| candidate.animation.name.as_str())
            .collect();
        assert_eq!(names, vec!["high", "also_high", "low"]);
    }
}

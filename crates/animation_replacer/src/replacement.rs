use std::sync::Arc;

use animation_replacer_core::id::{BindingIndex, ReplacementId, SubModId};
use serde::{Deserialize, Serialize};

use crate::active_clip::ActiveClip;

/// One alternative binding of a replacement animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub index: BindingIndex,
    pub name: String,
    /// Relative chance of being picked. Non-positive weights are never picked.
    pub weight: f32,
    pub disabled: bool,
}

impl Variant {
    pub fn new(index: BindingIndex, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            weight: 1.,
            disabled: false,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    fn effective_weight(&self) -> f32 {
        if self.disabled { 0. } else { self.weight.max(0.) }
    }
}

/// Behavioral settings of a replacement animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplacementFlags {
    /// Conditions are re-checked every update while this animation plays.
    pub interruptible: bool,
    pub replace_on_loop: bool,
    pub replace_on_echo: bool,
    pub keep_random_results_on_loop: bool,
    /// Clear the clip generator's "don't convert annotations to triggers" flag.
    pub ignore_dont_convert_annotations_to_triggers_flag: bool,
    /// Only keep triggers that come from annotations in the animation file.
    pub triggers_from_annotations_only: bool,
}

impl Default for ReplacementFlags {
    fn default() -> Self {
        Self {
            interruptible: false,
            replace_on_loop: true,
            replace_on_echo: false,
            keep_random_results_on_loop: false,
            ignore_dont_convert_annotations_to_triggers_flag: false,
            triggers_from_annotations_only: false,
        }
    }
}

/// A configured alternative for an original animation. Owned by the replacement
/// configuration and shared by reference with every clip currently playing it.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplacementAnimation {
    pub id: ReplacementId,
    pub name: String,
    /// Binding used when there are no variants.
    pub index: BindingIndex,
    pub variants: Vec<Variant>,
    pub flags: ReplacementFlags,
    pub parent_submod: Option<SubModId>,
}

impl ReplacementAnimation {
    pub fn new(name: impl Into<String>, index: BindingIndex) -> Self {
        Self {
            id: ReplacementId::new_random(),
            name: name.into(),
            index,
            variants: Vec::new(),
            flags: ReplacementFlags::default(),
            parent_submod: None,
        }
    }

    pub fn with_variants(mut self, variants: Vec<Variant>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_flags(mut self, flags: ReplacementFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_submod(mut self, submod: SubModId) -> Self {
        self.parent_submod = Some(submod);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn has_variants(&self) -> bool {
        self.variants
            .iter()
            .filter(|variant| variant.effective_weight() > 0.)
            .nth(1)
            .is_some()
    }

    pub fn get_ignore_dont_convert_annotations_to_triggers_flag(&self) -> bool {
        self.flags.ignore_dont_convert_annotations_to_triggers_flag
    }

    pub fn get_triggers_from_annotations_only(&self) -> bool {
        self.flags.triggers_from_annotations_only
    }

    /// Resolves the binding index to use for `active_clip`. With variants, one is picked at
    /// random by weight using the clip's variant roll.
    pub fn get_index(&self, active_clip: &ActiveClip) -> BindingIndex {
        if self.variants.is_empty() {
            return self.index;
        }

        let roll = active_clip.get_variant_random(self);
        self.pick_variant(roll).unwrap_or(self.index)
    }

    /// Maps a roll in `[0, 1]` onto the weighted variants.
    pub fn pick_variant(&self, roll: f32) -> Option<BindingIndex> {
        let total: f32 = self.variants.iter().map(Variant::effective_weight).sum();
        if total <= 0. {
            return None;
        }

        let mut target = roll.clamp(0., 1.) * total;
        let mut last_enabled = None;
        for variant in &self.variants {
            let weight = variant.effective_weight();
            if weight <= 0. {
                continue;
            }
            last_enabled = Some(variant.index);
            if target < weight {
                return Some(variant.index);
            }
            target -= weight;
        }

        last_enabled
    }
}

/// Whether two optional replacements are the same configured object.
pub fn same_replacement(
    a: Option<&Arc<ReplacementAnimation>>,
    b: Option<&Arc<ReplacementAnimation>>,
) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_variants() -> ReplacementAnimation {
        ReplacementAnimation::new("attack", 20).with_variants(vec![
            Variant::new(20, "attack_a"),
            Variant::new(21, "attack_b").with_weight(2.),
            Variant::new(22, "attack_c"),
        ])
    }

    #[test]
    fn weighted_pick_covers_every_variant() {
        let replacement = three_variants();
        assert_eq!(replacement.pick_variant(0.), Some(20));
        assert_eq!(replacement.pick_variant(0.3), Some(21));
        assert_eq!(replacement.pick_variant(0.6), Some(21));
        assert_eq!(replacement.pick_variant(0.8), Some(22));
        assert_eq!(replacement.pick_variant(1.), Some(22));
    }

    #[test]
    fn disabled_variants_are_never_picked() {
        let mut replacement = three_variants();
        replacement.variants[1].disabled = true;
        replacement.variants[2].disabled = true;
        assert!(!replacement.has_variants());
        assert_eq!(replacement.pick_variant(0.9), Some(20));
    }

    #[test]
    fn identity_is_by_reference() {
        let a = ReplacementAnimation::new("a", 1).into_shared();
        let a_clone = Arc::new((*a).clone());
        assert!(same_replacement(Some(&a), Some(&a)));
        assert!(!same_replacement(Some(&a), Some(&a_clone)));
        assert!(!same_replacement(Some(&a), None));
        assert!(same_replacement(None, None));
    }
}

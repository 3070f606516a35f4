use std::sync::Arc;

use animation_replacer_core::id::BindingIndex;

use crate::replacement::{ReplacementAnimation, same_replacement};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplaceDecision {
    Keep,
    /// Switch to the candidate, which may be no replacement at all.
    Replace,
    /// Stay on the current replacement but bind another of its variants.
    ReplaceWithVariant(BindingIndex),
}

impl ReplaceDecision {
    pub fn should_replace(&self) -> bool {
        !matches!(self, Self::Keep)
    }

    pub fn variant_index(&self) -> Option<BindingIndex> {
        match self {
            Self::ReplaceWithVariant(index) => Some(*index),
            _ => None,
        }
    }
}

/// Decides whether `candidate` should take over from `current`.
///
/// A different candidate (including none) always replaces. The same replacement only
/// replaces when `try_variant` is set and `resolve_index` picks a different variant than
/// `current_index`; `resolve_index` is not called otherwise.
pub fn should_replace(
    current: Option<&Arc<ReplacementAnimation>>,
    candidate: Option<&Arc<ReplacementAnimation>>,
    try_variant: bool,
    current_index: BindingIndex,
    resolve_index: impl FnOnce(&ReplacementAnimation) -> BindingIndex,
) -> ReplaceDecision {
    if !same_replacement(current, candidate) {
        return ReplaceDecision::Replace;
    }

    if try_variant && let Some(current) = current {
        let new_index = resolve_index(current);
        if current.has_variants() && new_index != current_index {
            return ReplaceDecision::ReplaceWithVariant(new_index);
        }
    }

    ReplaceDecision::Keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacement::Variant;

    fn with_variants() -> Arc<ReplacementAnimation> {
        ReplacementAnimation::new("swing", 30)
            .with_variants(vec![
                Variant::new(30, "swing_a"),
                Variant::new(31, "swing_b"),
                Variant::new(32, "swing_c"),
            ])
            .into_shared()
    }

    #[test]
    fn same_replacement_without_variant_try_is_kept() {
        let current = with_variants();
        let decision = should_replace(Some(&current), Some(&current), false, 30, |_| {
            panic!("variants are not rolled unless asked for")
        });
        assert_eq!(decision, ReplaceDecision::Keep);
        assert_eq!(should_replace(None, None, true, 5, |_| 0), ReplaceDecision::Keep);
    }

    #[test]
    fn different_candidate_always_replaces() {
        let current = with_variants();
        let other = ReplacementAnimation::new("other", 40).into_shared();
        for try_variant in [false, true] {
            assert_eq!(
                should_replace(Some(&current), Some(&other), try_variant, 30, |_| 30),
                ReplaceDecision::Replace
            );
            assert_eq!(
                should_replace(Some(&current), None, try_variant, 30, |_| 30),
                ReplaceDecision::Replace
            );
            assert_eq!(
                should_replace(None, Some(&other), try_variant, 5, |_| 40),
                ReplaceDecision::Replace
            );
        }
    }

    #[test]
    fn variant_try_replaces_only_on_a_new_index() {
        let current = with_variants();
        assert_eq!(
            should_replace(Some(&current), Some(&current), true, 30, |_| 32),
            ReplaceDecision::ReplaceWithVariant(32)
        );
        assert_eq!(
            should_replace(Some(&current), Some(&current), true, 30, |_| 30),
            ReplaceDecision::Keep
        );
    }

    #[test]
    fn variant_try_without_variants_is_kept() {
        let current = ReplacementAnimation::new("single", 10).into_shared();
        assert_eq!(
            should_replace(Some(&current), Some(&current), true, 5, |r| r.index),
            ReplaceDecision::Keep
        );
    }
}

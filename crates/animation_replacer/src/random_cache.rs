use std::sync::{PoisonError, RwLock};

use animation_replacer_core::id::ConditionId;
use bevy::platform::collections::HashMap;
use rand::{Rng, distr::Uniform};

/// Rolls a uniform value in `[min, max]`. Ranges that cannot be sampled (empty, infinite or
/// too wide for `f32`) return `min`.
pub fn random_float(min: f32, max: f32) -> f32 {
    if min == max {
        return min;
    }
    match Uniform::new_inclusive(min, max) {
        Ok(distr) => rand::rng().sample(distr),
        Err(_) => min,
    }
}

/// Rolled values of random condition components, kept for as long as the owner wants the
/// same component to keep producing the same value.
///
/// Reads and writes may come from different threads (graph update, UI, logging).
#[derive(Debug, Default)]
pub struct RandomResultCache {
    values: RwLock<HashMap<ConditionId, f32>>,
}

impl RandomResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ConditionId) -> Option<f32> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    /// Returns the cached value for `id`, rolling and caching one in `[min, max]` on a miss.
    ///
    /// Two threads missing at the same time both roll, and the later insert wins. Either
    /// value is a valid roll.
    pub fn get_or_roll(&self, id: ConditionId, min: f32, max: f32) -> f32 {
        if let Some(value) = self.get(id) {
            return value;
        }

        let value = random_float(min, max);
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, value);
        value
    }

    pub fn clear(&self) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents, for display.
    pub fn snapshot(&self) -> Vec<(ConditionId, f32)> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, value)| (*id, *value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn repeated_rolls_are_stable_until_cleared() {
        let cache = RandomResultCache::new();
        let id = ConditionId::new_random();

        let first = cache.get_or_roll(id, 0., 100.);
        assert!((0. ..=100.).contains(&first));
        for _ in 0..10 {
            assert_eq!(cache.get_or_roll(id, 0., 100.), first);
        }

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(id), None);
    }

    #[test]
    fn components_roll_independently() {
        let cache = RandomResultCache::new();
        let a = ConditionId::new_random();
        let b = ConditionId::new_random();
        cache.get_or_roll(a, 0., 1.);
        cache.get_or_roll(b, 5., 5.);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(b), Some(5.));
    }

    #[test]
    fn degenerate_range_returns_min() {
        assert_eq!(random_float(3., 3.), 3.);
        assert_eq!(random_float(4., 1.), 4.);
    }

    #[test]
    fn unsampleable_range_returns_min() {
        assert_eq!(random_float(f32::MIN, f32::MAX), f32::MIN);
        assert_eq!(random_float(0., f32::INFINITY), 0.);
        assert_eq!(random_float(f32::NEG_INFINITY, 1.), f32::NEG_INFINITY);
        assert!(random_float(f32::NAN, 1.).is_nan());
    }

    #[test]
    fn concurrent_readers_agree_after_first_roll() {
        let cache = Arc::new(RandomResultCache::new());
        let id = ConditionId::new_random();
        let rolled = cache.get_or_roll(id, 0., 1.);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || cache.get_or_roll(id, 0., 1.))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), rolled);
        }
    }
}

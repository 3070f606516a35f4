use std::sync::{PoisonError, RwLock};

use animation_replacer_core::id::{BehaviorGraphId, ConditionId, SubModId};
use bevy::platform::collections::HashMap;

use crate::random_cache::random_float;

/// Random values shared by every clip of one behavior graph that belongs to the same
/// submod, so that several clips can agree on a single draw.
#[derive(Debug, Default)]
pub struct SharedRandomStore {
    condition_results: RwLock<HashMap<(BehaviorGraphId, ConditionId), f32>>,
    variant_results: RwLock<HashMap<BehaviorGraphId, f32>>,
}

impl SharedRandomStore {
    pub fn get_shared_random(
        &self,
        behavior_graph: BehaviorGraphId,
        component: ConditionId,
        min: f32,
        max: f32,
    ) -> f32 {
        let key = (behavior_graph, component);
        if let Some(value) = self
            .condition_results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return *value;
        }

        *self
            .condition_results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| random_float(min, max))
    }

    pub fn get_variant_random(&self, behavior_graph: BehaviorGraphId) -> f32 {
        if let Some(value) = self
            .variant_results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&behavior_graph)
        {
            return *value;
        }

        *self
            .variant_results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(behavior_graph)
            .or_insert_with(|| random_float(0., 1.))
    }

    /// Forgets every shared result rolled for `behavior_graph`.
    pub fn clear(&self, behavior_graph: BehaviorGraphId) {
        self.condition_results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(graph, _), _| *graph != behavior_graph);
        self.variant_results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&behavior_graph);
    }
}

/// A configuration group of replacement animations. Replacements and random condition
/// components refer back to their submod by id.
#[derive(Debug, Default)]
pub struct SubMod {
    pub id: SubModId,
    pub name: String,
    pub share_random_results: bool,
    shared_random: SharedRandomStore,
}

impl SubMod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubModId::new_random(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn sharing_random_results(mut self, share: bool) -> Self {
        self.share_random_results = share;
        self
    }

    pub fn is_sharing_random_results(&self) -> bool {
        self.share_random_results
    }

    pub fn shared_random(&self) -> &SharedRandomStore {
        &self.shared_random
    }
}

/// Owns every submod, keyed by id.
#[derive(Debug, Default)]
pub struct SubModRegistry {
    submods: HashMap<SubModId, SubMod>,
}

impl SubModRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, submod: SubMod) -> SubModId {
        let id = submod.id;
        self.submods.insert(id, submod);
        id
    }

    pub fn get(&self, id: SubModId) -> Option<&SubMod> {
        self.submods.get(&id)
    }

    /// The submod `id` refers to, if it shares random results.
    pub fn sharing(&self, id: Option<SubModId>) -> Option<&SubMod> {
        id.and_then(|id| self.get(id))
            .filter(|submod| submod.is_sharing_random_results())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_results_are_per_behavior_graph() {
        let store = SharedRandomStore::default();
        let component = ConditionId::new_random();
        let (graph_a, graph_b) = (BehaviorGraphId(1), BehaviorGraphId(2));

        let a = store.get_shared_random(graph_a, component, 0., 1.);
        assert_eq!(store.get_shared_random(graph_a, component, 0., 1.), a);
        let b = store.get_shared_random(graph_b, component, 10., 10.);
        assert_eq!(b, 10.);

        store.clear(graph_b);
        assert_eq!(store.get_shared_random(graph_a, component, 0., 1.), a);
        assert_eq!(store.get_shared_random(graph_b, component, 20., 20.), 20.);
    }

    #[test]
    fn variant_random_is_stable_until_cleared() {
        let store = SharedRandomStore::default();
        let graph = BehaviorGraphId(3);
        let value = store.get_variant_random(graph);
        assert!((0. ..=1.).contains(&value));
        assert_eq!(store.get_variant_random(graph), value);
    }

    #[test]
    fn registry_only_reports_sharing_submods() {
        let mut registry = SubModRegistry::new();
        let sharing = registry.insert(SubMod::new("sharing").sharing_random_results(true));
        let private = registry.insert(SubMod::new("private"));

        assert!(registry.sharing(Some(sharing)).is_some());
        assert!(registry.sharing(Some(private)).is_none());
        assert!(registry.sharing(None).is_none());
    }
}

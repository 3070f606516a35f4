use std::{fmt, sync::Arc};

use animation_replacer_core::{
    character::WorldObject,
    clip_generator::ClipGenerator,
    id::{ConditionId, SubModId},
};

use crate::active_clip::ActiveClip;

/// Everything a condition may look at.
#[derive(Clone, Copy)]
pub struct ConditionContext<'a> {
    /// Object the animation graph belongs to, if it could be resolved.
    pub refr: Option<&'a WorldObject>,
    pub clip_generator: &'a ClipGenerator,
    pub active_clip: &'a ActiveClip,
}

/// A predicate over a playing clip. Evaluated on the animation update path, possibly on
/// several threads at once.
pub trait Condition: fmt::Debug + Send + Sync {
    fn evaluate(&self, ctx: &ConditionContext) -> bool;
}

/// All-of a list of conditions. An empty set is always true.
#[derive(Clone, Debug, Default)]
pub struct ConditionSet {
    conditions: Vec<Arc<dyn Condition>>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: impl Condition + 'static) -> Self {
        self.conditions.push(Arc::new(condition));
        self
    }

    pub fn push(&mut self, condition: Arc<dyn Condition>) {
        self.conditions.push(condition);
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn evaluate(&self, ctx: &ConditionContext) -> bool {
        self.conditions.iter().all(|condition| condition.evaluate(ctx))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstCondition(pub bool);

impl Condition for ConstCondition {
    fn evaluate(&self, _: &ConditionContext) -> bool {
        self.0
    }
}

/// Identity and range of a random-valued condition input. The rolled value is remembered
/// per active clip, or per behavior graph when `submod` shares random results.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomComponent {
    pub id: ConditionId,
    pub min: f32,
    pub max: f32,
    pub submod: Option<SubModId>,
}

impl RandomComponent {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            id: ConditionId::new_random(),
            min,
            max,
            submod: None,
        }
    }

    pub fn in_submod(mut self, submod: SubModId) -> Self {
        self.submod = Some(submod);
        self
    }
}

/// True when the clip's roll for `component` is below `threshold`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomCondition {
    pub component: RandomComponent,
    pub threshold: f32,
}

impl RandomCondition {
    /// A condition that passes roughly `chance` of the time, `chance` being in `[0, 1]`.
    pub fn chance(chance: f32) -> Self {
        Self {
            component: RandomComponent::new(0., 1.),
            threshold: chance,
        }
    }
}

impl Condition for RandomCondition {
    fn evaluate(&self, ctx: &ConditionContext) -> bool {
        ctx.active_clip.get_random_float(&self.component) < self.threshold
    }
}

type ConditionFn = dyn Fn(&ConditionContext) -> bool + Send + Sync;

/// A condition backed by a closure.
#[derive(Clone)]
pub struct FnCondition {
    name: String,
    predicate: Arc<ConditionFn>,
}

impl FnCondition {
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&ConditionContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for FnCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnCondition").field(&self.name).finish()
    }
}

impl Condition for FnCondition {
    fn evaluate(&self, ctx: &ConditionContext) -> bool {
        (self.predicate)(ctx)
    }
}

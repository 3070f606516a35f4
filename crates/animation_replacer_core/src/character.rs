use std::sync::Arc;

use bevy::reflect::prelude::*;

use crate::{
    animation_clip::AnimationClip,
    errors::{ReplacerError, ReplacerResult, abort_too_many_animations},
    id::{BindingIndex, CharacterId, WorldObjectId},
};

/// A world object conditions are evaluated against (an actor, a piece of furniture, an
/// animated weapon, ...).
#[derive(Reflect, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldObject {
    pub id: WorldObjectId,
    pub name: String,
}

impl WorldObject {
    pub fn new(id: impl Into<WorldObjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Node of a character's scene graph. Nodes may be tagged with the world object that owns
/// them.
#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: String,
    pub owner: Option<WorldObject>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, owner: WorldObject) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search for the first node tagged with an owner.
    pub fn find_owner(&self) -> Option<&WorldObject> {
        self.owner
            .as_ref()
            .or_else(|| self.children.iter().find_map(|child| child.find_owner()))
    }
}

/// Per-character table of animations, indexed by [`BindingIndex`].
#[derive(Clone, Debug, Default)]
pub struct AnimationLibrary {
    names: Vec<String>,
    clips: Vec<Option<Arc<AnimationClip>>>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Appends an animation and returns its binding index. Fails once `limit` animations
    /// are registered.
    pub fn add_animation(
        &mut self,
        name: impl Into<String>,
        clip: Option<Arc<AnimationClip>>,
        limit: u16,
    ) -> ReplacerResult<BindingIndex> {
        let index = self.names.len();
        if index >= limit as usize {
            return Err(ReplacerError::TooManyAnimations { limit });
        }

        self.names.push(name.into());
        self.clips.push(clip);
        Ok(index as BindingIndex)
    }

    /// Same as [`Self::add_animation`], but running out of indices is fatal.
    pub fn add_animation_or_abort(
        &mut self,
        name: impl Into<String>,
        clip: Option<Arc<AnimationClip>>,
        limit: u16,
    ) -> BindingIndex {
        match self.add_animation(name, clip, limit) {
            Ok(index) => index,
            Err(_) => abort_too_many_animations(limit),
        }
    }

    /// Name of the animation at `index`, or an empty string when out of range.
    pub fn animation_name(&self, index: BindingIndex) -> &str {
        self.names
            .get(index as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn clip(&self, index: BindingIndex) -> Option<&Arc<AnimationClip>> {
        self.clips.get(index as usize).and_then(Option::as_ref)
    }
}

/// The animated character a behavior graph runs on.
#[derive(Clone, Debug, Default)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Object holding the animation graph. Absent for detached graphs such as animated
    /// weapons.
    pub holder: Option<WorldObject>,
    pub skeleton_root: Option<SceneNode>,
    pub library: Arc<AnimationLibrary>,
}

impl Character {
    pub fn new(id: impl Into<CharacterId>, library: Arc<AnimationLibrary>) -> Self {
        Self {
            id: id.into(),
            library,
            ..Default::default()
        }
    }

    /// The object conditions should be evaluated against: the graph holder if there is one,
    /// otherwise whatever owns the skeleton.
    pub fn resolve_world_object(&self) -> Option<&WorldObject> {
        self.holder
            .as_ref()
            .or_else(|| self.skeleton_root.as_ref().and_then(SceneNode::find_owner))
    }
}

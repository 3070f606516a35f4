use animation_replacer_proc_macros::UuidWrapper;
use bevy::reflect::{Reflect, std_traits::ReflectDefault};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Index of an entry in a character's animation library. This is what a clip generator
/// binds to, and what replacing an animation ultimately rewrites.
pub type BindingIndex = u16;

/// Identifies a submod: a configuration group of replacement animations and their
/// conditions.
#[derive(
    UuidWrapper, Clone, Copy, Debug, Reflect, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[reflect(Default)]
pub struct SubModId(#[uuid] pub(crate) Uuid);

#[derive(
    UuidWrapper, Clone, Copy, Debug, Reflect, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[reflect(Default)]
pub struct ReplacementId(#[uuid] pub(crate) Uuid);

/// Identity of a random-valued condition component. Rolled values are cached per
/// component.
#[derive(
    UuidWrapper, Clone, Copy, Debug, Reflect, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[reflect(Default)]
pub struct ConditionId(#[uuid] pub(crate) Uuid);

macro_rules! engine_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
            Deserialize,
        )]
        #[reflect(Default)]
        pub struct $name(pub u64);

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

engine_handle!(
    /// Handle of an engine-owned clip generator node.
    ClipGeneratorId
);
engine_handle!(
    /// Handle of an engine-owned animated character.
    CharacterId
);
engine_handle!(
    /// Handle of an engine-owned behavior graph instance.
    BehaviorGraphId
);
engine_handle!(
    /// Handle of a world object (the thing conditions are evaluated against).
    WorldObjectId
);

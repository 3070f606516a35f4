use std::sync::{Arc, Weak};

use animation_replacer_core::{
    character::Character,
    clip_generator::{ClipFlags, ClipGenerator, PlaybackMode},
    id::{BehaviorGraphId, BindingIndex, CharacterId, ClipGeneratorId},
    pose::GeneratorOutput,
    trigger::ClipTriggerArray,
};
use bevy::log::{debug, warn};

use crate::{
    animation_log::AnimationLogEvent,
    blend::BlendController,
    conditions::RandomComponent,
    decision::{ReplaceDecision, should_replace},
    destroyed_callbacks::DestroyedCallbackRegistry,
    random_cache::{RandomResultCache, random_float},
    replacement::ReplacementAnimation,
    replacements::AnimationReplacements,
    resources::ReplacerResources,
    time::GameTime,
};

/// Engine state handed to every clip callback.
#[derive(Clone, Copy)]
pub struct HookContext<'a> {
    pub character: &'a Character,
    pub behavior_graph: BehaviorGraphId,
    /// Monotonic game time in seconds, see [`FrameClock`](crate::time::FrameClock).
    pub game_time: f32,
}

impl<'a> HookContext<'a> {
    pub fn new(
        character: &'a Character,
        behavior_graph: impl Into<BehaviorGraphId>,
        clock: &impl GameTime,
    ) -> Self {
        Self {
            character,
            behavior_graph: behavior_graph.into(),
            game_time: clock.game_time(),
        }
    }
}

/// The clip generator state an [`ActiveClip`] puts back when it goes away.
#[derive(Clone, Debug, PartialEq)]
pub struct OriginalClipState {
    pub index: BindingIndex,
    pub mode: PlaybackMode,
    pub flags: ClipFlags,
    pub triggers: Option<Arc<ClipTriggerArray>>,
    pub interruptible: bool,
    pub replace_on_echo: bool,
    pub keep_random_results_on_loop: bool,
}

/// A swap waiting for the next pre-update.
#[derive(Clone, Debug)]
pub struct QueuedReplacement {
    /// `None` swaps back to the original animation.
    pub replacement: Option<Arc<ReplacementAnimation>>,
    pub blend_time: f32,
    pub event: AnimationLogEvent,
    pub variant_index: Option<BindingIndex>,
}

pub type DestroyedCallback = dyn Fn(&ActiveClip) + Send + Sync;

/// Replacement state of one clip generator, for as long as the engine keeps it active.
///
/// The clip generator and character stay owned by the engine and are borrowed for the
/// duration of each callback. Every callback checks it was handed the clip generator this
/// state was created for and does nothing otherwise.
///
/// Call [`ActiveClip::destroy`] when the engine deactivates the generator, so that its
/// original state is put back.
#[derive(Debug)]
pub struct ActiveClip {
    resources: Arc<ReplacerResources>,
    clip_generator: ClipGeneratorId,
    clip_name: String,
    character: CharacterId,
    behavior_graph: BehaviorGraphId,
    original: OriginalClipState,
    replacements: Option<Arc<AnimationReplacements>>,
    current_replacement: Option<Arc<ReplacementAnimation>>,
    current_index: BindingIndex,
    queued: Option<QueuedReplacement>,
    random_floats: RandomResultCache,
    blend: BlendController,
    transitioning: bool,
    destroyed_callbacks: DestroyedCallbackRegistry<ActiveClip>,
    destroyed: bool,
}

impl ActiveClip {
    /// Snapshots the state of `clip_generator` before anything is replaced.
    pub fn new(
        clip_generator: &ClipGenerator,
        ctx: &HookContext,
        resources: Arc<ReplacerResources>,
    ) -> Self {
        let index = clip_generator.animation_binding_index;
        let provider = &resources.provider;
        let original = OriginalClipState {
            index,
            mode: clip_generator.mode,
            flags: clip_generator.flags,
            triggers: clip_generator.original_triggers.clone(),
            interruptible: provider.is_original_animation_interruptible(ctx.character, index),
            replace_on_echo: provider
                .should_original_animation_replace_on_echo(ctx.character, index),
            keep_random_results_on_loop: provider
                .should_original_animation_keep_random_results_on_loop(
                    ctx.character,
                    index,
                    resources.settings.legacy_keep_random_results_by_default,
                ),
        };
        let replacements = provider.get_replacements(ctx.character, index);

        Self {
            clip_generator: clip_generator.id,
            clip_name: clip_generator.name.clone(),
            character: ctx.character.id,
            behavior_graph: ctx.behavior_graph,
            original,
            replacements,
            current_replacement: None,
            current_index: index,
            queued: None,
            random_floats: RandomResultCache::new(),
            blend: BlendController::new(),
            transitioning: false,
            destroyed_callbacks: DestroyedCallbackRegistry::default(),
            destroyed: false,
            resources,
        }
    }

    pub fn clip_generator_id(&self) -> ClipGeneratorId {
        self.clip_generator
    }

    pub fn clip_name(&self) -> &str {
        &self.clip_name
    }

    pub fn character_id(&self) -> CharacterId {
        self.character
    }

    pub fn behavior_graph(&self) -> BehaviorGraphId {
        self.behavior_graph
    }

    pub fn resources(&self) -> &Arc<ReplacerResources> {
        &self.resources
    }

    pub fn original(&self) -> &OriginalClipState {
        &self.original
    }

    pub fn original_index(&self) -> BindingIndex {
        self.original.index
    }

    /// Binding index the clip generator currently plays.
    pub fn current_index(&self) -> BindingIndex {
        self.current_index
    }

    pub fn current_replacement(&self) -> Option<&Arc<ReplacementAnimation>> {
        self.current_replacement.as_ref()
    }

    pub fn has_replacement_animation(&self) -> bool {
        self.current_replacement.is_some()
    }

    pub fn replacements(&self) -> Option<&Arc<AnimationReplacements>> {
        self.replacements.as_ref()
    }

    /// Whether the original animation has any replacement candidates at all.
    pub fn has_replacements(&self) -> bool {
        self.replacements.is_some()
    }

    pub fn queued_replacement(&self) -> Option<&QueuedReplacement> {
        self.queued.as_ref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn blend(&self) -> &BlendController {
        &self.blend
    }

    pub fn is_blending(&self) -> bool {
        self.blend.is_blending()
    }

    pub fn random_floats(&self) -> &RandomResultCache {
        &self.random_floats
    }

    pub fn is_interruptible(&self) -> bool {
        self.current_replacement
            .as_ref()
            .map_or(self.original.interruptible, |replacement| {
                replacement.flags.interruptible
            })
    }

    pub fn should_replace_on_echo(&self) -> bool {
        self.current_replacement
            .as_ref()
            .map_or(self.original.replace_on_echo, |replacement| {
                replacement.flags.replace_on_echo
            })
    }

    pub fn should_replace_on_loop(&self) -> bool {
        self.current_replacement
            .as_ref()
            .is_none_or(|replacement| replacement.flags.replace_on_loop)
    }

    pub fn should_keep_random_results_on_loop(&self) -> bool {
        self.current_replacement
            .as_ref()
            .map_or(self.original.keep_random_results_on_loop, |replacement| {
                replacement.flags.keep_random_results_on_loop
            })
    }

    fn is_bound_to(&self, clip_generator: &ClipGenerator, callback: &str) -> bool {
        if clip_generator.id != self.clip_generator {
            warn!(
                "{callback} called on clip generator {:?} for the active clip of {:?}, ignoring",
                clip_generator.id, self.clip_generator
            );
            return false;
        }
        true
    }

    /// See [`should_replace`]. Variants are resolved for this clip.
    pub fn should_replace_animation(
        &self,
        candidate: Option<&Arc<ReplacementAnimation>>,
        try_variant: bool,
    ) -> ReplaceDecision {
        should_replace(
            self.current_replacement.as_ref(),
            candidate,
            try_variant,
            self.current_index,
            |replacement| replacement.get_index(self),
        )
    }

    /// Binds `replacement` to `clip_generator`, or puts the original animation back when it
    /// is `None`. Whatever was bound before is always restored first.
    pub fn replace_animation(
        &mut self,
        clip_generator: &mut ClipGenerator,
        replacement: Option<Arc<ReplacementAnimation>>,
        variant_index: Option<BindingIndex>,
    ) {
        self.restore_original_animation(clip_generator);

        let Some(replacement) = replacement else {
            return;
        };

        let index = variant_index.unwrap_or_else(|| replacement.get_index(self));
        clip_generator.animation_binding_index = index;
        if replacement.get_ignore_dont_convert_annotations_to_triggers_flag() {
            clip_generator
                .flags
                .remove(ClipFlags::DONT_CONVERT_ANNOTATIONS_TO_TRIGGERS);
        }
        self.current_index = index;
        self.current_replacement = Some(replacement);
    }

    /// Puts the snapshot taken at construction back into `clip_generator`.
    pub fn restore_original_animation(&mut self, clip_generator: &mut ClipGenerator) {
        clip_generator.animation_binding_index = self.original.index;
        clip_generator.mode = self.original.mode;
        clip_generator.flags = self.original.flags;
        clip_generator.original_triggers = self.original.triggers.clone();
        if clip_generator.is_active() {
            clip_generator.triggers = self.original.triggers.clone();
        }
        self.current_index = self.original.index;
        self.current_replacement = None;
    }

    /// Replaces any previously queued swap.
    pub fn queue_replacement_animation(
        &mut self,
        replacement: Option<Arc<ReplacementAnimation>>,
        blend_time: f32,
        event: AnimationLogEvent,
        variant_index: Option<BindingIndex>,
    ) {
        self.queued = Some(QueuedReplacement {
            replacement,
            blend_time,
            event,
            variant_index,
        });
    }

    pub fn pop_queued_replacement_animation(&mut self) -> Option<QueuedReplacement> {
        self.queued.take()
    }

    /// Swaps the animation of a playing clip generator to the queued replacement: blend
    /// out of the current pose if asked to, then deactivate, rebind and reactivate.
    pub fn replace_active_animation(
        &mut self,
        clip_generator: &mut ClipGenerator,
        ctx: &HookContext,
    ) {
        let Some(queued) = self.pop_queued_replacement_animation() else {
            return;
        };

        if queued.blend_time > 0. {
            self.blend
                .start(clip_generator, queued.blend_time, ctx.game_time);
        }

        self.transitioning = true;
        clip_generator.deactivate();

        let previous_index = clip_generator.animation_binding_index;
        self.replace_animation(clip_generator, queued.replacement, queued.variant_index);
        debug!(
            "{} clip \"{}\": animation {} -> {} (original {})",
            queued.event,
            self.clip_name,
            previous_index,
            clip_generator.animation_binding_index,
            self.original.index
        );

        self.log_event(queued.event, ctx.character);

        self.activate(clip_generator, ctx);
        self.transitioning = false;
    }

    /// The engine's activation of `clip_generator` with this state's hooks around it.
    pub fn activate(&mut self, clip_generator: &mut ClipGenerator, ctx: &HookContext) {
        self.on_activate(clip_generator, ctx);
        clip_generator.activate(ctx.character);
        self.on_post_activate(clip_generator, ctx);
    }

    fn log_event(&self, event: AnimationLogEvent, character: &Character) {
        let animation_log = &self.resources.animation_log;
        if animation_log.should_log_animations()
            && animation_log.should_log_animations_for_active_clip(self, event)
        {
            animation_log.log_animation(event, self, character);
        }
    }

    pub fn pre_update(
        &mut self,
        clip_generator: &mut ClipGenerator,
        ctx: &HookContext,
        _timestep: f32,
    ) {
        if !self.is_bound_to(clip_generator, "pre_update") {
            return;
        }

        if self.queued.is_none() && self.is_interruptible() {
            let candidate = self.resources.provider.get_replacement_animation(
                ctx.character,
                clip_generator,
                self.original.index,
                self,
            );
            // keep the current variant, interrupts only react to condition changes
            if self
                .should_replace_animation(candidate.as_ref(), false)
                .should_replace()
            {
                let blend_time = self.resources.settings.blend_time_on_interrupt;
                self.queue_replacement_animation(
                    candidate,
                    blend_time,
                    AnimationLogEvent::Interrupt,
                    None,
                );
            }
        }

        if self.queued.is_some() {
            self.replace_active_animation(clip_generator, ctx);
        }
    }

    pub fn pre_generate(&mut self, clip_generator: &ClipGenerator, ctx: &HookContext) {
        if !self.is_bound_to(clip_generator, "pre_generate") {
            return;
        }
        self.blend.advance(ctx.game_time);
    }

    /// Picks the initial replacement. Skipped while transitioning and for synchronized
    /// clips, which are bound through [`Self::on_activate_synchronized`].
    pub fn on_activate(&mut self, clip_generator: &mut ClipGenerator, ctx: &HookContext) {
        if !self.is_bound_to(clip_generator, "on_activate")
            || self.transitioning
            || clip_generator.synchronized
        {
            return;
        }

        let Some(replacements) = self
            .resources
            .provider
            .get_replacements(ctx.character, self.original.index)
        else {
            self.log_event(AnimationLogEvent::Activate, ctx.character);
            return;
        };
        self.replacements = Some(replacements.clone());

        let replacement = replacements.evaluate_conditions_and_get_replacement_animation(
            ctx.character.resolve_world_object(),
            clip_generator,
            self,
        );
        let event = if replacement.is_some() {
            self.replace_animation(clip_generator, replacement, None);
            debug!(
                "Activated clip \"{}\": animation {} -> {}",
                self.clip_name, self.original.index, self.current_index
            );
            AnimationLogEvent::ActivateReplace
        } else {
            AnimationLogEvent::Activate
        };
        self.log_event(event, ctx.character);
    }

    /// Drops non-annotation triggers when the bound replacement asks for it. Trigger arrays
    /// may be shared, so filtered copies replace them.
    pub fn on_post_activate(&mut self, clip_generator: &mut ClipGenerator, _ctx: &HookContext) {
        if !self.is_bound_to(clip_generator, "on_post_activate") {
            return;
        }

        let annotations_only = self
            .current_replacement
            .as_ref()
            .is_some_and(|replacement| replacement.get_triggers_from_annotations_only());
        if !annotations_only {
            return;
        }

        for triggers in [
            &mut clip_generator.original_triggers,
            &mut clip_generator.triggers,
        ] {
            if let Some(array) = triggers.as_ref()
                && !array.is_empty()
            {
                *triggers = Some(Arc::new(array.annotations_only()));
            }
        }
    }

    /// Binds a replacement the paired-animation path has already chosen.
    pub fn on_activate_synchronized(
        &mut self,
        clip_generator: &mut ClipGenerator,
        ctx: &HookContext,
        replacements: Option<Arc<AnimationReplacements>>,
        replacement: Option<Arc<ReplacementAnimation>>,
        variant_index: Option<BindingIndex>,
    ) {
        if !self.is_bound_to(clip_generator, "on_activate_synchronized") {
            return;
        }

        self.replacements = replacements;
        self.replace_animation(clip_generator, replacement, variant_index);
        self.log_event(AnimationLogEvent::ActivateSynchronized, ctx.character);
    }

    /// Blends the shadow pose into `output` while a blend is in progress.
    pub fn on_generate(
        &mut self,
        clip_generator: &ClipGenerator,
        _ctx: &HookContext,
        output: &mut GeneratorOutput,
    ) {
        if !self.is_bound_to(clip_generator, "on_generate") {
            return;
        }
        self.blend.apply(output);
    }

    /// Returns `true` when a swap was queued, in which case the engine's own echo handling
    /// should be skipped.
    pub fn on_echo(
        &mut self,
        clip_generator: &ClipGenerator,
        ctx: &HookContext,
        echo_duration: f32,
    ) -> bool {
        if !self.is_bound_to(clip_generator, "on_echo") {
            return false;
        }

        if self.should_replace_on_echo() {
            self.on_cycle(clip_generator, ctx, echo_duration, AnimationLogEvent::EchoReplace)
        } else {
            self.reroll_unless_kept();
            self.log_event(AnimationLogEvent::Echo, ctx.character);
            false
        }
    }

    /// Returns `true` when a swap was queued.
    pub fn on_loop(&mut self, clip_generator: &ClipGenerator, ctx: &HookContext) -> bool {
        if !self.is_bound_to(clip_generator, "on_loop") {
            return false;
        }

        if self.should_replace_on_loop() {
            let blend_time = self.resources.settings.blend_time_on_loop;
            self.on_cycle(clip_generator, ctx, blend_time, AnimationLogEvent::LoopReplace)
        } else {
            self.reroll_unless_kept();
            self.log_event(AnimationLogEvent::Loop, ctx.character);
            false
        }
    }

    fn reroll_unless_kept(&self) {
        if !self.should_keep_random_results_on_loop() {
            self.clear_random_floats();
        }
    }

    /// Shared by echo and loop: reroll, re-evaluate, and queue a swap if the outcome changed.
    fn on_cycle(
        &mut self,
        clip_generator: &ClipGenerator,
        ctx: &HookContext,
        blend_time: f32,
        event: AnimationLogEvent,
    ) -> bool {
        let keep_random = self.should_keep_random_results_on_loop();
        if !keep_random {
            self.clear_random_floats();
        }

        let candidate = self.resources.provider.get_replacement_animation(
            ctx.character,
            clip_generator,
            self.original.index,
            self,
        );
        let decision = self.should_replace_animation(candidate.as_ref(), !keep_random);
        if decision.should_replace() {
            self.queue_replacement_animation(
                candidate,
                blend_time,
                event,
                decision.variant_index(),
            );
            return true;
        }

        let unchanged = match event {
            AnimationLogEvent::EchoReplace => AnimationLogEvent::Echo,
            _ => AnimationLogEvent::Loop,
        };
        self.log_event(unchanged, ctx.character);
        false
    }

    /// Roll of a random condition component for this clip. Components of a submod that
    /// shares random results get the roll shared by the whole behavior graph instead.
    ///
    /// Concurrent misses on the same component may both roll; the value last written is
    /// the one kept.
    pub fn get_random_float(&self, component: &RandomComponent) -> f32 {
        if let Some(submod) = self.resources.submods.sharing(component.submod) {
            return submod.shared_random().get_shared_random(
                self.behavior_graph,
                component.id,
                component.min,
                component.max,
            );
        }

        self.random_floats
            .get_or_roll(component.id, component.min, component.max)
    }

    /// Roll used to pick one of `replacement`'s variants.
    pub fn get_variant_random(&self, replacement: &ReplacementAnimation) -> f32 {
        match self.resources.submods.sharing(replacement.parent_submod) {
            Some(submod) => submod
                .shared_random()
                .get_variant_random(self.behavior_graph),
            None => random_float(0., 1.),
        }
    }

    /// Forgets every roll, including the shared rolls of the current replacement's submod.
    pub fn clear_random_floats(&self) {
        if let Some(submod) = self.current_replacement.as_ref().and_then(|replacement| {
            self.resources.submods.sharing(replacement.parent_submod)
        }) {
            submod.shared_random().clear(self.behavior_graph);
        }

        self.random_floats.clear();
    }

    /// `callback` is called once, right before this clip's state is torn down. Only a weak
    /// reference is kept.
    pub fn register_destroyed_callback(&self, callback: Weak<DestroyedCallback>) {
        self.destroyed_callbacks.register(callback);
    }

    /// Tears down the replacement state: subscribers are told first, while the final
    /// replacement can still be inspected, then `clip_generator` gets its original state back.
    pub fn destroy(mut self, clip_generator: &mut ClipGenerator) {
        self.destroyed = true;
        self.destroyed_callbacks.notify_all(&self);

        self.blend.stop();
        self.queued = None;
        if self.is_bound_to(clip_generator, "destroy") {
            self.restore_original_animation(clip_generator);
        }
    }
}

impl Drop for ActiveClip {
    fn drop(&mut self) {
        if self.destroyed {
            return;
        }

        warn!(
            "Active clip \"{}\" dropped without being destroyed, its clip generator keeps \
             animation {} instead of {}",
            self.clip_name, self.current_index, self.original.index
        );
        self.destroyed_callbacks.notify_all(&*self);
    }
}

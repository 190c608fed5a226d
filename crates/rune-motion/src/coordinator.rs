//! Transition coordinator.
//!
//! A [`Motion`] is one mounted instance of a named element. On mount it
//! either announces itself (nothing to animate from yet) or claims the
//! snapshot a previous instance left behind and runs the collected effects:
//! every `before_animate` concurrently, then each block's `animate` calls
//! concurrently with a barrier between blocks, then the `after_animate`
//! cleanups. Once the blocks are done the instance becomes visible and stores
//! its own snapshot, so a later instance can chain from it.
//!
//! # Usage
//!
//! ```ignore
//! use rune_motion::{ElementRegistry, Motion, MotionContext, MotionOutcome};
//!
//! let context = MotionContext::new(ElementRegistry::new());
//!
//! let list_item = Motion::new("card-1", context.clone(), &list_tree);
//! list_item.mount().await;          // Announced
//! list_item.unmount();
//!
//! let detail = Motion::new("card-1", context, &detail_tree);
//! match detail.mount().await {
//!     MotionOutcome::Settled(report) => assert!(report.is_clean()),
//!     other => println!("{other:?}"),
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use rune_config::MotionConfig;
use serde::{Deserialize, Serialize};

use crate::collector::{Collected, MotionNode, MotionTarget, collect};
use crate::effects::{ConcealMove, EffectOptions, MotionData, TargetData};
use crate::error::{MotionError, Result};
use crate::events::{MotionEvent, MotionListener};
use crate::geometry::{FixedScroll, ScrollSource, capture_bounding_box};
use crate::plan::ExecutionPlan;
use crate::registry::{ElementRegistry, ElementSnapshot};
use crate::style::MotionStyle;

/// Grace period before an unclaimed snapshot is evicted.
pub const DEFAULT_EVICTION_GRACE: Duration = Duration::from_millis(50);

/// Shared services and defaults handed to every [`Motion`].
#[derive(Clone)]
pub struct MotionContext {
    pub registry: ElementRegistry,
    pub scroll: Arc<dyn ScrollSource>,
    pub listener: Option<Arc<dyn MotionListener>>,
    pub eviction_grace: Duration,
    /// Whether an instance with no partner shows itself right away.
    pub visible_when_announced: bool,
    /// Options new effects should start from.
    pub defaults: EffectOptions,
    /// Length of closing fades such as the one ending a `ConcealMove`.
    pub settle_delay_ms: f64,
}

impl MotionContext {
    pub fn new(registry: ElementRegistry) -> Self {
        Self {
            registry,
            scroll: Arc::new(FixedScroll::default()),
            listener: None,
            eviction_grace: DEFAULT_EVICTION_GRACE,
            visible_when_announced: true,
            defaults: EffectOptions::default(),
            settle_delay_ms: 100.0,
        }
    }

    /// Build a context from the `[motion]` section of `rune.toml`.
    pub fn from_config(registry: ElementRegistry, config: &MotionConfig) -> Result<Self> {
        Ok(Self {
            eviction_grace: Duration::from_millis(config.eviction_grace_ms),
            visible_when_announced: config.visible_when_announced,
            defaults: EffectOptions::from_config(config)?,
            settle_delay_ms: config.settle_delay_ms as f64,
            ..Self::new(registry)
        })
    }

    pub fn with_scroll(mut self, scroll: Arc<dyn ScrollSource>) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn MotionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn with_eviction_grace(mut self, grace: Duration) -> Self {
        self.eviction_grace = grace;
        self
    }

    pub fn with_visible_when_announced(mut self, visible: bool) -> Self {
        self.visible_when_announced = visible;
        self
    }

    /// Effect options seeded from config, for building effect trees.
    pub fn options(&self) -> EffectOptions {
        self.defaults.clone()
    }

    /// A [`ConcealMove`] with the configured options and closing fade.
    pub fn conceal_move(&self) -> ConcealMove {
        ConcealMove::new(self.options()).with_fade_out(self.settle_delay_ms)
    }

    fn emit(&self, event: MotionEvent) {
        if let Some(listener) = &self.listener {
            listener.on_event(&event);
        }
    }
}

impl fmt::Debug for MotionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionContext")
            .field("registry", &self.registry)
            .field("eviction_grace", &self.eviction_grace)
            .field("visible_when_announced", &self.visible_when_announced)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// Where a named instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    #[default]
    Idle,
    /// Snapshot stored, waiting for a partner.
    Announced,
    /// Running a claimed snapshot's phases.
    Executing,
    /// Phases done and a fresh snapshot stored.
    Settled,
}

/// The three phases of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    BeforeAnimate,
    Animate,
    AfterAnimate,
}

/// An effect phase that failed. Other phases were not affected.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseFailure {
    pub effect: &'static str,
    pub phase: Phase,
    pub error: MotionError,
}

/// What happened while a claimed snapshot was animated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitionReport {
    pub name: String,
    pub block_count: usize,
    pub blocks_completed: usize,
    pub failures: Vec<PhaseFailure>,
    /// Set when the instance unmounted before the transition settled.
    pub cancelled: Option<MotionError>,
}

impl TransitionReport {
    fn new(name: &str, block_count: usize) -> Self {
        Self {
            name: name.to_string(),
            block_count,
            ..Self::default()
        }
    }

    fn record(&mut self, effect: &'static str, phase: Phase, error: MotionError) {
        tracing::warn!(name = %self.name, effect, ?phase, error = %error, "effect phase failed");
        self.failures.push(PhaseFailure { effect, phase, error });
    }

    fn abandon(mut self) -> MotionOutcome {
        tracing::debug!(name = %self.name, blocks_completed = self.blocks_completed, "transition abandoned");
        self.cancelled = Some(MotionError::Cancelled(self.name.clone()));
        MotionOutcome::Abandoned(self)
    }

    /// True when no phase failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of the effects that failed in any phase.
    pub fn failed_effects(&self) -> Vec<&'static str> {
        self.failures.iter().map(|failure| failure.effect).collect()
    }
}

/// Result of driving a [`Motion`].
#[derive(Debug, Clone, PartialEq)]
pub enum MotionOutcome {
    /// No partner snapshot existed; this instance stored its own.
    Announced,
    /// Nothing to animate; the snapshot was refreshed if possible.
    Updated,
    /// A snapshot was claimed and every block ran.
    Settled(TransitionReport),
    /// The instance unmounted before the blocks finished.
    Abandoned(TransitionReport),
}

impl MotionOutcome {
    pub fn report(&self) -> Option<&TransitionReport> {
        match self {
            Self::Settled(report) | Self::Abandoned(report) => Some(report),
            Self::Announced | Self::Updated => None,
        }
    }
}

#[derive(Debug, Default)]
struct InstanceState {
    transition: TransitionState,
    visible: bool,
    unmounting: bool,
    /// Generation of the last snapshot this instance stored.
    stored_generation: Option<u64>,
    trigger_key: Option<String>,
}

struct MotionInner {
    name: String,
    context: MotionContext,
    collected: Mutex<Collected>,
    state: Mutex<InstanceState>,
}

/// One mounted instance of a named element.
///
/// Clones refer to the same instance.
#[derive(Clone)]
pub struct Motion {
    inner: Arc<MotionInner>,
}

impl fmt::Debug for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Motion")
            .field("name", &self.inner.name)
            .field("state", &*self.inner.state.lock())
            .finish_non_exhaustive()
    }
}

impl Motion {
    /// Create an instance for `name` configured by `tree`.
    ///
    /// Configuration errors in `tree` are logged and kept in
    /// [`diagnostics`](Self::diagnostics); they only abort the affected
    /// effect once it runs.
    pub fn new(name: impl Into<String>, context: MotionContext, tree: &MotionNode) -> Self {
        let name = name.into();
        let collected = collect(&name, tree);
        Self {
            inner: Arc::new(MotionInner {
                name,
                context,
                collected: Mutex::new(collected),
                state: Mutex::new(InstanceState::default()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn state(&self) -> TransitionState {
        self.inner.state.lock().transition
    }

    pub fn is_visible(&self) -> bool {
        self.inner.state.lock().visible
    }

    pub fn is_unmounting(&self) -> bool {
        self.inner.state.lock().unmounting
    }

    /// Style the host applies to this instance's own element.
    pub fn style(&self) -> MotionStyle {
        if self.is_visible() {
            MotionStyle::shown()
        } else {
            MotionStyle::hidden()
        }
    }

    /// Configuration errors found when the tree was collected.
    pub fn diagnostics(&self) -> Vec<MotionError> {
        self.inner.collected.lock().diagnostics.clone()
    }

    /// Replace the motion configuration, e.g. after the host re-rendered it.
    pub fn reconfigure(&self, tree: &MotionNode) {
        *self.inner.collected.lock() = collect(&self.inner.name, tree);
    }

    /// Called once the instance's element is in place.
    ///
    /// Claims a waiting snapshot and animates from it, or announces this
    /// instance when there is none. Resolves once every block has run.
    pub async fn mount(&self) -> MotionOutcome {
        if self.state() != TransitionState::Idle {
            tracing::warn!(name = %self.inner.name, "mount called on a mounted motion");
            self.update();
            return MotionOutcome::Updated;
        }
        if self.is_unmounting() {
            tracing::debug!(name = %self.inner.name, "mount after unmount ignored");
            return MotionOutcome::Updated;
        }

        match self.inner.context.registry.claim(&self.inner.name) {
            Some(origin) => self.execute(origin).await,
            None => {
                self.announce();
                MotionOutcome::Announced
            }
        }
    }

    /// Called after the host re-rendered the element. Refreshes the stored
    /// snapshot and returns whether one was stored.
    pub fn update(&self) -> bool {
        if self.state() == TransitionState::Idle {
            return false;
        }
        self.store().is_some()
    }

    /// Called when the element is about to be removed.
    ///
    /// Stops all further snapshot writes and state changes from this
    /// instance and schedules eviction of its snapshot, unless another
    /// instance has stored over it since.
    pub fn unmount(&self) {
        let generation = {
            let mut state = self.inner.state.lock();
            if state.unmounting {
                return;
            }
            state.unmounting = true;
            state.stored_generation
        };
        tracing::debug!(name = %self.inner.name, "motion unmounting");

        if let Some(generation) = generation {
            let context = &self.inner.context;
            context
                .registry
                .schedule_eviction_of(&self.inner.name, generation, context.eviction_grace);
        }
    }

    /// Animate this instance from its own last snapshot when `key` changes.
    ///
    /// The first key only gets recorded. With an unchanged key, or while a
    /// transition is running, this behaves like [`update`](Self::update).
    /// After [`unmount`](Self::unmount) it does nothing.
    pub async fn trigger_self(&self, key: impl Into<String>) -> MotionOutcome {
        let key = key.into();
        let (previous, transition) = {
            let mut state = self.inner.state.lock();
            if state.unmounting {
                return MotionOutcome::Updated;
            }
            (state.trigger_key.replace(key.clone()), state.transition)
        };

        let changed = previous.is_some_and(|previous| previous != key);
        let idle_or_running = matches!(transition, TransitionState::Idle | TransitionState::Executing);
        if !changed || idle_or_running {
            self.update();
            return MotionOutcome::Updated;
        }

        tracing::debug!(name = %self.inner.name, key = %key, "self-triggered motion");
        match self.inner.context.registry.claim(&self.inner.name) {
            Some(origin) => self.execute(origin).await,
            None => {
                self.update();
                MotionOutcome::Updated
            }
        }
    }

    fn announce(&self) {
        {
            let mut state = self.inner.state.lock();
            state.transition = TransitionState::Announced;
            state.visible = self.inner.context.visible_when_announced;
        }
        tracing::debug!(name = %self.inner.name, "motion announced");
        self.store();
        self.inner.context.emit(MotionEvent::Announced {
            name: self.inner.name.clone(),
        });
    }

    /// Capture this instance and store it in the registry.
    fn store(&self) -> Option<u64> {
        {
            let state = self.inner.state.lock();
            if state.unmounting || state.transition == TransitionState::Executing {
                return None;
            }
        }

        let (phases, target) = {
            let collected = self.inner.collected.lock();
            (collected.phases.clone(), collected.target.clone())
        };
        if phases.is_empty() {
            tracing::trace!(name = %self.inner.name, "no phases collected; nothing to store");
            return None;
        }

        let scroll = &*self.inner.context.scroll;
        let snapshot = ElementSnapshot {
            name: self.inner.name.clone(),
            bounding_box: capture_bounding_box(&*target.element, scroll),
            focal_bounding_box: target
                .focal
                .as_ref()
                .map(|focal| capture_bounding_box(&**focal, scroll)),
            render: target.render,
            phases,
        };

        let generation = self.inner.context.registry.store(snapshot);
        self.inner.state.lock().stored_generation = Some(generation);
        Some(generation)
    }

    fn destination(&self, target: &MotionTarget) -> TargetData {
        let scroll = &*self.inner.context.scroll;
        TargetData {
            bounding_box: capture_bounding_box(&*target.element, scroll),
            focal_bounding_box: target
                .focal
                .as_ref()
                .map(|focal| capture_bounding_box(&**focal, scroll)),
            render: target.render.clone(),
        }
    }

    async fn execute(&self, origin: Arc<ElementSnapshot>) -> MotionOutcome {
        let name = self.inner.name.clone();
        {
            let mut state = self.inner.state.lock();
            state.transition = TransitionState::Executing;
            state.visible = false;
        }
        self.inner.context.emit(MotionEvent::Started { name: name.clone() });

        let plan = ExecutionPlan::from_phases(&origin.phases);
        let target = self.inner.collected.lock().target.clone();
        let data = MotionData {
            name: name.clone(),
            origin: TargetData {
                bounding_box: origin.bounding_box,
                focal_bounding_box: origin.focal_bounding_box,
                render: origin.render.clone(),
            },
            destination: self.destination(&target),
            scroll: self.inner.context.scroll.scroll_offset(),
        };
        let mut report = TransitionReport::new(&name, plan.block_count());
        tracing::debug!(
            name = %name,
            effects = plan.effects().len(),
            blocks = plan.block_count(),
            "executing transition"
        );

        let prepared = join_all(plan.effects().iter().map(|effect| effect.before_animate(&data))).await;
        let mut active = vec![true; plan.effects().len()];
        for (index, result) in prepared.into_iter().enumerate() {
            if let Err(error) = result {
                active[index] = false;
                report.record(plan.effects()[index].name(), Phase::BeforeAnimate, error);
            }
        }

        for block in 0..plan.block_count() {
            if self.is_unmounting() {
                return report.abandon();
            }

            let (indices, running): (Vec<_>, Vec<_>) = plan
                .block(block)
                .filter(|(index, _)| active[*index])
                .map(|(index, effect)| (index, effect.animate(&data)))
                .unzip();

            let results = join_all(running).await;
            for (index, result) in indices.into_iter().zip(results) {
                if let Err(error) = result {
                    active[index] = false;
                    report.record(plan.effects()[index].name(), Phase::Animate, error);
                }
            }
            report.blocks_completed += 1;
            tracing::trace!(name = %name, block, "block finished");
        }

        if self.is_unmounting() {
            return report.abandon();
        }

        let (cleanup_names, cleanups): (Vec<_>, Vec<_>) = plan
            .effects()
            .iter()
            .zip(&active)
            .filter(|(_, active)| **active)
            .map(|(effect, _)| (effect.name(), effect.after_animate(&data)))
            .unzip();

        {
            let mut state = self.inner.state.lock();
            state.transition = TransitionState::Settled;
            state.visible = true;
        }
        self.store();
        self.inner.context.emit(MotionEvent::Settled { name: name.clone() });
        tracing::debug!(name = %name, failures = report.failures.len(), "transition settled");

        let results = join_all(cleanups).await;
        for (effect, result) in cleanup_names.into_iter().zip(results) {
            if let Err(error) = result {
                report.record(effect, Phase::AfterAnimate, error);
            }
        }

        MotionOutcome::Settled(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::recording_render;
    use crate::effects::{MotionDuration, Noop};
    use crate::geometry::{ElementHandle, Rect};

    struct Fixed(Rect);

    impl ElementHandle for Fixed {
        fn client_rect(&self) -> Rect {
            self.0
        }
    }

    fn tree(top: f64) -> MotionNode {
        let (render, _) = recording_render();
        MotionNode::builder()
            .effect(Noop)
            .build(MotionTarget::new(Arc::new(Fixed(Rect::new(top, 0.0, 10.0, 10.0))), render))
    }

    #[test]
    fn test_context_from_config() {
        let config = MotionConfig {
            eviction_grace_ms: 120,
            visible_when_announced: false,
            ..MotionConfig::default()
        };
        let context = MotionContext::from_config(ElementRegistry::new(), &config).unwrap();

        assert_eq!(context.eviction_grace, Duration::from_millis(120));
        assert!(!context.visible_when_announced);

        let broken = MotionConfig {
            timing_function: "sometimes".to_string(),
            ..MotionConfig::default()
        };
        assert!(matches!(
            MotionContext::from_config(ElementRegistry::new(), &broken),
            Err(MotionError::InvalidTimingFunction(_))
        ));
    }

    #[test]
    fn test_context_options_follow_config() {
        let config = MotionConfig {
            default_duration: "240".to_string(),
            timing_function: "linear".to_string(),
            settle_delay_ms: 30,
            ..MotionConfig::default()
        };
        let context = MotionContext::from_config(ElementRegistry::new(), &config).unwrap();

        let options = context.options();
        assert_eq!(options.duration, MotionDuration::Fixed(240.0));
        assert_eq!(options.timing_function, "linear");
        assert_eq!(context.conceal_move().fade_out_ms(), 30.0);
    }

    #[tokio::test]
    async fn test_announce_stores_and_shows() {
        let context = MotionContext::new(ElementRegistry::new());
        let motion = Motion::new("card", context.clone(), &tree(5.0));

        assert_eq!(motion.mount().await, MotionOutcome::Announced);

        assert_eq!(motion.state(), TransitionState::Announced);
        assert!(motion.is_visible());
        assert_eq!(motion.style().opacity, Some(1.0));
        assert!(context.registry.contains("card"));
    }

    #[tokio::test]
    async fn test_announce_hidden_when_configured() {
        let context = MotionContext::new(ElementRegistry::new()).with_visible_when_announced(false);
        let motion = Motion::new("card", context, &tree(5.0));

        motion.mount().await;

        assert!(!motion.is_visible());
    }

    #[tokio::test]
    async fn test_target_without_phases_stores_nothing() {
        let context = MotionContext::new(ElementRegistry::new());
        let (render, _) = recording_render();
        let bare = MotionNode::Target(MotionTarget::new(Arc::new(Fixed(Rect::default())), render));
        let motion = Motion::new("bare", context.clone(), &bare);

        motion.mount().await;

        assert!(!context.registry.contains("bare"));
        assert!(!motion.update());
    }

    #[tokio::test]
    async fn test_update_restores_after_claim() {
        let context = MotionContext::new(ElementRegistry::new());
        let motion = Motion::new("card", context.clone(), &tree(5.0));
        motion.mount().await;

        context.registry.claim("card");
        assert!(motion.update());

        assert!(context.registry.contains("card"));
    }

    #[tokio::test]
    async fn test_no_store_after_unmount() {
        let context = MotionContext::new(ElementRegistry::new());
        let motion = Motion::new("card", context.clone(), &tree(5.0));
        motion.mount().await;
        context.registry.remove("card");

        motion.unmount();

        assert!(!motion.update());
        assert!(!context.registry.contains("card"));
    }

    #[tokio::test]
    async fn test_second_mount_is_update() {
        let context = MotionContext::new(ElementRegistry::new());
        let motion = Motion::new("card", context, &tree(5.0));
        motion.mount().await;

        assert_eq!(motion.mount().await, MotionOutcome::Updated);
        assert_eq!(motion.state(), TransitionState::Announced);
    }

    #[test]
    fn test_report_helpers() {
        let mut report = TransitionReport::new("card", 2);
        assert!(report.is_clean());

        report.record("Fade", Phase::Animate, MotionError::InvalidOption("x".to_string()));

        assert!(!report.is_clean());
        assert_eq!(report.failed_effects(), vec!["Fade"]);
        assert_eq!(MotionOutcome::Settled(report.clone()).report(), Some(&report));
        assert_eq!(MotionOutcome::Announced.report(), None);
    }
}

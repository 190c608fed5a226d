#![allow(dead_code)]

use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use rune_motion::{
    Effect, ElementHandle, MotionData, MotionNode, MotionTarget, PhaseFuture, Rect, RenderFn,
    RenderProps, ScrollOffset, ScrollSource,
};
use tokio::time::{Duration, Instant};

/// Element whose rect can be moved between mounts.
pub struct FakeElement {
    rect: Mutex<Rect>,
}

impl FakeElement {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Arc<Self> {
        Arc::new(Self {
            rect: Mutex::new(Rect::new(top, left, width, height)),
        })
    }

    pub fn move_to(&self, rect: Rect) {
        *self.rect.lock() = rect;
    }
}

impl ElementHandle for FakeElement {
    fn client_rect(&self) -> Rect {
        *self.rect.lock()
    }
}

/// Scroll position tests can change.
#[derive(Default)]
pub struct FakeScroll {
    offset: Mutex<ScrollOffset>,
}

impl FakeScroll {
    pub fn set(&self, top: f64, left: f64) {
        *self.offset.lock() = ScrollOffset::new(top, left);
    }
}

impl ScrollSource for FakeScroll {
    fn scroll_offset(&self) -> ScrollOffset {
        *self.offset.lock()
    }
}

pub type RenderLog = Arc<Mutex<Vec<RenderProps>>>;

pub fn render_log() -> (RenderFn, RenderLog) {
    let log: RenderLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let render: RenderFn = Arc::new(move |props| sink.lock().push(props));
    (render, log)
}

pub fn target(element: Arc<FakeElement>) -> (MotionTarget, RenderLog) {
    let (render, log) = render_log();
    (MotionTarget::new(element, render), log)
}

/// One recorded phase event: effect label, event, milliseconds since start.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub label: &'static str,
    pub event: &'static str,
    pub at_ms: u128,
}

/// Shared log of phase events on the paused tokio clock.
#[derive(Clone)]
pub struct Timeline {
    start: Instant,
    marks: Arc<Mutex<Vec<Mark>>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn mark(&self, label: &'static str, event: &'static str) {
        self.marks.lock().push(Mark {
            label,
            event,
            at_ms: self.start.elapsed().as_millis(),
        });
    }

    pub fn marks(&self) -> Vec<Mark> {
        self.marks.lock().clone()
    }

    /// Time of the first `event` recorded for `label`.
    pub fn at(&self, label: &str, event: &str) -> Option<u128> {
        self.marks
            .lock()
            .iter()
            .find(|mark| mark.label == label && mark.event == event)
            .map(|mark| mark.at_ms)
    }

    /// Position of the first `event` for `label` in recording order.
    pub fn position(&self, label: &str, event: &str) -> Option<usize> {
        self.marks
            .lock()
            .iter()
            .position(|mark| mark.label == label && mark.event == event)
    }
}

/// Effect that sleeps for a fixed time and records each phase.
pub struct RecordingEffect {
    pub label: &'static str,
    pub duration: Duration,
    pub timeline: Timeline,
}

impl RecordingEffect {
    pub fn new(label: &'static str, duration_ms: u64, timeline: &Timeline) -> Self {
        Self {
            label,
            duration: Duration::from_millis(duration_ms),
            timeline: timeline.clone(),
        }
    }
}

impl Effect for RecordingEffect {
    fn name(&self) -> &'static str {
        self.label
    }

    fn before_animate(&self, _data: &MotionData) -> PhaseFuture {
        self.timeline.mark(self.label, "before");
        rune_motion::effects::finished()
    }

    fn animate(&self, _data: &MotionData) -> PhaseFuture {
        let timeline = self.timeline.clone();
        let label = self.label;
        let duration = self.duration;
        async move {
            timeline.mark(label, "start");
            tokio::time::sleep(duration).await;
            timeline.mark(label, "end");
            Ok(())
        }
        .boxed()
    }

    fn after_animate(&self, _data: &MotionData) -> PhaseFuture {
        self.timeline.mark(self.label, "after");
        rune_motion::effects::finished()
    }
}

/// Effect that records the scroll-adjusted origin and destination tops it saw.
#[derive(Clone, Default)]
pub struct ProbeEffect {
    pub seen: Arc<Mutex<Vec<(f64, f64)>>>,
}

impl ProbeEffect {
    pub fn seen(&self) -> Vec<(f64, f64)> {
        self.seen.lock().clone()
    }
}

impl Effect for ProbeEffect {
    fn name(&self) -> &'static str {
        "Probe"
    }

    fn before_animate(&self, data: &MotionData) -> PhaseFuture {
        self.seen
            .lock()
            .push((data.origin_box().location.top, data.destination_box().location.top));
        rune_motion::effects::finished()
    }

    fn animate(&self, _data: &MotionData) -> PhaseFuture {
        rune_motion::effects::finished()
    }
}

pub fn probe_tree(probe: &ProbeEffect, target: MotionTarget) -> MotionNode {
    MotionNode::builder().effect(probe.clone()).build(target)
}

//! Craft trace minigame: guide path generation and the pointer-driven validator.
//!
//! A craft session walks `Idle -> Armed -> Tracing -> {Success, Failed} -> Idle`.
//! The validator only sees pointer samples that were already projected onto
//! the scene; camera and collision work happens in the caller.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Tunables for path generation and matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Distance under which a pointer position reaches the head waypoint.
    pub tolerance: f32,
    /// Ring radius of band 0.
    pub base_radius: f32,
    /// Radius added per band (bands cycle modulo 3).
    pub band_step: f32,
    /// Height of the ring above the item centroid.
    pub height_offset: f32,
    /// Lift applied to surface hits before matching.
    pub surface_lift: f32,
    /// Seconds a failed trace stays visible before resetting.
    pub failure_reset_delay: f64,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            tolerance: 1.25,
            base_radius: 0.08,
            band_step: 0.03,
            height_offset: 0.25,
            surface_lift: 0.03,
            failure_reset_delay: 1.5,
        }
    }
}

/// Minimum number of workbench items needed to start a craft.
pub const MIN_CRAFT_ITEMS: usize = 2;

/// Arithmetic mean of `positions` (origin when empty).
pub fn centroid(positions: &[Vec3]) -> Vec3 {
    if positions.is_empty() {
        return Vec3::ZERO;
    }
    positions.iter().copied().sum::<Vec3>() / positions.len() as f32
}

/// Ordered waypoints consumed front to back.
#[derive(Debug, Clone, PartialEq)]
pub struct TracePath {
    waypoints: VecDeque<Vec3>,
}

impl TracePath {
    /// Closed ring of `N + 2` points around the centroid of `positions`,
    /// followed by a copy of the first point. `None` for fewer than two items.
    pub fn generate(positions: &[Vec3], settings: &TraceSettings) -> Option<Self> {
        if positions.len() < MIN_CRAFT_ITEMS {
            return None;
        }

        let center = centroid(positions);
        let height = center.y + settings.height_offset;
        let segments = positions.len() + 2;

        let mut waypoints = VecDeque::with_capacity(segments + 1);
        for i in 0..segments {
            let angle = i as f32 * std::f32::consts::TAU / segments as f32;
            let radius = settings.base_radius + (i % 3) as f32 * settings.band_step;
            let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
            waypoints.push_back(Vec3::new(center.x + offset.x, height, center.z + offset.z));
        }
        let first = waypoints[0];
        waypoints.push_back(first);

        Some(Self { waypoints })
    }

    /// Waypoint the pointer must reach next.
    pub fn head(&self) -> Option<Vec3> {
        self.waypoints.front().copied()
    }

    /// Remaining waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// True once every waypoint is consumed.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Remaining waypoints in order.
    pub fn points(&self) -> Vec<Vec3> {
        self.waypoints.iter().copied().collect()
    }

    /// First and last waypoints coincide.
    pub fn is_closed(&self) -> bool {
        match (self.waypoints.front(), self.waypoints.back()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn pop_head(&mut self) -> Option<Vec3> {
        self.waypoints.pop_front()
    }
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    /// No session.
    Idle,
    /// Path generated and shown; waiting for the first press.
    Armed,
    /// Pointer pressed; consuming waypoints.
    Tracing,
    /// Path completed; waiting for the name confirmation.
    Success,
    /// Pointer released early; waiting for the automatic reset.
    Failed,
}

/// Color of the guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideColor {
    /// Cyan guide while armed or tracing.
    Tracing,
    /// Green guide after completion.
    Success,
    /// Red guide after an abandoned trace.
    Failure,
}

impl GuideColor {
    /// Linear RGB emissive color.
    pub fn rgb(self) -> [f32; 3] {
        match self {
            GuideColor::Tracing => [0.0, 1.0, 1.0],
            GuideColor::Success => [0.0, 1.0, 0.0],
            GuideColor::Failure => [1.0, 0.0, 0.0],
        }
    }
}

/// What the UI needs to draw the guide.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceGuide {
    /// Remaining waypoints.
    pub points: Vec<Vec3>,
    /// Current tint.
    pub color: GuideColor,
}

/// Pointer-derived world hit for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    /// World-space hit point.
    pub point: Vec3,
    /// Whether the hit surface is the workbench.
    pub on_workbench: bool,
}

/// Pointer state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    /// Button went down this frame.
    pub pressed: bool,
    /// Button is held this frame.
    pub held: bool,
    /// Button went up this frame.
    pub released: bool,
    /// Projected hit under the pointer, if any.
    pub hit: Option<TraceHit>,
}

/// Result of trying to start a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Path generated; session armed.
    Started,
    /// Fewer than two eligible items; nothing happened.
    TooFewItems,
    /// A session is already in progress; nothing happened.
    SessionActive,
}

/// Transition caused by one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// Tracing began.
    Began,
    /// A waypoint was consumed; `remaining` are left.
    Reached {
        /// Waypoints still in the path.
        remaining: usize,
    },
    /// Path completed.
    Succeeded,
    /// Pointer released too early.
    Failed,
}

/// State machine validating a trace against the generated path.
#[derive(Debug, Clone)]
pub struct TraceValidator {
    settings: TraceSettings,
    state: TraceState,
    path: Option<TracePath>,
}

impl TraceValidator {
    /// Idle validator.
    pub fn new(settings: TraceSettings) -> Self {
        Self {
            settings,
            state: TraceState::Idle,
            path: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> TraceState {
        self.state
    }

    /// Tunables.
    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// Remaining path, while a session exists.
    pub fn path(&self) -> Option<&TracePath> {
        self.path.as_ref()
    }

    /// True unless idle.
    pub fn is_active(&self) -> bool {
        self.state != TraceState::Idle
    }

    /// Guide to draw, while a session exists.
    pub fn guide(&self) -> Option<TraceGuide> {
        let color = match self.state {
            TraceState::Idle => return None,
            TraceState::Armed | TraceState::Tracing => GuideColor::Tracing,
            TraceState::Success => GuideColor::Success,
            TraceState::Failed => GuideColor::Failure,
        };
        self.path.as_ref().map(|path| TraceGuide {
            points: path.points(),
            color,
        })
    }

    /// Arm a new session around `positions`. Rejected while another session
    /// is in progress or with fewer than two items.
    pub fn start(&mut self, positions: &[Vec3]) -> StartOutcome {
        if self.is_active() {
            debug!(state = ?self.state, "craft start rejected: session active");
            return StartOutcome::SessionActive;
        }
        let Some(path) = TracePath::generate(positions, &self.settings) else {
            return StartOutcome::TooFewItems;
        };

        info!(items = positions.len(), waypoints = path.len(), "craft trace armed");
        self.path = Some(path);
        self.state = TraceState::Armed;
        StartOutcome::Started
    }

    /// Feed one frame of pointer input.
    pub fn sample(&mut self, input: &PointerSample) -> Option<TraceEvent> {
        if !matches!(self.state, TraceState::Armed | TraceState::Tracing) {
            return None;
        }

        let mut event = None;
        if input.pressed && self.state == TraceState::Armed {
            self.state = TraceState::Tracing;
            event = Some(TraceEvent::Began);
        }
        if self.state != TraceState::Tracing {
            return event;
        }

        let path = self.path.as_mut()?;
        if input.held {
            if let Some(hit) = input.hit.filter(|hit| hit.on_workbench) {
                let pointer = hit.point + Vec3::Y * self.settings.surface_lift;
                let reached = path
                    .head()
                    .is_some_and(|head| pointer.distance(head) < self.settings.tolerance);
                if reached {
                    path.pop_head();
                    if path.len() <= 1 {
                        info!("craft trace completed");
                        self.state = TraceState::Success;
                        return Some(TraceEvent::Succeeded);
                    }
                    event = Some(TraceEvent::Reached {
                        remaining: path.len(),
                    });
                }
            }
        }

        if input.released && path.len() > 1 {
            info!(remaining = path.len(), "craft trace abandoned");
            self.state = TraceState::Failed;
            return Some(TraceEvent::Failed);
        }

        event
    }

    /// Accept a completed trace and return to idle. False unless in `Success`.
    pub fn confirm(&mut self) -> bool {
        if self.state != TraceState::Success {
            return false;
        }
        self.reset();
        true
    }

    /// Discard any session and return to idle.
    pub fn reset(&mut self) {
        self.path = None;
        self.state = TraceState::Idle;
    }
}

impl Default for TraceValidator {
    fn default() -> Self {
        Self::new(TraceSettings::default())
    }
}

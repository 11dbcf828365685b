//! Authoritative scene ↔ live canvas.
//!
//! The reconciler is a plain owned state object driven from a single event loop: external
//! scenes arrive through [`SceneReconciler::push_external`], user edits through
//! [`SceneReconciler::on_canvas_change`], and deferred viewport fits run when the loop calls
//! [`SceneReconciler::poll_timers`].

use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use rustc_hash::FxHasher;
use serde_json::Value;
use sketchflow_core::{CanonicalElement, Scene};

use crate::canvas::{Canvas, CanvasChange};
use crate::clock::{Clock, SystemClock};

/// How an incoming scene is recognized as an echo of the canvas's own change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EchoGuard {
    /// The canvas already shows as many live elements as the incoming scene has.
    ///
    /// This is a heuristic: a genuinely new scene with the same element count is dropped.
    #[default]
    Cardinality,
    /// The incoming scene carries the same [`SceneTag`] as the last scene applied to or
    /// reported by the canvas.
    SceneTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Minimum time between two pushes into the canvas.
    pub debounce: Duration,
    /// Delay between an accepted push and its viewport fit.
    pub fit_delay: Duration,
    pub echo_guard: EchoGuard,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            fit_delay: Duration::from_millis(50),
            echo_guard: EchoGuard::default(),
        }
    }
}

/// Content hash over element identity, versions and deletion flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneTag(u64);

impl SceneTag {
    pub fn of(elements: &[CanonicalElement]) -> Self {
        let mut hasher = FxHasher::default();
        elements.len().hash(&mut hasher);
        for el in elements {
            el.id.hash(&mut hasher);
            el.version.hash(&mut hasher);
            el.version_nonce.hash(&mut hasher);
            el.is_deleted.hash(&mut hasher);
        }
        Self(hasher.finish())
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcilerState {
    /// No canvas has been attached yet.
    #[default]
    Uninitialized,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The scene was pushed into the canvas and a viewport fit was queued.
    Applied,
    /// No canvas yet; the scene is held and pushed on attach.
    Pending,
    /// The scene is empty; it is held but the canvas keeps its content.
    SkippedEmpty,
    /// Too soon after the previous push.
    Debounced,
    EchoSuppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The change now is the held scene.
    Mirrored,
    /// An empty change arrived while a non-empty scene is held.
    DiscardedEmpty,
}

#[derive(Debug, Clone, Copy)]
struct PendingFit {
    due: Instant,
    session: u64,
}

pub struct SceneReconciler<C, K = SystemClock> {
    config: ReconcilerConfig,
    clock: K,
    state: ReconcilerState,
    canvas: Option<C>,
    /// Bumped whenever the canvas is attached, replaced or detached.
    session: u64,
    scene: Scene,
    view_state: Value,
    last_push: Option<Instant>,
    last_tag: Option<SceneTag>,
    fits: Vec<PendingFit>,
}

impl<C, K> std::fmt::Debug for SceneReconciler<C, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneReconciler")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("elements", &self.scene.len())
            .field("pending_fits", &self.fits.len())
            .finish_non_exhaustive()
    }
}

impl<C: Canvas> SceneReconciler<C, SystemClock> {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Canvas, K: Clock> SceneReconciler<C, K> {
    pub fn with_clock(config: ReconcilerConfig, clock: K) -> Self {
        Self {
            config,
            clock,
            state: ReconcilerState::Uninitialized,
            canvas: None,
            session: 0,
            scene: Scene::default(),
            view_state: Value::Null,
            last_push: None,
            last_tag: None,
            fits: Vec::new(),
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    /// The held authoritative scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Editor state from the last mirrored canvas change.
    pub fn view_state(&self) -> &Value {
        &self.view_state
    }

    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    pub fn canvas_mut(&mut self) -> Option<&mut C> {
        self.canvas.as_mut()
    }

    /// Number of queued viewport fits, including ones that will no-op.
    pub fn pending_timers(&self) -> usize {
        self.fits.len()
    }

    /// When the earliest queued fit becomes due.
    pub fn next_timer_due(&self) -> Option<Instant> {
        self.fits.iter().map(|f| f.due).min()
    }

    /// Attaches a canvas, returning the one it replaces.
    ///
    /// A held non-empty scene is pushed into the new canvas once and fitted right away.
    pub fn attach_canvas(&mut self, canvas: C) -> Option<C> {
        self.session += 1;
        self.state = ReconcilerState::Ready;
        let previous = self.canvas.replace(canvas);
        tracing::debug!(
            session = self.session,
            replaced = previous.is_some(),
            "canvas attached"
        );

        // The push on attach does not open a debounce window.
        if !self.scene.is_empty() {
            if let Some(canvas) = self.canvas.as_mut() {
                canvas.update_scene(&self.scene.elements);
                fit_to_content(canvas);
            }
            self.last_tag = Some(SceneTag::of(&self.scene.elements));
            tracing::info!(elements = self.scene.len(), "pushed held scene on attach");
        }
        previous
    }

    /// Detaches the canvas. Queued fits for it become no-ops.
    pub fn detach_canvas(&mut self) -> Option<C> {
        self.session += 1;
        let canvas = self.canvas.take();
        if canvas.is_some() {
            tracing::debug!(session = self.session, "canvas detached");
        }
        canvas
    }

    /// Takes `scene` as the authoritative scene and pushes it into the canvas unless a guard
    /// holds it back.
    pub fn push_external(&mut self, scene: Scene) -> PushOutcome {
        let incoming = scene.len();
        self.scene = scene;

        if incoming == 0 {
            tracing::debug!("holding empty scene without pushing");
            return PushOutcome::SkippedEmpty;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            tracing::debug!(elements = incoming, "no canvas yet; scene pending");
            return PushOutcome::Pending;
        };

        let now = self.clock.now();
        if let Some(last) = self.last_push {
            let since = now.saturating_duration_since(last);
            if since < self.config.debounce {
                tracing::debug!(
                    elements = incoming,
                    since_ms = since.as_millis() as u64,
                    "push debounced"
                );
                return PushOutcome::Debounced;
            }
        }

        let tag = SceneTag::of(&self.scene.elements);
        let echo = match self.config.echo_guard {
            EchoGuard::Cardinality => {
                let live = canvas
                    .scene_elements()
                    .iter()
                    .filter(|e| !e.is_deleted)
                    .count();
                live == incoming
            }
            EchoGuard::SceneTag => self.last_tag == Some(tag),
        };
        if echo {
            tracing::debug!(elements = incoming, guard = ?self.config.echo_guard, "push suppressed as echo");
            return PushOutcome::EchoSuppressed;
        }

        canvas.update_scene(&self.scene.elements);
        self.last_push = Some(now);
        self.last_tag = Some(tag);
        self.fits.push(PendingFit {
            due: now + self.config.fit_delay,
            session: self.session,
        });
        tracing::info!(elements = incoming, "external scene applied");
        PushOutcome::Applied
    }

    /// Mirrors a user-driven canvas change into the held scene.
    pub fn on_canvas_change(&mut self, change: CanvasChange) -> ChangeOutcome {
        if change.elements.is_empty() && !self.scene.is_empty() {
            tracing::debug!(
                held = self.scene.len(),
                "ignoring empty canvas change over a non-empty scene"
            );
            return ChangeOutcome::DiscardedEmpty;
        }

        self.last_tag = Some(SceneTag::of(&change.elements));
        self.scene = Scene::with_files(change.elements, change.files);
        self.view_state = change.view_state;
        ChangeOutcome::Mirrored
    }

    /// Runs every viewport fit that is due and returns how many ran against a live canvas.
    pub fn poll_timers(&mut self) -> usize {
        let now = self.clock.now();
        let (due, waiting): (Vec<PendingFit>, Vec<PendingFit>) =
            self.fits.drain(..).partition(|f| f.due <= now);
        self.fits = waiting;

        let mut ran = 0;
        for fit in due {
            match self.canvas.as_mut() {
                Some(canvas) if fit.session == self.session => {
                    fit_to_content(canvas);
                    ran += 1;
                }
                _ => tracing::debug!(
                    session = fit.session,
                    current = self.session,
                    "skipping fit for a replaced or detached canvas"
                ),
            }
        }
        ran
    }
}

/// Best-effort scroll to the rendered content; failures are logged.
fn fit_to_content<C: Canvas>(canvas: &mut C) {
    let elements = canvas.scene_elements();
    if elements.is_empty() {
        return;
    }
    if let Err(err) = canvas.scroll_to_content(&elements, true) {
        tracing::warn!(%err, "viewport fit failed");
    }
}

#![forbid(unsafe_code)]

//! Scene reconciliation against a live canvas.
//!
//! The [`SceneReconciler`] holds the authoritative scene produced by conversion or
//! normalization and mirrors it into a [`Canvas`]. Pushes are debounced and checked against
//! an echo guard; change notifications from the canvas are mirrored back unless they would
//! erase a non-empty scene. Deferred viewport fits are queued and run by
//! [`SceneReconciler::poll_timers`], with time taken from a [`Clock`].

pub mod canvas;
pub mod clock;
pub mod reconciler;

pub use canvas::{Canvas, CanvasChange, CanvasError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use reconciler::{
    ChangeOutcome, EchoGuard, PushOutcome, ReconcilerConfig, ReconcilerState, SceneReconciler,
    SceneTag,
};

#[cfg(test)]
mod tests;

#![forbid(unsafe_code)]

//! `sketchflow` turns the output of a diagram generator into a validated scene.
//!
//! Generated payloads are either scene data (candidate elements, possibly malformed) or a
//! textual diagram description. The core re-exported here repairs the former and converts the
//! latter; [`Pipeline`] wires both behind one classifier.
//!
//! # Features
//!
//! - `layout`: the built-in layout engine (`sketchflow::layout`) and [`Pipeline`]
//! - `canvas`: scene reconciliation against a live canvas (`sketchflow::canvas`)

pub use sketchflow_core::*;

#[cfg(feature = "layout")]
pub mod pipeline;

#[cfg(feature = "layout")]
pub use pipeline::Pipeline;

#[cfg(feature = "layout")]
pub mod layout {
    pub use sketchflow_layout::graph::{Direction, Edge, EdgeStroke, Graph, Node, NodeShape};
    pub use sketchflow_layout::{BuiltinLayoutEngine, Error, Result, Spacing};
}

#[cfg(feature = "canvas")]
pub mod canvas {
    pub use sketchflow_canvas::*;
}

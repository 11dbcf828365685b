//! Node/edge model shared by the flowchart and state parsers.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(Self::TopDown),
            "BT" => Some(Self::BottomUp),
            "LR" => Some(Self::LeftRight),
            "RL" => Some(Self::RightLeft),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight | Self::RightLeft)
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, Self::BottomUp | Self::RightLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeShape {
    Rect,
    Rounded,
    Stadium,
    Circle,
    Diamond,
    Hexagon,
    Subroutine,
    Cylinder,
    Asymmetric,
    /// Filled start marker of a state diagram.
    StartMarker,
    /// End marker of a state diagram.
    EndMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeStroke {
    #[default]
    Solid,
    Dotted,
    Thick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub stroke: EdgeStroke,
    pub arrow_start: bool,
    pub arrow_end: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub direction: Direction,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    index: FxHashMap<String, usize>,
}

impl Graph {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Declares a node. A later declaration with a label replaces the earlier label and shape.
    pub fn upsert_node(&mut self, id: &str, label: Option<&str>, shape: NodeShape) {
        match self.index.get(id) {
            Some(&i) => {
                if let Some(label) = label {
                    self.nodes[i].label = label.to_string();
                    self.nodes[i].shape = shape;
                }
            }
            None => {
                self.index.insert(id.to_string(), self.nodes.len());
                self.nodes.push(Node {
                    id: id.to_string(),
                    label: label.unwrap_or(id).to_string(),
                    shape,
                });
            }
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.index.get(id).map(|&i| &mut self.nodes[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }
}

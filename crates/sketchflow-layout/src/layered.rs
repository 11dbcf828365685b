//! Rank-based layout of a node/edge graph.
//!
//! Nodes are ranked by longest path from the sources (cycles are broken by declaration
//! order), each rank is ordered once by the barycenter of its predecessors, and ranks are
//! stacked along the main axis with every rank centered on the cross axis.

use sketchflow_core::{
    CurveStyle, ElementKind, LayoutConfig, Point, Roundness, SkeletonElement, SkeletonScene,
    StrokeStyle, TextMeasurer,
};

use crate::graph::{EdgeStroke, Graph, NodeShape};
use crate::{Spacing, text_size};

const MARKER_SIZE: f64 = 20.0;
const SELF_LOOP_REACH: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

pub fn node_size(
    shape: NodeShape,
    label: &str,
    measurer: &dyn TextMeasurer,
    font_size: f64,
    spacing: &Spacing,
) -> (f64, f64) {
    if matches!(shape, NodeShape::StartMarker | NodeShape::EndMarker) {
        return (MARKER_SIZE, MARKER_SIZE);
    }
    let (tw, th) = text_size(measurer, label, font_size);
    let w = (tw + 2.0 * spacing.padding_x).max(spacing.min_width);
    let h = (th + 2.0 * spacing.padding_y).max(spacing.min_height);
    match shape {
        // Text has to fit inside the inscribed rectangle.
        NodeShape::Diamond | NodeShape::Hexagon => (w * 1.5, h * 1.5),
        NodeShape::Circle => {
            let d = w.max(h);
            (d, d)
        }
        _ => (w, h),
    }
}

/// Longest-path rank of every node, indexed like `graph.nodes`.
pub fn compute_ranks(graph: &Graph) -> Vec<usize> {
    let n = graph.nodes.len();
    let mut indeg = vec![0usize; n];
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in &graph.edges {
        let (Some(from), Some(to)) = (graph.position(&edge.from), graph.position(&edge.to)) else {
            continue;
        };
        if from == to {
            continue;
        }
        adj[from].push(to);
        indeg[to] += 1;
    }

    let mut order = Vec::with_capacity(n);
    let mut placed = vec![false; n];
    let mut queue: std::collections::VecDeque<usize> =
        (0..n).filter(|&i| indeg[i] == 0).collect();
    loop {
        while let Some(node) = queue.pop_front() {
            if placed[node] {
                continue;
            }
            placed[node] = true;
            order.push(node);
            for &next in &adj[node] {
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 {
                    queue.push_back(next);
                }
            }
        }
        // Everything left sits on a cycle; release the earliest declared node.
        match (0..n).find(|&i| !placed[i]) {
            Some(i) => queue.push_back(i),
            None => break,
        }
    }

    let mut position_in_order = vec![0usize; n];
    for (pos, &node) in order.iter().enumerate() {
        position_in_order[node] = pos;
    }

    let mut ranks = vec![0usize; n];
    for &node in &order {
        for &next in &adj[node] {
            // Back edges of a cycle do not push ranks.
            if position_in_order[next] > position_in_order[node] {
                ranks[next] = ranks[next].max(ranks[node] + 1);
            }
        }
    }
    ranks
}

/// Orders each rank by the mean position of its predecessors in earlier ranks.
fn order_ranks(graph: &Graph, buckets: &mut [Vec<usize>], ranks: &[usize]) {
    let mut position = vec![0usize; graph.nodes.len()];
    for bucket in buckets.iter() {
        for (i, &node) in bucket.iter().enumerate() {
            position[node] = i;
        }
    }

    for r in 1..buckets.len() {
        let scores: Vec<(usize, f64)> = buckets[r]
            .iter()
            .enumerate()
            .map(|(i, &node)| {
                let preds: Vec<f64> = graph
                    .edges
                    .iter()
                    .filter(|e| graph.position(&e.to) == Some(node))
                    .filter_map(|e| graph.position(&e.from))
                    .filter(|&p| ranks[p] < r)
                    .map(|p| position[p] as f64)
                    .collect();
                let score = if preds.is_empty() {
                    i as f64
                } else {
                    preds.iter().sum::<f64>() / preds.len() as f64
                };
                (node, score)
            })
            .collect();
        let mut sorted = scores;
        sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        buckets[r] = sorted.into_iter().map(|(node, _)| node).collect();
        for (i, &node) in buckets[r].iter().enumerate() {
            position[node] = i;
        }
    }
}

/// Positions every node; the result is indexed like `graph.nodes` and starts at `(0, 0)`.
pub fn assign_positions(graph: &Graph, sizes: &[(f64, f64)], spacing: &Spacing) -> Vec<Rect> {
    let ranks = compute_ranks(graph);
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for (node, &rank) in ranks.iter().enumerate() {
        buckets[rank].push(node);
    }
    order_ranks(graph, &mut buckets, &ranks);

    let horizontal = graph.direction.is_horizontal();
    // (main, cross) extents of a node.
    let extent = |node: usize| {
        let (w, h) = sizes[node];
        if horizontal { (w, h) } else { (h, w) }
    };

    let mut rects = vec![
        Rect {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        };
        graph.nodes.len()
    ];
    let mut main_cursor = 0.0;
    for bucket in &buckets {
        let band = bucket.iter().map(|&n| extent(n).0).fold(0.0, f64::max);
        let total_cross: f64 = bucket.iter().map(|&n| extent(n).1).sum::<f64>()
            + spacing.node * bucket.len().saturating_sub(1) as f64;
        let mut cross_cursor = -total_cross / 2.0;
        for &node in bucket {
            let (main, cross) = extent(node);
            let main_pos = main_cursor + (band - main) / 2.0;
            let (w, h) = sizes[node];
            rects[node] = if horizontal {
                Rect {
                    x: main_pos,
                    y: cross_cursor,
                    width: w,
                    height: h,
                }
            } else {
                Rect {
                    x: cross_cursor,
                    y: main_pos,
                    width: w,
                    height: h,
                }
            };
            cross_cursor += cross + spacing.node;
        }
        main_cursor += band + spacing.rank;
    }

    if graph.direction.is_reversed() {
        let total_main = (main_cursor - spacing.rank).max(0.0);
        for r in &mut rects {
            if horizontal {
                r.x = total_main - r.x - r.width;
            } else {
                r.y = total_main - r.y - r.height;
            }
        }
    }

    let min_x = rects.iter().map(|r| r.x).fold(f64::INFINITY, f64::min);
    let min_y = rects.iter().map(|r| r.y).fold(f64::INFINITY, f64::min);
    if min_x.is_finite() && min_y.is_finite() {
        for r in &mut rects {
            r.x -= min_x;
            r.y -= min_y;
        }
    }
    rects
}

/// Route between two node boxes: from the side of `from` facing `to` into the opposite side
/// of `to`.
pub fn route(from: &Rect, to: &Rect, horizontal: bool, curve: CurveStyle) -> Vec<Point> {
    let a = from.center();
    let b = to.center();
    let along_main = if horizontal {
        (b.0 - a.0).abs() > f64::EPSILON
    } else {
        (b.1 - a.1).abs() > f64::EPSILON
    };
    // Same rank: connect the facing sides across the cross axis instead.
    let use_x = horizontal == along_main;

    let (start, end) = if use_x {
        if b.0 >= a.0 {
            (Point(from.x + from.width, a.1), Point(to.x, b.1))
        } else {
            (Point(from.x, a.1), Point(to.x + to.width, b.1))
        }
    } else if b.1 >= a.1 {
        (Point(a.0, from.y + from.height), Point(b.0, to.y))
    } else {
        (Point(a.0, from.y), Point(b.0, to.y + to.height))
    };

    let aligned = if use_x {
        (start.1 - end.1).abs() < f64::EPSILON
    } else {
        (start.0 - end.0).abs() < f64::EPSILON
    };
    if curve == CurveStyle::Linear || aligned {
        return vec![start, end];
    }
    // Orthogonal elbow through the midpoint; the finalized arrow is rounded.
    if use_x {
        let mid = (start.0 + end.0) / 2.0;
        vec![start, Point(mid, start.1), Point(mid, end.1), end]
    } else {
        let mid = (start.1 + end.1) / 2.0;
        vec![start, Point(start.0, mid), Point(end.0, mid), end]
    }
}

fn self_loop(rect: &Rect) -> Vec<Point> {
    let right = rect.x + rect.width;
    let c = rect.center();
    vec![
        Point(right, c.1 - 10.0),
        Point(right + SELF_LOOP_REACH, c.1 - 10.0),
        Point(right + SELF_LOOP_REACH, c.1 + 10.0),
        Point(right, c.1 + 10.0),
    ]
}

fn node_skeleton(id: &str, label: &str, shape: NodeShape, rect: &Rect, font: f64) -> SkeletonElement {
    let kind = match shape {
        NodeShape::Circle | NodeShape::StartMarker | NodeShape::EndMarker => ElementKind::Ellipse,
        NodeShape::Diamond | NodeShape::Hexagon => ElementKind::Diamond,
        _ => ElementKind::Rectangle,
    };
    let el = SkeletonElement::shape(kind, id, rect.x, rect.y, rect.width, rect.height);
    match shape {
        NodeShape::StartMarker => el.with_background("#000000"),
        NodeShape::EndMarker => el.with_background("#000000").with_stroke_width(4.0),
        NodeShape::Rounded | NodeShape::Stadium => el
            .with_roundness(Roundness::adaptive())
            .with_label(label)
            .with_font_size(font),
        _ => el.with_label(label).with_font_size(font),
    }
}

/// Lays out `graph` and emits nodes first, then edges.
pub fn layout_graph(
    graph: &Graph,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
    spacing: &Spacing,
) -> SkeletonScene {
    let font = config.font_size_px;
    let sizes: Vec<(f64, f64)> = graph
        .nodes
        .iter()
        .map(|n| node_size(n.shape, &n.label, measurer, font, spacing))
        .collect();
    let rects = assign_positions(graph, &sizes, spacing);

    let mut elements: Vec<SkeletonElement> = graph
        .nodes
        .iter()
        .zip(&rects)
        .map(|(n, r)| node_skeleton(&n.id, &n.label, n.shape, r, font))
        .collect();

    let horizontal = graph.direction.is_horizontal();
    for edge in &graph.edges {
        let (Some(from), Some(to)) = (graph.position(&edge.from), graph.position(&edge.to)) else {
            continue;
        };
        let points = if from == to {
            self_loop(&rects[from])
        } else {
            route(&rects[from], &rects[to], horizontal, config.curve)
        };

        let mut sk = SkeletonElement::arrow(&points)
            .with_arrowheads(
                edge.arrow_start.then_some("arrow"),
                edge.arrow_end.then_some("arrow"),
            )
            .connecting(edge.from.clone(), edge.to.clone());
        if !edge.arrow_start && !edge.arrow_end {
            sk.kind = ElementKind::Line;
        }
        sk = match edge.stroke {
            EdgeStroke::Solid => sk,
            EdgeStroke::Dotted => sk.with_stroke_style(StrokeStyle::Dashed),
            EdgeStroke::Thick => sk.with_stroke_width(4.0),
        };
        if points.len() > 2 {
            sk = sk.with_roundness(Roundness::proportional());
        }
        if let Some(label) = &edge.label {
            sk = sk.with_label(label.clone()).with_font_size(font);
        }
        elements.push(sk);
    }

    SkeletonScene::new(elements)
}

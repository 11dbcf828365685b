//! `stateDiagram` / `stateDiagram-v2` descriptions.
//!
//! Transitions (`A --> B : label`), start/end markers (`[*]`), state descriptions
//! (`A : text`), aliases (`state "Long name" as A`) and `direction`. Composite state braces
//! are flattened and notes are ignored.

use crate::error::{Error, Result};
use crate::graph::{Direction, Edge, EdgeStroke, Graph, NodeShape};
use crate::lex::{clean_label, first_word, statements};

pub const START_ID: &str = "state-start";
pub const END_ID: &str = "state-end";

pub fn parse_state(text: &str) -> Result<Graph> {
    let stmts = statements(text, false);
    let Some((header, body)) = stmts.split_first() else {
        return Err(Error::parse(1, "empty state diagram"));
    };
    if !first_word(header.text)
        .to_ascii_lowercase()
        .starts_with("statediagram")
    {
        return Err(Error::parse(header.line, "expected `stateDiagram`"));
    }

    let mut graph = Graph::new(Direction::TopDown);
    let mut in_note = false;

    for stmt in body {
        let line = stmt.line;
        let text = stmt.text;
        let word = first_word(text);

        if in_note {
            in_note = !text.eq_ignore_ascii_case("end note");
            continue;
        }
        if word.eq_ignore_ascii_case("note") {
            // Multi-line notes have no `:` on their opening line.
            in_note = !text.contains(':');
            continue;
        }
        if text == "}" || text == "--" || word.eq_ignore_ascii_case("hide") {
            continue;
        }
        if word == "direction" {
            let token = text[word.len()..].trim();
            graph.direction = Direction::parse(token)
                .ok_or_else(|| Error::parse(line, format!("unknown direction `{token}`")))?;
            continue;
        }
        if word == "state" {
            declare(&mut graph, line, text[word.len()..].trim())?;
            continue;
        }

        if let Some((lhs, rhs)) = text.split_once("-->") {
            let (target, label) = match rhs.split_once(':') {
                Some((target, label)) => (target, Some(clean_label(label))),
                None => (rhs, None),
            };
            let from = endpoint(&mut graph, line, lhs, START_ID)?;
            let to = endpoint(&mut graph, line, target, END_ID)?;
            graph.edges.push(Edge {
                from,
                to,
                label: label.filter(|l| !l.is_empty()),
                stroke: EdgeStroke::Solid,
                arrow_start: false,
                arrow_end: true,
            });
            continue;
        }

        if let Some((id, description)) = text.split_once(':') {
            let id = state_id(line, id)?;
            graph.upsert_node(id, Some(&clean_label(description)), NodeShape::Rounded);
            continue;
        }

        let id = state_id(line, text)?;
        graph.upsert_node(id, None, NodeShape::Rounded);
    }

    tracing::debug!(
        states = graph.nodes.len(),
        transitions = graph.edges.len(),
        "parsed state diagram"
    );
    Ok(graph)
}

/// `state Name`, `state Name {`, `state "Label" as Name`.
fn declare(graph: &mut Graph, line: usize, rest: &str) -> Result<()> {
    let rest = rest.trim_end_matches('{').trim();
    if let Some((label, id)) = rest.split_once(" as ") {
        let id = state_id(line, id)?;
        graph.upsert_node(id, Some(&clean_label(label)), NodeShape::Rounded);
    } else {
        let id = state_id(line, first_word(rest))?;
        graph.upsert_node(id, None, NodeShape::Rounded);
    }
    Ok(())
}

fn endpoint(graph: &mut Graph, line: usize, raw: &str, marker_id: &str) -> Result<String> {
    let raw = raw.trim();
    if raw == "[*]" {
        let shape = if marker_id == START_ID {
            NodeShape::StartMarker
        } else {
            NodeShape::EndMarker
        };
        graph.upsert_node(marker_id, Some(""), shape);
        return Ok(marker_id.to_string());
    }
    let id = state_id(line, raw)?;
    graph.upsert_node(id, None, NodeShape::Rounded);
    Ok(id.to_string())
}

fn state_id(line: usize, raw: &str) -> Result<&str> {
    let id = raw.trim();
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(id)
    } else {
        Err(Error::parse(line, format!("invalid state name `{id}`")))
    }
}

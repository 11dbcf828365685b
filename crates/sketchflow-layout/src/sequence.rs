//! `sequenceDiagram` descriptions and their lane layout.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use sketchflow_core::{
    ElementKind, LayoutConfig, Point, SkeletonElement, SkeletonScene, StrokeStyle, TextMeasurer,
};

use crate::error::{Error, Result};
use crate::lex::{clean_label, first_word, statements};
use crate::{Spacing, text_size};

/// Statements accepted and ignored: activations, notes, blocks and titles.
const IGNORED_KEYWORDS: &[&str] = &[
    "autonumber",
    "activate",
    "deactivate",
    "note",
    "loop",
    "alt",
    "else",
    "opt",
    "par",
    "and",
    "critical",
    "break",
    "rect",
    "end",
    "title",
    "box",
    "create",
    "destroy",
    "links",
    "link",
];

static MESSAGE: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<from>[^:>+\-][^:>+]*?)\s*(?P<arrow>-{1,2}(?:>>|>|x|\)))\s*[+\-]?\s*(?P<to>[^:+\-][^:]*?)\s*(?::\s*(?P<text>.*))?$",
    )
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageHead {
    /// `->>`: filled arrowhead.
    Arrow,
    /// `->`: no arrowhead.
    Open,
    /// `-x`: cross.
    Cross,
    /// `-)`: asynchronous.
    Async,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: String,
    pub label: String,
    pub actor: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    pub dashed: bool,
    pub head: MessageHead,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceDiagram {
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
}

impl SequenceDiagram {
    fn ensure(&mut self, id: &str) {
        if !self.participants.iter().any(|p| p.id == id) {
            self.participants.push(Participant {
                id: id.to_string(),
                label: id.to_string(),
                actor: false,
            });
        }
    }

    fn declare(&mut self, id: &str, label: Option<&str>, actor: bool) {
        match self.participants.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                if let Some(label) = label {
                    p.label = label.to_string();
                }
                p.actor |= actor;
            }
            None => self.participants.push(Participant {
                id: id.to_string(),
                label: label.unwrap_or(id).to_string(),
                actor,
            }),
        }
    }
}

pub fn parse_sequence(text: &str) -> Result<SequenceDiagram> {
    let message_re = match &*MESSAGE {
        Ok(re) => re,
        Err(err) => return Err(Error::parse(1, format!("message pattern: {err}"))),
    };

    let stmts = statements(text, false);
    let Some((header, body)) = stmts.split_first() else {
        return Err(Error::parse(1, "empty sequence diagram"));
    };
    if !first_word(header.text).eq_ignore_ascii_case("sequenceDiagram") {
        return Err(Error::parse(header.line, "expected `sequenceDiagram`"));
    }

    let mut diagram = SequenceDiagram::default();
    for stmt in body {
        let word = first_word(stmt.text);
        let lower = word.to_ascii_lowercase();

        if lower == "participant" || lower == "actor" {
            let rest = stmt.text[word.len()..].trim();
            if rest.is_empty() {
                return Err(Error::parse(stmt.line, format!("`{word}` needs a name")));
            }
            match rest.split_once(" as ") {
                Some((id, label)) => {
                    diagram.declare(id.trim(), Some(&clean_label(label)), lower == "actor")
                }
                None => diagram.declare(rest, None, lower == "actor"),
            }
            continue;
        }
        if IGNORED_KEYWORDS.contains(&lower.as_str()) {
            continue;
        }

        let Some(caps) = message_re.captures(stmt.text) else {
            return Err(Error::parse(
                stmt.line,
                format!("unrecognized statement `{}`", stmt.text),
            ));
        };
        let from = caps["from"].trim().to_string();
        let to = caps["to"].trim().to_string();
        let arrow = &caps["arrow"];
        let head = if arrow.ends_with(">>") {
            MessageHead::Arrow
        } else if arrow.ends_with('>') {
            MessageHead::Open
        } else if arrow.ends_with('x') {
            MessageHead::Cross
        } else {
            MessageHead::Async
        };
        diagram.ensure(&from);
        diagram.ensure(&to);
        diagram.messages.push(Message {
            from,
            to,
            text: caps
                .name("text")
                .map(|m| clean_label(m.as_str()))
                .unwrap_or_default(),
            dashed: arrow.starts_with("--"),
            head,
        });
    }

    tracing::debug!(
        participants = diagram.participants.len(),
        messages = diagram.messages.len(),
        "parsed sequence diagram"
    );
    Ok(diagram)
}

const PARTICIPANT_MIN_WIDTH: f64 = 150.0;
const PARTICIPANT_HEIGHT: f64 = 65.0;
const SELF_MESSAGE_WIDTH: f64 = 60.0;
const SELF_MESSAGE_HEIGHT: f64 = 30.0;

/// Participants side by side, a dashed lifeline under each, messages top to bottom.
pub fn layout_sequence(
    diagram: &SequenceDiagram,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
    spacing: &Spacing,
) -> SkeletonScene {
    let font = config.font_size_px;
    let mut elements = Vec::new();
    let mut centers: FxHashMap<&str, f64> = FxHashMap::default();

    let mut x = 0.0;
    for p in &diagram.participants {
        let (w, _) = text_size(measurer, &p.label, font);
        let width = (w + 2.0 * spacing.padding_x).max(PARTICIPANT_MIN_WIDTH);
        let kind = if p.actor {
            ElementKind::Ellipse
        } else {
            ElementKind::Rectangle
        };
        elements.push(
            SkeletonElement::shape(kind, p.id.clone(), x, 0.0, width, PARTICIPANT_HEIGHT)
                .with_label(p.label.clone())
                .with_font_size(font),
        );
        centers.insert(p.id.as_str(), x + width / 2.0);
        x += width + spacing.node;
    }

    let mut y = PARTICIPANT_HEIGHT + spacing.rank / 2.0;
    let mut arrows = Vec::with_capacity(diagram.messages.len());
    for m in &diagram.messages {
        let (Some(&x1), Some(&x2)) = (centers.get(m.from.as_str()), centers.get(m.to.as_str()))
        else {
            continue;
        };
        let (_, label_h) = text_size(measurer, &m.text, font);
        y += label_h;

        let points = if m.from == m.to {
            vec![
                Point(x1, y),
                Point(x1 + SELF_MESSAGE_WIDTH, y),
                Point(x1 + SELF_MESSAGE_WIDTH, y + SELF_MESSAGE_HEIGHT),
                Point(x1, y + SELF_MESSAGE_HEIGHT),
            ]
        } else {
            vec![Point(x1, y), Point(x2, y)]
        };
        if m.from == m.to {
            y += SELF_MESSAGE_HEIGHT;
        }

        let head = match m.head {
            MessageHead::Arrow => Some("arrow"),
            MessageHead::Open => None,
            MessageHead::Cross => Some("bar"),
            MessageHead::Async => Some("triangle"),
        };
        let mut arrow = SkeletonElement::arrow(&points).with_arrowheads(None, head);
        if m.dashed {
            arrow = arrow.with_stroke_style(StrokeStyle::Dashed);
        }
        if !m.text.trim().is_empty() {
            arrow = arrow.with_label(m.text.clone()).with_font_size(font);
        }
        arrows.push(arrow);
        y += spacing.rank / 2.0;
    }

    let bottom = y + spacing.rank / 2.0;
    for p in &diagram.participants {
        if let Some(&cx) = centers.get(p.id.as_str()) {
            elements.push(
                SkeletonElement::line(&[Point(cx, PARTICIPANT_HEIGHT), Point(cx, bottom)])
                    .with_stroke_style(StrokeStyle::Dashed)
                    .with_stroke_width(1.0),
            );
        }
    }
    elements.extend(arrows);
    SkeletonScene::new(elements)
}

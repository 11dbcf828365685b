//! Diagram-kind detection from the header line of a description.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    EntityRelationship,
    Journey,
    Gantt,
    Pie,
}

impl DiagramKind {
    /// The canonical header keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequenceDiagram",
            Self::Class => "classDiagram",
            Self::State => "stateDiagram",
            Self::EntityRelationship => "erDiagram",
            Self::Journey => "journey",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
        }
    }

    /// Whether descriptions of this kind can be converted to a scene.
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Gantt | Self::Pie)
    }
}

impl std::fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone)]
pub struct Detector {
    pub kind: DiagramKind,
    /// Lowercase substrings matched against the header token.
    pub keywords: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct DetectorRegistry {
    detectors: Vec<Detector>,
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        let mut reg = Self::new();

        // Unsupported kinds first, so a header naming one is never converted.
        reg.add(DiagramKind::Gantt, &["gantt"]);
        reg.add(DiagramKind::Pie, &["pie"]);

        reg.add(DiagramKind::Flowchart, &["flowchart", "graph"]);
        reg.add(DiagramKind::Sequence, &["sequencediagram"]);
        reg.add(DiagramKind::Class, &["classdiagram"]);
        reg.add(DiagramKind::State, &["statediagram"]);
        reg.add(DiagramKind::EntityRelationship, &["erdiagram"]);
        reg.add(DiagramKind::Journey, &["journey"]);
        reg
    }
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn add(&mut self, kind: DiagramKind, keywords: &'static [&'static str]) {
        self.detectors.push(Detector { kind, keywords });
    }

    /// Detects the kind from the header token, or `None` if no detector matches.
    pub fn detect(&self, text: &str) -> Option<DiagramKind> {
        let token = header_token(text)?.to_lowercase();
        self.detectors
            .iter()
            .find(|d| d.keywords.iter().any(|k| token.contains(k)))
            .map(|d| d.kind)
    }
}

/// Detects with the default registry.
pub fn detect_diagram_kind(text: &str) -> Option<DiagramKind> {
    DetectorRegistry::default().detect(text)
}

static FRONT_MATTER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*-{3}\s*[\n\r](.*?)[\n\r]-{3}\s*[\n\r]+"));

/// The text with a leading `---` front-matter block removed.
pub fn strip_front_matter(text: &str) -> std::borrow::Cow<'_, str> {
    match &*FRONT_MATTER {
        Ok(re) => re.replace(text, ""),
        Err(_) => std::borrow::Cow::Borrowed(text),
    }
}

/// The first line that is not blank, a `%%` comment or a `%%{...}%%` directive, trimmed.
pub fn header_line(text: &str) -> Option<&str> {
    let body = match strip_front_matter(text) {
        std::borrow::Cow::Borrowed(b) => b,
        // Front matter was removed; find the same body as a suffix of the input.
        std::borrow::Cow::Owned(owned) => {
            let offset = text.len().saturating_sub(owned.len());
            text.get(offset..).unwrap_or(text)
        }
    };
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("%%"))
}

/// The first word of the header line: `flowchart` in `flowchart LR; A-->B`.
pub fn header_token(text: &str) -> Option<&str> {
    header_line(text)?
        .split(|c: char| c.is_whitespace() || c == ';')
        .find(|t| !t.is_empty())
}

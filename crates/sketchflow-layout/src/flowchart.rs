//! `flowchart` / `graph` descriptions.
//!
//! Supported: a direction on the header, node shapes (`[]`, `()`, `(())`, `{}`, `{{}}`,
//! `([])`, `[[]]`, `[()]`, `>]`), chained links (`-->`, `---`, `-.->`, `==>`, `<-->`),
//! link labels (`-- text -->`, `-->|text|`) and `&` groups. Styling, class, click and
//! subgraph statements are accepted and ignored; nodes inside a subgraph join the main graph.

use crate::error::{Error, Result};
use crate::graph::{Direction, Edge, EdgeStroke, Graph, NodeShape};
use crate::lex::{Statement, clean_label, first_word, statements};

const IGNORED_KEYWORDS: &[&str] = &[
    "subgraph",
    "end",
    "classDef",
    "class",
    "style",
    "linkStyle",
    "click",
    "direction",
];

/// Open delimiter, close delimiter and shape. Longer openers come first.
const SHAPES: &[(&str, &str, NodeShape)] = &[
    ("(((", ")))", NodeShape::Circle),
    ("((", "))", NodeShape::Circle),
    ("([", "])", NodeShape::Stadium),
    ("[[", "]]", NodeShape::Subroutine),
    ("[(", ")]", NodeShape::Cylinder),
    ("{{", "}}", NodeShape::Hexagon),
    ("[", "]", NodeShape::Rect),
    ("(", ")", NodeShape::Rounded),
    ("{", "}", NodeShape::Diamond),
    (">", "]", NodeShape::Asymmetric),
];

pub fn parse_flowchart(text: &str) -> Result<Graph> {
    let stmts = statements(text, true);
    let Some((header, body)) = stmts.split_first() else {
        return Err(Error::parse(1, "empty flowchart"));
    };

    let (keyword, after) = split_word(header.text);
    if !matches!(keyword.to_ascii_lowercase().as_str(), "flowchart" | "graph") {
        return Err(Error::parse(
            header.line,
            format!("expected `flowchart` or `graph`, got `{keyword}`"),
        ));
    }
    let (token, rest) = split_word(after);
    let direction = if token.is_empty() {
        Direction::TopDown
    } else {
        Direction::parse(token)
            .ok_or_else(|| Error::parse(header.line, format!("unknown direction `{token}`")))?
    };

    let mut graph = Graph::new(direction);
    if !rest.is_empty() {
        parse_statement(
            &mut graph,
            Statement {
                line: header.line,
                text: rest,
            },
        )?;
    }
    for stmt in body {
        parse_statement(&mut graph, *stmt)?;
    }

    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        ?direction,
        "parsed flowchart"
    );
    Ok(graph)
}

fn parse_statement(graph: &mut Graph, stmt: Statement<'_>) -> Result<()> {
    if IGNORED_KEYWORDS.contains(&first_word(stmt.text)) {
        return Ok(());
    }

    let mut cur = Cursor {
        src: stmt.text,
        pos: 0,
        line: stmt.line,
    };
    let mut previous = cur.node_group(graph)?;
    loop {
        cur.skip_ws();
        if cur.at_end() {
            return Ok(());
        }
        let Some(link) = cur.link()? else {
            return Err(cur.unexpected());
        };
        let next = cur.node_group(graph)?;
        for from in &previous {
            for to in &next {
                graph.edges.push(Edge {
                    from: from.clone(),
                    to: to.clone(),
                    label: link.label.clone(),
                    stroke: link.stroke,
                    arrow_start: link.arrow_start,
                    arrow_end: link.arrow_end,
                });
            }
        }
        previous = next;
    }
}

struct Link {
    label: Option<String>,
    stroke: EdgeStroke,
    arrow_start: bool,
    arrow_end: bool,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(self.line, message)
    }

    fn unexpected(&self) -> Error {
        let near: String = self.rest().chars().take(16).collect();
        self.error(format!("unexpected `{near}`"))
    }

    /// `node ('&' node)*`, returning the node ids.
    fn node_group(&mut self, graph: &mut Graph) -> Result<Vec<String>> {
        let mut ids = vec![self.node(graph)?];
        loop {
            self.skip_ws();
            if !self.eat("&") {
                return Ok(ids);
            }
            ids.push(self.node(graph)?);
        }
    }

    fn node(&mut self, graph: &mut Graph) -> Result<String> {
        self.skip_ws();
        let rest = self.rest();
        let id_len: usize = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        if id_len == 0 {
            return Err(if self.at_end() {
                self.error("expected a node after the link")
            } else {
                self.unexpected()
            });
        }
        let id = rest[..id_len].to_string();
        self.pos += id_len;

        match self.shape()? {
            Some((label, shape)) => graph.upsert_node(&id, Some(&label), shape),
            None => graph.upsert_node(&id, None, NodeShape::Rect),
        }

        if self.eat(":::") {
            let rest = self.rest();
            let class_len = rest
                .char_indices()
                .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '-'))
                .map_or(rest.len(), |(i, _)| i);
            self.pos += class_len;
        }
        Ok(id)
    }

    fn shape(&mut self) -> Result<Option<(String, NodeShape)>> {
        for (open, close, shape) in SHAPES {
            if !self.rest().starts_with(open) {
                continue;
            }
            self.pos += open.len();
            let rest = self.rest();
            let (label, consumed) = if let Some(quoted) = rest.strip_prefix('"') {
                let end = quoted
                    .find('"')
                    .ok_or_else(|| self.error("unterminated quoted label"))?;
                let after = &quoted[end + 1..];
                let trailing = after.len() - after.trim_start().len();
                if !after.trim_start().starts_with(close) {
                    return Err(self.error(format!("expected `{close}` after quoted label")));
                }
                (&quoted[..end], 1 + end + 1 + trailing + close.len())
            } else {
                let end = rest
                    .find(close)
                    .ok_or_else(|| self.error(format!("missing `{close}` to close `{open}`")))?;
                (&rest[..end], end + close.len())
            };
            let label = clean_label(label);
            self.pos += consumed;
            return Ok(Some((label, *shape)));
        }
        Ok(None)
    }

    /// A link operator with its optional inline or piped label.
    fn link(&mut self) -> Result<Option<Link>> {
        let op = self.run();
        if op.is_empty() {
            return Ok(None);
        }
        let body = op.trim_start_matches('<').trim_end_matches('>');
        if body.len() < 2 {
            return Err(self.error(format!("invalid link `{op}`")));
        }

        let mut label = None;
        let mut full = op.to_string();
        let complete = op.ends_with('>') || body.len() >= 3;
        if !complete {
            // `-- text -->`: the label runs up to the closing operator.
            let rest = self.rest();
            let end = find_closing(rest).ok_or_else(|| self.error("unterminated link label"))?;
            label = Some(clean_label(&rest[..end]));
            self.pos += end;
            full.push_str(self.run());
        }

        self.skip_ws();
        if self.eat("|") {
            let rest = self.rest();
            let end = rest
                .find('|')
                .ok_or_else(|| self.error("unterminated `|` link label"))?;
            label = Some(clean_label(&rest[..end]));
            self.pos += end + 1;
        }

        let stroke = if full.contains('.') {
            EdgeStroke::Dotted
        } else if full.contains('=') {
            EdgeStroke::Thick
        } else {
            EdgeStroke::Solid
        };
        Ok(Some(Link {
            label: label.filter(|l| !l.trim().is_empty()),
            stroke,
            arrow_start: full.starts_with('<'),
            arrow_end: full.ends_with('>'),
        }))
    }

    /// Consumes a run of link characters.
    fn run(&mut self) -> &'a str {
        let rest = self.rest();
        let starts = rest.starts_with(['-', '=', '<', '.']);
        if !starts {
            return "";
        }
        let len = rest
            .char_indices()
            .find(|(_, c)| !matches!(c, '-' | '=' | '.' | '<' | '>'))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }
}

/// The first word and the trimmed remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], s[end..].trim_start())
}

/// Offset of the operator closing an inline label: `--`, `==` or `.-`.
fn find_closing(rest: &str) -> Option<usize> {
    rest.char_indices()
        .map(|(i, _)| i)
        .find(|&i| {
            let tail = &rest[i..];
            tail.starts_with("--") || tail.starts_with("==") || tail.starts_with(".-")
        })
}

//! Source positions for failure locations.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 1-based line and column in a source document. `(0, 0)` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

/// Maps an instance location (JSON pointer) to a position in the source text.
///
/// Implementations never fail; an unresolvable location is `Position::default()`.
pub trait PositionResolver: Send + Sync {
    fn locate(&self, instance_location: &str, source: &str) -> Position;
}

/// Best-effort resolver for block-style YAML.
///
/// Walks the pointer one segment at a time, narrowing the scope to the lines
/// indented under the matched key or sequence item.
#[derive(Debug, Clone)]
pub struct YamlPositionResolver {
    key_pattern: Option<Regex>,
}

impl Default for YamlPositionResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    text: &'a str,
}

impl YamlPositionResolver {
    pub fn new() -> Self {
        Self {
            key_pattern: Regex::new(r#"^(?:"([^"]*)"|'([^']*)'|([^\s"'#][^:#]*?))\s*:(?:\s|$)"#).ok(),
        }
    }

    fn key_of<'a>(&self, text: &'a str) -> Option<(&'a str, &'a str)> {
        let captures = self.key_pattern.as_ref()?.captures(text)?;
        let key = captures
            .get(1)
            .or_else(|| captures.get(2))
            .or_else(|| captures.get(3))?;
        let rest = &text[captures.get(0)?.end()..];
        Some((key.as_str(), rest.trim()))
    }

    fn find_key<'a>(&self, scope: &[Line<'a>], key: &str) -> Option<(Line<'a>, Vec<Line<'a>>)> {
        let base = scope.first()?.indent;

        for (i, line) in scope.iter().enumerate() {
            if line.indent != base {
                continue;
            }
            let Some((candidate, _)) = self.key_of(line.text) else {
                continue;
            };
            if candidate != key {
                continue;
            }
            let children = scope[i + 1..]
                .iter()
                .take_while(|l| l.indent > base || (l.indent == base && is_item(l.text)))
                .copied()
                .collect();
            return Some((*line, children));
        }
        None
    }

    fn find_index<'a>(&self, scope: &[Line<'a>], index: usize) -> Option<(Line<'a>, Vec<Line<'a>>)> {
        let base = scope.first()?.indent;

        let (i, line) = scope
            .iter()
            .enumerate()
            .filter(|(_, l)| l.indent == base && is_item(l.text))
            .nth(index)?;

        let mut children = Vec::new();
        let inline = line.text[1..].trim_start();
        if !inline.is_empty() {
            children.push(Line {
                number: line.number,
                indent: line.indent + (line.text.len() - inline.len()),
                text: inline,
            });
        }
        children.extend(scope[i + 1..].iter().take_while(|l| l.indent > base).copied());
        Some((*line, children))
    }
}

impl PositionResolver for YamlPositionResolver {
    fn locate(&self, instance_location: &str, source: &str) -> Position {
        let mut scope: Vec<Line<'_>> = content_lines(source);
        let Some(first) = scope.first() else {
            return Position::default();
        };
        let mut position = Position::new(first.number, first.indent + 1);

        for segment in pointer_segments(instance_location) {
            let found = match segment.parse::<usize>() {
                Ok(index) if scope.first().is_some_and(|l| is_item(l.text)) => {
                    self.find_index(&scope, index)
                }
                _ => self.find_key(&scope, &segment),
            };

            match found {
                Some((line, children)) => {
                    position = Position::new(line.number, line.indent + 1);
                    scope = children;
                }
                None => {
                    debug!("Could not locate '{}' in source", instance_location);
                    return Position::default();
                }
            }
        }

        position
    }
}

fn is_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

fn content_lines(source: &str) -> Vec<Line<'_>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let text = raw.trim_start();
            let skip = text.is_empty() || text.starts_with('#') || text.starts_with("---");
            (!skip).then(|| Line {
                number: i + 1,
                indent: raw.len() - text.len(),
                text: text.trim_end(),
            })
        })
        .collect()
}

fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

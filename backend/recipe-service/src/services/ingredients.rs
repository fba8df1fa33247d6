//! Ingredient field normalization.
//!
//! Corpus ingredient fields arrive in whatever shape the upstream dataset
//! used: plain comma lists, JSON arrays/objects, or quasi-Python literals
//! with single quotes and trailing commas. Parsing falls through an ordered
//! chain (strict JSON → lenient literal → quote-aware splitter); the worst
//! case is an empty set, never an error.

use std::collections::HashSet;

/// Parse a raw ingredient field into a canonical set of lowercase,
/// whitespace-collapsed tokens.
pub fn normalize_field(raw: &str) -> HashSet<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return HashSet::new();
    }

    // Strict structured parse first. This also maps the literal string
    // "null" to an empty set.
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return normalize_all(flatten_json(value));
    }

    if is_bracketed(trimmed) {
        if let Some(items) = parse_lenient(trimmed) {
            return normalize_all(items);
        }
    }

    normalize_all(split_quote_aware(strip_brackets(trimmed)))
}

/// Normalize the user's query ingredient list into the same token space.
pub fn normalize_query(ingredients: &[String]) -> HashSet<String> {
    ingredients
        .iter()
        .filter_map(|ing| normalize_token(ing))
        .collect()
}

/// Lowercase, collapse internal whitespace, trim surrounding quotes and
/// whitespace. `None` when nothing survives.
pub fn normalize_token(token: &str) -> Option<String> {
    let trimmed = token.trim_matches(|c: char| c == '\'' || c == '"' || c.is_whitespace());
    let collapsed = trimmed
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn normalize_all(items: Vec<String>) -> HashSet<String> {
    items.iter().filter_map(|s| normalize_token(s)).collect()
}

fn is_bracketed(s: &str) -> bool {
    (s.starts_with('[') && s.ends_with(']')) || (s.starts_with('{') && s.ends_with('}'))
}

fn strip_brackets(s: &str) -> &str {
    if is_bracketed(s) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Flatten a parsed JSON value into a flat list of strings: mappings
/// contribute their values, scalars wrap into a single element, `null`
/// contributes nothing. Numbers and booleans are stringified.
fn flatten_json(value: serde_json::Value) -> Vec<String> {
    use serde_json::Value;
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s],
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Array(items) => items.into_iter().flat_map(flatten_json).collect(),
        Value::Object(map) => map.into_values().flat_map(flatten_json).collect(),
    }
}

/// Lenient list/dict literal parser. Accepts single-quoted strings,
/// unquoted bare words and trailing commas; rejects anything it cannot
/// account for so the caller can fall through to the splitter.
fn parse_lenient(input: &str) -> Option<Vec<String>> {
    let mut parser = Lenient {
        chars: input.char_indices().peekable(),
        input,
    };
    let items = parser.parse_container()?;
    parser.skip_ws();
    if parser.chars.next().is_some() {
        return None;
    }
    Some(items)
}

struct Lenient<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl<'a> Lenient<'a> {
    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse_container(&mut self) -> Option<Vec<String>> {
        self.skip_ws();
        let (_, open) = self.chars.next()?;
        let close = match open {
            '[' => ']',
            '{' => '}',
            _ => return None,
        };

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some((_, c)) if *c == close => {
                    self.chars.next();
                    return Some(items);
                }
                Some(_) => {}
                None => return None,
            }

            let mut value = self.parse_value(close)?;

            // Dict entry: the parsed value was the key, the value follows.
            self.skip_ws();
            if matches!(self.chars.peek(), Some((_, ':'))) {
                self.chars.next();
                value = self.parse_value(close)?;
            }
            items.extend(value);

            self.skip_ws();
            match self.chars.peek() {
                Some((_, ',')) => {
                    self.chars.next();
                }
                Some((_, c)) if *c == close => {}
                _ => return None,
            }
        }
    }

    fn parse_value(&mut self, close: char) -> Option<Vec<String>> {
        self.skip_ws();
        match self.chars.peek().copied() {
            Some((_, '[')) | Some((_, '{')) => self.parse_container(),
            Some((_, q)) if q == '\'' || q == '"' => {
                self.chars.next();
                let start = self.chars.peek().map(|(i, _)| *i)?;
                loop {
                    match self.chars.next() {
                        Some((i, c)) if c == q => {
                            return Some(vec![self.input[start..i].to_string()]);
                        }
                        Some(_) => {}
                        None => return None,
                    }
                }
            }
            Some((start, _)) => {
                // Bare word: runs until a delimiter.
                let mut end = self.input.len();
                while let Some((i, c)) = self.chars.peek().copied() {
                    if c == ',' || c == ':' || c == close {
                        end = i;
                        break;
                    }
                    self.chars.next();
                }
                let word = self.input[start..end].trim();
                if word.is_empty() {
                    Some(Vec::new())
                } else {
                    Some(vec![word.to_string()])
                }
            }
            None => None,
        }
    }
}

/// Fallback comma splitter: split on commas only when outside quoted
/// substrings (toggling on either quote character).
fn split_quote_aware(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in s.chars() {
        match c {
            '\'' | '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                items.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        items.push(current);
    }
    items
}

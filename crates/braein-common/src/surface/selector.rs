//! Simple CSS selector matching for surfaces without a native engine
//!
//! Supports compound selectors (`button[type="submit"]`, `.nav__link`,
//! `#contact-form`, `a[href^="#"]`) and comma lists. Combinators are not
//! supported; use [`RenderSurface::query_within`](super::RenderSurface::query_within)
//! for scoping.

use thiserror::Error;

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unsupported character {0:?} in selector")]
    Unsupported(char),

    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
}

/// Element data a selector is tested against
pub trait Matchable {
    fn tag(&self) -> &str;
    fn has_class(&self, class: &str) -> bool;
    fn attr(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.op, el.attr(&a.name)) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(v), Some(actual)) => actual == v,
            (AttrOp::Prefix(v), Some(actual)) => actual.starts_with(v.as_str()),
        })
    }
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Parse a comma separated list of compound selectors
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let alternatives = input
            .split(',')
            .map(|part| parse_compound(part.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    /// True if any alternative matches `el`
    pub fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(input: &str) -> Result<Compound, SelectorError> {
    if input.is_empty() {
        return Err(SelectorError::Empty);
    }

    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    while pos < chars.len() {
        match chars[pos] {
            '*' => pos += 1,
            '#' => {
                pos += 1;
                compound.id = Some(take_ident(&chars, &mut pos));
            }
            '.' => {
                pos += 1;
                compound.classes.push(take_ident(&chars, &mut pos));
            }
            '[' => {
                pos += 1;
                let close = chars[pos..]
                    .iter()
                    .position(|&c| c == ']')
                    .ok_or(SelectorError::UnterminatedAttribute)?;
                let body: String = chars[pos..pos + close].iter().collect();
                compound.attrs.push(parse_attr(&body));
                pos += close + 1;
            }
            c if is_ident(c) => {
                compound.tag = Some(take_ident(&chars, &mut pos).to_ascii_lowercase());
            }
            c => return Err(SelectorError::Unsupported(c)),
        }
    }

    Ok(compound)
}

fn parse_attr(body: &str) -> AttrMatch {
    let unquote = |v: &str| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string();

    if let Some((name, value)) = body.split_once("^=") {
        AttrMatch {
            name: name.trim().to_string(),
            op: AttrOp::Prefix(unquote(value)),
        }
    } else if let Some((name, value)) = body.split_once('=') {
        AttrMatch {
            name: name.trim().to_string(),
            op: AttrOp::Equals(unquote(value)),
        }
    } else {
        AttrMatch {
            name: body.trim().to_string(),
            op: AttrOp::Exists,
        }
    }
}

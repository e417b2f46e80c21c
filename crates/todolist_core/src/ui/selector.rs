//! Minimal selector parser and matcher.
//!
//! Supports compounds of `tag`, `.class` and `[attr]` / `[attr=value]`,
//! joined by whitespace as descendant chains (e.g. `.btn-group button`).

use crate::ui::tree::{NodeId, UiError, UiResult, UiTree};
use once_cell::sync::Lazy;
use regex::Regex;

static COMPOUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^([A-Za-z][\w-]*)?((?:\.[\w-]+|\[[\w-]+(?:=[^\]]*)?\])*)$"#)
        .expect("valid compound regex")
});
static PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.([\w-]+)|\[([\w-]+)(?:=([^\]]*))?\]"#).expect("valid part regex")
});

/// Parsed selector: a descendant chain of compounds, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    chain: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Parses one selector string.
    ///
    /// # Errors
    /// - `InvalidSelector` when the input is blank or uses unsupported syntax.
    pub fn parse(input: &str) -> UiResult<Self> {
        let chain = input
            .split_whitespace()
            .map(|part| parse_compound(part).ok_or_else(|| UiError::InvalidSelector(input.into())))
            .collect::<UiResult<Vec<_>>>()?;
        if chain.is_empty() {
            return Err(UiError::InvalidSelector(input.to_string()));
        }
        Ok(Self { chain })
    }

    /// Returns whether `node` matches, with ancestors resolved anywhere above it.
    pub fn matches(&self, tree: &UiTree, node: NodeId) -> bool {
        let Some((last, rest)) = self.chain.split_last() else {
            return false;
        };
        if !last.matches(tree, node) {
            return false;
        }

        let mut pending = rest.iter().rev().peekable();
        let mut cursor = tree.parent(node);
        while let Some(compound) = pending.peek() {
            let Some(current) = cursor else {
                return false;
            };
            if compound.matches(tree, current) {
                pending.next();
            }
            cursor = tree.parent(current);
        }
        true
    }
}

impl Compound {
    fn matches(&self, tree: &UiTree, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if !tree.tag(node).is_some_and(|value| value.eq_ignore_ascii_case(tag)) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| tree.has_class(node, class)) {
            return false;
        }
        self.attrs.iter().all(|(name, expected)| {
            match (tree.attr(node, name), expected.as_deref()) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

fn parse_compound(input: &str) -> Option<Compound> {
    let captures = COMPOUND_RE.captures(input)?;
    let mut compound = Compound {
        tag: captures.get(1).map(|tag| tag.as_str().to_ascii_lowercase()),
        ..Compound::default()
    };

    let parts = captures.get(2).map_or("", |parts| parts.as_str());
    for part in PART_RE.captures_iter(parts) {
        if let Some(class) = part.get(1) {
            compound.classes.push(class.as_str().to_string());
        } else if let Some(name) = part.get(2) {
            let value = part.get(3).map(|value| unquote(value.as_str()).to_string());
            compound.attrs.push((name.as_str().to_string(), value));
        }
    }

    if compound.tag.is_none() && compound.classes.is_empty() && compound.attrs.is_empty() {
        return None;
    }
    Some(compound)
}

fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::Selector;
    use crate::ui::tree::{UiError, UiTree};

    #[test]
    fn parses_compound_with_quoted_attr() {
        let mut tree = UiTree::new();
        let input = tree.create_element("input", &[("name", Some("title")), ("class", Some("a b"))]);

        let selector = Selector::parse(r#"input.a[name="title"]"#).expect("valid selector");
        assert!(selector.matches(&tree, input));
        let other = Selector::parse("input[name=other]").expect("valid selector");
        assert!(!other.matches(&tree, input));
    }

    #[test]
    fn descendant_chain_requires_ancestor() {
        let mut tree = UiTree::new();
        let group = tree.create_element("div", &[("class", Some("btn-group"))]);
        let inside = tree.create_element("button", &[]);
        let outside = tree.create_element("button", &[]);
        tree.append(group, inside).expect("append");

        let selector = Selector::parse(".btn-group button").expect("valid selector");
        assert!(selector.matches(&tree, inside));
        assert!(!selector.matches(&tree, outside));
    }

    #[test]
    fn rejects_blank_and_unsupported_selectors() {
        assert!(matches!(
            Selector::parse("  "),
            Err(UiError::InvalidSelector(_))
        ));
        assert!(matches!(
            Selector::parse("div > span"),
            Err(UiError::InvalidSelector(_))
        ));
    }
}

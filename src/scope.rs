use std::sync::LazyLock;

use fancy_regex::Regex;

/// `&`, optional whitespace, then an optional combinator character.
static SELF_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*&(\s*)([>+~]?)").expect("self-prefix pattern is a valid literal regex")
});

/// A selector string split into its self-reference flag and residual text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSelector {
    pub is_self: bool,
    pub selector: String,
}

/// Combinator joining the reference element to the residual of `&>`, `&+` or `&~`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Child,
    NextSibling,
    SubsequentSibling,
}

impl Axis {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            _ => None,
        }
    }

    /// The combinator as written between two compound selectors.
    pub fn combinator(self) -> &'static str {
        match self {
            Self::Child => ">",
            Self::NextSibling => "+",
            Self::SubsequentSibling => "~",
        }
    }
}

/// Classified form of a selector string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfSelector {
    /// `&`
    Itself,
    /// `& sel`
    Descendant(String),
    /// `&>sel`, `&+sel`, `&~sel`
    Combinator(Axis, String),
    /// Any other string, trimmed.
    Absolute(String),
}

struct SelfPrefix {
    gap: bool,
    axis: Option<char>,
    end: usize,
}

fn match_self_prefix(selector: &str) -> Option<SelfPrefix> {
    // The pattern has no backtracking constructs, so matching cannot fail at runtime.
    let caps = SELF_PREFIX.captures(selector).ok().flatten()?;
    let whole = caps.get(0)?;
    let gap = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    let axis = caps.get(2).and_then(|m| m.as_str().chars().next());
    Some(SelfPrefix {
        gap,
        axis,
        end: whole.end(),
    })
}

/// Splits `selector` into `(is_self, residual)`.
///
/// Only the bare `&` and the child form `&>sel` count as self references here;
/// [`classify_selector`] understands the full grammar.
pub fn parse_string_selector(selector: &str) -> StringSelector {
    let trimmed = selector.trim();
    if trimmed == "&" {
        return StringSelector {
            is_self: true,
            selector: String::new(),
        };
    }

    if let Some(prefix) = match_self_prefix(selector) {
        if prefix.axis == Some('>') {
            return StringSelector {
                is_self: true,
                selector: selector[prefix.end..].trim().to_string(),
            };
        }
    }

    StringSelector {
        is_self: false,
        selector: trimmed.to_string(),
    }
}

/// Classifies `selector` by its prefix alone. The tree is never consulted.
///
/// `&` followed directly by anything other than whitespace or a combinator
/// (for example `&.active`) is not a self reference and stays absolute.
/// A combinator with nothing after it (`&>`) collapses to [`SelfSelector::Itself`].
pub fn classify_selector(selector: &str) -> SelfSelector {
    let trimmed = selector.trim();
    if trimmed == "&" {
        return SelfSelector::Itself;
    }

    let Some(prefix) = match_self_prefix(selector) else {
        return SelfSelector::Absolute(trimmed.to_string());
    };
    let rest = selector[prefix.end..].trim();

    match prefix.axis.and_then(Axis::from_char) {
        Some(_) if rest.is_empty() => SelfSelector::Itself,
        Some(axis) => SelfSelector::Combinator(axis, rest.to_string()),
        None if prefix.gap && !rest.is_empty() => SelfSelector::Descendant(rest.to_string()),
        None => SelfSelector::Absolute(trimmed.to_string()),
    }
}

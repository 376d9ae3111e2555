use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
    Includes { key: String, value: String },
    DashMatch { key: String, value: String },
}

impl SelectorAttrCondition {
    pub(crate) fn key(&self) -> &str {
        match self {
            Self::Exists { key }
            | Self::Eq { key, .. }
            | Self::StartsWith { key, .. }
            | Self::EndsWith { key, .. }
            | Self::Contains { key, .. }
            | Self::Includes { key, .. }
            | Self::DashMatch { key, .. } => key,
        }
    }

    pub(crate) fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self {
            Self::Exists { .. } => true,
            Self::Eq { value, .. } => actual == value,
            Self::StartsWith { value, .. } => !value.is_empty() && actual.starts_with(value),
            Self::EndsWith { value, .. } => !value.is_empty() && actual.ends_with(value),
            Self::Contains { value, .. } => !value.is_empty() && actual.contains(value.as_str()),
            Self::Includes { value, .. } => actual.split_whitespace().any(|token| token == value),
            Self::DashMatch { value, .. } => {
                actual == value
                    || actual
                        .strip_prefix(value.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorPseudoClass {
    Root,
    FirstChild,
    LastChild,
    FirstOfType,
    LastOfType,
    OnlyChild,
    OnlyOfType,
    Empty,
    NthChild(NthChildSelector),
    NthLastChild(NthChildSelector),
    NthOfType(NthChildSelector),
    NthLastOfType(NthChildSelector),
    Not(Vec<Vec<SelectorPart>>),
    Is(Vec<Vec<SelectorPart>>),
    Where(Vec<Vec<SelectorPart>>),
    Has(Vec<Vec<SelectorPart>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NthChildSelector {
    Exact(usize),
    Odd,
    Even,
    AnPlusB(i64, i64),
}

impl NthChildSelector {
    /// `index` is 1-based.
    pub(crate) fn matches_index(&self, index: usize) -> bool {
        match self {
            Self::Exact(expected) => index == *expected,
            Self::Odd => index % 2 == 1,
            Self::Even => index % 2 == 0,
            Self::AnPlusB(a, b) => {
                let diff = index as i64 - *b;
                if *a == 0 {
                    return diff == 0;
                }
                diff % *a == 0 && (diff / *a) >= 0
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
    pub(crate) pseudo_classes: Vec<SelectorPseudoClass>,
}

impl SelectorStep {
    pub(crate) fn id_only(&self) -> Option<&str> {
        if !self.universal
            && self.tag.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && !self.universal
            && self.pseudo_classes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to previous (left) selector part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    let groups = split_selector_groups(selector)?;
    let mut parsed = Vec::with_capacity(groups.len());
    for group in groups {
        parsed.push(parse_selector_chain(&group)?);
    }
    Ok(parsed)
}

pub(crate) fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let tokens = tokenize_selector(selector)?;
    let mut steps = Vec::new();
    let mut pending_combinator: Option<SelectorCombinator> = None;

    for token in tokens {
        let combinator = match token.as_str() {
            ">" => Some(SelectorCombinator::Child),
            "+" => Some(SelectorCombinator::AdjacentSibling),
            "~" => Some(SelectorCombinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending_combinator.is_some() || steps.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(combinator);
            continue;
        }

        let step = parse_selector_step(&token)?;
        let combinator = if steps.is_empty() {
            None
        } else {
            Some(
                pending_combinator
                    .take()
                    .unwrap_or(SelectorCombinator::Descendant),
            )
        };
        steps.push(SelectorPart { step, combinator });
    }

    if steps.is_empty() || pending_combinator.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    Ok(steps)
}

/// Splits a selector list on top-level commas.
pub(crate) fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut depth = NestingDepth::default();

    for ch in selector.chars() {
        if !depth.track(ch) {
            return Err(Error::UnsupportedSelector(selector.into()));
        }
        if ch == ',' && depth.is_top_level() {
            let trimmed = current.trim();
            if trimmed.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            groups.push(trimmed.to_string());
            current.clear();
            continue;
        }
        current.push(ch);
    }

    if !depth.is_top_level() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

pub(crate) fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = NestingDepth::default();

    for ch in selector.chars() {
        if !depth.track(ch) {
            return Err(Error::UnsupportedSelector(selector.into()));
        }
        if depth.is_top_level() {
            match ch {
                '>' | '+' | '~' => {
                    flush_token(&mut tokens, &mut current);
                    tokens.push(ch.to_string());
                    continue;
                }
                ch if ch.is_ascii_whitespace() => {
                    flush_token(&mut tokens, &mut current);
                    continue;
                }
                _ => {}
            }
        }
        current.push(ch);
    }

    if !depth.is_top_level() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    flush_token(&mut tokens, &mut current);
    Ok(tokens)
}

fn flush_token(tokens: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        tokens.push(trimmed.to_string());
    }
    current.clear();
}

#[derive(Debug, Default)]
struct NestingDepth {
    brackets: usize,
    parens: usize,
    quote: Option<char>,
    escaped: bool,
}

impl NestingDepth {
    /// Returns `false` on an unbalanced closing bracket or paren.
    fn track(&mut self, ch: char) -> bool {
        if let Some(quote) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == quote {
                self.quote = None;
            }
            return true;
        }
        match ch {
            '"' | '\'' if self.brackets > 0 => self.quote = Some(ch),
            '[' => self.brackets += 1,
            ']' => {
                let Some(next) = self.brackets.checked_sub(1) else {
                    return false;
                };
                self.brackets = next;
            }
            '(' => self.parens += 1,
            ')' => {
                let Some(next) = self.parens.checked_sub(1) else {
                    return false;
                };
                self.parens = next;
            }
            _ => {}
        }
        true
    }

    fn is_top_level(&self) -> bool {
        self.brackets == 0 && self.parens == 0 && self.quote.is_none()
    }
}

pub(crate) fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let part = part.trim();
    if part.is_empty() {
        return Err(Error::UnsupportedSelector(part.into()));
    }

    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal || step.tag.is_some() || i != 0 {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let Some((id, next)) = parse_selector_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                if step.id.replace(id).is_some() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                i = next;
            }
            b'.' => {
                let Some((class_name, next)) = parse_selector_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (attr, next) = parse_selector_attr_condition(part, i)?;
                step.attrs.push(attr);
                i = next;
            }
            b':' => {
                let (pseudo, next) = parse_selector_pseudo(part, i)?;
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => {
                if i != 0 {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                let Some((tag, next)) = parse_selector_ident(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if step.is_empty() {
        return Err(Error::UnsupportedSelector(part.into()));
    }
    Ok(step)
}

const KEYWORD_PSEUDO_CLASSES: &[(&str, SelectorPseudoClass)] = &[
    ("root", SelectorPseudoClass::Root),
    ("first-child", SelectorPseudoClass::FirstChild),
    ("last-child", SelectorPseudoClass::LastChild),
    ("first-of-type", SelectorPseudoClass::FirstOfType),
    ("last-of-type", SelectorPseudoClass::LastOfType),
    ("only-child", SelectorPseudoClass::OnlyChild),
    ("only-of-type", SelectorPseudoClass::OnlyOfType),
    ("empty", SelectorPseudoClass::Empty),
];

fn parse_selector_pseudo(part: &str, start: usize) -> Result<(SelectorPseudoClass, usize)> {
    let unsupported = || Error::UnsupportedSelector(part.into());
    let name_start = start + 1;
    let Some((name, after_name)) = parse_selector_ident(part, name_start) else {
        return Err(unsupported());
    };
    let name = name.to_ascii_lowercase();

    if part.as_bytes().get(after_name) != Some(&b'(') {
        let pseudo = KEYWORD_PSEUDO_CLASSES
            .iter()
            .find(|(keyword, _)| *keyword == name)
            .map(|(_, pseudo)| pseudo.clone())
            .ok_or_else(unsupported)?;
        return Ok((pseudo, after_name));
    }

    let body_start = after_name + 1;
    let close_pos = part
        .get(body_start..)
        .and_then(find_matching_paren)
        .ok_or_else(unsupported)?;
    let body = part[body_start..body_start + close_pos].trim();
    if body.is_empty() {
        return Err(unsupported());
    }
    let next = body_start + close_pos + 1;

    let pseudo = match name.as_str() {
        "nth-child" => SelectorPseudoClass::NthChild(parse_nth_child_selector(body).ok_or_else(unsupported)?),
        "nth-last-child" => {
            SelectorPseudoClass::NthLastChild(parse_nth_child_selector(body).ok_or_else(unsupported)?)
        }
        "nth-of-type" => SelectorPseudoClass::NthOfType(parse_nth_child_selector(body).ok_or_else(unsupported)?),
        "nth-last-of-type" => {
            SelectorPseudoClass::NthLastOfType(parse_nth_child_selector(body).ok_or_else(unsupported)?)
        }
        "not" => SelectorPseudoClass::Not(parse_selector_groups(body)?),
        "is" => SelectorPseudoClass::Is(parse_selector_groups(body)?),
        "where" => SelectorPseudoClass::Where(parse_selector_groups(body)?),
        "has" => SelectorPseudoClass::Has(parse_selector_groups(body)?),
        _ => return Err(unsupported()),
    };
    Ok((pseudo, next))
}

/// Offset of the `)` closing a body that starts just after its `(`.
pub(crate) fn find_matching_paren(body: &str) -> Option<usize> {
    let mut paren_depth = 1usize;
    let mut bracket_depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (idx, b) in body.bytes().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }

        match b {
            b'\'' | b'"' => quote = Some(b),
            b'[' => bracket_depth += 1,
            b']' => bracket_depth = bracket_depth.checked_sub(1)?,
            b'(' if bracket_depth == 0 => paren_depth += 1,
            b')' if bracket_depth == 0 => {
                paren_depth = paren_depth.checked_sub(1)?;
                if paren_depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

pub(crate) fn parse_nth_child_selector(raw: &str) -> Option<NthChildSelector> {
    let compact = raw
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.as_str() {
        "" => None,
        "odd" => Some(NthChildSelector::Odd),
        "even" => Some(NthChildSelector::Even),
        other if other.contains('n') => parse_nth_child_expression(other),
        other if other.starts_with(['+', '-']) => None,
        other => match other.parse::<usize>().ok()? {
            0 => None,
            value => Some(NthChildSelector::Exact(value)),
        },
    }
}

fn parse_nth_child_expression(expr: &str) -> Option<NthChildSelector> {
    if expr.matches('n').count() != 1 {
        return None;
    }

    let (a_part, rest) = expr.split_at(expr.find('n')?);
    let b_part = &rest[1..];

    let a = match a_part {
        "" | "+" => 1,
        "-" => -1,
        _ => a_part.parse::<i64>().ok()?,
    };

    if b_part.is_empty() {
        return Some(NthChildSelector::AnPlusB(a, 0));
    }

    let (sign, raw_b) = if let Some(rest) = b_part.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = b_part.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    if raw_b.is_empty() || raw_b.starts_with(['+', '-']) {
        return None;
    }
    let b = raw_b.parse::<i64>().ok()?;
    Some(NthChildSelector::AnPlusB(a, b * sign))
}

pub(crate) fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() || !is_selector_ident_char(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_selector_ident_char(bytes[end]) {
        end += 1;
    }
    Some((src.get(start..end)?.to_string(), end))
}

pub(crate) fn is_selector_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || !b.is_ascii()
}

fn is_selector_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':'
}

fn parse_selector_attr_condition(
    src: &str,
    open_bracket: usize,
) -> Result<(SelectorAttrCondition, usize)> {
    let unsupported = || Error::UnsupportedSelector(src.into());
    let bytes = src.as_bytes();
    let mut i = skip_ascii_whitespace(bytes, open_bracket + 1);

    let key_start = i;
    while i < bytes.len() && is_selector_attr_name_char(bytes[i]) {
        i += 1;
    }
    if key_start == i {
        return Err(unsupported());
    }
    let key = src[key_start..i].to_ascii_lowercase();

    i = skip_ascii_whitespace(bytes, i);
    match bytes.get(i) {
        None => return Err(unsupported()),
        Some(b']') => return Ok((SelectorAttrCondition::Exists { key }, i + 1)),
        Some(_) => {}
    }

    let (op, after_op) = match (bytes.get(i), bytes.get(i + 1)) {
        (Some(b'='), _) => (AttrOperator::Eq, i + 1),
        (Some(b'^'), Some(b'=')) => (AttrOperator::StartsWith, i + 2),
        (Some(b'$'), Some(b'=')) => (AttrOperator::EndsWith, i + 2),
        (Some(b'*'), Some(b'=')) => (AttrOperator::Contains, i + 2),
        (Some(b'~'), Some(b'=')) => (AttrOperator::Includes, i + 2),
        (Some(b'|'), Some(b'=')) => (AttrOperator::DashMatch, i + 2),
        _ => return Err(unsupported()),
    };

    i = skip_ascii_whitespace(bytes, after_op);
    let (value, after_value) = parse_selector_attr_value(src, i)?;
    i = skip_ascii_whitespace(bytes, after_value);
    if bytes.get(i) != Some(&b']') {
        return Err(unsupported());
    }

    let cond = match op {
        AttrOperator::Eq => SelectorAttrCondition::Eq { key, value },
        AttrOperator::StartsWith => SelectorAttrCondition::StartsWith { key, value },
        AttrOperator::EndsWith => SelectorAttrCondition::EndsWith { key, value },
        AttrOperator::Contains => SelectorAttrCondition::Contains { key, value },
        AttrOperator::Includes => SelectorAttrCondition::Includes { key, value },
        AttrOperator::DashMatch => SelectorAttrCondition::DashMatch { key, value },
    };
    Ok((cond, i + 1))
}

#[derive(Debug, Clone, Copy)]
enum AttrOperator {
    Eq,
    StartsWith,
    EndsWith,
    Contains,
    Includes,
    DashMatch,
}

fn skip_ascii_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn parse_selector_attr_value(src: &str, start: usize) -> Result<(String, usize)> {
    let unsupported = || Error::UnsupportedSelector(src.into());
    let bytes = src.as_bytes();
    let Some(&first) = bytes.get(start) else {
        return Err(unsupported());
    };

    if first == b'"' || first == b'\'' {
        let mut i = start + 1;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                i = (i + 2).min(bytes.len());
                continue;
            }
            if bytes[i] == first {
                let raw = src.get(start + 1..i).ok_or_else(unsupported)?;
                return Ok((unescape_selector_value(raw), i + 1));
            }
            i += 1;
        }
        return Err(unsupported());
    }

    let mut i = start;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b']' {
        i += if bytes[i] == b'\\' { 2 } else { 1 };
    }
    let i = i.min(bytes.len());
    if i == start {
        return Err(unsupported());
    }
    let raw = src.get(start..i).ok_or_else(unsupported)?;
    Ok((unescape_selector_value(raw), i))
}

fn unescape_selector_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_records_combinators_between_steps() -> Result<()> {
        let chain = parse_selector_chain("ul.menu > li + li ~ a span")?;
        let combinators = chain.iter().map(|part| part.combinator).collect::<Vec<_>>();
        assert_eq!(
            combinators,
            vec![
                None,
                Some(SelectorCombinator::Child),
                Some(SelectorCombinator::AdjacentSibling),
                Some(SelectorCombinator::GeneralSibling),
                Some(SelectorCombinator::Descendant),
            ]
        );
        assert_eq!(chain[0].step.tag.as_deref(), Some("ul"));
        assert_eq!(chain[0].step.classes, vec!["menu".to_string()]);
        Ok(())
    }

    #[test]
    fn marker_attribute_prefix_parses_as_attribute_step() -> Result<()> {
        let chain = parse_selector_chain(r#"[data-motion-scope="17"]>span"#)?;
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain[0].step.attrs,
            vec![SelectorAttrCondition::Eq {
                key: "data-motion-scope".into(),
                value: "17".into(),
            }]
        );
        assert_eq!(chain[1].combinator, Some(SelectorCombinator::Child));
        Ok(())
    }

    #[test]
    fn quoted_attribute_values_may_contain_combinator_characters() -> Result<()> {
        let chain = parse_selector_chain(r#"a[title="x > y ~ z"]"#)?;
        assert_eq!(chain.len(), 1);
        assert_eq!(
            chain[0].step.attrs,
            vec![SelectorAttrCondition::Eq {
                key: "title".into(),
                value: "x > y ~ z".into(),
            }]
        );
        Ok(())
    }

    #[test]
    fn selector_lists_split_on_top_level_commas_only() -> Result<()> {
        let groups = split_selector_groups("p:is(.a, .b), span")?;
        assert_eq!(groups, vec!["p:is(.a, .b)".to_string(), "span".to_string()]);
        Ok(())
    }

    #[test]
    fn pseudo_classes_parse_keywords_and_functions() -> Result<()> {
        let step = parse_selector_step("li:first-child:nth-child(2n+1):not(.skip)")?;
        assert_eq!(step.pseudo_classes.len(), 3);
        assert_eq!(step.pseudo_classes[0], SelectorPseudoClass::FirstChild);
        assert_eq!(
            step.pseudo_classes[1],
            SelectorPseudoClass::NthChild(NthChildSelector::AnPlusB(2, 1))
        );
        assert!(matches!(step.pseudo_classes[2], SelectorPseudoClass::Not(_)));
        Ok(())
    }

    #[test]
    fn nth_child_expressions() {
        assert_eq!(parse_nth_child_selector("odd"), Some(NthChildSelector::Odd));
        assert_eq!(parse_nth_child_selector(" 3 "), Some(NthChildSelector::Exact(3)));
        assert_eq!(
            parse_nth_child_selector("-n + 3"),
            Some(NthChildSelector::AnPlusB(-1, 3))
        );
        assert_eq!(parse_nth_child_selector("0"), None);
        assert_eq!(parse_nth_child_selector("2n+"), None);
        assert!(NthChildSelector::AnPlusB(-1, 3).matches_index(3));
        assert!(!NthChildSelector::AnPlusB(-1, 3).matches_index(4));
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        for selector in ["", ">", "div >", "a >> b", "[", "a]", "div:bogus", ".", "#", "p*", "[x=]"] {
            assert!(
                matches!(
                    parse_selector_groups(selector),
                    Err(Error::UnsupportedSelector(_))
                ),
                "{selector:?} should be rejected"
            );
        }
    }

    #[test]
    fn dash_match_and_includes_conditions() {
        let dash = SelectorAttrCondition::DashMatch {
            key: "lang".into(),
            value: "en".into(),
        };
        assert!(dash.matches(Some("en")));
        assert!(dash.matches(Some("en-US")));
        assert!(!dash.matches(Some("english")));
        assert!(!dash.matches(None));

        let includes = SelectorAttrCondition::Includes {
            key: "class".into(),
            value: "card".into(),
        };
        assert!(includes.matches(Some("big card")));
        assert!(!includes.matches(Some("cards")));
    }
}

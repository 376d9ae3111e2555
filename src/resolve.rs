use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::Result;
use crate::marker::{MarkerSource, QueryMode, query_relative};
use crate::scope::{SelfSelector, classify_selector};
use crate::tree::ElementTree;

pub type MultipleCallback<T> =
    Rc<dyn Fn(&T, <T as ElementTree>::Node) -> MultipleTargets<<T as ElementTree>::Node>>;

pub type SingleCallback<T> =
    Rc<dyn Fn(&T, <T as ElementTree>::Node) -> Option<<T as ElementTree>::Node>>;

/// Anything that can name a set of elements relative to a reference element.
pub enum MultipleSelector<T: ElementTree> {
    Selector(String),
    Element(T::Node),
    Elements(Vec<T::Node>),
    Callback(MultipleCallback<T>),
}

impl<T: ElementTree> MultipleSelector<T> {
    pub fn callback(f: impl Fn(&T, T::Node) -> MultipleTargets<T::Node> + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }
}

impl<T: ElementTree> Clone for MultipleSelector<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Selector(selector) => Self::Selector(selector.clone()),
            Self::Element(node) => Self::Element(*node),
            Self::Elements(nodes) => Self::Elements(nodes.clone()),
            Self::Callback(callback) => Self::Callback(Rc::clone(callback)),
        }
    }
}

impl<T: ElementTree> fmt::Debug for MultipleSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Self::Element(node) => f.debug_tuple("Element").field(node).finish(),
            Self::Elements(nodes) => f.debug_tuple("Elements").field(nodes).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl<T: ElementTree> Default for MultipleSelector<T> {
    /// The reference element itself.
    fn default() -> Self {
        Self::Selector("&".into())
    }
}

impl<T: ElementTree> From<&str> for MultipleSelector<T> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl<T: ElementTree> From<String> for MultipleSelector<T> {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// Anything that can name one element (or the document) relative to a reference.
pub enum SingleSelector<T: ElementTree> {
    Selector(String),
    Node(T::Node),
    Callback(SingleCallback<T>),
}

impl<T: ElementTree> SingleSelector<T> {
    pub fn callback(f: impl Fn(&T, T::Node) -> Option<T::Node> + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }
}

impl<T: ElementTree> Clone for SingleSelector<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Selector(selector) => Self::Selector(selector.clone()),
            Self::Node(node) => Self::Node(*node),
            Self::Callback(callback) => Self::Callback(Rc::clone(callback)),
        }
    }
}

impl<T: ElementTree> fmt::Debug for SingleSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Self::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl<T: ElementTree> From<&str> for SingleSelector<T> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl<T: ElementTree> From<String> for SingleSelector<T> {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// What the engine is asked to animate.
///
/// `Selector` is an absolute CSS selector left for the engine to resolve
/// against the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipleTargets<N> {
    Element(N),
    Elements(Vec<N>),
    Selector(String),
}

impl<N: Copy> MultipleTargets<N> {
    /// Concrete nodes in document order, querying `tree` for a deferred selector.
    pub fn to_nodes<T>(&self, tree: &T) -> Result<Vec<N>>
    where
        T: ElementTree<Node = N>,
    {
        match self {
            Self::Element(node) => Ok(vec![*node]),
            Self::Elements(nodes) => Ok(nodes.clone()),
            Self::Selector(selector) => tree.query_selector_all(tree.document(), selector),
        }
    }
}

/// Resolves `selector` against `node` for an animation's `elements` option.
///
/// Absolute selector strings are returned unresolved as
/// [`MultipleTargets::Selector`].
pub fn multiple_elements_from_selector<T, M>(
    tree: &mut T,
    markers: &M,
    node: T::Node,
    selector: &MultipleSelector<T>,
) -> Result<MultipleTargets<T::Node>>
where
    T: ElementTree,
    M: MarkerSource + ?Sized,
{
    let selector = match selector {
        MultipleSelector::Callback(callback) => {
            trace!(?node, "multiple selector callback");
            return Ok(callback(&*tree, node));
        }
        MultipleSelector::Element(element) => return Ok(MultipleTargets::Element(*element)),
        MultipleSelector::Elements(elements) => {
            return Ok(MultipleTargets::Elements(elements.clone()));
        }
        MultipleSelector::Selector(selector) => selector,
    };

    let classified = classify_selector(selector);
    trace!(?node, ?classified, "resolving multiple");
    Ok(match classified {
        SelfSelector::Itself => MultipleTargets::Element(node),
        SelfSelector::Descendant(rest) => {
            MultipleTargets::Elements(tree.query_selector_all(node, &rest)?)
        }
        SelfSelector::Combinator(axis, rest) => {
            let residual = format!("{}{rest}", axis.combinator());
            let found = query_relative(tree, markers, node, &residual, QueryMode::Multiple)?;
            MultipleTargets::Elements(found.into_multiple())
        }
        SelfSelector::Absolute(selector) => MultipleTargets::Selector(selector),
    })
}

/// Resolves an optional `selector` against `node` to at most one node.
///
/// `None` stays `None`, leaving the choice to the engine's default. Unlike
/// [`multiple_elements_from_selector`], absolute selectors are queried against
/// the whole document right away.
pub fn single_element_from_selector<T, M>(
    tree: &mut T,
    markers: &M,
    node: T::Node,
    selector: Option<&SingleSelector<T>>,
) -> Result<Option<T::Node>>
where
    T: ElementTree,
    M: MarkerSource + ?Sized,
{
    let selector = match selector {
        None => return Ok(None),
        Some(SingleSelector::Callback(callback)) => {
            trace!(?node, "single selector callback");
            return Ok(callback(&*tree, node));
        }
        Some(SingleSelector::Node(resolved)) => return Ok(Some(*resolved)),
        Some(SingleSelector::Selector(selector)) => selector,
    };

    let classified = classify_selector(selector);
    trace!(?node, ?classified, "resolving single");
    match classified {
        SelfSelector::Itself => Ok(Some(node)),
        SelfSelector::Descendant(rest) => tree.query_selector(node, &rest),
        SelfSelector::Combinator(axis, rest) => {
            let residual = format!("{}{rest}", axis.combinator());
            let found = query_relative(tree, markers, node, &residual, QueryMode::Single)?;
            Ok(found.into_single())
        }
        SelfSelector::Absolute(selector) => {
            let document = tree.document();
            tree.query_selector(document, &selector)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::marker::MonotonicMarkers;
    use crate::{Document, Error, NodeId};

    fn gallery() -> Result<Document> {
        Document::from_html(
            r#"<section class="gallery">
                <figure id="a"><img class="thumb"><figcaption>A</figcaption></figure>
                <figure id="b" class="wide"><img class="thumb"></figure>
                <figure id="c"><img class="thumb"></figure>
            </section>
            <footer class="credits">c</footer>"#,
        )
    }

    #[test]
    fn multiple_dispatch_covers_every_form() -> Result<()> {
        let mut doc = gallery()?;
        let markers = MonotonicMarkers::new();
        let a = doc.select_one("#a")?;
        let b = doc.select_one("#b")?;
        let c = doc.select_one("#c")?;

        let resolve = |doc: &mut Document, sel: &str| {
            multiple_elements_from_selector(doc, &markers, a, &MultipleSelector::from(sel))
        };

        assert_eq!(resolve(&mut doc, "&")?, MultipleTargets::Element(a));
        assert_eq!(
            resolve(&mut doc, "& .thumb")?,
            MultipleTargets::Elements(doc.query_selector_all("#a .thumb")?)
        );
        assert_eq!(
            resolve(&mut doc, "&~figure")?,
            MultipleTargets::Elements(vec![b, c])
        );
        assert_eq!(
            resolve(&mut doc, "&+.wide")?,
            MultipleTargets::Elements(vec![b])
        );
        assert_eq!(
            resolve(&mut doc, "&>figcaption")?,
            MultipleTargets::Elements(doc.query_selector_all("figcaption")?)
        );
        assert_eq!(
            resolve(&mut doc, "  .credits ")?,
            MultipleTargets::Selector(".credits".into())
        );
        Ok(())
    }

    #[test]
    fn resolved_values_pass_through() -> Result<()> {
        let mut doc = gallery()?;
        let markers = MonotonicMarkers::new();
        let a = doc.select_one("#a")?;
        let c = doc.select_one("#c")?;

        let one = MultipleSelector::Element(c);
        assert_eq!(
            multiple_elements_from_selector(&mut doc, &markers, a, &one)?,
            MultipleTargets::Element(c)
        );
        let many = MultipleSelector::Elements(vec![c, a]);
        assert_eq!(
            multiple_elements_from_selector(&mut doc, &markers, a, &many)?,
            MultipleTargets::Elements(vec![c, a])
        );
        assert_eq!(
            single_element_from_selector(&mut doc, &markers, a, Some(&SingleSelector::Node(c)))?,
            Some(c)
        );
        Ok(())
    }

    #[test]
    fn callbacks_receive_the_reference_and_are_not_revalidated() -> Result<()> {
        let mut doc = gallery()?;
        let markers = MonotonicMarkers::new();
        let a = doc.select_one("#a")?;
        let seen = Rc::new(Cell::new(None));

        let record = Rc::clone(&seen);
        let selector = MultipleSelector::<Document>::callback(move |_, node| {
            record.set(Some(node));
            MultipleTargets::Selector("not resolved".into())
        });
        assert_eq!(
            multiple_elements_from_selector(&mut doc, &markers, a, &selector)?,
            MultipleTargets::Selector("not resolved".into())
        );
        assert_eq!(seen.get(), Some(a));

        let nothing = SingleSelector::<Document>::callback(|_, _| None);
        assert_eq!(
            single_element_from_selector(&mut doc, &markers, a, Some(&nothing))?,
            None
        );
        assert_eq!(markers.next_marker(), 0, "callbacks never take a marker");
        Ok(())
    }

    #[test]
    fn single_dispatch_and_the_absolute_asymmetry() -> Result<()> {
        let mut doc = gallery()?;
        let markers = MonotonicMarkers::new();
        let a = doc.select_one("#a")?;
        let b = doc.select_one("#b")?;
        let footer = doc.select_one("footer")?;

        let mut resolve = |sel: &str| {
            single_element_from_selector(&mut doc, &markers, a, Some(&SingleSelector::from(sel)))
        };
        assert_eq!(resolve("&")?, Some(a));
        assert_eq!(resolve("&+figure")?, Some(b));
        assert_eq!(resolve("&+footer")?, None);
        assert_eq!(resolve(".credits")?, Some(footer));
        assert_eq!(resolve("& video")?, None);
        assert_eq!(resolve(".missing")?, None);
        assert_eq!(
            single_element_from_selector::<Document, _>(&mut doc, &markers, a, None)?,
            None
        );
        Ok(())
    }

    #[test]
    fn malformed_selectors_propagate() -> Result<()> {
        let mut doc = gallery()?;
        let markers = MonotonicMarkers::new();
        let a = doc.select_one("#a")?;

        for sel in ["& [", "&>:bogus", "img[src"] {
            let err = single_element_from_selector(
                &mut doc,
                &markers,
                a,
                Some(&SingleSelector::from(sel)),
            );
            assert!(matches!(err, Err(Error::UnsupportedSelector(_))), "{sel}");
        }
        Ok(())
    }

    #[test]
    fn deferred_selector_expands_against_the_document() -> Result<()> {
        let doc = gallery()?;
        let thumbs = MultipleTargets::<NodeId>::Selector("img.thumb".into()).to_nodes(&doc)?;
        assert_eq!(thumbs.len(), 3);
        Ok(())
    }
}

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};

use crate::Result;
use crate::tree::ElementTree;

/// Attribute temporarily placed on the reference element during a relative query.
pub const MARKER_ATTRIBUTE: &str = "data-motion-scope";

/// Root element tag substituted for the marker when the reference is the document.
const DOCUMENT_ELEMENT: &str = "html";

/// Hands out marker tokens that are unique among live markers.
pub trait MarkerSource {
    fn next_marker(&self) -> u64;
}

impl<M: MarkerSource + ?Sized> MarkerSource for &M {
    fn next_marker(&self) -> u64 {
        (**self).next_marker()
    }
}

/// Counter owned by one caller. Deterministic, so tests can predict tokens.
#[derive(Debug, Default)]
pub struct MonotonicMarkers {
    next: Cell<u64>,
}

impl MonotonicMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Cell::new(first),
        }
    }
}

impl MarkerSource for MonotonicMarkers {
    fn next_marker(&self) -> u64 {
        let token = self.next.get();
        self.next.set(token.wrapping_add(1));
        token
    }
}

struct GlobalMarkers(AtomicU64);

impl MarkerSource for GlobalMarkers {
    fn next_marker(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

static GLOBAL_MARKERS: GlobalMarkers = GlobalMarkers(AtomicU64::new(0));

/// Process-wide marker counter. Never resets.
pub fn global_markers() -> &'static (dyn MarkerSource + Sync) {
    &GLOBAL_MARKERS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Single,
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult<N> {
    Single(Option<N>),
    Multiple(Vec<N>),
}

impl<N> QueryResult<N> {
    pub fn into_single(self) -> Option<N> {
        match self {
            Self::Single(node) => node,
            Self::Multiple(nodes) => nodes.into_iter().next(),
        }
    }

    pub fn into_multiple(self) -> Vec<N> {
        match self {
            Self::Single(node) => node.into_iter().collect(),
            Self::Multiple(nodes) => nodes,
        }
    }
}

/// Keeps the marker attribute on `node` for as long as it lives, then puts
/// back whatever value the attribute had before.
struct MarkerGuard<'a, T: ElementTree> {
    tree: &'a mut T,
    node: T::Node,
    token: u64,
    previous: Option<String>,
}

impl<'a, T: ElementTree> MarkerGuard<'a, T> {
    fn acquire(tree: &'a mut T, node: T::Node, token: u64) -> Result<Self> {
        let previous = tree.attribute(node, MARKER_ATTRIBUTE);
        tree.set_attribute(node, MARKER_ATTRIBUTE, &token.to_string())?;
        trace!(token, ?node, "marker set");
        Ok(Self {
            tree,
            node,
            token,
            previous,
        })
    }

    fn tree(&self) -> &T {
        self.tree
    }
}

impl<T: ElementTree> Drop for MarkerGuard<'_, T> {
    fn drop(&mut self) {
        let released = match self.previous.take() {
            Some(value) => self.tree.set_attribute(self.node, MARKER_ATTRIBUTE, &value),
            None => self.tree.remove_attribute(self.node, MARKER_ATTRIBUTE),
        };
        match released {
            Ok(()) => trace!(token = self.token, node = ?self.node, "marker released"),
            Err(err) => warn!(token = self.token, node = ?self.node, %err, "marker release failed"),
        }
    }
}

fn run_query<T: ElementTree>(
    tree: &T,
    root: T::Node,
    query: &str,
    mode: QueryMode,
) -> Result<QueryResult<T::Node>> {
    Ok(match mode {
        QueryMode::Single => QueryResult::Single(tree.query_selector(root, query)?),
        QueryMode::Multiple => QueryResult::Multiple(tree.query_selector_all(root, query)?),
    })
}

/// Evaluates `residual` relative to `reference`.
///
/// `residual` starts with its combinator: `>`, `+`, `~` or a space. The
/// reference is tagged with [`MARKER_ATTRIBUTE`], the query
/// `[data-motion-scope="<token>"]<residual>` runs from its parent (or from the
/// document when it has none), and the tag is released again whether or not
/// the query succeeded. An existing value of the attribute is restored. When the reference is the document itself, the query is
/// `html<residual>` and nothing is tagged.
///
/// Nested resolutions on the same element unwind in order: each one puts back
/// the token of the resolution it interrupted.
pub fn query_relative<T, M>(
    tree: &mut T,
    markers: &M,
    reference: T::Node,
    residual: &str,
    mode: QueryMode,
) -> Result<QueryResult<T::Node>>
where
    T: ElementTree,
    M: MarkerSource + ?Sized,
{
    if tree.is_document(reference) {
        let query = format!("{DOCUMENT_ELEMENT}{residual}");
        trace!(%query, ?mode, "relative query from document");
        return run_query(tree, reference, &query, mode);
    }

    let token = markers.next_marker();
    let root = tree
        .parent_node(reference)
        .unwrap_or_else(|| tree.document());
    let query = format!("[{MARKER_ATTRIBUTE}=\"{token}\"]{residual}");

    let guard = MarkerGuard::acquire(tree, reference, token)?;
    trace!(%query, ?mode, "relative query");
    run_query(guard.tree(), root, &query, mode)
}

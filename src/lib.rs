//! Element-scoped selector resolution and viewport/scroll animation actions.
//!
//! Actions bind an [`AnimationEngine`]'s `in_view` and `scroll` primitives to
//! an element of a [`Document`]. Selector-valued options accept a compact
//! grammar relative to that element:
//!
//! | selector  | resolves to                                  |
//! |-----------|----------------------------------------------|
//! | `&`       | the element itself                           |
//! | `& sel`   | descendants of the element matching `sel`    |
//! | `&>sel`   | children of the element matching `sel`       |
//! | `&+sel`   | the next sibling, if it matches `sel`        |
//! | `&~sel`   | following siblings matching `sel`            |
//! | otherwise | a document-wide CSS selector                 |
//!
//! ```
//! use motion_scope::{
//!     Document, MonotonicMarkers, MultipleSelector, MultipleTargets,
//!     multiple_elements_from_selector,
//! };
//!
//! let mut doc = Document::from_html("<ul id='menu'><li>a</li><li>b</li></ul>")?;
//! let menu = doc.select_one("#menu")?;
//! let markers = MonotonicMarkers::new();
//! let items = multiple_elements_from_selector(
//!     &mut doc,
//!     &markers,
//!     menu,
//!     &MultipleSelector::from("&>li"),
//! )?;
//! assert!(matches!(items, MultipleTargets::Elements(ref found) if found.len() == 2));
//! # Ok::<(), motion_scope::Error>(())
//! ```

mod action;
mod dom;
mod engine;
mod html;
mod marker;
mod resolve;
mod scope;
mod selector;
mod tree;

pub use action::{
    Action, ActionHost, ActionId, ActionOptions, ActionPreset, ActionSpec, AnimationSpec, InView,
    InViewAnimation, InViewSettings, MountHook, Scroll, ScrollAnimation, ScrollListener,
    ScrollSettings, StartHandler, create_action,
};
pub use dom::{Document, NodeId};
pub use engine::{
    AnimationControls, AnimationEngine, AnimationOptions, Animator, AxisScrollInfo, Easing,
    EnterHandler, InViewOptions, KeyframeValue, Keyframes, LeaveHandler, NamedEasing,
    PlaybackDirection, ScrollAxis, ScrollCallback, ScrollHandler, ScrollInfo, ScrollOffset,
    ScrollOptions, Teardown, ViewAmount, ViewEntry, ViewKeyword,
};
pub use marker::{
    MARKER_ATTRIBUTE, MarkerSource, MonotonicMarkers, QueryMode, QueryResult, global_markers,
    query_relative,
};
pub use resolve::{
    MultipleCallback, MultipleSelector, MultipleTargets, SingleCallback, SingleSelector,
    multiple_elements_from_selector, single_element_from_selector,
};
pub use scope::{Axis, SelfSelector, StringSelector, classify_selector, parse_string_selector};
pub use tree::ElementTree;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("not an element: {0}")]
    NotAnElement(String),
    #[error("unknown node: {0}")]
    UnknownNode(usize),
    #[error("unknown action: {0}")]
    UnknownAction(usize),
}

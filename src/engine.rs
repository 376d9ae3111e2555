//! Contract with the animation engine.
//!
//! The crate never animates anything itself. An [`AnimationEngine`] receives
//! already-resolved targets and options and hands back [`Teardown`]s that
//! unsubscribe whatever it registered.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;
use crate::resolve::MultipleTargets;

/// One keyframe value: a number (`0.5`) or a CSS string (`"translateY(10px)"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    Number(f64),
    Text(String),
}

impl From<f64> for KeyframeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for KeyframeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Property name to the values it passes through, e.g. `{"opacity": [0, 1]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyframes(BTreeMap<String, Vec<KeyframeValue>>);

impl Keyframes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property<V>(mut self, name: &str, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<KeyframeValue>,
    {
        self.0
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn get(&self, name: &str) -> Option<&[KeyframeValue]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamedEasing {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// A named curve or the four control points of a cubic bezier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Easing {
    Named(NamedEasing),
    CubicBezier([f64; 4]),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackDirection {
    #[default]
    Normal,
    Reverse,
    Alternate,
    AlternateReverse,
}

/// Timing for one `animate` call. Times are in seconds; `None` means the
/// engine's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<f64>,
    #[serde(default)]
    pub direction: PlaybackDirection,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offset: Vec<f64>,
}

/// How much of the element must be visible to count as in view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewAmount {
    Keyword(ViewKeyword),
    Fraction(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKeyword {
    /// Any part of the element.
    #[serde(rename = "some")]
    Any,
    #[serde(rename = "all")]
    All,
}

impl Default for ViewAmount {
    fn default() -> Self {
        Self::Keyword(ViewKeyword::Any)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAxis {
    X,
    #[default]
    Y,
}

/// An intersection point such as `"start end"` or `"0 1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrollOffset(String);

impl ScrollOffset {
    pub fn new(offset: impl Into<String>) -> Self {
        Self(offset.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `in_view` options with `root` already resolved. `None` means the viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InViewOptions {
    pub root: Option<NodeId>,
    pub margin: Option<String>,
    pub amount: ViewAmount,
}

/// `scroll` options with `container` and `target` already resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollOptions {
    pub container: Option<NodeId>,
    pub target: Option<NodeId>,
    pub axis: ScrollAxis,
    pub offset: Vec<ScrollOffset>,
}

/// Passed to enter and leave handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScrollInfo {
    pub current: f64,
    pub progress: f64,
    pub scroll_length: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollInfo {
    pub time: f64,
    pub x: AxisScrollInfo,
    pub y: AxisScrollInfo,
}

/// Handle to an animation started by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationControls {
    id: u64,
}

impl AnimationControls {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(self) -> u64 {
        self.id
    }
}

pub type LeaveHandler = Box<dyn FnMut(&ViewEntry)>;

/// Runs each time the element enters view. Returning a leave handler keeps
/// the observation alive; returning `None` lets the engine stop observing.
pub type EnterHandler = Box<dyn FnMut(&mut dyn Animator, &ViewEntry) -> Option<LeaveHandler>>;

pub type ScrollCallback = Box<dyn FnMut(&ScrollInfo)>;

/// What a scroll subscription drives.
pub enum ScrollHandler {
    Callback(ScrollCallback),
    /// Scrubs the animation's progress with the scroll position.
    Animation(AnimationControls),
}

impl fmt::Debug for ScrollHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Animation(controls) => f.debug_tuple("Animation").field(controls).finish(),
        }
    }
}

/// Unsubscribes something registered with the engine. Dropping it without
/// calling [`Teardown::run`] leaves the subscription in place.
#[must_use = "dropping a Teardown leaves the subscription active"]
pub struct Teardown(Option<Box<dyn FnOnce()>>);

impl Teardown {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(f)))
    }

    pub fn noop() -> Self {
        Self(None)
    }

    pub fn is_noop(&self) -> bool {
        self.0.is_none()
    }

    pub fn run(self) {
        if let Some(f) = self.0 {
            f();
        }
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_noop() {
            "Teardown(noop)"
        } else {
            "Teardown(..)"
        })
    }
}

pub trait Animator {
    fn animate(
        &mut self,
        targets: MultipleTargets<NodeId>,
        keyframes: &Keyframes,
        options: &AnimationOptions,
    ) -> AnimationControls;
}

pub trait AnimationEngine: Animator {
    fn in_view(
        &mut self,
        element: NodeId,
        on_enter: EnterHandler,
        options: InViewOptions,
    ) -> Teardown;

    fn scroll(&mut self, handler: ScrollHandler, options: ScrollOptions) -> Teardown;
}

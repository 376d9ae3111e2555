//! Element actions: `in_view`, `in_view_animation`, `scroll` and
//! `scroll_animation`.
//!
//! An [`ActionHost`] plays the host framework's part. It owns the document,
//! the engine and the marker source, and drives each action through
//! attach, update and destroy. Selector-valued options are resolved against
//! the bound element every time the action subscribes.

use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::engine::{
    AnimationEngine, AnimationOptions, Animator, EnterHandler, InViewOptions, Keyframes,
    LeaveHandler, ScrollAxis, ScrollCallback, ScrollHandler, ScrollInfo, ScrollOffset,
    ScrollOptions, Teardown, ViewAmount, ViewEntry,
};
use crate::marker::{MarkerSource, MonotonicMarkers};
use crate::resolve::{
    MultipleSelector, SingleSelector, multiple_elements_from_selector,
    single_element_from_selector,
};
use crate::{Error, Result};

/// Runs once when an action is attached, before the engine is involved.
pub type MountHook = Rc<dyn Fn(&mut Document, NodeId) -> Result<()>>;

pub type StartHandler = Rc<dyn Fn(&mut dyn Animator, &ViewEntry) -> Option<LeaveHandler>>;

pub type ScrollListener = Rc<dyn Fn(&ScrollInfo)>;

/// Options shared by every action.
#[derive(Clone)]
pub struct ActionOptions {
    /// A disabled action never reaches the engine. Defaults to `true`.
    pub enabled: bool,
    pub on_mount: Option<MountHook>,
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            on_mount: None,
        }
    }
}

impl fmt::Debug for ActionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionOptions")
            .field("enabled", &self.enabled)
            .field("on_mount", &self.on_mount.as_ref().map(|_| ".."))
            .finish()
    }
}

/// `in_view` options before `root` is resolved.
#[derive(Debug, Clone, Default)]
pub struct InViewSettings {
    pub root: Option<SingleSelector<Document>>,
    pub margin: Option<String>,
    pub amount: ViewAmount,
}

/// `scroll` options before `container` and `target` are resolved.
#[derive(Debug, Clone, Default)]
pub struct ScrollSettings {
    pub container: Option<SingleSelector<Document>>,
    pub target: Option<SingleSelector<Document>>,
    pub axis: ScrollAxis,
    pub offset: Vec<ScrollOffset>,
}

/// An animation to run on elements picked relative to the bound element.
#[derive(Debug, Clone, Default)]
pub struct AnimationSpec {
    /// Defaults to `&`, the bound element.
    pub elements: MultipleSelector<Document>,
    pub keyframes: Keyframes,
    pub options: AnimationOptions,
}

impl AnimationSpec {
    pub fn new(keyframes: Keyframes) -> Self {
        Self {
            keyframes,
            ..Self::default()
        }
    }

    pub fn elements(mut self, elements: impl Into<MultipleSelector<Document>>) -> Self {
        self.elements = elements.into();
        self
    }

    pub fn options(mut self, options: AnimationOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone)]
pub struct InView {
    pub on_start: StartHandler,
    pub options: InViewSettings,
}

impl InView {
    pub fn new(
        on_start: impl Fn(&mut dyn Animator, &ViewEntry) -> Option<LeaveHandler> + 'static,
    ) -> Self {
        Self {
            on_start: Rc::new(on_start),
            options: InViewSettings::default(),
        }
    }

    pub fn options(mut self, options: InViewSettings) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for InView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InView")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct InViewAnimation {
    pub animate: AnimationSpec,
    pub options: InViewSettings,
    /// Replay the animation every time the element re-enters view.
    pub repeat: bool,
}

impl InViewAnimation {
    pub fn new(animate: AnimationSpec) -> Self {
        Self {
            animate,
            options: InViewSettings::default(),
            repeat: false,
        }
    }

    pub fn options(mut self, options: InViewSettings) -> Self {
        self.options = options;
        self
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

#[derive(Clone)]
pub struct Scroll {
    pub on_scroll: ScrollListener,
    pub options: ScrollSettings,
}

impl Scroll {
    pub fn new(on_scroll: impl Fn(&ScrollInfo) + 'static) -> Self {
        Self {
            on_scroll: Rc::new(on_scroll),
            options: ScrollSettings::default(),
        }
    }

    pub fn options(mut self, options: ScrollSettings) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for Scroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scroll")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ScrollAnimation {
    pub animate: AnimationSpec,
    pub options: ScrollSettings,
}

impl ScrollAnimation {
    pub fn new(animate: AnimationSpec) -> Self {
        Self {
            animate,
            options: ScrollSettings::default(),
        }
    }

    pub fn options(mut self, options: ScrollSettings) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    InView(InView),
    InViewAnimation(InViewAnimation),
    Scroll(Scroll),
    ScrollAnimation(ScrollAnimation),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InView(_) => "in_view",
            Self::InViewAnimation(_) => "in_view_animation",
            Self::Scroll(_) => "scroll",
            Self::ScrollAnimation(_) => "scroll_animation",
        }
    }
}

/// An action together with its shared options.
#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub action: Action,
    pub options: ActionOptions,
}

impl ActionSpec {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.options.enabled = enabled;
        self
    }

    pub fn on_mount(
        mut self,
        hook: impl Fn(&mut Document, NodeId) -> Result<()> + 'static,
    ) -> Self {
        self.options.on_mount = Some(Rc::new(hook));
        self
    }
}

impl From<Action> for ActionSpec {
    fn from(action: Action) -> Self {
        Self {
            action,
            options: ActionOptions::default(),
        }
    }
}

impl From<InView> for ActionSpec {
    fn from(action: InView) -> Self {
        Action::InView(action).into()
    }
}

impl From<InViewAnimation> for ActionSpec {
    fn from(action: InViewAnimation) -> Self {
        Action::InViewAnimation(action).into()
    }
}

impl From<Scroll> for ActionSpec {
    fn from(action: Scroll) -> Self {
        Action::Scroll(action).into()
    }
}

impl From<ScrollAnimation> for ActionSpec {
    fn from(action: ScrollAnimation) -> Self {
        Action::ScrollAnimation(action).into()
    }
}

/// An action configured once and attachable to any number of elements.
#[derive(Debug, Clone)]
pub struct ActionPreset {
    spec: ActionSpec,
}

pub fn create_action(spec: impl Into<ActionSpec>) -> ActionPreset {
    ActionPreset { spec: spec.into() }
}

impl ActionPreset {
    pub fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    pub fn attach<E, M>(&self, host: &mut ActionHost<E, M>, node: NodeId) -> Result<ActionId>
    where
        E: AnimationEngine,
        M: MarkerSource,
    {
        host.attach(node, &self.spec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(usize);

#[derive(Debug)]
struct Mounted {
    node: NodeId,
    teardown: Teardown,
}

pub struct ActionHost<E, M = MonotonicMarkers> {
    document: Document,
    engine: E,
    markers: M,
    mounted: HashMap<ActionId, Mounted>,
    next_id: usize,
}

impl<E: AnimationEngine> ActionHost<E> {
    pub fn new(document: Document, engine: E) -> Self {
        Self::with_markers(document, engine, MonotonicMarkers::new())
    }
}

impl<E: AnimationEngine, M: MarkerSource> ActionHost<E, M> {
    pub fn with_markers(document: Document, engine: E, markers: M) -> Self {
        Self {
            document,
            engine,
            markers,
            mounted: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_parts(self) -> (Document, E) {
        (self.document, self.engine)
    }

    /// Element an attached action is bound to.
    pub fn node_of(&self, id: ActionId) -> Option<NodeId> {
        self.mounted.get(&id).map(|mounted| mounted.node)
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Binds `spec` to `node`: runs `on_mount`, then subscribes with the engine.
    pub fn attach(&mut self, node: NodeId, spec: &ActionSpec) -> Result<ActionId> {
        if !self.document.is_element(node) {
            return Err(Error::NotAnElement(format!(
                "cannot attach {} to {node:?}",
                spec.action.name()
            )));
        }

        if let Some(on_mount) = &spec.options.on_mount {
            on_mount(&mut self.document, node)?;
        }

        let teardown = self.subscribe(node, spec)?;
        let id = ActionId(self.next_id);
        self.next_id += 1;
        debug!(?id, ?node, action = spec.action.name(), "action attached");
        self.mounted.insert(id, Mounted { node, teardown });
        Ok(id)
    }

    /// Tears down the current subscription, then subscribes again with `spec`.
    ///
    /// `on_mount` is not run again. If resolving the new options fails, the
    /// action stays attached without a subscription.
    pub fn update(&mut self, id: ActionId, spec: &ActionSpec) -> Result<()> {
        let mounted = self
            .mounted
            .get_mut(&id)
            .ok_or(Error::UnknownAction(id.0))?;
        let node = mounted.node;
        mem::replace(&mut mounted.teardown, Teardown::noop()).run();

        let teardown = self.subscribe(node, spec)?;
        if let Some(mounted) = self.mounted.get_mut(&id) {
            mounted.teardown = teardown;
        }
        debug!(?id, ?node, action = spec.action.name(), "action updated");
        Ok(())
    }

    pub fn destroy(&mut self, id: ActionId) -> Result<()> {
        let mounted = self
            .mounted
            .remove(&id)
            .ok_or(Error::UnknownAction(id.0))?;
        mounted.teardown.run();
        debug!(?id, node = ?mounted.node, "action destroyed");
        Ok(())
    }

    fn subscribe(&mut self, node: NodeId, spec: &ActionSpec) -> Result<Teardown> {
        if !spec.options.enabled {
            debug!(?node, action = spec.action.name(), "action disabled");
            return Ok(Teardown::noop());
        }

        match &spec.action {
            Action::InView(InView { on_start, options }) => {
                let options = self.in_view_options(node, options)?;
                let on_start = Rc::clone(on_start);
                let on_enter: EnterHandler =
                    Box::new(move |animator: &mut dyn Animator, entry: &ViewEntry| {
                        on_start(animator, entry)
                    });
                Ok(self.engine.in_view(node, on_enter, options))
            }
            Action::InViewAnimation(InViewAnimation {
                animate,
                options,
                repeat,
            }) => {
                let options = self.in_view_options(node, options)?;
                let targets = multiple_elements_from_selector(
                    &mut self.document,
                    &self.markers,
                    node,
                    &animate.elements,
                )?;
                let keyframes = animate.keyframes.clone();
                let animation = animate.options.clone();
                let repeat = *repeat;
                let on_enter: EnterHandler =
                    Box::new(move |animator: &mut dyn Animator, _entry: &ViewEntry| {
                        animator.animate(targets.clone(), &keyframes, &animation);
                        repeat.then(|| Box::new(|_: &ViewEntry| {}) as LeaveHandler)
                    });
                Ok(self.engine.in_view(node, on_enter, options))
            }
            Action::Scroll(Scroll { on_scroll, options }) => {
                let options = self.scroll_options(node, options)?;
                let on_scroll = Rc::clone(on_scroll);
                let callback: ScrollCallback = Box::new(move |info: &ScrollInfo| on_scroll(info));
                Ok(self.engine.scroll(ScrollHandler::Callback(callback), options))
            }
            Action::ScrollAnimation(ScrollAnimation { animate, options }) => {
                let targets = multiple_elements_from_selector(
                    &mut self.document,
                    &self.markers,
                    node,
                    &animate.elements,
                )?;
                let options = self.scroll_options(node, options)?;
                let controls = self
                    .engine
                    .animate(targets, &animate.keyframes, &animate.options);
                Ok(self.engine.scroll(ScrollHandler::Animation(controls), options))
            }
        }
    }

    fn in_view_options(&mut self, node: NodeId, settings: &InViewSettings) -> Result<InViewOptions> {
        let root = single_element_from_selector(
            &mut self.document,
            &self.markers,
            node,
            settings.root.as_ref(),
        )?;
        Ok(InViewOptions {
            root,
            margin: settings.margin.clone(),
            amount: settings.amount,
        })
    }

    fn scroll_options(&mut self, node: NodeId, settings: &ScrollSettings) -> Result<ScrollOptions> {
        let container = single_element_from_selector(
            &mut self.document,
            &self.markers,
            node,
            settings.container.as_ref(),
        )?;
        let target = single_element_from_selector(
            &mut self.document,
            &self.markers,
            node,
            settings.target.as_ref(),
        )?;
        Ok(ScrollOptions {
            container,
            target,
            axis: settings.axis,
            offset: settings.offset.clone(),
        })
    }
}

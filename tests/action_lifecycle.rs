use std::cell::{Cell, RefCell};
use std::rc::Rc;

use motion_scope::{
    ActionHost, ActionSpec, AnimationControls, AnimationEngine, AnimationOptions, AnimationSpec,
    Animator, Document, EnterHandler, InView, InViewAnimation, InViewOptions, InViewSettings,
    Keyframes, LeaveHandler, MARKER_ATTRIBUTE, MultipleTargets, NodeId, Scroll, ScrollAnimation,
    ScrollAxis, ScrollCallback, ScrollHandler, ScrollInfo, ScrollOffset, ScrollOptions,
    ScrollSettings, SingleSelector, Teardown, ViewAmount, ViewEntry, create_action,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Animate {
        id: u64,
        targets: MultipleTargets<NodeId>,
        keyframes: Keyframes,
        options: AnimationOptions,
    },
    InView {
        subscription: usize,
        element: NodeId,
        options: InViewOptions,
    },
    Scroll {
        subscription: usize,
        animation: Option<u64>,
        options: ScrollOptions,
    },
    Teardown(usize),
}

type Log = Rc<RefCell<Vec<Event>>>;

/// Records every call and lets tests fire view and scroll events by hand.
///
/// Like a real intersection observer, an element whose enter handler returns
/// no leave handler is no longer observed.
#[derive(Default)]
struct RecordingEngine {
    log: Log,
    observers: Rc<RefCell<Vec<(usize, NodeId, EnterHandler)>>>,
    scrollers: Rc<RefCell<Vec<(usize, ScrollCallback)>>>,
    next_subscription: usize,
    next_animation: u64,
}

impl RecordingEngine {
    fn subscription(&mut self) -> usize {
        let id = self.next_subscription;
        self.next_subscription += 1;
        id
    }

    fn teardown(&self, subscription: usize) -> Teardown {
        let log = Rc::clone(&self.log);
        let observers = Rc::clone(&self.observers);
        let scrollers = Rc::clone(&self.scrollers);
        Teardown::new(move || {
            observers.borrow_mut().retain(|(id, _, _)| *id != subscription);
            scrollers.borrow_mut().retain(|(id, _)| *id != subscription);
            log.borrow_mut().push(Event::Teardown(subscription));
        })
    }

    /// Fires every observer of `element`; returns how many handlers ran.
    fn enter(&mut self, element: NodeId) -> usize {
        let ready: Vec<_> = {
            let mut observers = self.observers.borrow_mut();
            let (matching, rest) = observers
                .drain(..)
                .partition::<Vec<_>, _>(|(_, target, _)| *target == element);
            *observers = rest;
            matching
        };

        let fired = ready.len();
        let entry = ViewEntry {
            target: element,
            is_intersecting: true,
            intersection_ratio: 1.0,
        };
        for (id, target, mut handler) in ready {
            let animator: &mut dyn Animator = &mut *self;
            let leave: Option<LeaveHandler> = handler(animator, &entry);
            if leave.is_some() {
                self.observers.borrow_mut().push((id, target, handler));
            }
        }
        fired
    }

    fn scroll_to(&mut self, info: &ScrollInfo) {
        for (_, callback) in self.scrollers.borrow_mut().iter_mut() {
            callback(info);
        }
    }

    fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    fn animations(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, Event::Animate { .. }))
            .collect()
    }
}

impl Animator for RecordingEngine {
    fn animate(
        &mut self,
        targets: MultipleTargets<NodeId>,
        keyframes: &Keyframes,
        options: &AnimationOptions,
    ) -> AnimationControls {
        let id = self.next_animation;
        self.next_animation += 1;
        self.log.borrow_mut().push(Event::Animate {
            id,
            targets,
            keyframes: keyframes.clone(),
            options: options.clone(),
        });
        AnimationControls::new(id)
    }
}

impl AnimationEngine for RecordingEngine {
    fn in_view(
        &mut self,
        element: NodeId,
        on_enter: EnterHandler,
        options: InViewOptions,
    ) -> Teardown {
        let subscription = self.subscription();
        self.log.borrow_mut().push(Event::InView {
            subscription,
            element,
            options,
        });
        self.observers
            .borrow_mut()
            .push((subscription, element, on_enter));
        self.teardown(subscription)
    }

    fn scroll(&mut self, handler: ScrollHandler, options: ScrollOptions) -> Teardown {
        let subscription = self.subscription();
        let animation = match handler {
            ScrollHandler::Animation(controls) => Some(controls.id()),
            ScrollHandler::Callback(callback) => {
                self.scrollers.borrow_mut().push((subscription, callback));
                None
            }
        };
        self.log.borrow_mut().push(Event::Scroll {
            subscription,
            animation,
            options,
        });
        self.teardown(subscription)
    }
}

const PAGE: &str = r#"
<div id="scroller" class="viewport">
  <ul id="list">
    <li class="item">one</li>
    <li class="item">two</li>
    <li class="item">three</li>
  </ul>
  <div class="progress"><div class="bar"></div></div>
</div>
<h1 id="title">Hello</h1>
"#;

fn host() -> motion_scope::Result<ActionHost<RecordingEngine>> {
    Ok(ActionHost::new(
        Document::from_html(PAGE)?,
        RecordingEngine::default(),
    ))
}

fn fade() -> Keyframes {
    Keyframes::new().property("opacity", [0.0, 1.0])
}

#[test]
fn in_view_animation_animates_self_once_by_default() -> motion_scope::Result<()> {
    let mut host = host()?;
    let title = host.document().select_one("#title")?;

    let spec = ActionSpec::from(InViewAnimation::new(AnimationSpec::new(fade())));
    host.attach(title, &spec)?;
    assert_eq!(
        host.engine().events(),
        vec![Event::InView {
            subscription: 0,
            element: title,
            options: InViewOptions::default(),
        }]
    );

    assert_eq!(host.engine_mut().enter(title), 1);
    assert_eq!(host.engine_mut().enter(title), 0, "observation ends after the first entry");
    assert_eq!(
        host.engine().animations(),
        vec![Event::Animate {
            id: 0,
            targets: MultipleTargets::Element(title),
            keyframes: fade(),
            options: AnimationOptions::default(),
        }]
    );
    Ok(())
}

#[test]
fn repeat_keeps_the_observer_alive() -> motion_scope::Result<()> {
    let mut host = host()?;
    let title = host.document().select_one("#title")?;

    let spec = ActionSpec::from(InViewAnimation::new(AnimationSpec::new(fade())).repeat(true));
    host.attach(title, &spec)?;
    for _ in 0..3 {
        assert_eq!(host.engine_mut().enter(title), 1);
    }
    assert_eq!(host.engine().animations().len(), 3);
    Ok(())
}

#[test]
fn relative_elements_are_resolved_against_the_bound_node() -> motion_scope::Result<()> {
    let mut host = host()?;
    let list = host.document().select_one("#list")?;
    let items = host.document().query_selector_all("#list > li")?;

    let spec = ActionSpec::from(InViewAnimation::new(
        AnimationSpec::new(fade()).elements("&>li.item"),
    ));
    host.attach(list, &spec)?;
    assert!(!host.document().has_attr(list, MARKER_ATTRIBUTE));

    host.engine_mut().enter(list);
    let animations = host.engine().animations();
    assert!(matches!(
        animations.as_slice(),
        [Event::Animate { targets: MultipleTargets::Elements(found), .. }] if *found == items
    ));
    Ok(())
}

#[test]
fn absolute_elements_are_handed_to_the_engine_unresolved() -> motion_scope::Result<()> {
    let mut host = host()?;
    let title = host.document().select_one("#title")?;

    let spec = ActionSpec::from(InViewAnimation::new(
        AnimationSpec::new(fade()).elements(".item"),
    ));
    host.attach(title, &spec)?;
    host.engine_mut().enter(title);

    let targets = match host.engine().animations().as_slice() {
        [Event::Animate { targets, .. }] => targets.clone(),
        other => panic!("unexpected events {other:?}"),
    };
    assert_eq!(targets, MultipleTargets::Selector(".item".into()));
    assert_eq!(targets.to_nodes(host.document())?.len(), 3);
    Ok(())
}

#[test]
fn in_view_root_and_start_handler() -> motion_scope::Result<()> {
    let mut host = host()?;
    let list = host.document().select_one("#list")?;
    let scroller = host.document().select_one("#scroller")?;
    let entered = Rc::new(Cell::new(0));

    let counter = Rc::clone(&entered);
    let spec = ActionSpec::from(
        InView::new(move |animator: &mut dyn Animator, entry: &ViewEntry| {
            counter.set(counter.get() + 1);
            animator.animate(
                MultipleTargets::Element(entry.target),
                &Keyframes::new().property("color", ["red"]),
                &AnimationOptions::default(),
            );
            Some(Box::new(|_: &ViewEntry| {}) as LeaveHandler)
        })
        .options(InViewSettings {
            root: Some(SingleSelector::from(".viewport")),
            margin: Some("0px 0px -10% 0px".into()),
            amount: ViewAmount::Fraction(0.5),
        }),
    );
    host.attach(list, &spec)?;

    assert_eq!(
        host.engine().events(),
        vec![Event::InView {
            subscription: 0,
            element: list,
            options: InViewOptions {
                root: Some(scroller),
                margin: Some("0px 0px -10% 0px".into()),
                amount: ViewAmount::Fraction(0.5),
            },
        }]
    );

    host.engine_mut().enter(list);
    host.engine_mut().enter(list);
    assert_eq!(entered.get(), 2);
    assert_eq!(host.engine().animations().len(), 2);
    Ok(())
}

#[test]
fn scroll_resolves_container_and_target() -> motion_scope::Result<()> {
    let mut host = host()?;
    let progress = host.document().select_one(".progress")?;
    let bar = host.document().select_one(".bar")?;
    let scroller = host.document().select_one("#scroller")?;
    let seen = Rc::new(RefCell::new(Vec::new()));

    let record = Rc::clone(&seen);
    let spec = ActionSpec::from(
        Scroll::new(move |info: &ScrollInfo| record.borrow_mut().push(info.y.progress)).options(
            ScrollSettings {
                container: Some(SingleSelector::callback(|doc: &Document, node| {
                    doc.closest(node, ".viewport").ok().flatten()
                })),
                target: Some(SingleSelector::from("& .bar")),
                axis: ScrollAxis::Y,
                offset: vec![ScrollOffset::new("start end"), ScrollOffset::new("end start")],
            },
        ),
    );
    host.attach(progress, &spec)?;

    assert_eq!(
        host.engine().events(),
        vec![Event::Scroll {
            subscription: 0,
            animation: None,
            options: ScrollOptions {
                container: Some(scroller),
                target: Some(bar),
                axis: ScrollAxis::Y,
                offset: vec![ScrollOffset::new("start end"), ScrollOffset::new("end start")],
            },
        }]
    );

    let mut info = ScrollInfo::default();
    info.y.progress = 0.25;
    host.engine_mut().scroll_to(&info);
    info.y.progress = 0.75;
    host.engine_mut().scroll_to(&info);
    assert_eq!(*seen.borrow(), vec![0.25, 0.75]);
    Ok(())
}

#[test]
fn scroll_animation_starts_the_animation_before_linking_it() -> motion_scope::Result<()> {
    let mut host = host()?;
    let bar = host.document().select_one(".bar")?;

    let spec = ActionSpec::from(
        ScrollAnimation::new(
            AnimationSpec::new(Keyframes::new().property("width", ["0%", "100%"])),
        )
        .options(ScrollSettings {
            target: Some(SingleSelector::from("&")),
            ..ScrollSettings::default()
        }),
    );
    host.attach(bar, &spec)?;

    let events = host.engine().events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        Event::Animate { id: 0, targets: MultipleTargets::Element(node), .. } if *node == bar
    ));
    assert!(matches!(
        &events[1],
        Event::Scroll { animation: Some(0), options, .. } if options.target == Some(bar)
    ));
    Ok(())
}

#[test]
fn update_tears_down_before_subscribing_again() -> motion_scope::Result<()> {
    let mut host = host()?;
    let title = host.document().select_one("#title")?;
    let mounts = Rc::new(Cell::new(0));

    let counter = Rc::clone(&mounts);
    let spec = ActionSpec::from(InView::new(|_, _| None)).on_mount(move |doc, node| {
        counter.set(counter.get() + 1);
        doc.set_attr(node, "style", "opacity: 0")
    });
    let id = host.attach(title, &spec)?;
    assert_eq!(host.document().attr(title, "style"), Some("opacity: 0"));
    assert_eq!(host.document().attr_names(title), ["id", "style"]);

    host.update(id, &spec)?;
    host.destroy(id)?;

    assert_eq!(mounts.get(), 1, "on_mount only runs at attach");
    let order: Vec<String> = host
        .engine()
        .events()
        .iter()
        .map(|event| match event {
            Event::InView { subscription, .. } => format!("in_view {subscription}"),
            Event::Teardown(subscription) => format!("teardown {subscription}"),
            other => format!("{other:?}"),
        })
        .collect();
    assert_eq!(order, ["in_view 0", "teardown 0", "in_view 1", "teardown 1"]);
    assert_eq!(host.engine_mut().enter(title), 0);
    Ok(())
}

#[test]
fn enabled_can_toggle_through_updates() -> motion_scope::Result<()> {
    let mut host = host()?;
    let title = host.document().select_one("#title")?;
    let spec = ActionSpec::from(InViewAnimation::new(AnimationSpec::new(fade())));

    let id = host.attach(title, &spec.clone().enabled(false))?;
    assert!(host.engine().events().is_empty());
    assert_eq!(host.node_of(id), Some(title));

    host.update(id, &spec)?;
    host.update(id, &spec.clone().enabled(false))?;
    assert_eq!(host.engine_mut().enter(title), 0);
    assert!(matches!(
        host.engine().events().as_slice(),
        [Event::InView { subscription: 0, .. }, Event::Teardown(0)]
    ));
    Ok(())
}

#[test]
fn presets_attach_the_same_spec_to_many_nodes() -> motion_scope::Result<()> {
    let mut host = host()?;
    let items = host.document().query_selector_all(".item")?;
    let preset = create_action(InViewAnimation::new(AnimationSpec::new(fade())).repeat(true));

    let ids = items
        .iter()
        .map(|item| preset.attach(&mut host, *item))
        .collect::<motion_scope::Result<Vec<_>>>()?;
    assert_eq!(ids.len(), 3);
    assert_eq!(host.mounted_count(), 3);

    host.engine_mut().enter(items[1]);
    assert!(matches!(
        host.engine().animations().as_slice(),
        [Event::Animate { targets: MultipleTargets::Element(node), .. }] if *node == items[1]
    ));

    for id in ids {
        host.destroy(id)?;
    }
    assert_eq!(host.mounted_count(), 0);
    Ok(())
}

#[test]
fn animation_presets_load_from_json() -> motion_scope::Result<()> {
    let mut host = host()?;
    let title = host.document().select_one("#title")?;

    let keyframes: Keyframes = serde_json::from_str(
        r#"{"opacity": [0, 1], "transform": ["translateY(10px)", "translateY(0px)"]}"#,
    )
    .expect("keyframes json");
    let options: AnimationOptions =
        serde_json::from_str(r#"{"duration": 0.5, "easing": "ease-out"}"#).expect("options json");

    let spec = ActionSpec::from(InViewAnimation::new(
        AnimationSpec::new(keyframes.clone()).options(options.clone()),
    ));
    host.attach(title, &spec)?;
    host.engine_mut().enter(title);

    assert_eq!(
        host.engine().animations(),
        vec![Event::Animate {
            id: 0,
            targets: MultipleTargets::Element(title),
            keyframes,
            options,
        }]
    );
    Ok(())
}

#[test]
fn failed_attach_leaves_nothing_behind() -> motion_scope::Result<()> {
    let mut host = host()?;
    let list = host.document().select_one("#list")?;

    let spec = ActionSpec::from(ScrollAnimation::new(
        AnimationSpec::new(fade()).elements("&>li:unknown-pseudo"),
    ));
    let err = host.attach(list, &spec).expect_err("bad selector");
    assert!(matches!(err, motion_scope::Error::UnsupportedSelector(_)));
    assert_eq!(host.mounted_count(), 0);
    assert!(host.engine().events().is_empty());
    assert!(!host.document().has_attr(list, MARKER_ATTRIBUTE));

    let refusing = ActionSpec::from(Scroll::new(|_| {})).on_mount(|_, _| {
        Err(motion_scope::Error::NotAnElement("refused".into()))
    });
    assert!(host.attach(list, &refusing).is_err());
    assert!(host.engine().events().is_empty());
    Ok(())
}

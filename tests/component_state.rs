//! Component state protocol, end to end.
//!
//! Covers the setState contract: scoped re-reconciliation, the single
//! attribute mutation of the counter scenario, child replacement on a
//! rendered type change, listener-driven updates through dispatch, and
//! the detached/re-entrant failure modes.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use sapwood::{
    ChangeFlags, Component, Element, HostOp, MemoryHost, Props, PropValue, RenderError, Renderer,
    Scope, State, Updater, dispatch,
};

// =============================================================================
// Helpers
// =============================================================================

fn session() -> (Rc<RefCell<MemoryHost>>, sapwood::HostHandle, Renderer) {
    let host = Rc::new(RefCell::new(MemoryHost::new()));
    let container = host.borrow_mut().create_root();
    let renderer = Renderer::new(host.clone(), container);
    (host, container, renderer)
}

type UpdaterSlot = Rc<RefCell<Option<Updater>>>;

/// Prop handler that stashes the component's updater for the test body.
fn capture_prop(slot: &UpdaterSlot) -> PropValue {
    let slot = slot.clone();
    PropValue::Handler(Rc::new(move |payload: &dyn Any| {
        if let Some(updater) = payload.downcast_ref::<Updater>() {
            *slot.borrow_mut() = Some(updater.clone());
        }
    }))
}

fn expose_updater(scope: &Scope<'_>) {
    if let Some(capture) = scope.props.get("capture").and_then(PropValue::as_handler) {
        capture(&scope.updater());
    }
}

// =============================================================================
// Components Under Test
// =============================================================================

/// Renders its count as a bare text node.
#[derive(Default)]
struct Counter;

impl Component for Counter {
    fn initial_state(&self, props: &Props) -> Option<State> {
        let start = props.get("start").and_then(PropValue::as_int).unwrap_or(0);
        Some(State::new().with("count", start))
    }

    fn render(&self, scope: &Scope<'_>) -> Element {
        expose_updater(scope);
        let count = scope.state.get("count").and_then(PropValue::as_int).unwrap_or(0);
        Element::text(count)
    }
}

/// Renders a button whose click handler bumps the count shown inside it.
#[derive(Default)]
struct CounterButton;

impl Component for CounterButton {
    fn initial_state(&self, _props: &Props) -> Option<State> {
        Some(State::new().with("count", 0i64))
    }

    fn render(&self, scope: &Scope<'_>) -> Element {
        let count = scope.state.get("count").and_then(PropValue::as_int).unwrap_or(0);
        let updater = scope.updater();
        Element::host(
            "button",
            Props::new()
                .on("click", move |_| {
                    let _ = updater.set_state(State::new().with("count", count + 1));
                })
                .child(Element::text(count)),
        )
    }
}

/// Renders a different host tag depending on its state.
#[derive(Default)]
struct Toggle;

impl Component for Toggle {
    fn initial_state(&self, _props: &Props) -> Option<State> {
        Some(State::new().with("open", false))
    }

    fn render(&self, scope: &Scope<'_>) -> Element {
        expose_updater(scope);
        let open = scope.state.get("open").and_then(PropValue::as_bool).unwrap_or(false);
        if open {
            Element::host("div", Props::new())
        } else {
            Element::host("span", Props::new())
        }
    }
}

/// Violates the purity contract by updating state from inside render.
#[derive(Default)]
struct SelfUpdating;

impl Component for SelfUpdating {
    fn render(&self, scope: &Scope<'_>) -> Element {
        let result = scope.updater().set_state(State::new().with("x", 1i64));
        if let Some(report) = scope.props.get("report").and_then(PropValue::as_handler) {
            report(&result);
        }
        Element::text("")
    }
}

/// Component that renders another component.
#[derive(Default)]
struct Outer;

impl Component for Outer {
    fn render(&self, scope: &Scope<'_>) -> Element {
        let mut props = Props::new();
        if let Some(capture) = scope.props.get("capture") {
            props = props.attr("capture", capture.clone());
        }
        Element::component::<Counter>(props)
    }
}

// =============================================================================
// The Counter Scenario
// =============================================================================

#[test]
fn set_state_updates_only_the_text_value() {
    let (host, container, mut renderer) = session();
    let slot: UpdaterSlot = Rc::new(RefCell::new(None));

    renderer
        .render(Element::component::<Counter>(
            Props::new().attr("capture", capture_prop(&slot)),
        ))
        .unwrap();

    let text = host.borrow().children(container)[0];
    assert_eq!(host.borrow().text_value(text), Some("0".to_string()));
    host.borrow_mut().clear_ops();

    let updater = slot.borrow().clone().unwrap();
    let flags = updater.set_state(State::new().with("count", 1i64)).unwrap();

    assert_eq!(flags, ChangeFlags::ATTRIBUTES);
    assert_eq!(host.borrow().text_value(text), Some("1".to_string()));
    // Exactly one attribute assignment, no structural work, and every
    // recorded op touches the text node alone.
    assert_eq!(
        host.borrow()
            .ops()
            .iter()
            .filter(|op| matches!(op, HostOp::SetAttribute { .. }))
            .count(),
        1
    );
    assert!(host.borrow().ops().iter().all(|op| !op.is_structural()));
    assert!(host.borrow().ops().iter().all(|op| op.touches(text)));
}

#[test]
fn initial_state_seeds_from_props_once() {
    let (host, container, mut renderer) = session();
    let slot: UpdaterSlot = Rc::new(RefCell::new(None));

    renderer
        .render(Element::component::<Counter>(
            Props::new()
                .attr("start", 40i64)
                .attr("capture", capture_prop(&slot)),
        ))
        .unwrap();
    let text = host.borrow().children(container)[0];
    assert_eq!(host.borrow().text_value(text), Some("40".to_string()));

    // A later pass replaces props but must not re-seed the state.
    let updater = slot.borrow().clone().unwrap();
    updater.set_state(State::new().with("count", 41i64)).unwrap();
    renderer
        .render(Element::component::<Counter>(
            Props::new()
                .attr("start", 99i64)
                .attr("capture", capture_prop(&slot)),
        ))
        .unwrap();
    assert_eq!(host.borrow().text_value(text), Some("41".to_string()));
}

// =============================================================================
// Scoping
// =============================================================================

#[test]
fn set_state_never_touches_nodes_outside_the_subtree() {
    let (host, container, mut renderer) = session();
    let slot: UpdaterSlot = Rc::new(RefCell::new(None));

    renderer
        .render(Element::host(
            "div",
            Props::new()
                .child(Element::host(
                    "section",
                    Props::new().child(Element::component::<Counter>(
                        Props::new().attr("capture", capture_prop(&slot)),
                    )),
                ))
                .child(Element::host(
                    "p",
                    Props::new().child(Element::text("static")),
                )),
        ))
        .unwrap();

    let div = host.borrow().children(container)[0];
    let section = host.borrow().children(div)[0];
    let counter_text = host.borrow().children(section)[0];
    host.borrow_mut().clear_ops();

    let updater = slot.borrow().clone().unwrap();
    updater.set_state(State::new().with("count", 5i64)).unwrap();

    assert_eq!(host.borrow().text_value(counter_text), Some("5".to_string()));
    // Zero operations anywhere but the component's own text node.
    assert!(host.borrow().ops().iter().all(|op| op.touches(counter_text)));
}

// =============================================================================
// Rendered Type Change
// =============================================================================

#[test]
fn state_change_can_replace_the_rendered_child() {
    let (host, container, mut renderer) = session();
    let slot: UpdaterSlot = Rc::new(RefCell::new(None));

    renderer
        .render(Element::component::<Toggle>(
            Props::new().attr("capture", capture_prop(&slot)),
        ))
        .unwrap();
    let before = host.borrow().children(container)[0];
    assert_eq!(host.borrow().tag(before), Some("span"));

    let updater = slot.borrow().clone().unwrap();
    let flags = updater.set_state(State::new().with("open", true)).unwrap();
    assert!(flags.contains(ChangeFlags::STRUCTURE));

    let after = host.borrow().children(container)[0];
    assert_ne!(after, before);
    assert_eq!(host.borrow().tag(after), Some("div"));

    // The session keeps working against the adopted host node.
    renderer
        .render(Element::component::<Toggle>(
            Props::new().attr("capture", capture_prop(&slot)),
        ))
        .unwrap();
    assert_eq!(host.borrow().children(container).len(), 1);
}

// =============================================================================
// Listener-Driven Updates
// =============================================================================

#[test]
fn click_dispatch_drives_successive_updates() {
    let (host, container, mut renderer) = session();

    renderer
        .render(Element::component::<CounterButton>(Props::new()))
        .unwrap();
    let button = host.borrow().children(container)[0];
    let text = host.borrow().children(button)[0];

    assert_eq!(dispatch(&host, button, "click", &()), 1);
    assert_eq!(host.borrow().text_value(text), Some("1".to_string()));

    // The re-render swapped the handler; the currently bound one must see
    // the new count.
    assert_eq!(dispatch(&host, button, "click", &()), 1);
    assert_eq!(host.borrow().text_value(text), Some("2".to_string()));
    assert_eq!(host.borrow().listener_count(button, "click"), 1);
}

// =============================================================================
// Failure Modes
// =============================================================================

#[test]
fn detached_updater_reports_an_error() {
    let (host, _container, mut renderer) = session();
    let slot: UpdaterSlot = Rc::new(RefCell::new(None));

    renderer
        .render(Element::component::<Counter>(
            Props::new().attr("capture", capture_prop(&slot)),
        ))
        .unwrap();
    let updater = slot.borrow().clone().unwrap();

    // Replacing the root unmounts the component; the back-reference is
    // now stale.
    renderer.render(Element::host("div", Props::new())).unwrap();
    drop(host);

    assert_eq!(
        updater.set_state(State::new().with("count", 1i64)),
        Err(RenderError::Detached)
    );
}

#[test]
fn set_state_inside_render_is_rejected() {
    let (_host, _container, mut renderer) = session();
    let seen: Rc<RefCell<Option<Result<ChangeFlags, RenderError>>>> =
        Rc::new(RefCell::new(None));

    let seen_in_render = seen.clone();
    let report = PropValue::Handler(Rc::new(move |payload: &dyn Any| {
        if let Some(result) = payload.downcast_ref::<Result<ChangeFlags, RenderError>>() {
            *seen_in_render.borrow_mut() = Some(result.clone());
        }
    }));

    renderer
        .render(Element::component::<SelfUpdating>(
            Props::new().attr("report", report),
        ))
        .unwrap();

    assert_eq!(*seen.borrow(), Some(Err(RenderError::Reentrant)));
}

// =============================================================================
// Nesting
// =============================================================================

#[test]
fn component_in_component_adopts_the_leaf_host() {
    let (host, container, mut renderer) = session();
    let slot: UpdaterSlot = Rc::new(RefCell::new(None));

    renderer
        .render(Element::component::<Outer>(
            Props::new().attr("capture", capture_prop(&slot)),
        ))
        .unwrap();

    // Outer → Counter → text node: three instances, one host node.
    assert_eq!(renderer.instance_count(), 3);
    let children = host.borrow().children(container);
    assert_eq!(children.len(), 1);
    assert_eq!(host.borrow().text_value(children[0]), Some("0".to_string()));

    // The inner component's updater still works through the nesting.
    let updater = slot.borrow().clone().unwrap();
    updater.set_state(State::new().with("count", 3i64)).unwrap();
    assert_eq!(host.borrow().text_value(children[0]), Some("3".to_string()));

    renderer.unmount().unwrap();
    assert_eq!(renderer.instance_count(), 0);
    assert!(host.borrow().children(container).is_empty());
}

//! Description tree - elements, props, and component references.
//!
//! Elements are immutable descriptions of desired nodes, produced fresh
//! each render and consumed by a reconciliation pass. An element is either
//! a host tag (rendered as one host node) or a component constructor
//! reference (rendered by asking the component for its single child).

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::component::Component;
use crate::types::{NODE_VALUE, PropValue, TEXT_ELEMENT};

// =============================================================================
// Element
// =============================================================================

/// Immutable description of one desired node.
#[derive(Clone, Debug)]
pub struct Element {
    /// What kind of node this describes.
    pub kind: ElementKind,
    /// Named values plus ordered children.
    pub props: Props,
}

impl Element {
    /// Element for a host tag.
    pub fn host(tag: impl Into<String>, props: Props) -> Self {
        Element {
            kind: ElementKind::Host(tag.into()),
            props,
        }
    }

    /// Text node: the [`TEXT_ELEMENT`] sentinel tag carrying only a
    /// [`NODE_VALUE`] attribute. Children and listeners do not apply.
    pub fn text(value: impl Into<PropValue>) -> Self {
        Element {
            kind: ElementKind::Host(TEXT_ELEMENT.to_string()),
            props: Props::new().attr(NODE_VALUE, value),
        }
    }

    /// Element for a component constructor.
    pub fn component<C: Component + Default>(props: Props) -> Self {
        Element {
            kind: ElementKind::component::<C>(),
            props,
        }
    }

    /// Whether this element is the text sentinel.
    pub fn is_text(&self) -> bool {
        matches!(&self.kind, ElementKind::Host(tag) if tag == TEXT_ELEMENT)
    }
}

// =============================================================================
// Element Kind
// =============================================================================

/// Tagged element type: a host tag name or a component constructor
/// reference. Reconciliation switches exhaustively on this.
#[derive(Clone)]
pub enum ElementKind {
    /// Host tag name, handed verbatim to the adapter.
    Host(String),
    /// Component constructor reference.
    Component(ComponentSpec),
}

impl ElementKind {
    /// Kind for a component constructor.
    pub fn component<C: Component + Default>() -> Self {
        ElementKind::Component(ComponentSpec::of::<C>())
    }

    /// Type equality as reconciliation sees it: host tags compare by name,
    /// component references by constructor identity, and a host tag never
    /// matches a component.
    pub fn same_type(&self, other: &ElementKind) -> bool {
        match (self, other) {
            (ElementKind::Host(a), ElementKind::Host(b)) => a == b,
            (ElementKind::Component(a), ElementKind::Component(b)) => {
                a.type_id() == b.type_id()
            }
            _ => false,
        }
    }

    /// Tag or component name, for diagnostics.
    pub fn name(&self) -> &str {
        match self {
            ElementKind::Host(tag) => tag,
            ElementKind::Component(spec) => spec.name(),
        }
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Host(tag) => write!(f, "Host({tag:?})"),
            ElementKind::Component(spec) => write!(f, "Component({})", spec.name()),
        }
    }
}

// =============================================================================
// Component Spec
// =============================================================================

/// Reference to a component constructor.
///
/// Carries the constructor identity used for type comparison and a factory
/// producing the boxed behavior when an instance mounts.
#[derive(Clone)]
pub struct ComponentSpec {
    name: &'static str,
    type_id: TypeId,
    factory: Rc<dyn Fn() -> Box<dyn Component>>,
}

impl ComponentSpec {
    /// Spec for component type `C`.
    pub fn of<C: Component + Default>() -> Self {
        ComponentSpec {
            name: std::any::type_name::<C>(),
            type_id: TypeId::of::<C>(),
            factory: Rc::new(|| Box::new(C::default()) as Box<dyn Component>),
        }
    }

    /// Construct the behavior for a new instance.
    pub(crate) fn construct(&self) -> Box<dyn Component> {
        (self.factory)()
    }

    /// Component type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }
}

// =============================================================================
// Props
// =============================================================================

/// Named values plus ordered children.
///
/// Names with the [`crate::types::LISTENER_PREFIX`] denote listeners;
/// everything else is a plain attribute. Children live outside the value
/// map. A `None` child is an explicit hole: it reconciles as a missing
/// element at that index, and later siblings shift down by one on the
/// following pass.
#[derive(Clone, Default, Debug)]
pub struct Props {
    values: BTreeMap<String, PropValue>,
    /// Ordered children; `None` entries are holes.
    pub children: Vec<Option<Element>>,
}

impl Props {
    /// Empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Register a listener for an event category (`"click"` → `onclick`).
    pub fn on(mut self, event: &str, callback: impl Fn(&dyn Any) + 'static) -> Self {
        let name = format!("{}{event}", crate::types::LISTENER_PREFIX);
        self.values.insert(name, PropValue::Handler(Rc::new(callback)));
        self
    }

    /// Append one child.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Some(child));
        self
    }

    /// Append an explicit hole.
    pub fn hole(mut self) -> Self {
        self.children.push(None);
        self
    }

    /// Append children in order.
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children.into_iter().map(Some));
        self
    }

    /// Append children including holes.
    pub fn child_slots(mut self, slots: impl IntoIterator<Item = Option<Element>>) -> Self {
        self.children.extend(slots);
        self
    }

    /// Read one named value.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// Iterate named values in a stable (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of named values, children excluded.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no named values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Core types for sapwood.
//!
//! These types define the foundation that everything builds on.
//! They flow through every reconciliation pass and define what a host
//! adapter is asked to store: plain attribute values, listener callbacks,
//! and component state.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

// =============================================================================
// Sentinels
// =============================================================================

/// Host tag reserved for text nodes.
///
/// A text node carries a single [`NODE_VALUE`] attribute and no children.
pub const TEXT_ELEMENT: &str = "TEXT ELEMENT";

/// Attribute name carrying a text node's content.
pub const NODE_VALUE: &str = "nodeValue";

/// Reserved prefix marking listener props (`onclick`, `onsubmit`, ...).
///
/// Every other prop name is a plain attribute.
pub const LISTENER_PREFIX: &str = "on";

/// Split a prop name into its event category, if it is listener-named.
///
/// `onClick` becomes `click`; names without the prefix (and the bare
/// prefix itself) return `None`.
pub fn listener_event(name: &str) -> Option<String> {
    name.strip_prefix(LISTENER_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(|rest| rest.to_ascii_lowercase())
}

// =============================================================================
// Callbacks
// =============================================================================

/// Event callback stored in props and registered on host nodes.
///
/// The payload is host-defined; the engine never invokes listeners itself.
/// Callbacks are compared by identity across passes, so re-registering the
/// same `Rc` leaves the effective bound handler set unchanged.
pub type EventCallback = Rc<dyn Fn(&dyn Any)>;

// =============================================================================
// Prop Value
// =============================================================================

/// A single named value in props or component state.
#[derive(Clone)]
pub enum PropValue {
    /// Text content or string attribute.
    Text(String),
    /// Integer attribute.
    Int(i64),
    /// Floating point attribute.
    Float(f64),
    /// Boolean attribute.
    Bool(bool),
    /// Listener callback; only meaningful under a listener-named prop.
    Handler(EventCallback),
}

impl PropValue {
    /// Borrow the callback if this value is a handler.
    pub fn as_handler(&self) -> Option<&EventCallback> {
        match self {
            PropValue::Handler(callback) => Some(callback),
            _ => None,
        }
    }

    /// Borrow the string if this value is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Read the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Read the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Text(a), PropValue::Text(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            // Handlers compare by callback identity, not by behavior.
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(text) => f.write_str(text),
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(text) => write!(f, "Text({text:?})"),
            PropValue::Int(value) => write!(f, "Int({value})"),
            PropValue::Float(value) => write!(f, "Float({value})"),
            PropValue::Bool(value) => write!(f, "Bool({value})"),
            PropValue::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<EventCallback> for PropValue {
    fn from(callback: EventCallback) -> Self {
        PropValue::Handler(callback)
    }
}

// =============================================================================
// Component State
// =============================================================================

/// Component state: a name → value map, shallow-merged on updates.
///
/// Fields in a partial update override same-named fields; all others are
/// left untouched.
#[derive(Clone, Default, PartialEq)]
pub struct State {
    values: BTreeMap<String, PropValue>,
}

impl State {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Insert or overwrite one field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Read one field.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// Shallow-merge `partial` into this state.
    pub fn merge(&mut self, partial: State) {
        for (name, value) in partial.values {
            self.values.insert(name, value);
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the state has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}

// =============================================================================
// Change Flags
// =============================================================================

bitflags! {
    /// What a reconciliation pass touched in the host tree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChangeFlags: u8 {
        /// Host nodes were created, replaced or removed.
        const STRUCTURE = 1 << 0;
        /// Attributes were written or cleared.
        const ATTRIBUTES = 1 << 1;
        /// Listeners were registered or unregistered.
        const LISTENERS = 1 << 2;
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Component base - stateful units and their update protocol.
//!
//! A component contributes behavior only: its props and state are owned by
//! the engine (the [`PublicInstance`]) and handed to `render` through a
//! borrowed [`Scope`]. State updates go through the [`Updater`] handle,
//! which merges the partial state and synchronously reconciles the
//! component's own subtree.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use tracing::warn;

use crate::element::{Element, Props};
use crate::engine::{EngineCore, InstanceKey};
use crate::error::RenderError;
use crate::types::{ChangeFlags, State};

// =============================================================================
// Component Trait
// =============================================================================

/// A stateful unit producing exactly one child element.
///
/// `render` must be a pure function of the scope's props and state;
/// requesting a state update from inside `render` is a contract violation
/// and is rejected as [`RenderError::Reentrant`].
pub trait Component: 'static {
    /// Seed the initial state. `None` leaves the state empty; the engine
    /// never overwrites a seeded value.
    fn initial_state(&self, props: &Props) -> Option<State> {
        let _ = props;
        None
    }

    /// Produce the single child element for the current props and state.
    fn render(&self, scope: &Scope<'_>) -> Element;
}

// =============================================================================
// Scope
// =============================================================================

/// Borrowed view of a component's current props and state.
pub struct Scope<'a> {
    /// Props assigned by the most recent pass.
    pub props: &'a Props,
    /// Current state.
    pub state: &'a State,
    updater: Updater,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(props: &'a Props, state: &'a State, updater: Updater) -> Self {
        Scope {
            props,
            state,
            updater,
        }
    }

    /// Handle for requesting state updates; clone it into listener
    /// closures.
    pub fn updater(&self) -> Updater {
        self.updater.clone()
    }
}

// =============================================================================
// Updater
// =============================================================================

/// Non-owning back-reference from a component to its instance.
///
/// Holds a weak engine pointer plus the instance's arena key; used solely
/// to request a reconciliation pass, never for lifetime management. Once
/// the instance is unmounted the key stops resolving and updates return
/// [`RenderError::Detached`].
#[derive(Clone)]
pub struct Updater {
    pub(crate) core: Weak<RefCell<EngineCore>>,
    pub(crate) key: InstanceKey,
}

impl Updater {
    /// Shallow-merge `partial` into the component state, then synchronously
    /// reconcile this component's own subtree against its re-rendered
    /// output. Nodes outside the subtree are untouched.
    pub fn set_state(&self, partial: State) -> Result<ChangeFlags, RenderError> {
        let Some(core) = self.core.upgrade() else {
            warn!("set_state on a dropped renderer session");
            return Err(RenderError::Detached);
        };
        let Ok(mut core) = core.try_borrow_mut() else {
            warn!("set_state re-entered during an in-flight pass");
            return Err(RenderError::Reentrant);
        };
        core.update_component(self.key, partial)
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Updater({:?})", self.key)
    }
}

// =============================================================================
// Public Instance
// =============================================================================

/// Engine-owned side of a mounted component: current props, current state,
/// and the boxed behavior.
pub struct PublicInstance {
    /// Props, replaced on every pass that reaches this component.
    pub props: Props,
    /// State, merged on partial updates.
    pub state: State,
    pub(crate) behavior: Box<dyn Component>,
}

impl PublicInstance {
    /// Build the public side for a freshly constructed behavior. The state
    /// starts from `initial_state` when seeded, empty otherwise.
    pub(crate) fn new(props: Props, behavior: Box<dyn Component>) -> Self {
        let state = behavior.initial_state(&props).unwrap_or_default();
        PublicInstance {
            props,
            state,
            behavior,
        }
    }

    /// Run the component's render against the current props and state.
    pub(crate) fn render(&self, updater: Updater) -> Element {
        let scope = Scope::new(&self.props, &self.state, updater);
        self.behavior.render(&scope)
    }
}

impl fmt::Debug for PublicInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicInstance")
            .field("props", &self.props.len())
            .field("state", &self.state)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

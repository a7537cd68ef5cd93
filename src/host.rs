//! Host adapter contract.
//!
//! The engine drives an externally-owned rendered tree through this trait:
//! node creation, attribute and listener assignment, and child attachment.
//! Handles are opaque, comparison-only tokens minted by the adapter; the
//! engine never inspects their structure and never invokes listeners.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::HostError;
use crate::types::{EventCallback, PropValue};

// =============================================================================
// Host Handle
// =============================================================================

/// Opaque token identifying a node in the host tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HostHandle(u64);

impl HostHandle {
    /// Mint a handle from an adapter-chosen id.
    pub const fn new(id: u64) -> Self {
        HostHandle(id)
    }

    /// The adapter-chosen id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

// =============================================================================
// Host Adapter
// =============================================================================

/// Primitive operations over the host tree.
///
/// Every operation is fallible; a failure aborts the reconciliation pass
/// that issued it.
pub trait HostAdapter {
    /// Create a detached node for a host tag.
    fn create_node(&mut self, tag: &str) -> Result<HostHandle, HostError>;

    /// Create a detached text-bearing node. Content arrives afterwards as
    /// the `nodeValue` attribute.
    fn create_text_node(&mut self) -> Result<HostHandle, HostError>;

    /// Attach `child` as the last child of `parent`.
    fn append_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError>;

    /// Substitute `new` for `old` at `old`'s position under `parent`.
    fn replace_child(
        &mut self,
        parent: HostHandle,
        old: HostHandle,
        new: HostHandle,
    ) -> Result<(), HostError>;

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError>;

    /// Assign a named attribute.
    fn set_attribute(
        &mut self,
        node: HostHandle,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError>;

    /// Clear a named attribute. Clearing an absent attribute is not an
    /// error.
    fn clear_attribute(&mut self, node: HostHandle, name: &str) -> Result<(), HostError>;

    /// Register `callback` for an event category on a node.
    fn add_listener(
        &mut self,
        node: HostHandle,
        event: &str,
        callback: EventCallback,
    ) -> Result<(), HostError>;

    /// Unregister a previously registered callback, matched by identity.
    /// Removing an unregistered callback is not an error.
    fn remove_listener(
        &mut self,
        node: HostHandle,
        event: &str,
        callback: &EventCallback,
    ) -> Result<(), HostError>;
}

/// Forwarding impl so callers can hand the engine a shared adapter and
/// keep inspecting it from outside.
impl<A: HostAdapter> HostAdapter for Rc<RefCell<A>> {
    fn create_node(&mut self, tag: &str) -> Result<HostHandle, HostError> {
        self.borrow_mut().create_node(tag)
    }

    fn create_text_node(&mut self) -> Result<HostHandle, HostError> {
        self.borrow_mut().create_text_node()
    }

    fn append_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        self.borrow_mut().append_child(parent, child)
    }

    fn replace_child(
        &mut self,
        parent: HostHandle,
        old: HostHandle,
        new: HostHandle,
    ) -> Result<(), HostError> {
        self.borrow_mut().replace_child(parent, old, new)
    }

    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        self.borrow_mut().remove_child(parent, child)
    }

    fn set_attribute(
        &mut self,
        node: HostHandle,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        self.borrow_mut().set_attribute(node, name, value)
    }

    fn clear_attribute(&mut self, node: HostHandle, name: &str) -> Result<(), HostError> {
        self.borrow_mut().clear_attribute(node, name)
    }

    fn add_listener(
        &mut self,
        node: HostHandle,
        event: &str,
        callback: EventCallback,
    ) -> Result<(), HostError> {
        self.borrow_mut().add_listener(node, event, callback)
    }

    fn remove_listener(
        &mut self,
        node: HostHandle,
        event: &str,
        callback: &EventCallback,
    ) -> Result<(), HostError> {
        self.borrow_mut().remove_listener(node, event, callback)
    }
}

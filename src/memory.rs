//! In-memory host - the reference adapter.
//!
//! A complete [`HostAdapter`] over an in-memory node tree, plus a recorded
//! operation log. Integration tests assert against the log and the tree
//! shape; embedders can read it as the model for real backends.
//!
//! Detached subtrees are dropped from the node table, so a stale handle
//! surfaces as [`HostError::UnknownHandle`] instead of silently mutating
//! an orphan.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::HostError;
use crate::host::{HostAdapter, HostHandle};
use crate::types::{EventCallback, NODE_VALUE, PropValue};

// =============================================================================
// Nodes
// =============================================================================

/// One node in the in-memory host tree.
#[derive(Default)]
pub struct MemoryNode {
    /// Tag name; empty for text nodes.
    pub tag: String,
    /// Whether this is a text-bearing node.
    pub text: bool,
    /// Current attributes.
    pub attributes: BTreeMap<String, PropValue>,
    /// Listeners per event category. Registration dedupes by callback
    /// identity, so redundant re-registration of the same handler leaves
    /// the bound set unchanged.
    pub listeners: BTreeMap<String, Vec<EventCallback>>,
    /// Ordered children.
    pub children: Vec<HostHandle>,
}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners: BTreeMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(event, callbacks)| (event.as_str(), callbacks.len()))
            .collect();
        f.debug_struct("MemoryNode")
            .field("tag", &self.tag)
            .field("text", &self.text)
            .field("attributes", &self.attributes)
            .field("listeners", &listeners)
            .field("children", &self.children)
            .finish()
    }
}

// =============================================================================
// Operation Log
// =============================================================================

/// Recorded host operation, in issue order.
#[derive(Clone, Debug, PartialEq)]
pub enum HostOp {
    /// A tagged node was created.
    CreateNode {
        node: HostHandle,
        tag: String,
    },
    /// A text node was created.
    CreateTextNode {
        node: HostHandle,
    },
    AppendChild {
        parent: HostHandle,
        child: HostHandle,
    },
    ReplaceChild {
        parent: HostHandle,
        old: HostHandle,
        new: HostHandle,
    },
    RemoveChild {
        parent: HostHandle,
        child: HostHandle,
    },
    SetAttribute {
        node: HostHandle,
        name: String,
        value: PropValue,
    },
    ClearAttribute {
        node: HostHandle,
        name: String,
    },
    AddListener {
        node: HostHandle,
        event: String,
    },
    RemoveListener {
        node: HostHandle,
        event: String,
    },
}

impl HostOp {
    /// Whether this operation created, moved or removed nodes.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HostOp::CreateNode { .. }
                | HostOp::CreateTextNode { .. }
                | HostOp::AppendChild { .. }
                | HostOp::ReplaceChild { .. }
                | HostOp::RemoveChild { .. }
        )
    }

    /// Whether this operation touched `handle` in any role.
    pub fn touches(&self, handle: HostHandle) -> bool {
        match *self {
            HostOp::CreateNode { node, .. }
            | HostOp::CreateTextNode { node }
            | HostOp::SetAttribute { node, .. }
            | HostOp::ClearAttribute { node, .. }
            | HostOp::AddListener { node, .. }
            | HostOp::RemoveListener { node, .. } => node == handle,
            HostOp::AppendChild { parent, child } | HostOp::RemoveChild { parent, child } => {
                parent == handle || child == handle
            }
            HostOp::ReplaceChild { parent, old, new } => {
                parent == handle || old == handle || new == handle
            }
        }
    }
}

// =============================================================================
// Shape
// =============================================================================

/// Structural snapshot of a subtree: a label per node plus child shapes.
/// Text nodes are labelled with their content so value changes show up in
/// shape comparisons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    pub label: String,
    pub children: Vec<Shape>,
}

// =============================================================================
// Memory Host
// =============================================================================

/// In-memory host tree with an operation log.
#[derive(Default)]
pub struct MemoryHost {
    nodes: BTreeMap<u64, MemoryNode>,
    next_id: u64,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    /// Empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached container node usable as a render target.
    /// Container creation is not recorded: containers are externally
    /// owned, not produced by reconciliation.
    pub fn create_root(&mut self) -> HostHandle {
        let handle = self.mint();
        self.nodes.insert(
            handle.id(),
            MemoryNode {
                tag: "root".to_string(),
                ..Default::default()
            },
        );
        handle
    }

    /// Look up a node.
    pub fn get(&self, handle: HostHandle) -> Option<&MemoryNode> {
        self.nodes.get(&handle.id())
    }

    /// A node's tag.
    pub fn tag(&self, handle: HostHandle) -> Option<&str> {
        self.get(handle).map(|node| node.tag.as_str())
    }

    /// A node's current attribute value.
    pub fn attribute(&self, handle: HostHandle, name: &str) -> Option<&PropValue> {
        self.get(handle).and_then(|node| node.attributes.get(name))
    }

    /// A text node's rendered content.
    pub fn text_value(&self, handle: HostHandle) -> Option<String> {
        self.attribute(handle, NODE_VALUE).map(PropValue::to_string)
    }

    /// A node's children, in order.
    pub fn children(&self, handle: HostHandle) -> Vec<HostHandle> {
        self.get(handle)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Number of listeners bound for an event category.
    pub fn listener_count(&self, handle: HostHandle, event: &str) -> usize {
        self.get(handle)
            .and_then(|node| node.listeners.get(event))
            .map(|callbacks| callbacks.len())
            .unwrap_or(0)
    }

    /// Clones of the callbacks currently bound for an event category.
    pub fn listeners(&self, handle: HostHandle, event: &str) -> Vec<EventCallback> {
        self.get(handle)
            .and_then(|node| node.listeners.get(event))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Structural snapshot of the subtree under `handle`.
    pub fn shape(&self, handle: HostHandle) -> Shape {
        let Some(node) = self.get(handle) else {
            return Shape {
                label: "<detached>".to_string(),
                children: Vec::new(),
            };
        };
        let label = if node.text {
            format!("#text:{}", self.text_value(handle).unwrap_or_default())
        } else {
            node.tag.clone()
        };
        Shape {
            label,
            children: node
                .children
                .iter()
                .map(|&child| self.shape(child))
                .collect(),
        }
    }

    /// The recorded operations, in issue order.
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Forget the recorded operations.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn mint(&mut self) -> HostHandle {
        self.next_id += 1;
        HostHandle::new(self.next_id)
    }

    fn node(&self, handle: HostHandle) -> Result<&MemoryNode, HostError> {
        self.nodes
            .get(&handle.id())
            .ok_or(HostError::UnknownHandle(handle))
    }

    fn node_mut(&mut self, handle: HostHandle) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(&handle.id())
            .ok_or(HostError::UnknownHandle(handle))
    }

    /// Drop a detached subtree from the node table.
    fn drop_tree(&mut self, handle: HostHandle) {
        if let Some(node) = self.nodes.remove(&handle.id()) {
            for child in node.children {
                self.drop_tree(child);
            }
        }
    }

    fn child_position(&self, parent: HostHandle, child: HostHandle) -> Result<usize, HostError> {
        self.node(parent)?
            .children
            .iter()
            .position(|&candidate| candidate == child)
            .ok_or(HostError::NotAChild { parent, child })
    }
}

impl HostAdapter for MemoryHost {
    fn create_node(&mut self, tag: &str) -> Result<HostHandle, HostError> {
        let handle = self.mint();
        self.nodes.insert(
            handle.id(),
            MemoryNode {
                tag: tag.to_string(),
                ..Default::default()
            },
        );
        self.ops.push(HostOp::CreateNode {
            node: handle,
            tag: tag.to_string(),
        });
        Ok(handle)
    }

    fn create_text_node(&mut self) -> Result<HostHandle, HostError> {
        let handle = self.mint();
        self.nodes.insert(
            handle.id(),
            MemoryNode {
                text: true,
                ..Default::default()
            },
        );
        self.ops.push(HostOp::CreateTextNode { node: handle });
        Ok(handle)
    }

    fn append_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        self.node(child)?;
        self.node_mut(parent)?.children.push(child);
        self.ops.push(HostOp::AppendChild { parent, child });
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: HostHandle,
        old: HostHandle,
        new: HostHandle,
    ) -> Result<(), HostError> {
        self.node(new)?;
        let position = self.child_position(parent, old)?;
        self.node_mut(parent)?.children[position] = new;
        self.drop_tree(old);
        self.ops.push(HostOp::ReplaceChild { parent, old, new });
        Ok(())
    }

    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        let position = self.child_position(parent, child)?;
        self.node_mut(parent)?.children.remove(position);
        self.drop_tree(child);
        self.ops.push(HostOp::RemoveChild { parent, child });
        Ok(())
    }

    fn set_attribute(
        &mut self,
        node: HostHandle,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        self.node_mut(node)?
            .attributes
            .insert(name.to_string(), value.clone());
        self.ops.push(HostOp::SetAttribute {
            node,
            name: name.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn clear_attribute(&mut self, node: HostHandle, name: &str) -> Result<(), HostError> {
        self.node_mut(node)?.attributes.remove(name);
        self.ops.push(HostOp::ClearAttribute {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: HostHandle,
        event: &str,
        callback: EventCallback,
    ) -> Result<(), HostError> {
        let callbacks = self
            .node_mut(node)?
            .listeners
            .entry(event.to_string())
            .or_default();
        if !callbacks
            .iter()
            .any(|existing| Rc::ptr_eq(existing, &callback))
        {
            callbacks.push(callback);
        }
        self.ops.push(HostOp::AddListener {
            node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: HostHandle,
        event: &str,
        callback: &EventCallback,
    ) -> Result<(), HostError> {
        if let Some(callbacks) = self.node_mut(node)?.listeners.get_mut(event) {
            callbacks.retain(|existing| !Rc::ptr_eq(existing, callback));
        }
        self.ops.push(HostOp::RemoveListener {
            node,
            event: event.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Invoke a node's current listeners for `event`, returning how many ran.
///
/// Callbacks are cloned out before invocation so they may re-enter the
/// host: a setState-driven pass can mutate the tree mid-dispatch.
pub fn dispatch(
    host: &Rc<RefCell<MemoryHost>>,
    node: HostHandle,
    event: &str,
    payload: &dyn Any,
) -> usize {
    let callbacks = host.borrow().listeners(node, event);
    for callback in &callbacks {
        callback(payload);
    }
    callbacks.len()
}

// =============================================================================
// Tests
// =============================================================================

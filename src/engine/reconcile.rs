//! Reconciler - positional diffing of the shadow tree against a new
//! description tree, applied to the host tree as it goes.
//!
//! # Algorithm
//!
//! `reconcile` resolves one (instance, element) pair, cases in order:
//!
//! 1. No instance, an element    → mount a new subtree
//! 2. An instance, no element    → unmount the subtree
//! 3. Differing types            → replace the whole subtree in place
//! 4. Same host tag              → update props, recurse into children
//! 5. Same component constructor → re-render, recurse into the one child
//!
//! Children are paired purely by index, missing side treated as null.
//! Inserting or removing anywhere but the tail shifts every later sibling
//! into a type mismatch, cascading into replacements for the remainder of
//! the list - an O(n) cost for non-tail edits that is part of the
//! contract, not a defect to optimize away.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::{debug, trace, warn};

use crate::component::{PublicInstance, Updater};
use crate::element::{Element, ElementKind, Props};
use crate::error::RenderError;
use crate::host::{HostAdapter, HostHandle};
use crate::types::{ChangeFlags, PropValue, State, TEXT_ELEMENT, listener_event};

use super::instances::{Instance, InstanceContent, InstanceKey, InstanceStore};

// =============================================================================
// Engine Core
// =============================================================================

/// Mutable engine state behind one renderer session.
///
/// Exactly one mutator exists at a time: the session wraps the core in a
/// `RefCell` and both entry points (top-level render and setState) take
/// the borrow for the full pass.
pub struct EngineCore {
    adapter: Box<dyn HostAdapter>,
    pub(crate) instances: InstanceStore,
    container: HostHandle,
    pub(crate) root: Option<InstanceKey>,
    /// Weak self-reference handed out to updaters.
    weak_self: Weak<RefCell<EngineCore>>,
    /// Flags accumulated by the pass in flight.
    flags: ChangeFlags,
}

impl EngineCore {
    pub(crate) fn new(
        adapter: Box<dyn HostAdapter>,
        container: HostHandle,
        weak_self: Weak<RefCell<EngineCore>>,
    ) -> Self {
        EngineCore {
            adapter,
            instances: InstanceStore::new(),
            container,
            root: None,
            weak_self,
            flags: ChangeFlags::empty(),
        }
    }

    // =========================================================================
    // Entry Points
    // =========================================================================

    /// Top-level pass: reconcile the current root against `element`.
    pub(crate) fn render_root(
        &mut self,
        element: Option<Element>,
    ) -> Result<ChangeFlags, RenderError> {
        self.flags = ChangeFlags::empty();
        let container = self.container;
        let root = self.root;
        self.root = self.reconcile(container, root, element)?;
        Ok(self.flags)
    }

    /// setState entry: merge the partial state, then re-run the component
    /// update case rooted at the instance's own host parent. Only that
    /// component's subtree is touched.
    pub(crate) fn update_component(
        &mut self,
        key: InstanceKey,
        partial: State,
    ) -> Result<ChangeFlags, RenderError> {
        let (parent, element) = {
            let Some(instance) = self.instances.get_mut(key) else {
                warn!("set_state on a detached component instance");
                return Err(RenderError::Detached);
            };
            let InstanceContent::Component { public, .. } = &mut instance.content else {
                warn!("set_state target is not a component instance");
                return Err(RenderError::Detached);
            };
            public.state.merge(partial);
            (instance.parent, instance.element.clone())
        };
        debug!(component = element.kind.name(), "state update");
        self.flags = ChangeFlags::empty();
        self.reconcile(parent, Some(key), Some(element))?;
        Ok(self.flags)
    }

    // =========================================================================
    // Reconcile
    // =========================================================================

    /// Resolve one (instance, element) pair under `parent`, returning the
    /// key of the instance now occupying the position, if any.
    fn reconcile(
        &mut self,
        parent: HostHandle,
        instance: Option<InstanceKey>,
        element: Option<Element>,
    ) -> Result<Option<InstanceKey>, RenderError> {
        match (instance, element) {
            (None, None) => Ok(None),

            // Mount: a new position gets a new subtree.
            (None, Some(element)) => {
                debug!(kind = element.kind.name(), "mount");
                let key = self.instantiate(parent, element)?;
                let host = self.host_of(key)?;
                self.adapter.append_child(parent, host)?;
                self.flags |= ChangeFlags::STRUCTURE;
                Ok(Some(key))
            }

            // Unmount: the position is gone. Detaching the subtree's root
            // host node is enough for the host side; the arena frees the
            // bookkeeping underneath it.
            (Some(key), None) => {
                let host = self.host_of(key)?;
                self.adapter.remove_child(parent, host)?;
                if let Some(removed) = self.instances.remove_subtree(key) {
                    debug!(kind = removed.element.kind.name(), "unmount");
                }
                self.flags |= ChangeFlags::STRUCTURE;
                Ok(None)
            }

            (Some(key), Some(element)) => {
                let (same_type, old_host) = {
                    let Some(instance) = self.instances.get(key) else {
                        return Err(RenderError::Detached);
                    };
                    (
                        instance.element.kind.same_type(&element.kind),
                        instance.host,
                    )
                };

                if !same_type {
                    // Replace: new subtree at the same host position.
                    debug!(kind = element.kind.name(), "replace");
                    let new_key = self.instantiate(parent, element)?;
                    let new_host = self.host_of(new_key)?;
                    self.adapter.replace_child(parent, old_host, new_host)?;
                    self.instances.remove_subtree(key);
                    self.flags |= ChangeFlags::STRUCTURE;
                    return Ok(Some(new_key));
                }

                match &element.kind {
                    // In-place update of the existing host node.
                    ElementKind::Host(_) => self.update_host(key, old_host, element),
                    // Same constructor: push new props through a re-render.
                    ElementKind::Component(_) => self.update_component_instance(parent, key, element),
                }
            }
        }
    }

    /// Case 4: same host tag. Rewrite props, reconcile children by index,
    /// keep the instance.
    fn update_host(
        &mut self,
        key: InstanceKey,
        host: HostHandle,
        element: Element,
    ) -> Result<Option<InstanceKey>, RenderError> {
        let previous_props = {
            let Some(instance) = self.instances.get(key) else {
                return Err(RenderError::Detached);
            };
            instance.element.props.clone()
        };
        self.update_properties(host, &previous_props, &element.props)?;

        let new_children = self.reconcile_children(host, key, &element.props.children)?;

        let Some(instance) = self.instances.get_mut(key) else {
            return Err(RenderError::Detached);
        };
        instance.element = element;
        if let InstanceContent::Host { children } = &mut instance.content {
            *children = new_children;
        }
        Ok(Some(key))
    }

    /// Case 5: same component constructor. Assign the new props, render the
    /// single child element, reconcile the existing child against it, and
    /// adopt the resulting child's host handle.
    fn update_component_instance(
        &mut self,
        parent: HostHandle,
        key: InstanceKey,
        element: Element,
    ) -> Result<Option<InstanceKey>, RenderError> {
        let updater = self.updater_for(key);
        let (old_child, child_element) = {
            let Some(instance) = self.instances.get_mut(key) else {
                return Err(RenderError::Detached);
            };
            let InstanceContent::Component { child, public } = &mut instance.content else {
                return Err(RenderError::Detached);
            };
            public.props = element.props.clone();
            let child_element = public.render(updater);
            (*child, child_element)
        };

        let new_child = self.reconcile(parent, Some(old_child), Some(child_element))?;
        let new_host = match new_child {
            Some(child) => Some(self.host_of(child)?),
            None => None,
        };

        let Some(instance) = self.instances.get_mut(key) else {
            return Err(RenderError::Detached);
        };
        instance.element = element;
        if let (Some(new_child), Some(new_host)) = (new_child, new_host) {
            instance.host = new_host;
            if let InstanceContent::Component { child, .. } = &mut instance.content {
                *child = new_child;
            }
        }
        Ok(Some(key))
    }

    /// Pair current child instances and next child elements by index, up
    /// to the combined maximum length; collect the surviving keys in
    /// order.
    fn reconcile_children(
        &mut self,
        host: HostHandle,
        key: InstanceKey,
        next: &[Option<Element>],
    ) -> Result<Vec<InstanceKey>, RenderError> {
        let current: Vec<InstanceKey> = match self.instances.get(key) {
            Some(Instance {
                content: InstanceContent::Host { children },
                ..
            }) => children.clone(),
            _ => Vec::new(),
        };

        let count = current.len().max(next.len());
        let mut reconciled = Vec::with_capacity(count);
        for index in 0..count {
            let child_instance = current.get(index).copied();
            let child_element = next.get(index).cloned().flatten();
            if let Some(child) = self.reconcile(host, child_instance, child_element)? {
                reconciled.push(child);
            }
        }
        Ok(reconciled)
    }

    // =========================================================================
    // Instantiate
    // =========================================================================

    /// Build the instance subtree for `element`. Host nodes are created
    /// and wired internally; attaching the subtree's root under `parent`
    /// is the caller's move (append or replace).
    fn instantiate(&mut self, parent: HostHandle, element: Element) -> Result<InstanceKey, RenderError> {
        match element.kind.clone() {
            ElementKind::Host(tag) => {
                let is_text = tag == TEXT_ELEMENT;
                let host = if is_text {
                    self.adapter.create_text_node()?
                } else {
                    self.adapter.create_node(&tag)?
                };
                self.flags |= ChangeFlags::STRUCTURE;

                // All props applied as an update from an empty previous set.
                self.update_properties(host, &Props::default(), &element.props)?;

                let mut children = Vec::new();
                if !is_text {
                    for child_element in element.props.children.iter().flatten() {
                        let child = self.instantiate(host, child_element.clone())?;
                        let child_host = self.host_of(child)?;
                        self.adapter.append_child(host, child_host)?;
                        children.push(child);
                    }
                }

                Ok(self.instances.insert(Instance {
                    element,
                    host,
                    parent,
                    content: InstanceContent::Host { children },
                }))
            }
            ElementKind::Component(spec) => {
                trace!(component = spec.name(), "instantiate component");

                // Reserve the key first: the updater back-reference points
                // at this instance while it is still being built.
                let key = self.instances.reserve();
                let public = PublicInstance::new(element.props.clone(), spec.construct());
                let child_element = public.render(self.updater_for(key));

                let child = self.instantiate(parent, child_element)?;
                let host = self.host_of(child)?;
                self.instances.fill(
                    key,
                    Instance {
                        element,
                        host,
                        parent,
                        content: InstanceContent::Component { child, public },
                    },
                );
                Ok(key)
            }
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Remove-then-add over the full prop set. There is no value-level
    /// diffing: attributes are rewritten idempotently and listeners are
    /// re-registered even when the handler is unchanged. That redundancy
    /// is part of the contract.
    fn update_properties(
        &mut self,
        host: HostHandle,
        prev: &Props,
        next: &Props,
    ) -> Result<(), RenderError> {
        // Removal pass: every previous listener and attribute goes.
        for (name, value) in prev.iter() {
            match listener_event(name) {
                Some(event) => {
                    if let PropValue::Handler(callback) = value {
                        self.adapter.remove_listener(host, &event, callback)?;
                        self.flags |= ChangeFlags::LISTENERS;
                    }
                }
                None => {
                    self.adapter.clear_attribute(host, name)?;
                    self.flags |= ChangeFlags::ATTRIBUTES;
                }
            }
        }

        // Addition pass: every next listener and attribute is applied.
        for (name, value) in next.iter() {
            match listener_event(name) {
                Some(event) => match value {
                    PropValue::Handler(callback) => {
                        self.adapter.add_listener(host, &event, callback.clone())?;
                        self.flags |= ChangeFlags::LISTENERS;
                    }
                    other => {
                        warn!(name, value = %other, "listener-named prop without a handler, skipped");
                    }
                },
                None => {
                    self.adapter.set_attribute(host, name, value)?;
                    self.flags |= ChangeFlags::ATTRIBUTES;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn host_of(&self, key: InstanceKey) -> Result<HostHandle, RenderError> {
        self.instances
            .get(key)
            .map(|instance| instance.host)
            .ok_or(RenderError::Detached)
    }

    fn updater_for(&self, key: InstanceKey) -> Updater {
        Updater {
            core: self.weak_self.clone(),
            key,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

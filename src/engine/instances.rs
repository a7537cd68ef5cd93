//! Instance arena - the persistent shadow tree.
//!
//! One [`Instance`] exists per live rendered node. Instances refer to each
//! other through generational arena keys, and the same keys serve as the
//! non-owning back-references components use to request updates: a key
//! into a freed slot simply stops resolving.

use slotmap::{SlotMap, new_key_type};

use crate::component::PublicInstance;
use crate::element::Element;
use crate::host::HostHandle;

new_key_type! {
    /// Key of one live instance in the arena.
    pub struct InstanceKey;
}

// =============================================================================
// Instance
// =============================================================================

/// Persistent record mirroring one previously rendered element.
pub struct Instance {
    /// Last element this instance reflects.
    pub element: Element,
    /// Exclusively owned handle of this instance's host node. For a
    /// component instance this is the child subtree's root node.
    pub host: HostHandle,
    /// Host node under which `host` is attached. Recorded at mount so a
    /// state-driven update can re-root itself without querying the host
    /// tree for a parent.
    pub parent: HostHandle,
    /// Children (host tags) or the single child plus component state.
    pub content: InstanceContent,
}

/// Host-tag instances carry ordered children; component instances carry
/// exactly one child plus the public component state.
pub enum InstanceContent {
    /// Rendered host tag.
    Host {
        /// Child instances, in host-tree order.
        children: Vec<InstanceKey>,
    },
    /// Rendered component.
    Component {
        /// The single child instance produced by `render`.
        child: InstanceKey,
        /// Engine-owned props, state and behavior.
        public: PublicInstance,
    },
}

// =============================================================================
// Instance Store
// =============================================================================

/// Arena of live instances.
///
/// Slots are reserved before a component's first render so the updater
/// back-reference has a key to point at while the instance is still being
/// built; a reserved slot reads as vacant until filled.
#[derive(Default)]
pub struct InstanceStore {
    map: SlotMap<InstanceKey, Option<Instance>>,
}

impl InstanceStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a key for an instance under construction.
    pub fn reserve(&mut self) -> InstanceKey {
        self.map.insert(None)
    }

    /// Fill a reserved slot.
    pub fn fill(&mut self, key: InstanceKey, instance: Instance) {
        if let Some(slot) = self.map.get_mut(key) {
            *slot = Some(instance);
        }
    }

    /// Insert a complete instance.
    pub fn insert(&mut self, instance: Instance) -> InstanceKey {
        self.map.insert(Some(instance))
    }

    /// Look up a live instance. Vacant and reserved slots read as `None`.
    pub fn get(&self, key: InstanceKey) -> Option<&Instance> {
        self.map.get(key).and_then(|slot| slot.as_ref())
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, key: InstanceKey) -> Option<&mut Instance> {
        self.map.get_mut(key).and_then(|slot| slot.as_mut())
    }

    /// Remove an instance and every descendant, returning the root record.
    ///
    /// The original bookkeeping left detached subtrees to the garbage
    /// collector; here the arena slots are a held resource, so teardown
    /// walks the subtree and frees every key.
    pub fn remove_subtree(&mut self, key: InstanceKey) -> Option<Instance> {
        let instance = self.map.remove(key).flatten()?;
        match &instance.content {
            InstanceContent::Host { children } => {
                for &child in children {
                    self.remove_subtree(child);
                }
            }
            InstanceContent::Component { child, .. } => {
                self.remove_subtree(*child);
            }
        }
        Some(instance)
    }

    /// Number of live (filled) instances.
    pub fn len(&self) -> usize {
        self.map.values().filter(|slot| slot.is_some()).count()
    }

    /// Whether no live instances remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Renderer session - one per mount target.
//!
//! The session owns the host adapter, the container handle and the current
//! root instance between passes. It is the explicit replacement for any
//! process-wide "current root" state: create one [`Renderer`] per mount
//! target and thread it through calls.
//!
//! A pass runs synchronously to completion before control returns; the
//! session core has exactly one mutator at a time, and a re-entrant pass
//! request (setState from inside a render) is rejected rather than
//! nested.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::element::Element;
use crate::engine::EngineCore;
use crate::error::RenderError;
use crate::host::{HostAdapter, HostHandle};
use crate::types::ChangeFlags;

/// Reconciliation session for one mount target.
pub struct Renderer {
    core: Rc<RefCell<EngineCore>>,
}

impl Renderer {
    /// Create a session rendering into `container`.
    ///
    /// `container` must be a host node able to accept children, created
    /// and owned externally.
    pub fn new(adapter: impl HostAdapter + 'static, container: HostHandle) -> Self {
        let core = Rc::new_cyclic(|weak| {
            RefCell::new(EngineCore::new(Box::new(adapter), container, weak.clone()))
        });
        debug!(?container, "renderer session created");
        Renderer { core }
    }

    /// Mount-or-update: reconcile the current root against `element` and
    /// store the result as the new root.
    ///
    /// Idempotent across repeated calls with successive desired-state
    /// trees.
    pub fn render(&mut self, element: Element) -> Result<ChangeFlags, RenderError> {
        let mut core = self
            .core
            .try_borrow_mut()
            .map_err(|_| RenderError::Reentrant)?;
        core.render_root(Some(element))
    }

    /// Remove the current root, if any.
    pub fn unmount(&mut self) -> Result<ChangeFlags, RenderError> {
        let mut core = self
            .core
            .try_borrow_mut()
            .map_err(|_| RenderError::Reentrant)?;
        core.render_root(None)
    }

    /// Whether a root is currently mounted.
    pub fn is_mounted(&self) -> bool {
        self.core.borrow().root.is_some()
    }

    /// Number of live instances in the shadow tree.
    pub fn instance_count(&self) -> usize {
        self.core.borrow().instances.len()
    }
}

// =============================================================================
// Tests
// =============================================================================

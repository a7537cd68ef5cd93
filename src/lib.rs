//! # sapwood
//!
//! Host-agnostic tree-reconciliation engine.
//!
//! Given the previously rendered shadow tree and a new declarative
//! description tree, sapwood computes and applies create/update/replace/
//! remove operations against an externally-owned host tree, through a
//! small adapter trait. Stateful components re-trigger reconciliation
//! scoped to their own subtree when their state changes.
//!
//! ## Architecture
//!
//! ```text
//! Element tree ──► Reconciler ──► Instance tree (shadow) ──► HostAdapter
//!                      ▲                                          │
//!                      └────── Updater::set_state (scoped) ◄──────┘
//! ```
//!
//! Diffing is positional: children are paired by index, with no keyed
//! matching, so non-tail edits cascade into replacements. Property updates
//! are remove-then-add over the full prop set. Both are contract, not
//! accident; the op log of the in-memory adapter makes the cost model
//! observable.
//!
//! ## Modules
//!
//! - [`types`] - Core value types (PropValue, State, ChangeFlags)
//! - [`element`] - Description tree (Element, Props, component references)
//! - [`component`] - Stateful components and the update protocol
//! - [`host`] - Host adapter contract and opaque handles
//! - [`engine`] - Instance arena and the reconciler
//! - [`renderer`] - Per-mount-target session and entry points
//! - [`memory`] - In-memory reference adapter with an operation log

pub mod component;
pub mod element;
pub mod engine;
pub mod error;
pub mod host;
pub mod memory;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use types::{
    ChangeFlags, EventCallback, LISTENER_PREFIX, NODE_VALUE, PropValue, State, TEXT_ELEMENT,
    listener_event,
};

pub use element::{ComponentSpec, Element, ElementKind, Props};

pub use component::{Component, PublicInstance, Scope, Updater};

pub use host::{HostAdapter, HostHandle};

pub use error::{HostError, RenderError};

pub use engine::{Instance, InstanceContent, InstanceKey, InstanceStore};

pub use renderer::Renderer;

pub use memory::{HostOp, MemoryHost, MemoryNode, Shape, dispatch};

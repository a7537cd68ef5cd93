//! Instance bookkeeping and the reconciliation algorithm.

mod instances;
mod reconcile;

pub use instances::{Instance, InstanceContent, InstanceKey, InstanceStore};
pub(crate) use reconcile::EngineCore;

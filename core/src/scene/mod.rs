//! Flat node hierarchy for imported models.
//!
//! - [`Hierarchy`] / [`ModelNode`] - Node array with parent links
//! - [`NodeTransform`] - TRS transform using plain arrays
//! - [`HierarchyUpdater`] - Local, world and local-to-ancestor matrices
//! - [`HierarchyError`] - Integrity violations found by validation

mod types;
mod updater;

pub use types::{Ancestors, Hierarchy, HierarchyError, ModelNode, NodeTransform};
pub use updater::HierarchyUpdater;

//! Materials and typed parameter sets.
//!
//! Materials are split into a declaration and its uses:
//!
//! - [`Material`] - **Declaration** naming the effect and default values.
//!   Shared via `Arc` across instances.
//! - [`MaterialInstance`] - A material as bound to a model, carrying the
//!   shadow options the mesh compactor compares.
//! - [`ModelMaterial`] - Named entry in the import settings' material list.
//!
//! Supporting types:
//! - [`ParameterCollection`] / [`ParameterValue`] - Ordered typed key/value set
//! - [`AlphaMode`] - Alpha rendering mode (opaque, mask with cutoff, blend)

mod parameters;
mod types;

pub use parameters::{ParameterCollection, ParameterValue};
pub use types::{AlphaMode, Material, MaterialInstance, ModelMaterial};

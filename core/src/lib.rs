//! # meshforge core
//!
//! Format-agnostic model data and the building blocks of the mesh
//! compaction pipeline: node hierarchy, meshes and their byte buffers,
//! materials, animation clips, bounding volumes, and the admission and
//! cancellation primitives used by import commands.

pub mod animation;
pub mod bounds;
pub mod compute;
pub mod material;
pub mod math;
pub mod mesh;
pub mod model;
pub mod profiling;
pub mod scene;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

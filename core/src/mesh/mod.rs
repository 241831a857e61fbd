//! Mesh data types and the operations the compaction passes run on them.
//!
//! - [`VertexLayout`] - Describes one interleaved vertex stream
//! - [`DrawData`] - Buffer views making up one drawable surface
//! - [`DrawSource`] - Owned, decoded draw data for transforming, merging and splitting
//! - [`merge_draw_sources`] - Concatenate compatible draws under the index limit
//! - Generators for common shapes (sphere, quad)

mod data;
pub mod generators;
pub mod index;
mod layout;
mod source;
pub mod vertex;

pub use data::{
    BufferData, BufferUsage, DrawData, IndexBufferBinding, IndexFormat, MeshError,
    PrimitiveTopology, VertexBufferBinding, buffer_range,
};
pub use index::{U16_VERTEX_LIMIT, compact_index_buffer};
pub use layout::{VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic, VertexLayout};
pub use source::{DrawSource, VertexStream, merge_draw_sources};

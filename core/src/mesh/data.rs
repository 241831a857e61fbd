//! Mesh draw data: byte buffers and the bindings that view into them.
//!
//! This module provides:
//! - [`PrimitiveTopology`] - How vertices are assembled into primitives
//! - [`IndexFormat`] - Index data format (u16 or u32)
//! - [`BufferData`] - A raw byte buffer owned by a model
//! - [`VertexBufferBinding`] / [`IndexBufferBinding`] - Views into buffers
//! - [`DrawData`] - Everything needed to draw one surface
//!
//! Bindings reference buffers by index into the owning model's buffer
//! list, so several bindings may share one buffer.

use serde::{Deserialize, Serialize};

use super::layout::VertexLayout;

/// Errors raised while reading or rewriting mesh data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// A binding references a buffer that does not exist.
    #[error("buffer {buffer} does not exist ({count} buffers)")]
    MissingBuffer {
        /// Referenced buffer index.
        buffer: usize,
        /// Number of buffers available.
        count: usize,
    },
    /// A binding's byte range exceeds its buffer.
    #[error("binding range {offset}..{end} exceeds buffer {buffer} of {len} bytes")]
    RangeOutOfBounds {
        /// Referenced buffer index.
        buffer: usize,
        /// Start of the range.
        offset: usize,
        /// End of the range.
        end: usize,
        /// Buffer length.
        len: usize,
    },
    /// An index buffer's byte length is not a multiple of its element width.
    #[error("index buffer {buffer} is {len} bytes, not a multiple of {width}")]
    MisalignedIndexBuffer {
        /// Referenced buffer index.
        buffer: usize,
        /// Buffer length.
        len: usize,
        /// Index element width in bytes.
        width: usize,
    },
    /// An index refers past the end of the vertex data.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value.
        index: u32,
        /// Number of vertices available.
        vertex_count: usize,
    },
    /// Vertex streams of one draw disagree on vertex count.
    #[error("vertex streams disagree on vertex count ({expected} vs {found})")]
    StreamCountMismatch {
        /// Count of the first stream.
        expected: usize,
        /// Count of the mismatching stream.
        found: usize,
    },
    /// A vertex layout is malformed.
    #[error("invalid vertex layout: {0}")]
    InvalidLayout(String),
}

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Each vertex is a separate point.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
}

impl PrimitiveTopology {
    /// Get the number of vertices per primitive (for non-strip topologies).
    pub fn vertices_per_primitive(&self) -> Option<usize> {
        match self {
            Self::PointList => Some(1),
            Self::LineList => Some(2),
            Self::TriangleList => Some(3),
            Self::LineStrip | Self::TriangleStrip => None, // Variable
        }
    }

    /// Whether independent draws of this topology can be concatenated.
    pub fn is_list(&self) -> bool {
        self.vertices_per_primitive().is_some()
    }
}

/// Index format for indexed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexFormat {
    /// 16-bit unsigned integers (max 65535 vertices).
    #[default]
    Uint16,
    /// 32-bit unsigned integers (max ~4 billion vertices).
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

/// What a buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferUsage {
    /// Vertex data.
    Vertex,
    /// Index data.
    Index,
}

/// A raw byte buffer owned by a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferData {
    /// How the buffer is bound.
    pub usage: BufferUsage,
    /// Raw bytes.
    pub content: Vec<u8>,
}

impl BufferData {
    /// Create a vertex buffer.
    pub fn vertex(content: Vec<u8>) -> Self {
        Self {
            usage: BufferUsage::Vertex,
            content,
        }
    }

    /// Create an index buffer.
    pub fn index(content: Vec<u8>) -> Self {
        Self {
            usage: BufferUsage::Index,
            content,
        }
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Resolve `len` bytes at `offset` of buffer `buffer`.
pub fn buffer_range(
    buffers: &[BufferData],
    buffer: usize,
    offset: usize,
    len: usize,
) -> Result<&[u8], MeshError> {
    let data = buffers.get(buffer).ok_or(MeshError::MissingBuffer {
        buffer,
        count: buffers.len(),
    })?;
    let end = offset + len;
    data.content
        .get(offset..end)
        .ok_or(MeshError::RangeOutOfBounds {
            buffer,
            offset,
            end,
            len: data.len(),
        })
}

/// A vertex stream view: `count` vertices of `layout` starting at `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexBufferBinding {
    /// Index of the buffer in the owning model.
    pub buffer: usize,
    /// Per-vertex layout (gives the stride).
    pub layout: VertexLayout,
    /// Byte offset of the first vertex.
    pub offset: usize,
    /// Number of vertices.
    pub count: u32,
}

impl VertexBufferBinding {
    /// Bytes per vertex.
    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    /// Length of the viewed range in bytes.
    pub fn byte_len(&self) -> usize {
        self.stride() * self.count as usize
    }

    /// The viewed bytes.
    pub fn bytes<'a>(&self, buffers: &'a [BufferData]) -> Result<&'a [u8], MeshError> {
        buffer_range(buffers, self.buffer, self.offset, self.byte_len())
    }
}

/// An index stream view: `count` indices of `format` starting at `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexBufferBinding {
    /// Index of the buffer in the owning model.
    pub buffer: usize,
    /// Element width.
    pub format: IndexFormat,
    /// Byte offset of the first index.
    pub offset: usize,
    /// Number of indices.
    pub count: u32,
}

impl IndexBufferBinding {
    /// Whether indices are 32 bits wide.
    pub fn is_32bit(&self) -> bool {
        self.format == IndexFormat::Uint32
    }

    /// Length of the viewed range in bytes.
    pub fn byte_len(&self) -> usize {
        self.format.size() * self.count as usize
    }

    /// The viewed bytes.
    pub fn bytes<'a>(&self, buffers: &'a [BufferData]) -> Result<&'a [u8], MeshError> {
        buffer_range(buffers, self.buffer, self.offset, self.byte_len())
    }

    /// Decode the viewed indices, widened to u32.
    pub fn indices(&self, buffers: &[BufferData]) -> Result<Vec<u32>, MeshError> {
        Ok(super::index::decode_indices(self.bytes(buffers)?, self.format))
    }
}

/// Everything needed to draw one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawData {
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// One binding per vertex stream.
    pub vertex_buffers: Vec<VertexBufferBinding>,
    /// Index stream, if the draw is indexed.
    pub index_buffer: Option<IndexBufferBinding>,
}

impl DrawData {
    /// Number of vertices (taken from the first stream).
    pub fn vertex_count(&self) -> usize {
        self.vertex_buffers
            .first()
            .map(|b| b.count as usize)
            .unwrap_or(0)
    }

    /// Check that every binding resolves inside its buffer.
    pub fn validate(&self, buffers: &[BufferData]) -> Result<(), MeshError> {
        for binding in &self.vertex_buffers {
            binding.layout.validate()?;
            binding.bytes(buffers)?;
        }
        if let Some(index) = &self.index_buffer {
            index.bytes(buffers)?;
        }
        Ok(())
    }
}

//! Owned, decoded draw data used while rewriting meshes.
//!
//! [`DrawSource`] is extracted from a [`DrawData`] view, edited freely
//! (transformed, merged, split) and then written back as fresh buffers with
//! [`DrawSource::into_draw_data`].

use std::collections::HashMap;

use crate::bounds::{BoundingBox, BoundingSphere};
use crate::math::Mat4;

use super::data::{
    BufferData, DrawData, IndexBufferBinding, MeshError, PrimitiveTopology, VertexBufferBinding,
};
use super::index::{U16_VERTEX_LIMIT, encode_indices, smallest_format};
use super::layout::{VertexAttributeFormat, VertexAttributeSemantic, VertexLayout};
use super::vertex;

/// One interleaved vertex stream.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexStream {
    pub layout: VertexLayout,
    pub data: Vec<u8>,
}

impl VertexStream {
    pub fn new(layout: VertexLayout, data: Vec<u8>) -> Self {
        Self { layout, data }
    }

    /// Number of whole vertices in the stream.
    pub fn vertex_count(&self) -> usize {
        match self.layout.stride() {
            0 => 0,
            stride => self.data.len() / stride,
        }
    }

    fn vertex(&self, index: usize) -> &[u8] {
        let stride = self.layout.stride();
        &self.data[index * stride..(index + 1) * stride]
    }

    /// Re-encode an unsigned integer attribute (`Uint8x4` or `Uint16x4`) as
    /// `Float4`, shifting the attributes that follow it.
    ///
    /// Returns `false` when the layout has no such attribute.
    pub fn widen_to_float4(&mut self, semantic: VertexAttributeSemantic) -> bool {
        let Some(attr) = self.layout.attribute(semantic).copied() else {
            return false;
        };
        let decode: fn(&[u8]) -> [f32; 4] = match attr.format {
            VertexAttributeFormat::Uint8x4 => |b| [b[0] as f32, b[1] as f32, b[2] as f32, b[3] as f32],
            VertexAttributeFormat::Uint16x4 => |b| {
                let v: [u16; 4] = bytemuck::pod_read_unaligned(&b[..8]);
                v.map(|x| x as f32)
            },
            _ => return false,
        };

        let old_stride = self.layout.stride();
        let start = attr.offset as usize;
        let end = start + attr.format.size();
        let grow = VertexAttributeFormat::Float4.size() - attr.format.size();

        let mut data = Vec::with_capacity(self.vertex_count() * (old_stride + grow));
        for vertex in self.data.chunks_exact(old_stride) {
            data.extend_from_slice(&vertex[..start]);
            data.extend_from_slice(bytemuck::bytes_of(&decode(&vertex[start..end])));
            data.extend_from_slice(&vertex[end..]);
        }

        for other in &mut self.layout.attributes {
            if other.offset > attr.offset {
                other.offset += grow as u32;
            } else if other.semantic == semantic && other.offset == attr.offset {
                other.format = VertexAttributeFormat::Float4;
            }
        }
        self.layout.stride += grow as u32;
        self.data = data;
        true
    }
}

/// Decoded draw data: owned vertex streams plus widened indices.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSource {
    pub topology: PrimitiveTopology,
    pub streams: Vec<VertexStream>,
    /// `None` for non-indexed draws.
    pub indices: Option<Vec<u32>>,
}

impl DrawSource {
    /// Create a non-indexed source.
    pub fn new(topology: PrimitiveTopology, streams: Vec<VertexStream>) -> Self {
        Self {
            topology,
            streams,
            indices: None,
        }
    }

    #[must_use]
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Copy the data viewed by `draw` out of `buffers`.
    ///
    /// Fails if a binding falls outside its buffer, the streams disagree on
    /// vertex count, or an index points past the last vertex.
    pub fn from_draw(draw: &DrawData, buffers: &[BufferData]) -> Result<Self, MeshError> {
        let mut streams = Vec::with_capacity(draw.vertex_buffers.len());
        for binding in &draw.vertex_buffers {
            binding.layout.validate()?;
            streams.push(VertexStream::new(
                binding.layout.clone(),
                binding.bytes(buffers)?.to_vec(),
            ));
        }

        let indices = match &draw.index_buffer {
            Some(binding) => Some(binding.indices(buffers)?),
            None => None,
        };

        let source = Self {
            topology: draw.topology,
            streams,
            indices,
        };
        source.validate()?;
        Ok(source)
    }

    /// Check stream counts agree and indices are in range.
    pub fn validate(&self) -> Result<(), MeshError> {
        let expected = self.vertex_count();
        for stream in &self.streams {
            let found = stream.vertex_count();
            if found != expected {
                return Err(MeshError::StreamCountMismatch { expected, found });
            }
        }
        if let Some(indices) = &self.indices
            && let Some(&index) = indices.iter().find(|&&i| i as usize >= expected)
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: expected,
            });
        }
        Ok(())
    }

    /// Number of vertices (first stream).
    pub fn vertex_count(&self) -> usize {
        self.streams.first().map(VertexStream::vertex_count).unwrap_or(0)
    }

    /// Number of elements drawn: indices if indexed, vertices otherwise.
    pub fn element_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.vertex_count(),
        }
    }

    /// Whether two sources can be concatenated into one draw.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.topology == other.topology
            && self.topology.is_list()
            && self.streams.len() == other.streams.len()
            && self
                .streams
                .iter()
                .zip(&other.streams)
                .all(|(a, b)| a.layout == b.layout)
    }

    /// Transform positions, normals and tangents of every stream.
    pub fn transform(&mut self, matrix: &Mat4) {
        for stream in &mut self.streams {
            vertex::transform_vertices(&mut stream.data, &stream.layout, matrix);
        }
    }

    /// Bounds of the first stream's positions after `matrix`.
    ///
    /// `None` when the source has no stream with a usable position.
    pub fn bounds(&self, matrix: &Mat4) -> Option<(BoundingBox, BoundingSphere)> {
        let stream = self.streams.first()?;
        vertex::compute_bounds(&stream.data, &stream.layout, matrix)
    }

    fn indices_or_sequential(&self) -> Vec<u32> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.vertex_count() as u32).collect(),
        }
    }

    /// Append `other`, rebasing its indices after this source's vertices.
    ///
    /// Non-indexed operands are given sequential indices. Callers check
    /// [`is_compatible`](Self::is_compatible) first.
    pub fn append(&mut self, other: DrawSource) {
        let base = self.vertex_count() as u32;
        let mut indices = self.indices_or_sequential();
        indices.extend(other.indices_or_sequential().into_iter().map(|i| i + base));
        self.indices = Some(indices);

        for (stream, extra) in self.streams.iter_mut().zip(other.streams) {
            stream.data.extend_from_slice(&extra.data);
        }
    }

    /// Whether [`split`](Self::split) can break this source up.
    pub fn can_split(&self) -> bool {
        self.topology.is_list()
    }

    /// Break the source into parts of at most `max_vertices` vertices each.
    ///
    /// Primitives are kept whole and in order; each part only carries the
    /// vertices its primitives reference. Sources within the limit, and
    /// strips, are returned unchanged.
    pub fn split(self, max_vertices: usize) -> Vec<DrawSource> {
        let Some(per_primitive) = self.topology.vertices_per_primitive() else {
            return vec![self];
        };
        if self.vertex_count() <= max_vertices || max_vertices < per_primitive {
            return vec![self];
        }

        let indices = self.indices_or_sequential();
        let mut parts = Vec::new();
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut part_vertices: Vec<u32> = Vec::new();
        let mut part_indices: Vec<u32> = Vec::new();

        for primitive in indices.chunks(per_primitive) {
            let new_vertices = primitive.iter().filter(|&&i| !remap.contains_key(&i)).count();
            if part_vertices.len() + new_vertices > max_vertices {
                parts.push(self.gather(&part_vertices, std::mem::take(&mut part_indices)));
                part_vertices.clear();
                remap.clear();
            }
            for &old in primitive {
                let new = *remap.entry(old).or_insert_with(|| {
                    part_vertices.push(old);
                    (part_vertices.len() - 1) as u32
                });
                part_indices.push(new);
            }
        }
        if !part_indices.is_empty() {
            parts.push(self.gather(&part_vertices, part_indices));
        }
        parts
    }

    fn gather(&self, vertices: &[u32], indices: Vec<u32>) -> DrawSource {
        let streams = self
            .streams
            .iter()
            .map(|stream| {
                let mut data = Vec::with_capacity(vertices.len() * stream.layout.stride());
                for &v in vertices {
                    data.extend_from_slice(stream.vertex(v as usize));
                }
                VertexStream::new(stream.layout.clone(), data)
            })
            .collect();
        DrawSource {
            topology: self.topology,
            streams,
            indices: Some(indices),
        }
    }

    /// Write the source into new buffers appended to `buffers`.
    ///
    /// Every stream and the index stream get their own buffer. Indices use
    /// the narrowest format that holds them.
    pub fn into_draw_data(self, buffers: &mut Vec<BufferData>) -> DrawData {
        let mut vertex_buffers = Vec::with_capacity(self.streams.len());
        for stream in self.streams {
            let count = stream.vertex_count() as u32;
            buffers.push(BufferData::vertex(stream.data));
            vertex_buffers.push(VertexBufferBinding {
                buffer: buffers.len() - 1,
                layout: stream.layout,
                offset: 0,
                count,
            });
        }

        let index_buffer = self.indices.map(|indices| {
            let format = smallest_format(&indices);
            buffers.push(BufferData::index(encode_indices(&indices, format)));
            IndexBufferBinding {
                buffer: buffers.len() - 1,
                format,
                offset: 0,
                count: indices.len() as u32,
            }
        });

        DrawData {
            topology: self.topology,
            vertex_buffers,
            index_buffer,
        }
    }
}

/// Merge draw sources into as few draws as possible.
///
/// Compatible sources (same list topology, same stream layouts) are
/// concatenated in input order. Unless `allow_32bit_indices` is set, a merged
/// draw never exceeds [`U16_VERTEX_LIMIT`] vertices; a source that alone
/// exceeds the limit is emitted on its own. Strips are never merged.
/// Output keeps the order in which each compatibility class first appears.
pub fn merge_draw_sources(sources: Vec<DrawSource>, allow_32bit_indices: bool) -> Vec<DrawSource> {
    let limit = if allow_32bit_indices {
        usize::MAX
    } else {
        U16_VERTEX_LIMIT
    };

    let mut classes: Vec<Vec<DrawSource>> = Vec::new();
    for source in sources {
        match classes.iter_mut().find(|class| class[0].is_compatible(&source)) {
            Some(class) => class.push(source),
            None => classes.push(vec![source]),
        }
    }

    let mut merged = Vec::new();
    for class in classes {
        let mut current: Option<DrawSource> = None;
        for source in class {
            match current.as_mut() {
                Some(acc)
                    if acc.vertex_count().saturating_add(source.vertex_count()) <= limit =>
                {
                    acc.append(source);
                }
                _ => {
                    if let Some(done) = current.replace(source) {
                        log::debug!(
                            "Vertex limit {limit} reached, starting a new draw after {} vertices",
                            done.vertex_count()
                        );
                        merged.push(done);
                    }
                }
            }
        }
        merged.extend(current);
    }
    merged
}

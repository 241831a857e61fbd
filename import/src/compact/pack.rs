use meshforge_core::bounds::{BoundingBox, BoundingSphere};
use meshforge_core::mesh::{BufferData, DrawSource, IndexFormat, MeshError, merge_draw_sources};
use meshforge_core::model::{Mesh, Model};
use meshforge_core::scene::HierarchyUpdater;

use crate::error::CompactError;

use super::refine::Refinement;

/// Replace every bucket of `refinement` with merged meshes.
///
/// Members are pre-transformed into the space of the bucket's key node and
/// concatenated with [`merge_draw_sources`]; a bucket yields more than one
/// mesh when the 16-bit index limit forces it. Merged meshes take the name,
/// material and parameters of the bucket's first member, are attached at
/// the key node and carry no skinning.
///
/// The model's mesh list becomes the excluded meshes (in refinement order)
/// followed by the merged ones. Returns the number of merged meshes.
pub fn merge_buckets(
    model: &mut Model,
    refinement: Refinement,
    allow_32bit_indices: bool,
) -> Result<usize, CompactError> {
    let updater = HierarchyUpdater::new(&model.hierarchy);
    let old = std::mem::take(&mut model.meshes);
    let mut meshes: Vec<Mesh> = refinement
        .excluded
        .iter()
        .filter_map(|&index| old.get(index).cloned())
        .collect();

    let mut merged = 0;
    for bucket in refinement.buckets {
        let mut sources = Vec::with_capacity(bucket.meshes.len());
        for &index in &bucket.meshes {
            let mesh = &old[index];
            let mut source = DrawSource::from_draw(&mesh.draw, &model.buffers)
                .map_err(CompactError::mesh(&mesh.name))?;
            let matrix = updater.matrix_to_ancestor(&model.hierarchy, mesh.node_index, bucket.key);
            source.transform(&matrix);
            sources.push(source);
        }

        let representative = &old[bucket.meshes[0]];
        for source in merge_draw_sources(sources, allow_32bit_indices) {
            let draw = source.into_draw_data(&mut model.buffers);
            meshes.push(Mesh {
                name: representative.name.clone(),
                node_index: bucket.key,
                material_index: representative.material_index,
                parameters: representative.parameters.clone(),
                skinning: None,
                draw,
                bounding_box: BoundingBox::empty(),
                bounding_sphere: BoundingSphere::empty(),
            });
            merged += 1;
        }
        log::debug!(
            "Merged {} meshes into {} at node {}",
            bucket.meshes.len(),
            representative.name,
            bucket.key
        );
    }

    model.meshes = meshes;
    Ok(merged)
}

/// Byte totals of [`pack_shared_buffers`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackReport {
    pub vertex_bytes: usize,
    pub index_bytes: usize,
    /// Padding inserted in front of 32-bit index segments.
    pub padding_bytes: usize,
}

/// Running offset of one shared buffer.
#[derive(Default)]
struct Cursor {
    offset: usize,
    padding: usize,
}

impl Cursor {
    fn reserve(&mut self, len: usize, format: Option<IndexFormat>) {
        if format == Some(IndexFormat::Uint32) && self.offset % 4 != 0 {
            self.offset += 2;
            self.padding += 2;
        }
        self.offset += len;
    }
}

fn private_buffer(buffers: &[BufferData], buffer: usize) -> Result<&BufferData, MeshError> {
    buffers.get(buffer).ok_or(MeshError::MissingBuffer {
        buffer,
        count: buffers.len(),
    })
}

fn index_buffer(
    buffers: &[BufferData],
    buffer: usize,
    format: IndexFormat,
) -> Result<&BufferData, MeshError> {
    let data = private_buffer(buffers, buffer)?;
    if data.len() % format.size() != 0 {
        return Err(MeshError::MisalignedIndexBuffer {
            buffer,
            len: data.len(),
            width: format.size(),
        });
    }
    Ok(data)
}

/// Copy every mesh's buffers into one shared vertex buffer and one shared
/// index buffer.
///
/// Each binding's whole private buffer is appended at the running offset of
/// its shared buffer, and the binding is rewritten to point there (its old
/// offset is kept relative to the copied region). A 32-bit index segment
/// that would start at an offset not divisible by 4 is preceded by 2 zero
/// bytes. Afterwards `model.buffers` is exactly `[vertex, index]`.
///
/// Fails before touching the model if a binding names a missing buffer or
/// an index buffer's length is not a multiple of its element width.
pub fn pack_shared_buffers(model: &mut Model) -> Result<PackReport, MeshError> {
    let mut vertex = Cursor::default();
    let mut index = Cursor::default();
    for mesh in &model.meshes {
        for binding in &mesh.draw.vertex_buffers {
            vertex.reserve(private_buffer(&model.buffers, binding.buffer)?.len(), None);
        }
        if let Some(binding) = &mesh.draw.index_buffer {
            let data = index_buffer(&model.buffers, binding.buffer, binding.format)?;
            index.reserve(data.len(), Some(binding.format));
        }
    }

    let mut vertex_data = Vec::with_capacity(vertex.offset);
    let mut index_data = Vec::with_capacity(index.offset);
    let buffers = std::mem::take(&mut model.buffers);
    for mesh in &mut model.meshes {
        for binding in &mut mesh.draw.vertex_buffers {
            let content = &buffers[binding.buffer].content;
            binding.offset += vertex_data.len();
            binding.buffer = 0;
            vertex_data.extend_from_slice(content);
        }
        if let Some(binding) = &mut mesh.draw.index_buffer {
            let content = &buffers[binding.buffer].content;
            if binding.is_32bit() && index_data.len() % 4 != 0 {
                index_data.extend_from_slice(&[0, 0]);
            }
            binding.offset += index_data.len();
            binding.buffer = 1;
            index_data.extend_from_slice(content);
        }
    }
    debug_assert_eq!(vertex_data.len(), vertex.offset);
    debug_assert_eq!(index_data.len(), index.offset);

    model.buffers = vec![BufferData::vertex(vertex_data), BufferData::index(index_data)];
    Ok(PackReport {
        vertex_bytes: vertex.offset,
        index_bytes: index.offset,
        padding_bytes: index.padding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::refine::MeshBucket;
    use crate::compact::tests::{model_with, quad_mesh};
    use meshforge_core::math::Vec3;
    use meshforge_core::mesh::{IndexBufferBinding, PrimitiveTopology, VertexLayout, VertexStream};
    use meshforge_core::scene::{ModelNode, NodeTransform};

    fn triangle_mesh(model: &mut Model, name: &str, format: IndexFormat) -> Mesh {
        let positions = [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let mut draw = DrawSource::new(
            PrimitiveTopology::TriangleList,
            vec![VertexStream::new(
                VertexLayout::position_only(),
                bytemuck::cast_slice(&positions).to_vec(),
            )],
        )
        .into_draw_data(&mut model.buffers);
        let bytes = meshforge_core::mesh::index::encode_indices(&[0, 1, 2], format);
        model.buffers.push(BufferData::index(bytes));
        draw.index_buffer = Some(IndexBufferBinding {
            buffer: model.buffers.len() - 1,
            format,
            offset: 0,
            count: 3,
        });
        Mesh::new(name, 0, 0, draw)
    }

    #[test]
    fn merge_moves_members_into_key_space() {
        let mut model = model_with(
            vec![
                ModelNode::root("root"),
                ModelNode::child("a", 0)
                    .with_transform(NodeTransform::IDENTITY.with_translation([2.0, 0.0, 0.0])),
            ],
            vec![quad_mesh("first", 1, 0), quad_mesh("second", 0, 0)],
        );
        let refinement = Refinement {
            buckets: vec![MeshBucket {
                key: 0,
                meshes: vec![0, 1],
            }],
            excluded: Vec::new(),
        };

        assert_eq!(merge_buckets(&mut model, refinement, false).unwrap(), 1);
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!((mesh.name.as_str(), mesh.node_index), ("first", 0));
        assert_eq!(mesh.draw.vertex_count(), 8);

        let source = DrawSource::from_draw(&mesh.draw, &model.buffers).unwrap();
        let (bbox, _) = source.bounds(&meshforge_core::math::Mat4::identity()).unwrap();
        assert_eq!(bbox.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(bbox.max, Vec3::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn excluded_meshes_come_first() {
        let mut model = model_with(
            vec![ModelNode::root("root")],
            vec![quad_mesh("a", 0, 0), quad_mesh("kept", 0, 0), quad_mesh("b", 0, 0)],
        );
        let refinement = Refinement {
            buckets: vec![MeshBucket {
                key: 0,
                meshes: vec![0, 2],
            }],
            excluded: vec![1],
        };
        merge_buckets(&mut model, refinement, false).unwrap();
        let names: Vec<&str> = model.meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["kept", "a"]);
    }

    #[test]
    fn packing_pads_32bit_index_segments() {
        let mut model = model_with(vec![ModelNode::root("root")], Vec::new());
        let a = triangle_mesh(&mut model, "a", IndexFormat::Uint16);
        let b = triangle_mesh(&mut model, "b", IndexFormat::Uint32);
        let c = triangle_mesh(&mut model, "c", IndexFormat::Uint32);
        model.meshes = vec![a, b, c];
        let original: Vec<Vec<u8>> = model
            .meshes
            .iter()
            .filter_map(|m| m.draw.index_buffer.as_ref())
            .map(|b| b.bytes(&model.buffers).unwrap().to_vec())
            .collect();

        let report = pack_shared_buffers(&mut model).unwrap();
        assert_eq!(report.padding_bytes, 2);
        assert_eq!(report.index_bytes, 6 + 2 + 12 + 12);
        assert_eq!(report.vertex_bytes, 3 * 36);
        assert_eq!(model.buffers.len(), 2);

        let offsets: Vec<usize> = model
            .meshes
            .iter()
            .filter_map(|m| m.draw.index_buffer.as_ref())
            .map(|b| b.offset)
            .collect();
        assert_eq!(offsets, vec![0, 8, 20]);
        for (mesh, bytes) in model.meshes.iter().zip(&original) {
            let binding = mesh.draw.index_buffer.as_ref().unwrap();
            assert_eq!(binding.buffer, 1);
            assert_eq!(binding.bytes(&model.buffers).unwrap(), bytes.as_slice());
        }
    }

    #[test]
    fn packing_rejects_ragged_index_buffer() {
        let mut model = model_with(vec![ModelNode::root("root")], Vec::new());
        let mesh = triangle_mesh(&mut model, "a", IndexFormat::Uint32);
        let buffer = mesh.draw.index_buffer.as_ref().unwrap().buffer;
        model.buffers[buffer].content.push(0);
        model.meshes.push(mesh);
        let before = model.clone();

        assert!(matches!(
            pack_shared_buffers(&mut model),
            Err(MeshError::MisalignedIndexBuffer { width: 4, .. })
        ));
        assert_eq!(model, before);
    }
}

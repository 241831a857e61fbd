use meshforge_core::bounds::{BoundingBox, BoundingSphere};
use meshforge_core::math::Mat4;
use meshforge_core::mesh::{compact_index_buffer, vertex};
use meshforge_core::model::Model;
use meshforge_core::scene::HierarchyUpdater;

use crate::error::CompactError;

/// Recompute every mesh's object-space bounds and the model's bounds.
///
/// Model bounds are the union of each mesh's positions taken through its
/// node's world matrix. Meshes without vertex data or positions keep empty
/// bounds and do not contribute. With `compact_indices`, 32-bit index
/// buffers whose values fit 16 bits are rewritten as 16-bit.
///
/// Returns the number of index buffers that were narrowed.
pub fn compute_bounds(model: &mut Model, compact_indices: bool) -> Result<usize, CompactError> {
    let updater = HierarchyUpdater::new(&model.hierarchy);
    let mut model_box = BoundingBox::empty();
    let mut model_sphere = BoundingSphere::empty();
    let mut narrowed = 0;

    for mesh in &mut model.meshes {
        mesh.bounding_box = BoundingBox::empty();
        mesh.bounding_sphere = BoundingSphere::empty();

        if let Some(binding) = mesh.draw.vertex_buffers.first() {
            let bytes = binding
                .bytes(&model.buffers)
                .map_err(CompactError::mesh(&mesh.name))?;
            let world = updater.world_matrix(mesh.node_index);
            if let Some((bbox, sphere)) = vertex::compute_bounds(bytes, &binding.layout, &Mat4::identity())
                && !bbox.is_empty()
            {
                mesh.bounding_box = bbox;
                mesh.bounding_sphere = sphere;
            }
            if let Some((bbox, sphere)) = vertex::compute_bounds(bytes, &binding.layout, &world)
                && !bbox.is_empty()
            {
                model_box = model_box.merge(&bbox);
                model_sphere = model_sphere.merge(&sphere);
            }
        }

        if compact_indices
            && compact_index_buffer(&mut mesh.draw, &mut model.buffers)
                .map_err(CompactError::mesh(&mesh.name))?
        {
            narrowed += 1;
        }
    }

    model.bounding_box = model_box;
    model.bounding_sphere = model_sphere;
    Ok(narrowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::tests::{model_with, quad_mesh};
    use meshforge_core::math::Vec3;
    use meshforge_core::mesh::{BufferData, IndexFormat, IndexBufferBinding, index};
    use meshforge_core::scene::{ModelNode, NodeTransform};

    #[test]
    fn model_bounds_use_world_space() {
        let mut model = model_with(
            vec![
                ModelNode::root("root"),
                ModelNode::child("moved", 0)
                    .with_transform(NodeTransform::IDENTITY.with_translation([10.0, 0.0, 0.0])),
            ],
            vec![quad_mesh("a", 0, 0), quad_mesh("b", 1, 0)],
        );
        compute_bounds(&mut model, false).unwrap();

        assert_eq!(model.meshes[1].bounding_box.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(model.meshes[1].bounding_box.max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(model.bounding_box.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(model.bounding_box.max, Vec3::new(11.0, 1.0, 0.0));
        assert!(model.bounding_sphere.radius >= 6.0);
    }

    #[test]
    fn meshes_without_vertices_are_skipped() {
        let mut model = model_with(vec![ModelNode::root("root")], vec![quad_mesh("a", 0, 0)]);
        model.meshes[0].draw.vertex_buffers.clear();
        compute_bounds(&mut model, false).unwrap();
        assert!(model.meshes[0].bounding_box.is_empty());
        assert!(model.bounding_box.is_empty());
        assert!(model.bounding_sphere.is_empty());
    }

    #[test]
    fn narrow_index_buffers_are_compacted() {
        let mut model = model_with(vec![ModelNode::root("root")], vec![quad_mesh("a", 0, 0)]);
        let indices = [0, 1, 2, 2, 3, 0];
        model.buffers.push(BufferData::index(index::encode_indices(&indices, IndexFormat::Uint32)));
        model.meshes[0].draw.index_buffer = Some(IndexBufferBinding {
            buffer: model.buffers.len() - 1,
            format: IndexFormat::Uint32,
            offset: 0,
            count: 6,
        });

        assert_eq!(compute_bounds(&mut model, true).unwrap(), 1);
        let binding = model.meshes[0].draw.index_buffer.as_ref().unwrap();
        assert_eq!(binding.format, IndexFormat::Uint16);
        assert_eq!(binding.indices(&model.buffers).unwrap(), indices.to_vec());
    }
}

use meshforge_core::bounds::{BoundingBox, BoundingSphere};
use meshforge_core::mesh::{DrawSource, U16_VERTEX_LIMIT};
use meshforge_core::model::{Mesh, Model};

use crate::error::CompactError;

/// Break meshes with more vertices than 16-bit indices can address into
/// several meshes.
///
/// Parts keep the original mesh's name, node, material, parameters and
/// skinning, and replace it in place. Strip topologies cannot be split and
/// are left as they are with a warning. Does nothing when 32-bit indices
/// are allowed. Returns the number of meshes that were split.
pub fn split_meshes(model: &mut Model, allow_32bit_indices: bool) -> Result<usize, CompactError> {
    if allow_32bit_indices {
        return Ok(0);
    }

    // Decode everything first so a broken mesh leaves the model untouched.
    let mut sources = Vec::with_capacity(model.meshes.len());
    for mesh in &model.meshes {
        if mesh.draw.vertex_count() <= U16_VERTEX_LIMIT {
            sources.push(None);
            continue;
        }
        let source = DrawSource::from_draw(&mesh.draw, &model.buffers)
            .map_err(CompactError::mesh(&mesh.name))?;
        if !source.can_split() {
            log::warn!(
                "Mesh {} has {} vertices but its {:?} topology cannot be split",
                mesh.name,
                source.vertex_count(),
                source.topology
            );
            sources.push(None);
            continue;
        }
        sources.push(Some(source));
    }

    let mut split = 0;
    let mut meshes = Vec::with_capacity(model.meshes.len());
    for (mesh, source) in std::mem::take(&mut model.meshes).into_iter().zip(sources) {
        let Some(source) = source else {
            meshes.push(mesh);
            continue;
        };

        let parts = source.split(U16_VERTEX_LIMIT);
        log::debug!("Split mesh {} into {} parts", mesh.name, parts.len());
        split += 1;
        for part in parts {
            let draw = part.into_draw_data(&mut model.buffers);
            meshes.push(Mesh {
                draw,
                bounding_box: BoundingBox::empty(),
                bounding_sphere: BoundingSphere::empty(),
                ..mesh.clone()
            });
        }
    }

    model.meshes = meshes;
    Ok(split)
}

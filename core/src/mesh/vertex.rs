//! Per-vertex operations on interleaved vertex bytes.

use crate::bounds::{BoundingBox, BoundingSphere};
use crate::math::{Mat4, Vec3, normal_matrix, transform_point, transform_vector};

use super::layout::{VertexAttributeFormat, VertexAttributeSemantic, VertexLayout};

fn read_vec3(vertex: &[u8], offset: usize) -> Vec3 {
    let v: [f32; 3] = bytemuck::pod_read_unaligned(&vertex[offset..offset + 12]);
    Vec3::from(v)
}

fn write_vec3(vertex: &mut [u8], offset: usize, v: &Vec3) {
    let a: [f32; 3] = [v.x, v.y, v.z];
    vertex[offset..offset + 12].copy_from_slice(bytemuck::bytes_of(&a));
}

fn normalize_or_keep(v: Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or(v)
}

/// Transform positions, normals and tangents of every vertex in place.
///
/// Positions are transformed as points, normals by the inverse-transpose and
/// tangents as directions; both directions are renormalized. Other attributes
/// are left untouched, as is a tangent's handedness component. `data` must
/// hold whole vertices of a validated `layout`.
pub fn transform_vertices(data: &mut [u8], layout: &VertexLayout, matrix: &Mat4) {
    let stride = layout.stride();
    if stride == 0 {
        return;
    }
    let normals = normal_matrix(matrix);

    for vertex in data.chunks_exact_mut(stride) {
        for attr in &layout.attributes {
            let offset = attr.offset as usize;
            let wide_enough = matches!(
                attr.format,
                VertexAttributeFormat::Float3 | VertexAttributeFormat::Float4
            );
            if !wide_enough {
                continue;
            }
            match attr.semantic {
                VertexAttributeSemantic::Position => {
                    let p = transform_point(matrix, read_vec3(vertex, offset));
                    write_vec3(vertex, offset, &p);
                }
                VertexAttributeSemantic::Normal => {
                    let n = normalize_or_keep(normals * read_vec3(vertex, offset));
                    write_vec3(vertex, offset, &n);
                }
                VertexAttributeSemantic::Tangent => {
                    let t = normalize_or_keep(transform_vector(matrix, read_vec3(vertex, offset)));
                    write_vec3(vertex, offset, &t);
                }
                _ => {}
            }
        }
    }
}

/// Read every position of the stream.
///
/// Returns `None` when the layout has no 3-component position.
pub fn positions(data: &[u8], layout: &VertexLayout) -> Option<Vec<Vec3>> {
    let attr = layout.attribute(VertexAttributeSemantic::Position)?;
    if !matches!(
        attr.format,
        VertexAttributeFormat::Float3 | VertexAttributeFormat::Float4
    ) {
        return None;
    }
    let stride = layout.stride();
    let offset = attr.offset as usize;
    Some(
        data.chunks_exact(stride)
            .map(|vertex| read_vec3(vertex, offset))
            .collect(),
    )
}

/// Box and sphere enclosing every position after transformation by `matrix`.
///
/// The sphere is centered on the box center. Returns `None` when the layout
/// has no usable position attribute.
pub fn compute_bounds(
    data: &[u8],
    layout: &VertexLayout,
    matrix: &Mat4,
) -> Option<(BoundingBox, BoundingSphere)> {
    let points: Vec<Vec3> = positions(data, layout)?
        .into_iter()
        .map(|p| transform_point(matrix, p))
        .collect();

    let bbox = BoundingBox::from_points(points.iter().copied());
    if bbox.is_empty() {
        return Some((bbox, BoundingSphere::empty()));
    }
    let sphere = BoundingSphere::from_points_around(bbox.center(), points);
    Some((bbox, sphere))
}

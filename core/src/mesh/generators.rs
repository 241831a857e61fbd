//! Procedural draw sources used as fixtures by tests and benchmarks.

use std::f32::consts::{PI, TAU};

use super::data::PrimitiveTopology;
use super::layout::VertexLayout;
use super::source::{DrawSource, VertexStream};

/// Raw bytes of interleaved `f32` vertices.
fn interleave<T: bytemuck::Pod>(vertices: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(vertices).to_vec()
}

/// UV sphere with `position_normal_uv` vertices.
///
/// The grid has `(rings + 1) * (segments + 1)` vertices; the seam column
/// is duplicated so UVs wrap cleanly. Two triangles per grid cell.
pub fn generate_sphere(radius: f32, segments: u32, rings: u32) -> DrawSource {
    let columns = segments + 1;
    let mut vertices = Vec::with_capacity(((rings + 1) * columns) as usize);
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let (sin_theta, cos_theta) = (v * PI).sin_cos();
        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let n = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            vertices.push([n[0] * radius, n[1] * radius, n[2] * radius, n[0], n[1], n[2], u, v]);
        }
    }

    let indices = (0..rings)
        .flat_map(|ring| (0..segments).map(move |segment| ring * columns + segment))
        .flat_map(|a| {
            let b = a + columns;
            [a, b, a + 1, a + 1, b, b + 1]
        })
        .collect();

    DrawSource::new(
        PrimitiveTopology::TriangleList,
        vec![VertexStream::new(VertexLayout::position_normal_uv(), interleave(&vertices))],
    )
    .with_indices(indices)
}

/// Indexed quad in the XY plane, centered at the origin, with
/// `position_uv` vertices.
pub fn generate_quad(half_width: f32, half_height: f32) -> DrawSource {
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    let vertices: Vec<[f32; 5]> = corners
        .iter()
        .map(|&(x, y)| [x * half_width, y * half_height, 0.0, (x + 1.0) / 2.0, (1.0 - y) / 2.0])
        .collect();

    DrawSource::new(
        PrimitiveTopology::TriangleList,
        vec![VertexStream::new(VertexLayout::position_uv(), interleave(&vertices))],
    )
    .with_indices(vec![0, 1, 2, 2, 3, 0])
}

/// Non-indexed run of `count` positions along +X, one unit apart.
///
/// Handy for exceeding vertex limits without building real geometry.
pub fn generate_points(topology: PrimitiveTopology, count: usize) -> DrawSource {
    let positions: Vec<[f32; 3]> = (0..count).map(|i| [i as f32, 0.0, 0.0]).collect();
    DrawSource::new(
        topology,
        vec![VertexStream::new(VertexLayout::position_only(), interleave(&positions))],
    )
}

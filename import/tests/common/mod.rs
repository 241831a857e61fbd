#![allow(dead_code)]

use meshforge_core::material::{ParameterCollection, ParameterValue};
use meshforge_core::mesh::generators::{generate_quad, generate_sphere};
use meshforge_core::model::{Mesh, Model};
use meshforge_core::scene::{Hierarchy, ModelNode, NodeTransform};

/// root(0) -> child(1) -> grandchild(2), each offset along y.
pub fn chain() -> Vec<ModelNode> {
    vec![
        ModelNode::root("root"),
        ModelNode::child("child", 0)
            .with_transform(NodeTransform::IDENTITY.with_translation([0.0, 2.0, 0.0])),
        ModelNode::child("grandchild", 1)
            .with_transform(NodeTransform::IDENTITY.with_translation([0.0, 0.0, 5.0])),
    ]
}

pub fn params(x: i32) -> ParameterCollection {
    ParameterCollection::new().with("x", ParameterValue::Int(x))
}

/// A model whose meshes are quads, one set of buffers per mesh.
pub struct ModelBuilder {
    model: Model,
}

impl ModelBuilder {
    pub fn new(nodes: Vec<ModelNode>) -> Self {
        Self {
            model: Model {
                hierarchy: Hierarchy::new(nodes),
                ..Default::default()
            },
        }
    }

    pub fn quad(self, name: &str, node: usize, material: usize) -> Self {
        self.mesh_with(name, node, material, |m| m)
    }

    pub fn sphere(mut self, name: &str, node: usize, material: usize) -> Self {
        let draw = generate_sphere(1.0, 8, 4).into_draw_data(&mut self.model.buffers);
        self.model.meshes.push(Mesh::new(name, node, material, draw));
        self
    }

    pub fn mesh_with(
        mut self,
        name: &str,
        node: usize,
        material: usize,
        edit: impl FnOnce(Mesh) -> Mesh,
    ) -> Self {
        let draw = generate_quad(1.0, 1.0).into_draw_data(&mut self.model.buffers);
        self.model.meshes.push(edit(Mesh::new(name, node, material, draw)));
        self
    }

    pub fn build(self) -> Model {
        self.model
    }
}

/// The byte ranges each mesh binding views, in mesh order.
pub fn binding_bytes(model: &Model) -> Vec<(Vec<Vec<u8>>, Option<Vec<u8>>)> {
    model
        .meshes
        .iter()
        .map(|mesh| {
            let vertices = mesh
                .draw
                .vertex_buffers
                .iter()
                .map(|b| b.bytes(&model.buffers).unwrap().to_vec())
                .collect();
            let indices = mesh
                .draw
                .index_buffer
                .as_ref()
                .map(|b| b.bytes(&model.buffers).unwrap().to_vec());
            (vertices, indices)
        })
        .collect()
}

//! Imported model: hierarchy, meshes, materials and the buffers they view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bounds::{BoundingBox, BoundingSphere};
use crate::material::{MaterialInstance, ParameterCollection};
use crate::mesh::{BufferData, DrawData, MeshError};
use crate::scene::{Hierarchy, HierarchyError};

/// Errors found while validating a [`Model`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("invalid hierarchy: {0}")]
    Hierarchy(#[from] HierarchyError),
    #[error("mesh {mesh} ({name}): {source}")]
    Mesh {
        mesh: usize,
        name: String,
        #[source]
        source: MeshError,
    },
}

/// One bone of a skinned mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshBone {
    pub node_index: usize,
    /// Column-major inverse bind matrix.
    pub inverse_bind_matrix: [f32; 16],
}

/// Skinning data of a mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSkinning {
    pub bones: Vec<MeshBone>,
}

/// A drawable surface attached to a hierarchy node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    /// Node the mesh is attached to.
    pub node_index: usize,
    /// Index into [`Model::materials`].
    pub material_index: usize,
    #[serde(default)]
    pub parameters: Option<ParameterCollection>,
    #[serde(default)]
    pub skinning: Option<MeshSkinning>,
    pub draw: DrawData,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub bounding_sphere: BoundingSphere,
}

impl Mesh {
    /// Create an unskinned mesh without parameters.
    pub fn new(name: impl Into<String>, node_index: usize, material_index: usize, draw: DrawData) -> Self {
        Self {
            name: name.into(),
            node_index,
            material_index,
            parameters: None,
            skinning: None,
            draw,
            bounding_box: BoundingBox::empty(),
            bounding_sphere: BoundingSphere::empty(),
        }
    }

    /// Set the parameter set.
    #[must_use]
    pub fn with_parameters(mut self, parameters: ParameterCollection) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Set the skinning data.
    #[must_use]
    pub fn with_skinning(mut self, skinning: MeshSkinning) -> Self {
        self.skinning = Some(skinning);
        self
    }

    pub fn is_skinned(&self) -> bool {
        self.skinning.is_some()
    }

    /// Every node the mesh depends on: its own node, then its bones.
    pub fn referenced_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.node_index).chain(
            self.skinning
                .iter()
                .flat_map(|s| s.bones.iter().map(|b| b.node_index)),
        )
    }
}

/// A loaded model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub hierarchy: Hierarchy,
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub materials: Vec<Arc<MaterialInstance>>,
    /// Byte buffers viewed by the meshes' draw data.
    pub buffers: Vec<BufferData>,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub bounding_sphere: BoundingSphere,
}

impl Model {
    /// Material instance at `index`, if any.
    pub fn material(&self, index: usize) -> Option<&Arc<MaterialInstance>> {
        self.materials.get(index)
    }

    /// Check the hierarchy invariants, every node reference and every binding.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.hierarchy.validate()?;
        for (index, mesh) in self.meshes.iter().enumerate() {
            for node in mesh.referenced_nodes() {
                self.hierarchy.check_index(node)?;
            }
            mesh.draw
                .validate(&self.buffers)
                .map_err(|source| ModelError::Mesh {
                    mesh: index,
                    name: mesh.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Total bytes held by the buffer arena.
    pub fn buffer_bytes(&self) -> usize {
        self.buffers.iter().map(BufferData::len).sum()
    }
}

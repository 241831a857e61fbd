//! Node hierarchy data types.
//!
//! Transforms are stored as plain arrays (`[f32; 3]`, `[f32; 4]`) so they
//! serialize compactly; convert with the helpers in [`crate::math`].

use serde::{Deserialize, Serialize};

use crate::math::{Mat4, Vec3, mat4_from_scale_rotation_translation, quat_from_array};

/// Structural problems in a node hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// Node 0 has a parent.
    #[error("node 0 must be the root but has parent {parent}")]
    RootHasParent { parent: usize },
    /// A node other than 0 has no parent.
    #[error("node {node} has no parent; only node 0 may be a root")]
    ExtraRoot { node: usize },
    /// A node's parent does not precede it in the array.
    #[error("node {node} has parent {parent}, which does not precede it")]
    ParentNotBefore { node: usize, parent: usize },
    /// An index points past the end of the node array.
    #[error("node index {index} out of range for {len} nodes")]
    NodeOutOfRange { index: usize, len: usize },
}

/// Node transform decomposed into translation, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTransform {
    /// Translation [x, y, z].
    pub translation: [f32; 3],
    /// Rotation quaternion [x, y, z, w].
    pub rotation: [f32; 4],
    /// Scale [x, y, z].
    pub scale: [f32; 3],
}

impl NodeTransform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Returns this transform with a different translation.
    #[must_use]
    pub const fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with a different rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// The local matrix (scale, then rotation, then translation).
    pub fn matrix(&self) -> Mat4 {
        mat4_from_scale_rotation_translation(
            Vec3::from(self.scale),
            quat_from_array(self.rotation),
            Vec3::from(self.translation),
        )
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One entry of a flat node hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    pub name: String,
    /// Parent index; `None` only for the root.
    #[serde(default)]
    pub parent: Option<usize>,
    /// Local transform relative to the parent.
    #[serde(default)]
    pub transform: NodeTransform,
}

impl ModelNode {
    /// Creates a root node with identity transform.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            transform: NodeTransform::IDENTITY,
        }
    }

    /// Creates a node under `parent` with identity transform.
    pub fn child(name: impl Into<String>, parent: usize) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            transform: NodeTransform::IDENTITY,
        }
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }
}

/// Flat node array where every parent precedes its children.
///
/// The invariant is not enforced on construction; call
/// [`validate`](Hierarchy::validate) on untrusted input before relying on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hierarchy {
    pub nodes: Vec<ModelNode>,
}

impl Hierarchy {
    pub fn new(nodes: Vec<ModelNode>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&ModelNode> {
        self.nodes.get(index)
    }

    /// Parent of `index`, or `None` for the root (or an unknown index).
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(|n| n.parent)
    }

    /// Check node 0 is the only root and every parent precedes its child.
    pub fn validate(&self) -> Result<(), HierarchyError> {
        for (index, node) in self.nodes.iter().enumerate() {
            match (index, node.parent) {
                (0, None) => {}
                (0, Some(parent)) => return Err(HierarchyError::RootHasParent { parent }),
                (_, None) => return Err(HierarchyError::ExtraRoot { node: index }),
                (_, Some(parent)) if parent >= index => {
                    return Err(HierarchyError::ParentNotBefore {
                        node: index,
                        parent,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Check `index` names a node.
    pub fn check_index(&self, index: usize) -> Result<(), HierarchyError> {
        if index < self.nodes.len() {
            Ok(())
        } else {
            Err(HierarchyError::NodeOutOfRange {
                index,
                len: self.nodes.len(),
            })
        }
    }

    /// Children of every node, each list in ascending index order.
    pub fn children_table(&self) -> Vec<Vec<usize>> {
        let mut children = vec![Vec::new(); self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent
                && parent < children.len()
            {
                children[parent].push(index);
            }
        }
        children
    }

    /// Indices of every node named `name`.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.name == name)
            .map(|(i, _)| i)
    }

    /// `index` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.nodes.get(index).map(|_| index),
        }
    }
}

/// Iterator over a node and its ancestors, see [`Hierarchy::ancestors`].
pub struct Ancestors<'a> {
    hierarchy: &'a Hierarchy,
    next: Option<usize>,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        // Guard against cycles in unvalidated input.
        self.next = self
            .hierarchy
            .parent(current)
            .filter(|&p| p < current);
        Some(current)
    }
}

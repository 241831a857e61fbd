use crate::math::Mat4;

use super::types::Hierarchy;

/// Evaluates local and world matrices of a [`Hierarchy`].
///
/// World matrices are computed in one forward pass, which relies on parents
/// preceding their children.
#[derive(Debug, Clone)]
pub struct HierarchyUpdater {
    locals: Vec<Mat4>,
    worlds: Vec<Mat4>,
}

impl HierarchyUpdater {
    /// Evaluate every local and world matrix of `hierarchy`.
    pub fn new(hierarchy: &Hierarchy) -> Self {
        let locals: Vec<Mat4> = hierarchy.nodes.iter().map(|n| n.transform.matrix()).collect();
        let mut worlds: Vec<Mat4> = Vec::with_capacity(locals.len());
        for (index, node) in hierarchy.nodes.iter().enumerate() {
            let world = match node.parent {
                Some(parent) if parent < index => worlds[parent] * locals[index],
                _ => locals[index],
            };
            worlds.push(world);
        }
        Self { locals, worlds }
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// Local matrix of `node`, identity for unknown nodes.
    pub fn local_matrix(&self, node: usize) -> Mat4 {
        self.locals.get(node).copied().unwrap_or_else(Mat4::identity)
    }

    /// World matrix of `node`, identity for unknown nodes.
    pub fn world_matrix(&self, node: usize) -> Mat4 {
        self.worlds.get(node).copied().unwrap_or_else(Mat4::identity)
    }

    /// Matrix taking `node`'s space into `ancestor`'s space.
    ///
    /// Product of the local matrices from `node` up to but excluding
    /// `ancestor`; identity when they are equal. If `ancestor` is not on the
    /// chain the walk stops at the root.
    pub fn matrix_to_ancestor(&self, hierarchy: &Hierarchy, node: usize, ancestor: usize) -> Mat4 {
        let mut matrix = Mat4::identity();
        for index in hierarchy.ancestors(node) {
            if index == ancestor {
                break;
            }
            matrix = self.local_matrix(index) * matrix;
        }
        matrix
    }
}

use meshforge_core::model::Model;
use meshforge_core::scene::{Hierarchy, HierarchyError, ModelNode};

use crate::error::CompactError;

/// Nodes that must survive pruning.
///
/// The root, every preserved node, every mesh node and every bone node are
/// kept together with all of their ancestors.
pub fn keep_mask(model: &Model, preserved: &[bool]) -> Vec<bool> {
    let hierarchy = &model.hierarchy;
    let mut keep = vec![false; hierarchy.len()];
    if let Some(root) = keep.first_mut() {
        *root = true;
    }

    let preserved_nodes = preserved
        .iter()
        .enumerate()
        .filter(|(_, p)| **p)
        .map(|(i, _)| i);
    let mesh_nodes = model.meshes.iter().flat_map(|m| m.referenced_nodes());
    for seed in preserved_nodes.chain(mesh_nodes) {
        for node in hierarchy.ancestors(seed) {
            if keep[node] {
                break;
            }
            keep[node] = true;
        }
    }
    keep
}

/// Drop every node that [`keep_mask`] does not keep.
///
/// Surviving nodes stay in their original relative order and every mesh
/// and bone node index is rewritten. Returns the old-to-new index map
/// (`None` for removed nodes).
///
/// The hierarchy is validated first: a parent that does not precede its
/// child would make the single-pass remap unsound, so it is reported as a
/// [`HierarchyError`] and the model is left untouched.
pub fn prune_hierarchy(
    model: &mut Model,
    preserved: &[bool],
) -> Result<Vec<Option<usize>>, CompactError> {
    model.hierarchy.validate()?;
    for mesh in &model.meshes {
        for node in mesh.referenced_nodes() {
            model.hierarchy.check_index(node)?;
        }
    }

    let keep = keep_mask(model, preserved);
    let mut remap: Vec<Option<usize>> = vec![None; keep.len()];
    let mut nodes: Vec<ModelNode> = Vec::with_capacity(keep.iter().filter(|k| **k).count());
    for (index, node) in model.hierarchy.nodes.iter().enumerate() {
        if !keep[index] {
            continue;
        }
        let parent = match node.parent {
            Some(parent) => Some(
                remap
                    .get(parent)
                    .copied()
                    .flatten()
                    .ok_or(HierarchyError::ParentNotBefore {
                        node: index,
                        parent,
                    })?,
            ),
            None => None,
        };
        remap[index] = Some(nodes.len());
        nodes.push(ModelNode {
            parent,
            ..node.clone()
        });
    }

    let lookup = |index: usize| {
        remap.get(index).copied().flatten().ok_or(HierarchyError::NodeOutOfRange {
            index,
            len: nodes.len(),
        })
    };
    let mut meshes = model.meshes.clone();
    for mesh in &mut meshes {
        mesh.node_index = lookup(mesh.node_index)?;
        if let Some(skinning) = &mut mesh.skinning {
            for bone in &mut skinning.bones {
                bone.node_index = lookup(bone.node_index)?;
            }
        }
    }

    log::debug!(
        "Pruned hierarchy from {} to {} nodes",
        model.hierarchy.len(),
        nodes.len()
    );
    model.hierarchy = Hierarchy::new(nodes);
    model.meshes = meshes;
    Ok(remap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::tests::{model_with, quad_mesh};
    use meshforge_core::model::{MeshBone, MeshSkinning};

    fn tree() -> Vec<ModelNode> {
        vec![
            ModelNode::root("root"),
            ModelNode::child("arm", 0),
            ModelNode::child("hand", 1),
            ModelNode::child("leg", 0),
            ModelNode::child("foot", 3),
            ModelNode::child("socket", 0),
        ]
    }

    fn assert_parents_precede(model: &Model) {
        for (index, node) in model.hierarchy.nodes.iter().enumerate().skip(1) {
            let parent = node.parent.expect("only the root has no parent");
            assert!(parent < index, "node {index} has parent {parent}");
        }
    }

    #[test]
    fn keeps_ancestors_of_mesh_and_bone_nodes() {
        let skin = MeshSkinning {
            bones: vec![MeshBone {
                node_index: 4,
                inverse_bind_matrix: [0.0; 16],
            }],
        };
        let mut model = model_with(tree(), vec![quad_mesh("hand", 2, 0).with_skinning(skin)]);

        let remap = prune_hierarchy(&mut model, &[false; 6]).unwrap();
        assert_eq!(remap, vec![Some(0), Some(1), Some(2), Some(3), Some(4), None]);
        assert_eq!(model.hierarchy.len(), 5);
        assert_parents_precede(&model);
    }

    #[test]
    fn remaps_mesh_and_bone_indices() {
        let skin = MeshSkinning {
            bones: vec![MeshBone {
                node_index: 4,
                inverse_bind_matrix: [0.0; 16],
            }],
        };
        let mut model = model_with(
            tree(),
            vec![quad_mesh("foot", 4, 0).with_skinning(skin), quad_mesh("socket", 5, 0)],
        );

        prune_hierarchy(&mut model, &[false; 6]).unwrap();
        let names: Vec<&str> = model.hierarchy.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "leg", "foot", "socket"]);
        assert_eq!(model.meshes[0].node_index, 2);
        assert_eq!(model.meshes[0].skinning.as_ref().unwrap().bones[0].node_index, 2);
        assert_eq!(model.meshes[1].node_index, 3);
        assert_eq!(model.hierarchy.nodes[2].parent, Some(1));
        assert_parents_precede(&model);
    }

    #[test]
    fn preserved_nodes_survive_without_meshes() {
        let mut model = model_with(tree(), Vec::new());
        let mut preserved = [false; 6];
        preserved[2] = true;
        prune_hierarchy(&mut model, &preserved).unwrap();
        let names: Vec<&str> = model.hierarchy.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "arm", "hand"]);
    }

    #[test]
    fn parent_after_child_is_fatal() {
        let mut nodes = tree();
        nodes[1].parent = Some(2);
        let mut model = model_with(nodes, vec![quad_mesh("hand", 2, 0)]);
        let before = model.clone();

        let err = prune_hierarchy(&mut model, &[false; 6]).unwrap_err();
        assert!(matches!(
            err,
            CompactError::Hierarchy(HierarchyError::ParentNotBefore { node: 1, parent: 2 })
        ));
        assert_eq!(model, before);
    }
}

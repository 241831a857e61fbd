use meshforge_core::model::Model;

/// Meshes sharing a material below one preserved (or root) node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshGroup {
    /// Preserved or root node the group was finalized at.
    pub key: usize,
    pub material_index: usize,
    /// Indices into [`Model::meshes`], in traversal order.
    pub meshes: Vec<usize>,
}

/// Material-keyed buckets in first-seen order.
#[derive(Debug, Default)]
struct MaterialBuckets {
    buckets: Vec<(usize, Vec<usize>)>,
}

impl MaterialBuckets {
    fn add(&mut self, material: usize, mesh: usize) {
        match self.buckets.iter_mut().find(|(m, _)| *m == material) {
            Some((_, meshes)) => meshes.push(mesh),
            None => self.buckets.push((material, vec![mesh])),
        }
    }

    fn absorb(&mut self, other: MaterialBuckets) {
        for (material, meshes) in other.buckets {
            match self.buckets.iter_mut().find(|(m, _)| *m == material) {
                Some((_, existing)) => existing.extend(meshes),
                None => self.buckets.push((material, meshes)),
            }
        }
    }
}

struct Frame {
    node: usize,
    next_child: usize,
    buckets: MaterialBuckets,
}

impl Frame {
    fn new(node: usize) -> Self {
        Self {
            node,
            next_child: 0,
            buckets: MaterialBuckets::default(),
        }
    }
}

/// Partition the model's meshes into groups keyed by their nearest
/// preserved ancestor (or the root) and material.
///
/// Depth-first from node 0. A node's buckets are its children's buckets
/// merged in child order, followed by the meshes attached to the node
/// itself. Preserved nodes and the root flush their buckets as finished
/// groups; other nodes hand them to their parent. Groups come out in the
/// order their nodes finish, buckets within a node in first-seen material
/// order.
///
/// The hierarchy must be valid (see
/// [`Hierarchy::validate`](meshforge_core::scene::Hierarchy::validate));
/// meshes attached to unknown nodes are not grouped.
pub fn group_meshes(model: &Model, preserved: &[bool]) -> Vec<MeshGroup> {
    let node_count = model.hierarchy.len();
    if node_count == 0 {
        return Vec::new();
    }

    let children = model.hierarchy.children_table();
    let mut attached = vec![Vec::new(); node_count];
    for (index, mesh) in model.meshes.iter().enumerate() {
        if let Some(list) = attached.get_mut(mesh.node_index) {
            list.push(index);
        }
    }

    let mut groups = Vec::new();
    let mut stack = vec![Frame::new(0)];
    while let Some(frame) = stack.last_mut() {
        if let Some(&child) = children[frame.node].get(frame.next_child) {
            frame.next_child += 1;
            stack.push(Frame::new(child));
            continue;
        }

        let Some(Frame {
            node, mut buckets, ..
        }) = stack.pop()
        else {
            break;
        };
        for &mesh in &attached[node] {
            buckets.add(model.meshes[mesh].material_index, mesh);
        }

        let flush = node == 0 || preserved.get(node).copied().unwrap_or(false);
        match stack.last_mut() {
            Some(parent) if !flush => parent.buckets.absorb(buckets),
            _ => groups.extend(buckets.buckets.into_iter().map(|(material_index, meshes)| {
                MeshGroup {
                    key: node,
                    material_index,
                    meshes,
                }
            })),
        }
    }

    log::debug!(
        "Grouped {} meshes into {} groups",
        model.meshes.len(),
        groups.len()
    );
    groups
}

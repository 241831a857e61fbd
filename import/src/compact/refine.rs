use std::sync::Arc;

use meshforge_core::material::ParameterCollection;
use meshforge_core::model::Model;

use super::grouping::MeshGroup;

/// Equality used by one refinement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshComparator {
    /// Same parameter set (both absent, or equal in both directions).
    Parameters,
    /// Same material instance, or two present instances agreeing on shadow
    /// casting and receiving.
    ShadowOptions,
}

impl MeshComparator {
    /// Passes run by [`refine_groups`], in order.
    pub const PASSES: [MeshComparator; 2] = [Self::Parameters, Self::ShadowOptions];

    /// Whether meshes `a` and `b` of `model` may share a bucket.
    pub fn matches(self, model: &Model, a: usize, b: usize) -> bool {
        let (a, b) = (&model.meshes[a], &model.meshes[b]);
        match self {
            Self::Parameters => {
                ParameterCollection::equivalent(a.parameters.as_ref(), b.parameters.as_ref())
            }
            Self::ShadowOptions => {
                if a.material_index == b.material_index {
                    return true;
                }
                match (model.material(a.material_index), model.material(b.material_index)) {
                    (None, None) => true,
                    (Some(x), Some(y)) => Arc::ptr_eq(x, y) || x.same_shadow_options(y),
                    _ => false,
                }
            }
        }
    }
}

/// Split `meshes` into buckets of mutually matching meshes.
///
/// Each mesh is compared with the first member of every bucket so far and
/// joins the first match, or opens a new bucket. Buckets keep first-seen
/// order.
pub fn bucket_by(model: &Model, meshes: &[usize], comparator: MeshComparator) -> Vec<Vec<usize>> {
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    for &mesh in meshes {
        match buckets
            .iter_mut()
            .find(|bucket| comparator.matches(model, bucket[0], mesh))
        {
            Some(bucket) => bucket.push(mesh),
            None => buckets.push(vec![mesh]),
        }
    }
    buckets
}

/// Meshes that will be merged into one, attached at `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshBucket {
    pub key: usize,
    /// At least two mesh indices; the first is the representative.
    pub meshes: Vec<usize>,
}

/// Outcome of [`refine_groups`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Refinement {
    pub buckets: Vec<MeshBucket>,
    /// Meshes kept as they are: skinned, attached to a preserved node, or
    /// left without a merge partner.
    pub excluded: Vec<usize>,
}

/// Subdivide every group by each of [`MeshComparator::PASSES`].
///
/// Skinned meshes and meshes attached to preserved nodes never merge.
/// A group or bucket left with a single mergeable mesh is excluded too.
pub fn refine_groups(model: &Model, groups: &[MeshGroup], preserved: &[bool]) -> Refinement {
    let mut refinement = Refinement::default();

    for group in groups {
        let (eligible, kept): (Vec<usize>, Vec<usize>) =
            group.meshes.iter().partition(|&&index| {
                let mesh = &model.meshes[index];
                !mesh.is_skinned() && !preserved.get(mesh.node_index).copied().unwrap_or(false)
            });
        refinement.excluded.extend(kept);
        if eligible.len() <= 1 {
            refinement.excluded.extend(eligible);
            continue;
        }

        let mut buckets = vec![eligible];
        for comparator in MeshComparator::PASSES {
            buckets = buckets
                .iter()
                .flat_map(|bucket| bucket_by(model, bucket, comparator))
                .collect();
        }

        for meshes in buckets {
            if meshes.len() < 2 {
                refinement.excluded.extend(meshes);
            } else {
                refinement.buckets.push(MeshBucket {
                    key: group.key,
                    meshes,
                });
            }
        }
    }

    log::debug!(
        "Refined {} groups into {} merge buckets, {} meshes excluded",
        groups.len(),
        refinement.buckets.len(),
        refinement.excluded.len()
    );
    refinement
}

//! Mesh compaction passes.
//!
//! - [`group_meshes`] - Partition meshes by preserved ancestor and material
//! - [`refine_groups`] - Subdivide groups by parameters and shadow options
//! - [`merge_buckets`] - Pre-transform and merge each refined bucket
//! - [`prune_hierarchy`] - Drop nodes nothing references any more
//! - [`compute_bounds`] - Mesh and model bounding volumes
//! - [`split_meshes`] - Break up meshes too large for 16-bit indices
//! - [`pack_shared_buffers`] - One vertex and one index buffer per model
//!
//! [`compact_model`] runs grouping, refinement, merging and pruning in
//! order.

mod bounds;
mod grouping;
mod pack;
mod prune;
mod refine;
mod split;

pub use bounds::compute_bounds;
pub use grouping::{MeshGroup, group_meshes};
pub use pack::{PackReport, merge_buckets, pack_shared_buffers};
pub use prune::{keep_mask, prune_hierarchy};
pub use refine::{MeshBucket, MeshComparator, Refinement, bucket_by, refine_groups};
pub use split::split_meshes;

use meshforge_core::model::Model;
use meshforge_core::profiling::profile_scope;
use meshforge_core::scene::Hierarchy;

use crate::error::CompactError;

/// Flags every node whose name is listed in `names`.
pub fn preserved_mask(hierarchy: &Hierarchy, names: &[String]) -> Vec<bool> {
    let mut mask = vec![false; hierarchy.len()];
    for name in names {
        let mut found = false;
        for index in hierarchy.find_by_name(name) {
            mask[index] = true;
            found = true;
        }
        if !found {
            log::warn!("Preserved node {name} not found in hierarchy");
        }
    }
    mask
}

/// Counters of one [`compact_model`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactReport {
    pub groups: usize,
    pub merged_buckets: usize,
    pub excluded_meshes: usize,
    pub meshes_before: usize,
    pub meshes_after: usize,
    pub nodes_before: usize,
    pub nodes_after: usize,
}

/// Merge every compatible set of meshes and prune the hierarchy.
///
/// `preserved` flags nodes that must stay distinct attachment points (see
/// [`preserved_mask`]). The hierarchy is validated before anything changes.
pub fn compact_model(
    model: &mut Model,
    preserved: &[bool],
    allow_32bit_indices: bool,
) -> Result<CompactReport, CompactError> {
    model.hierarchy.validate()?;
    for mesh in &model.meshes {
        for node in mesh.referenced_nodes() {
            model.hierarchy.check_index(node)?;
        }
    }

    let mut report = CompactReport {
        meshes_before: model.meshes.len(),
        nodes_before: model.hierarchy.len(),
        ..Default::default()
    };

    let groups = {
        profile_scope!("group_meshes");
        group_meshes(model, preserved)
    };
    report.groups = groups.len();

    let refinement = {
        profile_scope!("refine_groups");
        refine_groups(model, &groups, preserved)
    };
    report.merged_buckets = refinement.buckets.len();
    report.excluded_meshes = refinement.excluded.len();

    {
        profile_scope!("merge_buckets");
        merge_buckets(model, refinement, allow_32bit_indices)?;
    }
    {
        profile_scope!("prune_hierarchy");
        prune_hierarchy(model, preserved)?;
    }

    report.meshes_after = model.meshes.len();
    report.nodes_after = model.hierarchy.len();
    log::info!(
        "Compacted {} meshes into {} and {} nodes into {}",
        report.meshes_before,
        report.meshes_after,
        report.nodes_before,
        report.nodes_after
    );
    Ok(report)
}

//! The model branch of an import: everything between loading and saving.

use std::sync::Arc;

use meshforge_core::bounds::{BoundingBox, BoundingSphere};
use meshforge_core::material::ModelMaterial;
use meshforge_core::model::Model;
use meshforge_core::profiling::{profile_function, profile_plot, profile_scope};

use crate::compact::{
    compact_model, compute_bounds, pack_shared_buffers, preserved_mask, split_meshes,
};
use crate::error::{CompactError, ImportError};
use crate::settings::ImportSettings;

/// Append every resolvable material to the model's material list.
///
/// Entries without an instance, or whose instance has no material, are
/// skipped with a warning. Returns the number of materials added.
pub fn apply_materials(model: &mut Model, materials: &[ModelMaterial]) -> usize {
    let mut added = 0;
    for entry in materials {
        match entry.resolved() {
            Some(instance) => {
                model.materials.push(Arc::clone(instance));
                added += 1;
            }
            None => log::warn!("Material {} has no material instance, skipped", entry.name),
        }
    }
    added
}

/// Log an error for every mesh that asks for a feature the importer lacks.
///
/// Returns the number of such requests.
pub fn check_unsupported_features(model: &Model, settings: &ImportSettings) -> usize {
    if !settings.tessellation_aen {
        return 0;
    }
    for mesh in &model.meshes {
        log::error!(
            "Mesh {}: adjacent edge normal tessellation is not supported",
            mesh.name
        );
    }
    model.meshes.len()
}

/// Run the whole model pipeline on a loaded model.
///
/// Materials, bounds reset, an informational bounds pass, feature checks,
/// splitting, compaction (when enabled), the final bounds pass with index
/// compaction, and shared buffer packing, in that order. Unsupported
/// feature requests fail the run only after every stage has completed, so
/// all of them are reported.
pub fn process_model(mut model: Model, settings: &ImportSettings) -> Result<Model, ImportError> {
    profile_function!();

    let added = apply_materials(&mut model, &settings.materials);
    log::debug!("Applied {} of {} materials", added, settings.materials.len());

    model.bounding_box = BoundingBox::empty();
    model.bounding_sphere = BoundingSphere::empty();
    {
        profile_scope!("initial_bounds");
        compute_bounds(&mut model, false)?;
    }
    log::debug!(
        "Source bounds {:?} - {:?}",
        model.bounding_box.min,
        model.bounding_box.max
    );

    let unsupported = check_unsupported_features(&model, settings);

    {
        profile_scope!("split_meshes");
        let split = split_meshes(&mut model, settings.allow_32bit_index)?;
        if split > 0 {
            log::info!("Split {split} meshes exceeding the 16-bit index limit");
        }
    }

    if settings.compact {
        let preserved = preserved_mask(&model.hierarchy, &settings.preserved_nodes);
        compact_model(&mut model, &preserved, settings.allow_32bit_index)?;
    }

    {
        profile_scope!("final_bounds");
        let narrowed = compute_bounds(&mut model, true)?;
        log::debug!("Narrowed {narrowed} index buffers to 16 bits");
    }

    let report = {
        profile_scope!("pack_shared_buffers");
        pack_shared_buffers(&mut model).map_err(CompactError::Pack)?
    };
    profile_plot!("vertex_bytes", report.vertex_bytes);
    profile_plot!("index_bytes", report.index_bytes);
    log::info!(
        "Packed {} meshes into {} vertex bytes and {} index bytes ({} padding)",
        model.meshes.len(),
        report.vertex_bytes,
        report.index_bytes,
        report.padding_bytes
    );

    if unsupported > 0 {
        return Err(ImportError::UnsupportedFeatures(unsupported));
    }
    Ok(model)
}

mod common;

use common::{ModelBuilder, binding_bytes, chain, params};
use meshforge_core::math::Vec3;
use meshforge_core::mesh::index::encode_indices;
use meshforge_core::mesh::{
    BufferData, DrawSource, IndexBufferBinding, IndexFormat, PrimitiveTopology, VertexLayout,
    VertexStream,
};
use meshforge_core::model::{Mesh, MeshBone, MeshSkinning, Model};
use meshforge_core::scene::ModelNode;
use meshforge_import::compact::{
    MeshComparator, bucket_by, compact_model, group_meshes, pack_shared_buffers, preserved_mask,
    refine_groups,
};
use meshforge_import::{ImportSettings, process_model};

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn chain_merges_into_root_and_prunes() {
    let model = ModelBuilder::new(chain())
        .mesh_with("m1", 1, 0, |m| m.with_parameters(params(1)))
        .mesh_with("m2", 2, 0, |m| m.with_parameters(params(1)))
        .build();
    let vertex_bytes: usize = model.meshes.iter().map(|m| m.draw.vertex_buffers[0].byte_len()).sum();
    let index_bytes: usize = model
        .meshes
        .iter()
        .filter_map(|m| m.draw.index_buffer.as_ref())
        .map(|b| b.byte_len())
        .sum();

    let model = process_model(model, &ImportSettings::default()).unwrap();

    assert_eq!(model.hierarchy.len(), 1);
    assert_eq!(model.hierarchy.nodes[0].name, "root");
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.meshes[0].node_index, 0);
    assert!(model.meshes[0].skinning.is_none());
    assert_eq!(model.buffers.len(), 2);
    assert_eq!(model.buffers[0].len(), vertex_bytes);
    assert_eq!(model.buffers[1].len(), index_bytes);

    // child sits at y = 2, grandchild 5 further along z.
    assert_eq!(model.bounding_box.min, Vec3::new(-1.0, 1.0, 0.0));
    assert_eq!(model.bounding_box.max, Vec3::new(1.0, 3.0, 5.0));
    assert_eq!(model.meshes[0].bounding_box, model.bounding_box);
}

#[test]
fn different_parameters_stay_apart() {
    let model = ModelBuilder::new(chain())
        .mesh_with("m1", 1, 0, |m| m.with_parameters(params(1)))
        .mesh_with("m2", 2, 0, |m| m.with_parameters(params(2)))
        .build();

    let model = process_model(model, &ImportSettings::default()).unwrap();
    assert_eq!(model.meshes.len(), 2);
    // Both meshes keep their nodes, so the whole chain survives.
    assert_eq!(model.hierarchy.len(), 3);
    let node_of = |name: &str| model.meshes.iter().find(|m| m.name == name).map(|m| m.node_index);
    assert_eq!(node_of("m1"), Some(1));
    assert_eq!(node_of("m2"), Some(2));
}

// ---------------------------------------------------------------------------
// Grouping and refinement
// ---------------------------------------------------------------------------

fn forest() -> Model {
    ModelBuilder::new(vec![
        ModelNode::root("root"),
        ModelNode::child("body", 0),
        ModelNode::child("head", 1),
        ModelNode::child("hat", 2),
        ModelNode::child("arm", 1),
        ModelNode::child("hand", 4),
        ModelNode::child("socket", 5),
        ModelNode::child("prop", 0),
    ])
    .quad("a", 3, 0)
    .quad("b", 2, 1)
    .quad("c", 6, 0)
    .quad("d", 5, 0)
    .quad("e", 7, 1)
    .quad("f", 0, 0)
    .sphere("g", 4, 2)
    .quad("h", 3, 0)
    .build()
}

#[test]
fn groups_partition_the_meshes() {
    let model = forest();
    let preserved = preserved_mask(&model.hierarchy, &["head".into(), "socket".into()]);
    let groups = group_meshes(&model, &preserved);

    let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.meshes.iter().copied()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..model.meshes.len()).collect::<Vec<_>>());

    for group in &groups {
        assert!(group.key == 0 || preserved[group.key], "bad key {}", group.key);
        for &mesh in &group.meshes {
            assert_eq!(model.meshes[mesh].material_index, group.material_index);
        }
    }

    let head: Vec<_> = groups.iter().filter(|g| g.key == 2).collect();
    assert_eq!(head.len(), 2);
    assert_eq!(head[0].meshes, vec![0, 7]);
    assert_eq!(head[1].meshes, vec![1]);
}

#[test]
fn refinement_never_crosses_groups() {
    let model = forest();
    let preserved = preserved_mask(&model.hierarchy, &["head".into()]);
    let groups = group_meshes(&model, &preserved);
    let refinement = refine_groups(&model, &groups, &preserved);

    for bucket in &refinement.buckets {
        assert!(bucket.meshes.len() >= 2);
        let owner = groups
            .iter()
            .find(|g| g.meshes.contains(&bucket.meshes[0]))
            .unwrap();
        assert_eq!(owner.key, bucket.key);
        assert!(bucket.meshes.iter().all(|m| owner.meshes.contains(m)));
    }

    let mut all: Vec<usize> = refinement
        .buckets
        .iter()
        .flat_map(|b| b.meshes.iter().copied())
        .chain(refinement.excluded.iter().copied())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..model.meshes.len()).collect::<Vec<_>>());
}

#[test]
fn parameter_buckets_depend_on_first_occurrence() {
    let build = |values: [i32; 3]| {
        values
            .iter()
            .enumerate()
            .fold(ModelBuilder::new(vec![ModelNode::root("root")]), |b, (i, &x)| {
                b.mesh_with(&format!("m{i}"), 0, 0, |m| m.with_parameters(params(x)))
            })
            .build()
    };

    let aab = build([1, 1, 2]);
    assert_eq!(
        bucket_by(&aab, &[0, 1, 2], MeshComparator::Parameters),
        vec![vec![0, 1], vec![2]]
    );
    let baa = build([2, 1, 1]);
    assert_eq!(
        bucket_by(&baa, &[0, 1, 2], MeshComparator::Parameters),
        vec![vec![0], vec![1, 2]]
    );

    let groups = group_meshes(&baa, &[false]);
    let refinement = refine_groups(&baa, &groups, &[false]);
    assert_eq!(refinement.buckets.len(), 1);
    assert_eq!(refinement.buckets[0].meshes, vec![1, 2]);
    assert_eq!(refinement.excluded, vec![0]);
}

// ---------------------------------------------------------------------------
// Buffer packing
// ---------------------------------------------------------------------------

fn triangle(model: &mut Model, name: &str, format: IndexFormat) -> Mesh {
    let positions = [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let mut draw = DrawSource::new(
        PrimitiveTopology::TriangleList,
        vec![VertexStream::new(
            VertexLayout::position_only(),
            bytemuck::cast_slice(&positions).to_vec(),
        )],
    )
    .into_draw_data(&mut model.buffers);
    model.buffers.push(BufferData::index(encode_indices(&[0, 1, 2], format)));
    draw.index_buffer = Some(IndexBufferBinding {
        buffer: model.buffers.len() - 1,
        format,
        offset: 0,
        count: 3,
    });
    Mesh::new(name, 0, 0, draw)
}

#[test]
fn packing_round_trips_and_aligns() {
    use IndexFormat::{Uint16 as U16, Uint32 as U32};
    let formats = [U16, U32, U16, U16, U32, U32, U16, U32];

    let mut model = Model {
        hierarchy: meshforge_core::scene::Hierarchy::new(vec![ModelNode::root("root")]),
        ..Default::default()
    };
    for (i, format) in formats.iter().enumerate() {
        let mesh = triangle(&mut model, &format!("t{i}"), *format);
        model.meshes.push(mesh);
    }
    let before = binding_bytes(&model);
    let input_index_bytes: usize = formats.iter().map(|f| 3 * f.size()).sum();

    let report = pack_shared_buffers(&mut model).unwrap();
    assert_eq!(binding_bytes(&model), before);
    assert_eq!(model.buffers.len(), 2);

    // Expected pads: walk the segments with the alignment rule.
    let mut offset = 0;
    let mut pads = 0;
    for format in formats {
        if format == U32 && offset % 4 != 0 {
            offset += 2;
            pads += 1;
        }
        offset += 3 * format.size();
    }
    assert_eq!(report.padding_bytes, pads * 2);
    assert_eq!(report.index_bytes, input_index_bytes + pads * 2);
    assert_eq!(model.buffers[1].len(), report.index_bytes);

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for mesh in &model.meshes {
        let binding = mesh.draw.index_buffer.as_ref().unwrap();
        if binding.is_32bit() {
            assert_eq!(binding.offset % 4, 0);
        }
        ranges.push((binding.offset, binding.offset + binding.byte_len()));
        assert!(binding.offset + binding.byte_len() <= model.buffers[1].len());
    }
    ranges.sort_unstable();
    for pair in ranges.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "{:?} overlaps {:?}", pair[0], pair[1]);
    }
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

#[test]
fn pruned_hierarchy_keeps_referenced_chains() {
    let mut model = forest();
    model.meshes[6].skinning = Some(MeshSkinning {
        bones: vec![MeshBone {
            node_index: 6,
            inverse_bind_matrix: [0.0; 16],
        }],
    });
    let preserved = preserved_mask(&model.hierarchy, &["hat".into()]);
    let names_before: Vec<String> = model.hierarchy.nodes.iter().map(|n| n.name.clone()).collect();

    compact_model(&mut model, &preserved, false).unwrap();

    let names: Vec<&str> = model.hierarchy.nodes.iter().map(|n| n.name.as_str()).collect();
    assert!(names.contains(&"hat"));
    assert!(names.contains(&"socket"));
    assert!(names.len() < names_before.len());
    for (index, node) in model.hierarchy.nodes.iter().enumerate().skip(1) {
        assert!(node.parent.is_some_and(|p| p < index));
    }
    for mesh in &model.meshes {
        for node in mesh.referenced_nodes() {
            assert!(node < model.hierarchy.len());
            assert_eq!(model.hierarchy.ancestors(node).last(), Some(0));
        }
    }
    assert!(model.validate().is_ok());
}

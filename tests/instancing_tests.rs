//! Instance Simulation Tests
//!
//! Tests for:
//! - Dispatch sizing (ceiling division, zero dispatches nothing)
//! - Kernel template validation and workgroup-size substitution
//! - Deterministic in-sphere seeding
//! - Position packing at the tight 12-byte stride
//! - Translation-only matrix rebuild from readback data

use glam::{Mat4, Vec3, Vec4};

use umbra::graph::passes::instancing::{
    dispatch_group_count, kernel_source, pack_positions, rebuild_matrices, seed_positions,
    POSITION_STRIDE, SIM_WORKGROUP_SIZE,
};

const EPSILON: f32 = 1e-4;

// ============================================================================
// Dispatch Sizing Tests
// ============================================================================

#[test]
fn zero_instances_dispatch_nothing() {
    assert_eq!(dispatch_group_count(0), 0);
}

#[test]
fn partial_group_rounds_up() {
    assert_eq!(dispatch_group_count(1), 1);
    assert_eq!(dispatch_group_count(SIM_WORKGROUP_SIZE - 1), 1);
    assert_eq!(dispatch_group_count(SIM_WORKGROUP_SIZE + 1), 2);
}

#[test]
fn full_groups_divide_exactly() {
    assert_eq!(dispatch_group_count(SIM_WORKGROUP_SIZE), 1);
    assert_eq!(dispatch_group_count(SIM_WORKGROUP_SIZE * 2), 2);
    assert_eq!(dispatch_group_count(128), 128_u32.div_ceil(SIM_WORKGROUP_SIZE));
}

// ============================================================================
// Kernel Source Tests
// ============================================================================

#[test]
fn kernel_substitutes_the_shared_workgroup_size() {
    let source = kernel_source().expect("bundled kernel must validate");
    assert!(
        source.contains(&format!("@workgroup_size({SIM_WORKGROUP_SIZE}")),
        "kernel must declare the dispatch-side group size"
    );
    assert!(
        !source.contains("{{WORKGROUP_SIZE}}"),
        "no placeholder may survive substitution"
    );
}

// ============================================================================
// Seeding Tests
// ============================================================================

#[test]
fn seeding_produces_count_positions_inside_the_radius() {
    let radius = 5.0;
    let positions = seed_positions(128, radius, 7);

    assert_eq!(positions.len(), 128);
    for (i, position) in positions.iter().enumerate() {
        assert!(
            position.length() <= radius + EPSILON,
            "position {i} at {position:?} escapes the seed sphere"
        );
    }
}

#[test]
fn seeding_is_deterministic_per_seed() {
    assert_eq!(
        seed_positions(32, 5.0, 7),
        seed_positions(32, 5.0, 7),
        "same seed must reproduce the same cloud"
    );
    assert_ne!(
        seed_positions(32, 5.0, 7),
        seed_positions(32, 5.0, 8),
        "different seeds must produce different clouds"
    );
}

#[test]
fn zero_radius_collapses_to_origin() {
    let positions = seed_positions(16, 0.0, 7);
    assert_eq!(positions.len(), 16);
    assert!(positions.iter().all(|p| *p == Vec3::ZERO));
}

#[test]
fn seeding_spreads_positions_apart() {
    let positions = seed_positions(64, 5.0, 7);
    let first = positions[0];
    assert!(
        positions.iter().any(|p| p.distance(first) > 1.0),
        "a 64-point cloud in a radius-5 sphere cannot be a single point"
    );
}

// ============================================================================
// Packing Tests
// ============================================================================

#[test]
fn packing_is_tight_xyz() {
    let packed = pack_positions(&[Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
    assert_eq!(packed, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn packed_stride_matches_the_buffer_contract() {
    let packed = pack_positions(&seed_positions(10, 5.0, 7));
    let bytes = packed.len() as u64 * std::mem::size_of::<f32>() as u64;
    assert_eq!(
        bytes,
        10 * POSITION_STRIDE,
        "10 positions must occupy exactly 10 strides"
    );
}

// ============================================================================
// Matrix Rebuild Tests
// ============================================================================

#[test]
fn rebuild_preserves_instance_order() {
    let positions = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
        Vec3::new(0.0, 0.0, 3.0),
    ];
    let mut matrices = Vec::new();
    rebuild_matrices(&pack_positions(&positions), &mut matrices);

    assert_eq!(matrices.len(), 3);
    for (i, expected) in positions.iter().enumerate() {
        let translation = matrices[i].w_axis.truncate();
        assert_eq!(
            translation, *expected,
            "matrix {i} must carry position {i}, got {translation:?}"
        );
    }
}

#[test]
fn rebuilt_matrices_are_translation_only() {
    let mut matrices = Vec::new();
    rebuild_matrices(&pack_positions(&seed_positions(8, 5.0, 7)), &mut matrices);

    for matrix in &matrices {
        assert_eq!(matrix.x_axis, Vec4::X, "no rotation or scale on x");
        assert_eq!(matrix.y_axis, Vec4::Y, "no rotation or scale on y");
        assert_eq!(matrix.z_axis, Vec4::Z, "no rotation or scale on z");
        assert!((matrix.w_axis.w - 1.0).abs() < EPSILON);
    }
}

#[test]
fn rebuild_reuses_the_output_vec() {
    let mut matrices = vec![Mat4::IDENTITY; 100];
    rebuild_matrices(&pack_positions(&[Vec3::ONE]), &mut matrices);
    assert_eq!(matrices.len(), 1, "stale entries must not survive a rebuild");
    assert_eq!(matrices[0].w_axis.truncate(), Vec3::ONE);
}

#[test]
fn pack_then_rebuild_round_trips_the_cloud() {
    let positions = seed_positions(20, 5.0, 42);
    let mut matrices = Vec::new();
    rebuild_matrices(&pack_positions(&positions), &mut matrices);

    for (position, matrix) in positions.iter().zip(&matrices) {
        assert!(
            position.distance(matrix.w_axis.truncate()) < EPSILON,
            "round trip must preserve {position:?}"
        );
    }
}

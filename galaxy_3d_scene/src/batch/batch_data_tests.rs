use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::renderer::mock_render_device::{DeviceCommand, MockRenderDevice};
use crate::renderer::MaterialDesc;
use crate::scene::test_object::{material, TestObject};
use super::*;

fn geometry() -> Arc<GeometryData> {
    Arc::new(GeometryData::new(3, 1))
}

fn prioritized(name: &str, priority: i32) -> Arc<Material> {
    Arc::new(Material::new(MaterialDesc {
        name: name.to_string(),
        priority,
        pass_flags: u64::MAX,
        ..Default::default()
    }))
}

fn operation(m: &Arc<Material>, g: &Arc<GeometryData>) -> RenderOperation {
    RenderOperation::new(m.clone(), g.clone())
}

// ============================================================================
// Selection mask
// ============================================================================

#[test]
fn test_selection_mask() {
    assert_eq!(selection_mask(-1), u64::MAX);
    assert_eq!(selection_mask(0), 1);
    assert_eq!(selection_mask(5), 1 << 5);
    assert_eq!(selection_mask(63), 1 << 63);
    assert_eq!(selection_mask(64), 0);
    assert_eq!(selection_mask(-2), 0);
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_same_triple_shares_one_list() {
    let mut batch = BatchData::default();
    let m = material("m", 1);
    let g = geometry();

    batch.add_operation(&m, &g, operation(&m, &g));
    batch.add_operation(&m, &g, operation(&m, &g));

    assert_eq!(batch.operation_list_count(), 1);
    assert_eq!(batch.operations(m.id(), g.id()).map(<[_]>::len), Some(2));

    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, 0).unwrap();
    assert_eq!(device.renders().len(), 1);
    assert_eq!(device.rendered_operation_count(), 2);
}

#[test]
fn test_geometries_render_in_insertion_order() {
    let mut batch = BatchData::default();
    let a = material("a", 1);
    let b = material("b", 1);
    let g1 = geometry();
    let g2 = geometry();

    batch.add_operation(&b, &g1, operation(&b, &g1));
    batch.add_operation(&a, &g1, operation(&a, &g1));
    batch.add_operation(&b, &g2, operation(&b, &g2));

    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, 0).unwrap();
    assert_eq!(device.rendered_material_names(), vec!["b", "b", "a"]);
}

#[test]
fn test_priorities_render_in_first_use_order() {
    let mut batch = BatchData::default();
    let high = prioritized("high", 5);
    let low = prioritized("low", 1);
    let g = geometry();

    batch.add_operation(&high, &g, operation(&high, &g));
    batch.add_operation(&low, &g, operation(&low, &g));

    assert_eq!(batch.priorities().collect::<Vec<_>>(), vec![5, 1]);
    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, -1).unwrap();
    assert_eq!(device.rendered_material_names(), vec!["high", "low"]);
}

#[test]
fn test_priority_is_clamped() {
    let mut batch = BatchData::default();
    let over = prioritized("over", 100);
    let under = prioritized("under", -5);
    let g = geometry();

    batch.add_operation(&over, &g, operation(&over, &g));
    batch.add_operation(&under, &g, operation(&under, &g));

    assert_eq!(batch.priorities().collect::<Vec<_>>(), vec![(MAX_PRIORITY - 1) as usize, 0]);
}

// ============================================================================
// add_visible_object
// ============================================================================

#[test]
fn test_add_visible_object_applies_world_transform() {
    let mut batch = BatchData::default();
    let m = material("m", 1);
    let g = geometry();
    let local = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
    let world_space = Mat4::from_translation(Vec3::new(0.0, 0.0, 7.0));
    let object = TestObject::new(Vec3::new(2.0, 0.0, 0.0), 1.0).with_operations(vec![
        operation(&m, &g).with_transform(local),
        operation(&m, &g).with_final_transform(world_space),
    ]);

    batch.add_visible_object(&object, 0);

    let operations = batch.operations(m.id(), g.id()).unwrap();
    assert_eq!(operations[0].root_transform, Mat4::from_translation(Vec3::new(2.0, 1.0, 0.0)));
    assert_eq!(operations[1].root_transform, world_space);
    assert_eq!(batch.object_count(), 1);
}

#[test]
fn test_add_visible_object_skips_incomplete_operations() {
    let mut batch = BatchData::default();
    let m = material("m", 1);
    let g = geometry();
    let mut missing_geometry = operation(&m, &g);
    missing_geometry.geometry = None;
    let mut missing_material = operation(&m, &g);
    missing_material.material = None;
    let object = TestObject::new(Vec3::ZERO, 1.0)
        .with_operations(vec![missing_geometry, missing_material, operation(&m, &g)]);

    batch.add_visible_object(&object, 0);
    assert_eq!(batch.operation_count(), 1);
}

// ============================================================================
// Clear / Reset
// ============================================================================

#[test]
fn test_clear_keeps_tables() {
    let mut batch = BatchData::default();
    let idle = batch.cache().idle_operation_lists();
    let m = material("m", 1);
    let g = geometry();
    batch.add_operation(&m, &g, operation(&m, &g));

    batch.clear();

    assert_eq!(batch.operation_count(), 0);
    assert_eq!(batch.material_count(), 1);
    assert_eq!(batch.operation_list_count(), 1);
    assert_eq!(batch.cache().idle_operation_lists(), idle - 1);
}

#[test]
fn test_reset_recycles_everything() {
    let mut batch = BatchData::default();
    let lists = batch.cache().idle_operation_lists();
    let tables = batch.cache().idle_geometry_tables();
    let m = material("m", 1);
    let g1 = geometry();
    let g2 = geometry();
    batch.add_operation(&m, &g1, operation(&m, &g1));
    batch.add_operation(&m, &g2, operation(&m, &g2));

    batch.reset();

    assert_eq!(batch.material_count(), 0);
    assert_eq!(batch.object_count(), 0);
    assert_eq!(batch.cache().idle_operation_lists(), lists);
    assert_eq!(batch.cache().idle_geometry_tables(), tables);

    // Refilling draws the containers back out of the pool
    batch.add_operation(&m, &g1, operation(&m, &g1));
    batch.add_operation(&m, &g2, operation(&m, &g2));

    assert_eq!(batch.material_count(), 1);
    assert_eq!(batch.operation_list_count(), 2);
    assert_eq!(batch.cache().idle_operation_lists(), lists - 2);
    assert_eq!(batch.cache().idle_geometry_tables(), tables - 1);
}

// ============================================================================
// render_batch
// ============================================================================

#[test]
fn test_selector_filters_materials() {
    let mut batch = BatchData::default();
    let main = material("main", 1 << 0);
    let shadow = material("shadow", 1 << 1);
    let both = material("both", (1 << 0) | (1 << 1));
    let g = geometry();
    for m in [&main, &shadow, &both] {
        batch.add_operation(m, &g, operation(m, &g));
    }

    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, 1).unwrap();
    assert_eq!(device.rendered_material_names(), vec!["shadow", "both"]);

    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, -1).unwrap();
    assert_eq!(device.rendered_material_names(), vec!["main", "shadow", "both"]);

    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, 64).unwrap();
    assert!(device.renders().is_empty());
}

#[test]
fn test_render_passes_selector_to_device() {
    let mut batch = BatchData::default();
    let m = material("m", u64::MAX);
    let g = geometry();
    batch.add_operation(&m, &g, operation(&m, &g));

    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, 3).unwrap();
    assert!(matches!(device.renders()[0], DeviceCommand::Render { selector_id: 3, .. }));
}

#[test]
fn test_discarded_geometry_stops_material() {
    let mut batch = BatchData::default();
    let m = material("m", 1);
    let g1 = geometry();
    let g2 = Arc::new(GeometryData::new(3, 1).discarded());
    let g3 = geometry();
    for g in [&g1, &g2, &g3] {
        batch.add_operation(&m, g, operation(&m, g));
    }

    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, 0).unwrap();
    assert_eq!(device.renders().len(), 1);
    assert_eq!(batch.operation_list_count(), 3);
}

#[test]
fn test_emptied_entries_are_pruned() {
    let mut batch = BatchData::default();
    let lists = batch.cache().idle_operation_lists();
    let tables = batch.cache().idle_geometry_tables();
    let kept = material("kept", 1);
    let dropped = material("dropped", 1);
    let g = geometry();
    batch.add_operation(&kept, &g, operation(&kept, &g));
    batch.add_operation(&dropped, &g, operation(&dropped, &g));

    // Next frame only one material comes back
    batch.clear();
    batch.add_operation(&kept, &g, operation(&kept, &g));

    let mut device = MockRenderDevice::new();
    batch.render_batch(&mut device, 0).unwrap();

    assert_eq!(device.rendered_material_names(), vec!["kept"]);
    assert_eq!(batch.material_count(), 1);
    assert_eq!(batch.cache().idle_operation_lists(), lists - 1);
    assert_eq!(batch.cache().idle_geometry_tables(), tables - 1);
}

#[test]
fn test_has_visible_material() {
    let mut batch = BatchData::default();
    let shadow = material("shadow", 1 << 2);
    let g = geometry();

    assert!(!batch.has_visible_material(-1));
    batch.add_operation(&shadow, &g, operation(&shadow, &g));

    assert!(batch.has_visible_material(2));
    assert!(batch.has_visible_material(-1));
    assert!(!batch.has_visible_material(0));

    batch.clear();
    assert!(!batch.has_visible_material(2));
}
